//! Adapters layer (Hexagonal Architecture)

mod decision_log;

pub use decision_log::*;
