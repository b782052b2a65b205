//! Ports layer (Hexagonal Architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::ConsensusApi;
pub use outbound::DecisionSink;
