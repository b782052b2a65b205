//! # Shared Types Crate
//!
//! Identifiers, verdicts and the clock abstraction used across the
//! verification subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifiers that cross crate boundaries
//!   (`AgentId`, `RoundId`, `PoolHandle`) are defined once, here.
//! - **Closed Verdicts**: the value agents agree on is a tagged enum with a
//!   canonical byte form, so vote matching is exact equality.
//! - **Injectable Time**: anything that reads the clock takes a
//!   [`TimeSource`] so tests can drive expiry deterministically.

pub mod entities;
pub mod time;

pub use entities::*;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource, Timestamp};
