//! # Domain Layer
//!
//! Pure verification logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod batch;
pub mod cache;
pub mod config;
pub mod entities;
pub mod errors;
pub mod manager;
