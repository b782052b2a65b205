//! # Domain Layer
//!
//! Agents, their health state machine, fault behaviours and gossip topology.

pub mod agent;
pub mod behavior;
pub mod config;
pub mod errors;
pub mod health;
pub mod topology;
