//! # Ports Layer
//!
//! - **Inbound (Driving)**: pool membership API

pub mod inbound;
