//! Foundation utilities shared across the crate
//!
//! Small, dependency-light building blocks: math type aliases and logging
//! setup. Nothing in here knows about batching.

pub mod logging;
pub mod math;
