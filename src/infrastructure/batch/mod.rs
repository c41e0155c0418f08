//! Concurrent solving of independent problems
//!
//! This module fans independent solves out over tokio's blocking pool and
//! gathers their reports back in submission order.

/// Batch solver with bounded concurrency and outcome metrics
pub mod batch_optimizer;

pub use batch_optimizer::*;
