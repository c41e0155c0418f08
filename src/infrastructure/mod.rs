//! Infrastructure layer providing solver backends, batch solving, metrics, and parsing
//!
//! This module contains the infrastructure components that support the domain layer,
//! including the conic solver adapter, concurrent batch solving, metrics collection,
//! and problem file parsing.

/// Concurrent solving of independent problems
pub mod batch;
/// Metrics collection and export functionality
pub mod metrics;
/// Problem file parsing and report writing
pub mod parsers;
/// Convex solver backends
pub mod solver;

pub use batch::*;
pub use parsers::*;
pub use solver::*;
