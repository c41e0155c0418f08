//! Metrics collection and export functionality
//!
//! This module counts solve outcomes and accumulated solve time, and exports
//! snapshots for monitoring systems.

/// Solve outcome counters
pub mod collector;
/// Prometheus and JSON export
pub mod exporter;

pub use collector::*;
pub use exporter::*;
