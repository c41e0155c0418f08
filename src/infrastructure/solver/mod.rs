//! Convex solver backends
//!
//! This module provides the conic solver implementation of the domain's
//! solver seam together with its numerical settings.

/// Clarabel interior-point backend
pub mod clarabel_backend;
/// Solver tolerances and limits
pub mod settings;

pub use clarabel_backend::ClarabelSolver;
pub use settings::SolverSettings;
