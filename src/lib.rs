//! # AMM Arbitrage Optimizer
//!
//! Computes the value-maximizing set of simultaneous trades across automated
//! market maker pools that share overlapping subsets of a common asset set:
//! - Global/local asset index mapping per pool
//! - Per-pool invariants (weighted geometric mean, geometric mean, constant sum)
//!   encoded as convex constraints
//! - Market-value objective over the extraction vector `psi`
//! - Conic solver adapter with verbatim termination statuses
//! - Execution ordering that minimizes kick-start capital
//!
//! ## Architecture
//!
//! The crate follows domain-driven design principles with clear separation of concerns:
//!
//! - **Domain**: Problem entities, model construction, solutions and reports
//! - **Infrastructure**: Solver backends, batch solving, metrics, JSON parsing
//!
//! ## Concurrency
//!
//! Model construction is pure. A solve is one blocking call; independent solves
//! run as separate tasks through [`BatchOptimizer`] with no shared mutable state
//! beyond atomic metrics counters.

pub mod domain;
pub mod infrastructure;

/// Utilities for logging
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{
    execution::{ExecutionConfig, ExecutionLeg, ExecutionPlan},
    incidence::Incidence,
    invariant::Invariant,
    model::{ArbitrageModel, TradeVariables},
    optimizer::{solve_arbitrage, ArbitrageOptimizer},
    pool::Pool,
    problem::ArbitrageProblem,
    report::SolveReport,
    solution::{ArbitrageSolution, PoolTrade, SolveStatus, Violation},
    solver::{ConvexSolver, ProgramSolution},
    types::*,
};

pub use infrastructure::{
    batch::{best_report, BatchOptimizer},
    metrics::{MetricsExporter, MetricsSnapshot, SolveMetrics},
    parsers::{load_problem, parse_problem, write_report, ProblemFile},
    solver::{ClarabelSolver, SolverSettings},
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
