//! Domain layer containing the arbitrage model and its solution
//!
//! This module contains the pool and problem entities, the index mapping between
//! global and per-pool asset spaces, the invariant and objective builders that
//! assemble the convex program, and everything needed to read, verify and
//! execute an optimal solution.

/// Execution ordering and kick-start capital
pub mod execution;
/// Affine expressions, constraint shapes and the convex program
pub mod expr;
/// Global/local asset index mapping
pub mod incidence;
/// Pool invariants and their convex constraints
pub mod invariant;
/// Trade variables and program assembly
pub mod model;
/// Extraction vector and market-value objective
pub mod objective;
/// Solve entry points
pub mod optimizer;
/// Liquidity pools
pub mod pool;
/// Problem definition and validation
pub mod problem;
/// Human and machine readable solve reports
pub mod report;
/// Solve results and verification
pub mod solution;
/// Convex solver seam
pub mod solver;
/// Core types and primitives
pub mod types;

pub use execution::*;
pub use expr::*;
pub use incidence::Incidence;
pub use invariant::Invariant;
pub use model::{ArbitrageModel, TradeVariables};
pub use optimizer::{solve_arbitrage, ArbitrageOptimizer};
pub use pool::Pool;
pub use problem::ArbitrageProblem;
pub use report::*;
pub use solution::*;
pub use solver::{ConvexSolver, ProgramSolution};
pub use types::*;
