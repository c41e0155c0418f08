use crate::domain::expr::ConvexProgram;
use crate::domain::solution::SolveStatus;
use crate::domain::types::ArbitrageResult;

/// Raw result of solving a [`ConvexProgram`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramSolution {
    pub status: SolveStatus,
    /// One value per program variable; empty when the status is not optimal
    pub values: Vec<f64>,
    /// Iterations spent by the backend
    pub iterations: u32,
}

impl ProgramSolution {
    pub fn optimal(values: Vec<f64>, iterations: u32) -> Self {
        Self {
            status: SolveStatus::Optimal,
            values,
            iterations,
        }
    }

    pub fn non_optimal(status: SolveStatus, iterations: u32) -> Self {
        Self {
            status,
            values: Vec::new(),
            iterations,
        }
    }
}

/// Convex solve capability
///
/// Implementations perform exactly one deterministic solve per call. Errors
/// are reserved for programs the backend cannot even be set up with;
/// every termination of an actual solve is a [`SolveStatus`].
pub trait ConvexSolver: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Maximizes the program's objective subject to its constraints
    fn solve(&self, program: &ConvexProgram) -> ArbitrageResult<ProgramSolution>;
}
