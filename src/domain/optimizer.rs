use crate::domain::execution::*;
use crate::domain::model::ArbitrageModel;
use crate::domain::problem::ArbitrageProblem;
use crate::domain::report::SolveReport;
use crate::domain::solution::*;
use crate::domain::solver::*;
use crate::domain::types::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Builds the model for `problem`, solves it once and reads the result back
///
/// Configuration errors are returned before the solver is called. Any
/// termination of the solve itself is reported through the solution status.
pub fn solve_arbitrage(
    problem: &ArbitrageProblem,
    solver: &dyn ConvexSolver,
) -> ArbitrageResult<ArbitrageSolution> {
    let model = ArbitrageModel::build(problem)?;
    let raw = solver.solve(model.program())?;
    read_solution(model, raw)
}

fn read_solution(model: ArbitrageModel, raw: ProgramSolution) -> ArbitrageResult<ArbitrageSolution> {
    let incidences = model.incidences().to_vec();
    if !raw.status.is_optimal() {
        return Ok(ArbitrageSolution::without_values(raw.status, incidences));
    }

    let num_variables = model.program().num_variables();
    if raw.values.len() < num_variables {
        return Err(ArbitrageError::SolverSetup(format!(
            "solver returned {} values for {} variables",
            raw.values.len(),
            num_variables
        )));
    }

    let trades = model
        .trades()
        .iter()
        .map(|trade| PoolTrade {
            deposit: trade.deposit_values(&raw.values),
            withdraw: trade.withdraw_values(&raw.values),
        })
        .collect();
    let psi = model
        .psi()
        .iter()
        .map(|expr| expr.evaluate(&raw.values))
        .collect();

    Ok(ArbitrageSolution {
        status: SolveStatus::Optimal,
        trades,
        psi,
        objective_value: Some(model.program().objective().evaluate(&raw.values)),
        incidences,
    })
}

/// Solver plus execution settings, shareable across tasks
#[derive(Clone)]
pub struct ArbitrageOptimizer {
    solver: Arc<dyn ConvexSolver>,
    execution: ExecutionConfig,
}

impl ArbitrageOptimizer {
    pub fn new(solver: Arc<dyn ConvexSolver>) -> Self {
        Self {
            solver,
            execution: ExecutionConfig::default(),
        }
    }

    pub fn with_execution_config(mut self, execution: ExecutionConfig) -> Self {
        self.execution = execution;
        self
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    pub fn execution_config(&self) -> &ExecutionConfig {
        &self.execution
    }

    /// Solves one problem
    pub fn solve(&self, problem: &ArbitrageProblem) -> ArbitrageResult<ArbitrageSolution> {
        let solution = solve_arbitrage(problem, self.solver.as_ref())?;
        match &solution.status {
            SolveStatus::Optimal => info!(
                "Solved {} pools with {}: objective {:.6}",
                problem.num_pools(),
                self.solver_name(),
                solution.objective_value.unwrap_or_default()
            ),
            other => warn!(
                "Solve of {} pools with {} ended {}",
                problem.num_pools(),
                self.solver_name(),
                other
            ),
        }
        Ok(solution)
    }

    /// Solves one problem and assembles the full report with an execution plan
    pub fn solve_with_report(&self, problem: &ArbitrageProblem) -> ArbitrageResult<SolveReport> {
        let started = Instant::now();
        let solution = self.solve(problem)?;
        let elapsed = started.elapsed();
        let plan = ExecutionPlan::build(problem, &solution, &self.execution)?;
        SolveReport::new(problem, &solution, plan, elapsed)
    }
}

impl std::fmt::Debug for ArbitrageOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArbitrageOptimizer")
            .field("solver", &self.solver.name())
            .field("execution", &self.execution)
            .finish()
    }
}
