use crate::domain::expr::*;
use crate::domain::solution::SolveStatus;
use crate::domain::solver::*;
use crate::domain::types::*;
use crate::infrastructure::solver::settings::SolverSettings;
use clarabel::algebra::*;
use clarabel::solver::*;
use tracing::{debug, warn};

/// One row of `A x + s = b`, with `s` the slack constrained to a cone
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Row {
    pub(crate) coeffs: Vec<(usize, f64)>,
    pub(crate) rhs: f64,
}

impl Row {
    /// Slack equal to `expr`
    fn from_expr(expr: &AffineExpr) -> Self {
        Self {
            coeffs: expr.terms().iter().map(|&(var, c)| (var.0, -c)).collect(),
            rhs: expr.constant_part(),
        }
    }

    /// Slack equal to one column
    fn from_column(column: usize) -> Self {
        Self {
            coeffs: vec![(column, -1.0)],
            rhs: 0.0,
        }
    }

    fn shifted(mut self, delta: f64) -> Self {
        self.rhs += delta;
        self
    }
}

/// Program lowered to nonnegative and 3-D power cones
///
/// Columns `0..num_variables` are the program variables; anything beyond
/// is an auxiliary column of a geometric-mean chain.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConicForm {
    pub(crate) num_columns: usize,
    pub(crate) nonnegative: Vec<Row>,
    pub(crate) power: Vec<(f64, [Row; 3])>,
}

impl ConicForm {
    pub(crate) fn lower(program: &ConvexProgram) -> Self {
        let mut form = Self {
            num_columns: program.num_variables(),
            ..Self::default()
        };
        for constraint in program.constraints() {
            match constraint {
                Constraint::NonNegative(expr) => form.nonnegative.push(Row::from_expr(expr)),
                Constraint::GeoMeanAtLeast {
                    args,
                    weights,
                    bound,
                } => form.lower_geo_mean(args, weights, *bound),
            }
        }
        form
    }

    /// `Π args_i^w_i ≥ bound` as a chain of power cones
    ///
    /// `t_1 = args_1`, then `t_k ≤ t_{k-1}^(S_{k-1}/S_k) · args_k^(w_k/S_k)` with
    /// `S_k` the running weight sum, so `t_n` is the full weighted mean.
    fn lower_geo_mean(&mut self, args: &[AffineExpr], weights: &[f64], bound: f64) {
        let Some((first, rest)) = args.split_first() else {
            return;
        };
        let mut previous = Row::from_expr(first);
        if rest.is_empty() {
            self.nonnegative.push(previous.clone());
            self.nonnegative.push(previous.shifted(-bound));
            return;
        }

        let mut cumulative = weights[0];
        for (arg, &weight) in rest.iter().zip(&weights[1..]) {
            let total = cumulative + weight;
            let column = self.num_columns;
            self.num_columns += 1;
            self.power.push((
                cumulative / total,
                [previous, Row::from_expr(arg), Row::from_column(column)],
            ));
            previous = Row::from_column(column);
            cumulative = total;
        }
        self.nonnegative.push(previous.shifted(-bound));
    }

    fn rows(&self) -> impl Iterator<Item = &Row> {
        self.nonnegative
            .iter()
            .chain(self.power.iter().flat_map(|(_, rows)| rows.iter()))
    }

    pub(crate) fn num_rows(&self) -> usize {
        self.nonnegative.len() + 3 * self.power.len()
    }

    pub(crate) fn cones(&self) -> Vec<SupportedConeT<f64>> {
        let mut cones = Vec::with_capacity(1 + self.power.len());
        if !self.nonnegative.is_empty() {
            cones.push(NonnegativeConeT(self.nonnegative.len()));
        }
        cones.extend(self.power.iter().map(|&(alpha, _)| PowerConeT(alpha)));
        cones
    }

    pub(crate) fn rhs(&self) -> Vec<f64> {
        self.rows().map(|row| row.rhs).collect()
    }

    /// Constraint matrix in compressed column form
    pub(crate) fn matrix(&self) -> CscMatrix<f64> {
        let mut triplets: Vec<(usize, usize, f64)> = self
            .rows()
            .enumerate()
            .flat_map(|(row, r)| r.coeffs.iter().map(move |&(col, value)| (col, row, value)))
            .filter(|&(_, _, value)| value != 0.0)
            .collect();
        triplets.sort_by_key(|&(col, row, _)| (col, row));

        let mut colptr = vec![0; self.num_columns + 1];
        for &(col, _, _) in &triplets {
            colptr[col + 1] += 1;
        }
        for col in 0..self.num_columns {
            colptr[col + 1] += colptr[col];
        }
        let rowval = triplets.iter().map(|&(_, row, _)| row).collect();
        let nzval = triplets.iter().map(|&(_, _, value)| value).collect();

        CscMatrix::new(self.num_rows(), self.num_columns, colptr, rowval, nzval)
    }
}

fn map_status(status: SolverStatus) -> SolveStatus {
    match status {
        SolverStatus::Solved | SolverStatus::AlmostSolved => SolveStatus::Optimal,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            SolveStatus::Infeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            SolveStatus::Unbounded
        }
        other => SolveStatus::SolverError(format!("{:?}", other)),
    }
}

/// Interior-point conic solver backend
#[derive(Debug, Clone, Default)]
pub struct ClarabelSolver {
    settings: SolverSettings,
}

impl ClarabelSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    fn clarabel_settings(&self) -> ArbitrageResult<DefaultSettings<f64>> {
        DefaultSettingsBuilder::default()
            .verbose(self.settings.verbose)
            .max_iter(self.settings.max_iter)
            .time_limit(self.settings.time_limit_secs.unwrap_or(f64::INFINITY))
            .tol_gap_abs(self.settings.tol_gap_abs)
            .tol_gap_rel(self.settings.tol_gap_rel)
            .tol_feas(self.settings.tol_feas)
            .build()
            .map_err(|e| ArbitrageError::SolverSetup(e.to_string()))
    }
}

impl ConvexSolver for ClarabelSolver {
    fn name(&self) -> &str {
        "clarabel"
    }

    fn solve(&self, program: &ConvexProgram) -> ArbitrageResult<ProgramSolution> {
        if program.num_variables() == 0 {
            // Nothing to decide: the constant program is either feasible or not
            let status = if program.max_violation(&[]) <= self.settings.tol_feas {
                SolveStatus::Optimal
            } else {
                SolveStatus::Infeasible
            };
            return Ok(ProgramSolution {
                status,
                values: Vec::new(),
                iterations: 0,
            });
        }

        let settings = self.clarabel_settings()?;
        let form = ConicForm::lower(program);

        let mut q = vec![0.0; form.num_columns];
        for &(var, coefficient) in program.objective().terms() {
            q[var.0] = -coefficient;
        }
        let p = CscMatrix::<f64>::zeros((form.num_columns, form.num_columns));
        let a = form.matrix();
        let b = form.rhs();
        let cones = form.cones();

        debug!(
            "Clarabel problem: {} columns ({} auxiliary), {} rows, {} power cones",
            form.num_columns,
            form.num_columns - program.num_variables(),
            form.num_rows(),
            form.power.len()
        );

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
        solver.solve();

        let status = map_status(solver.solution.status);
        let iterations = solver.info.iterations;
        if !status.is_optimal() {
            warn!("Clarabel terminated with {:?}", solver.solution.status);
            return Ok(ProgramSolution::non_optimal(status, iterations));
        }

        let values = solver.solution.x[..program.num_variables()].to_vec();
        Ok(ProgramSolution::optimal(values, iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(i: usize) -> AffineExpr {
        AffineExpr::term(VarId(i), 1.0)
    }

    #[test]
    fn test_linear_rows_negate_coefficients() {
        let program = ConvexProgram::new(2, x(0)).with_constraints([Constraint::at_least(
            x(0).plus_scaled(&x(1), 2.0),
            3.0,
        )]);
        let form = ConicForm::lower(&program);

        assert_eq!(form.num_columns, 2);
        assert_eq!(form.nonnegative[0].coeffs, vec![(0, -1.0), (1, -2.0)]);
        assert_eq!(form.rhs(), vec![-3.0]);
        assert_eq!(form.cones().len(), 1);
    }

    #[test]
    fn test_geo_mean_chain_adds_auxiliary_columns() {
        let program = ConvexProgram::new(3, x(0)).with_constraints([Constraint::GeoMeanAtLeast {
            args: vec![x(0), x(1), x(2)],
            weights: vec![0.5, 0.3, 0.2],
            bound: 1.0,
        }]);
        let form = ConicForm::lower(&program);

        // two links in the chain, each with its own output column
        assert_eq!(form.num_columns, 5);
        assert_eq!(form.power.len(), 2);
        assert!((form.power[0].0 - 0.5 / 0.8).abs() < 1e-12);
        assert!((form.power[1].0 - 0.8).abs() < 1e-12);
        // final bound sits on the last auxiliary column
        assert_eq!(form.nonnegative, vec![Row { coeffs: vec![(4, -1.0)], rhs: -1.0 }]);
        assert_eq!(form.num_rows(), 7);
        assert_eq!(form.cones().len(), 3);
    }

    #[test]
    fn test_single_argument_mean_is_linear() {
        let program = ConvexProgram::new(1, x(0)).with_constraints([Constraint::GeoMeanAtLeast {
            args: vec![AffineExpr::constant(2.0).plus_scaled(&x(0), -1.0)],
            weights: vec![1.0],
            bound: 1.5,
        }]);
        let form = ConicForm::lower(&program);

        assert_eq!(form.num_columns, 1);
        assert!(form.power.is_empty());
        assert_eq!(form.rhs(), vec![2.0, 0.5]);
    }

    #[test]
    fn test_matrix_is_column_compressed() {
        let program = ConvexProgram::new(2, x(0)).with_constraints([
            Constraint::NonNegative(x(1)),
            Constraint::NonNegative(x(0).plus_scaled(&x(1), 1.0)),
        ]);
        let a = ConicForm::lower(&program).matrix();

        assert_eq!(a.colptr, vec![0, 1, 3]);
        assert_eq!(a.rowval, vec![1, 0, 1]);
        assert_eq!(a.nzval, vec![-1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status(SolverStatus::AlmostSolved), SolveStatus::Optimal);
        assert_eq!(map_status(SolverStatus::PrimalInfeasible), SolveStatus::Infeasible);
        assert_eq!(map_status(SolverStatus::DualInfeasible), SolveStatus::Unbounded);
        assert_eq!(
            map_status(SolverStatus::MaxIterations),
            SolveStatus::SolverError("MaxIterations".to_string())
        );
    }

    #[test]
    fn test_small_linear_program() {
        // maximize x0 subject to x0 ≥ 0, 2 − x0 ≥ 0
        let program = ConvexProgram::new(1, x(0)).with_constraints([
            Constraint::NonNegative(x(0)),
            Constraint::NonNegative(AffineExpr::constant(2.0).plus_scaled(&x(0), -1.0)),
        ]);
        let solution = ClarabelSolver::default().solve(&program).unwrap();

        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!((solution.values[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_geo_mean_program() {
        // maximize x0 + x1 with sqrt(x0 · x1) ≥ 1 and x0 + x1 ≤ 4
        let program = ConvexProgram::new(2, x(0).plus_scaled(&x(1), 1.0)).with_constraints([
            Constraint::GeoMeanAtLeast {
                args: vec![x(0), x(1)],
                weights: vec![0.5, 0.5],
                bound: 1.0,
            },
            Constraint::NonNegative(
                AffineExpr::constant(4.0)
                    .plus_scaled(&x(0), -1.0)
                    .plus_scaled(&x(1), -1.0),
            ),
        ]);
        let solution = ClarabelSolver::default().solve(&program).unwrap();

        assert_eq!(solution.status, SolveStatus::Optimal);
        let total = solution.values[0] + solution.values[1];
        assert!((total - 4.0).abs() < 1e-5);
        assert!(program.max_violation(&solution.values) < 1e-6);
    }

    #[test]
    fn test_empty_program_is_trivially_optimal() {
        let solution = ClarabelSolver::default()
            .solve(&ConvexProgram::new(0, AffineExpr::default()))
            .unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!(solution.values.is_empty());
    }
}
