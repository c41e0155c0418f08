use amm_arbitrage_optimizer::*;

const TOLERANCE: f64 = 1e-6;

fn reference_problem() -> ArbitrageProblem {
    ArbitrageProblem::new(
        4,
        vec![
            Pool::weighted(vec![0, 1, 2, 3], vec![4.0, 4.0, 4.0, 4.0], 0.998, vec![4, 3, 2, 1])
                .with_label("BALANCER 0/1/2/3"),
            Pool::geometric_mean(vec![0, 1], vec![10.0, 1.0], 0.997).with_label("UNIV2 0/1"),
            Pool::geometric_mean(vec![1, 2], vec![1.0, 5.0], 0.997).with_label("UNIV2 1/2"),
            Pool::geometric_mean(vec![2, 3], vec![40.0, 50.0], 0.997).with_label("UNIV2 2/3"),
            Pool::constant_sum(vec![2, 3], vec![10.0, 10.0], 0.999).with_label("CONSTANT SUM 2/3"),
        ],
        vec![1.5, 10.0, 2.0, 3.0],
    )
}

fn solver() -> ClarabelSolver {
    ClarabelSolver::new(SolverSettings::default())
}

#[test]
fn test_reference_scenario_is_optimal() {
    let problem = reference_problem();
    let solution = solve_arbitrage(&problem, &solver()).unwrap();

    assert_eq!(solution.status, SolveStatus::Optimal);
    assert_eq!(solution.trades.len(), 5);
    for (pool, trade) in problem.pools().iter().zip(&solution.trades) {
        assert_eq!(trade.deposit.len(), pool.arity());
        assert_eq!(trade.withdraw.len(), pool.arity());
    }
    for (pool, incidence) in problem.pools().iter().zip(&solution.incidences) {
        assert_eq!(incidence.matrix().dim(), (4, pool.arity()));
    }
    assert_eq!(solution.psi.len(), 4);
}

#[test]
fn test_reference_scenario_extracts_value() {
    let problem = reference_problem();
    let solution = solve_arbitrage(&problem, &solver()).unwrap();

    let objective = solution.objective_value.unwrap();
    assert!(objective > 0.0, "objective {}", objective);

    let valued: f64 = solution.psi_value(problem.market_value()).iter().sum();
    assert!((valued - objective).abs() < 1e-6 * objective.max(1.0));
}

#[test]
fn test_reference_scenario_respects_invariants() {
    let problem = reference_problem();
    let solution = solve_arbitrage(&problem, &solver()).unwrap();

    let violations = solution.verify(&problem, TOLERANCE).unwrap();
    assert!(violations.is_empty(), "violations: {:?}", violations);

    for (pool, trade) in problem.pools().iter().zip(&solution.trades) {
        let post = pool.post_trade_reserves(&trade.deposit, &trade.withdraw);
        let before = pool.invariant_value();
        let after = pool.invariant.value(&post);
        assert!(after >= before * (1.0 - TOLERANCE) - TOLERANCE);
        assert!(post.iter().all(|&r| r >= -TOLERANCE));
        assert!(trade.deposit.iter().all(|&d| d >= -TOLERANCE));
        assert!(trade.withdraw.iter().all(|&w| w >= -TOLERANCE));
    }
    assert!(solution.psi.iter().all(|&p| p >= -TOLERANCE));
}

#[test]
fn test_fairly_priced_pool_has_no_arbitrage() {
    let problem = ArbitrageProblem::new(
        2,
        vec![Pool::geometric_mean(vec![0, 1], vec![10.0, 10.0], 0.997)],
        vec![1.0, 1.0],
    );
    let solution = solve_arbitrage(&problem, &solver()).unwrap();

    assert_eq!(solution.status, SolveStatus::Optimal);
    assert!(solution.objective_value.unwrap().abs() < 1e-6);
    let trade = &solution.trades[0];
    assert!(trade
        .deposit
        .iter()
        .chain(&trade.withdraw)
        .all(|amount| amount.abs() < 1e-5));
}

#[test]
fn test_constant_sum_pool_drains_but_stays_non_negative() {
    // constant sum trades 1:1, the product pool values asset 0 at 4 units of asset 1
    let problem = ArbitrageProblem::new(
        2,
        vec![
            Pool::constant_sum(vec![0, 1], vec![10.0, 10.0], 0.999),
            Pool::geometric_mean(vec![0, 1], vec![10.0, 40.0], 0.997),
        ],
        vec![2.0, 1.0],
    );
    let solution = solve_arbitrage(&problem, &solver()).unwrap();

    assert_eq!(solution.status, SolveStatus::Optimal);
    assert!(solution.objective_value.unwrap() > 0.0);
    assert!(solution.verify(&problem, TOLERANCE).unwrap().is_empty());

    let stable = &problem.pools()[0];
    let post = stable.post_trade_reserves(&solution.trades[0].deposit, &solution.trades[0].withdraw);
    assert!(post[0] >= -TOLERANCE);
    // most of asset 0 leaves the constant-sum pool
    assert!(post[0] < 5.0, "post-trade reserves {:?}", post);
}

#[test]
fn test_weighted_three_asset_pool_with_product_pool() {
    let problem = ArbitrageProblem::new(
        3,
        vec![
            Pool::weighted(vec![0, 1, 2], vec![50.0, 20.0, 30.0], 0.998, vec![5, 2, 3]),
            Pool::geometric_mean(vec![1, 2], vec![10.0, 30.0], 0.997),
        ],
        vec![1.0, 2.0, 1.0],
    );
    let solution = solve_arbitrage(&problem, &solver()).unwrap();

    assert_eq!(solution.status, SolveStatus::Optimal);
    assert!(solution.objective_value.unwrap() >= -TOLERANCE);
    assert!(solution.verify(&problem, TOLERANCE).unwrap().is_empty());
}

#[test]
fn test_objective_never_negative() {
    // prices consistent with every pool: the best any trade set can do is zero
    let problem = ArbitrageProblem::new(
        3,
        vec![
            Pool::geometric_mean(vec![0, 1], vec![20.0, 10.0], 0.997),
            Pool::geometric_mean(vec![1, 2], vec![10.0, 40.0], 0.997),
        ],
        vec![1.0, 2.0, 0.5],
    );
    let solution = solve_arbitrage(&problem, &solver()).unwrap();

    assert_eq!(solution.status, SolveStatus::Optimal);
    let objective = solution.objective_value.unwrap();
    assert!(objective >= -TOLERANCE);
    assert!(objective < 1e-5);
}

#[test]
fn test_iteration_cap_is_reported_verbatim() {
    let settings = SolverSettings {
        max_iter: 1,
        ..SolverSettings::default()
    };
    let solution = solve_arbitrage(&reference_problem(), &ClarabelSolver::new(settings)).unwrap();

    assert!(matches!(solution.status, SolveStatus::SolverError(_)));
    assert!(solution.trades.is_empty());
    assert!(solution.objective_value.is_none());
}

#[test]
fn test_invalid_problem_never_reaches_solver() {
    let problem = ArbitrageProblem::new(
        2,
        vec![Pool::geometric_mean(vec![0, 1], vec![10.0, 10.0], 0.997)],
        vec![1.0],
    );
    assert!(matches!(
        solve_arbitrage(&problem, &solver()),
        Err(ArbitrageError::LengthMismatch { expected: 2, actual: 1, .. })
    ));
}

fn usdc_eth_problem(scale: f64) -> ArbitrageProblem {
    ArbitrageProblem::new(
        2,
        vec![
            Pool::geometric_mean(vec![0, 1], vec![2.4 * scale, 1e-3 * scale], 0.997),
            Pool::geometric_mean(vec![0, 1], vec![2.5 * scale, 1e-3 * scale], 0.997),
        ],
        vec![1.0, 2450.0],
    )
}

#[test]
fn test_on_chain_reserve_magnitudes_solve() {
    let unit = solve_arbitrage(&usdc_eth_problem(1.0), &solver()).unwrap();
    assert_eq!(unit.status, SolveStatus::Optimal);
    let unit_objective = unit.objective_value.unwrap();
    assert!(unit_objective > 0.0);

    let scale = 1e9;
    let problem = usdc_eth_problem(scale);
    let solution = solve_arbitrage(&problem, &solver()).unwrap();

    assert_eq!(solution.status, SolveStatus::Optimal);
    assert!(solution.verify(&problem, TOLERANCE).unwrap().is_empty());
    // extracted value grows linearly with the reserves
    let scaled_objective = solution.objective_value.unwrap() / scale;
    assert!(
        (scaled_objective - unit_objective).abs() < 1e-3 * unit_objective,
        "unit {} scaled {}",
        unit_objective,
        scaled_objective
    );
}
