use amm_arbitrage_optimizer::domain::{expr::*, objective::*};
use amm_arbitrage_optimizer::*;

fn reference_problem() -> ArbitrageProblem {
    ArbitrageProblem::from_parts(
        4,
        vec![vec![0, 1, 2, 3], vec![0, 1], vec![1, 2], vec![2, 3], vec![2, 3]],
        vec![
            vec![4.0, 4.0, 4.0, 4.0],
            vec![10.0, 1.0],
            vec![1.0, 5.0],
            vec![40.0, 50.0],
            vec![10.0, 10.0],
        ],
        vec![0.998, 0.997, 0.997, 0.997, 0.999],
        vec![
            Invariant::WeightedGeometricMean {
                weights: vec![4, 3, 2, 1],
            },
            Invariant::GeometricMean,
            Invariant::GeometricMean,
            Invariant::GeometricMean,
            Invariant::ConstantSum,
        ],
        vec![1.5, 10.0, 2.0, 3.0],
    )
    .unwrap()
}

#[test]
fn test_incidence_matrices_match_declared_indices() {
    let problem = reference_problem();
    let model = ArbitrageModel::build(&problem).unwrap();

    for (pool, incidence) in problem.pools().iter().zip(model.incidences()) {
        let matrix = incidence.matrix();
        assert_eq!(matrix.dim(), (4, pool.arity()));
        for (slot, index) in pool.local_to_global.iter().enumerate() {
            let column = matrix.column(slot);
            assert_eq!(column.sum(), 1.0);
            assert_eq!(column[index.0], 1.0);
        }
    }
}

#[test]
fn test_trade_variables_cover_every_slot() {
    let model = ArbitrageModel::build(&reference_problem()).unwrap();
    let arities: Vec<usize> = model.trades().iter().map(|t| t.deposit.len()).collect();

    assert_eq!(arities, vec![4, 2, 2, 2, 2]);
    assert!(model
        .trades()
        .iter()
        .all(|t| t.deposit.len() == t.withdraw.len()));
    // 2 · (4 + 2 + 2 + 2 + 2) decision variables
    assert_eq!(model.program().num_variables(), 24);
}

#[test]
fn test_psi_is_sum_of_lifted_flows() {
    let model = ArbitrageModel::build(&reference_problem()).unwrap();
    let trades = model.trades();

    // asset 2 is traded by the balancer pool and pools 2, 3 and 4
    let psi_2 = &model.psi()[2];
    assert_eq!(psi_2.coefficient(trades[0].withdraw[2]), 1.0);
    assert_eq!(psi_2.coefficient(trades[0].deposit[2]), -1.0);
    assert_eq!(psi_2.coefficient(trades[2].withdraw[1]), 1.0);
    assert_eq!(psi_2.coefficient(trades[3].deposit[0]), -1.0);
    assert_eq!(psi_2.coefficient(trades[4].withdraw[0]), 1.0);
    assert_eq!(psi_2.coefficient(trades[1].withdraw[0]), 0.0);
    assert_eq!(psi_2.terms().len(), 8);
}

#[test]
fn test_objective_weights_psi_by_market_value() {
    let problem = reference_problem();
    let model = ArbitrageModel::build(&problem).unwrap();
    let rebuilt = market_objective(problem.market_value(), model.psi());

    let mut values = vec![0.0; model.program().num_variables()];
    values[model.trades()[1].withdraw[1].0] = 2.0;
    values[model.trades()[1].deposit[0].0] = 3.0;

    // 2 units of asset 1 at 10, minus 3 units of asset 0 at 1.5
    assert!((model.program().objective().evaluate(&values) - 15.5).abs() < 1e-12);
    assert_eq!(rebuilt.evaluate(&values), model.program().objective().evaluate(&values));
}

#[test]
fn test_zero_trade_satisfies_every_constraint() {
    let model = ArbitrageModel::build(&reference_problem()).unwrap();
    let zeros = vec![0.0; model.program().num_variables()];
    assert!(model.program().max_violation(&zeros) < 1e-12);
}

#[test]
fn test_post_trade_reserves_apply_fee_to_deposits() {
    let model = ArbitrageModel::build(&reference_problem()).unwrap();
    let trade = &model.trades()[1];
    let mut values = vec![0.0; model.program().num_variables()];
    values[trade.deposit[0].0] = 1.0;
    values[trade.withdraw[1].0] = 0.05;

    let post = &model.post_trade()[1];
    assert!((post[0].evaluate(&values) - 10.997).abs() < 1e-12);
    assert!((post[1].evaluate(&values) - 0.95).abs() < 1e-12);
}

#[test]
fn test_configuration_errors_precede_model() {
    let cases = vec![
        (
            ArbitrageProblem::new(
                2,
                vec![Pool::geometric_mean(vec![0, 2], vec![1.0, 1.0], 0.997)],
                vec![1.0, 1.0],
            ),
            "index",
        ),
        (
            ArbitrageProblem::new(
                2,
                vec![Pool::geometric_mean(vec![1, 1], vec![1.0, 1.0], 0.997)],
                vec![1.0, 1.0],
            ),
            "duplicate",
        ),
        (
            ArbitrageProblem::new(
                2,
                vec![Pool::weighted(vec![0, 1], vec![1.0, 1.0], 0.997, vec![1])],
                vec![1.0, 1.0],
            ),
            "weights",
        ),
        (
            ArbitrageProblem::new(
                2,
                vec![Pool::constant_sum(vec![0, 1], vec![1.0, 1.0], 1.5)],
                vec![1.0, 1.0],
            ),
            "fee",
        ),
        (
            ArbitrageProblem::new(
                2,
                vec![Pool::constant_sum(vec![0, 1], vec![1.0, f64::NAN], 0.997)],
                vec![1.0, 1.0],
            ),
            "reserve",
        ),
        (
            ArbitrageProblem::new(
                2,
                vec![Pool::constant_sum(vec![0, 1], vec![1.0, 1.0], 0.997)],
                vec![1.0, f64::INFINITY],
            ),
            "price",
        ),
    ];

    for (problem, case) in cases {
        let err = ArbitrageModel::build(&problem).unwrap_err();
        assert!(err.is_configuration_error(), "{}: {}", case, err);
        let matched = match case {
            "index" => matches!(err, ArbitrageError::AssetIndexOutOfRange { .. }),
            "duplicate" => matches!(err, ArbitrageError::DuplicateAsset { .. }),
            "weights" => matches!(err, ArbitrageError::InvalidWeights { .. }),
            "fee" => matches!(err, ArbitrageError::InvalidFeeRetention { .. }),
            "reserve" => matches!(err, ArbitrageError::InvalidReserve { .. }),
            _ => matches!(err, ArbitrageError::InvalidMarketValue { .. }),
        };
        assert!(matched, "{}: unexpected error {}", case, err);
    }
}

#[test]
fn test_extraction_constraints_one_per_asset() {
    let model = ArbitrageModel::build(&reference_problem()).unwrap();
    assert_eq!(extraction_constraints(model.psi()).len(), 4);

    let geo_means = model
        .program()
        .constraints()
        .iter()
        .filter(|c| matches!(c, Constraint::GeoMeanAtLeast { .. }))
        .count();
    assert_eq!(geo_means, 4);
}
