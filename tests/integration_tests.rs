use amm_arbitrage_optimizer::*;
use std::sync::Arc;

const REFERENCE_FILE: &str = "data/reference_problem.json";

#[test]
fn test_reference_file_end_to_end() {
    let file = load_problem(REFERENCE_FILE).unwrap();
    assert_eq!(file.problem.num_assets(), 4);
    assert_eq!(file.problem.num_pools(), 5);
    assert_eq!(
        file.problem.pools()[4].label.as_deref(),
        Some("CONSTANT SUM 2/3")
    );

    let settings = file.solver.clone().unwrap_or_default();
    let optimizer = ArbitrageOptimizer::new(Arc::new(ClarabelSolver::new(settings)))
        .with_execution_config(file.execution.clone().unwrap_or_default());
    let report = optimizer.solve_with_report(&file.problem).unwrap();

    assert_eq!(report.status, SolveStatus::Optimal);
    assert!(report.objective_value.unwrap() > 0.0);
    assert_eq!(report.pools.len(), 5);
    for pool in &report.pools {
        assert!(pool.invariant_after >= pool.invariant_before * (1.0 - 1e-6) - 1e-6);
    }
    assert_eq!(report.psi.len(), 4);
    assert_eq!(report.psi[1].symbol, "TOKEN-1");
}

#[test]
fn test_report_round_trips_through_json() {
    let file = load_problem(REFERENCE_FILE).unwrap();
    let optimizer = ArbitrageOptimizer::new(Arc::new(ClarabelSolver::default()));
    let report = optimizer.solve_with_report(&file.problem).unwrap();

    let path = std::env::temp_dir().join(format!(
        "amm-arbitrage-report-{}.json",
        std::process::id()
    ));
    write_report(&path, &report).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["status"], "optimal");
    assert_eq!(value["pools"].as_array().unwrap().len(), 5);
    assert!(value["execution"]["required_value"].as_f64().unwrap() >= 0.0);

    let parsed: SolveReport = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.status, report.status);
    assert_eq!(parsed.execution.order, report.execution.order);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_problem_serializes_back_to_json() {
    let file = load_problem(REFERENCE_FILE).unwrap();
    let json = serde_json::to_string(&file.problem).unwrap();
    let restored: ArbitrageProblem = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, file.problem);
}

#[test]
fn test_missing_file_is_io_error() {
    assert!(matches!(
        load_problem("data/does_not_exist.json"),
        Err(ArbitrageError::IoError(_))
    ));
}

#[test]
fn test_verification_and_metrics_together() {
    let file = load_problem(REFERENCE_FILE).unwrap();
    let solver = ClarabelSolver::default();
    let solution = solve_arbitrage(&file.problem, &solver).unwrap();

    assert!(solution.verify(&file.problem, 1e-6).unwrap().is_empty());

    let metrics = SolveMetrics::new();
    metrics.record(&solution.status, std::time::Duration::from_millis(1));
    let exported = MetricsExporter::default().export_prometheus(&metrics.snapshot());
    assert!(exported.contains("arbitrage_solves_total{status=\"optimal\"} 1"));
}
