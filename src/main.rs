//! # AMM Arbitrage Optimizer
//!
//! Loads a problem file, solves it once, and logs the report and execution plan.
//!
//! Usage: `amm-arbitrage-optimizer [PROBLEM_JSON] [REPORT_JSON]`

use amm_arbitrage_optimizer::utils::logger::setup_logger;
use amm_arbitrage_optimizer::*;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_PROBLEM: &str = "data/reference_problem.json";

fn main() -> anyhow::Result<()> {
    setup_logger().map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;
    info!("Starting AMM Arbitrage Optimizer v{}", VERSION);

    let mut args = std::env::args().skip(1);
    let problem_path = args.next().unwrap_or_else(|| DEFAULT_PROBLEM.to_string());
    let report_path = args.next();

    info!("Loading problem from {}...", problem_path);
    let file = load_problem(&problem_path)
        .with_context(|| format!("Failed to load problem from {}", problem_path))?;
    info!(
        "Loaded {} pools over {} assets",
        file.problem.num_pools(),
        file.problem.num_assets()
    );

    let settings = file
        .solver
        .clone()
        .unwrap_or_default()
        .with_env_overrides()
        .context("Invalid solver settings")?;
    let optimizer = ArbitrageOptimizer::new(Arc::new(ClarabelSolver::new(settings)))
        .with_execution_config(file.execution.clone().unwrap_or_default());

    info!("Solving with {}", optimizer.solver_name());

    let metrics = SolveMetrics::new();
    let report = optimizer.solve_with_report(&file.problem)?;
    metrics.record(
        &report.status,
        Duration::from_secs_f64(report.elapsed_ms / 1000.0),
    );

    info!("Solve report:\n{}", report);
    if !report.status.is_optimal() {
        warn!("No optimal trade set found: {}", report.status);
    }

    if let Some(path) = report_path {
        write_report(&path, &report).with_context(|| format!("Failed to write report to {}", path))?;
        info!("Report written to {}", path);
    }

    info!(
        "Metrics:\n{}",
        MetricsExporter::default().export_prometheus(&metrics.snapshot())
    );
    Ok(())
}
