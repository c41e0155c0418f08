use crate::domain::{optimizer::ArbitrageOptimizer, problem::ArbitrageProblem, report::*, types::*};
use crate::infrastructure::metrics::SolveMetrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Runs independent problems concurrently on the blocking pool
///
/// Tasks share nothing mutable except the metrics counters. Results come back
/// in submission order whatever order the tasks finish in.
pub struct BatchOptimizer {
    optimizer: ArbitrageOptimizer,
    metrics: Arc<SolveMetrics>,
    /// Upper bound on solves in flight
    max_in_flight: usize,
}

impl BatchOptimizer {
    /// Create a batch optimizer with one solve in flight per available core
    pub fn new(optimizer: ArbitrageOptimizer, metrics: Arc<SolveMetrics>) -> Self {
        let max_in_flight = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::with_max_in_flight(optimizer, metrics, max_in_flight)
    }

    /// Create a batch optimizer with a custom concurrency bound
    pub fn with_max_in_flight(
        optimizer: ArbitrageOptimizer,
        metrics: Arc<SolveMetrics>,
        max_in_flight: usize,
    ) -> Self {
        Self {
            optimizer,
            metrics,
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn metrics(&self) -> &Arc<SolveMetrics> {
        &self.metrics
    }

    /// Solve every problem, one report or error per problem in submission order
    pub async fn solve_all(
        &self,
        problems: Vec<ArbitrageProblem>,
    ) -> Vec<ArbitrageResult<SolveReport>> {
        info!(
            "Starting batch of {} problems with {} in flight",
            problems.len(),
            self.max_in_flight
        );

        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut handles = Vec::with_capacity(problems.len());

        for (task_id, problem) in problems.into_iter().enumerate() {
            let optimizer = self.optimizer.clone();
            let metrics = Arc::clone(&self.metrics);
            let permits = Arc::clone(&permits);

            let handle: JoinHandle<ArbitrageResult<SolveReport>> = tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| ArbitrageError::TaskFailed(e.to_string()))?;
                tokio::task::spawn_blocking(move || {
                    let result = optimizer.solve_with_report(&problem);
                    match &result {
                        Ok(report) => metrics.record(
                            &report.status,
                            Duration::from_secs_f64(report.elapsed_ms / 1000.0),
                        ),
                        Err(e) if e.is_configuration_error() => metrics.record_rejected(),
                        Err(_) => metrics.record_failed(),
                    }
                    result
                })
                .await
                .map_err(|e| ArbitrageError::TaskFailed(format!("task {}: {}", task_id, e)))?
            });

            handles.push(handle);
        }

        let mut results = Vec::with_capacity(handles.len());
        for (task_id, handle) in handles.into_iter().enumerate() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(ArbitrageError::TaskFailed(format!("task {}: {}", task_id, e))),
            };
            if let Err(e) = &result {
                if matches!(e, ArbitrageError::TaskFailed(_)) {
                    self.metrics.record_failed();
                }
                error!("Batch task {} failed: {}", task_id, e);
            }
            results.push(result);
        }

        let snapshot = self.metrics.snapshot();
        info!(
            "Batch completed: {} solves so far, {:.1}% optimal, {} rejected, {} failed",
            snapshot.total_solves(),
            snapshot.optimal_rate(),
            snapshot.rejected,
            snapshot.failed
        );
        results
    }

    /// Solve one sub-problem per pool selection of `problem`
    ///
    /// A selection naming a missing pool yields an error in its slot; the
    /// other selections are still solved.
    pub async fn solve_subsets(
        &self,
        problem: &ArbitrageProblem,
        selections: &[Vec<usize>],
    ) -> Vec<ArbitrageResult<SolveReport>> {
        let mut results: Vec<Option<ArbitrageResult<SolveReport>>> = Vec::new();
        let mut problems = Vec::new();
        for selection in selections {
            match problem.subset(selection) {
                Ok(subset) => {
                    problems.push(subset);
                    results.push(None);
                }
                Err(e) => {
                    self.metrics.record_rejected();
                    results.push(Some(Err(e)));
                }
            }
        }

        let mut solved = self.solve_all(problems).await.into_iter();
        results
            .into_iter()
            .map(|slot| match slot {
                Some(rejected) => rejected,
                None => solved
                    .next()
                    .unwrap_or_else(|| Err(ArbitrageError::TaskFailed("missing result".to_string()))),
            })
            .collect()
    }
}

/// Best optimal report of a batch by objective value
pub fn best_report(results: &[ArbitrageResult<SolveReport>]) -> Option<(usize, &SolveReport)> {
    results
        .iter()
        .enumerate()
        .filter_map(|(index, result)| result.as_ref().ok().map(|report| (index, report)))
        .filter(|(_, report)| report.status.is_optimal())
        .fold(None, |best: Option<(usize, &SolveReport)>, (index, report)| {
            let value = report.objective_value.unwrap_or(f64::NEG_INFINITY);
            match best {
                Some((_, current))
                    if current.objective_value.unwrap_or(f64::NEG_INFINITY) >= value =>
                {
                    best
                }
                _ => Some((index, report)),
            }
        })
}
