use crate::domain::solution::SolveStatus;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Thread-safe counters of solve outcomes
#[derive(Debug, Default)]
pub struct SolveMetrics {
    optimal: AtomicU64,
    infeasible: AtomicU64,
    unbounded: AtomicU64,
    solver_error: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
    solve_micros: AtomicU64,
}

impl SolveMetrics {
    /// Creates a new, zeroed collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finished solve
    pub fn record(&self, status: &SolveStatus, elapsed: Duration) {
        let counter = match status {
            SolveStatus::Optimal => &self.optimal,
            SolveStatus::Infeasible => &self.infeasible,
            SolveStatus::Unbounded => &self.unbounded,
            SolveStatus::SolverError(_) => &self.solver_error,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.solve_micros.fetch_add(micros, Ordering::Relaxed);
    }

    /// Records a problem rejected before solving
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a valid problem whose solve could not run (setup or task failure)
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        let optimal = self.optimal.load(Ordering::Relaxed);
        let infeasible = self.infeasible.load(Ordering::Relaxed);
        let unbounded = self.unbounded.load(Ordering::Relaxed);
        let solver_error = self.solver_error.load(Ordering::Relaxed);
        let solves = optimal + infeasible + unbounded + solver_error;
        let total_solve_seconds = self.solve_micros.load(Ordering::Relaxed) as f64 / 1e6;

        MetricsSnapshot {
            optimal,
            infeasible,
            unbounded,
            solver_error,
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            total_solve_seconds,
            mean_solve_ms: if solves > 0 {
                total_solve_seconds * 1000.0 / solves as f64
            } else {
                0.0
            },
        }
    }
}

/// Serializable view of [`SolveMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub optimal: u64,
    pub infeasible: u64,
    pub unbounded: u64,
    pub solver_error: u64,
    /// Problems that failed validation
    pub rejected: u64,
    /// Solves that never produced a status
    pub failed: u64,
    pub total_solve_seconds: f64,
    pub mean_solve_ms: f64,
}

impl MetricsSnapshot {
    /// Solves that reached the solver
    pub fn total_solves(&self) -> u64 {
        self.optimal + self.infeasible + self.unbounded + self.solver_error
    }

    /// Share of solves ending optimal, as a percentage
    pub fn optimal_rate(&self) -> f64 {
        let total = self.total_solves();
        if total > 0 {
            (self.optimal as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}
