use crate::infrastructure::metrics::collector::MetricsSnapshot;
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};

/// Metrics exporter for external monitoring systems
#[derive(Debug, Clone)]
pub struct MetricsExporter {
    start_time: Instant,
    prefix: String,
}

impl MetricsExporter {
    /// Creates a new exporter whose metric names start with `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            prefix: prefix.into(),
        }
    }

    /// Returns the uptime since exporter creation
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self, snapshot: &MetricsSnapshot) -> String {
        let mut output = String::new();

        let name = format!("{}_solves_total", self.prefix);
        output.push_str(&format!("# TYPE {} counter\n", name));
        for (status, count) in [
            ("optimal", snapshot.optimal),
            ("infeasible", snapshot.infeasible),
            ("unbounded", snapshot.unbounded),
            ("solver_error", snapshot.solver_error),
        ] {
            output.push_str(&format!("{}{{status=\"{}\"}} {}\n", name, status, count));
        }

        for (suffix, kind, value) in [
            ("rejected_total", "counter", snapshot.rejected as f64),
            ("failed_total", "counter", snapshot.failed as f64),
            ("solve_seconds_total", "counter", snapshot.total_solve_seconds),
            ("uptime_seconds", "gauge", self.uptime().as_secs_f64()),
        ] {
            output.push_str(&format!("# TYPE {}_{} {}\n", self.prefix, suffix, kind));
            output.push_str(&format!("{}_{} {}\n", self.prefix, suffix, value));
        }

        output
    }

    /// Export metrics in JSON format
    pub fn export_json(&self, snapshot: &MetricsSnapshot) -> Result<String, serde_json::Error> {
        let export_data = MetricsExport {
            timestamp: chrono::Utc::now(),
            uptime_seconds: self.uptime().as_secs(),
            metrics: snapshot.clone(),
        };

        serde_json::to_string_pretty(&export_data)
    }
}

impl Default for MetricsExporter {
    fn default() -> Self {
        Self::new("arbitrage")
    }
}

/// Metrics export data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsExport {
    /// Timestamp when metrics were exported
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Exporter uptime in seconds
    pub uptime_seconds: u64,
    pub metrics: MetricsSnapshot,
}
