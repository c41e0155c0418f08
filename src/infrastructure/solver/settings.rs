use crate::domain::types::*;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Numerical settings handed to the conic solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub max_iter: u32,
    /// Wall-clock limit per solve, unlimited when absent
    pub time_limit_secs: Option<f64>,
    pub tol_gap_abs: f64,
    pub tol_gap_rel: f64,
    pub tol_feas: f64,
    pub verbose: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iter: 200,
            time_limit_secs: None,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
            tol_feas: 1e-8,
            verbose: false,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> ArbitrageResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ArbitrageError::ParseError(format!("invalid value for {}: {:?}", name, raw)))
}

impl SolverSettings {
    /// Applies `ARB_SOLVER_*` environment overrides
    ///
    /// Environment variables:
    /// - ARB_SOLVER_MAX_ITER: iteration cap
    /// - ARB_SOLVER_TIME_LIMIT: seconds per solve
    /// - ARB_SOLVER_TOL_FEAS: feasibility tolerance
    /// - ARB_SOLVER_VERBOSE: true/false
    pub fn with_env_overrides(self) -> ArbitrageResult<Self> {
        self.with_overrides(|name| env::var(name).ok())
    }

    /// Applies overrides from any key lookup
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ArbitrageResult<Self> {
        if let Some(raw) = lookup("ARB_SOLVER_MAX_ITER") {
            self.max_iter = parse_var("ARB_SOLVER_MAX_ITER", &raw)?;
        }
        if let Some(raw) = lookup("ARB_SOLVER_TIME_LIMIT") {
            self.time_limit_secs = Some(parse_var("ARB_SOLVER_TIME_LIMIT", &raw)?);
        }
        if let Some(raw) = lookup("ARB_SOLVER_TOL_FEAS") {
            self.tol_feas = parse_var("ARB_SOLVER_TOL_FEAS", &raw)?;
        }
        if let Some(raw) = lookup("ARB_SOLVER_VERBOSE") {
            self.verbose = parse_var("ARB_SOLVER_VERBOSE", &raw.to_ascii_lowercase())?;
        }
        Ok(self)
    }
}
