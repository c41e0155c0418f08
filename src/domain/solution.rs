use crate::domain::incidence::Incidence;
use crate::domain::problem::ArbitrageProblem;
use crate::domain::types::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Termination status of one solve, reported verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Any other termination, with the backend's own description
    SolverError(String),
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }

    /// Stable label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::SolverError(_) => "solver_error",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::SolverError(reason) => write!(f, "solver error ({})", reason),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// Optimal trade of one pool in its local slot order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolTrade {
    pub deposit: Vec<f64>,
    pub withdraw: Vec<f64>,
}

impl PoolTrade {
    /// Zero trade of the given arity
    pub fn zero(arity: usize) -> Self {
        Self {
            deposit: vec![0.0; arity],
            withdraw: vec![0.0; arity],
        }
    }

    /// Net local flow to the trader, `withdraw − deposit`
    pub fn net_flow(&self) -> Vec<f64> {
        self.withdraw
            .iter()
            .zip(&self.deposit)
            .map(|(w, d)| w - d)
            .collect()
    }

    /// Whether any leg exceeds `threshold`
    pub fn is_active(&self, threshold: f64) -> bool {
        self.deposit
            .iter()
            .chain(&self.withdraw)
            .any(|amount| amount.abs() > threshold)
    }
}

/// A property of the solution that fails beyond the tolerance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Violation {
    NegativeDeposit { pool: usize, slot: usize, value: f64 },
    NegativeWithdraw { pool: usize, slot: usize, value: f64 },
    NegativePostTradeReserve { pool: usize, slot: usize, value: f64 },
    InvariantDecreased { pool: usize, before: f64, after: f64 },
    NegativeExtraction { asset: usize, value: f64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NegativeDeposit { pool, slot, value } => {
                write!(f, "pool {} deposit[{}] = {:e}", pool, slot, value)
            }
            Violation::NegativeWithdraw { pool, slot, value } => {
                write!(f, "pool {} withdraw[{}] = {:e}", pool, slot, value)
            }
            Violation::NegativePostTradeReserve { pool, slot, value } => {
                write!(f, "pool {} post-trade reserve[{}] = {:e}", pool, slot, value)
            }
            Violation::InvariantDecreased { pool, before, after } => {
                write!(f, "pool {} invariant fell from {} to {}", pool, before, after)
            }
            Violation::NegativeExtraction { asset, value } => {
                write!(f, "psi[{}] = {:e}", asset, value)
            }
        }
    }
}

/// Outcome of one solve
#[derive(Debug, Clone)]
pub struct ArbitrageSolution {
    pub status: SolveStatus,
    /// Per-pool trades, empty unless optimal
    pub trades: Vec<PoolTrade>,
    /// Extraction vector in global space, empty unless optimal
    pub psi: Vec<f64>,
    /// `market_value · psi` at the optimum
    pub objective_value: Option<f64>,
    /// Incidence relation per pool
    pub incidences: Vec<Incidence>,
}

impl ArbitrageSolution {
    /// Solution carrying only a non-optimal status
    pub fn without_values(status: SolveStatus, incidences: Vec<Incidence>) -> Self {
        Self {
            status,
            trades: Vec::new(),
            psi: Vec::new(),
            objective_value: None,
            incidences,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    /// Market value of every asset in `psi`
    pub fn psi_value(&self, market_value: &[f64]) -> Vec<f64> {
        self.psi
            .iter()
            .zip(market_value)
            .map(|(amount, price)| amount * price)
            .collect()
    }

    /// Checks every feasibility property against `tolerance`
    ///
    /// Non-negativity allows values down to `-tolerance`; invariants may drop
    /// by at most `tolerance` relative to their pre-trade value.
    pub fn verify(
        &self,
        problem: &ArbitrageProblem,
        tolerance: f64,
    ) -> ArbitrageResult<Vec<Violation>> {
        if !self.is_optimal() {
            return Ok(Vec::new());
        }
        if self.trades.len() != problem.num_pools() {
            return Err(ArbitrageError::length_mismatch(
                "pool trades",
                problem.num_pools(),
                self.trades.len(),
            ));
        }

        let mut violations = Vec::new();
        for (position, (pool, trade)) in problem.pools().iter().zip(&self.trades).enumerate() {
            for (slot, &value) in trade.deposit.iter().enumerate() {
                if value < -tolerance {
                    violations.push(Violation::NegativeDeposit { pool: position, slot, value });
                }
            }
            for (slot, &value) in trade.withdraw.iter().enumerate() {
                if value < -tolerance {
                    violations.push(Violation::NegativeWithdraw { pool: position, slot, value });
                }
            }

            let post = pool.post_trade_reserves(&trade.deposit, &trade.withdraw);
            for (slot, &value) in post.iter().enumerate() {
                if value < -tolerance {
                    violations.push(Violation::NegativePostTradeReserve {
                        pool: position,
                        slot,
                        value,
                    });
                }
            }

            let before = pool.invariant_value();
            let after = pool.invariant.value(&post);
            if after < before - tolerance * before.abs().max(1.0) {
                violations.push(Violation::InvariantDecreased {
                    pool: position,
                    before,
                    after,
                });
            }
        }

        for (asset, &value) in self.psi.iter().enumerate() {
            if value < -tolerance {
                violations.push(Violation::NegativeExtraction { asset, value });
            }
        }

        Ok(violations)
    }
}
