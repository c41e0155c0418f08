use crate::domain::execution::ExecutionPlan;
use crate::domain::problem::ArbitrageProblem;
use crate::domain::solution::*;
use crate::domain::types::*;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Per-pool section of a [`SolveReport`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolReport {
    pub pool: usize,
    pub name: String,
    pub invariant: String,
    pub assets: Vec<String>,
    pub deposit: Vec<f64>,
    pub withdraw: Vec<f64>,
    pub post_trade_reserves: Vec<f64>,
    pub invariant_before: f64,
    pub invariant_after: f64,
    /// Market value taken out of the pool, `(withdraw - deposit) · prices`
    pub net_value: f64,
}

/// One component of the extraction vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAsset {
    pub asset: AssetIndex,
    pub symbol: String,
    pub amount: f64,
    pub value: f64,
}

/// Everything known about one solve, ready to log or persist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    pub solved_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<Timestamp>,
    pub elapsed_ms: f64,
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    pub psi: Vec<ExtractedAsset>,
    pub pools: Vec<PoolReport>,
    pub execution: ExecutionPlan,
}

impl SolveReport {
    pub fn new(
        problem: &ArbitrageProblem,
        solution: &ArbitrageSolution,
        execution: ExecutionPlan,
        elapsed: Duration,
    ) -> ArbitrageResult<Self> {
        let psi = solution
            .psi
            .iter()
            .zip(problem.market_value())
            .enumerate()
            .map(|(asset, (&amount, &price))| ExtractedAsset {
                asset: AssetIndex(asset),
                symbol: problem.asset_name(AssetIndex(asset)),
                amount,
                value: amount * price,
            })
            .collect();

        let pools = problem
            .pools()
            .iter()
            .zip(solution.trades.iter().zip(&solution.incidences))
            .enumerate()
            .map(|(position, (pool, (trade, incidence)))| -> ArbitrageResult<PoolReport> {
                let post_trade_reserves = pool.post_trade_reserves(&trade.deposit, &trade.withdraw);
                let prices = incidence.to_local(problem.market_value())?;
                let net_value = trade
                    .net_flow()
                    .iter()
                    .zip(&prices)
                    .map(|(amount, price)| amount * price)
                    .sum::<f64>();
                Ok(PoolReport {
                    pool: position,
                    name: pool.display_name(position),
                    invariant: pool.invariant.kind().to_string(),
                    assets: pool
                        .local_to_global
                        .iter()
                        .map(|&index| problem.asset_name(index))
                        .collect(),
                    deposit: trade.deposit.clone(),
                    withdraw: trade.withdraw.clone(),
                    invariant_before: pool.invariant_value(),
                    invariant_after: pool.invariant.value(&post_trade_reserves),
                    post_trade_reserves,
                    net_value,
                })
            })
            .collect::<ArbitrageResult<Vec<_>>>()?;

        Ok(Self {
            solved_at: Utc::now(),
            observed_at: problem.observed_at(),
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            status: solution.status.clone(),
            objective_value: solution.objective_value,
            psi,
            pools,
            execution,
        })
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> ArbitrageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Status: {} ({:.3} ms, solved at {})",
            self.status,
            self.elapsed_ms,
            self.solved_at.to_rfc3339()
        )?;
        if let Some(objective) = self.objective_value {
            writeln!(f, "Objective (market value extracted): {:.6}", objective)?;
        }
        for pool in &self.pools {
            writeln!(f, "{} [{}] {:?}", pool.name, pool.invariant, pool.assets)?;
            writeln!(f, "  deposit   {:?}", pool.deposit)?;
            writeln!(f, "  withdraw  {:?}", pool.withdraw)?;
            writeln!(
                f,
                "  invariant {:.6} -> {:.6}",
                pool.invariant_before, pool.invariant_after
            )?;
            writeln!(f, "  net value {:.6}", pool.net_value)?;
        }
        for extracted in &self.psi {
            writeln!(
                f,
                "psi {:<10} {:>14.6} (value {:.6})",
                extracted.symbol, extracted.amount, extracted.value
            )?;
        }
        write!(f, "{}", self.execution)
    }
}
