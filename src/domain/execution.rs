//! Execution ordering of an optimal trade set
//!
//! The optimizer treats all pool trades as simultaneous. Executed one pool
//! at a time, some orderings need the trader to front assets that a later
//! pool would have paid out. This module picks the ordering that minimizes
//! that kick-start capital at market value.

use crate::domain::problem::ArbitrageProblem;
use crate::domain::solution::ArbitrageSolution;
use crate::domain::types::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Tunables of the ordering search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Trades at or below this amount are treated as zero
    pub dust_threshold: f64,
    /// Largest active pool count searched over every permutation
    pub max_exhaustive_pools: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            dust_threshold: 1e-6,
            max_exhaustive_pools: 8,
        }
    }
}

/// Amount of one global asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAmount {
    pub asset: AssetIndex,
    pub symbol: String,
    pub amount: f64,
}

/// One pool's step in the execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLeg {
    pub pool: usize,
    pub name: String,
    /// Assets handed to the pool (net negative flow)
    pub tendered: Vec<AssetAmount>,
    /// Assets taken from the pool (net positive flow)
    pub received: Vec<AssetAmount>,
}

/// Ordered execution of an optimal solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Pool indices in execution order, active pools only
    pub order: Vec<usize>,
    pub legs: Vec<ExecutionLeg>,
    /// Up-front capital per global asset
    pub required: Vec<f64>,
    pub required_value: f64,
    /// Net amount per global asset once every leg settled
    pub net_received: Vec<f64>,
    pub net_received_value: f64,
    /// Whether every ordering was searched
    pub exhaustive: bool,
}

/// Capital needed to run pool flows in `order`, per asset
///
/// Balances start at zero. Any shortfall is fronted by the trader and the
/// balance restarts from zero.
pub fn required_capital(order: &[usize], flows: &[Vec<f64>], num_assets: usize) -> Vec<f64> {
    let mut balance = vec![0.0; num_assets];
    let mut required = vec![0.0; num_assets];
    for &pool in order {
        apply_flow(&mut balance, &mut required, &flows[pool]);
    }
    required
}

fn apply_flow(balance: &mut [f64], required: &mut [f64], flow: &[f64]) {
    for ((held, needed), delta) in balance.iter_mut().zip(required.iter_mut()).zip(flow) {
        *held += delta;
        if *held < 0.0 {
            *needed -= *held;
            *held = 0.0;
        }
    }
}

fn value_of(amounts: &[f64], market_value: &[f64]) -> f64 {
    amounts.iter().zip(market_value).map(|(a, p)| a * p).sum()
}

/// Cheapest ordering over every permutation; ties keep the first found
fn exhaustive_order(active: &[usize], flows: &[Vec<f64>], market_value: &[f64]) -> Vec<usize> {
    let num_assets = market_value.len();
    active
        .iter()
        .copied()
        .permutations(active.len())
        .fold((Vec::new(), f64::INFINITY), |best, order| {
            let cost = value_of(&required_capital(&order, flows, num_assets), market_value);
            if cost < best.1 {
                (order, cost)
            } else {
                best
            }
        })
        .0
}

/// Repeatedly appends the pool that adds the least capital value
fn greedy_order(active: &[usize], flows: &[Vec<f64>], market_value: &[f64]) -> Vec<usize> {
    let num_assets = market_value.len();
    let mut remaining = active.to_vec();
    let mut order = Vec::with_capacity(active.len());
    let mut balance = vec![0.0; num_assets];
    let mut required = vec![0.0; num_assets];

    while !remaining.is_empty() {
        let mut best = (0, f64::INFINITY);
        for (position, &pool) in remaining.iter().enumerate() {
            let mut trial_balance = balance.clone();
            let mut added = vec![0.0; num_assets];
            apply_flow(&mut trial_balance, &mut added, &flows[pool]);
            let cost = value_of(&added, market_value);
            if cost < best.1 {
                best = (position, cost);
            }
        }
        let pool = remaining.remove(best.0);
        apply_flow(&mut balance, &mut required, &flows[pool]);
        order.push(pool);
    }
    order
}

impl ExecutionPlan {
    /// Orders the active pools of an optimal solution
    ///
    /// A non-optimal solution yields an empty plan. The solution must cover
    /// exactly the problem's pools.
    pub fn build(
        problem: &ArbitrageProblem,
        solution: &ArbitrageSolution,
        config: &ExecutionConfig,
    ) -> ArbitrageResult<Self> {
        let num_assets = problem.num_assets();
        if !solution.is_optimal() {
            return Ok(Self::empty(num_assets));
        }
        for (what, actual) in [
            ("pool trades", solution.trades.len()),
            ("pool incidences", solution.incidences.len()),
        ] {
            if actual != problem.num_pools() {
                return Err(ArbitrageError::length_mismatch(what, problem.num_pools(), actual));
            }
        }

        let flows = solution
            .trades
            .iter()
            .zip(&solution.incidences)
            .map(|(trade, incidence)| -> ArbitrageResult<Vec<f64>> {
                let flow = trade
                    .net_flow()
                    .into_iter()
                    .map(|amount| if amount.abs() > config.dust_threshold { amount } else { 0.0 })
                    .collect::<Vec<_>>();
                Ok(incidence.to_global(&flow)?.to_vec())
            })
            .collect::<ArbitrageResult<Vec<_>>>()?;

        let active: Vec<usize> = solution
            .trades
            .iter()
            .enumerate()
            .filter(|(_, trade)| trade.is_active(config.dust_threshold))
            .map(|(pool, _)| pool)
            .collect();

        let exhaustive = active.len() <= config.max_exhaustive_pools;
        let market_value = problem.market_value();
        let order = if exhaustive {
            exhaustive_order(&active, &flows, market_value)
        } else {
            greedy_order(&active, &flows, market_value)
        };

        let required = required_capital(&order, &flows, num_assets);
        let net_received = flows.iter().fold(vec![0.0; num_assets], |mut acc, flow| {
            acc.iter_mut().zip(flow).for_each(|(total, delta)| *total += delta);
            acc
        });

        let amounts = |filter: fn(f64) -> bool, flow: &[f64]| -> Vec<AssetAmount> {
            flow.iter()
                .enumerate()
                .filter(|(_, amount)| filter(**amount))
                .map(|(asset, &amount)| AssetAmount {
                    asset: AssetIndex(asset),
                    symbol: problem.asset_name(AssetIndex(asset)),
                    amount: amount.abs(),
                })
                .collect()
        };
        let legs = order
            .iter()
            .map(|&pool| ExecutionLeg {
                pool,
                name: problem.pools()[pool].display_name(pool),
                tendered: amounts(|a| a < 0.0, &flows[pool]),
                received: amounts(|a| a > 0.0, &flows[pool]),
            })
            .collect();

        debug!(
            "Execution order {:?} over {} active pools ({})",
            order,
            active.len(),
            if exhaustive { "exhaustive" } else { "greedy" }
        );

        Ok(Self {
            order,
            legs,
            required_value: value_of(&required, market_value),
            required,
            net_received_value: value_of(&net_received, market_value),
            net_received,
            exhaustive,
        })
    }

    fn empty(num_assets: usize) -> Self {
        Self {
            order: Vec::new(),
            legs: Vec::new(),
            required: vec![0.0; num_assets],
            required_value: 0.0,
            net_received: vec![0.0; num_assets],
            net_received_value: 0.0,
            exhaustive: true,
        }
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Execution order ({} search over {} pools):",
            if self.exhaustive { "exhaustive" } else { "greedy" },
            self.order.len()
        )?;
        for (step, leg) in self.legs.iter().enumerate() {
            writeln!(f, "  {}. {}", step + 1, leg.name)?;
            for amount in &leg.tendered {
                writeln!(f, "       TENDERING {:>14.6} {}", amount.amount, amount.symbol)?;
            }
            for amount in &leg.received {
                writeln!(f, "       RECEIVING {:>14.6} {}", amount.amount, amount.symbol)?;
            }
        }
        writeln!(f, "Required kick-start tokens: {:?}", self.required)?;
        writeln!(f, "Required kick-start value:  {:.6}", self.required_value)?;
        writeln!(f, "Net received tokens:        {:?}", self.net_received)?;
        write!(f, "Net received value:         {:.6}", self.net_received_value)
    }
}
