use crate::domain::incidence::Incidence;
use crate::domain::invariant::Invariant;
use crate::domain::pool::Pool;
use crate::domain::types::*;
use serde::{Deserialize, Serialize};

/// Fully observed arbitrage instance: pools, global asset space and prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageProblem {
    num_assets: usize,
    /// Optional asset symbols, one per global index
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    symbols: Vec<AssetSymbol>,
    pools: Vec<Pool>,
    market_value: Vec<f64>,
    /// When the reserves were observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    observed_at: Option<Timestamp>,
}

impl ArbitrageProblem {
    /// Creates a problem over `num_assets` global assets
    pub fn new(num_assets: usize, pools: Vec<Pool>, market_value: Vec<f64>) -> Self {
        Self {
            num_assets,
            symbols: Vec::new(),
            pools,
            market_value,
            observed_at: None,
        }
    }

    /// Builds a problem from parallel per-pool inputs
    ///
    /// Mirrors the positional interface: every per-pool list must have one
    /// entry per pool, and `market_value` one entry per global asset.
    pub fn from_parts(
        num_assets: usize,
        local_indices: Vec<Vec<usize>>,
        reserves: Vec<Vec<f64>>,
        fees: Vec<f64>,
        invariants: Vec<Invariant>,
        market_value: Vec<f64>,
    ) -> ArbitrageResult<Self> {
        let num_pools = local_indices.len();
        for (what, len) in [
            ("reserves", reserves.len()),
            ("fees", fees.len()),
            ("invariants", invariants.len()),
        ] {
            if len != num_pools {
                return Err(ArbitrageError::length_mismatch(what, num_pools, len));
            }
        }

        let pools = local_indices
            .into_iter()
            .zip(reserves)
            .zip(fees.into_iter().zip(invariants))
            .map(|((indices, reserves), (fee, invariant))| {
                Pool::new(indices, reserves, fee, invariant)
            })
            .collect();

        let problem = Self::new(num_assets, pools, market_value);
        problem.validate()?;
        Ok(problem)
    }

    /// Attaches asset symbols
    pub fn with_symbols(mut self, symbols: Vec<AssetSymbol>) -> Self {
        self.symbols = symbols;
        self
    }

    /// Attaches the observation timestamp
    pub fn with_observed_at(mut self, observed_at: Timestamp) -> Self {
        self.observed_at = Some(observed_at);
        self
    }

    /// Size of the global asset space
    pub fn num_assets(&self) -> usize {
        self.num_assets
    }

    /// Number of pools
    pub fn num_pools(&self) -> usize {
        self.pools.len()
    }

    /// All pools in order
    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    /// Market value of every global asset
    pub fn market_value(&self) -> &[f64] {
        &self.market_value
    }

    /// Asset symbols, empty when none were supplied
    pub fn symbols(&self) -> &[AssetSymbol] {
        &self.symbols
    }

    /// Observation timestamp, if known
    pub fn observed_at(&self) -> Option<Timestamp> {
        self.observed_at
    }

    /// Symbol of a global asset, or a positional name
    pub fn asset_name(&self, asset: AssetIndex) -> String {
        self.symbols
            .get(asset.0)
            .map(|s| s.0.clone())
            .unwrap_or_else(|| format!("TOKEN-{}", asset.0))
    }

    /// Checks every configuration rule and builds the incidence relations
    ///
    /// Fails on the first violation; nothing is solved for an invalid problem.
    pub fn validate(&self) -> ArbitrageResult<Vec<Incidence>> {
        if self.market_value.len() != self.num_assets {
            return Err(ArbitrageError::length_mismatch(
                "market value",
                self.num_assets,
                self.market_value.len(),
            ));
        }
        if !self.symbols.is_empty() && self.symbols.len() != self.num_assets {
            return Err(ArbitrageError::length_mismatch(
                "asset symbols",
                self.num_assets,
                self.symbols.len(),
            ));
        }
        if let Some((asset, &value)) = self
            .market_value
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(ArbitrageError::InvalidMarketValue { asset, value });
        }

        self.pools
            .iter()
            .enumerate()
            .map(|(position, pool)| pool.validate(position, self.num_assets))
            .collect()
    }

    /// Sub-problem restricted to the selected pools, keeping the asset space
    pub fn subset(&self, pool_indices: &[usize]) -> ArbitrageResult<Self> {
        let pools = pool_indices
            .iter()
            .map(|&index| {
                self.pools
                    .get(index)
                    .cloned()
                    .ok_or(ArbitrageError::PoolIndexOutOfRange {
                        index,
                        num_pools: self.pools.len(),
                    })
            })
            .collect::<ArbitrageResult<Vec<_>>>()?;

        Ok(Self {
            pools,
            ..self.clone()
        })
    }
}
