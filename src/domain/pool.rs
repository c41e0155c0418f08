use crate::domain::expr::*;
use crate::domain::incidence::Incidence;
use crate::domain::invariant::Invariant;
use crate::domain::types::*;
use serde::{Deserialize, Serialize};

/// One liquidity venue trading a subset of the global assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    /// Optional label used in reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Global index of each local slot
    pub local_to_global: Vec<AssetIndex>,
    /// Current holdings, one per local slot
    pub reserves: Vec<f64>,
    /// Fraction of deposits credited to the invariant
    pub fee_retention: FeeRetention,
    /// Trading function
    #[serde(default)]
    pub invariant: Invariant,
}

impl Pool {
    /// Creates a pool from raw global indices
    pub fn new(
        local_to_global: Vec<usize>,
        reserves: Vec<f64>,
        fee_retention: f64,
        invariant: Invariant,
    ) -> Self {
        Self {
            label: None,
            local_to_global: local_to_global.into_iter().map(AssetIndex).collect(),
            reserves,
            fee_retention: FeeRetention(fee_retention),
            invariant,
        }
    }

    /// Creates a plain geometric-mean (constant product) pool
    pub fn geometric_mean(local_to_global: Vec<usize>, reserves: Vec<f64>, fee_retention: f64) -> Self {
        Self::new(local_to_global, reserves, fee_retention, Invariant::GeometricMean)
    }

    /// Creates a constant-sum pool
    pub fn constant_sum(local_to_global: Vec<usize>, reserves: Vec<f64>, fee_retention: f64) -> Self {
        Self::new(local_to_global, reserves, fee_retention, Invariant::ConstantSum)
    }

    /// Creates a weighted geometric-mean pool
    pub fn weighted(
        local_to_global: Vec<usize>,
        reserves: Vec<f64>,
        fee_retention: f64,
        weights: Vec<u32>,
    ) -> Self {
        Self::new(
            local_to_global,
            reserves,
            fee_retention,
            Invariant::WeightedGeometricMean { weights },
        )
    }

    /// Attaches a report label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Number of local slots
    pub fn arity(&self) -> usize {
        self.local_to_global.len()
    }

    /// Label, or a positional name when none was given
    pub fn display_name(&self, position: usize) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("pool {}", position))
    }

    /// Validates the pool against the global index space and builds its incidence
    ///
    /// `position` is the pool's index in the problem, used to label errors.
    pub fn validate(&self, position: usize, num_assets: usize) -> ArbitrageResult<Incidence> {
        if self.local_to_global.is_empty() {
            return Err(ArbitrageError::EmptyPool(position));
        }
        if self.reserves.len() != self.arity() {
            return Err(ArbitrageError::length_mismatch(
                format!("reserves of pool {}", position),
                self.arity(),
                self.reserves.len(),
            ));
        }
        if let Some((slot, &value)) = self
            .reserves
            .iter()
            .enumerate()
            .find(|(_, r)| !r.is_finite() || **r < 0.0)
        {
            return Err(ArbitrageError::InvalidReserve {
                pool: position,
                slot,
                value,
            });
        }
        if !self.fee_retention.is_valid() {
            return Err(ArbitrageError::InvalidFeeRetention {
                pool: position,
                value: self.fee_retention.0,
            });
        }
        self.invariant.validate(position, self.arity())?;

        Incidence::new(position, num_assets, &self.local_to_global)
    }

    /// Numeric post-trade reserves `R + γ·Δ − Λ`
    pub fn post_trade_reserves(&self, deposit: &[f64], withdraw: &[f64]) -> Vec<f64> {
        let gamma = self.fee_retention.0;
        self.reserves
            .iter()
            .zip(deposit.iter().zip(withdraw))
            .map(|(r, (d, w))| r + gamma * d - w)
            .collect()
    }

    /// Invariant value at the current reserves
    pub fn invariant_value(&self) -> f64 {
        self.invariant.value(&self.reserves)
    }

    /// Symbolic post-trade reserves over the pool's trade variables
    pub fn post_trade_exprs(&self, deposit: &[VarId], withdraw: &[VarId]) -> Vec<AffineExpr> {
        let gamma = self.fee_retention.0;
        self.reserves
            .iter()
            .zip(deposit.iter().zip(withdraw))
            .map(|(&r, (&d, &w))| {
                let mut expr = AffineExpr::constant(r);
                expr.add_term(d, gamma);
                expr.add_term(w, -1.0);
                expr
            })
            .collect()
    }
}
