use crate::domain::expr::*;
use crate::domain::types::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trading function a pool enforces on its reserves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Invariant {
    /// Balancer style weighted product, `Π R_i^(w_i / Σw)`
    WeightedGeometricMean {
        /// Positive integer weight per local slot
        weights: Vec<u32>,
    },
    /// Uniswap V2 style product, geometric mean with unit weights
    #[default]
    GeometricMean,
    /// Stable-swap limit, `Σ R_i`
    ConstantSum,
}

impl Invariant {
    /// Short name used in configuration files
    pub fn kind(&self) -> &'static str {
        match self {
            Invariant::WeightedGeometricMean { .. } => "weighted_geometric_mean",
            Invariant::GeometricMean => "geometric_mean",
            Invariant::ConstantSum => "constant_sum",
        }
    }

    /// Checks the invariant against the pool's arity
    pub fn validate(&self, pool: usize, arity: usize) -> ArbitrageResult<()> {
        if let Invariant::WeightedGeometricMean { weights } = self {
            if weights.len() != arity {
                return Err(ArbitrageError::InvalidWeights {
                    pool,
                    reason: format!("expected {} weights, got {}", arity, weights.len()),
                });
            }
            if let Some(slot) = weights.iter().position(|&w| w == 0) {
                return Err(ArbitrageError::InvalidWeights {
                    pool,
                    reason: format!("weight for slot {} must be positive", slot),
                });
            }
        }
        Ok(())
    }

    /// Exponents of the geometric mean, normalized to sum to one
    ///
    /// Empty for invariants that are not geometric means.
    pub fn normalized_weights(&self, arity: usize) -> Vec<f64> {
        match self {
            Invariant::WeightedGeometricMean { weights } => {
                let total: f64 = weights.iter().map(|&w| f64::from(w)).sum();
                weights.iter().map(|&w| f64::from(w) / total).collect()
            }
            Invariant::GeometricMean => vec![1.0 / arity as f64; arity],
            Invariant::ConstantSum => Vec::new(),
        }
    }

    /// Evaluates the invariant at concrete reserves
    pub fn value(&self, reserves: &[f64]) -> f64 {
        match self {
            Invariant::WeightedGeometricMean { .. } | Invariant::GeometricMean => {
                weighted_geometric_mean(reserves, &self.normalized_weights(reserves.len()))
            }
            Invariant::ConstantSum => reserves.iter().sum(),
        }
    }

    /// Emits the convex constraints `invariant(post_trade) ≥ invariant(pre_trade)`
    ///
    /// `post_trade` holds one affine expression per local slot. Every emitted
    /// constraint set also keeps post-trade reserves non-negative: the geometric
    /// mean cone implies it, constant-sum states it explicitly.
    ///
    /// Geometric-mean arguments are divided by their positive pre-trade reserve,
    /// so the bound is `1` (or `0` when a reserve is empty) whatever the reserve
    /// magnitudes.
    pub fn constraints(&self, post_trade: &[AffineExpr], pre_trade: &[f64]) -> Vec<Constraint> {
        match self {
            Invariant::WeightedGeometricMean { .. } | Invariant::GeometricMean => {
                let weights = self.normalized_weights(post_trade.len());
                let scales: Vec<f64> = pre_trade
                    .iter()
                    .map(|&reserve| if reserve > 0.0 { reserve } else { 1.0 })
                    .collect();
                let args = post_trade
                    .iter()
                    .zip(&scales)
                    .map(|(post, scale)| AffineExpr::default().plus_scaled(post, 1.0 / scale))
                    .collect();
                let normalized: Vec<f64> =
                    pre_trade.iter().zip(&scales).map(|(r, scale)| r / scale).collect();
                vec![Constraint::GeoMeanAtLeast {
                    args,
                    bound: weighted_geometric_mean(&normalized, &weights),
                    weights,
                }]
            }
            Invariant::ConstantSum => {
                let total = AffineExpr::sum(post_trade);
                std::iter::once(Constraint::at_least(total, pre_trade.iter().sum()))
                    .chain(post_trade.iter().cloned().map(Constraint::NonNegative))
                    .collect()
            }
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invariant::WeightedGeometricMean { weights } => {
                write!(f, "weighted geometric mean {:?}", weights)
            }
            Invariant::GeometricMean => write!(f, "geometric mean"),
            Invariant::ConstantSum => write!(f, "constant sum"),
        }
    }
}

impl FromStr for Invariant {
    type Err = ArbitrageError;

    /// Parses weight-free kinds; weighted pools need their weights supplied separately
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geometric_mean" | "geomean" | "constant_product" => Ok(Invariant::GeometricMean),
            "constant_sum" => Ok(Invariant::ConstantSum),
            "weighted_geometric_mean" => Err(ArbitrageError::MissingWeights(s.to_string())),
            other => Err(ArbitrageError::UnknownInvariant(other.to_string())),
        }
    }
}
