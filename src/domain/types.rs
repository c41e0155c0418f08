use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an asset in the shared (global) accounting space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetIndex(pub usize);

impl fmt::Display for AssetIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for AssetIndex {
    fn from(index: usize) -> Self {
        AssetIndex(index)
    }
}

/// Human-readable asset identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetSymbol(pub String);

impl fmt::Display for AssetSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fraction of a deposit credited towards a pool's invariant (`1 - fee`)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRetention(pub f64);

impl FeeRetention {
    /// Returns true when the retention lies in `(0, 1]`
    pub fn is_valid(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0 && self.0 <= 1.0
    }
}

impl fmt::Display for FeeRetention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp attached to problem snapshots and solve reports
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Arbitrage optimizer errors
///
/// Everything except the I/O, JSON, parse, solver-setup and task variants is a
/// configuration error raised while the model is built, before the solver is invoked.
#[derive(Debug, thiserror::Error)]
pub enum ArbitrageError {
    /// A pool references an asset outside `[0, n)`
    #[error("Pool {pool} slot {slot} references asset {index}, but only {num_assets} assets exist")]
    AssetIndexOutOfRange {
        /// Pool position in the problem
        pool: usize,
        /// Local slot holding the bad reference
        slot: usize,
        /// Referenced global index
        index: usize,
        /// Size of the global index space
        num_assets: usize,
    },

    /// The same global asset appears twice in one pool
    #[error("Pool {pool} lists asset {index} more than once")]
    DuplicateAsset {
        /// Pool position in the problem
        pool: usize,
        /// Repeated global index
        index: usize,
    },

    /// Two inputs that must agree in length do not
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Which input is inconsistent
        what: String,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// A pool without any asset slot
    #[error("Pool {0} holds no assets")]
    EmptyPool(usize),

    /// Fee retention outside `(0, 1]`
    #[error("Pool {pool} has invalid fee retention {value}, expected a value in (0, 1]")]
    InvalidFeeRetention {
        /// Pool position in the problem
        pool: usize,
        /// Offending value
        value: f64,
    },

    /// Negative or non-finite reserve
    #[error("Pool {pool} slot {slot} has invalid reserve {value}")]
    InvalidReserve {
        /// Pool position in the problem
        pool: usize,
        /// Local slot
        slot: usize,
        /// Offending value
        value: f64,
    },

    /// Negative or non-finite market value
    #[error("Asset {asset} has invalid market value {value}")]
    InvalidMarketValue {
        /// Global asset index
        asset: usize,
        /// Offending value
        value: f64,
    },

    /// Weighted invariant with unusable weights
    #[error("Pool {pool} has invalid invariant weights: {reason}")]
    InvalidWeights {
        /// Pool position in the problem
        pool: usize,
        /// What is wrong with the weights
        reason: String,
    },

    /// Weighted invariant named without its weights
    #[error("Invariant kind {0} requires explicit weights")]
    MissingWeights(String),

    /// Invariant kind not known to the constraint builder
    #[error("Unknown invariant kind: {0}")]
    UnknownInvariant(String),

    /// Pool selection refers to a pool that does not exist
    #[error("Pool index {index} out of range for {num_pools} pools")]
    PoolIndexOutOfRange {
        /// Requested pool
        index: usize,
        /// Number of pools in the problem
        num_pools: usize,
    },

    /// Solver could not be configured
    #[error("Solver setup error: {0}")]
    SolverSetup(String),

    /// A concurrent solve task panicked or was cancelled
    #[error("Solve task failed: {0}")]
    TaskFailed(String),

    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ArbitrageError {
    pub(crate) fn length_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        ArbitrageError::LengthMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// Returns true for errors detected while validating the model input
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            ArbitrageError::IoError(_)
                | ArbitrageError::JsonError(_)
                | ArbitrageError::ParseError(_)
                | ArbitrageError::SolverSetup(_)
                | ArbitrageError::TaskFailed(_)
        )
    }
}

/// Result type for arbitrage operations
pub type ArbitrageResult<T> = Result<T, ArbitrageError>;
