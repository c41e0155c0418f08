use crate::domain::execution::ExecutionConfig;
use crate::domain::report::SolveReport;
use crate::domain::{invariant::Invariant, pool::Pool, problem::ArbitrageProblem, types::*};
use crate::infrastructure::solver::SolverSettings;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Raw JSON structures for parsing problem files
/// Amount given either as a JSON number or as a decimal string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

/// Raw invariant declaration
#[derive(Debug, Deserialize)]
struct RawInvariant {
    kind: String,
    weights: Option<Vec<u32>>,
}

/// Raw pool from JSON
#[derive(Debug, Deserialize)]
struct RawPool {
    name: Option<String>,
    assets: Vec<usize>,
    reserves: Vec<RawAmount>,
    fee: f64,
    invariant: Option<RawInvariant>,
}

/// Raw problem file
#[derive(Debug, Deserialize)]
struct RawProblem {
    assets: Vec<String>,
    market_value: Vec<RawAmount>,
    pools: Vec<RawPool>,
    ts: Option<String>,
    solver: Option<SolverSettings>,
    execution: Option<ExecutionConfig>,
}

/// A parsed problem file with its optional settings sections
#[derive(Debug, Clone)]
pub struct ProblemFile {
    pub problem: ArbitrageProblem,
    pub solver: Option<SolverSettings>,
    pub execution: Option<ExecutionConfig>,
}

/// Converts a decimal to `f64`
pub fn decimal_to_f64(value: Decimal) -> ArbitrageResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| ArbitrageError::ParseError(format!("Decimal out of range: {}", value)))
}

fn parse_amount(raw: RawAmount, what: &str) -> ArbitrageResult<f64> {
    match raw {
        RawAmount::Number(value) => Ok(value),
        RawAmount::Text(text) => {
            let value = Decimal::from_str(text.trim())
                .map_err(|e| ArbitrageError::ParseError(format!("Invalid {}: {}", what, e)))?;
            decimal_to_f64(value)
        }
    }
}

fn parse_invariant(raw: Option<RawInvariant>, pool: usize) -> ArbitrageResult<Invariant> {
    let Some(raw) = raw else {
        return Ok(Invariant::default());
    };
    match (Invariant::from_str(&raw.kind), raw.weights) {
        (Err(ArbitrageError::MissingWeights(_)), Some(weights)) => {
            Ok(Invariant::WeightedGeometricMean { weights })
        }
        (Err(ArbitrageError::MissingWeights(kind)), None) => Err(ArbitrageError::InvalidWeights {
            pool,
            reason: format!("{} requires weights", kind),
        }),
        (parsed, _) => parsed,
    }
}

/// Parse timestamp from ISO 8601 string
fn parse_timestamp(ts_str: &str) -> ArbitrageResult<Timestamp> {
    chrono::DateTime::parse_from_rfc3339(ts_str)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| ArbitrageError::ParseError(format!("Invalid timestamp: {}", e)))
}

/// Parse a problem file from a JSON string
///
/// The returned problem has already passed validation.
pub fn parse_problem(json_str: &str) -> ArbitrageResult<ProblemFile> {
    let raw: RawProblem = serde_json::from_str(json_str)?;

    let market_value = raw
        .market_value
        .into_iter()
        .map(|amount| parse_amount(amount, "market value"))
        .collect::<ArbitrageResult<Vec<_>>>()?;

    let pools = raw
        .pools
        .into_iter()
        .enumerate()
        .map(|(position, pool)| {
            let reserves = pool
                .reserves
                .into_iter()
                .map(|amount| parse_amount(amount, "reserve"))
                .collect::<ArbitrageResult<Vec<_>>>()?;
            let invariant = parse_invariant(pool.invariant, position)?;
            let parsed = Pool::new(pool.assets, reserves, pool.fee, invariant);
            Ok(match pool.name {
                Some(name) => parsed.with_label(name),
                None => parsed,
            })
        })
        .collect::<ArbitrageResult<Vec<_>>>()?;

    let mut problem = ArbitrageProblem::new(raw.assets.len(), pools, market_value)
        .with_symbols(raw.assets.into_iter().map(AssetSymbol).collect());
    if let Some(ts) = raw.ts {
        problem = problem.with_observed_at(parse_timestamp(&ts)?);
    }
    problem.validate()?;

    Ok(ProblemFile {
        problem,
        solver: raw.solver,
        execution: raw.execution,
    })
}

/// Load and parse a problem file
pub fn load_problem(file_path: impl AsRef<Path>) -> ArbitrageResult<ProblemFile> {
    let content = std::fs::read_to_string(file_path)?;
    parse_problem(&content)
}

/// Write a solve report as pretty JSON
pub fn write_report(file_path: impl AsRef<Path>, report: &SolveReport) -> ArbitrageResult<()> {
    std::fs::write(file_path, report.to_json()?)?;
    Ok(())
}
