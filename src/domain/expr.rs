//! Symbolic building blocks of the convex program
//!
//! Everything the model builder emits is expressed with affine expressions
//! over decision variables and a small closed set of convex constraint shapes,
//! so any solver adapter only needs to understand those shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision variable handle (column in the program)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(pub usize);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// `constant + Σ coefficient · variable`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffineExpr {
    constant: f64,
    terms: Vec<(VarId, f64)>,
}

impl AffineExpr {
    /// Expression holding only a constant
    pub fn constant(value: f64) -> Self {
        Self {
            constant: value,
            terms: Vec::new(),
        }
    }

    /// Expression `coefficient · var`
    pub fn term(var: VarId, coefficient: f64) -> Self {
        Self {
            constant: 0.0,
            terms: vec![(var, coefficient)],
        }
    }

    /// Adds `coefficient · var` in place, merging with an existing term
    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        if coefficient == 0.0 {
            return;
        }
        match self.terms.iter_mut().find(|(existing, _)| *existing == var) {
            Some((_, c)) => *c += coefficient,
            None => self.terms.push((var, coefficient)),
        }
    }

    /// Returns `self + scale · other`
    pub fn plus_scaled(mut self, other: &AffineExpr, scale: f64) -> Self {
        self.constant += scale * other.constant;
        for &(var, coefficient) in &other.terms {
            self.add_term(var, scale * coefficient);
        }
        self
    }

    /// Sum of several expressions
    pub fn sum<'a>(exprs: impl IntoIterator<Item = &'a AffineExpr>) -> Self {
        exprs
            .into_iter()
            .fold(AffineExpr::default(), |acc, expr| acc.plus_scaled(expr, 1.0))
    }

    /// Constant part
    pub fn constant_part(&self) -> f64 {
        self.constant
    }

    /// Linear terms, one entry per variable
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// Coefficient of one variable (zero when absent)
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms
            .iter()
            .find(|(existing, _)| *existing == var)
            .map(|(_, c)| *c)
            .unwrap_or(0.0)
    }

    /// Evaluates the expression at a variable assignment
    ///
    /// Variables beyond the end of `values` count as zero.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms.iter().fold(self.constant, |acc, (var, c)| {
            acc + c * values.get(var.0).copied().unwrap_or(0.0)
        })
    }
}

/// Convex constraint shapes emitted by the model builder
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `expr ≥ 0`
    NonNegative(AffineExpr),
    /// `Π args_i ^ weights_i ≥ bound`, weights positive and summing to one
    ///
    /// Implies `args_i ≥ 0` for every argument.
    GeoMeanAtLeast {
        /// Affine arguments of the geometric mean
        args: Vec<AffineExpr>,
        /// Normalized exponents
        weights: Vec<f64>,
        /// Constant lower bound
        bound: f64,
    },
}

impl Constraint {
    /// `lhs ≥ rhs` for a constant right-hand side
    pub fn at_least(lhs: AffineExpr, rhs: f64) -> Self {
        Constraint::NonNegative(lhs.plus_scaled(&AffineExpr::constant(rhs), -1.0))
    }

    /// Amount by which the constraint is violated at `values` (zero when satisfied)
    pub fn violation(&self, values: &[f64]) -> f64 {
        match self {
            Constraint::NonNegative(expr) => (-expr.evaluate(values)).max(0.0),
            Constraint::GeoMeanAtLeast {
                args,
                weights,
                bound,
            } => {
                let evaluated: Vec<f64> = args.iter().map(|arg| arg.evaluate(values)).collect();
                let negative = evaluated
                    .iter()
                    .map(|value| (-value).max(0.0))
                    .fold(0.0, f64::max);
                let mean = weighted_geometric_mean(&evaluated, weights);
                negative.max(bound - mean)
            }
        }
    }
}

/// `Π values_i ^ weights_i` with negative inputs clamped to zero
pub fn weighted_geometric_mean(values: &[f64], weights: &[f64]) -> f64 {
    values
        .iter()
        .zip(weights)
        .map(|(value, weight)| value.max(0.0).powf(*weight))
        .product()
}

/// Program `maximize objective` subject to all constraints
#[derive(Debug, Clone, Default)]
pub struct ConvexProgram {
    num_variables: usize,
    objective: AffineExpr,
    constraints: Vec<Constraint>,
}

impl ConvexProgram {
    /// Program with `num_variables` columns and no constraints yet
    pub fn new(num_variables: usize, objective: AffineExpr) -> Self {
        Self {
            num_variables,
            objective,
            constraints: Vec::new(),
        }
    }

    /// Appends constraints
    pub fn with_constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Number of decision variables
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Objective to maximize
    pub fn objective(&self) -> &AffineExpr {
        &self.objective
    }

    /// All constraints
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Worst constraint violation at `values`
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        self.constraints
            .iter()
            .map(|constraint| constraint.violation(values))
            .fold(0.0, f64::max)
    }
}
