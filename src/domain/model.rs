use crate::domain::expr::*;
use crate::domain::incidence::Incidence;
use crate::domain::objective::*;
use crate::domain::problem::ArbitrageProblem;
use crate::domain::types::*;
use tracing::debug;

/// Decision variables of one pool: tendered (`deposit`) and received (`withdraw`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeVariables {
    /// Amount tendered per local slot
    pub deposit: Vec<VarId>,
    /// Amount received per local slot
    pub withdraw: Vec<VarId>,
}

impl TradeVariables {
    /// Allocates `2 · arity` consecutive variables starting at `first`
    pub fn new(first: VarId, arity: usize) -> Self {
        Self {
            deposit: (first.0..first.0 + arity).map(VarId).collect(),
            withdraw: (first.0 + arity..first.0 + 2 * arity).map(VarId).collect(),
        }
    }

    /// Every variable owned by the pool
    pub fn all(&self) -> impl Iterator<Item = VarId> + '_ {
        self.deposit.iter().chain(&self.withdraw).copied()
    }

    /// Reads the deposit vector out of a solution
    pub fn deposit_values(&self, values: &[f64]) -> Vec<f64> {
        self.deposit.iter().map(|var| values[var.0]).collect()
    }

    /// Reads the withdraw vector out of a solution
    pub fn withdraw_values(&self, values: &[f64]) -> Vec<f64> {
        self.withdraw.iter().map(|var| values[var.0]).collect()
    }
}

/// Allocates trade variables pool by pool; returns them with the total count
pub fn allocate_trade_variables(arities: &[usize]) -> (Vec<TradeVariables>, usize) {
    let mut next = 0;
    let trades = arities
        .iter()
        .map(|&arity| {
            let trade = TradeVariables::new(VarId(next), arity);
            next += 2 * arity;
            trade
        })
        .collect();
    (trades, next)
}

/// Everything one pool adds to the program
#[derive(Debug, Clone)]
struct PoolContribution {
    post_trade: Vec<AffineExpr>,
    flow: Vec<AffineExpr>,
    constraints: Vec<Constraint>,
}

/// The assembled convex program together with the handles needed to read a solution
#[derive(Debug, Clone)]
pub struct ArbitrageModel {
    program: ConvexProgram,
    incidences: Vec<Incidence>,
    trades: Vec<TradeVariables>,
    post_trade: Vec<Vec<AffineExpr>>,
    psi: Vec<AffineExpr>,
}

impl ArbitrageModel {
    /// Validates the problem and builds the program
    ///
    /// Configuration errors surface here, before any solver is involved.
    pub fn build(problem: &ArbitrageProblem) -> ArbitrageResult<Self> {
        let incidences = problem.validate()?;
        let arities: Vec<usize> = incidences.iter().map(Incidence::arity).collect();
        let (trades, num_variables) = allocate_trade_variables(&arities);

        let contributions: Vec<PoolContribution> = problem
            .pools()
            .iter()
            .zip(&incidences)
            .zip(&trades)
            .map(|((pool, incidence), trade)| {
                let post_trade = pool.post_trade_exprs(&trade.deposit, &trade.withdraw);
                let constraints = trade
                    .all()
                    .map(|var| Constraint::NonNegative(AffineExpr::term(var, 1.0)))
                    .chain(pool.invariant.constraints(&post_trade, &pool.reserves))
                    .collect();
                PoolContribution {
                    flow: pool_flow(incidence, trade),
                    post_trade,
                    constraints,
                }
            })
            .collect();

        let psi = extraction_vector(
            problem.num_assets(),
            contributions.iter().map(|c| &c.flow),
        );
        let objective = market_objective(problem.market_value(), &psi);

        let program = ConvexProgram::new(num_variables, objective)
            .with_constraints(
                contributions
                    .iter()
                    .flat_map(|c| c.constraints.iter().cloned()),
            )
            .with_constraints(extraction_constraints(&psi));

        debug!(
            "Built arbitrage model: {} pools, {} assets, {} variables, {} constraints",
            problem.num_pools(),
            problem.num_assets(),
            program.num_variables(),
            program.constraints().len()
        );

        Ok(Self {
            program,
            incidences,
            trades,
            post_trade: contributions.into_iter().map(|c| c.post_trade).collect(),
            psi,
        })
    }

    /// The convex program to hand to a solver
    pub fn program(&self) -> &ConvexProgram {
        &self.program
    }

    /// Incidence relation per pool
    pub fn incidences(&self) -> &[Incidence] {
        &self.incidences
    }

    /// Trade variables per pool
    pub fn trades(&self) -> &[TradeVariables] {
        &self.trades
    }

    /// Symbolic post-trade reserves per pool
    pub fn post_trade(&self) -> &[Vec<AffineExpr>] {
        &self.post_trade
    }

    /// Symbolic extraction vector
    pub fn psi(&self) -> &[AffineExpr] {
        &self.psi
    }
}
