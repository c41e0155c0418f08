use crate::domain::expr::*;
use crate::domain::incidence::Incidence;
use crate::domain::model::TradeVariables;

/// Net flow of one pool lifted into global space, `A_l (Λ_l − Δ_l)`
pub fn pool_flow(incidence: &Incidence, trade: &TradeVariables) -> Vec<AffineExpr> {
    let mut flow = vec![AffineExpr::default(); incidence.num_assets()];
    for (slot, index) in incidence.local_to_global().iter().enumerate() {
        flow[index.0].add_term(trade.withdraw[slot], 1.0);
        flow[index.0].add_term(trade.deposit[slot], -1.0);
    }
    flow
}

/// Extraction vector `psi = Σ_l A_l (Λ_l − Δ_l)`
pub fn extraction_vector<'a>(
    num_assets: usize,
    flows: impl IntoIterator<Item = &'a Vec<AffineExpr>>,
) -> Vec<AffineExpr> {
    flows
        .into_iter()
        .fold(vec![AffineExpr::default(); num_assets], |psi, flow| {
            psi.into_iter()
                .zip(flow)
                .map(|(acc, term)| acc.plus_scaled(term, 1.0))
                .collect()
        })
}

/// Market value of the extracted basket, `market_value · psi`
pub fn market_objective(market_value: &[f64], psi: &[AffineExpr]) -> AffineExpr {
    market_value
        .iter()
        .zip(psi)
        .fold(AffineExpr::default(), |acc, (&price, expr)| {
            acc.plus_scaled(expr, price)
        })
}

/// `psi ≥ 0`: the trader never ends net short in any asset
pub fn extraction_constraints(psi: &[AffineExpr]) -> Vec<Constraint> {
    psi.iter().cloned().map(Constraint::NonNegative).collect()
}
