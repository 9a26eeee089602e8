// Contract surplus: what a player earns versus what the value would command.

use crate::league::{Contract, Phase};

use super::ValuationContext;

/// Cap on the bonus a cheap contract can add. Overpaid contracts are
/// penalized without limit.
const MAX_CONTRACT_BONUS: f64 = 0.1;

/// Expected salary for `normalized_value` minus actual salary, both as a
/// fraction of the cap. Contracts that run out this season (or next season,
/// once the playoffs are over) are worth nothing either way.
pub fn contract_value(contract: &Contract, normalized_value: f64, ctx: &ValuationContext) -> f64 {
    if contract.exp == ctx.season || (ctx.phase > Phase::Playoffs && contract.exp == ctx.season + 1)
    {
        return 0.0;
    }

    let cap = ctx.salary_cap;
    let normalized_amount = contract.amount / cap;
    let slope = (ctx.max_contract / cap - ctx.min_contract / cap) / ctx.constants.value_range();
    let expected_amount = slope * (normalized_value - ctx.constants.min_value);

    (expected_amount - normalized_amount).min(MAX_CONTRACT_BONUS)
}
