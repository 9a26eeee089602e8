// Negative assets: players a team would pay to get rid of.

use crate::league::{Pid, Player, Tid};
use crate::market::TradeMarket;
use crate::valuation::ValueChangeRequest;

/// Value change for `tid` of giving away `pids` for nothing, negotiating
/// with the user. Errors count as "would not do it".
pub(crate) fn removal_gain<M: TradeMarket + ?Sized>(market: &mut M, tid: Tid, pids: &[Pid]) -> f64 {
    let req = ValueChangeRequest::new(tid)
        .remove_players(pids.iter().copied())
        .with_partner(market.user_tid());
    market.value_change(&req).unwrap_or(f64::NEG_INFINITY)
}

/// Tradable, and `tid` would pay to get rid of the player.
pub fn is_negative_tradable_player<M: TradeMarket + ?Sized>(
    market: &mut M,
    p: &Player,
    tid: Tid,
) -> bool {
    if market.is_untradable(p) {
        return false;
    }
    removal_gain(market, tid, &[p.pid]) > 0.0
}

/// The user's own dead weight: tradable players not originally drafted by
/// the user, signed past `draft_year`, whose removal the user values
/// positively. Most negative (lowest value) first.
pub fn negative_value_players<M: TradeMarket + ?Sized>(
    market: &mut M,
    draft_year: i32,
) -> Vec<Player> {
    let user_tid = market.user_tid();
    let roster: Vec<Player> = market
        .league()
        .players_by_tid(user_tid)
        .into_iter()
        .cloned()
        .collect();

    let mut out = Vec::new();
    for p in roster {
        if market.is_untradable(&p)
            || p.draft.original_tid == user_tid
            || p.contract.exp <= draft_year
        {
            continue;
        }
        if removal_gain(market, user_tid, &[p.pid]) > 0.0 {
            out.push(p);
        }
    }
    out.sort_by(|a, b| a.value.total_cmp(&b.value));
    out
}

/// Negative tradable players on team `tid`, least negative (highest value)
/// first. With `draft_year`, contracts ending by then are skipped.
pub fn team_negative_players<M: TradeMarket + ?Sized>(
    market: &mut M,
    tid: Tid,
    draft_year: Option<i32>,
) -> Vec<Player> {
    let roster: Vec<Player> = market
        .league()
        .players_by_tid(tid)
        .into_iter()
        .filter(|p| draft_year.map_or(true, |year| p.contract.exp > year))
        .cloned()
        .collect();

    let mut out: Vec<Player> = roster
        .into_iter()
        .filter(|p| is_negative_tradable_player(market, p, tid))
        .collect();
    out.sort_by(|a, b| b.value.total_cmp(&a.value));
    out
}
