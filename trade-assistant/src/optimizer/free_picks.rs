// Free picks: take on another team's dead weight in exchange for a pick.

use tracing::debug;

use crate::league::{DraftPick, DraftSeason, Player};
use crate::market::TradeMarket;

use super::negatives::team_negative_players;
use super::{combinations, evaluate_trade, execute_trade, other_teams, player_label, trade_between};

fn acquire_description<M: TradeMarket + ?Sized>(market: &M, pick: &DraftPick, players: &[&Player]) -> String {
    let abbrev = market
        .team(pick.tid)
        .map_or_else(|| pick.tid.to_string(), |t| t.abbrev.clone());
    let labels: Vec<String> = players.iter().map(|p| player_label(p)).collect();
    format!(
        "Acquiring pick: {} + {} from {}",
        market.pick_desc(pick),
        labels.join(" + "),
        abbrev
    )
}

/// For every AI team and each of its picks in this season's draft, ask for
/// the pick together with one of the team's negative players, then with two.
/// The user gives nothing. Returns the number of picks acquired.
pub fn acquire_free_picks<M: TradeMarket + ?Sized>(market: &mut M) -> usize {
    let user_tid = market.user_tid();
    let season = market.season();
    let mut acquired = 0;

    for tid in other_teams(market.league()) {
        let picks: Vec<DraftPick> = market
            .league()
            .draft_picks_by_tid(tid)
            .into_iter()
            .filter(|dp| dp.season == DraftSeason::Year(season))
            .cloned()
            .collect();

        for pick in picks {
            let negatives = team_negative_players(market, tid, Some(season));
            if negatives.is_empty() {
                continue;
            }
            debug!(
                "{} candidates for {}",
                negatives.len(),
                market.pick_desc(&pick)
            );

            let mut sizes = vec![1];
            if negatives.len() >= 2 {
                sizes.push(2);
            }
            let found = 'search: {
                for size in sizes {
                    for combo in combinations(&negatives, size) {
                        let pids = combo.iter().map(|p| p.pid).collect();
                        let teams = trade_between(user_tid, vec![], vec![], tid, pids, vec![pick.dpid]);
                        if evaluate_trade(market, &teams) <= 0.0 {
                            continue;
                        }
                        let refs: Vec<&Player> = combo.iter().collect();
                        let description = acquire_description(market, &pick, &refs);
                        if execute_trade(market, &teams, &description) {
                            break 'search true;
                        }
                    }
                }
                false
            };
            if found {
                acquired += 1;
            }
        }
    }
    acquired
}
