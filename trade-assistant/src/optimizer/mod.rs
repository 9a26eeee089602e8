// Automation scripts: search the market for trades and execute the good ones.
//
// Every script talks to the league through a `TradeMarket`, evaluates
// candidate trades from the AI team's side (it has to accept), and commits
// through `propose`, so the same rules apply as for a hand-made offer.

pub mod draft_trades;
pub mod expansion;
pub mod free_picks;
pub mod negatives;
pub mod pick_givers;
pub mod post_draft;
pub mod trade_up;
pub mod valuable_picks;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::league::{DraftPick, DraftSeason, Dpid, League, Pid, Player, Tid};
use crate::market::TradeMarket;
use crate::trade::{TradeSide, TradeTeams};
use crate::valuation::ValueChangeRequest;

pub use draft_trades::{optimize_draft_trades, DraftTradeReport, TradeUpMode};
pub use expansion::{auto_complete_expansion_draft, expansion_draft_intel};
pub use free_picks::acquire_free_picks;
pub use pick_givers::{find_pick_givers, find_willing_teams};
pub use post_draft::post_draft_optimize;
pub use trade_up::{execute_trade_up_path, find_optimal_trade_up_path, TradeStep};
pub use valuable_picks::find_most_valuable_picks;

// ---------------------------------------------------------------------------
// Search limits
// ---------------------------------------------------------------------------

/// Caps and weights for the trade searches. Loaded from the `[optimizer]`
/// section of `settings.toml`; any missing key keeps its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptimizerLimits {
    /// Largest set of players an exhaustive subset search looks at.
    pub max_combo_size: usize,
    /// Path search stops queueing new picks once this many have a
    /// predecessor.
    pub max_path_steps: usize,
    /// Queue pops before the path search gives up.
    pub max_search_iterations: usize,
    /// Their negative players tried one at a time.
    pub single_candidates: usize,
    /// Pairs are drawn from the first `pair_outer` x first `pair_inner`.
    pub pair_outer: usize,
    pub pair_inner: usize,
    /// At most this many of our own negative players are added to an offer.
    pub max_sweeteners: usize,
    /// Pairs are only searched when the best single offer's dv is below this.
    pub pair_search_threshold: f64,
    /// Score penalty per unit of value taken on.
    pub taken_value_weight: f64,
    /// Score bonus per unit of value dumped.
    pub dump_value_weight: f64,
    /// Rounds of the execute-then-re-search loop for expiring-contract deals.
    pub max_willing_iterations: usize,
}

impl Default for OptimizerLimits {
    fn default() -> Self {
        OptimizerLimits {
            max_combo_size: 15,
            max_path_steps: 60,
            max_search_iterations: 500,
            single_candidates: 10,
            pair_outer: 5,
            pair_inner: 10,
            max_sweeteners: 2,
            pair_search_threshold: 0.5,
            taken_value_weight: 0.1,
            dump_value_weight: 0.3,
            max_willing_iterations: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Two-sided trade: the user gives `user_*`, the AI team gives `ai_*`.
pub fn trade_between(
    user_tid: Tid,
    user_pids: Vec<Pid>,
    user_dpids: Vec<Dpid>,
    ai_tid: Tid,
    ai_pids: Vec<Pid>,
    ai_dpids: Vec<Dpid>,
) -> TradeTeams {
    [
        TradeSide::new(user_tid)
            .with_players(user_pids)
            .with_picks(user_dpids),
        TradeSide::new(ai_tid).with_players(ai_pids).with_picks(ai_dpids),
    ]
}

/// The AI side's value change for `teams`, or negative infinity when the
/// trade would put the AI team in violation of the cap rule or cannot be
/// evaluated. Cap warnings about the user's team are ignored.
pub fn evaluate_trade<M: TradeMarket + ?Sized>(market: &mut M, teams: &TradeTeams) -> f64 {
    let [user, ai] = teams;
    let Some(ai_name) = market.team(ai.tid).map(|t| t.full_name()) else {
        return f64::NEG_INFINITY;
    };
    match market.summary(teams) {
        Ok(summary) if summary.warns_about(&ai_name) => return f64::NEG_INFINITY,
        Ok(_) => {}
        Err(e) => {
            debug!("Cannot summarize trade with {}: {}", ai_name, e);
            return f64::NEG_INFINITY;
        }
    }

    let req = ValueChangeRequest {
        tid: ai.tid,
        pids_add: user.pids.clone(),
        pids_remove: ai.pids.clone(),
        dpids_add: user.dpids.clone(),
        dpids_remove: ai.dpids.clone(),
        key: None,
        partner: Some(user.tid),
    };
    match market.value_change(&req) {
        Ok(dv) => dv,
        Err(e) => {
            warn!("Error evaluating trade with {}: {}", ai_name, e);
            f64::NEG_INFINITY
        }
    }
}

/// Propose `teams` for real. Returns whether the AI team accepted.
pub fn execute_trade<M: TradeMarket + ?Sized>(
    market: &mut M,
    teams: &TradeTeams,
    description: &str,
) -> bool {
    match market.propose(teams, description) {
        Ok(outcome) if outcome.accepted => true,
        Ok(outcome) => {
            info!("Trade failed: {} ({})", outcome.message, description);
            false
        }
        Err(e) => {
            warn!("Trade error: {} ({})", e, description);
            false
        }
    }
}

/// Active teams other than the user's.
pub fn other_teams(league: &League) -> Vec<Tid> {
    league.ai_teams().map(|t| t.tid).collect()
}

/// The user's picks, best first.
pub fn sorted_user_picks(league: &League) -> Vec<DraftPick> {
    let mut picks: Vec<DraftPick> = league
        .draft_picks_by_tid(league.user_tid())
        .into_iter()
        .cloned()
        .collect();
    picks.sort_by(|a, b| a.draft_order(b));
    picks
}

/// The user's picks in this season's draft, best first.
pub fn current_user_picks(league: &League) -> Vec<DraftPick> {
    let season = DraftSeason::Year(league.season());
    sorted_user_picks(league)
        .into_iter()
        .filter(|dp| dp.season == season)
        .collect()
}

/// `First Last (55.3)`.
pub fn player_label(p: &Player) -> String {
    format!("{} ({:.1})", p.name(), p.value)
}

/// `[A (50.0), B (48.1)]` for the players in `pids` that still exist.
pub(crate) fn players_label(league: &League, pids: &[Pid]) -> String {
    let names: Vec<String> = pids
        .iter()
        .filter_map(|pid| league.player(*pid))
        .map(player_label)
        .collect();
    format!("[{}]", names.join(", "))
}

/// Every `k`-element combination of `items`, in lexicographic order of
/// positions.
pub(crate) fn combinations<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for i in 0..=items.len() - k {
        for mut tail in combinations(&items[i + 1..], k - 1) {
            tail.insert(0, items[i].clone());
            out.push(tail);
        }
    }
    out
}
