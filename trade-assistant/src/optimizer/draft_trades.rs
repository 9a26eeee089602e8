// Draft-day optimizer: trade every pick up, collect free picks, trade those up.

use std::collections::HashSet;
use std::fmt;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::info;

use crate::league::{DraftPick, Dpid, Phase};
use crate::market::TradeMarket;

use super::free_picks::acquire_free_picks;
use super::negatives::negative_value_players;
use super::trade_up::{execute_trade_up_path, find_optimal_trade_up_path, trade_up_chain_from_pick};
use super::{current_user_picks, sorted_user_picks, OptimizerLimits};

/// How a single pick is traded up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TradeUpMode {
    /// Search the cheapest path to the best reachable pick, then execute it.
    #[default]
    Path,
    /// Take the best accepted swap, repeat from the new pick.
    Greedy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftTradeReport {
    pub trades_executed: usize,
    pub free_picks_acquired: usize,
    pub free_pick_trades: usize,
    pub final_picks: Vec<String>,
}

impl fmt::Display for DraftTradeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Draft trade optimization complete")?;
        writeln!(f, "Total trades executed: {}", self.trades_executed)?;
        writeln!(f, "Free picks acquired: {}", self.free_picks_acquired)?;
        writeln!(f, "Trades from free picks: {}", self.free_pick_trades)?;
        writeln!(f)?;
        writeln!(f, "Final draft picks:")?;
        for pick in &self.final_picks {
            writeln!(f, "  {pick}")?;
        }
        Ok(())
    }
}

/// Trade `pick` up as far as `mode` gets it. Returns the trades made.
fn trade_up<M: TradeMarket + ?Sized>(
    market: &mut M,
    pick: &DraftPick,
    limits: &OptimizerLimits,
    mode: TradeUpMode,
) -> usize {
    match mode {
        TradeUpMode::Greedy => trade_up_chain_from_pick(market, pick),
        TradeUpMode::Path => {
            let draft_year = market.season();
            let ours = negative_value_players(market, draft_year);
            match find_optimal_trade_up_path(market, pick, &ours, limits) {
                Some(path) if !path.is_empty() => execute_trade_up_path(market, &path),
                _ => 0,
            }
        }
    }
}

/// Still the user's, as currently stored.
fn refresh_pick<M: TradeMarket + ?Sized>(market: &M, dpid: Dpid) -> Option<DraftPick> {
    market
        .league()
        .draft_pick(dpid)
        .filter(|dp| dp.tid == market.user_tid())
        .cloned()
}

/// Run the whole draft-day routine. Must be called during the draft with at
/// least one user pick in this season's draft.
///
/// 1. Trade each current pick up.
/// 2. Acquire free picks by absorbing negative contracts.
/// 3. Trade each newly acquired pick up, skipping picks already owned after
///    an earlier successful path.
pub fn optimize_draft_trades<M: TradeMarket + ?Sized>(
    market: &mut M,
    limits: &OptimizerLimits,
    mode: TradeUpMode,
) -> Result<DraftTradeReport> {
    let phase = market.phase();
    if phase != Phase::Draft {
        bail!(
            "draft trades can only be optimized during the draft; current phase: {}",
            phase
        );
    }
    let initial = current_user_picks(market.league());
    if initial.is_empty() {
        bail!("no draft picks for the {} draft", market.season());
    }
    info!("Optimizing {} picks ({:?} mode)", initial.len(), mode);

    let mut trades_executed = 0;
    for pick in &initial {
        let Some(pick) = refresh_pick(market, pick.dpid) else {
            continue;
        };
        trades_executed += trade_up(market, &pick, limits, mode);
    }

    let before: HashSet<Dpid> = sorted_user_picks(market.league())
        .iter()
        .map(|dp| dp.dpid)
        .collect();
    let free_picks_acquired = acquire_free_picks(market);
    let new_picks: Vec<DraftPick> = sorted_user_picks(market.league())
        .into_iter()
        .filter(|dp| !before.contains(&dp.dpid))
        .collect();

    let mut free_pick_trades = 0;
    let mut seen: HashSet<Dpid> = HashSet::new();
    for pick in &new_picks {
        if seen.contains(&pick.dpid) {
            continue;
        }
        let Some(pick) = refresh_pick(market, pick.dpid) else {
            continue;
        };
        let made = trade_up(market, &pick, limits, mode);
        if made > 0 {
            free_pick_trades += made;
            seen.extend(sorted_user_picks(market.league()).iter().map(|dp| dp.dpid));
        }
    }

    let final_picks = sorted_user_picks(market.league())
        .iter()
        .map(|dp| market.pick_desc(dp))
        .collect();
    let report = DraftTradeReport {
        trades_executed,
        free_picks_acquired,
        free_pick_trades,
        final_picks,
    };
    info!(
        "Draft optimization done: {} trades, {} free picks, {} follow-up trades",
        report.trades_executed, report.free_picks_acquired, report.free_pick_trades
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::test_support::{pick_owner, trade_up_league, ScriptedMarket};

    #[test]
    fn path_mode_report() {
        let mut m = ScriptedMarket::new(trade_up_league());
        let report =
            optimize_draft_trades(&mut m, &OptimizerLimits::default(), TradeUpMode::Path).unwrap();
        assert_eq!(report.trades_executed, 2);
        assert_eq!(report.free_picks_acquired, 0);
        assert_eq!(report.free_pick_trades, 0);
        assert_eq!(
            report.final_picks,
            vec!["2025 1st round pick (#2)", "2025 2nd round pick (#4)"]
        );
        assert_eq!(pick_owner(&m.league, 1), 3);
    }

    #[test]
    fn greedy_mode_report() {
        let mut m = ScriptedMarket::new(trade_up_league());
        let report =
            optimize_draft_trades(&mut m, &OptimizerLimits::default(), TradeUpMode::Greedy)
                .unwrap();
        assert_eq!(report.trades_executed, 2);
        assert_eq!(report.final_picks[0], "2025 1st round pick (#2)");
    }

    #[test]
    fn free_pick_is_reported() {
        let mut league = trade_up_league();
        // the user holds only #1, so nothing to trade up; team 2 pays its
        // #7 to dump the scrub, and #7 then moves up to #6
        league.draft_picks.retain(|dp| dp.dpid != 3 && dp.dpid != 7);
        league.move_pick(0, 3).unwrap();
        let mut m = ScriptedMarket::new(league);
        let report =
            optimize_draft_trades(&mut m, &OptimizerLimits::default(), TradeUpMode::Greedy)
                .unwrap();
        assert_eq!(report.trades_executed, 0);
        assert_eq!(report.free_picks_acquired, 1);
        assert_eq!(report.free_pick_trades, 1);
        assert_eq!(pick_owner(&m.league, 5), 3);
        assert!(report.to_string().contains("Free picks acquired: 1"));
    }

    #[test]
    fn wrong_phase_is_an_error() {
        let mut league = trade_up_league();
        league.set_phase(Phase::AfterDraft);
        let mut m = ScriptedMarket::new(league);
        let err = optimize_draft_trades(&mut m, &OptimizerLimits::default(), TradeUpMode::Path)
            .unwrap_err();
        assert!(err.to_string().contains("during the draft"));
    }

    #[test]
    fn no_picks_is_an_error() {
        let mut league = trade_up_league();
        league.draft_picks.retain(|dp| dp.tid != 3);
        let mut m = ScriptedMarket::new(league);
        assert!(
            optimize_draft_trades(&mut m, &OptimizerLimits::default(), TradeUpMode::Path).is_err()
        );
    }

    #[test]
    fn report_display_lists_picks() {
        let report = DraftTradeReport {
            trades_executed: 3,
            free_picks_acquired: 1,
            free_pick_trades: 2,
            final_picks: vec!["2025 1st round pick (#1)".into()],
        };
        let text = report.to_string();
        assert!(text.contains("Total trades executed: 3"));
        assert!(text.contains("  2025 1st round pick (#1)"));
    }
}
