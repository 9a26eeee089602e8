// Most valuable picks: buy picks with expiring contracts while absorbing the
// other team's negative players.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::league::{DraftPick, DraftSeason, Dpid, Pid, Player, Tid};
use crate::market::TradeMarket;
use crate::valuation::ValueChangeRequest;

use super::negatives::is_negative_tradable_player;
use super::pick_givers::{expiring_offer, pick_value};
use super::{combinations, execute_trade, other_teams, trade_between, OptimizerLimits};

/// A pick purchase: the AI team gives `dpids` plus `negative_pids`, the user
/// gives `offered_pids`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickDeal {
    pub tid: Tid,
    pub abbrev: String,
    pub dpids: Vec<Dpid>,
    pub pick_description: String,
    pub negative_pids: Vec<Pid>,
    pub offered_pids: Vec<Pid>,
    /// What the picks are worth to their owner.
    pub pick_value: f64,
    /// The owner's value change for the whole deal.
    pub trade_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValuablePicksReport {
    pub executed: Vec<PickDeal>,
    /// Best deal per team that needs longer contracts; not executed.
    pub remaining: Vec<PickDeal>,
}

impl fmt::Display for ValuablePicksReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Executed trades: {}", self.executed.len())?;
        for deal in &self.executed {
            writeln!(
                f,
                "  {}: {} for {} expiring contracts (value {:.2})",
                deal.abbrev,
                deal.pick_description,
                deal.offered_pids.len(),
                deal.pick_value
            )?;
        }
        if self.remaining.is_empty() {
            return writeln!(f, "No remaining trades for manual review");
        }
        writeln!(f, "Remaining trades for manual review:")?;
        for (i, deal) in self.remaining.iter().enumerate() {
            writeln!(
                f,
                "{}. {}: {} (value {:.2}) + {} players, dv {:.3}",
                i + 1,
                deal.abbrev,
                deal.pick_description,
                deal.pick_value,
                deal.negative_pids.len(),
                deal.trade_value
            )?;
        }
        Ok(())
    }
}

/// `1st(2025)+2nd(2025)`.
pub fn picks_description(picks: &[DraftPick]) -> String {
    picks
        .iter()
        .map(|dp| format!("{}({})", dp.round_label(), dp.season))
        .collect::<Vec<_>>()
        .join("+")
}

fn deal_value<M: TradeMarket + ?Sized>(
    market: &mut M,
    tid: Tid,
    negatives: &[Pid],
    dpids: &[Dpid],
    offered: &[Pid],
) -> Option<f64> {
    let req = ValueChangeRequest::new(tid)
        .add_players(offered.iter().copied())
        .remove_players(negatives.iter().copied())
        .remove_picks(dpids.iter().copied())
        .with_partner(market.user_tid());
    market.value_change(&req).ok()
}

/// Subset of `players` (the first `cap` only) whose deal leaves the owner
/// with the smallest positive value change.
fn optimal_combination<M: TradeMarket + ?Sized>(
    market: &mut M,
    tid: Tid,
    players: &[Pid],
    dpids: &[Dpid],
    offered: &[Pid],
    cap: usize,
) -> Option<(Vec<Pid>, f64)> {
    let pool = &players[..players.len().min(cap)];
    let mut best: Option<(Vec<Pid>, f64)> = None;
    for mask in 1u64..(1u64 << pool.len()) {
        let subset: Vec<Pid> = pool
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, pid)| *pid)
            .collect();
        let Some(dv) = deal_value(market, tid, &subset, dpids, offered) else {
            continue;
        };
        if dv > 0.0 && best.as_ref().map_or(true, |(_, b)| dv < *b) {
            best = Some((subset, dv));
        }
    }
    best
}

struct TeamDeals {
    type_a: Vec<PickDeal>,
    remaining: Vec<PickDeal>,
}

/// Every deal with `tid` for its 1st/2nd round picks in this draft, alone or
/// in pairs, cheapest first.
///
/// "Type A" deals take only players whose contracts end this season. Both
/// scans stop at the first pick combination the owner would not give up even
/// with every candidate player attached.
fn team_deals<M: TradeMarket + ?Sized>(
    market: &mut M,
    tid: Tid,
    offered: &[Pid],
    limits: &OptimizerLimits,
) -> TeamDeals {
    let mut deals = TeamDeals {
        type_a: Vec::new(),
        remaining: Vec::new(),
    };
    let season = market.season();
    let picks: Vec<DraftPick> = market
        .league()
        .draft_picks_by_tid(tid)
        .into_iter()
        .filter(|dp| (dp.round == 1 || dp.round == 2) && dp.season == DraftSeason::Year(season))
        .cloned()
        .collect();
    if picks.is_empty() {
        return deals;
    }

    let roster: Vec<Player> = market
        .league()
        .players_by_tid(tid)
        .into_iter()
        .cloned()
        .collect();
    let negatives: Vec<Player> = roster
        .into_iter()
        .filter(|p| is_negative_tradable_player(market, p, tid))
        .collect();
    if negatives.is_empty() {
        return deals;
    }

    let mut combos: Vec<Vec<DraftPick>> = combinations(&picks, 1);
    combos.extend(combinations(&picks, 2));
    let mut priced: Vec<(Vec<DraftPick>, f64)> = Vec::new();
    for combo in combos {
        let dpids: Vec<Dpid> = combo.iter().map(|dp| dp.dpid).collect();
        if let Some(value) = pick_value(market, tid, &dpids) {
            priced.push((combo, value));
        }
    }
    priced.sort_by(|a, b| a.1.total_cmp(&b.1));

    let abbrev = market
        .team(tid)
        .map_or_else(|| tid.to_string(), |t| t.abbrev.clone());
    let expiring: Vec<Pid> = negatives
        .iter()
        .filter(|p| p.contract.exp == season)
        .map(|p| p.pid)
        .collect();
    let all: Vec<Pid> = negatives.iter().map(|p| p.pid).collect();
    debug!(
        "{}: {} of {} negative players expire this season",
        abbrev,
        expiring.len(),
        all.len()
    );

    let make_deal = |picks: &[DraftPick], value: f64, negative_pids: Vec<Pid>, dv: f64| PickDeal {
        tid,
        abbrev: abbrev.clone(),
        dpids: picks.iter().map(|dp| dp.dpid).collect(),
        pick_description: picks_description(picks),
        negative_pids,
        offered_pids: offered.to_vec(),
        pick_value: value,
        trade_value: dv,
    };

    if !expiring.is_empty() {
        for (combo, value) in &priced {
            let dpids: Vec<Dpid> = combo.iter().map(|dp| dp.dpid).collect();
            let Some(dv_all) = deal_value(market, tid, &expiring, &dpids, offered) else {
                continue;
            };
            if dv_all <= 0.0 {
                break;
            }
            if let Some((pids, dv)) =
                optimal_combination(market, tid, &expiring, &dpids, offered, limits.max_combo_size)
            {
                deals.type_a.push(make_deal(combo, *value, pids, dv));
            }
        }
    }

    for (combo, value) in &priced {
        let dpids: Vec<Dpid> = combo.iter().map(|dp| dp.dpid).collect();
        let Some(dv_all) = deal_value(market, tid, &all, &dpids, offered) else {
            continue;
        };
        if dv_all <= 0.0 {
            break;
        }
        let Some((pids, dv)) =
            optimal_combination(market, tid, &all, &dpids, offered, limits.max_combo_size)
        else {
            continue;
        };
        let all_expiring = pids.iter().all(|pid| expiring.contains(pid));
        if !all_expiring {
            deals.remaining.push(make_deal(combo, *value, pids, dv));
        }
    }
    deals
}

fn execute_deal<M: TradeMarket + ?Sized>(market: &mut M, deal: &PickDeal) -> bool {
    let teams = trade_between(
        market.user_tid(),
        deal.offered_pids.clone(),
        vec![],
        deal.tid,
        deal.negative_pids.clone(),
        deal.dpids.clone(),
    );
    let description = format!(
        "Buying {} + {} players from {} for {} expiring contracts",
        deal.pick_description,
        deal.negative_pids.len(),
        deal.abbrev,
        deal.offered_pids.len()
    );
    execute_trade(market, &teams, &description)
}

/// Spend the user's expiring contracts on the most valuable picks available.
///
/// Type A deals are searched across all AI teams and the most valuable one
/// that goes through is executed; this repeats with the players still on
/// offer for up to `max_willing_iterations` rounds. Afterwards the best
/// remaining deal per team is collected for manual review.
pub fn find_most_valuable_picks<M: TradeMarket + ?Sized>(
    market: &mut M,
    limits: &OptimizerLimits,
) -> ValuablePicksReport {
    let mut offered: Vec<Pid> = expiring_offer(market).iter().map(|p| p.pid).collect();
    let teams = other_teams(market.league());
    info!(
        "Checking {} teams with {} expiring contracts on offer",
        teams.len(),
        offered.len()
    );

    let mut report = ValuablePicksReport::default();
    let mut iteration = 0;
    while !offered.is_empty() && iteration < limits.max_willing_iterations {
        iteration += 1;

        let mut type_a: Vec<PickDeal> = Vec::new();
        for &tid in &teams {
            type_a.extend(team_deals(market, tid, &offered, limits).type_a);
        }
        if type_a.is_empty() {
            debug!("No type A deals left after {} rounds", iteration - 1);
            break;
        }
        type_a.sort_by(|a, b| b.pick_value.total_cmp(&a.pick_value));

        let Some(done) = type_a.into_iter().find(|deal| execute_deal(market, deal)) else {
            break;
        };
        offered.retain(|pid| !done.offered_pids.contains(pid));
        report.executed.push(done);
    }

    for &tid in &teams {
        let best = team_deals(market, tid, &offered, limits)
            .remaining
            .into_iter()
            .max_by(|a, b| a.pick_value.total_cmp(&b.pick_value));
        report.remaining.extend(best);
    }
    report
        .remaining
        .sort_by(|a, b| b.pick_value.total_cmp(&a.pick_value));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::Phase;
    use crate::optimizer::test_support::{pick_owner, trade_up_league, ScriptedMarket};

    /// Regular season. The user's 60 (pid 9) expires this season, so does
    /// team 2's scrub (pid 8). Team 1's scrubs (-15, -16) run through 2027.
    fn market() -> ScriptedMarket {
        let mut league = trade_up_league();
        league.set_phase(Phase::RegularSeason);
        league.player_mut(9).unwrap().contract.exp = 2025;
        league.player_mut(8).unwrap().contract.exp = 2025;
        league.player_mut(4).unwrap().value = 35.0;
        league.player_mut(5).unwrap().value = 34.0;
        ScriptedMarket::new(league)
    }

    #[test]
    fn executes_type_a_and_reports_the_rest() {
        let mut m = market();
        let report = find_most_valuable_picks(&mut m, &OptimizerLimits::default());

        assert_eq!(report.executed.len(), 1);
        let done = &report.executed[0];
        assert_eq!(done.abbrev, "T2");
        assert_eq!(done.dpids, vec![6]);
        assert_eq!(done.negative_pids, vec![8]);
        assert_eq!(done.offered_pids, vec![9]);
        assert!((done.trade_value - 12.0).abs() < 1e-9);
        assert_eq!(pick_owner(&m.league, 6), 3);
        assert_eq!(m.league.player(9).unwrap().tid, 2);

        assert_eq!(report.remaining.len(), 1);
        let rest = &report.remaining[0];
        assert_eq!(rest.abbrev, "T1");
        assert_eq!(rest.pick_description, "2nd(2025)");
        assert_eq!(rest.negative_pids, vec![4, 5]);
        assert!(rest.offered_pids.is_empty());
        assert!((rest.pick_value - 30.0).abs() < 1e-9);
        assert_eq!(pick_owner(&m.league, 5), 1);
    }

    #[test]
    fn nothing_to_offer_after_the_playoffs() {
        let mut m = market();
        m.league.set_phase(Phase::Draft);
        let report = find_most_valuable_picks(&mut m, &OptimizerLimits::default());
        assert!(report.executed.is_empty());
        assert_eq!(m.proposals, 0);
    }

    #[test]
    fn description_lists_each_pick() {
        let m = market();
        let picks: Vec<DraftPick> = [1, 5]
            .iter()
            .map(|dpid| m.league.draft_pick(*dpid).unwrap().clone())
            .collect();
        assert_eq!(picks_description(&picks), "1st(2025)+2nd(2025)");
    }

    #[test]
    fn report_display() {
        let mut m = market();
        let text = find_most_valuable_picks(&mut m, &OptimizerLimits::default()).to_string();
        assert!(text.contains("Executed trades: 1"));
        assert!(text.contains("1. T1: 2nd(2025)"));
    }
}
