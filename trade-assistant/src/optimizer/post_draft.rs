// Post-draft cleanup: move unwanted contracts out and prospects in.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::league::{Dpid, Pid, Player, Strategy, Tid};
use crate::market::TradeMarket;
use crate::trade::TradeTeams;
use crate::valuation::ValueChangeRequest;

use super::negatives::removal_gain;
use super::{combinations, execute_trade, other_teams, players_label, trade_between};

/// Players this young are never traded away.
const MAX_PROTECTED_AGE: i32 = 22;
/// Lowest potential that makes an undrafted-this-year player a prospect.
const MIN_PROSPECT_POT: f64 = 50.0;
/// Contract amounts are stored in thousands.
const CONTRACT_UNIT: f64 = 1000.0;
/// Combination searches take at most this many contracts from one side.
const MAX_CONTRACTS_PER_SIDE: usize = 2;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DumpableContracts {
    /// Tradable players no AI team would give its worst pick for.
    pub dumpable: Vec<Pid>,
    pub high_value: Vec<Pid>,
    pub total: usize,
    pub tradable: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProspectTrade {
    pub tid: Tid,
    pub given: Pid,
    pub received: Pid,
    pub dv: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainTrade {
    pub tid: Tid,
    pub prospects: Vec<Pid>,
    /// Contracts the user sent back.
    pub given: Vec<Pid>,
    /// Contracts the user absorbed along with the prospects.
    pub absorbed: Vec<Pid>,
    pub dv: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChainingReport {
    pub trades: Vec<ChainTrade>,
    /// Absorbed contracts still on the user's roster.
    pub bad_contracts_held: Vec<Pid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostDraftReport {
    pub dumpable: usize,
    pub high_value: usize,
    pub prospect_trades: Vec<ProspectTrade>,
    pub chaining: ChainingReport,
}

impl fmt::Display for PostDraftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Post-draft optimization complete")?;
        writeln!(
            f,
            "Dumpable contracts: {} (high value: {})",
            self.dumpable, self.high_value
        )?;
        writeln!(f, "Prospect trades: {}", self.prospect_trades.len())?;
        writeln!(f, "Chaining trades: {}", self.chaining.trades.len())?;
        writeln!(
            f,
            "Bad contracts held: {}",
            self.chaining.bad_contracts_held.len()
        )
    }
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// AI value change for `teams`, when positive and the trade raises no cap
/// warning for either side.
fn acceptable_dv<M: TradeMarket + ?Sized>(market: &mut M, teams: &TradeTeams) -> Option<f64> {
    match market.summary(teams) {
        Ok(summary) => {
            if let Some(warning) = summary.warning.filter(|w| w.contains("cap")) {
                debug!("Rejected for cap: {}", warning);
                return None;
            }
        }
        Err(e) => {
            debug!("Cannot summarize trade: {}", e);
            return None;
        }
    }
    let [user, ai] = teams;
    let req = ValueChangeRequest::new(ai.tid)
        .add_players(user.pids.iter().copied())
        .remove_players(ai.pids.iter().copied())
        .with_partner(user.tid);
    market.value_change(&req).ok().filter(|dv| *dv > 0.0)
}

fn team_label<M: TradeMarket + ?Sized>(market: &M, tid: Tid) -> String {
    market
        .team(tid)
        .map_or_else(|| tid.to_string(), |t| t.abbrev.clone())
}

// ---------------------------------------------------------------------------
// Dumpable contracts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorstPick {
    pub tid: Tid,
    pub dpid: Dpid,
    /// Value change for giving the pick away; closest to zero is worst.
    pub dv: f64,
}

/// Each contending AI team's least valuable pick (every AI team's when none
/// is contending), worst first.
pub fn teams_worst_picks<M: TradeMarket + ?Sized>(market: &mut M) -> Vec<WorstPick> {
    let user_tid = market.user_tid();
    let ai: Vec<(Tid, Strategy)> = market
        .league()
        .ai_teams()
        .map(|t| (t.tid, t.strategy))
        .collect();
    let contending: Vec<Tid> = ai
        .iter()
        .filter(|(_, s)| *s == Strategy::Contending)
        .map(|(tid, _)| *tid)
        .collect();
    let teams = if contending.is_empty() {
        ai.iter().map(|(tid, _)| *tid).collect()
    } else {
        contending
    };

    let mut out = Vec::new();
    for tid in teams {
        let dpids: Vec<Dpid> = market
            .league()
            .draft_picks_by_tid(tid)
            .into_iter()
            .map(|dp| dp.dpid)
            .collect();
        let mut worst: Option<WorstPick> = None;
        for dpid in dpids {
            let req = ValueChangeRequest::new(tid)
                .remove_picks([dpid])
                .with_partner(user_tid);
            let Ok(dv) = market.value_change(&req) else {
                continue;
            };
            if worst.map_or(true, |w| dv > w.dv) {
                worst = Some(WorstPick { tid, dpid, dv });
            }
        }
        out.extend(worst);
    }
    out.sort_by(|a, b| b.dv.total_cmp(&a.dv));
    out
}

/// The user's players that may be traded away here: tradable, older than
/// 22, not drafted by the user, not drafted this season.
fn movable_players<M: TradeMarket + ?Sized>(market: &M) -> (usize, Vec<Player>) {
    let user_tid = market.user_tid();
    let season = market.season();
    let roster = market.league().players_by_tid(user_tid);
    let total = roster.len();
    let movable = roster
        .into_iter()
        .filter(|p| {
            !market.is_untradable(p)
                && p.age(season) > MAX_PROTECTED_AGE
                && p.draft.original_tid != user_tid
                && p.draft.year != season
        })
        .cloned()
        .collect();
    (total, movable)
}

/// Split the user's movable players into those some AI team would give its
/// worst pick for and the rest.
pub fn identify_dumpable_contracts<M: TradeMarket + ?Sized>(market: &mut M) -> DumpableContracts {
    let user_tid = market.user_tid();
    let (total, movable) = movable_players(market);
    let mut report = DumpableContracts {
        total,
        tradable: movable.len(),
        ..Default::default()
    };
    let worst_picks = teams_worst_picks(market);
    if worst_picks.is_empty() {
        info!("No AI picks to compare contracts against");
        return report;
    }

    for p in &movable {
        let high_value = worst_picks.iter().any(|w| {
            let req = ValueChangeRequest::new(w.tid)
                .add_players([p.pid])
                .remove_picks([w.dpid])
                .with_partner(user_tid);
            market.value_change(&req).map_or(false, |dv| dv > 0.0)
        });
        if high_value {
            report.high_value.push(p.pid);
        } else {
            report.dumpable.push(p.pid);
        }
    }
    info!(
        "Found {} dumpable contracts out of {} tradable players",
        report.dumpable.len(),
        report.tradable
    );
    report
}

// ---------------------------------------------------------------------------
// Straight-up prospect trades
// ---------------------------------------------------------------------------

/// Trade dumpable contracts one for one for players drafted this season,
/// taking the swap the AI likes best for each contract. The contract list
/// is rebuilt after every completed trade.
pub fn find_prospect_trades<M: TradeMarket + ?Sized>(
    market: &mut M,
    dumpable: &[Pid],
) -> Vec<ProspectTrade> {
    let user_tid = market.user_tid();
    let season = market.season();
    let mut drafted: Vec<Pid> = market
        .league()
        .players_in_league()
        .into_iter()
        .filter(|p| p.draft.year == season && p.tid != user_tid)
        .map(|p| p.pid)
        .collect();
    if drafted.is_empty() {
        info!("No drafted players to trade for");
        return Vec::new();
    }

    let mut dumpable = dumpable.to_vec();
    let mut trades = Vec::new();
    loop {
        let mut made = None;
        for &ours in &dumpable {
            let mut best: Option<(Tid, Pid, f64)> = None;
            for &theirs in &drafted {
                let Some(tid) = market.league().player(theirs).map(|p| p.tid) else {
                    continue;
                };
                if tid == user_tid {
                    continue;
                }
                let teams = trade_between(user_tid, vec![ours], vec![], tid, vec![theirs], vec![]);
                let Some(dv) = acceptable_dv(market, &teams) else {
                    continue;
                };
                if best.map_or(true, |(_, _, b)| dv > b) {
                    best = Some((tid, theirs, dv));
                }
            }
            let Some((tid, theirs, dv)) = best else {
                continue;
            };
            let teams = trade_between(user_tid, vec![ours], vec![], tid, vec![theirs], vec![]);
            let description = format!(
                "Prospect trade: {} for {}",
                players_label(market.league(), &[ours]),
                players_label(market.league(), &[theirs])
            );
            if execute_trade(market, &teams, &description) {
                made = Some(ProspectTrade {
                    tid,
                    given: ours,
                    received: theirs,
                    dv,
                });
                break;
            }
        }
        let Some(trade) = made else {
            break;
        };
        drafted.retain(|pid| *pid != trade.received);
        trades.push(trade);
        dumpable = identify_dumpable_contracts(market).dumpable;
    }
    info!("Prospect trades completed: {}", trades.len());
    trades
}

// ---------------------------------------------------------------------------
// Chaining
// ---------------------------------------------------------------------------

/// Most a tier-2 prospect may earn, in dollars, given the potential.
fn salary_limit(pot: f64) -> f64 {
    if pot >= 58.0 {
        f64::INFINITY
    } else if pot >= 55.0 {
        5_000_000.0
    } else if pot >= 53.0 {
        2_000_000.0
    } else if pot >= MIN_PROSPECT_POT {
        1_000_000.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Default)]
struct Prospects {
    /// Drafted this season.
    tier1: Vec<Player>,
    /// High potential on a contract that fits it.
    tier2: Vec<Player>,
}

impl Prospects {
    fn pids(&self) -> HashSet<Pid> {
        self.tier1.iter().chain(&self.tier2).map(|p| p.pid).collect()
    }
}

fn all_prospects<M: TradeMarket + ?Sized>(market: &M) -> Prospects {
    let season = market.season();
    let mut out = Prospects::default();
    for tid in other_teams(market.league()) {
        for p in market.league().players_by_tid(tid) {
            if p.draft.year == season {
                out.tier1.push(p.clone());
            } else if p.pot() >= MIN_PROSPECT_POT
                && p.contract.amount * CONTRACT_UNIT <= salary_limit(p.pot())
            {
                out.tier2.push(p.clone());
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BadContract {
    pid: Pid,
    dv: f64,
    age: i32,
}

/// Players `tid` would give away for nothing, least eager first. Prospects,
/// players drafted by the user and this season's draftees are skipped.
fn find_bad_contracts<M: TradeMarket + ?Sized>(
    market: &mut M,
    tid: Tid,
    prospect_pids: &HashSet<Pid>,
) -> Vec<BadContract> {
    let user_tid = market.user_tid();
    let season = market.season();
    let roster: Vec<Player> = market
        .league()
        .players_by_tid(tid)
        .into_iter()
        .filter(|p| {
            p.draft.original_tid != user_tid
                && !prospect_pids.contains(&p.pid)
                && p.draft.year != season
                && !market.is_untradable(p)
        })
        .cloned()
        .collect();

    let mut out: Vec<BadContract> = roster
        .into_iter()
        .filter_map(|p| {
            let dv = removal_gain(market, tid, &[p.pid]);
            (dv >= 0.0).then(|| BadContract {
                pid: p.pid,
                dv,
                age: p.age(season),
            })
        })
        .collect();
    out.sort_by(|a, b| a.dv.total_cmp(&b.dv).then(a.age.cmp(&b.age)));
    out
}

fn contract_pids(contracts: &[BadContract]) -> Vec<Pid> {
    contracts.iter().map(|c| c.pid).collect()
}

/// Combinations of 1 and then 2 of `contracts`, each size ordered by
/// `key` ascending.
fn ordered_combos(
    contracts: &[BadContract],
    key: impl Fn(&[BadContract]) -> f64,
) -> Vec<Vec<BadContract>> {
    let mut out = Vec::new();
    for size in 1..=contracts.len().min(MAX_CONTRACTS_PER_SIDE) {
        let mut combos = combinations(contracts, size);
        combos.sort_by(|a, b| key(a.as_slice()).total_cmp(&key(b.as_slice())));
        out.extend(combos);
    }
    out
}

struct TeamTarget {
    tid: Tid,
    prospects: Vec<Player>,
    bad_contracts: Vec<BadContract>,
}

/// Test and, if the AI team accepts, execute: the user gives `ours` and
/// receives `prospects` plus `theirs`.
fn try_chain_trade<M: TradeMarket + ?Sized>(
    market: &mut M,
    tid: Tid,
    prospects: &[Pid],
    ours: &[BadContract],
    theirs: &[BadContract],
) -> Option<ChainTrade> {
    let user_tid = market.user_tid();
    let ours = contract_pids(ours);
    let theirs = contract_pids(theirs);
    let ai_pids: Vec<Pid> = prospects.iter().chain(&theirs).copied().collect();
    let teams = trade_between(user_tid, ours.clone(), vec![], tid, ai_pids, vec![]);
    let dv = acceptable_dv(market, &teams)?;

    let description = format!(
        "Chaining trade with {}: {} + {} for {}",
        team_label(market, tid),
        players_label(market.league(), prospects),
        players_label(market.league(), &theirs),
        players_label(market.league(), &ours)
    );
    if !execute_trade(market, &teams, &description) {
        return None;
    }
    Some(ChainTrade {
        tid,
        prospects: prospects.to_vec(),
        given: ours,
        absorbed: theirs,
        dv,
    })
}

/// Search one team: our held contracts with theirs, then theirs alone, then
/// single prospects, then ever fewer prospects with all their contracts.
fn chain_with_team<M: TradeMarket + ?Sized>(
    market: &mut M,
    target: &TeamTarget,
    held: &[BadContract],
) -> Option<ChainTrade> {
    let tid = target.tid;
    let prospects: Vec<Pid> = target.prospects.iter().map(|p| p.pid).collect();
    let total = |c: &[BadContract]| c.iter().map(|b| b.dv).sum::<f64>();
    let theirs_combos = ordered_combos(&target.bad_contracts, total);

    if !held.is_empty() {
        let mut ours_sorted = held.to_vec();
        ours_sorted.sort_by(|a, b| a.dv.total_cmp(&b.dv));
        for ours in ordered_combos(&ours_sorted, |c| -total(c).abs()) {
            for theirs in &theirs_combos {
                if let Some(trade) = try_chain_trade(market, tid, &prospects, &ours, theirs) {
                    return Some(trade);
                }
            }
        }
    }

    for theirs in &theirs_combos {
        if let Some(trade) = try_chain_trade(market, tid, &prospects, &[], theirs) {
            return Some(trade);
        }
    }

    for &prospect in &prospects {
        for theirs in &target.bad_contracts {
            let theirs = std::slice::from_ref(theirs);
            if let Some(trade) = try_chain_trade(market, tid, &[prospect], &[], theirs) {
                return Some(trade);
            }
        }
    }

    let mut fewer = prospects;
    while fewer.len() > 1 {
        fewer.pop();
        let teams = trade_between(
            market.user_tid(),
            vec![],
            vec![],
            tid,
            fewer.iter().copied().chain(contract_pids(&target.bad_contracts)).collect(),
            vec![],
        );
        if acceptable_dv(market, &teams).is_some() {
            return try_chain_trade(market, tid, &fewer, &[], &target.bad_contracts);
        }
    }
    None
}

/// Take prospects off AI teams by also absorbing the contracts those teams
/// want gone, passing absorbed contracts along to later teams where they
/// help. Teams whose least unwanted contract is closest to neutral go first.
pub fn acquire_prospects_through_chaining<M: TradeMarket + ?Sized>(
    market: &mut M,
) -> ChainingReport {
    let prospects = all_prospects(market);
    info!(
        "Found prospects: tier 1 ({}), tier 2 ({})",
        prospects.tier1.len(),
        prospects.tier2.len()
    );
    if prospects.tier1.is_empty() && prospects.tier2.is_empty() {
        return ChainingReport::default();
    }
    let prospect_pids = prospects.pids();

    let mut targets: Vec<TeamTarget> = Vec::new();
    let mut without_contracts: HashSet<Tid> = HashSet::new();
    for (tier, list) in [(1, &prospects.tier1), (2, &prospects.tier2)] {
        for p in list {
            if without_contracts.contains(&p.tid) {
                continue;
            }
            if let Some(target) = targets.iter_mut().find(|t| t.tid == p.tid) {
                target.prospects.push(p.clone());
                continue;
            }
            let bad_contracts = find_bad_contracts(market, p.tid, &prospect_pids);
            debug!(
                "Team {}: {} bad contracts (first tier {} prospect {})",
                p.tid,
                bad_contracts.len(),
                tier,
                p.pid
            );
            if bad_contracts.is_empty() {
                without_contracts.insert(p.tid);
                continue;
            }
            targets.push(TeamTarget {
                tid: p.tid,
                prospects: vec![p.clone()],
                bad_contracts,
            });
        }
    }
    targets.sort_by(|a, b| a.bad_contracts[0].dv.total_cmp(&b.bad_contracts[0].dv));

    let season = market.season();
    let mut report = ChainingReport::default();
    let mut held: Vec<BadContract> = Vec::new();
    for target in &mut targets {
        // tier 1 first, then by value
        target.prospects.sort_by(|a, b| {
            (b.draft.year == season)
                .cmp(&(a.draft.year == season))
                .then(b.value.total_cmp(&a.value))
        });
        info!(
            "Team {}: {} prospects, {} bad contracts",
            target.tid,
            target.prospects.len(),
            target.bad_contracts.len()
        );

        let user_tid = market.user_tid();
        held.retain(|c| market.league().player(c.pid).map_or(false, |p| p.tid == user_tid));
        let Some(trade) = chain_with_team(market, target, &held) else {
            debug!("No chaining trade found with team {}", target.tid);
            continue;
        };
        held.retain(|c| !trade.given.contains(&c.pid));
        held.extend(
            target
                .bad_contracts
                .iter()
                .filter(|c| trade.absorbed.contains(&c.pid)),
        );
        report.trades.push(trade);
    }

    report.bad_contracts_held = contract_pids(&held);
    info!(
        "Chaining trades completed: {}; bad contracts held: {}",
        report.trades.len(),
        report.bad_contracts_held.len()
    );
    report
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Dump unwanted contracts for this year's draftees, then chain absorbed
/// contracts into more prospects. Users with an empty roster go straight to
/// chaining.
pub fn post_draft_optimize<M: TradeMarket + ?Sized>(market: &mut M) -> PostDraftReport {
    let user_tid = market.user_tid();
    let mut report = PostDraftReport::default();

    if market.league().players_by_tid(user_tid).is_empty() {
        info!("No players on the user's team; going straight to prospect acquisition");
    } else {
        let dump = identify_dumpable_contracts(market);
        report.dumpable = dump.dumpable.len();
        report.high_value = dump.high_value.len();
        report.prospect_trades = find_prospect_trades(market, &dump.dumpable);
    }
    report.chaining = acquire_prospects_through_chaining(market);
    info!("Post-draft optimization complete");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::test_support::LeagueBuilder;
    use crate::league::{League, Phase};
    use crate::optimizer::test_support::ScriptedMarket;

    /// User (team 0) holds 70, 52, 45 plus a 21-year-old (pid 3) and a
    /// player the user drafted (pid 4). Team 1 drafted pid 6 (worth -5) and
    /// carries pid 7 (worth -3); team 2 drafted pid 9 (worth -2).
    fn post_draft_league() -> League {
        let mut league = LeagueBuilder::new(4)
            .phase(Phase::AfterDraft)
            .slotted_picks()
            .roster(0, &[70.0, 52.0, 45.0, 80.0, 80.0])
            .roster(1, &[60.0, 45.0, 47.0])
            .roster(2, &[60.0, 48.0])
            .roster(3, &[60.0])
            .build();
        league.player_mut(3).unwrap().born_year = 2004;
        league.player_mut(4).unwrap().draft.original_tid = 0;
        league.player_mut(6).unwrap().draft.year = 2025;
        league.player_mut(9).unwrap().draft.year = 2025;
        league
    }

    /// Three teams, empty user roster. Team 1: 40 (pid 0), 45 (pid 1) and
    /// draftee pid 2 (44). Team 2: 48 (pid 3) and draftee pid 4 (30).
    fn chaining_league() -> League {
        let mut league = LeagueBuilder::new(3)
            .phase(Phase::AfterDraft)
            .slotted_picks()
            .roster(1, &[40.0, 45.0, 44.0])
            .roster(2, &[48.0, 30.0])
            .build();
        league.player_mut(2).unwrap().draft.year = 2025;
        league.player_mut(4).unwrap().draft.year = 2025;
        league
    }

    fn owner(m: &ScriptedMarket, pid: Pid) -> Tid {
        m.league.player(pid).unwrap().tid
    }

    #[test]
    fn worst_picks_prefer_contending_teams() {
        let mut m = ScriptedMarket::new(post_draft_league());
        let worst = teams_worst_picks(&mut m);
        // team 3's #8 (worth 10), team 1's #6 (worth 30)
        assert_eq!(
            worst.iter().map(|w| (w.tid, w.dpid)).collect::<Vec<_>>(),
            vec![(3, 7), (1, 5)]
        );
        assert!((worst[0].dv + 10.0).abs() < 1e-9);

        for team in &mut m.league.teams {
            team.strategy = Strategy::Rebuilding;
        }
        let worst = teams_worst_picks(&mut m);
        assert_eq!(worst.iter().map(|w| w.tid).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn dumpable_contracts_skip_protected_players() {
        let mut m = ScriptedMarket::new(post_draft_league());
        let dump = identify_dumpable_contracts(&mut m);
        assert_eq!(dump.total, 5);
        assert_eq!(dump.tradable, 3);
        assert_eq!(dump.high_value, vec![0]);
        assert_eq!(dump.dumpable, vec![1, 2]);
    }

    #[test]
    fn everything_is_kept_without_ai_picks() {
        let mut league = post_draft_league();
        league.draft_picks.retain(|dp| dp.tid == 0);
        let mut m = ScriptedMarket::new(league);
        let dump = identify_dumpable_contracts(&mut m);
        assert!(dump.dumpable.is_empty());
        assert!(dump.high_value.is_empty());
        assert_eq!(dump.tradable, 3);
    }

    #[test]
    fn prospect_trade_takes_the_swap_the_ai_likes_most() {
        let mut m = ScriptedMarket::new(post_draft_league());
        let trades = find_prospect_trades(&mut m, &[1, 2]);
        assert_eq!(
            trades,
            vec![ProspectTrade {
                tid: 1,
                given: 1,
                received: 6,
                dv: 7.0,
            }]
        );
        assert_eq!(owner(&m, 6), 0);
        assert_eq!(owner(&m, 1), 1);
        assert_eq!(owner(&m, 9), 2);
    }

    #[test]
    fn salary_limits_follow_potential() {
        assert_eq!(salary_limit(60.0), f64::INFINITY);
        assert_eq!(salary_limit(56.0), 5_000_000.0);
        assert_eq!(salary_limit(53.5), 2_000_000.0);
        assert_eq!(salary_limit(50.0), 1_000_000.0);
        assert_eq!(salary_limit(49.9), 0.0);
    }

    #[test]
    fn prospects_are_tiered() {
        let m = ScriptedMarket::new(post_draft_league());
        let prospects = all_prospects(&m);
        let tier1: Vec<Pid> = prospects.tier1.iter().map(|p| p.pid).collect();
        let tier2: Vec<Pid> = prospects.tier2.iter().map(|p| p.pid).collect();
        assert_eq!(tier1, vec![6, 9]);
        // 60 potential is unlimited; 45-48 are below the floor
        assert_eq!(tier2, vec![5, 8, 10]);
    }

    #[test]
    fn bad_contracts_least_eager_first() {
        let mut m = ScriptedMarket::new(chaining_league());
        let found = find_bad_contracts(&mut m, 1, &HashSet::from([2]));
        assert_eq!(contract_pids(&found), vec![1, 0]);
        assert!((found[0].dv - 5.0).abs() < 1e-9);
    }

    #[test]
    fn chaining_passes_absorbed_contracts_along() {
        let mut m = ScriptedMarket::new(chaining_league());
        let report = acquire_prospects_through_chaining(&mut m);

        assert_eq!(report.trades.len(), 2);
        // team 2's lone contract (dv 2) is the most neutral, so it goes first
        let first = &report.trades[0];
        assert_eq!((first.tid, first.prospects.clone()), (2, vec![4]));
        assert!(first.given.is_empty());
        assert_eq!(first.absorbed, vec![3]);
        // that contract then goes to team 1 with the draftee
        let second = &report.trades[1];
        assert_eq!((second.tid, second.prospects.clone()), (1, vec![2]));
        assert_eq!(second.given, vec![3]);
        assert_eq!(second.absorbed, vec![1]);
        assert!((second.dv - 9.0).abs() < 1e-9);

        assert_eq!(report.bad_contracts_held, vec![1]);
        assert_eq!(owner(&m, 3), 1);
        assert_eq!(owner(&m, 2), 0);
    }

    #[test]
    fn single_prospect_fallback() {
        // draftees worth +20 (pid 0) and -5 (pid 1), one contract at -2
        let mut league = LeagueBuilder::new(2)
            .phase(Phase::AfterDraft)
            .roster(1, &[70.0, 45.0, 48.0])
            .build();
        league.player_mut(0).unwrap().draft.year = 2025;
        league.player_mut(1).unwrap().draft.year = 2025;
        let mut m = ScriptedMarket::new(league);
        let report = acquire_prospects_through_chaining(&mut m);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].prospects, vec![1]);
        assert_eq!(report.trades[0].absorbed, vec![2]);
        assert_eq!(owner(&m, 0), 1);
    }

    #[test]
    fn fewer_prospects_fallback_takes_every_contract() {
        // draftees worth +5 (pid 0) and +3 (pid 1), three contracts at -2
        let mut league = LeagueBuilder::new(2)
            .phase(Phase::AfterDraft)
            .roster(1, &[55.0, 53.0, 48.0, 48.0, 48.0])
            .build();
        league.player_mut(0).unwrap().draft.year = 2025;
        league.player_mut(1).unwrap().draft.year = 2025;
        let mut m = ScriptedMarket::new(league);
        let report = acquire_prospects_through_chaining(&mut m);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].prospects, vec![0]);
        assert_eq!(report.trades[0].absorbed, vec![2, 3, 4]);
        assert_eq!(report.bad_contracts_held, vec![2, 3, 4]);
    }

    #[test]
    fn full_run_dumps_then_chains() {
        let mut m = ScriptedMarket::new(post_draft_league());
        let report = post_draft_optimize(&mut m);
        assert_eq!(report.dumpable, 2);
        assert_eq!(report.high_value, 1);
        assert_eq!(report.prospect_trades.len(), 1);
        // team 1's 60 is the only prospect left with a contract to absorb,
        // and taking both costs the AI too much
        assert!(report.chaining.trades.is_empty());
        let text = report.to_string();
        assert!(text.contains("Prospect trades: 1"));
        assert!(text.contains("Chaining trades: 0"));
    }

    #[test]
    fn empty_roster_goes_straight_to_chaining() {
        let mut m = ScriptedMarket::new(chaining_league());
        let report = post_draft_optimize(&mut m);
        assert_eq!(report.dumpable, 0);
        assert!(report.prospect_trades.is_empty());
        assert_eq!(report.chaining.trades.len(), 2);
    }
}
