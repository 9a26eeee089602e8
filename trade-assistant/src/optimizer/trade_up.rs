// Trading up: cheapest path of pick swaps from a user pick to the best pick
// reachable, plus the greedy chain and the reachability probe.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::league::{DraftPick, DraftSeason, Dpid, Pid, Player, Tid};
use crate::market::TradeMarket;
use crate::valuation::ValueChangeRequest;

use super::negatives::{removal_gain, team_negative_players};
use super::{evaluate_trade, execute_trade, players_label, trade_between, OptimizerLimits};

/// One swap on a trade-up path: the user gives `from` (plus `our_neg_pids`)
/// and receives `to` together with `neg_pids` from its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeStep {
    pub from: DraftPick,
    pub to: DraftPick,
    pub neg_pids: Vec<Pid>,
    pub our_neg_pids: Vec<Pid>,
    /// Minus the AI team's value change.
    pub cost: f64,
}

#[derive(Debug, Clone)]
struct Offer {
    their: Vec<Pid>,
    ours: Vec<Pid>,
    total_neg_value: f64,
    our_dump_value: f64,
    dv: f64,
    score: f64,
}

// ---------------------------------------------------------------------------
// Edge evaluation
// ---------------------------------------------------------------------------

/// Best accepted offer for swapping `from` up to `to`.
///
/// 1. The plain swap.
/// 2. Their negative players one at a time, then in pairs when no single
///    offer clears `pair_search_threshold`, scored by dv minus a penalty on
///    the value taken on.
/// 3. Windows of our own negative players added to the best offer while
///    each raises the dv.
///
/// The heuristic offer wins over the plain swap only when it dumps some of
/// our players or takes on less than the swap does.
fn best_offer<M: TradeMarket + ?Sized>(
    market: &mut M,
    from: Dpid,
    to: &DraftPick,
    theirs: &[Player],
    ours: &[Player],
    limits: &OptimizerLimits,
) -> Option<Offer> {
    let user_tid = market.user_tid();
    let swap = |their: Vec<Pid>, our: Vec<Pid>| {
        trade_between(user_tid, our, vec![from], to.tid, their, vec![to.dpid])
    };

    let base_dv = evaluate_trade(market, &swap(vec![], vec![]));
    let base = (base_dv > 0.0).then(|| Offer {
        their: vec![],
        ours: vec![],
        total_neg_value: 0.0,
        our_dump_value: 0.0,
        dv: base_dv,
        score: base_dv,
    });

    let mut best: Option<Offer> = None;
    let consider = |best: &mut Option<Offer>, their: &[&Player], dv: f64| {
        let total_neg_value: f64 = their.iter().map(|p| p.value.abs()).sum();
        let score = dv - total_neg_value * limits.taken_value_weight;
        if dv > 0.0 && best.as_ref().map_or(true, |b| score > b.score) {
            *best = Some(Offer {
                their: their.iter().map(|p| p.pid).collect(),
                ours: vec![],
                total_neg_value,
                our_dump_value: 0.0,
                dv,
                score,
            });
        }
    };

    for p in theirs.iter().take(limits.single_candidates) {
        let dv = evaluate_trade(market, &swap(vec![p.pid], vec![]));
        consider(&mut best, &[p], dv);
    }

    if best
        .as_ref()
        .map_or(true, |b| b.dv < limits.pair_search_threshold)
    {
        let outer = limits.pair_outer.min(theirs.len());
        let inner = limits.pair_inner.min(theirs.len());
        for i in 0..outer {
            for j in i + 1..inner {
                let pair = [&theirs[i], &theirs[j]];
                let dv = evaluate_trade(market, &swap(vec![pair[0].pid, pair[1].pid], vec![]));
                consider(&mut best, &pair, dv);
            }
        }
    }

    if let Some(offer) = best.as_mut() {
        let max_ours = limits.max_sweeteners.min(ours.len());
        let mut improved = false;
        for size in 1..=max_ours {
            for window in ours.windows(size) {
                let our_pids: Vec<Pid> = window.iter().map(|p| p.pid).collect();
                let dv = evaluate_trade(market, &swap(offer.their.clone(), our_pids.clone()));
                if dv <= offer.dv {
                    break;
                }
                let dump: f64 = window.iter().map(|p| p.value).sum();
                offer.score = dv - offer.total_neg_value * limits.taken_value_weight
                    + dump.abs() * limits.dump_value_weight;
                offer.ours = our_pids;
                offer.our_dump_value = dump;
                offer.dv = dv;
                improved = true;
            }
            if size == 1 && !improved {
                break;
            }
        }
    }

    let (floor_neg, floor_dump) = match &base {
        Some(b) => (b.total_neg_value, b.our_dump_value),
        None => (f64::INFINITY, 0.0),
    };
    match best {
        Some(offer)
            if offer.dv > 0.0
                && (offer.our_dump_value > floor_dump || offer.total_neg_value < floor_neg) =>
        {
            Some(offer)
        }
        _ => base,
    }
}

// ---------------------------------------------------------------------------
// Path search
// ---------------------------------------------------------------------------

/// Cheapest sequence of swaps from `start` to the best pick reachable in the
/// same draft, where a step costs minus the AI's value change.
///
/// Nodes are the draft's picks owned by active teams; from each popped pick
/// every strictly better pick not owned by the user is tried with
/// `best_offer`. A pick re-enters the queue only while fewer than
/// `max_path_steps` picks have a predecessor, and the search stops after
/// `max_search_iterations` pops. Returns `None` when no pick is reachable.
pub fn find_optimal_trade_up_path<M: TradeMarket + ?Sized>(
    market: &mut M,
    start: &DraftPick,
    our_negatives: &[Player],
    limits: &OptimizerLimits,
) -> Option<Vec<TradeStep>> {
    let user_tid = market.user_tid();
    let draft_year = start.season.resolve(market.season());

    let mut picks: Vec<DraftPick> = {
        let league = market.league();
        league
            .draft_picks_by_season(start.season)
            .into_iter()
            .filter(|dp| league.team(dp.tid).is_some_and(|t| !t.disabled))
            .cloned()
            .collect()
    };
    picks.sort_by(|a, b| a.draft_order(b));
    let by_dpid: HashMap<Dpid, DraftPick> = picks.iter().map(|dp| (dp.dpid, dp.clone())).collect();

    let mut ours: Vec<Player> = our_negatives.to_vec();
    ours.sort_by(|a, b| b.value.total_cmp(&a.value));

    // the league does not change during the search
    let mut their_negatives: HashMap<Tid, Vec<Player>> = HashMap::new();

    let mut dist: HashMap<Dpid, f64> = HashMap::from([(start.dpid, 0.0)]);
    let mut prev: HashMap<Dpid, Dpid> = HashMap::new();
    let mut prev_step: HashMap<Dpid, TradeStep> = HashMap::new();
    let mut visited: HashSet<Dpid> = HashSet::new();
    let mut queue: Vec<(Dpid, f64)> = vec![(start.dpid, 0.0)];

    let mut iterations = 0;
    while !queue.is_empty() && iterations < limits.max_search_iterations {
        iterations += 1;

        let mut min_idx = 0;
        for (i, entry) in queue.iter().enumerate().skip(1) {
            if entry.1 < queue[min_idx].1 {
                min_idx = i;
            }
        }
        let (cur_dpid, cur_cost) = queue.remove(min_idx);
        if !visited.insert(cur_dpid) {
            continue;
        }
        let Some(cur) = by_dpid.get(&cur_dpid) else {
            continue;
        };

        for next in picks.iter().filter(|dp| dp.is_better_than(cur)) {
            if next.tid == user_tid {
                continue;
            }
            if !their_negatives.contains_key(&next.tid) {
                let negs = team_negative_players(market, next.tid, Some(draft_year));
                their_negatives.insert(next.tid, negs);
            }
            let theirs = their_negatives.get(&next.tid).map_or(&[][..], |v| v.as_slice());

            let Some(offer) = best_offer(market, cur.dpid, next, theirs, &ours, limits) else {
                continue;
            };
            debug!(
                "Edge {} -> {}: dv {:.3}, taking {:?}, dumping {:?}",
                market.pick_desc(cur),
                market.pick_desc(next),
                offer.dv,
                offer.their,
                offer.ours
            );

            let new_cost = cur_cost - offer.dv;
            if dist.get(&next.dpid).map_or(true, |d| new_cost < *d) {
                dist.insert(next.dpid, new_cost);
                prev.insert(next.dpid, cur.dpid);
                prev_step.insert(
                    next.dpid,
                    TradeStep {
                        from: cur.clone(),
                        to: next.clone(),
                        neg_pids: offer.their,
                        our_neg_pids: offer.ours,
                        cost: -offer.dv,
                    },
                );
                if prev.len() < limits.max_path_steps {
                    queue.push((next.dpid, new_cost));
                }
            }
        }
    }

    if iterations >= limits.max_search_iterations {
        warn!(
            "Trade-up search from {} hit the iteration cap ({})",
            market.pick_desc(start),
            limits.max_search_iterations
        );
    }

    let target = dist
        .keys()
        .filter(|dpid| **dpid != start.dpid)
        .filter_map(|dpid| by_dpid.get(dpid))
        .min_by(|a, b| a.draft_order(b).then_with(|| a.dpid.cmp(&b.dpid)))?;

    let mut path = Vec::new();
    let mut cur = target.dpid;
    while let Some(step) = prev_step.remove(&cur) {
        path.push(step);
        match prev.get(&cur) {
            Some(p) => cur = *p,
            None => break,
        }
    }
    path.reverse();
    Some(path)
}

/// Commit every step of `path` in order, stopping at the first rejection.
/// Returns how many steps went through.
pub fn execute_trade_up_path<M: TradeMarket + ?Sized>(market: &mut M, path: &[TradeStep]) -> usize {
    let user_tid = market.user_tid();
    for (i, step) in path.iter().enumerate() {
        let teams = trade_between(
            user_tid,
            step.our_neg_pids.clone(),
            vec![step.from.dpid],
            step.to.tid,
            step.neg_pids.clone(),
            vec![step.to.dpid],
        );
        let ours = if step.our_neg_pids.is_empty() {
            String::new()
        } else {
            format!(" + {}", players_label(market.league(), &step.our_neg_pids))
        };
        let description = format!(
            "Executing trade: {}{} -> {} + {}",
            market.pick_desc(&step.from),
            ours,
            market.pick_desc(&step.to),
            players_label(market.league(), &step.neg_pids)
        );
        if !execute_trade(market, &teams, &description) {
            return i;
        }
    }
    path.len()
}

// ---------------------------------------------------------------------------
// Greedy variant
// ---------------------------------------------------------------------------

/// Other teams' picks in `pick`'s draft that are strictly better, best
/// first.
fn better_picks_elsewhere<M: TradeMarket + ?Sized>(market: &M, pick: &DraftPick) -> Vec<DraftPick> {
    let league = market.league();
    let user_tid = market.user_tid();
    let mut out: Vec<DraftPick> = league
        .draft_picks_by_season(pick.season)
        .into_iter()
        .filter(|dp| dp.tid != user_tid && dp.is_better_than(pick))
        .filter(|dp| league.team(dp.tid).is_some_and(|t| !t.disabled))
        .cloned()
        .collect();
    out.sort_by(|a, b| a.draft_order(b));
    out
}

/// One greedy step: walk the better picks best first and commit the first
/// swap the owner accepts, alone or with one of their negative players
/// thrown in.
pub fn trade_up_from_pick<M: TradeMarket + ?Sized>(market: &mut M, pick: &DraftPick) -> bool {
    let user_tid = market.user_tid();
    let draft_year = pick.season.resolve(market.season());

    for higher in better_picks_elsewhere(market, pick) {
        let negs = team_negative_players(market, higher.tid, Some(draft_year));

        let teams = trade_between(user_tid, vec![], vec![pick.dpid], higher.tid, vec![], vec![higher.dpid]);
        if evaluate_trade(market, &teams) > 0.0 {
            let description = format!(
                "Trading up: {} -> {}",
                market.pick_desc(pick),
                market.pick_desc(&higher)
            );
            if execute_trade(market, &teams, &description) {
                return true;
            }
        }

        for neg in &negs {
            let teams = trade_between(
                user_tid,
                vec![],
                vec![pick.dpid],
                higher.tid,
                vec![neg.pid],
                vec![higher.dpid],
            );
            if evaluate_trade(market, &teams) <= 0.0 {
                continue;
            }
            let description = format!(
                "Trading up with negative player: {} -> {} + {}",
                market.pick_desc(pick),
                market.pick_desc(&higher),
                super::player_label(neg)
            );
            if execute_trade(market, &teams, &description) {
                return true;
            }
        }
    }
    false
}

/// Keep trading up from `start` until no step succeeds. Returns the number
/// of trades made.
pub fn trade_up_chain_from_pick<M: TradeMarket + ?Sized>(market: &mut M, start: &DraftPick) -> usize {
    let mut pick = start.clone();
    let mut trades = 0;
    while trade_up_from_pick(market, &pick) {
        trades += 1;
        let user_tid = market.user_tid();
        let next = market
            .league()
            .draft_picks_by_tid(user_tid)
            .into_iter()
            .filter(|dp| dp.season == pick.season && dp.is_better_than(&pick))
            .min_by(|a, b| a.draft_order(b))
            .cloned();
        match next {
            Some(dp) => pick = dp,
            None => break,
        }
    }
    trades
}

// ---------------------------------------------------------------------------
// Reachability probe
// ---------------------------------------------------------------------------

/// Whether the owner of `candidate` would swap it for `dp` while dumping
/// every player it values negatively (contracts not ending in `season`).
pub fn possible_trade_up<M: TradeMarket + ?Sized>(
    market: &mut M,
    candidate: &DraftPick,
    dp: &DraftPick,
    season: i32,
) -> bool {
    let user_tid = market.user_tid();
    if candidate.tid == user_tid {
        return false;
    }
    let roster: Vec<Pid> = market
        .league()
        .players_by_tid(candidate.tid)
        .into_iter()
        .filter(|p| p.contract.exp != season)
        .map(|p| p.pid)
        .collect();
    let negatives: Vec<Pid> = roster
        .into_iter()
        .filter(|pid| removal_gain(market, candidate.tid, &[*pid]) > 0.0)
        .collect();

    let req = ValueChangeRequest::new(candidate.tid)
        .remove_players(negatives)
        .add_picks([dp.dpid])
        .remove_picks([candidate.dpid])
        .with_partner(user_tid);
    market.value_change(&req).map_or(false, |dv| dv > 0.0)
}

/// Walk from `dp` towards the top of its draft, moving the target up every
/// time `possible_trade_up` says the current best could be swapped again.
pub fn top_gettable_pick<M: TradeMarket + ?Sized>(market: &mut M, dp: &DraftPick) -> DraftPick {
    let season = dp.season.resolve(market.season());
    let mut draft: Vec<DraftPick> = market
        .league()
        .draft_picks_by_season(dp.season)
        .into_iter()
        .cloned()
        .collect();
    draft.sort_by(|a, b| a.draft_order(b));

    let mut best = dp.clone();
    let Some(pos) = draft.iter().position(|p| p.dpid == dp.dpid) else {
        return best;
    };
    for candidate in draft[..pos].iter().rev() {
        if possible_trade_up(market, candidate, &best, season) {
            best = candidate.clone();
        }
    }
    best
}

/// `(own pick, best pick it could reach)` for each of the user's picks in
/// this season's draft.
pub fn top_gettable_picks<M: TradeMarket + ?Sized>(market: &mut M) -> Vec<(DraftPick, DraftPick)> {
    let season = DraftSeason::Year(market.season());
    let mine: Vec<DraftPick> = super::sorted_user_picks(market.league())
        .into_iter()
        .filter(|dp| dp.season == season)
        .collect();
    let mut out = Vec::with_capacity(mine.len());
    for dp in mine {
        let top = top_gettable_pick(market, &dp);
        info!("{} -> {}", market.pick_desc(&dp), market.pick_desc(&top));
        out.push((dp, top));
    }
    out
}

/// Smallest total of values that still reaches `k`, preferring fewer
/// players on ties. Single values of at least `k` are checked first; the
/// exhaustive search only covers the first `max_players` smaller ones.
/// Empty when `k` cannot be reached.
pub fn min_subset_sum_at_least(values: &[(Pid, f64)], k: f64, max_players: usize) -> Vec<Pid> {
    let mut best_sum = f64::INFINITY;
    let mut best: Vec<Pid> = Vec::new();

    for &(pid, v) in values {
        if v >= k && (v < best_sum || (v == best_sum && best.len() > 1)) {
            best_sum = v;
            best = vec![pid];
        }
    }

    let small: Vec<(Pid, f64)> = values
        .iter()
        .filter(|(_, v)| *v < k)
        .take(max_players)
        .copied()
        .collect();
    let n = small.len();
    for mask in 1u64..(1u64 << n) {
        let mut sum = 0.0;
        let mut subset = Vec::new();
        for (i, (pid, v)) in small.iter().enumerate() {
            if mask & (1 << i) != 0 {
                sum += v;
                subset.push(*pid);
            }
        }
        if sum >= k && (sum < best_sum || (sum == best_sum && subset.len() < best.len())) {
            best_sum = sum;
            best = subset;
        }
    }
    best
}
