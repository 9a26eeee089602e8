// Scans for teams that would hand over a pick to unload their bad contracts.

use serde::Serialize;
use tracing::debug;

use crate::league::{DraftPick, DraftSeason, Dpid, Pid, Player, Tid};
use crate::market::TradeMarket;
use crate::valuation::ValueChangeRequest;

use super::negatives::{is_negative_tradable_player, removal_gain};
use super::other_teams;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickGiver {
    pub tid: Tid,
    pub name: String,
    pub dpid: Dpid,
    pub negative_pids: Vec<Pid>,
    pub dv: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WillingTeam {
    pub tid: Tid,
    pub abbrev: String,
    pub dpid: Dpid,
    pub negative_pids: Vec<Pid>,
    pub offered_pids: Vec<Pid>,
    pub dv: f64,
}

/// Value to `tid` of keeping `dpid`: minus its value change for giving the
/// pick away alone.
pub(crate) fn pick_value<M: TradeMarket + ?Sized>(market: &mut M, tid: Tid, dpids: &[Dpid]) -> Option<f64> {
    let req = ValueChangeRequest::new(tid)
        .remove_picks(dpids.iter().copied())
        .with_partner(market.user_tid());
    market.value_change(&req).ok().map(|dv| -dv)
}

/// The user's tradable players on deals ending this season, valued at zero
/// or more.
pub fn expiring_offer<M: TradeMarket + ?Sized>(market: &M) -> Vec<Player> {
    let season = market.season();
    market
        .league()
        .players_by_tid(market.user_tid())
        .into_iter()
        .filter(|p| p.contract.exp == season && p.value >= 0.0 && !market.is_untradable(p))
        .cloned()
        .collect()
}

/// Teams that would give away their cheapest pick plus every player they
/// value negatively, for nothing.
pub fn find_pick_givers<M: TradeMarket + ?Sized>(market: &mut M) -> Vec<PickGiver> {
    let user_tid = market.user_tid();
    let teams: Vec<(Tid, String)> = market
        .league()
        .active_teams()
        .map(|t| (t.tid, t.full_name()))
        .collect();

    let mut out = Vec::new();
    for (tid, name) in teams {
        let dpids: Vec<Dpid> = market
            .league()
            .draft_picks_by_tid(tid)
            .into_iter()
            .map(|dp| dp.dpid)
            .collect();

        let mut cheapest: Option<(Dpid, f64)> = None;
        for dpid in dpids {
            let Some(value) = pick_value(market, tid, &[dpid]) else {
                continue;
            };
            if cheapest.map_or(true, |(_, best)| value < best) {
                cheapest = Some((dpid, value));
            }
        }
        let Some((dpid, _)) = cheapest else {
            continue;
        };

        let roster: Vec<Pid> = market
            .league()
            .players_by_tid(tid)
            .into_iter()
            .map(|p| p.pid)
            .collect();
        let negative_pids: Vec<Pid> = roster
            .into_iter()
            .filter(|pid| removal_gain(market, tid, &[*pid]) > 0.0)
            .collect();

        let req = ValueChangeRequest::new(tid)
            .remove_players(negative_pids.iter().copied())
            .remove_picks([dpid])
            .with_partner(user_tid);
        let Ok(dv) = market.value_change(&req) else {
            continue;
        };
        debug!("{}: cheapest pick {} with {} negatives, dv {:.3}", name, dpid, negative_pids.len(), dv);
        if dv > 0.0 {
            out.push(PickGiver {
                tid,
                name,
                dpid,
                negative_pids,
                dv,
            });
        }
    }
    out
}

/// AI teams that would trade their least valuable 1st or 2nd round pick in
/// this season's draft plus all their negative players for the user's
/// expiring contracts.
pub fn find_willing_teams<M: TradeMarket + ?Sized>(market: &mut M) -> Vec<WillingTeam> {
    let user_tid = market.user_tid();
    let season = DraftSeason::Year(market.season());
    let offered_pids: Vec<Pid> = expiring_offer(market).iter().map(|p| p.pid).collect();

    let mut out = Vec::new();
    for tid in other_teams(market.league()) {
        let picks: Vec<DraftPick> = market
            .league()
            .draft_picks_by_tid(tid)
            .into_iter()
            .filter(|dp| (dp.round == 1 || dp.round == 2) && dp.season == season)
            .cloned()
            .collect();
        if picks.is_empty() {
            continue;
        }

        let roster: Vec<Player> = market
            .league()
            .players_by_tid(tid)
            .into_iter()
            .cloned()
            .collect();
        let negative_pids: Vec<Pid> = roster
            .iter()
            .filter(|p| is_negative_tradable_player(market, p, tid))
            .map(|p| p.pid)
            .collect();
        if negative_pids.is_empty() {
            continue;
        }

        let mut least: Option<(Dpid, f64)> = None;
        for dp in &picks {
            let Some(value) = pick_value(market, tid, &[dp.dpid]) else {
                continue;
            };
            if value > 0.0 && least.map_or(true, |(_, v)| value < v) {
                least = Some((dp.dpid, value));
            }
        }
        let Some((dpid, _)) = least else {
            continue;
        };

        let req = ValueChangeRequest::new(tid)
            .add_players(offered_pids.iter().copied())
            .remove_players(negative_pids.iter().copied())
            .remove_picks([dpid])
            .with_partner(user_tid);
        let Ok(dv) = market.value_change(&req) else {
            continue;
        };
        if dv > 0.0 {
            let abbrev = market
                .team(tid)
                .map_or_else(|| tid.to_string(), |t| t.abbrev.clone());
            out.push(WillingTeam {
                tid,
                abbrev,
                dpid,
                negative_pids,
                offered_pids: offered_pids.clone(),
                dv,
            });
        }
    }
    out
}
