// Trade construction: balance a partial trade by forward selection.

use tracing::debug;

use crate::league::{Dpid, League, Pid, Strategy, Tid};
use crate::valuation::ValuationEngine;

use super::untradable::is_untradable;
use super::{TradeError, TradeSide, TradeTeams};

#[derive(Debug, Clone, Copy, PartialEq)]
enum AssetId {
    Player(Pid),
    Pick(Dpid),
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: AssetId,
    value: f64,
}

/// Values every asset from the receiving team's point of view.
struct Appraiser<'a> {
    league: &'a League,
    strategy: Strategy,
    receiver: Tid,
    proposer: Tid,
}

impl Appraiser<'_> {
    fn value(&self, engine: &mut ValuationEngine, id: AssetId) -> Result<f64, TradeError> {
        Ok(match id {
            AssetId::Player(pid) => {
                let p = self.league.require_player(pid)?;
                engine.player_trade_value(
                    self.league,
                    p,
                    self.strategy,
                    self.receiver,
                    Some(self.proposer),
                )
            }
            AssetId::Pick(dpid) => {
                let dp = self.league.require_draft_pick(dpid)?;
                engine.pick_trade_value(self.league, dp, self.strategy, Some(self.proposer))
            }
        })
    }

    fn side_value(
        &self,
        engine: &mut ValuationEngine,
        side: &TradeSide,
    ) -> Result<f64, TradeError> {
        let mut total = 0.0;
        for pid in &side.pids {
            total += self.value(engine, AssetId::Player(*pid))?;
        }
        for dpid in &side.dpids {
            total += self.value(engine, AssetId::Pick(*dpid))?;
        }
        Ok(total)
    }

    /// Tradable assets of `side` not already offered and not excluded.
    fn candidates(
        &self,
        engine: &mut ValuationEngine,
        side: &TradeSide,
    ) -> Result<Vec<Candidate>, TradeError> {
        let (season, phase) = (self.league.season(), self.league.phase());
        let mut ids: Vec<AssetId> = self
            .league
            .players_by_tid(side.tid)
            .into_iter()
            .filter(|p| !side.pids.contains(&p.pid) && !side.pids_excluded.contains(&p.pid))
            .filter(|p| !is_untradable(p, season, phase))
            .map(|p| AssetId::Player(p.pid))
            .collect();
        ids.extend(
            self.league
                .draft_picks_by_tid(side.tid)
                .into_iter()
                .filter(|dp| {
                    !side.dpids.contains(&dp.dpid) && !side.dpids_excluded.contains(&dp.dpid)
                })
                .map(|dp| AssetId::Pick(dp.dpid)),
        );

        ids.into_iter()
            .map(|id| {
                Ok(Candidate {
                    id,
                    value: self.value(engine, id)?,
                })
            })
            .collect()
    }
}

fn push_asset(side: &mut TradeSide, id: AssetId) {
    match id {
        AssetId::Player(pid) => side.pids.push(pid),
        AssetId::Pick(dpid) => side.dpids.push(dpid),
    }
}

/// Complete `teams` so the receiver (`teams[1]`) gets slightly more value
/// than it gives.
///
/// When the receiver is currently losing, proposer assets are added: each
/// step takes the asset that lifts the balance the smallest amount above
/// zero, or the most valuable one when none gets there. Otherwise receiver
/// assets are added, each time the most valuable one that still leaves the
/// receiver ahead. With `hold_user_constant` the proposer's side is never
/// changed. Returns `None` when the trade cannot be balanced.
pub fn build_trade(
    league: &League,
    engine: &mut ValuationEngine,
    teams: &TradeTeams,
    hold_user_constant: bool,
    max_assets_to_add: Option<usize>,
) -> Result<Option<TradeTeams>, TradeError> {
    let receiver = league
        .team(teams[1].tid)
        .ok_or(TradeError::InvalidTeam(teams[1].tid))?;
    league
        .team(teams[0].tid)
        .ok_or(TradeError::InvalidTeam(teams[0].tid))?;

    let appraiser = Appraiser {
        league,
        strategy: receiver.strategy,
        receiver: teams[1].tid,
        proposer: teams[0].tid,
    };
    let cap = max_assets_to_add.unwrap_or(usize::MAX);
    let mut out = teams.clone();

    let mut balance =
        appraiser.side_value(engine, &teams[0])? - appraiser.side_value(engine, &teams[1])?;
    debug!(
        "build_trade {} -> {}: starting balance {:.4}",
        teams[0].tid, teams[1].tid, balance
    );

    let mut added = 0;
    if balance <= 0.0 {
        if hold_user_constant {
            return Ok(None);
        }
        let mut pool = appraiser.candidates(engine, &teams[0])?;
        while balance <= 0.0 && added < cap {
            let closing = pool
                .iter()
                .enumerate()
                .filter(|(_, c)| balance + c.value > 0.0)
                .min_by(|(_, a), (_, b)| a.value.total_cmp(&b.value));
            let pick = closing.or_else(|| {
                pool.iter()
                    .enumerate()
                    .filter(|(_, c)| c.value > 0.0)
                    .max_by(|(_, a), (_, b)| a.value.total_cmp(&b.value))
            });
            let Some((idx, _)) = pick else {
                break;
            };
            let chosen = pool.swap_remove(idx);
            push_asset(&mut out[0], chosen.id);
            balance += chosen.value;
            added += 1;
        }
        if balance <= 0.0 {
            return Ok(None);
        }
    } else {
        let mut pool = appraiser.candidates(engine, &teams[1])?;
        while added < cap {
            let pick = pool
                .iter()
                .enumerate()
                .filter(|(_, c)| c.value > 0.0 && balance - c.value > 0.0)
                .max_by(|(_, a), (_, b)| a.value.total_cmp(&b.value));
            let Some((idx, _)) = pick else {
                break;
            };
            let chosen = pool.swap_remove(idx);
            push_asset(&mut out[1], chosen.id);
            balance -= chosen.value;
            added += 1;
        }
    }

    debug!("build_trade added {} assets, final balance {:.4}", added, balance);
    Ok(Some(out))
}

/// Same as `build_trade`; kept as the name callers asking for a fair trade
/// use.
pub fn build_fair_trade(
    league: &League,
    engine: &mut ValuationEngine,
    teams: &TradeTeams,
    hold_user_constant: bool,
    max_assets_to_add: Option<usize>,
) -> Result<Option<TradeTeams>, TradeError> {
    build_trade(league, engine, teams, hold_user_constant, max_assets_to_add)
}
