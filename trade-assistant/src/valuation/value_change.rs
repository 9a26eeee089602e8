// Trade evaluation from one team's perspective: dv > 0 means the team gains.

use tracing::debug;

use crate::league::{Contract, Dpid, DraftPick, League, Phase, Pid, Strategy, Tid};

use super::contract::contract_value;
use super::draft_order::{estimate_pick_number, DraftOrderCache};
use super::pick_values::{rookie_salaries, rookie_salary_at, TradePickValues};
use super::strategy::{
    age_factor, apply_exponent, contracts_factor, fudge_factor, future_pick_factor,
    injury_adjusted,
};
use super::trade_value::TradeValueModel;
use super::zscore::OvrStats;
use super::{ValuationContext, ValuationError};

/// Teams never give away more than this many picks in one trade.
const MAX_PICKS_REMOVED: usize = 2;

/// Draft picks are valued as a prospect of this age.
pub(crate) const PICK_AGE: i32 = 20;

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssetKind {
    Player,
    Pick { est_pick: usize, draft_year: i32 },
}

/// One player or pick reduced to the numbers `sum_values` needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Asset {
    pub kind: AssetKind,
    /// Z-scored value, already fudged for assets given away.
    pub value: f64,
    pub contract_value: f64,
    pub injury_games: u32,
    pub age: i32,
}

/// Total worth of `assets` to a team with `strategy`.
pub fn sum_values(
    assets: &[Asset],
    strategy: Strategy,
    tid: Tid,
    include_injuries: bool,
    ctx: &ValuationContext,
) -> f64 {
    assets
        .iter()
        .map(|asset| {
            let future_pick = match asset.kind {
                AssetKind::Pick { draft_year, .. } => {
                    draft_year != ctx.season || ctx.phase <= Phase::Playoffs
                }
                AssetKind::Player => false,
            };

            let mut value = asset.value
                * if future_pick {
                    future_pick_factor(strategy)
                } else {
                    age_factor(strategy, asset.age)
                };

            if include_injuries && tid != ctx.user_tid {
                value = injury_adjusted(value, asset.injury_games);
            }

            value = value.max(0.0) + contracts_factor(strategy) * asset.contract_value;

            apply_exponent(value, ctx.constants.exponent)
        })
        .sum()
}

/// Value and contract value of a pick at overall slot `est_pick`.
pub(crate) fn pick_asset_values(
    est_pick: usize,
    season: i32,
    est_values: &TradePickValues,
    salaries: &[f64],
    ovr: &OvrStats,
    ctx: &ValuationContext,
) -> (f64, f64) {
    let value = ovr.zscore(est_values.lookup(season, est_pick));
    let rookie_contract = Contract {
        amount: rookie_salary_at(salaries, est_pick, ctx.min_contract),
        exp: season + 2,
    };
    let contract = contract_value(&rookie_contract, value, ctx).max(0.0);
    // Rookies can be cut, so a pick is never worth less than 0.1. The tiny
    // slot term keeps two picks from ever tying.
    let value = value.max(0.1) - est_pick as f64 * 1e-10;
    (value, contract)
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Arguments of one `value_change` call, from `tid`'s perspective.
#[derive(Debug, Clone, Default)]
pub struct ValueChangeRequest {
    pub tid: Tid,
    pub pids_add: Vec<Pid>,
    pub pids_remove: Vec<Pid>,
    pub dpids_add: Vec<Dpid>,
    pub dpids_remove: Vec<Dpid>,
    /// Reuse the draft-order cache while the key is unchanged. `None`
    /// always rebuilds it.
    pub key: Option<u64>,
    pub partner: Option<Tid>,
}

impl ValueChangeRequest {
    pub fn new(tid: Tid) -> Self {
        ValueChangeRequest {
            tid,
            ..Default::default()
        }
    }

    pub fn add_players(mut self, pids: impl IntoIterator<Item = Pid>) -> Self {
        self.pids_add.extend(pids);
        self
    }

    pub fn remove_players(mut self, pids: impl IntoIterator<Item = Pid>) -> Self {
        self.pids_remove.extend(pids);
        self
    }

    pub fn add_picks(mut self, dpids: impl IntoIterator<Item = Dpid>) -> Self {
        self.dpids_add.extend(dpids);
        self
    }

    pub fn remove_picks(mut self, dpids: impl IntoIterator<Item = Dpid>) -> Self {
        self.dpids_remove.extend(dpids);
        self
    }

    pub fn with_partner(mut self, partner: Tid) -> Self {
        self.partner = Some(partner);
        self
    }

    pub fn with_key(mut self, key: u64) -> Self {
        self.key = Some(key);
        self
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Valuation state carried between calls: the ovr distribution, the
/// draft-order projection for the current key, and the per-season model
/// used by trade construction.
#[derive(Debug, Default)]
pub struct ValuationEngine {
    pub(crate) ovr: OvrStats,
    draft_order: Option<(Option<u64>, DraftOrderCache)>,
    pub(crate) trade_model: Option<TradeValueModel>,
}

impl ValuationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cache; the next call recomputes from the league.
    pub fn invalidate(&mut self) {
        self.ovr.mark_stale();
        self.draft_order = None;
        self.trade_model = None;
    }

    pub fn ovr_stats(&mut self, league: &League) -> &OvrStats {
        self.ovr.refresh(league);
        &self.ovr
    }

    /// Cached projection, rebuilt when the key changes, when the key is
    /// `None`, or when nothing is cached yet.
    pub fn draft_order(&mut self, league: &League, key: Option<u64>) -> &DraftOrderCache {
        Self::cached_draft_order(&mut self.draft_order, league, key)
    }

    fn cached_draft_order<'a>(
        slot: &'a mut Option<(Option<u64>, DraftOrderCache)>,
        league: &League,
        key: Option<u64>,
    ) -> &'a DraftOrderCache {
        let fresh = match (&*slot, key) {
            (Some((Some(prev), _)), Some(k)) => *prev != k,
            _ => true,
        };
        if fresh {
            *slot = None;
        }
        let (_, cache) = slot.get_or_insert_with(|| (key, DraftOrderCache::build(league)));
        cache
    }

    /// Net change in perceived value for `req.tid` if it received the `add`
    /// assets and gave up the `remove` assets.
    pub fn value_change(
        &mut self,
        league: &League,
        req: &ValueChangeRequest,
    ) -> Result<f64, ValuationError> {
        if req.dpids_remove.len() > MAX_PICKS_REMOVED {
            return Ok(-1.0);
        }

        self.ovr.refresh(league);
        let team = league
            .team(req.tid)
            .ok_or(ValuationError::InvalidTeam(req.tid))?;
        let strategy = team.strategy;
        let ctx = ValuationContext::from_league(league);

        let cache = Self::cached_draft_order(&mut self.draft_order, league, req.key);
        let ovr = &self.ovr;

        let mut add = Vec::new();
        let mut remove = Vec::new();

        // players
        let fudge = fudge_factor(req.tid, req.partner, ctx.user_tid, ctx.difficulty);
        for p in league.players_by_tid(req.tid) {
            if !req.pids_remove.contains(&p.pid) {
                continue;
            }
            let value = ovr.zscore(p.value);
            let fudged = if value > 0.0 { value * fudge } else { value };
            remove.push(Asset {
                kind: AssetKind::Player,
                value: fudged,
                contract_value: contract_value(&p.contract, value, &ctx),
                injury_games: p.injury.games_remaining,
                age: p.age(ctx.season),
            });
        }
        for pid in &req.pids_add {
            let Some(p) = league.player(*pid) else {
                continue;
            };
            let value = ovr.zscore(p.value);
            add.push(Asset {
                kind: AssetKind::Player,
                value,
                contract_value: contract_value(&p.contract, value, &ctx),
                injury_games: p.injury.games_remaining,
                age: p.age(ctx.season),
            });
        }

        // picks
        if !req.dpids_add.is_empty() || !req.dpids_remove.is_empty() {
            let new_est_pick = cache.modified_pick_rank(
                league,
                req.tid,
                req.partner,
                &req.pids_add,
                &req.pids_remove,
            );
            let salaries = rookie_salaries(
                ctx.salary_cap,
                ctx.min_contract,
                ctx.num_picks_per_round * usize::from(league.settings.num_draft_rounds),
            );
            let pick_asset = |dp: &DraftPick| {
                let season = dp.season.resolve(ctx.season);
                let base_est = if dp.original_tid == req.tid {
                    Some(new_est_pick as f64)
                } else {
                    cache.est_picks.get(&dp.original_tid).map(|&e| e as f64)
                };
                let est_pick = estimate_pick_number(dp, season, base_est, req.partner, &ctx);
                let (value, contract) =
                    pick_asset_values(est_pick, season, &cache.est_values, &salaries, ovr, &ctx);
                Asset {
                    kind: AssetKind::Pick {
                        est_pick,
                        draft_year: season,
                    },
                    value,
                    contract_value: contract,
                    injury_games: 0,
                    age: PICK_AGE,
                }
            };
            add.extend(
                req.dpids_add
                    .iter()
                    .filter_map(|dpid| league.draft_pick(*dpid))
                    .map(&pick_asset),
            );
            remove.extend(
                req.dpids_remove
                    .iter()
                    .filter_map(|dpid| league.draft_pick(*dpid))
                    .map(&pick_asset),
            );
        }

        let values_add = sum_values(&add, strategy, req.tid, true, &ctx);
        let values_remove = sum_values(&remove, strategy, req.tid, false, &ctx);
        let dv = values_add - values_remove;

        debug!(
            "value_change tid={} partner={:?} add={}p/{}dp remove={}p/{}dp dv={:.4}",
            req.tid,
            req.partner,
            req.pids_add.len(),
            req.dpids_add.len(),
            req.pids_remove.len(),
            req.dpids_remove.len(),
            dv
        );

        Ok(dv)
    }
}
