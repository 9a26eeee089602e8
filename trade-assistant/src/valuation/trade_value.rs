// Per-asset values used when assembling trades rather than judging them.

use std::collections::HashMap;

use tracing::debug;

use crate::league::{DraftPick, League, Phase, Player, Strategy, Tid};

use super::contract::contract_value;
use super::draft_order::{blended_winp, estimate_pick_number, rank_to_winp};
use super::pick_values::{rookie_salaries, TradePickValues};
use super::strategy::{
    age_factor, apply_exponent, contracts_factor, fudge_factor, future_pick_factor,
    injury_adjusted,
};
use super::team_ovr::team_ovr_of;
use super::value_change::{pick_asset_values, ValuationEngine, PICK_AGE};
use super::ValuationContext;

// Logistic fit of overall draft slot (as a fraction of a round) on win%.
const WINP_CURVE_L: f64 = 1.0687820005007198;
const WINP_CURVE_X0: f64 = 0.4878517508315021;
const WINP_CURVE_K: f64 = 10.626956987806935;
const WINP_CURVE_B: f64 = -0.038756647038824504;

/// Projected slot within a round of `picks_per_round` for a team with win%
/// `winp`. Better teams pick later.
pub fn winp_to_pick(winp: f64, picks_per_round: f64) -> f64 {
    let logistic = WINP_CURVE_L / (1.0 + (-WINP_CURVE_K * (winp - WINP_CURVE_X0)).exp());
    let p = picks_per_round.max(1.0);
    (p * (logistic + WINP_CURVE_B)).clamp(1.0, p)
}

// ---------------------------------------------------------------------------
// Least-squares rank model
// ---------------------------------------------------------------------------

/// `y = intercept + slope * x` fitted by ordinary least squares. A single
/// point or constant `x` gives a flat line through the mean of `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn fit(points: &[(f64, f64)]) -> Self {
        if points.is_empty() {
            return LinearFit {
                slope: 0.0,
                intercept: 0.0,
            };
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
        let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let sxy: f64 = points
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        let slope = if sxx.abs() < 1e-12 { 0.0 } else { sxy / sxx };
        LinearFit {
            slope,
            intercept: mean_y - slope * mean_x,
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Everything trade construction needs that only changes between seasons:
/// the ovr-to-rank line, each team's current rating, rookie salaries and the
/// pick value table.
#[derive(Debug, Clone)]
pub struct TradeValueModel {
    pub season: i32,
    pub rank_fit: LinearFit,
    pub team_ovrs: HashMap<Tid, f64>,
    pub num_teams: usize,
    pub rookie_salaries: Vec<f64>,
    pub pick_values: TradePickValues,
}

impl TradeValueModel {
    pub fn build(league: &League) -> Self {
        let team_ovrs: HashMap<Tid, f64> = league
            .active_teams()
            .map(|t| (t.tid, team_ovr_of(league.players_by_tid(t.tid))))
            .collect();

        let mut sorted: Vec<f64> = team_ovrs.values().copied().collect();
        sorted.sort_by(|a, b| b.total_cmp(a));
        let points: Vec<(f64, f64)> = sorted
            .iter()
            .enumerate()
            .map(|(i, &ovr)| (ovr, (i + 1) as f64))
            .collect();
        let rank_fit = LinearFit::fit(&points);

        let settings = &league.settings;
        let num_picks = league.num_picks_per_round() * usize::from(settings.num_draft_rounds);

        debug!(
            "Trade value model for {}: {} teams, rank = {:.3} + {:.4} * ovr",
            settings.season,
            team_ovrs.len(),
            rank_fit.intercept,
            rank_fit.slope
        );

        TradeValueModel {
            season: settings.season,
            rank_fit,
            num_teams: team_ovrs.len(),
            team_ovrs,
            rookie_salaries: rookie_salaries(
                settings.salary_cap,
                settings.min_contract,
                num_picks,
            ),
            pick_values: TradePickValues::from_league(league),
        }
    }

    /// 1-based rank predicted from a team rating, kept within the league.
    pub fn predicted_rank(&self, ovr: f64) -> f64 {
        self.rank_fit
            .predict(ovr)
            .clamp(1.0, self.num_teams.max(1) as f64)
    }

    /// Win% for `tid`: the rating-based estimate blended with its record.
    pub fn projected_winp(&self, league: &League, tid: Tid) -> f64 {
        let ovr = self
            .team_ovrs
            .get(&tid)
            .copied()
            .unwrap_or_else(|| team_ovr_of(league.players_by_tid(tid)));
        let rank = self.predicted_rank(ovr);
        // 1-based rank in a 0-based formula: the best team tops out below 0.75
        let rating_winp = rank_to_winp(rank, self.num_teams);

        let (won, lost) = league
            .team_season(tid, self.season)
            .map_or((0, 0), |ts| (ts.won, ts.lost));
        blended_winp(won, won + lost, league.settings.num_games, rating_winp)
    }
}

// ---------------------------------------------------------------------------
// Construction values
// ---------------------------------------------------------------------------

impl ValuationEngine {
    fn cached_trade_model<'a>(
        slot: &'a mut Option<TradeValueModel>,
        league: &League,
    ) -> &'a TradeValueModel {
        let season = league.season();
        if slot.as_ref().is_some_and(|m| m.season != season) {
            *slot = None;
        }
        slot.get_or_insert_with(|| TradeValueModel::build(league))
    }

    /// What `p` is worth to a team with `strategy` when building a trade
    /// between `tid` and `partner`.
    pub fn player_trade_value(
        &mut self,
        league: &League,
        p: &Player,
        strategy: Strategy,
        tid: Tid,
        partner: Option<Tid>,
    ) -> f64 {
        self.ovr.refresh(league);
        let ctx = ValuationContext::from_league(league);

        let zscore = self.ovr.zscore(p.value);
        let mut value = zscore;
        if p.tid == tid && value > 0.0 {
            value *= fudge_factor(tid, partner, ctx.user_tid, ctx.difficulty);
        }
        value *= age_factor(strategy, p.age(ctx.season));
        if Some(p.tid) == partner {
            value = injury_adjusted(value, p.injury.games_remaining);
        }

        value = value.max(0.0)
            + contracts_factor(strategy) * contract_value(&p.contract, zscore, &ctx);
        if p.just_drafted(ctx.phase, ctx.season) {
            value = value.max(0.0);
        }

        apply_exponent(value, ctx.constants.exponent)
    }

    /// What `dp` is worth to a team with `strategy`. Unknown slots come from
    /// the original owner's projected win%.
    pub fn pick_trade_value(
        &mut self,
        league: &League,
        dp: &DraftPick,
        strategy: Strategy,
        partner: Option<Tid>,
    ) -> f64 {
        self.ovr.refresh(league);
        let ctx = ValuationContext::from_league(league);
        let model = Self::cached_trade_model(&mut self.trade_model, league);
        let ovr = &self.ovr;

        let season = dp.season.resolve(ctx.season);
        let base_est = if dp.slot_known() {
            None
        } else {
            let winp = model.projected_winp(league, dp.original_tid);
            Some(winp_to_pick(winp, ctx.picks_per_round()).round())
        };
        let est_pick = estimate_pick_number(dp, season, base_est, partner, &ctx);
        let (value, contract) = pick_asset_values(
            est_pick,
            season,
            &model.pick_values,
            &model.rookie_salaries,
            ovr,
            &ctx,
        );

        let future_pick = season != ctx.season || ctx.phase <= Phase::Playoffs;
        let factor = if future_pick {
            future_pick_factor(strategy)
        } else {
            age_factor(strategy, PICK_AGE)
        };
        let value = value * factor + contracts_factor(strategy) * contract;

        apply_exponent(value, ctx.constants.exponent)
    }
}
