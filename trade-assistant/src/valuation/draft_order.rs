// Projected draft order from team ratings and current records.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::league::{DraftPick, League, Phase, Pid, Player, Tid};

use super::pick_values::TradePickValues;
use super::team_ovr::team_ovr_of;
use super::ValuationContext;

/// Win% assigned from a team-ovr rank: 75% for the best team down to 25%
/// for the worst of `num_teams`.
pub fn rank_to_winp(rank: f64, num_teams: usize) -> f64 {
    if num_teams <= 1 {
        return 0.5;
    }
    let n = num_teams as f64;
    0.25 + 0.5 * (n - 1.0 - rank) / (n - 1.0)
}

/// Blend of actual record and rating-based win%, weighted by the fraction of
/// the season played.
pub fn blended_winp(won: u32, gp: u32, num_games: u32, rating_winp: f64) -> f64 {
    if gp == 0 {
        return rating_winp;
    }
    let season_fraction = f64::from(gp) / f64::from(num_games.max(1));
    season_fraction * (f64::from(won) / f64::from(gp)) + (1.0 - season_fraction) * rating_winp
}

// ---------------------------------------------------------------------------
// Draft order cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TeamOvr {
    pub tid: Tid,
    pub ovr: f64,
}

/// Snapshot of projected draft positions, rebuilt once per valuation key.
#[derive(Debug, Clone)]
pub struct DraftOrderCache {
    /// 1-based projected slot for each active team (worst record picks 1st).
    pub est_picks: HashMap<Tid, usize>,
    pub est_values: TradePickValues,
    /// Games played by the last active team in tid order.
    pub gp: u32,
    /// Projected win% of every active team, ascending.
    pub sorted_wps: Vec<f64>,
    /// Ratings of every team with players, best first.
    pub sorted_team_ovrs: Vec<TeamOvr>,
}

impl DraftOrderCache {
    pub fn build(league: &League) -> Self {
        let mut rosters: BTreeMap<Tid, Vec<&Player>> = BTreeMap::new();
        for p in league.players_in_league() {
            rosters.entry(p.tid).or_default().push(p);
        }
        let mut sorted_team_ovrs: Vec<TeamOvr> = rosters
            .into_iter()
            .map(|(tid, players)| TeamOvr {
                tid,
                ovr: team_ovr_of(players),
            })
            .collect();
        sorted_team_ovrs.sort_by(|a, b| b.ovr.total_cmp(&a.ovr));

        let season = league.season();
        let num_games = league.settings.num_games;
        let teams: Vec<Tid> = league.active_teams().map(|t| t.tid).collect();

        let mut gp = 0;
        let wps: Vec<f64> = teams
            .iter()
            .map(|&tid| {
                let rank = sorted_team_ovrs
                    .iter()
                    .position(|t| t.tid == tid)
                    .unwrap_or(sorted_team_ovrs.len());
                let rating_winp = rank_to_winp(rank as f64, teams.len());
                let (won, lost) = league
                    .team_season(tid, season)
                    .map_or((0, 0), |ts| (ts.won, ts.lost));
                gp = won + lost;
                blended_winp(won, gp, num_games, rating_winp)
            })
            .collect();

        let mut sorted_wps = wps.clone();
        sorted_wps.sort_by(f64::total_cmp);

        let est_picks = teams
            .iter()
            .zip(&wps)
            .map(|(&tid, wp)| {
                let rank = sorted_wps.iter().position(|w| w == wp).unwrap_or(0) + 1;
                (tid, rank)
            })
            .collect();

        debug!(
            "Draft order cache rebuilt: {} teams, {} rated rosters",
            teams.len(),
            sorted_team_ovrs.len()
        );

        DraftOrderCache {
            est_picks,
            est_values: TradePickValues::from_league(league),
            gp,
            sorted_wps,
            sorted_team_ovrs,
        }
    }

    /// Projected slot for `tid` if the trade went through: its roster minus
    /// `pids_remove`, plus those of `pids_add` currently on `partner`, ranked
    /// against the cached ratings and win%s. The record blend uses the cached
    /// games played, not the team's own.
    pub fn modified_pick_rank(
        &self,
        league: &League,
        tid: Tid,
        partner: Option<Tid>,
        pids_add: &[Pid],
        pids_remove: &[Pid],
    ) -> usize {
        let n = self.sorted_team_ovrs.len();

        let mut roster: Vec<&Player> = league
            .players_by_tid(tid)
            .into_iter()
            .filter(|p| !pids_remove.contains(&p.pid))
            .collect();
        if let Some(partner) = partner {
            roster.extend(
                league
                    .players_by_tid(partner)
                    .into_iter()
                    .filter(|p| pids_add.contains(&p.pid)),
            );
        }
        let new_ovr = team_ovr_of(roster);

        let new_rank = self
            .sorted_team_ovrs
            .iter()
            .position(|t| new_ovr > t.ovr)
            .map_or(n, |i| i + 1);
        let rating_winp = rank_to_winp(new_rank as f64, n);

        let won = league
            .team_season(tid, league.season())
            .map_or(0, |ts| ts.won);
        let new_wp = blended_winp(won, self.gp, league.settings.num_games, rating_winp);

        self.sorted_wps
            .iter()
            .position(|&wp| new_wp < wp)
            .map_or(n, |i| i + 1)
    }
}

// ---------------------------------------------------------------------------
// Pick number estimation
// ---------------------------------------------------------------------------

/// Overall pick number for `dp`. A known slot is used as is. Otherwise the
/// projected slot `base_est` (or mid-round when unknown) regresses towards
/// late picks for the user's own picks and early picks for the AI's, more
/// so the further away the draft. When the trade partner is the user the
/// estimate is skewed once more against the user.
pub fn estimate_pick_number(
    dp: &DraftPick,
    season: i32,
    base_est: Option<f64>,
    partner: Option<Tid>,
    ctx: &ValuationContext,
) -> usize {
    let per_round = ctx.picks_per_round();

    let est = if dp.slot_known() {
        f64::from(dp.pick)
    } else {
        let mut est = base_est.unwrap_or(per_round / 2.0);

        let users_pick = dp.tid == ctx.user_tid;
        let trade_with_user = partner == Some(ctx.user_tid);
        let regression_share = if users_pick { 0.75 } else { 0.25 };
        let regression_target = regression_share * per_round;

        let mut seasons = f64::from((season - ctx.season).clamp(0, 5));
        if trade_with_user && seasons > 0.0 {
            seasons = (seasons + 1.0).clamp(0.0, 5.0);
        }
        if seasons == 0.0 && ctx.phase < Phase::Playoffs {
            seasons += 0.5;
        }

        est = (est * (5.0 - seasons) / 5.0 + regression_target * seasons / 5.0).round();

        if trade_with_user && seasons > 0.0 {
            est = if users_pick {
                let difficulty_factor = 1.0 + 1.5 * ctx.difficulty;
                ((est + per_round / 3.5) * difficulty_factor)
                    .round()
                    .clamp(1.0, per_round.max(1.0))
            } else {
                (est - per_round / 3.5).round().clamp(1.0, per_round.max(1.0))
            };
        }
        est
    };

    let overall = est + per_round * f64::from(dp.round.saturating_sub(1));
    overall.max(1.0) as usize
}
