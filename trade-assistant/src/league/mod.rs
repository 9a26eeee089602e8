// In-memory league cache: teams, players, draft picks and game settings.

pub mod pick;
pub mod player;
pub mod settings;
pub mod snapshot;
pub mod team;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use pick::{ordinal, DraftPick, DraftResult, DraftSeason};
pub use player::{Contract, DraftInfo, Injury, Player, PlayerRatings, Transaction, TransactionKind};
pub use settings::{ExpansionDraft, ExpansionDraftPhase, GameSettings, Phase, Sport};
pub use team::{Strategy, Team, TeamSeason};

pub type Tid = i32;
pub type Pid = u32;
pub type Dpid = u32;

/// Players without a team.
pub const FREE_AGENT: Tid = -1;
/// Draft prospects not yet selected.
pub const UNDRAFTED: Tid = -2;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("unknown team {0}")]
    UnknownTeam(Tid),

    #[error("unknown player {0}")]
    UnknownPlayer(Pid),

    #[error("unknown draft pick {0}")]
    UnknownPick(Dpid),

    #[error("failed to access league snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid league snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub settings: GameSettings,
    pub teams: Vec<Team>,
    #[serde(default)]
    pub team_seasons: Vec<TeamSeason>,
    pub players: Vec<Player>,
    #[serde(default)]
    pub draft_picks: Vec<DraftPick>,
    /// Replaces the built-in default pick value table when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_pick_values: Option<Vec<f64>>,
    #[serde(default)]
    pub fantasy_draft_results: Vec<DraftResult>,
}

impl League {
    pub fn user_tid(&self) -> Tid {
        self.settings.user_tid
    }

    pub fn season(&self) -> i32 {
        self.settings.season
    }

    pub fn phase(&self) -> Phase {
        self.settings.phase
    }

    // --- teams ---

    pub fn team(&self, tid: Tid) -> Option<&Team> {
        self.teams.iter().find(|t| t.tid == tid)
    }

    pub fn require_team(&self, tid: Tid) -> Result<&Team, LeagueError> {
        self.team(tid).ok_or(LeagueError::UnknownTeam(tid))
    }

    pub fn active_teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(|t| !t.disabled)
    }

    /// Active teams other than the user's.
    pub fn ai_teams(&self) -> impl Iterator<Item = &Team> {
        let user_tid = self.user_tid();
        self.active_teams().filter(move |t| t.tid != user_tid)
    }

    pub fn num_active_teams(&self) -> usize {
        self.active_teams().count()
    }

    /// One pick per active team per round.
    pub fn num_picks_per_round(&self) -> usize {
        self.num_active_teams()
    }

    pub fn team_season(&self, tid: Tid, season: i32) -> Option<&TeamSeason> {
        self.team_seasons
            .iter()
            .find(|ts| ts.tid == tid && ts.season == season)
    }

    pub fn team_seasons_for(&self, season: i32) -> impl Iterator<Item = &TeamSeason> {
        self.team_seasons.iter().filter(move |ts| ts.season == season)
    }

    // --- players ---

    pub fn player(&self, pid: Pid) -> Option<&Player> {
        self.players.iter().find(|p| p.pid == pid)
    }

    pub fn player_mut(&mut self, pid: Pid) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.pid == pid)
    }

    pub fn require_player(&self, pid: Pid) -> Result<&Player, LeagueError> {
        self.player(pid).ok_or(LeagueError::UnknownPlayer(pid))
    }

    pub fn players_by_tid(&self, tid: Tid) -> Vec<&Player> {
        self.players.iter().filter(|p| p.tid == tid).collect()
    }

    /// Players on a roster (tid >= 0).
    pub fn players_in_league(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.tid >= 0).collect()
    }

    /// Rostered players plus free agents; draft prospects excluded.
    pub fn players_in_league_or_free_agents(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.tid >= FREE_AGENT).collect()
    }

    // --- draft picks ---

    pub fn draft_pick(&self, dpid: Dpid) -> Option<&DraftPick> {
        self.draft_picks.iter().find(|dp| dp.dpid == dpid)
    }

    pub fn require_draft_pick(&self, dpid: Dpid) -> Result<&DraftPick, LeagueError> {
        self.draft_pick(dpid).ok_or(LeagueError::UnknownPick(dpid))
    }

    pub fn draft_picks_by_tid(&self, tid: Tid) -> Vec<&DraftPick> {
        self.draft_picks.iter().filter(|dp| dp.tid == tid).collect()
    }

    pub fn draft_picks_by_season(&self, season: DraftSeason) -> Vec<&DraftPick> {
        self.draft_picks
            .iter()
            .filter(|dp| dp.season == season)
            .collect()
    }

    /// Short description, e.g. `2025 1st round pick (#4)`, or with the
    /// original team's abbreviation while the slot is unknown.
    pub fn pick_desc(&self, dp: &DraftPick) -> String {
        let base = format!("{} {} round pick", dp.season, dp.round_label());
        if dp.slot_known() {
            format!("{base} (#{})", dp.pick)
        } else {
            let abbrev = self
                .team(dp.original_tid)
                .map_or_else(|| dp.original_tid.to_string(), |t| t.abbrev.clone());
            format!("{base} ({abbrev})")
        }
    }

    // --- mutations ---

    pub fn move_player(&mut self, pid: Pid, tid: Tid) -> Result<(), LeagueError> {
        let player = self.player_mut(pid).ok_or(LeagueError::UnknownPlayer(pid))?;
        player.tid = tid;
        Ok(())
    }

    pub fn move_pick(&mut self, dpid: Dpid, tid: Tid) -> Result<(), LeagueError> {
        let dp = self
            .draft_picks
            .iter_mut()
            .find(|dp| dp.dpid == dpid)
            .ok_or(LeagueError::UnknownPick(dpid))?;
        dp.tid = tid;
        Ok(())
    }

    pub fn remove_pick(&mut self, dpid: Dpid) -> Result<DraftPick, LeagueError> {
        let idx = self
            .draft_picks
            .iter()
            .position(|dp| dp.dpid == dpid)
            .ok_or(LeagueError::UnknownPick(dpid))?;
        Ok(self.draft_picks.remove(idx))
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.settings.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::LeagueBuilder;
    use super::*;

    #[test]
    fn lookups_by_team() {
        let league = LeagueBuilder::new(4).roster(0, &[50.0, 45.0]).build();
        assert_eq!(league.num_active_teams(), 4);
        assert_eq!(league.num_picks_per_round(), 4);
        assert_eq!(league.players_by_tid(0).len(), 2);
        assert_eq!(league.draft_picks_by_tid(1).len(), 2);
        assert!(league.team(9).is_none());
        assert!(matches!(league.require_team(9), Err(LeagueError::UnknownTeam(9))));
    }

    #[test]
    fn disabled_teams_are_not_active() {
        let mut league = LeagueBuilder::new(4).build();
        league.teams[3].disabled = true;
        assert_eq!(league.num_active_teams(), 3);
        assert_eq!(league.ai_teams().count(), 2);
    }

    #[test]
    fn pick_desc_known_and_unknown_slot() {
        let mut league = LeagueBuilder::new(4).build();
        let dp = league.draft_picks_by_tid(2)[0].clone();
        assert_eq!(league.pick_desc(&dp), "2025 1st round pick (T2)");

        league.draft_picks[0].pick = 4;
        let dp = league.draft_picks[0].clone();
        assert_eq!(league.pick_desc(&dp), "2025 1st round pick (#4)");
    }

    #[test]
    fn move_and_remove_assets() {
        let mut league = LeagueBuilder::new(3).roster(1, &[52.0]).build();
        let pid = league.players_by_tid(1)[0].pid;
        league.move_player(pid, 2).unwrap();
        assert_eq!(league.player(pid).unwrap().tid, 2);

        let dpid = league.draft_picks_by_tid(0)[0].dpid;
        league.move_pick(dpid, 2).unwrap();
        assert_eq!(league.draft_pick(dpid).unwrap().tid, 2);

        let removed = league.remove_pick(dpid).unwrap();
        assert_eq!(removed.dpid, dpid);
        assert!(league.draft_pick(dpid).is_none());
        assert!(matches!(
            league.remove_pick(dpid),
            Err(LeagueError::UnknownPick(_))
        ));
        assert!(matches!(
            league.move_player(9999, 0),
            Err(LeagueError::UnknownPlayer(9999))
        ));
    }

    #[test]
    fn free_agents_count_for_ovr_pool_but_not_league() {
        let league = LeagueBuilder::new(2)
            .roster(0, &[50.0])
            .free_agent(40.0)
            .prospect(2025, 45.0)
            .build();
        assert_eq!(league.players_in_league().len(), 1);
        assert_eq!(league.players_in_league_or_free_agents().len(), 2);
    }
}
