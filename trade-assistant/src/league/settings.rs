// League-wide game attributes: season, phase, salary rules, user team.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Pid, Tid};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Phase of the league calendar. Ordered by its numeric code, so
/// comparisons like `phase > Phase::Playoffs` read the same as in the
/// game's own rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Phase {
    ExpansionDraft,
    FantasyDraft,
    Preseason,
    RegularSeason,
    AfterTradeDeadline,
    Playoffs,
    DraftLottery,
    Draft,
    AfterDraft,
    ResignPlayers,
    FreeAgency,
}

impl Phase {
    pub fn code(self) -> i8 {
        match self {
            Phase::ExpansionDraft => -2,
            Phase::FantasyDraft => -1,
            Phase::Preseason => 0,
            Phase::RegularSeason => 1,
            Phase::AfterTradeDeadline => 2,
            Phase::Playoffs => 3,
            Phase::DraftLottery => 4,
            Phase::Draft => 5,
            Phase::AfterDraft => 6,
            Phase::ResignPlayers => 7,
            Phase::FreeAgency => 8,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -2 => Some(Phase::ExpansionDraft),
            -1 => Some(Phase::FantasyDraft),
            0 => Some(Phase::Preseason),
            1 => Some(Phase::RegularSeason),
            2 => Some(Phase::AfterTradeDeadline),
            3 => Some(Phase::Playoffs),
            4 => Some(Phase::DraftLottery),
            5 => Some(Phase::Draft),
            6 => Some(Phase::AfterDraft),
            7 => Some(Phase::ResignPlayers),
            8 => Some(Phase::FreeAgency),
            _ => None,
        }
    }
}

impl TryFrom<i8> for Phase {
    type Error = String;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        Phase::from_code(code).ok_or_else(|| format!("unknown phase code {code}"))
    }
}

impl From<Phase> for i8 {
    fn from(phase: Phase) -> i8 {
        phase.code()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::ExpansionDraft => "expansion draft",
            Phase::FantasyDraft => "fantasy draft",
            Phase::Preseason => "preseason",
            Phase::RegularSeason => "regular season",
            Phase::AfterTradeDeadline => "after trade deadline",
            Phase::Playoffs => "playoffs",
            Phase::DraftLottery => "draft lottery",
            Phase::Draft => "draft",
            Phase::AfterDraft => "after draft",
            Phase::ResignPlayers => "re-sign players",
            Phase::FreeAgency => "free agency",
        };
        write!(f, "{} ({})", label, self.code())
    }
}

// ---------------------------------------------------------------------------
// Sport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    #[default]
    Basketball,
    Football,
    Hockey,
    Baseball,
}

// ---------------------------------------------------------------------------
// Expansion draft
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionDraftPhase {
    #[default]
    Setup,
    Protection,
    Draft,
}

/// Expansion draft bookkeeping carried in the game attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionDraft {
    #[serde(default)]
    pub phase: ExpansionDraftPhase,
    #[serde(default)]
    pub expansion_tids: Vec<Tid>,
    #[serde(default)]
    pub available_pids: Vec<Pid>,
    /// Players taken so far from each existing team.
    #[serde(default)]
    pub num_per_team_drafted: BTreeMap<Tid, u32>,
}

impl ExpansionDraft {
    /// Reset to the idle `setup` state once the draft is over.
    pub fn finished() -> Self {
        ExpansionDraft::default()
    }
}

// ---------------------------------------------------------------------------
// GameSettings
// ---------------------------------------------------------------------------

fn default_num_draft_rounds() -> u8 {
    2
}

/// Game attributes consulted by valuation and trade rules. Money amounts are
/// in thousands, matching player contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    #[serde(default)]
    pub sport: Sport,
    pub season: i32,
    pub phase: Phase,
    pub user_tid: Tid,
    pub salary_cap: f64,
    pub min_contract: f64,
    pub max_contract: f64,
    pub num_games: u32,
    /// 0 is normal; -0.25 easy, 0.25 hard, 1 insane.
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default = "default_num_draft_rounds")]
    pub num_draft_rounds: u8,
    #[serde(default)]
    pub expansion_draft: ExpansionDraft,
}
