// Player records: contract, injury, ratings history and draft info.

use serde::{Deserialize, Serialize};

use super::settings::Phase;
use super::{Pid, Tid};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Annual salary in thousands.
    pub amount: f64,
    /// Last season covered by the contract.
    pub exp: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Injury {
    #[serde(rename = "type")]
    pub kind: String,
    pub games_remaining: u32,
}

impl Injury {
    pub fn healthy() -> Self {
        Injury {
            kind: "Healthy".into(),
            games_remaining: 0,
        }
    }
}

impl Default for Injury {
    fn default() -> Self {
        Injury::healthy()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRatings {
    pub season: i32,
    pub ovr: f64,
    pub pot: f64,
    #[serde(default)]
    pub pos: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftInfo {
    pub year: i32,
    #[serde(default)]
    pub round: u8,
    #[serde(default)]
    pub pick: u16,
    pub original_tid: Tid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Draft,
    Trade,
}

/// Entry in a player's transaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub season: i32,
    pub phase: Phase,
    pub tid: Tid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_tid: Option<Tid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pick_num: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub pid: Pid,
    pub tid: Tid,
    pub first_name: String,
    pub last_name: String,
    pub born_year: i32,
    /// Composite rating used by trade logic (same scale as `ovr`).
    pub value: f64,
    /// `value` with scouting noise; drafting decisions use it.
    #[serde(default)]
    pub value_fuzz: Option<f64>,
    pub contract: Contract,
    #[serde(default)]
    pub injury: Injury,
    #[serde(default)]
    pub ratings: Vec<PlayerRatings>,
    pub draft: DraftInfo,
    #[serde(default)]
    pub games_until_tradable: u32,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Player {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn age(&self, season: i32) -> i32 {
        season - self.born_year
    }

    pub fn latest_ratings(&self) -> Option<&PlayerRatings> {
        self.ratings.last()
    }

    /// Latest overall rating, 0 for a player with no ratings rows.
    pub fn ovr(&self) -> f64 {
        self.latest_ratings().map_or(0.0, |r| r.ovr)
    }

    pub fn pot(&self) -> f64 {
        self.latest_ratings().map_or(0.0, |r| r.pot)
    }

    pub fn fuzzed_value(&self) -> f64 {
        self.value_fuzz.unwrap_or(self.value)
    }

    /// Drafted this season (after the draft started) or last season before
    /// the new regular season begins. Such players can still be released for
    /// free, so their value is never treated as negative.
    pub fn just_drafted(&self, phase: Phase, season: i32) -> bool {
        (self.draft.year == season && phase >= Phase::Draft)
            || (self.draft.year == season - 1 && phase < Phase::RegularSeason)
    }
}
