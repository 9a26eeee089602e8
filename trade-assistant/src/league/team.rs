// Teams, their front-office strategy, and per-season records.

use serde::{Deserialize, Serialize};

use super::Tid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Rebuilding,
    Contending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub tid: Tid,
    pub region: String,
    pub name: String,
    pub abbrev: String,
    pub strategy: Strategy,
    #[serde(default)]
    pub disabled: bool,
}

impl Team {
    /// "Region Name", as used in trade warnings.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.region, self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSeason {
    pub tid: Tid,
    pub season: i32,
    #[serde(default)]
    pub won: u32,
    #[serde(default)]
    pub lost: u32,
}

impl TeamSeason {
    pub fn games_played(&self) -> u32 {
        self.won + self.lost
    }
}
