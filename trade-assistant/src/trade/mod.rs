// Two-team trades: structure, tradability, summary, commit and construction.

pub mod build;
pub mod propose;
pub mod summary;
pub mod untradable;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::league::{Dpid, LeagueError, Pid, Tid};
use crate::valuation::ValuationError;

pub use build::{build_fair_trade, build_trade};
pub use propose::{propose, ProposeOutcome};
pub use summary::{summarize, SideSummary, TradeSummary};
pub use untradable::{untradable_reason, UntradableReason};

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("invalid team {0}")]
    InvalidTeam(Tid),

    #[error("player {pid} is not on team {tid}")]
    PlayerNotOnTeam { pid: Pid, tid: Tid },

    #[error("draft pick {dpid} is not owned by team {tid}")]
    PickNotOwned { dpid: Dpid, tid: Tid },

    #[error("player {pid} is untradable: {reason}")]
    Untradable { pid: Pid, reason: UntradableReason },

    #[error("a team cannot trade with itself")]
    SameTeam,

    #[error("trade is empty")]
    EmptyTrade,

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    League(#[from] LeagueError),
}

/// One team's half of a trade: the assets it gives up, plus assets trade
/// construction must not add.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSide {
    pub tid: Tid,
    pub pids: Vec<Pid>,
    #[serde(default)]
    pub pids_excluded: Vec<Pid>,
    pub dpids: Vec<Dpid>,
    #[serde(default)]
    pub dpids_excluded: Vec<Dpid>,
}

impl TradeSide {
    pub fn new(tid: Tid) -> Self {
        TradeSide {
            tid,
            ..Default::default()
        }
    }

    pub fn with_players(mut self, pids: impl IntoIterator<Item = Pid>) -> Self {
        self.pids.extend(pids);
        self
    }

    pub fn with_picks(mut self, dpids: impl IntoIterator<Item = Dpid>) -> Self {
        self.dpids.extend(dpids);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty() && self.dpids.is_empty()
    }

    pub fn num_assets(&self) -> usize {
        self.pids.len() + self.dpids.len()
    }
}

/// Index 0 is the proposing (usually user) team, index 1 the receiver.
pub type TradeTeams = [TradeSide; 2];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_builders_and_counts() {
        let side = TradeSide::new(3).with_players([1, 2]).with_picks([7]);
        assert_eq!(side.tid, 3);
        assert_eq!(side.num_assets(), 3);
        assert!(!side.is_empty());
        assert!(TradeSide::new(0).is_empty());
    }

    #[test]
    fn side_json_uses_camel_case_and_defaults() {
        let side: TradeSide =
            serde_json::from_str(r#"{"tid":1,"pids":[4],"dpids":[]}"#).unwrap();
        assert_eq!(side.pids, vec![4]);
        assert!(side.pids_excluded.is_empty());

        let json = serde_json::to_string(&TradeSide::new(2)).unwrap();
        assert!(json.contains("pidsExcluded"));
    }
}
