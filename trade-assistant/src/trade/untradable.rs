// Whether a player may appear in a trade right now.

use std::fmt;

use crate::league::{Phase, Player, FREE_AGENT, UNDRAFTED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UntradableReason {
    /// Contract ran out and the playoffs are over.
    ExpiringContract,
    /// Acquired too recently.
    RecentlyAcquired { games: u32 },
    /// Draft prospect or free agent.
    NotOnRoster,
}

impl fmt::Display for UntradableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UntradableReason::ExpiringContract => {
                write!(f, "Cannot trade expiring contracts after the playoffs")
            }
            UntradableReason::RecentlyAcquired { games } => write!(
                f,
                "Cannot trade recently acquired player for {games} more game{}",
                if *games == 1 { "" } else { "s" }
            ),
            UntradableReason::NotOnRoster => write!(f, "Not on a team roster"),
        }
    }
}

/// First reason `p` cannot be traded, if any.
pub fn untradable_reason(p: &Player, season: i32, phase: Phase) -> Option<UntradableReason> {
    if p.contract.exp <= season && phase > Phase::Playoffs && phase <= Phase::FreeAgency {
        return Some(UntradableReason::ExpiringContract);
    }
    if p.games_until_tradable > 0 {
        return Some(UntradableReason::RecentlyAcquired {
            games: p.games_until_tradable,
        });
    }
    if p.tid == UNDRAFTED || p.tid == FREE_AGENT {
        return Some(UntradableReason::NotOnRoster);
    }
    None
}

pub fn is_untradable(p: &Player, season: i32, phase: Phase) -> bool {
    untradable_reason(p, season, phase).is_some()
}
