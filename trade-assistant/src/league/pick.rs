// Draft picks, draft seasons and recorded draft results.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Dpid, Pid, Tid};

// ---------------------------------------------------------------------------
// DraftSeason
// ---------------------------------------------------------------------------

/// Season a pick belongs to. Fantasy and expansion drafts carry a label in
/// place of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSeason", into = "RawSeason")]
pub enum DraftSeason {
    Year(i32),
    Fantasy,
    Expansion,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawSeason {
    Year(i32),
    Label(String),
}

impl TryFrom<RawSeason> for DraftSeason {
    type Error = String;

    fn try_from(raw: RawSeason) -> Result<Self, Self::Error> {
        match raw {
            RawSeason::Year(year) => Ok(DraftSeason::Year(year)),
            RawSeason::Label(label) => match label.as_str() {
                "fantasy" => Ok(DraftSeason::Fantasy),
                "expansion" => Ok(DraftSeason::Expansion),
                other => other
                    .parse::<i32>()
                    .map(DraftSeason::Year)
                    .map_err(|_| format!("unknown draft season `{other}`")),
            },
        }
    }
}

impl From<DraftSeason> for RawSeason {
    fn from(season: DraftSeason) -> Self {
        match season {
            DraftSeason::Year(year) => RawSeason::Year(year),
            DraftSeason::Fantasy => RawSeason::Label("fantasy".into()),
            DraftSeason::Expansion => RawSeason::Label("expansion".into()),
        }
    }
}

impl DraftSeason {
    /// Calendar year used for valuation. Labelled drafts happen now.
    pub fn resolve(self, current_season: i32) -> i32 {
        match self {
            DraftSeason::Year(year) => year,
            DraftSeason::Fantasy | DraftSeason::Expansion => current_season,
        }
    }
}

impl fmt::Display for DraftSeason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftSeason::Year(year) => write!(f, "{year}"),
            DraftSeason::Fantasy => write!(f, "fantasy"),
            DraftSeason::Expansion => write!(f, "expansion"),
        }
    }
}

// ---------------------------------------------------------------------------
// DraftPick
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPick {
    pub dpid: Dpid,
    /// Current owner.
    pub tid: Tid,
    /// Team whose record decides the slot.
    pub original_tid: Tid,
    pub round: u8,
    /// Slot within the round; 0 until the order is set.
    #[serde(default)]
    pub pick: u16,
    pub season: DraftSeason,
}

impl DraftPick {
    pub fn slot_known(&self) -> bool {
        self.pick > 0
    }

    /// Earlier round first, then earlier slot.
    pub fn draft_order(&self, other: &DraftPick) -> Ordering {
        self.round
            .cmp(&other.round)
            .then_with(|| self.pick.cmp(&other.pick))
    }

    /// Strictly earlier in the same draft.
    pub fn is_better_than(&self, other: &DraftPick) -> bool {
        self.draft_order(other) == Ordering::Less
    }

    /// "1st"/"2nd" label used in short trade descriptions.
    pub fn round_label(&self) -> String {
        ordinal(u32::from(self.round))
    }
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 21st...
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

// ---------------------------------------------------------------------------
// Draft results
// ---------------------------------------------------------------------------

/// A player taken in a fantasy or expansion draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResult {
    pub pid: Pid,
    pub prev_tid: Tid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_abbrev: Option<String>,
    pub tid: Tid,
    pub round: u8,
    pub pick: u16,
    pub year: i32,
    pub ovr: f64,
    pub pot: f64,
}
