// Expected value of the player taken at each draft slot, plus rookie salaries.

use std::collections::BTreeMap;

use crate::league::{League, UNDRAFTED};

/// Player value expected at each overall pick when no draft class is known.
pub const DEFAULT_PICK_VALUES: [f64; 60] = [
    75.0, 73.0, 71.0, 69.0, 68.0, 67.0, 66.0, 65.0, 64.0, 63.0, 62.0, 61.0, 60.0, 59.0, 58.0,
    57.0, 56.0, 55.0, 54.0, 53.0, 52.0, 52.0, 51.0, 51.0, 50.0, 50.0, 49.0, 49.0, 48.0, 48.0,
    47.0, 47.0, 46.0, 46.0, 45.0, 45.0, 44.0, 44.0, 43.0, 43.0, 42.0, 42.0, 41.0, 41.0, 40.0,
    40.0, 39.0, 39.0, 38.0, 38.0, 37.0, 37.0, 36.0, 36.0, 35.0, 35.0, 34.0, 34.0, 33.0, 33.0,
];

/// Value used when neither the draft class nor the default table reaches.
const FALLBACK_PICK_VALUE: f64 = 20.0;

/// First-round rookie scale in thousands at a 90000 cap.
const ROOKIE_SCALE: [f64; 30] = [
    5000.0, 4500.0, 4000.0, 3500.0, 3000.0, 2750.0, 2500.0, 2250.0, 2000.0, 1900.0, 1800.0,
    1700.0, 1600.0, 1500.0, 1400.0, 1300.0, 1200.0, 1100.0, 1000.0, 1000.0, 1000.0, 1000.0,
    1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0,
];
const ROOKIE_SCALE_CAP: f64 = 90000.0;

// ---------------------------------------------------------------------------
// Pick value table
// ---------------------------------------------------------------------------

/// Expected player value by overall pick: a per-season table built from the
/// actual draft class, and a default for seasons without one.
#[derive(Debug, Clone, PartialEq)]
pub struct TradePickValues {
    pub default: Vec<f64>,
    pub by_season: BTreeMap<i32, Vec<f64>>,
}

impl TradePickValues {
    /// Draft prospects grouped by draft year, each list sorted by value
    /// descending. The default table comes from the league override if set.
    pub fn from_league(league: &League) -> Self {
        let mut by_season: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        for p in league.players.iter().filter(|p| p.tid == UNDRAFTED) {
            by_season.entry(p.draft.year).or_default().push(p.value);
        }
        for values in by_season.values_mut() {
            values.sort_by(|a, b| b.total_cmp(a));
        }

        let default = league
            .trade_pick_values
            .clone()
            .unwrap_or_else(|| DEFAULT_PICK_VALUES.to_vec());

        TradePickValues { default, by_season }
    }

    /// Value at 1-based overall pick `est_pick` in `season`: the draft class
    /// first, then the default table, then its last entry, then a fixed floor.
    pub fn lookup(&self, season: i32, est_pick: usize) -> f64 {
        let idx = est_pick.checked_sub(1);
        idx.and_then(|i| self.by_season.get(&season).and_then(|v| v.get(i)))
            .or_else(|| idx.and_then(|i| self.default.get(i)))
            .or_else(|| self.default.last())
            .copied()
            .unwrap_or(FALLBACK_PICK_VALUE)
    }
}

// ---------------------------------------------------------------------------
// Rookie salaries
// ---------------------------------------------------------------------------

/// Rookie contract amount by overall pick: the first-round scale scaled to
/// the league cap and floored at the minimum contract, then the minimum for
/// every later pick.
pub fn rookie_salaries(salary_cap: f64, min_contract: f64, num_picks: usize) -> Vec<f64> {
    let scale = salary_cap / ROOKIE_SCALE_CAP;
    (0..num_picks.max(ROOKIE_SCALE.len()))
        .map(|i| match ROOKIE_SCALE.get(i) {
            Some(amount) => (amount * scale).round().max(min_contract),
            None => min_contract,
        })
        .collect()
}

/// Salary at 1-based overall pick, the minimum contract past the table.
pub fn rookie_salary_at(salaries: &[f64], est_pick: usize, min_contract: f64) -> f64 {
    est_pick
        .checked_sub(1)
        .and_then(|i| salaries.get(i))
        .copied()
        .unwrap_or(min_contract)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::test_support::LeagueBuilder;

    #[test]
    fn lookup_prefers_draft_class() {
        let league = LeagueBuilder::new(2)
            .prospect(2025, 58.0)
            .prospect(2025, 64.0)
            .prospect(2026, 70.0)
            .build();
        let values = TradePickValues::from_league(&league);

        assert_eq!(values.by_season[&2025], vec![64.0, 58.0]);
        assert_eq!(values.lookup(2025, 1), 64.0);
        assert_eq!(values.lookup(2025, 2), 58.0);
        // past the class: default table
        assert_eq!(values.lookup(2025, 3), DEFAULT_PICK_VALUES[2]);
        // season without prospects
        assert_eq!(values.lookup(2027, 1), DEFAULT_PICK_VALUES[0]);
    }

    #[test]
    fn lookup_past_default_uses_last_entry() {
        let league = LeagueBuilder::new(2).build();
        let values = TradePickValues::from_league(&league);
        assert_eq!(values.lookup(2025, 500), 33.0);
    }

    #[test]
    fn empty_default_falls_back_to_floor() {
        let mut league = LeagueBuilder::new(2).build();
        league.trade_pick_values = Some(vec![]);
        let values = TradePickValues::from_league(&league);
        assert_eq!(values.lookup(2025, 1), FALLBACK_PICK_VALUE);
    }

    #[test]
    fn league_override_replaces_default() {
        let mut league = LeagueBuilder::new(2).build();
        league.trade_pick_values = Some(vec![80.0, 60.0]);
        let values = TradePickValues::from_league(&league);
        assert_eq!(values.lookup(2030, 2), 60.0);
        assert_eq!(values.lookup(2030, 9), 60.0);
    }

    #[test]
    fn rookie_salaries_scale_with_cap() {
        let salaries = rookie_salaries(180000.0, 750.0, 60);
        assert_eq!(salaries.len(), 60);
        assert_eq!(salaries[0], 10000.0);
        assert_eq!(salaries[29], 2000.0);
        assert_eq!(salaries[30], 750.0);
    }

    #[test]
    fn rookie_salaries_floor_at_min_contract() {
        let salaries = rookie_salaries(45000.0, 750.0, 10);
        assert_eq!(salaries.len(), 30);
        assert_eq!(salaries[0], 2500.0);
        assert_eq!(salaries[20], 750.0);
        assert_eq!(rookie_salary_at(&salaries, 100, 750.0), 750.0);
        assert_eq!(rookie_salary_at(&salaries, 1, 750.0), 2500.0);
    }
}
