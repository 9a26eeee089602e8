// Per-sport constants for normalized player values.

use crate::league::Sport;

/// Range of normalized (z-scored) player values and the exponent that
/// rewards concentrated talent when summing assets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SportConstants {
    pub min_value: f64,
    pub max_value: f64,
    pub exponent: f64,
}

impl SportConstants {
    pub fn of(sport: Sport) -> Self {
        match sport {
            Sport::Baseball => SportConstants {
                min_value: -0.75,
                max_value: 2.5,
                exponent: 3.0,
            },
            Sport::Basketball => SportConstants {
                min_value: -0.5,
                max_value: 2.0,
                exponent: 7.0,
            },
            Sport::Football => SportConstants {
                min_value: -1.0,
                max_value: 3.0,
                exponent: 3.0,
            },
            Sport::Hockey => SportConstants {
                min_value: -0.5,
                max_value: 2.0,
                exponent: 3.5,
            },
        }
    }

    pub fn value_range(&self) -> f64 {
        self.max_value - self.min_value
    }
}
