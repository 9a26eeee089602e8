// League-wide player ovr distribution and z-score normalization.

use crate::league::League;

// ---------------------------------------------------------------------------
// Pool statistics
// ---------------------------------------------------------------------------

/// Mean and standard deviation of a player pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Threshold below which standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

/// Compute mean and population standard deviation for a slice of values.
///
/// Returns `PoolStats { mean: 0.0, stdev: 0.0 }` for an empty slice.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    PoolStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// `(value - mean) / stdev`, or 0.0 when the standard deviation is
/// approximately zero.
pub fn compute_zscore(value: f64, stats: &PoolStats) -> f64 {
    if stats.stdev < STDEV_EPSILON {
        return 0.0;
    }
    (value - stats.mean) / stats.stdev
}

// ---------------------------------------------------------------------------
// Cached ovr distribution
// ---------------------------------------------------------------------------

/// Distribution assumed before any player has been seen.
const DEFAULT_OVR_MEAN: f64 = 47.0;
const DEFAULT_OVR_STDEV: f64 = 10.0;

/// Mean/std of the latest `ovr` over rostered players and free agents.
/// Recomputed lazily: only when marked stale and the pool is non-empty.
#[derive(Debug, Clone)]
pub struct OvrStats {
    stats: PoolStats,
    stale: bool,
}

impl Default for OvrStats {
    fn default() -> Self {
        OvrStats {
            stats: PoolStats {
                mean: DEFAULT_OVR_MEAN,
                stdev: DEFAULT_OVR_STDEV,
            },
            stale: true,
        }
    }
}

impl OvrStats {
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn refresh(&mut self, league: &League) {
        if !self.stale {
            return;
        }
        let ovrs: Vec<f64> = league
            .players_in_league_or_free_agents()
            .iter()
            .map(|p| p.ovr())
            .collect();
        if ovrs.is_empty() {
            return;
        }
        self.stats = compute_pool_stats(&ovrs);
        self.stale = false;
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub fn zscore(&self, value: f64) -> f64 {
        compute_zscore(value, &self.stats)
    }
}
