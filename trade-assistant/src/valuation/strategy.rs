// Strategy-dependent multipliers shared by every valuation path.

use crate::league::{Strategy, Tid};

/// Age multiplier. Rebuilding teams pay for youth and discount veterans;
/// contending teams discount anyone whose value is mostly potential.
pub fn age_factor(strategy: Strategy, age: i32) -> f64 {
    match strategy {
        Strategy::Rebuilding => match age {
            ..=19 => 1.075,
            20 => 1.05,
            21 => 1.0375,
            22 => 1.025,
            23 => 1.0125,
            27 => 0.975,
            28 => 0.95,
            29.. => 0.9,
            _ => 1.0,
        },
        Strategy::Contending => match age {
            ..=19 => 0.8,
            20 => 0.825,
            21 => 0.85,
            22 => 0.875,
            23 => 0.925,
            24 => 0.95,
            _ => 1.0,
        },
    }
}

/// Multiplier for a pick in a future draft (or before this draft's order is
/// known).
pub fn future_pick_factor(strategy: Strategy) -> f64 {
    match strategy {
        Strategy::Rebuilding => 1.1,
        Strategy::Contending => 0.825,
    }
}

/// Weight of contract surplus in the final value.
pub fn contracts_factor(strategy: Strategy) -> f64 {
    match strategy {
        Strategy::Rebuilding => 2.0,
        Strategy::Contending => 0.5,
    }
}

/// Long injuries cost 75% of the value, shorter ones 1% per game.
pub fn injury_adjusted(value: f64, games_remaining: u32) -> f64 {
    if games_remaining > 75 {
        value - value * 0.75
    } else {
        value - value * f64::from(games_remaining) / 100.0
    }
}

/// Values above 1 are raised to the sport exponent so one star outweighs
/// several role players.
pub fn apply_exponent(value: f64, exponent: f64) -> f64 {
    if value > 1.0 {
        value.powf(exponent)
    } else {
        value
    }
}

/// Multiplier on the positive value of assets a team gives away. AI teams
/// trading among themselves overvalue their own players by 5%; difficulty
/// adds 10% per point, never dropping below zero.
pub fn fudge_factor(tid: Tid, partner: Option<Tid>, user_tid: Tid, difficulty: f64) -> f64 {
    let difficulty_factor = (1.0 + 0.1 * difficulty).max(0.0);
    let ai_only = tid != user_tid && partner != Some(user_tid);
    (if ai_only { 1.05 } else { 1.0 }) * difficulty_factor
}
