// Depth-weighted team rating.

use crate::league::Player;

const DEPTH: usize = 10;
const INTERCEPT: f64 = -124.13;
const SLOPE: f64 = 0.4417;
const DEPTH_DECAY: f64 = 0.1905;
/// Rating assumed for an empty depth slot.
const REPLACEMENT_OVR: f64 = 20.0;

/// Team rating from player ovrs: the ten best players weighted by
/// `exp(-0.1905 * i)`, mapped from predicted margin of victory onto a
/// 0-100 style scale where 50 is average.
pub fn team_ovr(ovrs: &[f64]) -> f64 {
    let mut sorted = ovrs.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let weighted: f64 = (0..DEPTH)
        .map(|i| {
            let ovr = sorted.get(i).copied().unwrap_or(REPLACEMENT_OVR);
            (-DEPTH_DECAY * i as f64).exp() * ovr
        })
        .sum();
    let mov = INTERCEPT + SLOPE * weighted;

    mov * 50.0 / 15.0 + 50.0
}

pub fn team_ovr_of<'a>(players: impl IntoIterator<Item = &'a Player>) -> f64 {
    let ovrs: Vec<f64> = players.into_iter().map(Player::ovr).collect();
    team_ovr(&ovrs)
}
