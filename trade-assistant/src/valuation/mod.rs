// Asset valuation: how much a team gains or loses from a proposed trade.

pub mod contract;
pub mod draft_order;
pub mod pick_values;
pub mod sport;
pub mod strategy;
pub mod team_ovr;
pub mod trade_value;
pub mod value_change;
pub mod zscore;

use thiserror::Error;

use crate::league::{League, LeagueError, Phase, Tid};

pub use sport::SportConstants;
pub use value_change::{ValuationEngine, ValueChangeRequest};

#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("invalid team {0}")]
    InvalidTeam(Tid),

    #[error(transparent)]
    League(#[from] LeagueError),
}

/// Game attributes read on every valuation, copied out of the league so
/// helpers do not need to borrow it.
#[derive(Debug, Clone, Copy)]
pub struct ValuationContext {
    pub season: i32,
    pub phase: Phase,
    pub user_tid: Tid,
    pub salary_cap: f64,
    pub min_contract: f64,
    pub max_contract: f64,
    pub difficulty: f64,
    pub num_games: u32,
    pub num_picks_per_round: usize,
    pub constants: SportConstants,
}

impl ValuationContext {
    pub fn from_league(league: &League) -> Self {
        let s = &league.settings;
        ValuationContext {
            season: s.season,
            phase: s.phase,
            user_tid: s.user_tid,
            salary_cap: s.salary_cap,
            min_contract: s.min_contract,
            max_contract: s.max_contract,
            difficulty: s.difficulty,
            num_games: s.num_games,
            num_picks_per_round: league.num_picks_per_round(),
            constants: SportConstants::of(s.sport),
        }
    }

    pub fn picks_per_round(&self) -> f64 {
        self.num_picks_per_round as f64
    }
}
