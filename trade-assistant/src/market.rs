// The trade market the automation scripts talk to.

use tracing::{info, warn};

use crate::db::Database;
use crate::league::{DraftPick, League, Phase, Player, Team, Tid};
use crate::trade::{self, ProposeOutcome, TradeError, TradeSummary, TradeTeams};
use crate::valuation::{ValuationEngine, ValuationError, ValueChangeRequest};

/// Read access to the league plus the two calls that matter: how much a
/// team values a change, and proposing a trade for real.
pub trait TradeMarket {
    fn league(&self) -> &League;

    /// Direct mutation for scripts that bypass trading (expansion draft).
    /// Implementations must drop any cached valuation state.
    fn league_mut(&mut self) -> &mut League;

    fn value_change(&mut self, req: &ValueChangeRequest) -> Result<f64, ValuationError>;

    /// Commit `teams` if the receiving team accepts.
    fn propose(
        &mut self,
        teams: &TradeTeams,
        description: &str,
    ) -> Result<ProposeOutcome, TradeError>;

    fn user_tid(&self) -> Tid {
        self.league().user_tid()
    }

    fn season(&self) -> i32 {
        self.league().season()
    }

    fn phase(&self) -> Phase {
        self.league().phase()
    }

    fn team(&self, tid: Tid) -> Option<&Team> {
        self.league().team(tid)
    }

    fn summary(&self, teams: &TradeTeams) -> Result<TradeSummary, TradeError> {
        trade::summarize(self.league(), teams)
    }

    fn is_untradable(&self, p: &Player) -> bool {
        trade::untradable::is_untradable(p, self.season(), self.phase())
    }

    fn pick_desc(&self, dp: &DraftPick) -> String {
        self.league().pick_desc(dp)
    }
}

// ---------------------------------------------------------------------------
// Local market
// ---------------------------------------------------------------------------

/// Market over an in-memory league snapshot, with an optional ledger that
/// records every executed trade.
pub struct LocalMarket {
    league: League,
    engine: ValuationEngine,
    ledger: Option<Database>,
    session_id: String,
    /// Bumped on every mutation; used as the draft-order cache key so
    /// repeated evaluations of an unchanged league reuse the projection.
    generation: u64,
    trades_executed: usize,
}

impl LocalMarket {
    pub fn new(league: League) -> Self {
        LocalMarket {
            league,
            engine: ValuationEngine::new(),
            ledger: None,
            session_id: Database::generate_session_id(),
            generation: 0,
            trades_executed: 0,
        }
    }

    pub fn with_ledger(mut self, ledger: Database) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn ledger(&self) -> Option<&Database> {
        self.ledger.as_ref()
    }

    pub fn league_and_engine(&mut self) -> (&League, &mut ValuationEngine) {
        (&self.league, &mut self.engine)
    }

    pub fn trades_executed(&self) -> usize {
        self.trades_executed
    }

    pub fn into_league(self) -> League {
        self.league
    }

    fn touch(&mut self) {
        self.generation += 1;
        self.engine.invalidate();
    }
}

impl TradeMarket for LocalMarket {
    fn league(&self) -> &League {
        &self.league
    }

    fn league_mut(&mut self) -> &mut League {
        self.touch();
        &mut self.league
    }

    fn value_change(&mut self, req: &ValueChangeRequest) -> Result<f64, ValuationError> {
        if req.key.is_some() {
            return self.engine.value_change(&self.league, req);
        }
        let keyed = ValueChangeRequest {
            key: Some(self.generation),
            ..req.clone()
        };
        self.engine.value_change(&self.league, &keyed)
    }

    fn propose(
        &mut self,
        teams: &TradeTeams,
        description: &str,
    ) -> Result<ProposeOutcome, TradeError> {
        let outcome = trade::propose(&mut self.league, &mut self.engine, teams)?;
        if !outcome.accepted {
            return Ok(outcome);
        }

        self.generation += 1;
        self.trades_executed += 1;
        info!("Executed: {}", description);

        if let Some(ledger) = &self.ledger {
            let recorded = ledger.record_trade(
                &self.session_id,
                self.league.season(),
                self.league.phase(),
                teams,
                outcome.dv.unwrap_or_default(),
                description,
            );
            if let Err(e) = recorded {
                warn!("Failed to record trade in ledger: {:#}", e);
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::test_support::LeagueBuilder;
    use crate::trade::TradeSide;

    fn market() -> LocalMarket {
        let league = LeagueBuilder::new(3)
            .roster(0, &[60.0, 45.0, 44.0])
            .roster(1, &[58.0, 50.0, 40.0])
            .roster(2, &[52.0, 50.0, 48.0])
            .build();
        LocalMarket::new(league).with_ledger(Database::open(":memory:").unwrap())
    }

    #[test]
    fn accepted_trade_is_recorded() {
        let mut m = market();
        let teams = [
            TradeSide::new(0).with_players([0]),
            TradeSide::new(1).with_players([5]),
        ];
        let outcome = m.propose(&teams, "star for scrub").unwrap();
        assert!(outcome.accepted);
        assert_eq!(m.trades_executed(), 1);
        let trades = m.ledger().unwrap().load_trades(m.session_id()).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].description, "star for scrub");
    }

    #[test]
    fn rejected_trade_is_not_recorded() {
        let mut m = market();
        let teams = [TradeSide::new(0), TradeSide::new(1).with_players([3])];
        let outcome = m.propose(&teams, "steal").unwrap();
        assert!(!outcome.accepted);
        assert_eq!(m.trades_executed(), 0);
        assert_eq!(m.ledger().unwrap().trade_count(m.session_id()).unwrap(), 0);
    }

    #[test]
    fn value_change_sees_mutations() {
        let mut m = market();
        let req = ValueChangeRequest::new(1).add_players([0]).with_partner(0);
        let before = m.value_change(&req).unwrap();
        m.league_mut().player_mut(0).unwrap().injury.games_remaining = 100;
        let after = m.value_change(&req).unwrap();
        assert!(after < before);
    }

    #[test]
    fn default_accessors_read_the_league() {
        let m = market();
        assert_eq!(m.user_tid(), 0);
        assert_eq!(m.season(), 2025);
        assert_eq!(m.phase(), Phase::RegularSeason);
        assert_eq!(m.team(2).unwrap().abbrev, "T2");
        assert!(!m.is_untradable(m.league().player(0).unwrap()));
    }
}
