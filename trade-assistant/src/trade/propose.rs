// Transactional commit path: validate, let the AI evaluate, swap assets.

use tracing::{debug, info};

use crate::league::{League, Transaction, TransactionKind};
use crate::valuation::{ValuationEngine, ValueChangeRequest};

use super::summary::summarize;
use super::untradable::untradable_reason;
use super::{TradeError, TradeTeams};

pub const ACCEPTED_MESSAGE: &str = "Trade accepted! \"Nice doing business with you!\"";
pub const REJECTED_MESSAGE: &str = "Trade rejected! \"What, are you crazy?!\"";

#[derive(Debug, Clone, PartialEq)]
pub struct ProposeOutcome {
    pub accepted: bool,
    pub message: String,
    /// The receiving team's value change; `None` when rejected before
    /// evaluation.
    pub dv: Option<f64>,
}

impl ProposeOutcome {
    fn rejected(message: impl Into<String>, dv: Option<f64>) -> Self {
        ProposeOutcome {
            accepted: false,
            message: message.into(),
            dv,
        }
    }
}

/// Both teams exist and differ, the trade is not empty, and every asset is
/// owned by its side and tradable.
pub fn validate(league: &League, teams: &TradeTeams) -> Result<(), TradeError> {
    for side in teams {
        league
            .team(side.tid)
            .ok_or(TradeError::InvalidTeam(side.tid))?;
    }
    if teams[0].tid == teams[1].tid {
        return Err(TradeError::SameTeam);
    }
    if teams.iter().all(|side| side.is_empty()) {
        return Err(TradeError::EmptyTrade);
    }

    let (season, phase) = (league.season(), league.phase());
    for side in teams {
        for pid in &side.pids {
            let p = league.require_player(*pid)?;
            if p.tid != side.tid {
                return Err(TradeError::PlayerNotOnTeam {
                    pid: *pid,
                    tid: side.tid,
                });
            }
            if let Some(reason) = untradable_reason(p, season, phase) {
                return Err(TradeError::Untradable { pid: *pid, reason });
            }
        }
        for dpid in &side.dpids {
            let dp = league.require_draft_pick(*dpid)?;
            if dp.tid != side.tid {
                return Err(TradeError::PickNotOwned {
                    dpid: *dpid,
                    tid: side.tid,
                });
            }
        }
    }
    Ok(())
}

/// Offer `teams` to `teams[1]`. The receiver accepts when no cap warning
/// names it and its value change is positive; accepted trades swap every
/// asset and invalidate the valuation caches.
pub fn propose(
    league: &mut League,
    engine: &mut ValuationEngine,
    teams: &TradeTeams,
) -> Result<ProposeOutcome, TradeError> {
    validate(league, teams)?;

    let [user, ai] = teams;
    let ai_name = league.require_team(ai.tid)?.full_name();

    let summary = summarize(league, teams)?;
    if summary.warns_about(&ai_name) {
        let warning = summary.warning.unwrap_or_default();
        debug!("Trade with {} blocked by cap rule", ai_name);
        return Ok(ProposeOutcome::rejected(warning, None));
    }

    let req = ValueChangeRequest {
        tid: ai.tid,
        pids_add: user.pids.clone(),
        pids_remove: ai.pids.clone(),
        dpids_add: user.dpids.clone(),
        dpids_remove: ai.dpids.clone(),
        key: None,
        partner: Some(user.tid),
    };
    let dv = engine.value_change(league, &req)?;
    if dv <= 0.0 {
        debug!("{} rejected trade, dv={:.4}", ai_name, dv);
        return Ok(ProposeOutcome::rejected(REJECTED_MESSAGE, Some(dv)));
    }

    process_trade(league, teams)?;
    engine.invalidate();

    info!(
        "Trade executed with {}: {} players/{} picks out, {} players/{} picks in, dv={:.4}",
        ai_name,
        user.pids.len(),
        user.dpids.len(),
        ai.pids.len(),
        ai.dpids.len(),
        dv
    );

    Ok(ProposeOutcome {
        accepted: true,
        message: ACCEPTED_MESSAGE.to_string(),
        dv: Some(dv),
    })
}

/// Swap every asset between the two sides and log a trade transaction on
/// each moved player.
fn process_trade(league: &mut League, teams: &TradeTeams) -> Result<(), TradeError> {
    let (season, phase) = (league.season(), league.phase());
    for (j, side) in teams.iter().enumerate() {
        let to = teams[1 - j].tid;
        for pid in &side.pids {
            league.move_player(*pid, to)?;
            if let Some(p) = league.player_mut(*pid) {
                p.transactions.push(Transaction {
                    season,
                    phase,
                    tid: to,
                    kind: TransactionKind::Trade,
                    from_tid: Some(side.tid),
                    pick_num: None,
                });
            }
        }
        for dpid in &side.dpids {
            league.move_pick(*dpid, to)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::test_support::LeagueBuilder;
    use crate::league::{Contract, Phase};
    use crate::trade::TradeSide;

    fn league() -> League {
        LeagueBuilder::new(3)
            .roster(0, &[60.0, 45.0, 44.0, 43.0, 42.0])
            .roster(1, &[58.0, 50.0, 48.0, 46.0, 40.0])
            .roster(2, &[52.0, 50.0, 48.0, 46.0, 40.0])
            .build()
    }

    #[test]
    fn lopsided_offer_is_accepted_and_swapped() {
        let mut league = league();
        let mut engine = ValuationEngine::new();
        // user star for the AI's worst player
        let teams = [
            TradeSide::new(0).with_players([0]),
            TradeSide::new(1).with_players([9]),
        ];
        let outcome = propose(&mut league, &mut engine, &teams).unwrap();
        assert!(outcome.accepted, "{outcome:?}");
        assert_eq!(outcome.message, ACCEPTED_MESSAGE);
        assert_eq!(league.player(0).unwrap().tid, 1);
        assert_eq!(league.player(9).unwrap().tid, 0);
        let tx = &league.player(0).unwrap().transactions[0];
        assert_eq!(tx.kind, TransactionKind::Trade);
        assert_eq!(tx.from_tid, Some(0));
    }

    #[test]
    fn asking_for_a_star_for_nothing_is_rejected() {
        let mut league = league();
        let mut engine = ValuationEngine::new();
        let teams = [TradeSide::new(0), TradeSide::new(1).with_players([5])];
        let outcome = propose(&mut league, &mut engine, &teams).unwrap();
        assert!(!outcome.accepted);
        assert_eq!(outcome.message, REJECTED_MESSAGE);
        assert!(outcome.dv.unwrap() <= 0.0);
        assert_eq!(league.player(5).unwrap().tid, 1);
    }

    #[test]
    fn pick_moves_with_the_trade() {
        let mut league = league();
        let mut engine = ValuationEngine::new();
        let user_pick = league.draft_picks_by_tid(0)[0].dpid;
        let teams = [TradeSide::new(0).with_picks([user_pick]), TradeSide::new(1)];
        let outcome = propose(&mut league, &mut engine, &teams).unwrap();
        assert!(outcome.accepted);
        assert_eq!(league.draft_pick(user_pick).unwrap().tid, 1);
    }

    #[test]
    fn cap_warning_on_ai_blocks_trade() {
        let mut league = league();
        league.settings.salary_cap = 30000.0;
        league.player_mut(0).unwrap().contract = Contract {
            amount: 20000.0,
            exp: 2027,
        };
        let mut engine = ValuationEngine::new();
        let teams = [TradeSide::new(0).with_players([0]), TradeSide::new(1)];
        let outcome = propose(&mut league, &mut engine, &teams).unwrap();
        assert!(!outcome.accepted);
        assert!(outcome.message.contains("City1 Team1"));
        assert_eq!(outcome.dv, None);
    }

    #[test]
    fn validation_errors() {
        let mut league = league();
        let mut engine = ValuationEngine::new();

        let empty = [TradeSide::new(0), TradeSide::new(1)];
        assert!(matches!(
            propose(&mut league, &mut engine, &empty),
            Err(TradeError::EmptyTrade)
        ));

        let wrong_owner = [TradeSide::new(0).with_players([5]), TradeSide::new(1)];
        assert!(matches!(
            propose(&mut league, &mut engine, &wrong_owner),
            Err(TradeError::PlayerNotOnTeam { pid: 5, tid: 0 })
        ));

        let self_trade = [TradeSide::new(1).with_players([5]), TradeSide::new(1)];
        assert!(matches!(
            propose(&mut league, &mut engine, &self_trade),
            Err(TradeError::SameTeam)
        ));

        league.set_phase(Phase::Draft);
        league.player_mut(0).unwrap().contract.exp = 2025;
        let expiring = [TradeSide::new(0).with_players([0]), TradeSide::new(1)];
        assert!(matches!(
            propose(&mut league, &mut engine, &expiring),
            Err(TradeError::Untradable { pid: 0, .. })
        ));
    }
}
