// Salary totals and cap warning for a proposed trade.

use serde::Serialize;

use crate::league::{League, Tid};

use super::{TradeError, TradeSide, TradeTeams};

/// Over-the-cap teams may take back at most this multiple of outgoing
/// salary, plus `CAP_TOLERANCE` (thousands).
const OVER_CAP_RATIO: f64 = 1.25;
const CAP_TOLERANCE: f64 = 100.0;

#[derive(Debug, Clone, Serialize)]
pub struct SideSummary {
    pub tid: Tid,
    pub name: String,
    /// Descriptions of what this team gives up.
    pub players: Vec<String>,
    pub picks: Vec<String>,
    /// Salary this team sends out.
    pub total: f64,
    pub payroll_after_trade: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeSummary {
    pub teams: [SideSummary; 2],
    pub warning: Option<String>,
}

impl TradeSummary {
    /// True when the warning is about `team_name` (`region name`).
    pub fn warns_about(&self, team_name: &str) -> bool {
        self.warning
            .as_deref()
            .is_some_and(|w| w.contains(team_name))
    }
}

fn side_summary(league: &League, side: &TradeSide) -> Result<SideSummary, TradeError> {
    let team = league
        .team(side.tid)
        .ok_or(TradeError::InvalidTeam(side.tid))?;

    let mut players = Vec::with_capacity(side.pids.len());
    let mut total = 0.0;
    for pid in &side.pids {
        let p = league.require_player(*pid)?;
        total += p.contract.amount;
        players.push(format!(
            "{} ({}, ${:.1}M thru {})",
            p.name(),
            p.latest_ratings().map_or("?", |r| r.pos.as_str()),
            p.contract.amount / 1000.0,
            p.contract.exp
        ));
    }
    let picks = side
        .dpids
        .iter()
        .map(|dpid| league.require_draft_pick(*dpid).map(|dp| league.pick_desc(dp)))
        .collect::<Result<Vec<_>, _>>()?;

    let payroll: f64 = league
        .players_by_tid(side.tid)
        .iter()
        .map(|p| p.contract.amount)
        .sum();

    Ok(SideSummary {
        tid: side.tid,
        name: team.full_name(),
        players,
        picks,
        total,
        payroll_after_trade: payroll - total,
    })
}

/// Summarize `teams`, warning when a team would end up over the cap while
/// taking back more than 125% of the salary it sends out.
pub fn summarize(league: &League, teams: &TradeTeams) -> Result<TradeSummary, TradeError> {
    let mut sides = [
        side_summary(league, &teams[0])?,
        side_summary(league, &teams[1])?,
    ];

    let mut warning = None;
    for j in 0..2 {
        let incoming = sides[1 - j].total;
        let outgoing = sides[j].total;
        sides[j].payroll_after_trade += incoming;
        let after = sides[j].payroll_after_trade;

        if warning.is_none()
            && after > league.settings.salary_cap
            && incoming > OVER_CAP_RATIO * outgoing + CAP_TOLERANCE
        {
            let ratio = if outgoing > 0.0 {
                format!("{}", (100.0 * incoming / outgoing).round())
            } else {
                "infinite".to_string()
            };
            warning = Some(format!(
                "The {} are over the salary cap, so they can receive players with a total \
                 salary of no more than 125% of the salary of the players they trade away. \
                 Currently, this value is {}%.",
                sides[j].name, ratio
            ));
        }
    }

    Ok(TradeSummary {
        teams: sides,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::test_support::LeagueBuilder;

    #[test]
    fn totals_and_payrolls() {
        let league = LeagueBuilder::new(2)
            .roster(0, &[50.0, 45.0])
            .roster(1, &[55.0])
            .build();
        let teams = [
            TradeSide::new(0).with_players([0]),
            TradeSide::new(1).with_players([2]).with_picks([1]),
        ];
        let s = summarize(&league, &teams).unwrap();
        assert_eq!(s.teams[0].total, 5000.0);
        assert_eq!(s.teams[1].total, 5000.0);
        assert_eq!(s.teams[0].payroll_after_trade, 10000.0);
        assert_eq!(s.teams[1].payroll_after_trade, 5000.0);
        assert_eq!(s.teams[1].picks, vec!["2025 1st round pick (T1)".to_string()]);
        assert_eq!(s.teams[0].name, "City0 Team0");
        assert!(s.warning.is_none());
    }

    #[test]
    fn over_cap_team_taking_back_salary_is_warned() {
        let mut league = LeagueBuilder::new(2)
            .roster(0, &[50.0])
            .roster(1, &[50.0; 17])
            .build();
        // team 1 payroll 85000; user sends a 20000 contract for nothing
        league.players[0].contract.amount = 20000.0;
        let teams = [TradeSide::new(0).with_players([0]), TradeSide::new(1)];
        let s = summarize(&league, &teams).unwrap();
        assert!(s.warns_about("City1 Team1"));
        assert!(!s.warns_about("City0 Team0"));
        assert!(s.warning.unwrap().contains("salary cap"));
    }

    #[test]
    fn matching_salary_is_fine_over_the_cap() {
        let league = LeagueBuilder::new(2)
            .roster(0, &[50.0])
            .roster(1, &[50.0; 19])
            .build();
        let teams = [
            TradeSide::new(0).with_players([0]),
            TradeSide::new(1).with_players([1]),
        ];
        assert!(summarize(&league, &teams).unwrap().warning.is_none());
    }

    #[test]
    fn unknown_assets_are_errors() {
        let league = LeagueBuilder::new(2).build();
        let teams = [TradeSide::new(0).with_players([77]), TradeSide::new(1)];
        assert!(matches!(
            summarize(&league, &teams),
            Err(TradeError::League(_))
        ));
        let teams = [TradeSide::new(0), TradeSide::new(9)];
        assert!(matches!(
            summarize(&league, &teams),
            Err(TradeError::InvalidTeam(9))
        ));
    }
}
