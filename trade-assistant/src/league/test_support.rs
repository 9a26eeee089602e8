// Small synthetic leagues for unit tests.

use super::*;

pub(crate) struct LeagueBuilder {
    league: League,
    next_pid: Pid,
}

impl LeagueBuilder {
    /// `num_teams` teams (tid 0 is the user), two rounds of unslotted picks
    /// for the 2025 draft, regular season phase, no players.
    pub(crate) fn new(num_teams: i32) -> Self {
        let teams = (0..num_teams)
            .map(|tid| Team {
                tid,
                region: format!("City{tid}"),
                name: format!("Team{tid}"),
                abbrev: format!("T{tid}"),
                strategy: if tid % 2 == 0 {
                    Strategy::Rebuilding
                } else {
                    Strategy::Contending
                },
                disabled: false,
            })
            .collect();

        let mut league = League {
            settings: GameSettings {
                sport: Sport::Basketball,
                season: 2025,
                phase: Phase::RegularSeason,
                user_tid: 0,
                salary_cap: 90000.0,
                min_contract: 750.0,
                max_contract: 30000.0,
                num_games: 82,
                difficulty: 0.0,
                num_draft_rounds: 2,
                expansion_draft: ExpansionDraft::default(),
            },
            teams,
            team_seasons: vec![],
            players: vec![],
            draft_picks: vec![],
            trade_pick_values: None,
            fantasy_draft_results: vec![],
        };
        let mut dpid = 0;
        for round in 1..=2u8 {
            for tid in 0..num_teams {
                league.draft_picks.push(DraftPick {
                    dpid,
                    tid,
                    original_tid: tid,
                    round,
                    pick: 0,
                    season: DraftSeason::Year(2025),
                });
                dpid += 1;
            }
        }
        LeagueBuilder {
            league,
            next_pid: 0,
        }
    }

    pub(crate) fn phase(mut self, phase: Phase) -> Self {
        self.league.settings.phase = phase;
        self
    }

    /// Slot every pick by tid: team `t` picks `t + 1` in each round.
    pub(crate) fn slotted_picks(mut self) -> Self {
        for dp in &mut self.league.draft_picks {
            dp.pick = (dp.original_tid + 1) as u16;
        }
        self
    }

    pub(crate) fn record(mut self, tid: Tid, won: u32, lost: u32) -> Self {
        self.league.team_seasons.push(TeamSeason {
            tid,
            season: self.league.settings.season,
            won,
            lost,
        });
        self
    }

    /// Age-25 players with `value == ovr`, 5000 salary through 2027.
    pub(crate) fn roster(mut self, tid: Tid, values: &[f64]) -> Self {
        for &v in values {
            let p = self.make_player(tid, v);
            self.league.players.push(p);
        }
        self
    }

    pub(crate) fn free_agent(mut self, value: f64) -> Self {
        let p = self.make_player(FREE_AGENT, value);
        self.league.players.push(p);
        self
    }

    pub(crate) fn prospect(mut self, year: i32, value: f64) -> Self {
        let mut p = self.make_player(UNDRAFTED, value);
        p.draft.year = year;
        p.draft.original_tid = UNDRAFTED;
        p.born_year = year - 19;
        self.league.players.push(p);
        self
    }

    pub(crate) fn build(self) -> League {
        self.league
    }

    fn make_player(&mut self, tid: Tid, value: f64) -> Player {
        let pid = self.next_pid;
        self.next_pid += 1;
        Player {
            pid,
            tid,
            first_name: "Player".into(),
            last_name: pid.to_string(),
            born_year: 2000,
            value,
            value_fuzz: None,
            contract: Contract {
                amount: 5000.0,
                exp: 2027,
            },
            injury: Injury::healthy(),
            ratings: vec![PlayerRatings {
                season: 2025,
                ovr: value,
                pot: value,
                pos: "F".into(),
            }],
            draft: DraftInfo {
                year: 2019,
                round: 1,
                pick: 10,
                original_tid: 99,
            },
            games_until_tradable: 0,
            transactions: vec![],
        }
    }
}
