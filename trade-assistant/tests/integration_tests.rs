// Integration tests for the trade assistant.
//
// These drive the public API against the JSON league fixture with the real
// valuation engine. Search results depend on the whole valuation model, so
// most checks are on invariants that hold whatever trades the searches find:
// reports agree with the market's trade count, protected players stay, and
// assets only move through accepted trades.

use std::path::{Path, PathBuf};

use trade_assistant::config;
use trade_assistant::db::Database;
use trade_assistant::league::{
    DraftPick, DraftSeason, ExpansionDraft, ExpansionDraftPhase, League, Phase, Strategy, Team,
};
use trade_assistant::market::{LocalMarket, TradeMarket};
use trade_assistant::optimizer::{self, OptimizerLimits, TradeUpMode};
use trade_assistant::trade::{self, TradeSide};
use trade_assistant::valuation::ValueChangeRequest;

// ===========================================================================
// Test helpers
// ===========================================================================

fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Four teams in the 2025 draft. The user (BOS, tid 0) holds #2 and #6.
fn fixture_league() -> League {
    League::load(&crate_root().join("tests/fixtures/league.json")).expect("fixture loads")
}

fn fixture_in_phase(phase: Phase) -> League {
    let mut league = fixture_league();
    league.set_phase(phase);
    league
}

/// Adds an expansion team (tid 4) holding three first-round expansion picks.
fn expansion_league(available: Vec<u32>) -> League {
    let mut league = fixture_in_phase(Phase::ExpansionDraft);
    league.teams.push(Team {
        tid: 4,
        region: "Portland".into(),
        name: "Pines".into(),
        abbrev: "POR".into(),
        strategy: Strategy::Rebuilding,
        disabled: false,
    });
    for (dpid, pick) in [(100, 3), (101, 1), (102, 2)] {
        league.draft_picks.push(DraftPick {
            dpid,
            tid: 4,
            original_tid: 4,
            round: 1,
            pick,
            season: DraftSeason::Expansion,
        });
    }
    league.settings.expansion_draft = ExpansionDraft {
        phase: ExpansionDraftPhase::Draft,
        expansion_tids: vec![4],
        available_pids: available,
        num_per_team_drafted: Default::default(),
    };
    league
}

// ===========================================================================
// League and valuation
// ===========================================================================

#[test]
fn fixture_loads_with_draft_order() {
    let league = fixture_league();
    assert_eq!(league.teams.len(), 4);
    assert_eq!(league.players.len(), 42);
    assert_eq!(league.phase(), Phase::Draft);
    assert_eq!(league.num_picks_per_round(), 4);

    let picks: Vec<(u8, u16)> = optimizer::current_user_picks(&league)
        .iter()
        .map(|dp| (dp.round, dp.pick))
        .collect();
    assert_eq!(picks, vec![(1, 2), (2, 2)]);
    assert_eq!(optimizer::sorted_user_picks(&league).len(), 4);
}

#[test]
fn value_change_rewards_stars() {
    let mut market = LocalMarket::new(fixture_league());
    let gain = market
        .value_change(&ValueChangeRequest::new(1).add_players([0]).with_partner(0))
        .unwrap();
    assert!(gain > 0.0, "adding a 68 should help, got {gain}");

    let loss = market
        .value_change(&ValueChangeRequest::new(1).remove_players([8]).with_partner(0))
        .unwrap();
    assert!(loss < 0.0, "losing a 72 should hurt, got {loss}");

    assert!(market.value_change(&ValueChangeRequest::new(9)).is_err());
}

#[test]
fn generous_offer_is_balanced_by_the_receiver() {
    let mut market = LocalMarket::new(fixture_league());
    let teams = [TradeSide::new(0).with_players([0]), TradeSide::new(1)];
    let built = {
        let (league, engine) = market.league_and_engine();
        trade::build_trade(league, engine, &teams, true, None).unwrap()
    };
    let built = built.expect("a star offer can always be balanced");
    assert_eq!(built[0], teams[0]);
    assert_eq!(market.trades_executed(), 0);
}

// ===========================================================================
// Trades, ledger and snapshot
// ===========================================================================

#[test]
fn lopsided_trade_is_executed_and_recorded() {
    let ledger = Database::open(":memory:").unwrap();
    let mut market = LocalMarket::new(fixture_league()).with_ledger(ledger);
    let teams = [
        TradeSide::new(0).with_players([0]),
        TradeSide::new(1).with_players([15]),
    ];
    let outcome = market.propose(&teams, "star for a veteran").unwrap();
    assert!(outcome.accepted, "{}", outcome.message);
    assert_eq!(market.trades_executed(), 1);
    assert_eq!(market.league().player(0).unwrap().tid, 1);
    assert_eq!(market.league().player(15).unwrap().tid, 0);

    let ledger = market.ledger().unwrap();
    let trades = ledger.load_trades(market.session_id()).unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].description, "star for a veteran");
    assert_eq!(trades[0].teams, teams);
}

#[test]
fn snapshot_round_trip_keeps_executed_trade() {
    let mut market = LocalMarket::new(fixture_league());
    let teams = [
        TradeSide::new(0).with_players([0]),
        TradeSide::new(1).with_players([15]),
    ];
    assert!(market.propose(&teams, "swap").unwrap().accepted);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/league.json");
    market.into_league().save(&path).unwrap();
    let reloaded = League::load(&path).unwrap();
    assert_eq!(reloaded.player(0).unwrap().tid, 1);
    assert_eq!(reloaded.players.len(), 42);
}

// ===========================================================================
// Draft-day optimizer
// ===========================================================================

fn assert_draft_report_consistent(mode: TradeUpMode) {
    let mut market = LocalMarket::new(fixture_league());
    let report =
        optimizer::optimize_draft_trades(&mut market, &OptimizerLimits::default(), mode).unwrap();

    assert_eq!(
        report.trades_executed + report.free_picks_acquired + report.free_pick_trades,
        market.trades_executed()
    );
    // trade-ups swap pick for pick and free picks only add
    assert!(optimizer::current_user_picks(market.league()).len() >= 2);
    assert_eq!(
        report.final_picks.len(),
        optimizer::sorted_user_picks(market.league()).len()
    );
}

#[test]
fn path_optimizer_report_matches_market() {
    assert_draft_report_consistent(TradeUpMode::Path);
}

#[test]
fn greedy_optimizer_report_matches_market() {
    assert_draft_report_consistent(TradeUpMode::Greedy);
}

#[test]
fn draft_optimizer_refuses_outside_the_draft() {
    let mut market = LocalMarket::new(fixture_in_phase(Phase::RegularSeason));
    let err = optimizer::optimize_draft_trades(
        &mut market,
        &OptimizerLimits::default(),
        TradeUpMode::Path,
    )
    .unwrap_err();
    assert!(err.to_string().contains("during the draft"));
    assert_eq!(market.trades_executed(), 0);
}

#[test]
fn top_gettable_picks_start_from_user_picks() {
    let mut market = LocalMarket::new(fixture_league());
    let user = market.user_tid();
    for (from, to) in optimizer::trade_up::top_gettable_picks(&mut market) {
        assert_eq!(from.tid, user);
        assert!(!from.is_better_than(&to));
    }
    assert_eq!(market.trades_executed(), 0);
}

// ===========================================================================
// Pick scans
// ===========================================================================

#[test]
fn pick_scans_do_not_trade() {
    let mut market = LocalMarket::new(fixture_in_phase(Phase::RegularSeason));
    for giver in optimizer::find_pick_givers(&mut market) {
        assert!(giver.dv > 0.0);
        assert_eq!(market.league().draft_pick(giver.dpid).unwrap().tid, giver.tid);
    }
    for team in optimizer::find_willing_teams(&mut market) {
        assert!(team.dv > 0.0);
        assert_ne!(team.tid, 0);
        assert!(!team.negative_pids.is_empty());
    }
    assert_eq!(market.trades_executed(), 0);
}

#[test]
fn valuable_picks_report_matches_market() {
    let mut market = LocalMarket::new(fixture_in_phase(Phase::RegularSeason));
    let report = optimizer::find_most_valuable_picks(&mut market, &OptimizerLimits::default());
    assert_eq!(report.executed.len(), market.trades_executed());
    for deal in &report.executed {
        for dpid in &deal.dpids {
            assert_eq!(market.league().draft_pick(*dpid).unwrap().tid, 0);
        }
    }
}

// ===========================================================================
// Expansion draft
// ===========================================================================

#[test]
fn expansion_draft_fills_every_pick_in_order() {
    // values: pid 25 = 64, pid 9 = 63, pid 1 = 61, pid 17 = 59, pid 3 = 52
    let mut market = LocalMarket::new(expansion_league(vec![1, 9, 17, 25, 3]));
    let drafted = optimizer::auto_complete_expansion_draft(&mut market).unwrap();

    assert_eq!(drafted.iter().map(|r| r.pid).collect::<Vec<_>>(), vec![25, 9, 1]);
    assert_eq!(drafted.iter().map(|r| r.pick).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(drafted[0].prev_abbrev.as_deref(), Some("SEA"));

    let league = market.league();
    assert_eq!(league.phase(), Phase::AfterDraft);
    assert_eq!(league.settings.expansion_draft.phase, ExpansionDraftPhase::Setup);
    assert!(league.draft_picks_by_season(DraftSeason::Expansion).is_empty());
    assert_eq!(league.players_by_tid(4).len(), 3);
    assert_eq!(league.fantasy_draft_results.len(), 3);
}

#[test]
fn expansion_intel_writes_leaderboard() {
    let league = expansion_league(vec![1, 9, 17, 25, 3]);
    let intel = optimizer::expansion_draft_intel(&league);
    assert_eq!(intel.rebuilding.len(), 5);
    assert_eq!(intel.contending.len(), 5);
    assert!(intel
        .rebuilding
        .windows(2)
        .all(|w| w[0].value >= w[1].value));

    let text = intel.leaderboard(3);
    assert_eq!(text.lines().count(), 1 + 3);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intel.csv");
    intel.save_csv(&path, 20).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    assert_eq!(csv.lines().count(), 1 + 5);
}

// ===========================================================================
// Post-draft optimizer
// ===========================================================================

#[test]
fn post_draft_keeps_protected_players() {
    let mut market = LocalMarket::new(fixture_in_phase(Phase::AfterDraft));
    let report = optimizer::post_draft_optimize(&mut market);

    assert_eq!(
        report.prospect_trades.len() + report.chaining.trades.len(),
        market.trades_executed()
    );
    // pid 0 was drafted by the user; pids 2 and 6 are 22 and 20
    for pid in [0, 2, 6] {
        assert_eq!(market.league().player(pid).unwrap().tid, 0, "pid {pid} moved");
    }
    for pid in &report.chaining.bad_contracts_held {
        assert_eq!(market.league().player(*pid).unwrap().tid, 0);
    }
}

// ===========================================================================
// Configuration
// ===========================================================================

#[test]
fn shipped_defaults_initialize_config() {
    let dir = tempfile::tempdir().unwrap();
    let defaults = dir.path().join("defaults");
    std::fs::create_dir_all(&defaults).unwrap();
    std::fs::copy(
        crate_root().join("defaults/settings.toml"),
        defaults.join("settings.toml"),
    )
    .unwrap();

    let config = config::load_config(dir.path()).unwrap();
    assert!(dir.path().join("config/settings.toml").exists());
    assert_eq!(config.optimizer, OptimizerLimits::default());
    assert_eq!(
        config.resolve(dir.path(), &config.league.snapshot),
        dir.path().join(Path::new("data/league.json"))
    );
}
