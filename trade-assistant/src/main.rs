// tradeup: command-line front end for the trade assistant.
//
// Every command:
// 1. Loads config (copying defaults on first run)
// 2. Initializes tracing (log file, not the terminal)
// 3. Loads the league snapshot and opens the trade ledger
// 4. Runs the command against a local market, printing a report to stdout
// 5. Writes the snapshot back if the league changed (unless --dry-run)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use trade_assistant::config::{self, Config};
use trade_assistant::db::Database;
use trade_assistant::league::{Dpid, League, Pid, Tid};
use trade_assistant::market::{LocalMarket, TradeMarket};
use trade_assistant::optimizer::{self, OptimizerLimits, TradeUpMode};
use trade_assistant::trade::{self, TradeSide, TradeTeams};
use trade_assistant::valuation::ValueChangeRequest;

#[derive(Debug, Parser)]
#[command(name = "tradeup", version, about = "Trade valuation and draft-trade automation")]
struct Cli {
    /// Directory holding defaults/ and config/; relative config paths start here.
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    /// League snapshot to use instead of the configured one.
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Execute against the snapshot in memory only: nothing is written back
    /// and the ledger is not touched.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Value change for one team of adding and removing assets.
    Value {
        #[arg(long)]
        tid: Tid,
        #[arg(long, value_delimiter = ',')]
        add_players: Vec<Pid>,
        #[arg(long, value_delimiter = ',')]
        remove_players: Vec<Pid>,
        #[arg(long, value_delimiter = ',')]
        add_picks: Vec<Dpid>,
        #[arg(long, value_delimiter = ',')]
        remove_picks: Vec<Dpid>,
    },
    /// Balance a trade with another team so it accepts; optionally propose it.
    BuildTrade {
        /// The team on the other side.
        #[arg(long)]
        with: Tid,
        #[arg(long, value_delimiter = ',')]
        give_players: Vec<Pid>,
        #[arg(long, value_delimiter = ',')]
        give_picks: Vec<Dpid>,
        #[arg(long, value_delimiter = ',')]
        get_players: Vec<Pid>,
        #[arg(long, value_delimiter = ',')]
        get_picks: Vec<Dpid>,
        /// Never add assets to the user's side.
        #[arg(long)]
        hold: bool,
        #[arg(long)]
        max_assets: Option<usize>,
        #[arg(long)]
        propose: bool,
    },
    /// Trade every pick in this draft up and collect free picks.
    OptimizeDraft {
        /// Take the best swap at each step instead of searching paths.
        #[arg(long)]
        greedy: bool,
    },
    /// Teams that would give a pick away with their negative contracts.
    PickGivers,
    /// Teams that would take the user's expiring contracts for a pick.
    WillingTeams,
    /// Execute the best pick-for-contracts deals and list the rest.
    ValuablePicks,
    /// Best pick reachable from each of the user's picks.
    TopPicks,
    /// Expansion draft leaderboard under both strategies.
    ExpansionIntel {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Also write the leaderboard to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Fill every remaining expansion pick with the best available player.
    ExpansionDraft,
    /// Dump contracts for draftees, then chain contracts into prospects.
    PostDraft,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(&cli.config_dir).context("failed to load configuration")?;
    init_tracing(&config.resolve(&cli.config_dir, &config.logging.dir))?;
    info!("tradeup starting: {:?}", cli.command);

    let snapshot = cli
        .snapshot
        .clone()
        .unwrap_or_else(|| config.resolve(&cli.config_dir, &config.league.snapshot));
    let league = League::load(&snapshot)
        .with_context(|| format!("failed to load league from {}", snapshot.display()))?;

    let db_path = if cli.dry_run {
        ":memory:".to_string()
    } else {
        ledger_path(&cli.config_dir, &config)?
    };
    let ledger = Database::open(&db_path).context("failed to open trade ledger")?;
    let mut market = LocalMarket::new(league).with_ledger(ledger);
    info!("Session {} (ledger {})", market.session_id(), db_path);

    let changed = run(&cli.command, &mut market, &config.optimizer)?;

    if !changed {
        return Ok(());
    }
    if cli.dry_run {
        println!("Dry run: {} not written", snapshot.display());
        return Ok(());
    }
    market
        .into_league()
        .save(&snapshot)
        .with_context(|| format!("failed to save league to {}", snapshot.display()))?;
    println!("Saved league to {}", snapshot.display());
    Ok(())
}

/// Run one command. Returns whether the league changed.
fn run(command: &Command, market: &mut LocalMarket, limits: &OptimizerLimits) -> Result<bool> {
    match command {
        Command::Value {
            tid,
            add_players,
            remove_players,
            add_picks,
            remove_picks,
        } => {
            let req = ValueChangeRequest::new(*tid)
                .add_players(add_players.iter().copied())
                .remove_players(remove_players.iter().copied())
                .add_picks(add_picks.iter().copied())
                .remove_picks(remove_picks.iter().copied())
                .with_partner(market.user_tid());
            let dv = market.value_change(&req).context("valuation failed")?;
            println!("Value change for {}: {:.4}", team_abbrev(market, *tid), dv);
            Ok(false)
        }

        Command::BuildTrade {
            with,
            give_players,
            give_picks,
            get_players,
            get_picks,
            hold,
            max_assets,
            propose,
        } => {
            let teams: TradeTeams = [
                TradeSide::new(market.user_tid())
                    .with_players(give_players.iter().copied())
                    .with_picks(give_picks.iter().copied()),
                TradeSide::new(*with)
                    .with_players(get_players.iter().copied())
                    .with_picks(get_picks.iter().copied()),
            ];
            let built = {
                let (league, engine) = market.league_and_engine();
                trade::build_trade(league, engine, &teams, *hold, *max_assets)
                    .context("failed to build trade")?
            };
            let Some(built) = built else {
                println!("No balanced trade found");
                return Ok(false);
            };
            print_trade(market, &built);
            if !*propose {
                return Ok(false);
            }
            let outcome = market
                .propose(&built, "Built trade")
                .context("failed to propose trade")?;
            println!("{}", outcome.message);
            Ok(outcome.accepted)
        }

        Command::OptimizeDraft { greedy } => {
            let mode = if *greedy {
                TradeUpMode::Greedy
            } else {
                TradeUpMode::Path
            };
            let report = optimizer::optimize_draft_trades(market, limits, mode)?;
            print!("{report}");
            Ok(market.trades_executed() > 0)
        }

        Command::PickGivers => {
            let givers = optimizer::find_pick_givers(market);
            if givers.is_empty() {
                println!("No team would give a pick away");
            }
            for g in &givers {
                println!(
                    "{}: {} + {} (dv {:.3})",
                    g.name,
                    pick_label(market, g.dpid),
                    players(market, &g.negative_pids),
                    g.dv
                );
            }
            Ok(false)
        }

        Command::WillingTeams => {
            let willing = optimizer::find_willing_teams(market);
            if willing.is_empty() {
                println!("No team would take the expiring contracts for a pick");
            }
            for w in &willing {
                println!(
                    "{}: {} + {} for {} (dv {:.3})",
                    w.abbrev,
                    pick_label(market, w.dpid),
                    players(market, &w.negative_pids),
                    players(market, &w.offered_pids),
                    w.dv
                );
            }
            Ok(false)
        }

        Command::ValuablePicks => {
            let report = optimizer::find_most_valuable_picks(market, limits);
            print!("{report}");
            Ok(market.trades_executed() > 0)
        }

        Command::TopPicks => {
            for (from, to) in optimizer::trade_up::top_gettable_picks(market) {
                println!("{} -> {}", market.pick_desc(&from), market.pick_desc(&to));
            }
            Ok(false)
        }

        Command::ExpansionIntel { limit, csv } => {
            let intel = optimizer::expansion_draft_intel(market.league());
            print!("{}", intel.leaderboard(*limit));
            if let Some(path) = csv {
                intel.save_csv(path, *limit)?;
                println!("Wrote {}", path.display());
            }
            Ok(false)
        }

        Command::ExpansionDraft => {
            let drafted = optimizer::auto_complete_expansion_draft(market)?;
            for r in &drafted {
                let name = market
                    .league()
                    .player(r.pid)
                    .map_or_else(|| r.pid.to_string(), |p| p.name());
                println!(
                    "Round {} pick {}: {} to {} (from {})",
                    r.round,
                    r.pick,
                    name,
                    team_abbrev(market, r.tid),
                    r.prev_abbrev.as_deref().unwrap_or("?")
                );
            }
            println!("Expansion draft complete: {} players drafted", drafted.len());
            Ok(true)
        }

        Command::PostDraft => {
            let report = optimizer::post_draft_optimize(market);
            print!("{report}");
            Ok(market.trades_executed() > 0)
        }
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn team_abbrev(market: &LocalMarket, tid: Tid) -> String {
    market
        .team(tid)
        .map_or_else(|| tid.to_string(), |t| t.abbrev.clone())
}

fn pick_label(market: &LocalMarket, dpid: Dpid) -> String {
    market
        .league()
        .draft_pick(dpid)
        .map_or_else(|| format!("pick {dpid}"), |dp| market.pick_desc(dp))
}

fn players(market: &LocalMarket, pids: &[Pid]) -> String {
    let names: Vec<String> = pids
        .iter()
        .map(|pid| {
            market
                .league()
                .player(*pid)
                .map_or_else(|| pid.to_string(), |p| format!("{} ({:.1})", p.name(), p.value))
        })
        .collect();
    format!("[{}]", names.join(", "))
}

fn print_trade(market: &LocalMarket, teams: &TradeTeams) {
    for side in teams {
        let picks: Vec<String> = side.dpids.iter().map(|d| pick_label(market, *d)).collect();
        println!(
            "{} gives {} {}",
            team_abbrev(market, side.tid),
            players(market, &side.pids),
            picks.join(", ")
        );
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn ledger_path(base_dir: &Path, config: &Config) -> Result<String> {
    if config.database.path == ":memory:" {
        return Ok(config.database.path.clone());
    }
    let path = config.resolve(base_dir, Path::new(&config.database.path));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(path.to_string_lossy().into_owned())
}

/// Initialize tracing to log to a file; stdout is reserved for reports.
fn init_tracing(log_dir: &Path) -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_file = std::fs::File::create(log_dir.join("trade-assistant.log"))
        .context("failed to create log file")?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trade_assistant=info,tradeup=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
