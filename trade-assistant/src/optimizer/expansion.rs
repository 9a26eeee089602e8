// Expansion draft: scouting leaderboard and auto-completion of the draft.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::league::{
    DraftPick, DraftResult, DraftSeason, ExpansionDraft, League, LeagueError, Phase, Pid, Player,
    Strategy, Tid, Transaction, TransactionKind,
};
use crate::market::TradeMarket;
use crate::valuation::contract::contract_value;
use crate::valuation::strategy::{age_factor, apply_exponent, contracts_factor};
use crate::valuation::zscore::OvrStats;
use crate::valuation::ValuationContext;

/// The leaderboard always uses the basketball exponent.
const INTEL_EXPONENT: f64 = 7.0;
const SEPARATOR_AFTER: usize = 10;

// ---------------------------------------------------------------------------
// Intel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntelEntry {
    pub pid: Pid,
    pub name: String,
    pub tid: Tid,
    pub value: f64,
}

/// Available players ranked under each strategy, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpansionIntel {
    pub rebuilding: Vec<IntelEntry>,
    pub contending: Vec<IntelEntry>,
}

#[derive(Serialize)]
struct LeaderboardRow<'a> {
    rank: usize,
    rebuilding_pid: Pid,
    rebuilding_name: &'a str,
    rebuilding_value: f64,
    contending_pid: Pid,
    contending_name: &'a str,
    contending_value: f64,
}

/// JavaScript-style `toPrecision(4)`: four significant digits, scientific
/// notation for very large or very small magnitudes.
fn to_precision4(v: f64) -> String {
    let sci = format!("{v:.3e}");
    let exp: i32 = sci
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);
    if !(-6..4).contains(&exp) {
        let (mantissa, _) = sci.split_once('e').unwrap_or((sci.as_str(), ""));
        let sign = if exp >= 0 { "+" } else { "-" };
        return format!("{}e{}{}", mantissa, sign, exp.abs());
    }
    let decimals = (3 - exp).max(0) as usize;
    format!("{v:.decimals$}")
}

impl ExpansionIntel {
    fn rows(&self, limit: usize) -> impl Iterator<Item = LeaderboardRow<'_>> {
        self.rebuilding
            .iter()
            .zip(&self.contending)
            .take(limit)
            .enumerate()
            .map(|(i, (r, c))| LeaderboardRow {
                rank: i + 1,
                rebuilding_pid: r.pid,
                rebuilding_name: &r.name,
                rebuilding_value: r.value,
                contending_pid: c.pid,
                contending_name: &c.name,
                contending_value: c.value,
            })
    }

    /// Side-by-side text leaderboard of the top `limit` players, with a
    /// divider after the first ten.
    pub fn leaderboard(&self, limit: usize) -> String {
        let mut out = String::from("Player Value Leaderboard:\n");
        for row in self.rows(limit) {
            out.push_str(&format!(
                "{}, {} ||| {}, {}\n",
                row.rebuilding_name,
                to_precision4(row.rebuilding_value),
                row.contending_name,
                to_precision4(row.contending_value)
            ));
            if row.rank == SEPARATOR_AFTER {
                out.push_str(&"-".repeat(40));
                out.push('\n');
            }
        }
        out
    }

    pub fn write_csv<W: Write>(&self, writer: W, limit: usize) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in self.rows(limit) {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Path, limit: usize) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        self.write_csv(file, limit)
            .with_context(|| format!("failed to write leaderboard to {}", path.display()))
    }
}

/// A player's worth to a team following `strategy`: z-scored value, age
/// multiplier, contract surplus weighted by strategy, then the exponent.
fn intel_value(p: &Player, strategy: Strategy, stats: &OvrStats, ctx: &ValuationContext) -> f64 {
    let mut value = stats.zscore(p.value);
    let contract = contract_value(&p.contract, value, ctx);
    value *= age_factor(strategy, p.age(ctx.season));
    value += contracts_factor(strategy) * contract;
    apply_exponent(value, INTEL_EXPONENT)
}

fn available_players(league: &League) -> Vec<&Player> {
    let available = &league.settings.expansion_draft.available_pids;
    league
        .players_in_league()
        .into_iter()
        .filter(|p| available.contains(&p.pid))
        .collect()
}

/// Value every player still available in the expansion draft as a
/// rebuilding and as a contending team would.
pub fn expansion_draft_intel(league: &League) -> ExpansionIntel {
    let mut stats = OvrStats::default();
    stats.refresh(league);
    let ctx = ValuationContext::from_league(league);

    let ranked = |strategy: Strategy| {
        let mut entries: Vec<IntelEntry> = available_players(league)
            .into_iter()
            .map(|p| IntelEntry {
                pid: p.pid,
                name: p.name(),
                tid: p.tid,
                value: intel_value(p, strategy, &stats, &ctx),
            })
            .collect();
        entries.sort_by(|a, b| b.value.total_cmp(&a.value));
        entries
    };

    ExpansionIntel {
        rebuilding: ranked(Strategy::Rebuilding),
        contending: ranked(Strategy::Contending),
    }
}

// ---------------------------------------------------------------------------
// Auto-complete
// ---------------------------------------------------------------------------

/// Give `pick` to its owner as player `pid`: move the player, log the draft
/// result and transaction, update the expansion bookkeeping and consume the
/// pick.
fn draft_expansion_player(
    league: &mut League,
    pick: &DraftPick,
    pid: Pid,
) -> Result<DraftResult, LeagueError> {
    let season = league.season();
    let phase = league.phase();
    let num_expansion = league.settings.expansion_draft.expansion_tids.len() as u32;
    let pick_num = u32::from(pick.pick) + (u32::from(pick.round) - 1) * num_expansion;

    let player = league
        .player_mut(pid)
        .ok_or(LeagueError::UnknownPlayer(pid))?;
    let prev_tid = player.tid;
    player.tid = pick.tid;
    player.transactions.push(Transaction {
        season,
        phase,
        tid: pick.tid,
        kind: TransactionKind::Draft,
        from_tid: None,
        pick_num: Some(pick_num),
    });
    let (ovr, pot, name) = (player.ovr(), player.pot(), player.name());

    let result = DraftResult {
        pid,
        prev_tid,
        prev_abbrev: league.team(prev_tid).map(|t| t.abbrev.clone()),
        tid: pick.tid,
        round: pick.round,
        pick: pick.pick,
        year: season,
        ovr,
        pot,
    };
    league.fantasy_draft_results.push(result.clone());

    let draft = &mut league.settings.expansion_draft;
    *draft.num_per_team_drafted.entry(prev_tid).or_insert(0) += 1;
    draft.available_pids.retain(|p| *p != pid);

    league.remove_pick(pick.dpid)?;
    info!("Drafted {} (pid {}) from team {}", name, pid, prev_tid);
    Ok(result)
}

/// Fill every remaining expansion pick in order with the best available
/// player by fuzzed value, then close the expansion draft and move to the
/// after-draft phase.
pub fn auto_complete_expansion_draft<M: TradeMarket + ?Sized>(
    market: &mut M,
) -> Result<Vec<DraftResult>> {
    let mut drafted = Vec::new();
    loop {
        let league = market.league();
        let Some(pick) = league
            .draft_picks_by_season(DraftSeason::Expansion)
            .into_iter()
            .min_by(|a, b| a.draft_order(b))
            .cloned()
        else {
            break;
        };
        // first of equally valued players
        let Some(pid) = available_players(league)
            .into_iter()
            .rev()
            .max_by(|a, b| a.fuzzed_value().total_cmp(&b.fuzzed_value()))
            .map(|p| p.pid)
        else {
            info!("No available players left to draft");
            break;
        };
        let result = draft_expansion_player(market.league_mut(), &pick, pid)
            .with_context(|| format!("failed to draft player {pid} with pick {}", pick.dpid))?;
        drafted.push(result);
    }

    let league = market.league_mut();
    league.settings.expansion_draft = ExpansionDraft::finished();
    league.set_phase(Phase::AfterDraft);
    info!(
        "Expansion draft complete after {} picks; phase set to {}",
        drafted.len(),
        Phase::AfterDraft
    );
    Ok(drafted)
}
