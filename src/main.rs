use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, warn};

use scout_similarity::PlayerProfile;
use scout_similarity::config::ScoutConfig;
use scout_similarity::filter::ResultFilter;
use scout_similarity::logging::init_tracing;
use scout_similarity::pool::{find_by_id, find_by_name, load_pool};
use scout_similarity::ranker::{RankedPlayer, Ranker, SimilarityStrategy, join_profiles};
use scout_similarity::role::normalize_position_code;
use scout_similarity::similarity::{ScoreBreakdown, explain};

const USAGE: &str = "\
usage: scout --pool <players.json> (--target <id> | --player <name>) [options]

options:
  --top <n>            rows to print (default SCOUT_TOP_K or 10)
  --all                print every ranked candidate
  --strategy <name>    weighted | cosine
  --weights <path>     external weight table
  --explain            show the strongest contributing features
  --json               machine-readable output on stdout
  --min-age <n>        --max-age <n>
  --min-value <m>      --max-value <m>   (market value, millions)
  --league <name>      repeatable
  --position <code>    repeatable
  --min-score <pct>    minimum similarity, 0-100";

const EXPLAIN_FEATURES: usize = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputRow<'a> {
    rank: usize,
    id: &'a str,
    name: &'a str,
    club: &'a str,
    league: &'a str,
    position: &'a str,
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<ScoreBreakdown>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let mut cfg = ScoutConfig::from_env();
    apply_overrides(&mut cfg, &args)?;

    let pool_path = cfg
        .pool_path
        .clone()
        .context("no candidate pool: pass --pool or set SCOUT_POOL_PATH")?;
    let pool = load_pool(&pool_path)?;
    let target = resolve_target(&pool, &args)?;
    let table = cfg.load_weight_table()?;
    let filter = parse_filter(&args)?;

    let ranker = Ranker::new(&table)
        .with_strategy(cfg.strategy)
        .with_parallel_min_pool(cfg.parallel_min_pool);
    let show_all = has_flag(&args, "--all");
    // Filters drop rows after ranking, so the limit must come after them too.
    let rank_limit = if show_all || filter.is_active() {
        None
    } else {
        Some(cfg.top_k)
    };
    let results = ranker.rank(target, &pool, rank_limit)?;

    let mut rows: Vec<RankedPlayer<'_>> = filter.apply(&join_profiles(&results, &pool));
    if !show_all {
        rows.truncate(cfg.top_k);
    }
    info!(
        target = target.id(),
        strategy = %cfg.strategy,
        ranked = results.len(),
        shown = rows.len(),
        "ranking complete"
    );

    let with_explain = has_flag(&args, "--explain");
    if with_explain && cfg.strategy != SimilarityStrategy::WeightedDelta {
        warn!("--explain only applies to the weighted strategy");
    }
    let out: Vec<OutputRow<'_>> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let identity = row.profile.identity();
            let breakdown = (with_explain && cfg.strategy == SimilarityStrategy::WeightedDelta)
                .then(|| explain(target, row.profile, &table));
            OutputRow {
                rank: idx + 1,
                id: row.profile.id(),
                name: &identity.name,
                club: &identity.club,
                league: &identity.league,
                position: row.profile.position_code(),
                score: row.score,
                breakdown,
            }
        })
        .collect();

    if has_flag(&args, "--json") {
        let json = serde_json::to_string_pretty(&out).context("serialize ranking")?;
        println!("{json}");
    } else {
        print_table(target, cfg.strategy, &out);
    }
    Ok(())
}

fn apply_overrides(cfg: &mut ScoutConfig, args: &[String]) -> Result<()> {
    if let Some(path) = arg_value(args, "--pool") {
        cfg.pool_path = Some(PathBuf::from(path));
    }
    if let Some(path) = arg_value(args, "--weights") {
        cfg.weights_path = Some(PathBuf::from(path));
    }
    if let Some(raw) = arg_value(args, "--strategy") {
        cfg.strategy = raw.parse::<SimilarityStrategy>()?;
    }
    if let Some(raw) = arg_value(args, "--top") {
        let top = raw
            .parse::<usize>()
            .with_context(|| format!("--top expects a count, got {raw}"))?;
        cfg.top_k = top.max(1);
    }
    Ok(())
}

fn resolve_target<'a>(pool: &'a [PlayerProfile], args: &[String]) -> Result<&'a PlayerProfile> {
    if let Some(id) = arg_value(args, "--target") {
        return find_by_id(pool, &id).with_context(|| format!("no player with id {id} in pool"));
    }
    if let Some(name) = arg_value(args, "--player") {
        return find_by_name(pool, &name).with_context(|| format!("no player named {name} in pool"));
    }
    bail!("pass --target <id> or --player <name>\n\n{USAGE}")
}

fn parse_filter(args: &[String]) -> Result<ResultFilter> {
    let mut filter = ResultFilter::default();
    if let Some(v) = parse_f64_arg(args, "--min-age")? {
        filter.age_range.0 = v;
    }
    if let Some(v) = parse_f64_arg(args, "--max-age")? {
        filter.age_range.1 = v;
    }
    if let Some(v) = parse_f64_arg(args, "--min-value")? {
        filter.market_value_range.0 = v;
    }
    if let Some(v) = parse_f64_arg(args, "--max-value")? {
        filter.market_value_range.1 = v;
    }
    if let Some(pct) = parse_f64_arg(args, "--min-score")? {
        filter.min_similarity = (pct / 100.0).clamp(0.0, 1.0);
    }
    filter.leagues = arg_values(args, "--league").into_iter().collect();
    filter.positions = arg_values(args, "--position")
        .iter()
        .map(|raw| normalize_position_code(raw))
        .collect::<BTreeSet<_>>();
    Ok(filter)
}

fn print_table(target: &PlayerProfile, strategy: SimilarityStrategy, rows: &[OutputRow<'_>]) {
    let label = display_name(target.name(), target.id());
    println!(
        "Similar to {label} ({}, {}) - {strategy} model",
        target.position_code(),
        target.role().label()
    );
    if rows.is_empty() {
        println!("  no candidates matched");
        return;
    }
    for row in rows {
        println!(
            "{:>3}. {:<28} {:<5} {:<22} {:<16} {:>5.1}%",
            row.rank,
            truncate(display_name(row.name, row.id), 28),
            row.position,
            truncate(row.club, 22),
            truncate(row.league, 16),
            row.score * 100.0
        );
        if let Some(breakdown) = &row.breakdown {
            let top = breakdown
                .top_contributions(EXPLAIN_FEATURES)
                .iter()
                .map(|c| format!("{} {:.0}%", c.feature, c.similarity * 100.0))
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "       coverage {:.0}%  top: {}",
                breakdown.coverage() * 100.0,
                display_name(&top, "-")
            );
        }
    }
}

fn display_name<'a>(name: &'a str, fallback: &'a str) -> &'a str {
    if name.is_empty() { fallback } else { name }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

/// First value for `name`, given as `--name=value` or `--name value`.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    arg_values(args, name).into_iter().next()
}

fn arg_values(args: &[String], name: &str) -> Vec<String> {
    let prefix = format!("{name}=");
    let mut out = Vec::new();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                out.push(next.trim().to_string());
            }
        }
    }
    out
}

fn parse_f64_arg(args: &[String], name: &str) -> Result<Option<f64>> {
    arg_value(args, name)
        .map(|raw| {
            raw.parse::<f64>()
                .with_context(|| format!("{name} expects a number, got {raw}"))
        })
        .transpose()
}
