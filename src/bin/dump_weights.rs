use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use scout_similarity::config::ScoutConfig;
use scout_similarity::logging::init_tracing;
use scout_similarity::RoleCategory;

/// Write the active weight table (bundled or SCOUT_WEIGHTS_PATH) as JSON,
/// stamped with the export time. Prints to stdout unless `--out` is given.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let cfg = ScoutConfig::from_env();
    let mut table = cfg.load_weight_table()?;
    table.generated_at = Some(chrono::Utc::now().to_rfc3339());

    for role in RoleCategory::ALL {
        info!(
            role = role.label(),
            rows = table.entries(role).count(),
            nominal_weight = table.nominal_weight(role),
            "weight budget"
        );
    }

    match parse_out_arg() {
        Some(path) => {
            table.save(&path)?;
            info!(path = %path.display(), "wrote weight table");
        }
        None => {
            let json = serde_json::to_string_pretty(&table).context("serialize weight table")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn parse_out_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--out=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--out" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
