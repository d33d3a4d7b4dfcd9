use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::error::ScoutError;
use crate::profile::{PlayerProfile, ProfileRecord};

/// Parse a JSON array of profile records into an engine-ready pool.
///
/// Rows without an id are skipped; a repeated id fails the whole load.
pub fn parse_pool_json(raw: &str) -> Result<Vec<PlayerProfile>> {
    let records: Vec<ProfileRecord> = serde_json::from_str(raw).context("parse player pool")?;
    let total = records.len();

    let mut seen: HashSet<String> = HashSet::with_capacity(total);
    let mut pool = Vec::with_capacity(total);
    for (idx, record) in records.into_iter().enumerate() {
        if record.id.trim().is_empty() {
            warn!(row = idx, name = %record.identity.name, "skipping pool row without id");
            continue;
        }
        if !seen.insert(record.id.clone()) {
            return Err(ScoutError::DuplicatePlayerId { id: record.id }.into());
        }
        pool.push(PlayerProfile::from(record));
    }
    Ok(pool)
}

pub fn load_pool(path: &Path) -> Result<Vec<PlayerProfile>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read player pool {}", path.display()))?;
    let pool = parse_pool_json(&raw)
        .with_context(|| format!("load player pool {}", path.display()))?;
    info!(path = %path.display(), players = pool.len(), "loaded player pool");
    Ok(pool)
}

pub fn find_by_id<'a>(pool: &'a [PlayerProfile], id: &str) -> Option<&'a PlayerProfile> {
    pool.iter().find(|p| p.id() == id)
}

/// Case-insensitive exact name match; the first hit in pool order wins.
pub fn find_by_name<'a>(pool: &'a [PlayerProfile], name: &str) -> Option<&'a PlayerProfile> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    pool.iter().find(|p| p.name().trim().to_lowercase() == needle)
}
