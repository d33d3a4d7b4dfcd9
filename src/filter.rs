use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ranker::RankedPlayer;

pub const DEFAULT_AGE_RANGE: (f64, f64) = (18.0, 40.0);
pub const DEFAULT_MARKET_VALUE_RANGE: (f64, f64) = (0.0, 150.0);

/// Post-ranking filter. Drops rows, never re-scores or reorders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultFilter {
    pub age_range: (f64, f64),
    /// Millions.
    pub market_value_range: (f64, f64),
    #[serde(default)]
    pub leagues: BTreeSet<String>,
    #[serde(default)]
    pub positions: BTreeSet<String>,
    /// Fraction in [0, 1].
    #[serde(default)]
    pub min_similarity: f64,
}

impl Default for ResultFilter {
    fn default() -> Self {
        Self {
            age_range: DEFAULT_AGE_RANGE,
            market_value_range: DEFAULT_MARKET_VALUE_RANGE,
            leagues: BTreeSet::new(),
            positions: BTreeSet::new(),
            min_similarity: 0.0,
        }
    }
}

impl ResultFilter {
    pub fn is_active(&self) -> bool {
        *self != ResultFilter::default()
    }

    pub fn matches(&self, row: &RankedPlayer<'_>) -> bool {
        let profile = row.profile;
        let identity = profile.identity();

        in_range(profile.age(), self.age_range, DEFAULT_AGE_RANGE)
            && in_range(
                identity.market_value,
                self.market_value_range,
                DEFAULT_MARKET_VALUE_RANGE,
            )
            && (self.leagues.is_empty() || self.leagues.contains(&identity.league))
            && (self.positions.is_empty() || self.positions.contains(profile.position_code()))
            && row.score >= self.min_similarity
    }

    pub fn apply<'a>(&self, rows: &[RankedPlayer<'a>]) -> Vec<RankedPlayer<'a>> {
        rows.iter().copied().filter(|row| self.matches(row)).collect()
    }
}

// An unknown value only survives a range the user has not narrowed.
fn in_range(value: Option<f64>, range: (f64, f64), default: (f64, f64)) -> bool {
    match value {
        Some(v) => v >= range.0 && v <= range.1,
        None => range == default,
    }
}
