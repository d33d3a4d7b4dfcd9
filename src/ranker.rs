use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cohort::{CohortStats, cosine_similarity, rescale_cosine};
use crate::error::ScoutError;
use crate::profile::PlayerProfile;
use crate::similarity;
use crate::weights::WeightTable;

pub const DEFAULT_PARALLEL_MIN_POOL: usize = 256;

/// Which similarity model a ranking runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityStrategy {
    /// Fixed per-feature spreads, exact position-token gate.
    #[default]
    WeightedDelta,
    /// Cohort z-scores compared by cosine, goalkeeper/outfield gate.
    StandardizedCosine,
}

impl SimilarityStrategy {
    pub fn label(self) -> &'static str {
        match self {
            SimilarityStrategy::WeightedDelta => "weighted",
            SimilarityStrategy::StandardizedCosine => "cosine",
        }
    }
}

impl fmt::Display for SimilarityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SimilarityStrategy {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted" | "weighted_delta" | "delta" => Ok(SimilarityStrategy::WeightedDelta),
            "cosine" | "standardized" | "standardized_cosine" | "zscore" => {
                Ok(SimilarityStrategy::StandardizedCosine)
            }
            other => Err(ScoutError::UnknownStrategy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResult {
    pub candidate_id: String,
    pub score: f64,
}

/// A result joined back to the profile it refers to.
#[derive(Debug, Clone, Copy)]
pub struct RankedPlayer<'a> {
    pub profile: &'a PlayerProfile,
    pub score: f64,
}

/// Scores a pool against one target and orders the outcome.
///
/// Holds no state between calls; the pool is passed in every time.
#[derive(Debug, Clone, Copy)]
pub struct Ranker<'t> {
    table: &'t WeightTable,
    strategy: SimilarityStrategy,
    parallel_min_pool: usize,
}

impl<'t> Ranker<'t> {
    pub fn new(table: &'t WeightTable) -> Self {
        Self {
            table,
            strategy: SimilarityStrategy::default(),
            parallel_min_pool: DEFAULT_PARALLEL_MIN_POOL,
        }
    }

    pub fn with_strategy(mut self, strategy: SimilarityStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Pools at least this large are scored on the rayon pool.
    pub fn with_parallel_min_pool(mut self, min_pool: usize) -> Self {
        self.parallel_min_pool = min_pool;
        self
    }

    pub fn strategy(&self) -> SimilarityStrategy {
        self.strategy
    }

    /// Rank every other pool member by similarity to `target`.
    ///
    /// Ordered by score descending, ties by candidate id ascending. `limit`
    /// keeps only the first entries.
    pub fn rank(
        &self,
        target: &PlayerProfile,
        pool: &[PlayerProfile],
        limit: Option<usize>,
    ) -> Result<Vec<SimilarityResult>, ScoutError> {
        check_pool(target, pool)?;
        let started = Instant::now();

        let mut results = match self.strategy {
            SimilarityStrategy::WeightedDelta => self.rank_weighted(target, pool),
            SimilarityStrategy::StandardizedCosine => self.rank_standardized(target, pool),
        };
        sort_results(&mut results);
        if let Some(limit) = limit {
            results.truncate(limit);
        }

        debug!(
            target = target.id(),
            strategy = %self.strategy,
            pool = pool.len(),
            returned = results.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "ranked candidate pool"
        );
        Ok(results)
    }

    fn rank_weighted(
        &self,
        target: &PlayerProfile,
        pool: &[PlayerProfile],
    ) -> Vec<SimilarityResult> {
        let table = self.table;
        let score_one = |candidate: &PlayerProfile| SimilarityResult {
            candidate_id: candidate.id().to_string(),
            score: similarity::score(target, candidate, table),
        };
        if pool.len() >= self.parallel_min_pool {
            pool.par_iter()
                .filter(|c| c.id() != target.id())
                .map(score_one)
                .collect()
        } else {
            pool.iter()
                .filter(|c| c.id() != target.id())
                .map(score_one)
                .collect()
        }
    }

    fn rank_standardized(
        &self,
        target: &PlayerProfile,
        pool: &[PlayerProfile],
    ) -> Vec<SimilarityResult> {
        let bucket = target.role().cohort_bucket();
        let cohort: Vec<&PlayerProfile> = pool
            .iter()
            .filter(|p| p.role().cohort_bucket() == bucket)
            .collect();
        let stats = CohortStats::from_members(bucket, cohort.iter().copied());
        debug!(
            bucket = ?stats.bucket,
            members = stats.members,
            features = stats.distributions.len(),
            "built cohort statistics"
        );
        let target_vec = stats.vectorize(target);

        let score_one = |candidate: &&PlayerProfile| SimilarityResult {
            candidate_id: candidate.id().to_string(),
            score: rescale_cosine(cosine_similarity(&target_vec, &stats.vectorize(candidate))),
        };
        if cohort.len() >= self.parallel_min_pool {
            cohort
                .par_iter()
                .filter(|c| c.id() != target.id())
                .map(score_one)
                .collect()
        } else {
            cohort
                .iter()
                .filter(|c| c.id() != target.id())
                .map(score_one)
                .collect()
        }
    }
}

/// Weighted-delta ranking with the given table.
pub fn rank(
    target: &PlayerProfile,
    pool: &[PlayerProfile],
    table: &WeightTable,
    limit: Option<usize>,
) -> Result<Vec<SimilarityResult>, ScoutError> {
    Ranker::new(table).rank(target, pool, limit)
}

/// Standardized-cosine ranking; needs no weight table.
pub fn rank_standardized(
    target: &PlayerProfile,
    pool: &[PlayerProfile],
    limit: Option<usize>,
) -> Result<Vec<SimilarityResult>, ScoutError> {
    let empty = WeightTable::default();
    Ranker::new(&empty)
        .with_strategy(SimilarityStrategy::StandardizedCosine)
        .rank(target, pool, limit)
}

/// Attach each result to its profile, keeping the ranking order. Results
/// whose id is no longer in `pool` are dropped.
pub fn join_profiles<'a>(
    results: &[SimilarityResult],
    pool: &'a [PlayerProfile],
) -> Vec<RankedPlayer<'a>> {
    let by_id: HashMap<&str, &PlayerProfile> = pool.iter().map(|p| (p.id(), p)).collect();
    results
        .iter()
        .filter_map(|r| {
            by_id.get(r.candidate_id.as_str()).copied().map(|profile| RankedPlayer {
                profile,
                score: r.score,
            })
        })
        .collect()
}

fn check_pool(target: &PlayerProfile, pool: &[PlayerProfile]) -> Result<(), ScoutError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(pool.len());
    let mut found = false;
    for p in pool {
        if !seen.insert(p.id()) {
            return Err(ScoutError::DuplicatePlayerId {
                id: p.id().to_string(),
            });
        }
        found |= p.id() == target.id();
    }
    if found {
        Ok(())
    } else {
        Err(ScoutError::TargetNotFound {
            id: target.id().to_string(),
        })
    }
}

fn sort_results(results: &mut [SimilarityResult]) {
    results.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.candidate_id.cmp(&b.candidate_id),
        other => other,
    });
}
