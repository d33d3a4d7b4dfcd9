use serde::Serialize;

use crate::profile::{Feature, PlayerProfile};
use crate::role::RoleCategory;
use crate::weights::{FeatureWeight, WeightTable};

/// Linear decay: identical values give 1, a gap of `max_difference` or more
/// gives 0.
pub fn feature_similarity(delta: f64, max_difference: f64) -> f64 {
    (1.0 - delta.abs() / max_difference).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gate {
    Passed,
    PositionMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureContribution {
    pub feature: Feature,
    pub target: f64,
    pub candidate: f64,
    pub similarity: f64,
    pub weight: f64,
}

impl FeatureContribution {
    pub fn weighted(&self) -> f64 {
        self.similarity * self.weight
    }
}

/// Everything that went into one pairwise score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub gate: Gate,
    pub role: RoleCategory,
    pub contributions: Vec<FeatureContribution>,
    pub used_weight: f64,
    pub nominal_weight: f64,
    pub score: f64,
}

impl ScoreBreakdown {
    /// Features that pulled the score up the most, strongest first.
    pub fn top_contributions(&self, n: usize) -> Vec<FeatureContribution> {
        let mut rows = self.contributions.clone();
        rows.sort_by(|a, b| {
            b.weighted()
                .total_cmp(&a.weighted())
                .then_with(|| a.feature.cmp(&b.feature))
        });
        rows.truncate(n);
        rows
    }

    /// Share of the role's nominal weight both profiles could be compared on.
    pub fn coverage(&self) -> f64 {
        if self.nominal_weight > 0.0 {
            self.used_weight / self.nominal_weight
        } else {
            0.0
        }
    }
}

/// Weighted-delta similarity in [0, 1].
///
/// Different position tokens never compare, and neither does a blank one.
/// Features missing on either side are left out of both the numerator and
/// the denominator.
pub fn score(target: &PlayerProfile, candidate: &PlayerProfile, table: &WeightTable) -> f64 {
    if !same_position(target, candidate) {
        return 0.0;
    }
    let (total, used) = accumulate(target, candidate, table.entries(target.role()), |_| {});
    finish(total, used)
}

/// Same computation as [`score`], keeping each feature's contribution.
pub fn explain(
    target: &PlayerProfile,
    candidate: &PlayerProfile,
    table: &WeightTable,
) -> ScoreBreakdown {
    let role = target.role();
    let nominal_weight = table.nominal_weight(role);
    if !same_position(target, candidate) {
        return ScoreBreakdown {
            gate: Gate::PositionMismatch,
            role,
            contributions: Vec::new(),
            used_weight: 0.0,
            nominal_weight,
            score: 0.0,
        };
    }

    let mut contributions = Vec::new();
    let (total, used) = accumulate(target, candidate, table.entries(role), |c| {
        contributions.push(c)
    });
    ScoreBreakdown {
        gate: Gate::Passed,
        role,
        contributions,
        used_weight: used,
        nominal_weight,
        score: finish(total, used),
    }
}

fn same_position(target: &PlayerProfile, candidate: &PlayerProfile) -> bool {
    !target.position_code().is_empty() && target.position_code() == candidate.position_code()
}

fn accumulate<'a>(
    target: &PlayerProfile,
    candidate: &PlayerProfile,
    rows: impl Iterator<Item = &'a FeatureWeight>,
    mut visit: impl FnMut(FeatureContribution),
) -> (f64, f64) {
    let mut total_similarity = 0.0;
    let mut total_weight = 0.0;
    for row in rows {
        let a = target.feature(row.feature);
        let b = candidate.feature(row.feature);
        let (Some(a), Some(b)) = (a, b) else {
            continue;
        };
        let similarity = feature_similarity(a - b, row.max_difference);
        total_similarity += similarity * row.weight;
        total_weight += row.weight;
        visit(FeatureContribution {
            feature: row.feature,
            target: a,
            candidate: b,
            similarity,
            weight: row.weight,
        });
    }
    (total_similarity, total_weight)
}

fn finish(total_similarity: f64, total_weight: f64) -> f64 {
    if total_weight > 0.0 {
        (total_similarity / total_weight).min(1.0)
    } else {
        0.0
    }
}
