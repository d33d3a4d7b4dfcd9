use std::collections::BTreeSet;

use crate::profile::{Feature, PlayerProfile};
use crate::role::CohortBucket;

const STD_EPSILON: f64 = 1e-9;
const NORM_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureDistribution {
    pub feature: Feature,
    pub mean: f64,
    pub std: f64,
}

impl FeatureDistribution {
    pub fn zscore(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

/// Population statistics of one cohort, one entry per feature that at least
/// one member has recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortStats {
    pub bucket: CohortBucket,
    pub members: usize,
    pub distributions: Vec<FeatureDistribution>,
}

impl CohortStats {
    pub fn from_members<'a>(
        bucket: CohortBucket,
        members: impl IntoIterator<Item = &'a PlayerProfile>,
    ) -> Self {
        let members: Vec<&PlayerProfile> = members.into_iter().collect();
        let features: BTreeSet<Feature> = members
            .iter()
            .flat_map(|p| p.features().keys().copied())
            .collect();

        let distributions = features
            .into_iter()
            .map(|feature| dist_for_feature(&members, feature))
            .collect();

        Self {
            bucket,
            members: members.len(),
            distributions,
        }
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.distributions.iter().map(|d| d.feature)
    }

    /// z-score vector in `distributions` order. A missing value becomes 0,
    /// i.e. "at the cohort mean".
    pub fn vectorize(&self, profile: &PlayerProfile) -> Vec<f64> {
        self.distributions
            .iter()
            .map(|d| profile.feature(d.feature).map(|v| d.zscore(v)).unwrap_or(0.0))
            .collect()
    }
}

fn dist_for_feature(members: &[&PlayerProfile], feature: Feature) -> FeatureDistribution {
    let values: Vec<f64> = members.iter().filter_map(|p| p.feature(feature)).collect();
    let n = values.len().max(1) as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = var.sqrt();
    FeatureDistribution {
        feature,
        mean,
        std: if std <= STD_EPSILON { 1.0 } else { std },
    }
}

/// Cosine of the angle between two vectors; 0 when either is (near) zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a < NORM_EPSILON || norm_b < NORM_EPSILON {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Map a cosine in [-1, 1] onto [0, 1].
pub fn rescale_cosine(cos: f64) -> f64 {
    ((cos + 1.0) / 2.0).clamp(0.0, 1.0)
}
