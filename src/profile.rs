use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScoutError;
use crate::role::{RoleCategory, classify, normalize_position_code};

/// Closed set of statistics the engine knows how to compare.
///
/// Anything an import produces outside this list never reaches scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Age,
    Minutes,
    NinetiesPlayed,
    Goals,
    Assists,
    #[serde(rename = "xG")]
    Xg,
    #[serde(rename = "npxG")]
    Npxg,
    #[serde(rename = "xAG")]
    Xag,
    Shots,
    ShotsOnTarget,
    ShotAccuracy,
    ShotsPer90,
    PassesAttempted,
    PassesCompleted,
    PassAccuracy,
    ProgressivePasses,
    ProgressiveCarries,
    ProgressiveReceptions,
    ProgressivePassDistance,
    TotalPassDistance,
    Tackles,
    TacklesWon,
    Interceptions,
    Blocks,
    Clearances,
    Saves,
    SavePercentage,
    CleanSheets,
    GoalsAgainst,
}

impl Feature {
    pub const ALL: [Feature; 29] = [
        Feature::Age,
        Feature::Minutes,
        Feature::NinetiesPlayed,
        Feature::Goals,
        Feature::Assists,
        Feature::Xg,
        Feature::Npxg,
        Feature::Xag,
        Feature::Shots,
        Feature::ShotsOnTarget,
        Feature::ShotAccuracy,
        Feature::ShotsPer90,
        Feature::PassesAttempted,
        Feature::PassesCompleted,
        Feature::PassAccuracy,
        Feature::ProgressivePasses,
        Feature::ProgressiveCarries,
        Feature::ProgressiveReceptions,
        Feature::ProgressivePassDistance,
        Feature::TotalPassDistance,
        Feature::Tackles,
        Feature::TacklesWon,
        Feature::Interceptions,
        Feature::Blocks,
        Feature::Clearances,
        Feature::Saves,
        Feature::SavePercentage,
        Feature::CleanSheets,
        Feature::GoalsAgainst,
    ];

    /// Canonical name, identical to the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Age => "age",
            Feature::Minutes => "minutes",
            Feature::NinetiesPlayed => "ninetiesPlayed",
            Feature::Goals => "goals",
            Feature::Assists => "assists",
            Feature::Xg => "xG",
            Feature::Npxg => "npxG",
            Feature::Xag => "xAG",
            Feature::Shots => "shots",
            Feature::ShotsOnTarget => "shotsOnTarget",
            Feature::ShotAccuracy => "shotAccuracy",
            Feature::ShotsPer90 => "shotsPer90",
            Feature::PassesAttempted => "passesAttempted",
            Feature::PassesCompleted => "passesCompleted",
            Feature::PassAccuracy => "passAccuracy",
            Feature::ProgressivePasses => "progressivePasses",
            Feature::ProgressiveCarries => "progressiveCarries",
            Feature::ProgressiveReceptions => "progressiveReceptions",
            Feature::ProgressivePassDistance => "progressivePassDistance",
            Feature::TotalPassDistance => "totalPassDistance",
            Feature::Tackles => "tackles",
            Feature::TacklesWon => "tacklesWon",
            Feature::Interceptions => "interceptions",
            Feature::Blocks => "blocks",
            Feature::Clearances => "clearances",
            Feature::Saves => "saves",
            Feature::SavePercentage => "savePercentage",
            Feature::CleanSheets => "cleanSheets",
            Feature::GoalsAgainst => "goalsAgainst",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ScoutError::UnknownFeature(needle.to_string()))
    }
}

/// Display-only identity carried alongside the statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIdentity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub club: String,
    #[serde(default)]
    pub league: String,
    /// Millions, as the import produced it.
    #[serde(default)]
    pub market_value: Option<f64>,
}

/// Sparse statistical profile of one player.
///
/// Absent features are simply missing from the map; a stored value is always
/// finite. The role is derived once from the position code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProfileRecord", into = "ProfileRecord")]
pub struct PlayerProfile {
    id: String,
    position_code: String,
    role: RoleCategory,
    features: BTreeMap<Feature, f64>,
    identity: PlayerIdentity,
}

impl PlayerProfile {
    pub fn new(id: impl Into<String>, position_code: &str) -> Self {
        let position_code = position_code.trim().to_ascii_uppercase();
        let role = classify(&position_code);
        Self {
            id: id.into(),
            position_code,
            role,
            features: BTreeMap::new(),
            identity: PlayerIdentity::default(),
        }
    }

    pub fn with_feature(mut self, feature: Feature, value: f64) -> Self {
        self.set_feature(feature, Some(value));
        self
    }

    pub fn with_identity(mut self, identity: PlayerIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.identity.name = name.into();
        self
    }

    /// `None` and non-finite values both mean "not recorded".
    fn set_feature(&mut self, feature: Feature, value: Option<f64>) {
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                self.features.insert(feature, v);
            }
            None => {
                self.features.remove(&feature);
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position_code(&self) -> &str {
        &self.position_code
    }

    pub fn role(&self) -> RoleCategory {
        self.role
    }

    pub fn feature(&self, feature: Feature) -> Option<f64> {
        self.features.get(&feature).copied()
    }

    pub fn features(&self) -> &BTreeMap<Feature, f64> {
        &self.features
    }

    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn age(&self) -> Option<f64> {
        self.feature(Feature::Age)
    }
}

/// Wire shape of a profile as the ingestion side hands it over.
///
/// `age` may come either top-level or inside `features`; the feature map
/// wins when both are present. `null` feature values count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "positionCode")]
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(flatten)]
    pub identity: PlayerIdentity,
    #[serde(default)]
    pub features: BTreeMap<Feature, Option<f64>>,
}

impl From<ProfileRecord> for PlayerProfile {
    fn from(record: ProfileRecord) -> Self {
        let code = normalize_position_code(&record.position);
        let mut profile = PlayerProfile::new(record.id, &code).with_identity(record.identity);
        if let Some(age) = record.age {
            profile.set_feature(Feature::Age, Some(age));
        }
        for (feature, value) in record.features {
            if value.is_some() || feature != Feature::Age {
                profile.set_feature(feature, value);
            }
        }
        profile
    }
}

impl From<PlayerProfile> for ProfileRecord {
    fn from(profile: PlayerProfile) -> Self {
        ProfileRecord {
            age: profile.age(),
            id: profile.id,
            position: profile.position_code,
            identity: profile.identity,
            features: profile
                .features
                .into_iter()
                .filter(|(f, _)| *f != Feature::Age)
                .map(|(f, v)| (f, Some(v)))
                .collect(),
        }
    }
}
