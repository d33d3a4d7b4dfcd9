use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::ScoutError;
use crate::profile::Feature;
use crate::role::RoleCategory;

pub const WEIGHT_TABLE_VERSION: u32 = 1;

/// One row of the table: how much a feature counts and the raw-unit gap at
/// which two values stop looking alike at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeatureWeight {
    pub feature: Feature,
    pub weight: f64,
    pub max_difference: f64,
    /// Unit and reasoning behind `max_difference`. Ignored by scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FeatureWeight {
    pub fn new(feature: Feature, weight: f64, max_difference: f64) -> Self {
        Self {
            feature,
            weight,
            max_difference,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Per-role weights plus the universal rows every role shares.
///
/// Weights are not required to sum to one; the calculator divides by the
/// weight it actually used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightTable {
    pub version: u32,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub universal: Vec<FeatureWeight>,
    #[serde(default)]
    pub goalkeeper: Vec<FeatureWeight>,
    #[serde(default)]
    pub defender: Vec<FeatureWeight>,
    #[serde(default)]
    pub midfielder: Vec<FeatureWeight>,
    #[serde(default)]
    pub attacker: Vec<FeatureWeight>,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            version: WEIGHT_TABLE_VERSION,
            generated_at: None,
            source: None,
            universal: Vec::new(),
            goalkeeper: Vec::new(),
            defender: Vec::new(),
            midfielder: Vec::new(),
            attacker: Vec::new(),
        }
    }
}

impl WeightTable {
    pub fn role_entries(&self, role: RoleCategory) -> &[FeatureWeight] {
        match role {
            RoleCategory::Goalkeeper => &self.goalkeeper,
            RoleCategory::Defender => &self.defender,
            RoleCategory::Midfielder => &self.midfielder,
            RoleCategory::Attacker => &self.attacker,
        }
    }

    /// Universal rows followed by the role's own rows.
    pub fn entries(&self, role: RoleCategory) -> impl Iterator<Item = &FeatureWeight> + '_ {
        self.universal.iter().chain(self.role_entries(role).iter())
    }

    pub fn nominal_weight(&self, role: RoleCategory) -> f64 {
        self.entries(role).map(|w| w.weight).sum()
    }

    pub fn weight_of(&self, role: RoleCategory, feature: Feature) -> Option<&FeatureWeight> {
        self.entries(role).find(|w| w.feature == feature)
    }

    /// Reject rows that could push a score outside [0, 1] or double count a
    /// feature within one role.
    pub fn validate(&self) -> Result<(), ScoutError> {
        validate_rows("universal", &self.universal)?;
        for role in RoleCategory::ALL {
            let section = section_name(role);
            validate_rows(section, self.role_entries(role))?;
            let mut seen: HashSet<Feature> = self.universal.iter().map(|w| w.feature).collect();
            for row in self.role_entries(role) {
                if !seen.insert(row.feature) {
                    return Err(ScoutError::DuplicateFeatureWeight {
                        section,
                        feature: row.feature.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let table: WeightTable = serde_json::from_str(raw).context("parse weight table")?;
        table.validate().context("validate weight table")?;
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read weight table {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("load weight table {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("create weight table directory")?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).context("serialize weight table")?;
        fs::write(&tmp, json).context("write weight table")?;
        fs::rename(&tmp, path).context("swap weight table")?;
        Ok(())
    }
}

fn section_name(role: RoleCategory) -> &'static str {
    match role {
        RoleCategory::Goalkeeper => "goalkeeper",
        RoleCategory::Defender => "defender",
        RoleCategory::Midfielder => "midfielder",
        RoleCategory::Attacker => "attacker",
    }
}

fn validate_rows(section: &'static str, rows: &[FeatureWeight]) -> Result<(), ScoutError> {
    let mut seen = HashSet::new();
    for row in rows {
        let invalid = |reason: &str| ScoutError::InvalidWeight {
            section,
            feature: row.feature.to_string(),
            reason: reason.to_string(),
        };
        if !row.weight.is_finite() || row.weight <= 0.0 {
            return Err(invalid("weight must be finite and > 0"));
        }
        if !row.max_difference.is_finite() || row.max_difference <= 0.0 {
            return Err(invalid("maxDifference must be finite and > 0"));
        }
        if !seen.insert(row.feature) {
            return Err(ScoutError::DuplicateFeatureWeight {
                section,
                feature: row.feature.to_string(),
            });
        }
    }
    Ok(())
}

pub fn load_bundled_table() -> Result<WeightTable> {
    let raw = include_str!("../assets/default_weights.json");
    WeightTable::from_json(raw).context("bundled default_weights.json")
}

/// Shared, parsed copy of the bundled table.
pub fn bundled_table() -> Result<&'static WeightTable> {
    static TABLE: OnceCell<WeightTable> = OnceCell::new();
    TABLE.get_or_try_init(load_bundled_table)
}
