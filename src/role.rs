use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleCategory {
    Goalkeeper,
    Defender,
    Midfielder,
    Attacker,
}

impl RoleCategory {
    pub const ALL: [RoleCategory; 4] = [
        RoleCategory::Goalkeeper,
        RoleCategory::Defender,
        RoleCategory::Midfielder,
        RoleCategory::Attacker,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RoleCategory::Goalkeeper => "Goalkeeper",
            RoleCategory::Defender => "Defender",
            RoleCategory::Midfielder => "Midfielder",
            RoleCategory::Attacker => "Attacker",
        }
    }

    /// Broad bucket used by the standardized-cosine model: keepers are only
    /// ever compared with keepers, every outfield role shares one cohort.
    pub fn cohort_bucket(self) -> CohortBucket {
        match self {
            RoleCategory::Goalkeeper => CohortBucket::Goalkeepers,
            _ => CohortBucket::Outfield,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CohortBucket {
    Goalkeepers,
    Outfield,
}

/// Map a position token to its coarse role.
///
/// Unknown tokens fall back to `Midfielder`; that is a data-quality signal,
/// not an error.
pub fn classify(position_code: &str) -> RoleCategory {
    let code = position_code.trim().to_ascii_uppercase();
    match code.as_str() {
        "GK" => RoleCategory::Goalkeeper,
        "CB" | "LB" | "RB" | "WB" => RoleCategory::Defender,
        "CDM" | "CM" | "CAM" | "LM" | "RM" => RoleCategory::Midfielder,
        "LW" | "RW" | "ST" | "CF" => RoleCategory::Attacker,
        _ => {
            warn!(position_code = %code, "unrecognized position code, defaulting to midfielder");
            RoleCategory::Midfielder
        }
    }
}

/// Turn a raw export position ("DF,MF", " fw ", "LWB") into a position code.
///
/// Compound positions keep their first token. Export group codes and
/// wing-back spellings map onto a concrete slot; any other token is kept as
/// written, uppercased, so it only ever matches itself. A blank position
/// stays blank.
pub fn normalize_position_code(raw: &str) -> String {
    let upper = raw.trim().to_ascii_uppercase();
    let first = upper
        .split([',', '/', ' '])
        .find(|part| !part.is_empty())
        .unwrap_or("");

    let mapped = match first {
        "DF" => "CB",
        "LWB" | "RWB" | "FB" => "WB",
        "DM" => "CDM",
        "MF" => "CM",
        "AM" => "CAM",
        "FW" => "ST",
        other => other,
    };
    mapped.to_string()
}
