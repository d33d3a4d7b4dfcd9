use thiserror::Error;

/// Caller-facing failures of the scoring engine.
///
/// Missing features and unknown position codes are not errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoutError {
    #[error("target player {id} not found in candidate pool")]
    TargetNotFound { id: String },

    #[error("player id {id} appears more than once in the pool")]
    DuplicatePlayerId { id: String },

    #[error("unknown feature name: {0}")]
    UnknownFeature(String),

    #[error("unknown similarity strategy: {0}")]
    UnknownStrategy(String),

    #[error("invalid weight for {feature} in {section}: {reason}")]
    InvalidWeight {
        section: &'static str,
        feature: String,
        reason: String,
    },

    #[error("feature {feature} listed twice for {section}")]
    DuplicateFeatureWeight {
        section: &'static str,
        feature: String,
    },
}

impl ScoutError {
    pub fn is_target_not_found(&self) -> bool {
        matches!(self, ScoutError::TargetNotFound { .. })
    }
}
