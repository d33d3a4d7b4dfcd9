pub mod cohort;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod pool;
pub mod profile;
pub mod ranker;
pub mod role;
pub mod similarity;
pub mod weights;

pub use error::ScoutError;
pub use profile::{Feature, PlayerIdentity, PlayerProfile};
pub use ranker::{Ranker, SimilarityResult, SimilarityStrategy, rank, rank_standardized};
pub use role::{RoleCategory, classify};
pub use similarity::{ScoreBreakdown, explain, score};
pub use weights::{FeatureWeight, WeightTable, bundled_table};
