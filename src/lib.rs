pub mod adapters;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod features;
pub mod fusion;
pub mod intent;
pub mod model;
pub mod weights;

pub use adapters::IndexAdapter;
pub use config::ScoringConfig;
pub use coordinator::{Coordinator, Diagnostics, QueryOutcome};
pub use error::{HmrError, Result};
pub use features::ChunkMetaProvider;
pub use intent::{IntentClassifier, RuleBasedClassifier};
pub use model::{ChunkId, FusedHit, Intent, Query, Strategy};
