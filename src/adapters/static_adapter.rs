//! A deterministic, in-memory [`IndexAdapter`] used in tests to stand in for
//! a real backend without needing a persistence layer (index construction
//! and storage are external collaborators — spec §1, "Out of scope").

use std::time::Instant;

use async_trait::async_trait;

use super::IndexAdapter;
use crate::error::AdapterError;
use crate::model::{ChunkId, Query, StrategyResult};

/// The canned outcome a [`StaticAdapter`] returns regardless of query text.
#[derive(Debug, Clone)]
enum Outcome {
    Ordered(Vec<ChunkId>),
    Timeout,
    Unavailable(String),
}

/// Always returns a fixed ordering (or a fixed failure), ignoring query text
/// and deadline. Used to drive the scenarios in spec §8 deterministically.
#[derive(Debug, Clone)]
pub struct StaticAdapter {
    outcome: Outcome,
}

impl StaticAdapter {
    /// An adapter that returns `ids` in order, truncated to `k_s` at retrieve time.
    pub fn ordered<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ChunkId>,
    {
        Self {
            outcome: Outcome::Ordered(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// An adapter that always reports `StrategyTimeout`.
    pub fn timeout() -> Self {
        Self { outcome: Outcome::Timeout }
    }

    /// An adapter that always reports `StrategyUnavailable`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self { outcome: Outcome::Unavailable(reason.into()) }
    }
}

#[async_trait]
impl IndexAdapter for StaticAdapter {
    async fn retrieve(&self, _query: &Query, k_s: usize, _deadline: Instant) -> Result<StrategyResult, AdapterError> {
        match &self.outcome {
            Outcome::Ordered(ids) => Ok(StrategyResult::new(ids.iter().take(k_s).cloned().collect())),
            Outcome::Timeout => Err(AdapterError::Timeout),
            Outcome::Unavailable(reason) => Err(AdapterError::Unavailable(reason.clone())),
        }
    }
}
