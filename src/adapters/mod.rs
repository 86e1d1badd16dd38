//! The `IndexAdapter` capability (spec §4.1, component C1): a uniform async
//! boundary over four heterogeneous retrieval backends. HMR-Core depends
//! only on this trait — no inheritance hierarchy, just a tagged [`Strategy`]
//! variant (spec §9, "Polymorphism over strategy backends").

mod static_adapter;

pub use static_adapter::StaticAdapter;

use std::time::Instant;

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::model::{Query, StrategyResult};

/// Uniform capability implemented by each of the four strategy backends.
///
/// Implementations own all backend-specific semantics (approximate nearest
/// neighbor search, BM25/FTS ranking, symbol lookup, graph traversal — spec
/// §4.1, "Per-strategy semantics"); HMR-Core never inspects a raw backend
/// score, only the returned order.
#[async_trait]
pub trait IndexAdapter: Send + Sync {
    /// Returns at most `k_s` chunk ids in descending relevance order, or an
    /// [`AdapterError`] if the backend could not answer before `deadline`.
    async fn retrieve(&self, query: &Query, k_s: usize, deadline: Instant) -> Result<StrategyResult, AdapterError>;

    /// Optional cache-priming hook; adapters without a warm cache may ignore it.
    async fn warmup(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}
