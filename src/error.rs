use thiserror::Error;

/// Errors surfaced to the caller of [`crate::coordinator::Coordinator`].
///
/// Individual strategy failures (timeouts, backend unavailability) are
/// recovered internally by the coordinator and never reach this type unless
/// every strategy fails at once (see [`HmrError::AllStrategiesFailed`]).
#[derive(Error, Debug)]
pub enum HmrError {
    /// Empty query text, an unsupported filter, or `k_override > 200`.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The engine's concurrency ceiling was exceeded; caller should retry later.
    #[error("overloaded: concurrency ceiling exceeded")]
    Overloaded,

    /// Every one of the four strategies returned `TIMEOUT` or `FAILED`.
    #[error("all strategies failed for this query")]
    AllStrategiesFailed,

    /// An internal invariant (I-1..I-6) was violated; indicates a bug.
    #[error("internal invariant violation: {0}")]
    InternalError(String),
}

/// Errors an [`crate::adapters::IndexAdapter`] may return from `retrieve`.
///
/// These never escape the coordinator as an [`HmrError`] on their own; they
/// are folded into a per-strategy status and the affected strategy simply
/// contributes an empty result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("strategy timed out")]
    Timeout,
    #[error("strategy backend unavailable: {0}")]
    Unavailable(String),
    #[error("invalid query for strategy: {0}")]
    InvalidQuery(String),
}

/// Convenient Result type using [`HmrError`].
pub type Result<T> = std::result::Result<T, HmrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HmrError::InvalidQuery("empty text".to_string());
        assert!(err.to_string().contains("invalid query"));
        assert!(err.to_string().contains("empty text"));
    }

    #[test]
    fn test_adapter_error_display() {
        let err = AdapterError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("unavailable"));
    }
}
