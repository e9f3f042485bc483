//! Aggregator error type.

/// Errors surfaced by the aggregator's control API.
///
/// The check path itself never fails; these cover operator calls only.
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("service '{0}' is not registered")]
    UnknownService(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
