use thiserror::Error;

/// Rejected engine parameters. Runtime outcomes such as an empty query or a
/// cache miss are values, not errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("cache capacity must be at least 1")]
    ZeroCapacity,
    #[error("damping factor must lie strictly between 0 and 1, got {0}")]
    InvalidDamping(f64),
    #[error("convergence threshold must be a finite non-negative number, got {0}")]
    InvalidThreshold(f64),
    #[error("top-k must be at least 1")]
    ZeroTopK,
}
