//! Error type shared by every stage of the search

use thiserror::Error;

/// Failure of a conditioning or search invocation.
///
/// Every variant is terminal for the call that produced it; nothing in the
/// crate retries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// A transform plan, series or time-frequency plane could not be built
    #[error("allocation failed: {0}")]
    Allocation(String),

    #[error("transform failed: {0}")]
    Transform(String),

    #[error("spectrum estimation failed: {0}")]
    SpectrumEstimation(String),

    #[error("whitening failed: {0}")]
    Whitening(String),

    #[error("channel filter construction failed: {0}")]
    FilterConstruction(String),

    #[error("excess power scoring failed: {0}")]
    Scoring(String),

    /// Conditioning failed before a search could start
    #[error("conditioning failed: {0}")]
    Conditioning(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
