//! Error types for normalization and clustering.

use thiserror::Error;

/// Errors that can occur while building a dataset, normalizing it or clustering it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KMeansError {
    /// The dataset has no samples, or its samples have no dimensions.
    #[error("empty dataset: {sample_cnt} samples with {sample_dims} dimensions")]
    EmptyDataset {
        sample_cnt: usize,
        sample_dims: usize,
    },

    /// The sample buffer does not hold `sample_cnt * sample_dims` values.
    #[error("sample buffer has {actual} values, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A row of a nested dataset has a different length than the first row.
    #[error("row {row} has {actual} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A dimension is constant over all samples, min-max normalization is undefined.
    #[error("dimension {dimension} is constant ({value}) across all samples")]
    DegenerateDimension { dimension: usize, value: f64 },

    /// The requested amount of clusters is `0` or larger than the amount of samples.
    #[error("invalid cluster count {k} for {sample_cnt} samples (expected 1..={sample_cnt})")]
    InvalidClusterCount { k: usize, sample_cnt: usize },

    /// Precomputed centroids do not hold `k * sample_dims` values.
    #[error("precomputed centroids have {actual} values, expected {expected}")]
    InvalidCentroids { expected: usize, actual: usize },

    /// The iteration cap was hit before the assignments reached a fixed point.
    #[error("no fixed point reached after {iterations} iterations")]
    DidNotConverge { iterations: usize },
}

/// Convenient alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, KMeansError>;
