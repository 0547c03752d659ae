//! Errors
//!
//! Custom error types used throughout the `sapling` crate.
use thiserror::Error;

/// Errors that can occur when training or applying a decision tree.
#[derive(Debug, Error)]
pub enum SaplingError {
    /// The feature matrix and label vector disagree on the number of rows.
    #[error("Dimension mismatch: the feature matrix has {0} rows, but {1} labels were provided.")]
    DimensionMismatch(usize, usize),
    /// Nothing to fit or score.
    #[error("Empty input: at least one sample is required.")]
    EmptyData,
    /// Predict was called on a tree that has not been fit.
    #[error("The tree has not been fit, call fit before calling predict.")]
    NotFitted,
    /// Unable to write model to file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// Unable to read model from file.
    #[error("Unable to read model from a file {0}")]
    UnableToRead(String),
}
