//! Metrics
//!
//! Evaluation of predicted class labels against the ground truth.
use crate::errors::SaplingError;

/// Fraction of positions where the prediction matches the true label.
///
/// Returns a value in `[0, 1]`. Both slices must be non-empty and of equal
/// length.
pub fn accuracy_score(y_true: &[usize], y_pred: &[usize]) -> Result<f64, SaplingError> {
    if y_true.is_empty() {
        return Err(SaplingError::EmptyData);
    }
    if y_true.len() != y_pred.len() {
        return Err(SaplingError::DimensionMismatch(y_true.len(), y_pred.len()));
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}
