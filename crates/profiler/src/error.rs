use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A population vector was built by a different derivation than the query.
    #[error("invalid vector: expected {expected} dimensions, got {actual}")]
    InvalidVector { expected: usize, actual: usize },

    #[error("non-finite value in {field}")]
    NonFinite { field: &'static str },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Reject NaN/inf before it lands in an output.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::NonFinite { field })
    }
}
