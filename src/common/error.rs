//! Error types for reeds_shepp

use thiserror::Error;

/// Main error type for the Reeds-Shepp engine
///
/// Per-pair "no solution" outcomes are never errors; they are reported as
/// sentinel values in the output. Errors are reserved for caller contract
/// violations detected at a public boundary.
#[derive(Debug, Error)]
pub enum ReedsSheppError {
    /// Invalid parameter (turning radius, cost weight, segment code, ...)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Array or buffer sizes do not agree
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
    /// A single-query plan found no path under the enabled words
    #[error("Planning error: {0}")]
    PlanningError(String),
    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// Visualization error
    #[error("Visualization error: {0}")]
    VisualizationError(String),
}

/// Result type alias for Reeds-Shepp operations
pub type ReedsSheppResult<T> = Result<T, ReedsSheppError>;

/// Fails with `InvalidParameter` unless `value` is finite and strictly positive.
pub(crate) fn ensure_positive(name: &str, value: f64) -> ReedsSheppResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ReedsSheppError::InvalidParameter(format!(
            "{} must be finite and > 0, got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReedsSheppError::PlanningError("no enabled word solves the query".to_string());
        assert_eq!(format!("{}", err), "Planning error: no enabled word solves the query");
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("turning_radius", 2.5).is_ok());
        assert!(matches!(
            ensure_positive("turning_radius", 0.0),
            Err(ReedsSheppError::InvalidParameter(_))
        ));
        assert!(ensure_positive("reverse_cost", -1.0).is_err());
        assert!(ensure_positive("reverse_cost", f64::NAN).is_err());
        assert!(ensure_positive("reverse_cost", f64::INFINITY).is_err());
    }
}
