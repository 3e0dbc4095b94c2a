// src/error.rs
use std::fmt;

/// Custom error types for the qmc-options library
///
/// Boundary cases inside the integrators (a point landing on the edge of the
/// inverse-CDF domain) are *not* errors: they are defined zero-contribution
/// samples and are handled silently by the integrands.
#[derive(Debug, Clone)]
pub enum QmcError {
    /// Invalid parameter values
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid configuration
    InvalidConfiguration { field: String, reason: String },

    /// Vector or point-set shape does not match what the operation expects
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Numerical instability (non-finite estimates)
    NumericalInstability { method: String, reason: String },
}

impl fmt::Display for QmcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QmcError::InvalidParameters {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = {}: {}",
                    parameter, value, constraint
                )
            }
            QmcError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
            QmcError::DimensionMismatch {
                context,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Dimension mismatch in {}: expected {}, got {}",
                    context, expected, actual
                )
            }
            QmcError::NumericalInstability { method, reason } => {
                write!(f, "Numerical instability in {}: {}", method, reason)
            }
        }
    }
}

impl std::error::Error for QmcError {}

/// Result type alias for qmc-options operations
pub type QmcResult<T> = Result<T, QmcError>;

/// Validation utilities
pub mod validation {
    use super::{QmcError, QmcResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> QmcResult<()> {
        if value <= 0.0 {
            Err(QmcError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> QmcResult<()> {
        if value < 0.0 {
            Err(QmcError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is within a closed range (NaN rejected)
    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> QmcResult<()> {
        if !(value >= min && value <= max) {
            Err(QmcError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate a correlation parameter, excluding the degenerate endpoints
    ///
    /// The spread integrator divides by c22 = √(1-ρ²)·σ₂·√T, so ρ = ±1 is
    /// rejected here rather than producing infinities downstream.
    pub fn validate_correlation(name: &str, rho: f64) -> QmcResult<()> {
        if !(rho > -1.0 && rho < 1.0) {
            Err(QmcError::InvalidParameters {
                parameter: name.to_string(),
                value: rho,
                constraint: "must lie strictly inside (-1, 1)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> QmcResult<()> {
        if !value.is_finite() {
            Err(QmcError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("sigma", 0.2).is_ok());
        assert!(validate_positive("sigma", 0.0).is_err());
        assert!(validate_positive("sigma", -0.1).is_err());
    }

    #[test]
    fn test_validate_range_closed_endpoints_and_nan() {
        assert!(validate_range("rho", -1.0, -1.0, 1.0).is_ok());
        assert!(validate_range("rho", 1.0, -1.0, 1.0).is_ok());
        assert!(validate_range("rho", 1.1, -1.0, 1.0).is_err());
        assert!(validate_range("rho", f64::NAN, -1.0, 1.0).is_err());
    }

    #[test]
    fn test_validate_correlation() {
        assert!(validate_correlation("rho", 0.5).is_ok());
        assert!(validate_correlation("rho", -0.8).is_ok());
        assert!(validate_correlation("rho", 1.0).is_err());
        assert!(validate_correlation("rho", -1.0).is_err());
        assert!(validate_correlation("rho", 1.1).is_err());
        assert!(validate_correlation("rho", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("value", 1.0).is_ok());
        assert!(validate_finite("value", f64::NAN).is_err());
        assert!(validate_finite("value", f64::INFINITY).is_err());
        assert!(validate_finite("value", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_error_display() {
        let error = QmcError::InvalidParameters {
            parameter: "sigma".to_string(),
            value: -0.1,
            constraint: "must be positive".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("sigma"));
        assert!(display.contains("-0.1"));
        assert!(display.contains("positive"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let error = QmcError::DimensionMismatch {
            context: "gbm_exact normal vector".to_string(),
            expected: 12,
            actual: 10,
        };

        let display = format!("{}", error);
        assert!(display.contains("gbm_exact"));
        assert!(display.contains("12"));
        assert!(display.contains("10"));
    }
}
