//! Centralized validation and helper functions.

/// Maximum number of warnings of one kind kept with their details.
/// Counts stay exact past this; only the stored examples are capped.
pub const MAX_STORED_WARNINGS: usize = 1_000;

/// Cutoff validation error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
}

/// Validate a percentage in [0, 100]
///
/// # Errors
///
/// Returns `ValidationError::NotFinite` or `ValidationError::OutOfRange`.
pub fn validate_percent(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    validate_range(name, value, 0.0, 100.0)
}

/// Validate a fraction in [0, 1]
///
/// # Errors
///
/// Returns `ValidationError::NotFinite` or `ValidationError::OutOfRange`.
pub fn validate_fraction(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    validate_range(name, value, 0.0, 1.0)
}

/// Validate an e-value: non-negative, infinity allowed (no cutoff)
///
/// # Errors
///
/// Returns `ValidationError::NotFinite` for NaN or `ValidationError::Negative`.
pub fn validate_evalue(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_nan() {
        return Err(ValidationError::NotFinite { name, value });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { name, value });
    }
    Ok(value)
}

/// Validate a count that must be at least one
///
/// # Errors
///
/// Returns `ValidationError::Zero` when `value` is 0.
pub fn validate_nonzero(name: &'static str, value: usize) -> Result<usize, ValidationError> {
    if value == 0 {
        Err(ValidationError::Zero { name })
    } else {
        Ok(value)
    }
}

fn validate_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { name, value });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// Safely convert a count to f64 for ratio calculations
#[inline]
#[must_use]
pub fn count_to_f64(count: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_percent() {
        assert!(validate_percent("identity", 0.0).is_ok());
        assert!(validate_percent("identity", 100.0).is_ok());
        assert!(validate_percent("identity", 100.1).is_err());
        assert!(validate_percent("identity", -1.0).is_err());
        assert!(validate_percent("identity", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_fraction() {
        assert!(validate_fraction("overlap", 0.8).is_ok());
        let err = validate_fraction("overlap", 80.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "overlap must be between 0 and 1, got 80"
        );
    }

    #[test]
    fn test_validate_evalue() {
        assert!(validate_evalue("evalue", 1e-10).is_ok());
        assert!(validate_evalue("evalue", f64::INFINITY).is_ok());
        assert!(validate_evalue("evalue", -1e-10).is_err());
        assert!(validate_evalue("evalue", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_nonzero() {
        assert!(validate_nonzero("batch size", 1).is_ok());
        assert_eq!(
            validate_nonzero("batch size", 0),
            Err(ValidationError::Zero { name: "batch size" })
        );
    }
}
