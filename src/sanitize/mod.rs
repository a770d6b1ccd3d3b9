//! Argument Validation
//!
//! Numeric guards shared by the variate generator and the topic models.
//! Invalid values are rejected, never clamped: a clamped shape or probability
//! would silently bias every later draw.

use crate::error::{BanditError, Result};
use crate::types::MAX_EXACT_COUNT;

/// Check whether a value is usable as a distribution parameter (finite and > 0)
pub fn is_positive_finite(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

/// Validate a Gamma shape parameter
pub fn validate_shape(shape: f64) -> Result<f64> {
    if is_positive_finite(shape) {
        Ok(shape)
    } else {
        Err(BanditError::InvalidShape { shape })
    }
}

/// Validate a pair of Beta parameters
pub fn validate_beta_params(alpha: f64, beta: f64) -> Result<(f64, f64)> {
    if is_positive_finite(alpha) && is_positive_finite(beta) {
        Ok((alpha, beta))
    } else {
        Err(BanditError::InvalidBetaParams { alpha, beta })
    }
}

/// Validate bulk-seeding counts, returning the total attempt count
pub fn validate_seed_counts(correct: u64, incorrect: u64) -> Result<u64> {
    let invalid = BanditError::InvalidSeedCounts { correct, incorrect };

    if correct > MAX_EXACT_COUNT || incorrect > MAX_EXACT_COUNT {
        return Err(invalid);
    }
    correct.checked_add(incorrect).ok_or(invalid)
}
