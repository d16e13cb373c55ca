//! Validation helpers for log-likelihood optimization.
//!
//! This module centralizes common consistency checks used across the
//! optimizer interface:
//!
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_cost`] ensure
//!   numeric tolerances are finite and strictly positive when provided.
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Weight estimates**: [`validate_theta_hat`] ensures a candidate
//!   `theta_hat` exists and contains only finite values.
//! - **Objective values**: [`validate_value`] checks log-likelihood outputs
//!   for finiteness.
//!
//! These helpers standardize error reporting by returning domain-specific
//! [`OptError`] variants, making higher-level code more uniform and easier
//! to debug.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta},
};

/// Validate the optional gradient-norm tolerance.
///
/// - Accepts `None` (no stopping rule on gradient).
/// - If `Some`, the value must be **finite** and **strictly positive**.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional cost-change tolerance (for convergence).
///
/// - Accepts `None` (no stopping rule on cost change).
/// - If `Some`, the value must be **finite** and **strictly positive**.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// Checks:
/// - `grad.len() == dim`
/// - every element is finite (`NaN` or `±∞` are rejected)
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value/reason of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated weight vector (`theta_hat`).
///
/// Accepts only a present vector with all **finite** entries.
///
/// # Returns
/// The owned `Theta` if valid.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Weight estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

/// Validate that a scalar log-likelihood value is finite.
///
/// Negative values are fine as long as they are finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Acceptance/rejection boundaries for tolerance validators.
    // - Dimension and finiteness enforcement in `validate_grad`.
    // - The value validator on finite and non-finite input.
    //
    // They intentionally DO NOT cover:
    // - `validate_theta_hat` (covered alongside `OptimOutcome` in traits).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that the tolerance validators accept `None` and positive
    // finite values, and reject zero, negative, and non-finite input.
    //
    // Given
    // -----
    // - Tolerances `None`, `1e-8`, `0.0`, `-2.0`, and `f64::INFINITY`.
    //
    // Expect
    // ------
    // - `Ok` for the first two; errors for the rest, on both validators.
    fn tolerance_validators_enforce_positive_finite_values() {
        for verify in [verify_tol_grad, verify_tol_cost] {
            assert!(verify(None).is_ok());
            assert!(verify(Some(1e-8)).is_ok());
            assert!(verify(Some(0.0)).is_err());
            assert!(verify(Some(-2.0)).is_err());
            assert!(verify(Some(f64::INFINITY)).is_err());
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify `validate_grad` flags the first non-finite entry and any
    // dimension mismatch.
    //
    // Given
    // -----
    // - A length-3 gradient checked against dim 2, and a gradient with a
    //   NaN in position 1 checked against its own length.
    //
    // Expect
    // ------
    // - `GradientDimMismatch` and `InvalidGradient { index: 1, .. }`.
    fn validate_grad_reports_dimension_and_finiteness() {
        let grad = array![1.0, 2.0, 3.0];
        assert!(matches!(
            validate_grad(&grad, 2),
            Err(OptError::GradientDimMismatch { expected: 2, found: 3 })
        ));

        let grad = array![1.0, f64::NAN, 3.0];
        match validate_grad(&grad, 3) {
            Err(OptError::InvalidGradient { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidGradient, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify `validate_value` accepts negative finite log-likelihoods and
    // rejects NaN and ±∞.
    //
    // Given
    // -----
    // - Values `-123.4`, `f64::NAN`, `f64::NEG_INFINITY`.
    //
    // Expect
    // ------
    // - `Ok` for the first; `NonFiniteCost` for the others.
    fn validate_value_accepts_finite_negatives_only() {
        assert!(validate_value(-123.4).is_ok());
        assert!(matches!(validate_value(f64::NAN), Err(OptError::NonFiniteCost { .. })));
        assert!(matches!(
            validate_value(f64::NEG_INFINITY),
            Err(OptError::NonFiniteCost { .. })
        ));
    }
}
