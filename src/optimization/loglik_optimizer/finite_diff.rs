//! Robust finite-difference gradients with error capture.
//!
//! Finite-difference closures in `finitediff` must return a bare `f64`, so
//! objective failures cannot propagate through `?` from inside the FD
//! routine. The helpers here follow the capture pattern used by the
//! adapter: the objective closure writes its first error into a shared
//! [`RefCell`] slot and returns `NaN`; after the FD pass the captured error
//! is surfaced, and otherwise the resulting gradient is validated for
//! dimension and finiteness.
//!
//! Besides serving the adapter's fallback path, [`run_fd_diff`] is the
//! reference the CRF tests difference analytic gradients against.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Grad, Theta, validation::validate_grad},
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient of `func` at `theta`, with error capture.
///
/// This helper:
/// - clears `closure_err`,
/// - performs `forward_diff`,
/// - if an error was captured, returns it as `Err`,
/// - validates the resulting gradient (length and finiteness),
/// - if validation succeeds, returns the gradient as `Ok(grad)`.
///
/// # Parameters
/// - `theta`: point at which the gradient is approximated; its length
///   defines the expected gradient dimension.
/// - `func`: scalar objective closure. It is assumed to route any
///   evaluation errors into `closure_err` and return `NaN` in that case.
/// - `closure_err`: shared cell capturing an error raised inside `func`
///   while the finite-difference routine runs.
///
/// # Errors
/// Returns any error captured during evaluation of `func` inside the FD
/// routine, or a validation error for the resulting gradient
/// (`GradientDimMismatch` / `InvalidGradient`).
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    let dim = theta.len();
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}

/// Central-difference gradient of an infallible objective.
///
/// Convenience wrapper for tests that need a finite-difference reference
/// for an analytic gradient; no error capture is involved because the
/// objective cannot fail.
///
/// # Errors
/// Returns a validation error if the FD gradient has the wrong length or
/// non-finite entries.
pub fn central_diff_gradient<G: Fn(&Theta) -> f64>(theta: &Theta, func: &G) -> OptResult<Grad> {
    let fd_grad = theta.central_diff(func);
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}
