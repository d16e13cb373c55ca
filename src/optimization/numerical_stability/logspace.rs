//! Log-domain arithmetic utilities.
//!
//! Provides safe implementations of the log-sum-exp family of operations
//! that are prone to overflow/underflow in naïve form. Probabilities are
//! carried as natural logarithms throughout the crate, with `-∞` standing
//! for exact zero; sums of probabilities therefore become log-sum-exp
//! reductions. The functions here use the standard max-shift strategy,
//!   `ln(Σ exp(xᵢ)) = m + ln(Σ exp(xᵢ − m))`, `m = max(xᵢ)`,
//! which keeps every intermediate `exp` in `[0, 1]` and so remains
//! well-conditioned for `f64` over arbitrarily long sequences.
//!
//! # Provided items
//! - [`LOG_ZERO`]: the canonical log-space zero (`f64::NEG_INFINITY`).
//! - [`log_sum_exp_pair(a, b)`]: stable `ln(exp(a) + exp(b))`.
//! - [`log_sum_exp(values)`]: stable `ln(Σ exp(values[i]))` over a slice.
//! - [`log_normalize(row)`]: in-place shift of a log-probability row so
//!   that it sums to one in probability space.

/// Canonical log-space representation of probability zero.
///
/// Using `-∞` (rather than a large negative sentinel) makes the identities
/// `log_sum_exp_pair(LOG_ZERO, x) == x` and `LOG_ZERO + x == LOG_ZERO`
/// exact, so unreachable states and forbidden transitions drop out of the
/// recurrences without any special-casing at the call sites.
pub const LOG_ZERO: f64 = f64::NEG_INFINITY;

/// Numerically stable `ln(exp(a) + exp(b))`.
///
/// Handles log-space zeros exactly: if either argument is `-∞` the other is
/// returned unchanged, and `log_sum_exp_pair(-∞, -∞) == -∞`. For finite
/// inputs the max-shift form guarantees no overflow and at most one
/// well-conditioned `exp` per call.
///
/// # Parameters
/// - `a`, `b`: log-domain addends (finite or `-∞`, never NaN).
///
/// # Returns
/// - `ln(exp(a) + exp(b))` as `f64`; never NaN for valid inputs.
pub fn log_sum_exp_pair(a: f64, b: f64) -> f64 {
    if a == LOG_ZERO {
        return b;
    }
    if b == LOG_ZERO {
        return a;
    }
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    hi + (lo - hi).exp().ln_1p()
}

/// Numerically stable `ln(Σ exp(values[i]))` over a slice.
///
/// Returns [`LOG_ZERO`] for an empty slice or a slice whose entries are all
/// `-∞` (an empty sum of probabilities). Finite entries are reduced with a
/// single max-shift pass, so the result is exact up to the usual `f64`
/// rounding regardless of the magnitude spread.
///
/// # Parameters
/// - `values`: log-domain addends (each finite or `-∞`, never NaN).
///
/// # Returns
/// - `ln(Σ exp(values[i]))` as `f64`; `LOG_ZERO` for empty or all-`-∞`
///   input, never NaN for valid inputs.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max_val = values.iter().copied().fold(LOG_ZERO, f64::max);
    if max_val == LOG_ZERO {
        return LOG_ZERO;
    }
    let shifted_sum: f64 = values.iter().map(|&v| (v - max_val).exp()).sum();
    max_val + shifted_sum.ln()
}

/// Shift a log-probability row in place so it sums to one in probability
/// space, returning the log-sum that was subtracted.
///
/// If the row's log-sum is `-∞` (every entry is a log-space zero) the row
/// is left untouched and `LOG_ZERO` is returned: a degenerate, unreachable
/// row carries no probability mass to distribute, and subtracting `-∞`
/// would poison it with NaN.
///
/// # Parameters
/// - `row`: mutable log-probability row.
///
/// # Returns
/// - The log-sum of the row *before* normalization (`LOG_ZERO` when the
///   row was degenerate and left as-is).
pub fn log_normalize(row: &mut [f64]) -> f64 {
    let norm = log_sum_exp(row);
    if norm != LOG_ZERO {
        for value in row.iter_mut() {
            *value -= norm;
        }
    }
    norm
}
