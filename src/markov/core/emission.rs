//! Emission-distribution plugin interface and the two stock families.
//!
//! Purpose
//! -------
//! Define the narrow contract through which the training core consumes
//! per-state observation distributions — evaluate a log-probability, refit
//! against weighted samples — and provide the two distributions the crate
//! ships with: a categorical distribution over a finite symbol alphabet
//! ([`DiscreteEmission`]) and a univariate normal ([`GaussianEmission`]).
//!
//! Key behaviors
//! -------------
//! - [`EmissionModel::log_probability`] returns a finite value or `-∞`,
//!   **never NaN**, for any observation; out-of-support observations carry
//!   zero probability rather than failing.
//! - [`EmissionModel::fit`] re-estimates parameters to maximize weighted
//!   log-likelihood and must accept zero-length or all-zero-weight input
//!   gracefully: the distribution is left unchanged (a defined no-op), not
//!   crashed on.
//! - [`FitOptions`] is validated at construction: non-negative smoothing
//!   pseudocount, strictly positive variance floor.
//!
//! Invariants & assumptions
//! ------------------------
//! - Weights passed to `fit` are finite and non-negative; the
//!   re-estimation layer clamps degenerate posterior weights to zero
//!   before they reach this interface.
//! - `DiscreteEmission` keeps `Σ exp(log_probs) = 1` after every
//!   successful fit; symbols never observed get `-∞` (or the smoothed
//!   mass when a pseudocount is configured).
//! - `GaussianEmission` keeps `variance ≥ variance_floor` after every
//!   successful fit, so its density is always evaluable.
//!
//! Conventions
//! -----------
//! - Discrete observations are `usize` symbols in `0..n_symbols`.
//! - The Gaussian density is evaluated through `statrs`; the cached
//!   distribution object is rebuilt once per refit, never per evaluation.
//!
//! Downstream usage
//! ----------------
//! - The trellis layer calls `log_probability` inside the forward/backward
//!   recurrences; the re-estimation layer calls `fit` with pooled samples
//!   and posterior-derived weights.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the no-op fallback, weighted refits against
//!   hand-computed parameters, the smoothing option, and the NaN-freedom
//!   of `log_probability` across the support boundary.
use crate::markov::errors::{EmissionError, EmissionResult};
use crate::optimization::numerical_stability::logspace::LOG_ZERO;
use ndarray::Array1;
use statrs::distribution::{Continuous, Normal};

/// Options controlling emission re-estimation.
///
/// Fields:
/// - `smoothing`: additive pseudocount applied to discrete symbol counts
///   before normalization (0 disables smoothing; unobserved symbols then
///   get probability zero).
/// - `variance_floor`: lower clamp for the fitted Gaussian variance,
///   preventing a state that captures a single sample from collapsing to a
///   point mass.
///
/// Constructor:
/// - `new(smoothing, variance_floor) -> EmissionResult<Self>` validates
///   both fields.
///
/// Default:
/// - `smoothing = 0.0`, `variance_floor = 1e-6`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub smoothing: f64,
    pub variance_floor: f64,
}

impl FitOptions {
    /// Construct validated fit options.
    ///
    /// # Errors
    /// - [`EmissionError::InvalidSmoothing`] if `smoothing` is negative or
    ///   non-finite.
    /// - [`EmissionError::InvalidVarianceFloor`] if `variance_floor` is not
    ///   finite and strictly positive.
    pub fn new(smoothing: f64, variance_floor: f64) -> EmissionResult<Self> {
        if !smoothing.is_finite() || smoothing < 0.0 {
            return Err(EmissionError::InvalidSmoothing { value: smoothing });
        }
        if !variance_floor.is_finite() || variance_floor <= 0.0 {
            return Err(EmissionError::InvalidVarianceFloor { value: variance_floor });
        }
        Ok(Self { smoothing, variance_floor })
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self { smoothing: 0.0, variance_floor: 1e-6 }
    }
}

/// Per-state observation distribution consumed by the training core.
///
/// The contract is deliberately narrow:
/// - `log_probability` must be defined for **any** observation — finite or
///   `-∞`, never NaN. Out-of-support observations have zero probability.
/// - `fit` re-estimates parameters to (approximately) maximize the
///   weighted log-likelihood `Σᵢ wᵢ · ln p(xᵢ)`. Zero-length input or an
///   all-zero weight vector leaves the distribution unchanged.
pub trait EmissionModel {
    type Observation;

    /// Log-density (or log-mass) of one observation under the current
    /// parameters.
    fn log_probability(&self, observation: &Self::Observation) -> f64;

    /// Re-estimate parameters from weighted samples.
    ///
    /// # Errors
    /// Implementations report structural problems (length mismatches,
    /// out-of-range symbols) as [`EmissionError`]; degenerate weight
    /// vectors are a no-op, not an error.
    fn fit(
        &mut self, observations: &[Self::Observation], weights: &[f64], options: &FitOptions,
    ) -> EmissionResult<()>;
}

/// Categorical distribution over a finite symbol alphabet `0..n_symbols`.
///
/// Probabilities are stored in log space; symbols outside the alphabet
/// evaluate to `-∞` rather than erroring, per the [`EmissionModel`]
/// contract (fitting against an out-of-range symbol *is* an error — a
/// malformed training set should not be silently truncated).
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteEmission {
    log_probs: Array1<f64>,
}

impl DiscreteEmission {
    /// Uniform distribution over `n_symbols` symbols.
    ///
    /// # Errors
    /// - [`EmissionError::SymbolOutOfRange`] with `symbol = 0` when
    ///   `n_symbols == 0` (an empty alphabet cannot emit anything).
    pub fn uniform(n_symbols: usize) -> EmissionResult<Self> {
        if n_symbols == 0 {
            return Err(EmissionError::SymbolOutOfRange { symbol: 0, n_symbols });
        }
        let log_uniform = -(n_symbols as f64).ln();
        Ok(Self { log_probs: Array1::from_elem(n_symbols, log_uniform) })
    }

    /// Distribution from explicit probabilities (normalized by the caller).
    ///
    /// Zero probabilities are allowed and map to `-∞`.
    pub fn from_probabilities(probabilities: &[f64]) -> EmissionResult<Self> {
        if probabilities.is_empty() {
            return Err(EmissionError::SymbolOutOfRange { symbol: 0, n_symbols: 0 });
        }
        Ok(Self { log_probs: probabilities.iter().map(|&p| p.ln()).collect() })
    }

    /// Alphabet size.
    pub fn n_symbols(&self) -> usize {
        self.log_probs.len()
    }

    /// Log-probability table (one entry per symbol).
    pub fn log_probs(&self) -> &Array1<f64> {
        &self.log_probs
    }
}

impl EmissionModel for DiscreteEmission {
    type Observation = usize;

    fn log_probability(&self, observation: &usize) -> f64 {
        match self.log_probs.get(*observation) {
            Some(&log_prob) => log_prob,
            None => LOG_ZERO,
        }
    }

    /// Weighted categorical refit: `p(s) ∝ smoothing + Σ_{xᵢ = s} wᵢ`.
    ///
    /// With zero total mass (empty input or all-zero weights and no
    /// smoothing) the current table is left unchanged.
    fn fit(
        &mut self, observations: &[usize], weights: &[f64], options: &FitOptions,
    ) -> EmissionResult<()> {
        if observations.len() != weights.len() {
            return Err(EmissionError::FitLengthMismatch {
                observations: observations.len(),
                weights: weights.len(),
            });
        }
        let n_symbols = self.log_probs.len();
        let mut counts = vec![options.smoothing; n_symbols];
        for (&symbol, &weight) in observations.iter().zip(weights.iter()) {
            if symbol >= n_symbols {
                return Err(EmissionError::SymbolOutOfRange { symbol, n_symbols });
            }
            counts[symbol] += weight;
        }
        let total: f64 = counts.iter().sum();
        if total <= 0.0 {
            return Ok(());
        }
        for (slot, &count) in self.log_probs.iter_mut().zip(counts.iter()) {
            *slot = (count / total).ln();
        }
        Ok(())
    }
}

/// Univariate normal distribution with a variance floor.
///
/// The density object is cached and rebuilt only on refit, so
/// `log_probability` stays allocation-free inside the trellis loops.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianEmission {
    mean: f64,
    variance: f64,
    density: Normal,
}

impl GaussianEmission {
    /// Construct from mean and variance.
    ///
    /// # Errors
    /// - [`EmissionError::InvalidVarianceFloor`] if `variance` is not
    ///   finite and strictly positive (the same constraint the floor
    ///   enforces during fitting).
    pub fn new(mean: f64, variance: f64) -> EmissionResult<Self> {
        if !variance.is_finite() || variance <= 0.0 {
            return Err(EmissionError::InvalidVarianceFloor { value: variance });
        }
        let density = Normal::new(mean, variance.sqrt())
            .map_err(|_| EmissionError::InvalidVarianceFloor { value: variance })?;
        Ok(Self { mean, variance, density })
    }

    /// Current mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Current variance.
    pub fn variance(&self) -> f64 {
        self.variance
    }
}

impl EmissionModel for GaussianEmission {
    type Observation = f64;

    fn log_probability(&self, observation: &f64) -> f64 {
        if !observation.is_finite() {
            return LOG_ZERO;
        }
        self.density.ln_pdf(*observation)
    }

    /// Weighted Gaussian refit: weighted mean and biased weighted variance,
    /// clamped below by `options.variance_floor`.
    ///
    /// With zero total weight (or empty input) the current parameters are
    /// left unchanged.
    fn fit(
        &mut self, observations: &[f64], weights: &[f64], options: &FitOptions,
    ) -> EmissionResult<()> {
        if observations.len() != weights.len() {
            return Err(EmissionError::FitLengthMismatch {
                observations: observations.len(),
                weights: weights.len(),
            });
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Ok(());
        }
        let mean: f64 = observations
            .iter()
            .zip(weights.iter())
            .map(|(&x, &w)| w * x)
            .sum::<f64>()
            / total;
        let variance: f64 = observations
            .iter()
            .zip(weights.iter())
            .map(|(&x, &w)| w * (x - mean) * (x - mean))
            .sum::<f64>()
            / total;
        let variance = variance.max(options.variance_floor);
        self.density = Normal::new(mean, variance.sqrt())
            .map_err(|_| EmissionError::InvalidVarianceFloor { value: variance })?;
        self.mean = mean;
        self.variance = variance;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The zero-mass no-op fallback of both `fit` implementations.
    // - Weighted refits against hand-computed parameters.
    // - Smoothing behavior and the out-of-range symbol error.
    // - NaN-freedom of `log_probability` on and off the support.
    //
    // They intentionally DO NOT cover:
    // - Interaction with the re-estimation layer (covered there).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the no-op fallback: an all-zero weight vector (and an empty
    // input) leaves both distributions unchanged rather than crashing.
    //
    // Given
    // -----
    // - A uniform discrete emission and a standard Gaussian.
    //
    // Expect
    // ------
    // - Parameters identical before and after the degenerate fits.
    fn zero_mass_fit_is_a_no_op() {
        let options = FitOptions::default();

        let mut discrete = DiscreteEmission::uniform(3).unwrap();
        let before = discrete.clone();
        discrete.fit(&[0, 1, 2], &[0.0, 0.0, 0.0], &options).unwrap();
        discrete.fit(&[], &[], &options).unwrap();
        assert_eq!(discrete, before);

        let mut gaussian = GaussianEmission::new(0.0, 1.0).unwrap();
        let (mean, variance) = (gaussian.mean(), gaussian.variance());
        gaussian.fit(&[1.0, 2.0], &[0.0, 0.0], &options).unwrap();
        gaussian.fit(&[], &[], &options).unwrap();
        assert_eq!((gaussian.mean(), gaussian.variance()), (mean, variance));
    }

    #[test]
    // Purpose
    // -------
    // Verify the weighted categorical refit against hand-computed mass,
    // and that probabilities sum to one afterwards.
    //
    // Given
    // -----
    // - Symbols [0, 1, 1] with weights [1, 1, 2] over a 3-symbol alphabet,
    //   no smoothing.
    //
    // Expect
    // ------
    // - p = (0.25, 0.75, 0) and unobserved symbol 2 at exactly -inf.
    fn discrete_fit_matches_weighted_counts() {
        let mut emission = DiscreteEmission::uniform(3).unwrap();
        emission.fit(&[0, 1, 1], &[1.0, 1.0, 2.0], &FitOptions::default()).unwrap();

        assert!((emission.log_probability(&0) - 0.25_f64.ln()).abs() < 1e-12);
        assert!((emission.log_probability(&1) - 0.75_f64.ln()).abs() < 1e-12);
        assert_eq!(emission.log_probability(&2), LOG_ZERO);

        let mass: f64 = (0..3).map(|s| emission.log_probability(&s).exp()).sum();
        assert!((mass - 1.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify that the smoothing pseudocount gives unobserved symbols
    // nonzero mass, and that an out-of-range training symbol is rejected.
    //
    // Given
    // -----
    // - A fit of symbol 0 only, with smoothing 1.0, over 2 symbols; then a
    //   fit containing symbol 7.
    //
    // Expect
    // ------
    // - p(1) = 1/3 under smoothing (counts 2 and 1).
    // - `SymbolOutOfRange { symbol: 7, n_symbols: 2 }` for the bad fit.
    fn discrete_fit_applies_smoothing_and_rejects_bad_symbols() {
        let options = FitOptions::new(1.0, 1e-6).unwrap();
        let mut emission = DiscreteEmission::uniform(2).unwrap();
        emission.fit(&[0], &[1.0], &options).unwrap();
        assert!((emission.log_probability(&1).exp() - 1.0 / 3.0).abs() < 1e-12);

        let err = emission.fit(&[7], &[1.0], &options).unwrap_err();
        assert_eq!(err, EmissionError::SymbolOutOfRange { symbol: 7, n_symbols: 2 });
    }

    #[test]
    // Purpose
    // -------
    // Verify the weighted Gaussian refit against hand-computed moments and
    // the variance floor clamp.
    //
    // Given
    // -----
    // - Samples [0, 4] with weights [1, 1]; then identical samples that
    //   would fit variance 0.
    //
    // Expect
    // ------
    // - mean 2, variance 4 for the first fit.
    // - variance clamped to the floor for the degenerate second fit.
    fn gaussian_fit_matches_moments_and_clamps_variance() {
        let options = FitOptions::default();
        let mut emission = GaussianEmission::new(0.0, 1.0).unwrap();

        emission.fit(&[0.0, 4.0], &[1.0, 1.0], &options).unwrap();
        assert!((emission.mean() - 2.0).abs() < 1e-12);
        assert!((emission.variance() - 4.0).abs() < 1e-12);

        emission.fit(&[3.0, 3.0, 3.0], &[1.0, 1.0, 1.0], &options).unwrap();
        assert!((emission.mean() - 3.0).abs() < 1e-12);
        assert_eq!(emission.variance(), options.variance_floor);
    }

    #[test]
    // Purpose
    // -------
    // Verify that `log_probability` never yields NaN: out-of-alphabet
    // symbols and non-finite Gaussian inputs evaluate to -inf.
    //
    // Given
    // -----
    // - Symbol 10 against a 3-symbol table; NaN and +inf against a
    //   Gaussian.
    //
    // Expect
    // ------
    // - All evaluations return exactly -inf.
    fn log_probability_is_nan_free_off_support() {
        let discrete = DiscreteEmission::uniform(3).unwrap();
        assert_eq!(discrete.log_probability(&10), LOG_ZERO);

        let gaussian = GaussianEmission::new(0.0, 1.0).unwrap();
        assert_eq!(gaussian.log_probability(&f64::NAN), LOG_ZERO);
        assert_eq!(gaussian.log_probability(&f64::INFINITY), LOG_ZERO);
        assert!(gaussian.log_probability(&0.5).is_finite());
    }

    #[test]
    // Purpose
    // -------
    // Verify `FitOptions::new` validation boundaries.
    //
    // Given
    // -----
    // - Negative smoothing, zero variance floor, and a valid pair.
    //
    // Expect
    // ------
    // - The matching errors and an `Ok` respectively.
    fn fit_options_validate_their_fields() {
        assert!(matches!(
            FitOptions::new(-0.1, 1e-6),
            Err(EmissionError::InvalidSmoothing { .. })
        ));
        assert!(matches!(
            FitOptions::new(0.0, 0.0),
            Err(EmissionError::InvalidVarianceFloor { .. })
        ));
        assert!(FitOptions::new(0.5, 1e-4).is_ok());
    }
}
