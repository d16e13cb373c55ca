//! Public API surface for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait users implement for their model.
//! - [`MLEOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`SolverKind`]: choice of solver family (descent, conjugate gradient,
//!   L-BFGS).
//! - [`LineSearcher`]: choice of line search used inside each solver.
//! - [`OptimOutcome`]: normalized result returned by the high-level
//!   `maximize` API.
//!
//! Convention: we *maximize* a user log-likelihood `ℓ(θ)` by minimizing the
//! cost `c(θ) = -ℓ(θ)`. If an analytic gradient is provided, it should be
//! the gradient of the log-likelihood (`∇ℓ(θ)`); the adapter flips the sign
//! as needed.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// User-implemented log-likelihood interface.
///
/// You maximize `ℓ(θ)`; internally we minimize the cost `c(θ) = -ℓ(θ)`.
/// If you provide an analytic gradient, return the gradient of the
/// log-likelihood `∇ℓ(θ)` (the adapter flips the sign to match the cost).
///
/// - `type Data`: per-model data carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `ℓ(θ)`.
///   - Errors: return a descriptive `OptError` for invalid inputs or model
///     failures.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇ℓ(θ)`.
///   If not implemented, robust finite differences are used automatically.
pub trait LogLikelihood {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Choice of solver family used by [`maximize`](super::api::maximize).
///
/// Variants:
/// - `GradientDescent`: steepest descent along `-∇c(θ)` with a line search.
///   Cheap per iteration, slow near the optimum.
/// - `ConjugateGradient`: nonlinear conjugate gradient with the
///   Polak–Ribière update. A reasonable middle ground when the L-BFGS
///   history is too expensive to carry.
/// - `Lbfgs`: limited-memory BFGS (the default). Supports gradient-norm and
///   cost-change tolerances; the other two stop on `max_iter` or a line
///   search failure.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"GradientDescent"`, `"ConjugateGradient"`, `"Lbfgs"`). Unknown names
/// return `OptError::InvalidSolver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    GradientDescent,
    ConjugateGradient,
    Lbfgs,
}

impl FromStr for SolverKind {
    type Err = OptError;

    /// Parse a solver choice from a string (case-insensitive).
    ///
    /// Accepts `"GradientDescent"`, `"ConjugateGradient"`, `"Lbfgs"` in any
    /// case variant. Any other value returns `OptError::InvalidSolver`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gradientdescent" => Ok(SolverKind::GradientDescent),
            "conjugategradient" => Ok(SolverKind::ConjugateGradient),
            "lbfgs" => Ok(SolverKind::Lbfgs),
            _ => Err(OptError::InvalidSolver {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'GradientDescent', \
                         'ConjugateGradient' or 'Lbfgs'.",
            }),
        }
    }
}

/// Choice of line search used inside the configured solver.
///
/// Variants:
/// - `MoreThuente`: More–Thuente line search.
/// - `HagerZhang`: Hager–Zhang line search.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    /// Parse a line-search choice from a string (case-insensitive).
    ///
    /// Accepts:
    /// - `"MoreThuente"`
    /// - `"HagerZhang"`
    /// - Any case variant (e.g., `"morethuente"`, `"HAGERZHANG"`).
    ///
    /// Any other value returns `OptError::InvalidLineSearch`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — numerical tolerances and iteration limits.
/// - `solver: SolverKind` — solver family run by `maximize`.
/// - `line_searcher: LineSearcher` — line-search algorithm used inside the
///   solver.
/// - `lbfgs_mem: Option<usize>` — L-BFGS history size; `None` uses the
///   crate default of 7. Ignored by the other solver families.
///
/// Constructor:
/// - `new(tols, solver, line_searcher, lbfgs_mem) -> OptResult<Self>` —
///   validation of numeric values is handled in `Tolerances::new`; this
///   constructor only rejects a zero L-BFGS memory.
///
/// Default:
/// - `tols`: `tol_grad = 1e-6`, `tol_cost = None`, `max_iter = 300`
/// - `solver`: `Lbfgs`
/// - `line_searcher`: `MoreThuente`
/// - `lbfgs_mem`: `None`
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub solver: SolverKind,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// Create a new set of optimizer options.
    ///
    /// This constructor does not mutate values; validation of numeric fields
    /// is performed inside [`Tolerances::new`].
    pub fn new(
        tols: Tolerances, solver: SolverKind, line_searcher: LineSearcher,
        lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, solver, line_searcher, lbfgs_mem })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances::new(Some(1e-6), None, Some(300)).unwrap(),
            solver: SolverKind::Lbfgs,
            line_searcher: LineSearcher::MoreThuente,
            lbfgs_mem: None,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold
///   (L-BFGS only).
/// - `tol_cost`: terminate when the change in cost falls below this
///   threshold (L-BFGS only).
/// - `max_iter`: hard cap on the number of iterations (all solvers).
///
/// Any field can be `None` but **at least one** of the three must be
/// provided (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - `OptError::InvalidMaxIter` if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result returned by `maximize`.
///
/// - `theta_hat`: best weight vector found.
/// - `value`: best **log-likelihood** value `ℓ(θ)` (not the cost).
/// - `converged`: `true` if the solver reported a terminating status other
///   than `NotTerminated`.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`
///   (keys follow argmin's counters, e.g., `cost_count`, `gradient_count`).
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value` (finite).
    /// - Maps `TerminationStatus` into `(converged, status)`.
    /// - Computes `grad_norm` if a gradient was provided.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let status: String;
        let converged = match termination {
            TerminationStatus::NotTerminated => {
                status = "Not terminated".to_string();
                false
            }
            _ => {
                status = format!("{termination:?}");
                true
            }
        };
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals, grad_norm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `FromStr` parsing for `SolverKind` and `LineSearcher`.
    // - Validation rules of `Tolerances::new` and `MLEOptions::new`.
    // - `OptimOutcome::new` mapping of termination status and theta checks.
    //
    // They intentionally DO NOT cover:
    // - Running actual solvers (builder/runner tests do that).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify case-insensitive parsing of solver names and rejection of
    // unknown names.
    //
    // Given
    // -----
    // - The strings "lbfgs", "GRADIENTDESCENT", "ConjugateGradient", and
    //   "newton".
    //
    // Expect
    // ------
    // - The first three parse to their variants; "newton" yields
    //   `InvalidSolver`.
    fn solver_kind_parses_case_insensitively() {
        assert_eq!("lbfgs".parse::<SolverKind>().unwrap(), SolverKind::Lbfgs);
        assert_eq!("GRADIENTDESCENT".parse::<SolverKind>().unwrap(), SolverKind::GradientDescent);
        assert_eq!(
            "ConjugateGradient".parse::<SolverKind>().unwrap(),
            SolverKind::ConjugateGradient
        );
        assert!(matches!(
            "newton".parse::<SolverKind>(),
            Err(OptError::InvalidSolver { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify that `Tolerances::new` rejects the all-`None` configuration
    // and non-positive tolerances.
    //
    // Given
    // -----
    // - `(None, None, None)` and a negative gradient tolerance.
    //
    // Expect
    // ------
    // - `NoTolerancesProvided` and `InvalidTolGrad` respectively.
    fn tolerances_reject_empty_and_nonpositive_configurations() {
        assert!(matches!(
            Tolerances::new(None, None, None),
            Err(OptError::NoTolerancesProvided)
        ));
        assert!(matches!(
            Tolerances::new(Some(-1e-6), None, Some(10)),
            Err(OptError::InvalidTolGrad { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify that a zero L-BFGS memory is rejected while `None` and
    // positive values pass.
    //
    // Given
    // -----
    // - Valid tolerances and `lbfgs_mem` of `Some(0)`, `None`, `Some(5)`.
    //
    // Expect
    // ------
    // - `InvalidLBFGSMem` for zero; `Ok` for the others.
    fn mle_options_validate_lbfgs_memory() {
        let tols = Tolerances::new(Some(1e-6), None, Some(50)).unwrap();
        assert!(matches!(
            MLEOptions::new(tols, SolverKind::Lbfgs, LineSearcher::MoreThuente, Some(0)),
            Err(OptError::InvalidLBFGSMem { .. })
        ));
        assert!(MLEOptions::new(tols, SolverKind::Lbfgs, LineSearcher::MoreThuente, None).is_ok());
        assert!(
            MLEOptions::new(tols, SolverKind::Lbfgs, LineSearcher::HagerZhang, Some(5)).is_ok()
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify that `OptimOutcome::new` rejects a missing or non-finite
    // `theta_hat` and maps `NotTerminated` to `converged = false`.
    //
    // Given
    // -----
    // - `None` theta, a theta containing NaN, and a valid theta with
    //   `TerminationStatus::NotTerminated`.
    //
    // Expect
    // ------
    // - `MissingThetaHat`, `InvalidThetaHat`, and a non-converged outcome
    //   respectively.
    fn optim_outcome_validates_theta_and_maps_status() {
        let evals = FnEvalMap::new();
        assert!(matches!(
            OptimOutcome::new(None, 0.0, TerminationStatus::NotTerminated, 0, evals.clone(), None),
            Err(OptError::MissingThetaHat)
        ));
        assert!(matches!(
            OptimOutcome::new(
                Some(array![f64::NAN]),
                0.0,
                TerminationStatus::NotTerminated,
                0,
                evals.clone(),
                None
            ),
            Err(OptError::InvalidThetaHat { .. })
        ));
        let outcome = OptimOutcome::new(
            Some(array![1.0, 2.0]),
            -3.5,
            TerminationStatus::NotTerminated,
            12,
            evals,
            None,
        )
        .unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 12);
        assert_eq!(outcome.value, -3.5);
    }
}
