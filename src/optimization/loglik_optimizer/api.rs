//! High-level entry point for maximizing a user-provided `LogLikelihood`.
//!
//! This selects a solver from the configured [`SolverKind`] ×
//! [`LineSearcher`] pair, wraps the model in an `ArgMinAdapter` (which
//! *minimizes* `-ℓ(θ)`), and delegates the run to `run_solver`.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{
            build_lbfgs_hager_zhang, build_lbfgs_more_thuente, build_ncg_hager_zhang,
            build_ncg_more_thuente, build_steepest_hager_zhang, build_steepest_more_thuente,
        },
        run::run_solver,
        traits::{LineSearcher, LogLikelihood, MLEOptions, SolverKind},
    },
};

/// Maximize a log-likelihood `ℓ(θ)` with the configured solver and line
/// search.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Wraps `(f, data)` in an `ArgMinAdapter` exposing the *minimization*
///   problem `c(θ) = -ℓ(θ)` to `argmin`.
/// - Builds the solver selected by `opts.solver` with the line search
///   selected by `opts.line_searcher`.
/// - Calls `run_solver`, which configures the executor (initial weights,
///   max iters) and returns an [`OptimOutcome`].
///
/// # Parameters
/// - `f`: the model implementing [`LogLikelihood`].
/// - `theta0`: initial weight vector (consumed).
/// - `data`: model data passed through to `value`/`grad`.
/// - `opts`: optimizer options (tolerances, solver, line search, L-BFGS
///   memory).
///
/// # Errors
/// - Propagates any error from `f.check`.
/// - Propagates builder errors from `build_*`.
/// - Propagates runtime errors from `run_solver` (e.g., line-search
///   failures).
///
/// # Returns
/// An [`OptimOutcome`] containing `theta_hat`, the best value `ℓ(θ̂)`,
/// termination status, iteration counts, function-evaluation counts, and
/// optionally the gradient norm.
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match (opts.solver, opts.line_searcher) {
        (SolverKind::Lbfgs, LineSearcher::MoreThuente) => {
            let solver = build_lbfgs_more_thuente(opts)?;
            run_solver(theta0, opts, problem, solver)
        }
        (SolverKind::Lbfgs, LineSearcher::HagerZhang) => {
            let solver = build_lbfgs_hager_zhang(opts)?;
            run_solver(theta0, opts, problem, solver)
        }
        (SolverKind::GradientDescent, LineSearcher::MoreThuente) => {
            let solver = build_steepest_more_thuente(opts)?;
            run_solver(theta0, opts, problem, solver)
        }
        (SolverKind::GradientDescent, LineSearcher::HagerZhang) => {
            let solver = build_steepest_hager_zhang(opts)?;
            run_solver(theta0, opts, problem, solver)
        }
        (SolverKind::ConjugateGradient, LineSearcher::MoreThuente) => {
            let solver = build_ncg_more_thuente(opts)?;
            run_solver(theta0, opts, problem, solver)
        }
        (SolverKind::ConjugateGradient, LineSearcher::HagerZhang) => {
            let solver = build_ncg_hager_zhang(opts)?;
            run_solver(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, Grad, Tolerances},
    };
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - End-to-end maximization of a strictly concave toy log-likelihood
    //   under each solver family.
    // - The pre-run `check` rejection path.
    //
    // They intentionally DO NOT cover:
    // - Real CRF objectives (integration tests).
    // -------------------------------------------------------------------------

    struct ConcaveQuadratic;

    impl LogLikelihood for ConcaveQuadratic {
        type Data = ();

        fn value(&self, theta: &Theta, _data: &()) -> OptResult<Cost> {
            // ℓ(θ) = -(θ - 1)·(θ - 1), maximized at θ = 1.
            Ok(-theta.mapv(|t| (t - 1.0) * (t - 1.0)).sum())
        }

        fn check(&self, theta: &Theta, _data: &()) -> OptResult<()> {
            if theta.iter().any(|t| !t.is_finite()) {
                return Err(OptError::InvalidThetaHat {
                    index: 0,
                    value: f64::NAN,
                    reason: "Initial weights must be finite.",
                });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, _data: &()) -> OptResult<Grad> {
            Ok(theta.mapv(|t| -2.0 * (t - 1.0)))
        }
    }

    fn opts_for(solver: SolverKind) -> MLEOptions {
        let tols = Tolerances::new(Some(1e-8), None, Some(200)).unwrap();
        MLEOptions::new(tols, solver, LineSearcher::MoreThuente, None).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify that each solver family drives the toy problem to its known
    // maximum at θ = (1, 1).
    //
    // Given
    // -----
    // - ℓ(θ) = -(θ-1)·(θ-1) starting from (0, 0), 200 iterations.
    //
    // Expect
    // ------
    // - θ̂ within 1e-3 of 1 per coordinate and ℓ(θ̂) within 1e-6 of 0 for
    //   L-BFGS, gradient descent, and conjugate gradient alike.
    fn maximize_reaches_known_optimum_under_each_solver() {
        for solver in
            [SolverKind::Lbfgs, SolverKind::GradientDescent, SolverKind::ConjugateGradient]
        {
            let out = maximize(&ConcaveQuadratic, array![0.0, 0.0], &(), &opts_for(solver))
                .unwrap_or_else(|e| panic!("{solver:?} failed: {e}"));
            for (i, &w) in out.theta_hat.iter().enumerate() {
                assert!((w - 1.0).abs() < 1e-3, "{solver:?}: theta[{i}] = {w}");
            }
            assert!(out.value > -1e-6, "{solver:?}: value = {}", out.value);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that a failing `check` aborts before any solver work.
    //
    // Given
    // -----
    // - An initial vector containing NaN.
    //
    // Expect
    // ------
    // - `maximize` returns the check's error.
    fn maximize_propagates_check_failure() {
        let result = maximize(
            &ConcaveQuadratic,
            array![f64::NAN],
            &(),
            &opts_for(SolverKind::Lbfgs),
        );
        assert!(matches!(result, Err(OptError::InvalidThetaHat { .. })));
    }
}
