//! Execution helper that runs an `argmin` solver on a log-likelihood
//! problem and returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{Executor, State};

/// Run an `argmin` optimization for a log-likelihood problem.
///
/// This is the shared runner used by every solver/line-search combination.
/// It wires up:
/// - the user model via [`ArgMinAdapter`],
/// - the chosen `Solver` (L-BFGS, steepest descent, or nonlinear CG with
///   either line search),
/// - the initial weight vector `theta0`,
/// - optional `max_iters`,
///   then executes the solver and converts the result into
///   [`OptimOutcome`].
///
/// # Type Parameters
/// - `F`: the log-likelihood type implementing [`LogLikelihood`].
/// - `S`: any `argmin` solver whose problem is `ArgMinAdapter<'a, F>` and
///   whose `IterState` matches the aliases `Theta` (parameters), `Grad`
///   (gradient), and `f64` as the float type.
///
/// # Arguments
/// - `theta0`: initial weight vector. It is **consumed** and set on the
///   optimizer state via `state.param(theta0)`.
/// - `opts`: optimizer options (tolerances / iteration cap).
/// - `problem`: an [`ArgMinAdapter`] wrapping the user's model and data.
/// - `solver`: a fully constructed solver from
///   [`builders`](super::builders).
///
/// # Returns
/// An [`OptimOutcome`] with the best weights found, the best
/// log-likelihood `ℓ(θ̂)`, termination status, iteration count,
/// function-evaluation counts, and the last available gradient's norm.
///
/// # Errors
/// - Propagates any `argmin` runtime error (solver errors, line-search
///   failures) via the crate's `From<argmin::core::Error>` conversion.
/// - Propagates validation errors from [`OptimOutcome::new`].
pub fn run_solver<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}
