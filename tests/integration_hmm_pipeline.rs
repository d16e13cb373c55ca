//! Integration tests for the HMM training pipelines.
//!
//! Purpose
//! -------
//! - Validate the end-to-end Baum-Welch pipeline: from a validated
//!   training set, through topology-based model construction and EM
//!   training, to scoring and decoding with the fitted model.
//! - Exercise the Viterbi (segmental) learner on the same data and the
//!   learner-level guarantees both loops share: row-stochastic
//!   parameters, monotone EM objective, fail-fast validation.
//!
//! Coverage
//! --------
//! - `markov::core`:
//!   - `TrainingSet` construction, including the zero-length-sequence
//!     rejection before any training work.
//!   - `Topology` seeding (ergodic and left-to-right) through the
//!     learner constructors.
//! - `markov::learners`:
//!   - `BaumWelchLearner` and `ViterbiLearner` end to end, with
//!     convergence summaries.
//! - `markov::core::model`:
//!   - Forward scoring and Viterbi decoding on held-out data.
//!
//! Exclusions
//! ----------
//! - Fine-grained kernel behavior (trellis identities, posterior
//!   normalization, re-estimation guards) — covered by unit tests.
//! - CRF training — covered by the CRF integration suite.
//! - Python bindings — exercised from the Python side.
use rust_markov::markov::{
    core::{
        data::TrainingSet,
        emission::{DiscreteEmission, EmissionModel},
        model::HiddenMarkovModel,
        options::LearnOptions,
        topology::Topology,
    },
    errors::HmmError,
    learners::{baum_welch::BaumWelchLearner, viterbi::ViterbiLearner},
};

/// Purpose
/// -------
/// The two-symbol training corpus used across this suite: three short
/// sequences over the alphabet {0, 1} with visible block structure, so a
/// two-state model has something real to learn.
fn two_symbol_corpus() -> TrainingSet<usize> {
    TrainingSet::new(
        vec![vec![0usize, 0, 1, 1], vec![0, 1, 1, 1], vec![1, 1, 0, 0]],
        None,
    )
    .expect("corpus is valid")
}

/// Purpose
/// -------
/// A deterministic, asymmetric starting model: 2-state ergodic topology
/// with slightly specialized emission seeds. A perfectly uniform start is
/// a fixed point of EM, so the seeds break the symmetry the same way an
/// application would.
fn seeded_model() -> HiddenMarkovModel<DiscreteEmission> {
    HiddenMarkovModel::from_topology(Topology::Ergodic, 2, |state| {
        if state == 0 {
            DiscreteEmission::from_probabilities(&[0.6, 0.4]).expect("valid seed")
        } else {
            DiscreteEmission::from_probabilities(&[0.3, 0.7]).expect("valid seed")
        }
    })
    .expect("2-state ergodic model is valid")
}

/// Purpose
/// -------
/// Sum of per-sequence log-likelihoods of the corpus under a model; the
/// quantity the end-to-end scenario compares before and after training.
fn corpus_log_likelihood(
    model: &HiddenMarkovModel<DiscreteEmission>, corpus: &TrainingSet<usize>,
) -> f64 {
    corpus
        .sequences()
        .iter()
        .map(|sequence| model.log_likelihood(sequence).expect("finite-length sequences"))
        .sum()
}

#[test]
// Purpose
// -------
// The end-to-end Baum-Welch scenario: train the 2-state ergodic model on
// the two-symbol corpus and verify that training helped and the result
// generalizes.
//
// Given
// -----
// - The seeded model, tolerance 1e-5, at most 100 iterations.
//
// Expect
// ------
// - The trained model's corpus log-likelihood strictly exceeds the
//   untrained model's.
// - A held-out sequence [0, 0, 1, 1] scores finite (not -inf) under the
//   trained model.
// - The summary reports at least one iteration and a terminal state.
fn baum_welch_end_to_end_improves_and_generalizes() {
    let corpus = two_symbol_corpus();
    let untrained = seeded_model();
    let baseline = corpus_log_likelihood(&untrained, &corpus);

    let options = LearnOptions::new(1e-5, 100).expect("valid options");
    let mut learner = BaumWelchLearner::new(untrained, options);
    learner.learn(&corpus).expect("training succeeds");

    let trained = learner.model();
    let improved = corpus_log_likelihood(trained, &corpus);
    assert!(
        improved > baseline,
        "training did not improve the corpus log-likelihood: {baseline} -> {improved}"
    );

    let held_out = [0usize, 0, 1, 1];
    let score = trained.log_likelihood(&held_out).expect("held-out scoring succeeds");
    assert!(score.is_finite(), "held-out score must be finite, got {score}");

    let summary = learner.summary().expect("summary recorded");
    assert!(summary.iterations >= 1);
    assert!(summary.objective.is_finite());
}

#[test]
// Purpose
// -------
// The row-stochastic invariant on a trained model: initial mass,
// transition rows, and emission tables all sum to one.
//
// Given
// -----
// - The Baum-Welch pipeline run to convergence on the corpus.
//
// Expect
// ------
// - Every probability block sums to 1 within 1e-6.
fn trained_models_are_row_stochastic() {
    let options = LearnOptions::new(1e-6, 200).expect("valid options");
    let mut learner = BaumWelchLearner::new(seeded_model(), options);
    learner.learn(&two_symbol_corpus()).expect("training succeeds");
    let model = learner.model();

    let initial_mass: f64 = model.log_initial().iter().map(|&v| v.exp()).sum();
    assert!((initial_mass - 1.0).abs() < 1e-6, "initial mass {initial_mass}");

    for (i, row) in model.log_transitions().rows().into_iter().enumerate() {
        let mass: f64 = row.iter().map(|&v| v.exp()).sum();
        assert!((mass - 1.0).abs() < 1e-6, "transition row {i} mass {mass}");
    }

    for (i, emission) in model.emissions().iter().enumerate() {
        let mass: f64 = (0..2).map(|s| emission.log_probability(&s).exp()).sum();
        assert!((mass - 1.0).abs() < 1e-6, "emission {i} mass {mass}");
    }
}

#[test]
// Purpose
// -------
// The EM monotonicity property at the integration level: the recorded
// objective history never decreases beyond floating-point noise.
//
// Given
// -----
// - A long training run (tight tolerance, 100-iteration budget).
//
// Expect
// ------
// - history[i+1] ≥ history[i] − 1e-9 across the whole run.
fn baum_welch_objective_is_monotone() {
    let options = LearnOptions::new(1e-9, 100).expect("valid options");
    let mut learner = BaumWelchLearner::new(seeded_model(), options);
    learner.learn(&two_symbol_corpus()).expect("training succeeds");

    let history = &learner.summary().expect("summary recorded").history;
    assert!(history.len() >= 2, "expected a multi-iteration run");
    for (step, window) in history.windows(2).enumerate() {
        assert!(
            window[1] >= window[0] - 1e-9,
            "objective decreased at step {step}: {} -> {}",
            window[0],
            window[1]
        );
    }
}

#[test]
// Purpose
// -------
// Fail-fast validation: a zero-length sequence is rejected when the
// training set is assembled, before any learner exists to mutate a
// parameter.
//
// Given
// -----
// - A batch whose second sequence is empty.
//
// Expect
// ------
// - `EmptySequence { index: 1 }` from `TrainingSet::new`; the seeded
//   model is never touched.
fn zero_length_sequences_fail_before_training() {
    let result = TrainingSet::<usize>::new(vec![vec![0, 1], vec![], vec![1]], None);
    assert_eq!(result.unwrap_err(), HmmError::EmptySequence { index: 1 });
}

#[test]
// Purpose
// -------
// The Viterbi learner end to end: segmental training on the corpus
// produces a model whose decoder separates the two symbol blocks, and
// repeated decoding is deterministic.
//
// Given
// -----
// - The seeded model, smoothing 1e-3, seed 42, 50 iterations.
//
// Expect
// ------
// - Decoding [0, 0, 0, 1, 1, 1] yields one state for the 0-block and a
//   different state for the 1-block.
// - Ten repeated decodes agree exactly.
fn viterbi_learner_end_to_end_separates_blocks() {
    let options = LearnOptions::new(1e-8, 50)
        .expect("valid options")
        .with_fit_options(
            rust_markov::markov::core::emission::FitOptions::new(1e-3, 1e-6)
                .expect("valid fit options"),
        )
        .with_seed(42);
    let mut learner = ViterbiLearner::new(seeded_model(), options);
    learner
        .learn(
            &TrainingSet::new(
                vec![
                    vec![0usize, 0, 0, 1, 1, 1],
                    vec![0, 0, 1, 1, 1, 1],
                    vec![1, 1, 1, 0, 0, 0],
                ],
                None,
            )
            .expect("corpus is valid"),
        )
        .expect("training succeeds");

    let model = learner.model();
    let probe = [0usize, 0, 0, 1, 1, 1];
    let (path, score) = model.decode(&probe).expect("decoding succeeds");
    assert!(score.is_finite());
    assert_eq!(path[0], path[1]);
    assert_eq!(path[1], path[2]);
    assert_eq!(path[3], path[4]);
    assert_eq!(path[4], path[5]);
    assert_ne!(path[0], path[5], "blocks must map to different states: {path:?}");

    for _ in 0..10 {
        assert_eq!(model.decode(&probe).expect("decoding succeeds").0, path);
    }
}

#[test]
// Purpose
// -------
// Left-to-right training end to end: the forward topology's structural
// zeros survive a full Baum-Welch run.
//
// Given
// -----
// - A 3-state left-to-right learner trained on forward-structured
//   sequences over {0, 1, 2}.
//
// Expect
// ------
// - Every below-diagonal transition stays at probability zero and the
//   chain still starts in state 0.
fn left_to_right_structure_survives_training() {
    let options = LearnOptions::new(1e-6, 100).expect("valid options");
    let mut learner = BaumWelchLearner::from_topology(
        Topology::LeftToRight { allow_skip: false },
        3,
        |state| {
            let mut seed = [0.2_f64; 3];
            seed[state] = 0.6;
            DiscreteEmission::from_probabilities(&seed).expect("valid seed")
        },
        options,
    )
    .expect("left-to-right model is valid");

    learner
        .learn(
            &TrainingSet::new(
                vec![vec![0usize, 0, 1, 1, 2, 2], vec![0, 1, 1, 2, 2, 2], vec![0, 0, 1, 2, 2, 2]],
                None,
            )
            .expect("corpus is valid"),
        )
        .expect("training succeeds");

    let model = learner.model();
    assert_eq!(model.log_initial()[0], 0.0, "chain must still start in state 0");
    for i in 0..3 {
        for j in 0..i {
            assert_eq!(
                model.log_transitions()[[i, j]],
                f64::NEG_INFINITY,
                "backward transition {i}->{j} was resurrected"
            );
        }
    }
}
