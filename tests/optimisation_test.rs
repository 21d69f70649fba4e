use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use btrack_optimiser::{
    AssignmentSolver, ConstraintSystem, HypothesisBuilder, IdSpace, OptimiserConfig,
    OptimiserError, RawHypothesis, SolverStatus, TrackHypothesis, TrackOptimiser,
};
use tracing::{Level, Subscriber};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Counts warning-level events.
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = Registry::default().with(WarnCounter(count.clone()));
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, count.load(Ordering::SeqCst))
}

#[test]
fn test_trivial_accept() {
    let pool = vec![
        TrackHypothesis::initialize(1, 0.0),
        TrackHypothesis::terminate(1, 0.0),
    ];
    let selection = TrackOptimiser::default().optimise(&pool).unwrap();
    assert!(selection.is_optimal());
    assert_eq!(selection.indices(), &[0, 1]);
}

#[test]
fn test_link_preferred_over_terminate_and_initialize() {
    let pool = vec![
        TrackHypothesis::terminate(1, -2.0),
        TrackHypothesis::initialize(2, -2.0),
        TrackHypothesis::link(1, 2, -0.1),
        // Track 1 has to start and track 2 has to end somehow.
        TrackHypothesis::initialize(1, 0.0),
        TrackHypothesis::terminate(2, 0.0),
    ];
    let selection = TrackOptimiser::default().optimise(&pool).unwrap();
    assert!(selection.contains(2));
    assert!(!selection.contains(0));
    assert!(!selection.contains(1));
    assert_eq!(selection.indices(), &[2, 3, 4]);
}

#[test]
fn test_division_rows() {
    let pool = vec![
        TrackHypothesis::terminate(1, -3.0),
        TrackHypothesis::divide(1, 2, 3, -0.5),
        TrackHypothesis::initialize(2, -3.0),
        TrackHypothesis::initialize(3, -3.0),
    ];
    let system = ConstraintSystem::build(&pool, IdSpace::Strict).unwrap();
    let rows = system.matrix().rows();
    assert_eq!(rows[system.tail_row(1)], vec![0, 1]);
    assert_eq!(rows[system.head_row(2)], vec![1, 2]);
    assert_eq!(rows[system.head_row(3)], vec![1, 3]);

    // The bare pool cannot start track 1 or end its children.
    let selection = TrackOptimiser::default().optimise(&pool).unwrap();
    assert!(selection.is_empty());
    assert_eq!(selection.status(), &SolverStatus::Infeasible);
}

#[test]
fn test_division_selected() {
    let pool = vec![
        TrackHypothesis::terminate(1, -3.0),
        TrackHypothesis::divide(1, 2, 3, -0.5),
        TrackHypothesis::initialize(2, -3.0),
        TrackHypothesis::initialize(3, -3.0),
        TrackHypothesis::initialize(1, -0.1),
        TrackHypothesis::terminate(2, -0.1),
        TrackHypothesis::terminate(3, -0.1),
    ];
    let optimiser = TrackOptimiser::default();
    let system = optimiser.build(&pool).unwrap();
    let selection = optimiser.optimise(&pool).unwrap();
    assert_eq!(selection.indices(), &[1, 4, 5, 6]);

    let rows = system.matrix().rows();
    for row in [
        system.tail_row(1),
        system.head_row(2),
        system.head_row(3),
    ] {
        let covering = rows[row].iter().filter(|&&j| selection.contains(j)).count();
        assert_eq!(covering, 1);
    }
}

#[test]
fn test_merge_selected() {
    let pool = vec![
        TrackHypothesis::initialize(1, -0.1),
        TrackHypothesis::initialize(2, -0.1),
        TrackHypothesis::merge(3, 1, 2, -0.2),
        TrackHypothesis::terminate(1, -2.0),
        TrackHypothesis::terminate(2, -2.0),
        TrackHypothesis::initialize(3, -2.0),
        TrackHypothesis::apoptosis(3, -0.1),
    ];
    let selection = TrackOptimiser::default().optimise(&pool).unwrap();
    assert_eq!(selection.indices(), &[0, 1, 2, 6]);
}

#[test]
fn test_repeated_optimisation_is_deterministic() {
    let pool = vec![
        TrackHypothesis::initialize(1, -0.3),
        TrackHypothesis::false_positive(1, -4.0),
        TrackHypothesis::link(1, 2, -0.7),
        TrackHypothesis::link(1, 3, -0.9),
        TrackHypothesis::initialize(2, -1.0),
        TrackHypothesis::initialize(3, -1.2),
        TrackHypothesis::terminate(1, -1.1),
        TrackHypothesis::terminate(2, -0.2),
        TrackHypothesis::terminate(3, -0.2),
        TrackHypothesis::divide(1, 2, 3, -1.0),
    ];
    let optimiser = TrackOptimiser::default();
    let first = optimiser.optimise(&pool).unwrap();
    for _ in 0..5 {
        assert_eq!(optimiser.optimise(&pool).unwrap(), first);
    }
    assert!(first.is_optimal());
}

#[test]
fn test_non_optimal_warns_once() {
    let pool = vec![
        TrackHypothesis::initialize(1, 0.0),
        TrackHypothesis::link(1, 2, 0.0),
        TrackHypothesis::false_positive(2, 0.0),
    ];
    let (selection, warnings) = count_warnings(|| TrackOptimiser::default().optimise(&pool));
    let selection = selection.unwrap();
    assert!(selection.is_empty());
    assert!(!selection.is_optimal());
    assert_eq!(warnings, 1);
}

#[test]
fn test_optimal_does_not_warn() {
    let pool = vec![
        TrackHypothesis::initialize(1, 0.0),
        TrackHypothesis::terminate(1, 0.0),
    ];
    let (selection, warnings) = count_warnings(|| TrackOptimiser::default().optimise(&pool));
    assert!(selection.unwrap().is_optimal());
    assert_eq!(warnings, 0);
}

#[test]
fn test_unknown_type_fails_before_solving() {
    let raw = RawHypothesis {
        fate_code: 99,
        id: 1,
        log_likelihood: 0.0,
        ref_one: 0,
        ref_two: 0,
    };
    let (result, warnings) = count_warnings(|| TrackHypothesis::try_from(raw));
    assert_eq!(result, Err(OptimiserError::UnknownFate(99)));
    assert!(result.unwrap_err().is_structural());
    assert_eq!(warnings, 0);
}

#[test]
fn test_gaps_in_id_space() {
    let pool = vec![
        TrackHypothesis::initialize(1, 0.0),
        TrackHypothesis::terminate(1, 0.0),
        TrackHypothesis::false_positive(3, 0.0),
    ];

    let strict = TrackOptimiser::default();
    assert_eq!(
        strict.optimise(&pool).unwrap_err(),
        OptimiserError::MalformedIdentifierSpace {
            missing_count: 1,
            first_missing: vec![2],
        }
    );

    // Lenient mode keeps the unused rows, which can never be covered.
    let lenient = TrackOptimiser::new(OptimiserConfig {
        id_space: IdSpace::Lenient,
        ..OptimiserConfig::default()
    });
    let (selection, warnings) = count_warnings(|| lenient.optimise(&pool));
    let selection = selection.unwrap();
    assert!(selection.is_empty());
    assert_eq!(selection.status(), &SolverStatus::Infeasible);
    assert_eq!(warnings, 1);
}

#[test]
fn test_assignment_backend_matches_default() {
    let pool: Vec<TrackHypothesis> = [
        HypothesisBuilder::new(1, fate(1)).log_likelihood(-0.2),
        HypothesisBuilder::new(2, fate(1)).log_likelihood(-3.0),
        HypothesisBuilder::new(1, fate(2)).log_likelihood(-3.0),
        HypothesisBuilder::new(2, fate(2)).log_likelihood(-0.2),
        HypothesisBuilder::new(1, fate(3)).link_id(2).log_likelihood(-0.5),
        HypothesisBuilder::new(2, fate(0)).log_likelihood(-5.0),
    ]
    .into_iter()
    .map(|b| b.build().unwrap())
    .collect();

    let ilp = TrackOptimiser::default().optimise(&pool).unwrap();
    let lap = TrackOptimiser::with_solver(OptimiserConfig::default(), AssignmentSolver)
        .optimise(&pool)
        .unwrap();
    assert_eq!(ilp, lap);
    assert_eq!(lap.indices(), &[0, 3, 4]);
}

fn fate(code: u32) -> btrack_optimiser::Fate {
    btrack_optimiser::Fate::try_from(code).unwrap()
}
