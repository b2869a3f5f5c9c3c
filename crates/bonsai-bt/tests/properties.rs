//! Property tests for composite and decorator semantics.
//!
//! - Sequence: fails exactly when some child fails, ticking children up to
//!   the first failure and no further.
//! - Selector: the mirror image for success.
//! - Parallel: the result matches a direct count of child outcomes.
//! - Double inversion is the identity.
//! - Repeat(n) over a failing child reports n-1 `Running` ticks, then `Failure`.
//! - Utility selection ticks the earliest maximal child.
//! - Weighted selection never draws a zero-weight child.

use std::sync::{Arc, Mutex};

use bonsai_bt::{
    Action, Blackboard, Decorator, Node, Parallel, ParallelPolicy, Selector, Sequence, Status,
    Transform, UtilitySelector, WeightedRandomSelector,
};
use proptest::prelude::*;

type Picks = Arc<Mutex<Vec<usize>>>;

fn recorded(id: usize, picks: &Picks, status: Status) -> Action {
    let picks = Arc::clone(picks);
    Action::new(move |_bb| {
        picks.lock().unwrap().push(id);
        status
    })
}

fn terminal() -> impl Strategy<Value = Status> {
    prop_oneof![Just(Status::Success), Just(Status::Failure)]
}

fn any_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Success),
        Just(Status::Failure),
        Just(Status::Running),
    ]
}

fn policy() -> impl Strategy<Value = ParallelPolicy> {
    prop_oneof![
        Just(ParallelPolicy::RequireAll),
        Just(ParallelPolicy::RequireOne),
        (0usize..6).prop_map(ParallelPolicy::AtLeast),
    ]
}

proptest! {
    #[test]
    fn prop_sequence_is_logical_and(statuses in prop::collection::vec(terminal(), 0..12)) {
        let picks = Picks::default();
        let mut seq = statuses
            .iter()
            .enumerate()
            .fold(Sequence::default(), |s, (i, st)| s.with_child(recorded(i, &picks, *st)));

        let result = seq.tick(&Blackboard::new());
        let first_failure = statuses.iter().position(|s| s.is_failure());

        let expected = if first_failure.is_some() { Status::Failure } else { Status::Success };
        prop_assert_eq!(result, expected);

        let ticked = first_failure.map_or(statuses.len(), |i| i + 1);
        prop_assert_eq!(picks.lock().unwrap().clone(), (0..ticked).collect::<Vec<_>>());
        prop_assert_eq!(seq.cursor(), 0);
    }

    #[test]
    fn prop_selector_is_logical_or(statuses in prop::collection::vec(terminal(), 0..12)) {
        let picks = Picks::default();
        let mut sel = statuses
            .iter()
            .enumerate()
            .fold(Selector::default(), |s, (i, st)| s.with_child(recorded(i, &picks, *st)));

        let result = sel.tick(&Blackboard::new());
        let first_success = statuses.iter().position(|s| s.is_success());

        let expected = if first_success.is_some() { Status::Success } else { Status::Failure };
        prop_assert_eq!(result, expected);

        let ticked = first_success.map_or(statuses.len(), |i| i + 1);
        prop_assert_eq!(picks.lock().unwrap().clone(), (0..ticked).collect::<Vec<_>>());
        prop_assert_eq!(sel.cursor(), 0);
    }

    #[test]
    fn prop_parallel_matches_outcome_counts(
        statuses in prop::collection::vec(any_status(), 0..8),
        success in policy(),
        failure in policy(),
    ) {
        let picks = Picks::default();
        let mut par = statuses
            .iter()
            .enumerate()
            .fold(Parallel::new(success, failure), |p, (i, st)| {
                p.with_child(recorded(i, &picks, *st))
            });

        let total = statuses.len();
        let succeeded = statuses.iter().filter(|s| s.is_success()).count();
        let failed = statuses.iter().filter(|s| s.is_failure()).count();
        let expected = if success.is_met(succeeded, total) {
            Status::Success
        } else if failure.is_met(failed, total) {
            Status::Failure
        } else {
            Status::Running
        };

        prop_assert_eq!(par.tick(&Blackboard::new()), expected);
        prop_assert_eq!(picks.lock().unwrap().len(), total);
    }

    #[test]
    fn prop_double_inversion_is_identity(status in any_status()) {
        let mut twice = Decorator::inverter(Decorator::inverter(Action::new(move |_bb| status)));
        prop_assert_eq!(twice.tick(&Blackboard::new()), status);
    }

    #[test]
    fn prop_repeat_gives_up_after_limit(limit in 1i32..10, cycles in 1usize..4) {
        let mut repeat = Decorator::new(Action::new(|_bb| Status::Failure), Transform::repeat(limit));
        let bb = Blackboard::new();
        for _ in 0..cycles {
            for _ in 1..limit {
                prop_assert_eq!(repeat.tick(&bb), Status::Running);
            }
            prop_assert_eq!(repeat.tick(&bb), Status::Failure);
        }
    }

    #[test]
    fn prop_utility_ticks_earliest_best(scores in prop::collection::vec(-100.0f32..100.0, 1..10)) {
        let picks = Picks::default();
        let mut sel = scores.iter().enumerate().fold(UtilitySelector::new(), |u, (i, &score)| {
            u.with_child(recorded(i, &picks, Status::Success), move |_bb| score)
        });

        let best = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let expected = scores.iter().position(|&s| s == best);

        prop_assert_eq!(sel.tick(&Blackboard::new()), Status::Success);
        prop_assert_eq!(picks.lock().unwrap().first().copied(), expected);
        prop_assert_eq!(sel.last_choice(), expected);
    }

    #[test]
    fn prop_weighted_skips_zero_weights(
        weights in prop::collection::vec(prop_oneof![Just(0.0f32), 0.1f32..10.0], 1..8),
        seed in any::<u64>(),
    ) {
        prop_assume!(weights.iter().any(|&w| w > 0.0));

        let picks = Picks::default();
        let mut sel = weights
            .iter()
            .enumerate()
            .fold(WeightedRandomSelector::with_seed(seed), |w, (i, &weight)| {
                w.with_child(recorded(i, &picks, Status::Success), weight)
            });

        let bb = Blackboard::new();
        for _ in 0..50 {
            prop_assert_eq!(sel.tick(&bb), Status::Success);
        }
        for &i in picks.lock().unwrap().iter() {
            prop_assert!(weights[i] > 0.0, "drew zero-weight child {}", i);
        }
    }
}
