use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bonsai_bt::{Action, Blackboard, Node, Parallel, ParallelPolicy, Status};

fn fixed(status: Status) -> Action {
    Action::new(move |_bb| status)
}

fn counted(status: Status, ticks: &Arc<AtomicUsize>) -> Action {
    let ticks = Arc::clone(ticks);
    Action::new(move |_bb| {
        ticks.fetch_add(1, Ordering::SeqCst);
        status
    })
}

fn parallel(success: ParallelPolicy, failure: ParallelPolicy, children: &[Status]) -> Parallel {
    children
        .iter()
        .fold(Parallel::new(success, failure), |p, s| p.with_child(fixed(*s)))
}

#[test]
fn require_all_success_with_one_failure_fails() {
    use ParallelPolicy::*;
    let mut p = parallel(
        RequireAll,
        RequireOne,
        &[Status::Success, Status::Success, Status::Failure],
    );
    assert_eq!(p.tick(&Blackboard::new()), Status::Failure);
}

#[test]
fn require_one_success_beats_failures() {
    use ParallelPolicy::*;
    let mut p = parallel(
        RequireOne,
        RequireAll,
        &[Status::Success, Status::Failure, Status::Failure],
    );
    assert_eq!(p.tick(&Blackboard::new()), Status::Success);
}

#[test]
fn success_policy_is_checked_first() {
    use ParallelPolicy::*;
    let mut p = parallel(RequireOne, RequireOne, &[Status::Failure, Status::Success]);
    assert_eq!(p.tick(&Blackboard::new()), Status::Success);
}

#[test]
fn running_children_keep_parallel_running() {
    use ParallelPolicy::*;
    let mut p = parallel(RequireAll, RequireAll, &[Status::Success, Status::Running]);
    assert_eq!(p.tick(&Blackboard::new()), Status::Running);
}

#[test]
fn every_child_is_ticked_even_after_a_failure() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let mut p = Parallel::new(ParallelPolicy::RequireAll, ParallelPolicy::RequireOne)
        .with_child(counted(Status::Failure, &ticks))
        .with_child(counted(Status::Success, &ticks))
        .with_child(counted(Status::Running, &ticks));

    assert_eq!(p.tick(&Blackboard::new()), Status::Failure);
    assert_eq!(ticks.load(Ordering::SeqCst), 3);
}

#[test]
fn at_least_counts_towards_threshold() {
    use ParallelPolicy::*;
    let children = [Status::Success, Status::Success, Status::Running, Status::Failure];

    let mut two = parallel(AtLeast(2), RequireAll, &children);
    assert_eq!(two.tick(&Blackboard::new()), Status::Success);

    let mut three = parallel(AtLeast(3), AtLeast(2), &children);
    assert_eq!(three.tick(&Blackboard::new()), Status::Running);

    let mut fail = parallel(AtLeast(3), AtLeast(1), &children);
    assert_eq!(fail.tick(&Blackboard::new()), Status::Failure);
}

#[test]
fn empty_parallel_with_require_all_succeeds() {
    let mut p = Parallel::new(ParallelPolicy::RequireAll, ParallelPolicy::RequireOne);
    assert!(p.is_empty());
    assert_eq!(p.tick(&Blackboard::new()), Status::Success);
}

#[test]
fn terminal_result_resets_children_for_next_round() {
    // Child succeeds on its second tick of each round.
    let ticks = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&ticks);
    let slow = Action::new(move |_bb| {
        if seen.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
            Status::Success
        } else {
            Status::Running
        }
    });

    let mut p = Parallel::new(ParallelPolicy::RequireAll, ParallelPolicy::RequireOne)
        .with_child(slow)
        .with_child(fixed(Status::Success));

    let bb = Blackboard::new();
    assert_eq!(p.tick(&bb), Status::Running);
    assert_eq!(p.tick(&bb), Status::Success);
    assert_eq!(p.tick(&bb), Status::Running);
    assert_eq!(p.tick(&bb), Status::Success);
}

#[test]
fn halted_parallel_fails_until_reset() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let mut p = Parallel::new(ParallelPolicy::RequireAll, ParallelPolicy::RequireOne)
        .with_child(counted(Status::Running, &ticks));

    let bb = Blackboard::new();
    assert_eq!(p.tick(&bb), Status::Running);
    p.halt();
    assert!(p.is_halted());
    assert_eq!(p.tick(&bb), Status::Failure);
    assert_eq!(ticks.load(Ordering::SeqCst), 1);

    p.reset();
    assert_eq!(p.tick(&bb), Status::Running);
    assert_eq!(ticks.load(Ordering::SeqCst), 2);
}

#[test]
fn policy_accessors() {
    let p = Parallel::new(ParallelPolicy::AtLeast(2), ParallelPolicy::RequireAll);
    assert_eq!(p.success_policy(), ParallelPolicy::AtLeast(2));
    assert_eq!(p.failure_policy(), ParallelPolicy::RequireAll);
    assert!(ParallelPolicy::AtLeast(0).is_met(0, 5));
    assert!(ParallelPolicy::RequireAll.is_met(0, 0));
    assert!(!ParallelPolicy::RequireOne.is_met(0, 0));
}
