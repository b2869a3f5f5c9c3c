use bonsai_core::{Blackboard, Status};

use crate::node::{BoxedNode, Node};

/// How many children must report a status for a [`Parallel`] policy to be met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelPolicy {
    /// Every child. Vacuously met by a parallel with no children.
    RequireAll,
    /// At least one child.
    RequireOne,
    /// At least `n` children. `AtLeast(0)` is always met.
    AtLeast(usize),
}

impl ParallelPolicy {
    pub fn is_met(self, count: usize, total: usize) -> bool {
        match self {
            ParallelPolicy::RequireAll => count == total,
            ParallelPolicy::RequireOne => count >= 1,
            ParallelPolicy::AtLeast(n) => count >= n,
        }
    }
}

/// Ticks every child once per tick and aggregates their outcomes.
///
/// Children run one after another inside the same tick; "parallel" describes
/// the aggregation, not threading. No child is skipped because of a sibling's
/// result. Children still `Running` count towards neither tally.
///
/// The success policy is checked before the failure policy, so a tick whose
/// tallies satisfy both succeeds. When neither is met the parallel is `Running`.
/// After a terminal result all children are reset, so the next tick starts a
/// fresh round.
pub struct Parallel {
    children: Vec<BoxedNode>,
    success: ParallelPolicy,
    failure: ParallelPolicy,
    halted: bool,
}

impl Parallel {
    pub fn new(success: ParallelPolicy, failure: ParallelPolicy) -> Self {
        Self::with_children(success, failure, Vec::new())
    }

    pub fn with_children(
        success: ParallelPolicy,
        failure: ParallelPolicy,
        children: Vec<BoxedNode>,
    ) -> Self {
        Self {
            children,
            success,
            failure,
            halted: false,
        }
    }

    pub fn add_child(&mut self, child: impl Node + 'static) {
        self.push(Box::new(child));
    }

    pub fn push(&mut self, child: BoxedNode) {
        self.children.push(child);
    }

    pub fn with_child(mut self, child: impl Node + 'static) -> Self {
        self.add_child(child);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn success_policy(&self) -> ParallelPolicy {
        self.success
    }

    pub fn failure_policy(&self) -> ParallelPolicy {
        self.failure
    }
}

impl Node for Parallel {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        let mut succeeded = 0;
        let mut failed = 0;
        for child in self.children.iter_mut() {
            match child.tick(blackboard) {
                Status::Success => succeeded += 1,
                Status::Failure => failed += 1,
                Status::Running | Status::Idle => {}
            }
        }

        let total = self.children.len();
        let status = if self.success.is_met(succeeded, total) {
            Status::Success
        } else if self.failure.is_met(failed, total) {
            Status::Failure
        } else {
            Status::Running
        };

        if status.is_terminal() {
            self.reset();
        }
        status
    }

    fn reset(&mut self) {
        self.halted = false;
        for c in self.children.iter_mut() {
            c.reset();
        }
    }

    fn halt(&mut self) {
        self.halted = true;
        for c in self.children.iter_mut() {
            c.halt();
        }
    }

    fn is_halted(&self) -> bool {
        self.halted
    }
}
