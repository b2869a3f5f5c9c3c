//! Leaf nodes wrapping caller-supplied logic.

use std::fmt;

use bonsai_core::{Blackboard, Status};

use crate::node::Node;

type ActionFn = Box<dyn FnMut(&Blackboard) -> Status + Send>;
type ConditionFn = Box<dyn FnMut(&Blackboard) -> bool + Send>;

/// Runs a caller-supplied function and reports its status unchanged.
///
/// Actions carry no state of their own: `reset` and `halt` are no-ops. Anything
/// the function needs to remember across ticks belongs in its captures or on the
/// blackboard.
pub struct Action {
    func: ActionFn,
}

impl Action {
    pub fn new(func: impl FnMut(&Blackboard) -> Status + Send + 'static) -> Self {
        Self {
            func: Box::new(func),
        }
    }
}

impl Node for Action {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        (self.func)(blackboard)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").finish_non_exhaustive()
    }
}

/// Predicate leaf: `true` is `Success`, `false` is `Failure`. Never `Running`.
pub struct Condition {
    cond: ConditionFn,
}

impl Condition {
    pub fn new(cond: impl FnMut(&Blackboard) -> bool + Send + 'static) -> Self {
        Self {
            cond: Box::new(cond),
        }
    }
}

impl Node for Condition {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        Status::from((self.cond)(blackboard))
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition").finish_non_exhaustive()
    }
}
