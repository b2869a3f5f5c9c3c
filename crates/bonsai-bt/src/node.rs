use bonsai_core::{Blackboard, Status};

/// An executable unit of a behavior tree.
///
/// Nodes are stateful: composites keep a cursor, decorators keep counters and
/// timestamps. That state is what lets a node return [`Status::Running`] and
/// pick up where it left off on the next tick, and it is what [`Node::reset`]
/// and [`Node::halt`] must clear.
pub trait Node: Send {
    fn tick(&mut self, blackboard: &Blackboard) -> Status;

    /// Returns the node (and its subtree) to its initial state and clears the
    /// halted flag.
    fn reset(&mut self) {}

    /// Cooperative cancellation. A halted node (and its subtree) short-circuits
    /// to `Failure` on every tick until [`Node::reset`]. Does not interrupt a
    /// tick already in progress.
    fn halt(&mut self) {}

    fn is_halted(&self) -> bool {
        false
    }
}

pub type BoxedNode = Box<dyn Node>;

impl Node for Box<dyn Node> {
    #[inline]
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        (**self).tick(blackboard)
    }

    #[inline]
    fn reset(&mut self) {
        (**self).reset()
    }

    #[inline]
    fn halt(&mut self) {
        (**self).halt()
    }

    #[inline]
    fn is_halted(&self) -> bool {
        (**self).is_halted()
    }
}
