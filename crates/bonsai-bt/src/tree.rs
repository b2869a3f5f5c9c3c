use std::fmt;
use std::sync::Arc;

use bonsai_core::{Blackboard, Status};

use crate::node::{BoxedNode, Node};

/// A root node bound to the blackboard it runs against.
///
/// This is the unit callers drive: one [`Tree::tick`] per update cycle.
pub struct Tree {
    root: BoxedNode,
    blackboard: Arc<Blackboard>,
    last: Status,
}

impl Tree {
    pub fn new(root: impl Node + 'static) -> Self {
        Self::with_blackboard(root, Arc::new(Blackboard::new()))
    }

    /// Binds `root` to an existing blackboard, e.g. one already shared with
    /// worker threads.
    pub fn with_blackboard(root: impl Node + 'static, blackboard: Arc<Blackboard>) -> Self {
        Self::from_boxed(Box::new(root), blackboard)
    }

    pub(crate) fn from_boxed(root: BoxedNode, blackboard: Arc<Blackboard>) -> Self {
        Self {
            root,
            blackboard,
            last: Status::Idle,
        }
    }

    pub fn tick(&mut self) -> Status {
        let status = self.root.tick(&self.blackboard);
        tracing::trace!(?status, "tree ticked");
        self.last = status;
        status
    }

    pub fn reset(&mut self) {
        self.root.reset();
        self.last = Status::Idle;
    }

    /// Halts the whole tree; every tick fails until [`Tree::reset`].
    pub fn halt(&mut self) {
        self.root.halt();
    }

    pub fn is_halted(&self) -> bool {
        self.root.is_halted()
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    /// A handle to the blackboard for publishers outside the tick loop.
    pub fn shared_blackboard(&self) -> Arc<Blackboard> {
        Arc::clone(&self.blackboard)
    }

    pub fn root(&self) -> &dyn Node {
        &*self.root
    }

    pub fn root_mut(&mut self) -> &mut dyn Node {
        &mut *self.root
    }

    /// Status of the most recent tick; `Idle` before the first tick and after
    /// a reset.
    pub fn last_status(&self) -> Status {
        self.last
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("blackboard", &self.blackboard)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}
