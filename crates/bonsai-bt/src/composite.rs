//! Ordered control-flow composites.
//!
//! [`Sequence`] and [`Selector`] are "memory" composites: a child that returns
//! `Running` is resumed directly on the next tick, without re-checking the
//! children before it. [`ReactiveSequence`] and [`ReactiveSelector`] restart from
//! the first child every tick, so earlier conditions can abort running work.

use bonsai_core::{Blackboard, Status};

use crate::node::{BoxedNode, Node};

macro_rules! child_list {
    ($ty:ident) => {
        impl $ty {
            /// Appends a child. Children are ticked in append order.
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
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new(Vec::new())
            }
        }
    };
}

/// Ticks children left to right until one fails (logical AND).
///
/// - `Running`: returned immediately; the same child is ticked first next time.
/// - `Failure`: the sequence resets and fails.
/// - `Success` (or `Idle`): advance to the next child.
///
/// When every child has succeeded the sequence resets and succeeds. An empty
/// sequence succeeds.
pub struct Sequence {
    children: Vec<BoxedNode>,
    index: usize,
    halted: bool,
}

impl Sequence {
    pub fn new(children: Vec<BoxedNode>) -> Self {
        Self {
            children,
            index: 0,
            halted: false,
        }
    }

    /// Index of the child the next tick starts from.
    pub fn cursor(&self) -> usize {
        self.index
    }
}

child_list!(Sequence);

impl Node for Sequence {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        while self.index < self.children.len() {
            match self.children[self.index].tick(blackboard) {
                Status::Running => return Status::Running,
                Status::Failure => {
                    self.reset();
                    return Status::Failure;
                }
                Status::Success | Status::Idle => self.index += 1,
            }
        }

        self.reset();
        Status::Success
    }

    fn reset(&mut self) {
        self.index = 0;
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

/// Ticks children left to right until one succeeds (priority fallback).
///
/// Mirror image of [`Sequence`]: `Success` resets and succeeds, `Failure` (or
/// `Idle`) advances, exhausting all children resets and fails. An empty selector
/// fails.
pub struct Selector {
    children: Vec<BoxedNode>,
    index: usize,
    halted: bool,
}

impl Selector {
    pub fn new(children: Vec<BoxedNode>) -> Self {
        Self {
            children,
            index: 0,
            halted: false,
        }
    }

    pub fn cursor(&self) -> usize {
        self.index
    }
}

child_list!(Selector);

impl Node for Selector {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        while self.index < self.children.len() {
            match self.children[self.index].tick(blackboard) {
                Status::Running => return Status::Running,
                Status::Success => {
                    self.reset();
                    return Status::Success;
                }
                Status::Failure | Status::Idle => self.index += 1,
            }
        }

        self.reset();
        Status::Failure
    }

    fn reset(&mut self) {
        self.index = 0;
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

/// Sequence that re-evaluates every child from the start on each tick.
///
/// If a different child ends up `Running` than on the previous tick, the
/// previously running child is reset.
pub struct ReactiveSequence {
    children: Vec<BoxedNode>,
    running: Option<usize>,
    halted: bool,
}

impl ReactiveSequence {
    pub fn new(children: Vec<BoxedNode>) -> Self {
        Self {
            children,
            running: None,
            halted: false,
        }
    }
}

child_list!(ReactiveSequence);

impl Node for ReactiveSequence {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        for i in 0..self.children.len() {
            match self.children[i].tick(blackboard) {
                Status::Failure => {
                    self.reset();
                    return Status::Failure;
                }
                Status::Running => {
                    track_running(&mut self.children, &mut self.running, i);
                    return Status::Running;
                }
                Status::Success | Status::Idle => continue,
            }
        }

        self.reset();
        Status::Success
    }

    fn reset(&mut self) {
        self.running = None;
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

/// Selector that re-evaluates every child from the start on each tick.
///
/// A higher-priority child that starts succeeding or running preempts a lower
/// one; the preempted child is reset.
pub struct ReactiveSelector {
    children: Vec<BoxedNode>,
    running: Option<usize>,
    halted: bool,
}

impl ReactiveSelector {
    pub fn new(children: Vec<BoxedNode>) -> Self {
        Self {
            children,
            running: None,
            halted: false,
        }
    }
}

child_list!(ReactiveSelector);

impl Node for ReactiveSelector {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        for i in 0..self.children.len() {
            match self.children[i].tick(blackboard) {
                Status::Success => {
                    self.reset();
                    return Status::Success;
                }
                Status::Running => {
                    track_running(&mut self.children, &mut self.running, i);
                    return Status::Running;
                }
                Status::Failure | Status::Idle => continue,
            }
        }

        self.reset();
        Status::Failure
    }

    fn reset(&mut self) {
        self.running = None;
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

fn track_running(children: &mut [BoxedNode], running: &mut Option<usize>, now: usize) {
    if *running != Some(now) {
        if let Some(prev) = *running {
            children[prev].reset();
        }
        *running = Some(now);
    }
}
