//! Behavior tree runtime built on `bonsai-core`.
//!
//! A [`Tree`] owns a root [`Node`] and a [`Blackboard`]. Each call to
//! [`Tree::tick`] walks the tree once: composites decide which children run,
//! decorators rewrite their child's [`Status`], and leaves ([`Action`],
//! [`Condition`]) run caller logic against the blackboard. Nodes that need more
//! than one tick return `Running` and are resumed on the next tick.
//!
//! Nothing here spawns threads or blocks. Cancellation is cooperative through
//! [`Node::halt`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod builder;
pub mod composite;
pub mod decorator;
pub mod error;
pub mod leaf;
pub mod node;
pub mod parallel;
pub mod selection;
pub mod tree;

pub use bonsai_core::{
    BbKey, Blackboard, Clock, DeterministicRng, ManualClock, MonotonicClock, SplitMix64, Status,
};
pub use builder::Builder;
pub use composite::{ReactiveSelector, ReactiveSequence, Selector, Sequence};
pub use decorator::{Decorator, Transform};
pub use error::{BuildError, Result};
pub use leaf::{Action, Condition};
pub use node::{BoxedNode, Node};
pub use parallel::{Parallel, ParallelPolicy};
pub use selection::{
    SwitchPolicy, UtilityConfig, UtilitySelector, Weight, WeightedConfig, WeightedRandomSelector,
    ZeroWeightPolicy,
};
pub use tree::Tree;
