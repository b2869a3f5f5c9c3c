//! Fluent tree construction.
//!
//! The builder turns a linear declaration into a node graph:
//!
//! ```rust
//! use bonsai_bt::{Builder, Status};
//!
//! let mut tree = Builder::new()
//!     .sequence()
//!         .condition(|bb| bb.get::<bool>("enemy_visible").unwrap_or(false))
//!         .inverter()
//!         .action(|_bb| Status::Failure)
//!     .end()
//!     .build()
//!     .unwrap();
//!
//! tree.blackboard().set("enemy_visible", true);
//! assert_eq!(tree.tick(), Status::Success);
//! ```
//!
//! Open composites are tracked on an explicit stack; children attach to the
//! innermost open composite. Decorators declared before a node wrap that node
//! (the first declared is outermost). For a composite, they wrap it once it is
//! closed with [`Builder::end`].
//!
//! Construction errors do not panic: the first one is recorded and returned by
//! [`Builder::build`].

use std::mem;
use std::sync::Arc;

use bonsai_core::rng::derive_seed;
use bonsai_core::{Blackboard, Clock, MonotonicClock, SplitMix64, Status, DEFAULT_SEED};

use crate::composite::{ReactiveSelector, ReactiveSequence, Selector, Sequence};
use crate::decorator::{Decorator, Transform};
use crate::error::{BuildError, Result};
use crate::leaf::{Action, Condition};
use crate::node::{BoxedNode, Node};
use crate::parallel::{Parallel, ParallelPolicy};
use crate::selection::{
    ScoreFn, UtilityConfig, UtilitySelector, Weight, WeightedConfig, WeightedRandomSelector,
};
use crate::tree::Tree;

enum Score {
    Utility(ScoreFn),
    Weight(Weight),
}

enum Composite {
    Sequence(Sequence),
    Selector(Selector),
    ReactiveSequence(ReactiveSequence),
    ReactiveSelector(ReactiveSelector),
    Parallel(Parallel),
    Utility(UtilitySelector),
    Weighted(WeightedRandomSelector),
}

impl Composite {
    fn name(&self) -> &'static str {
        match self {
            Composite::Sequence(_) => "Sequence",
            Composite::Selector(_) => "Selector",
            Composite::ReactiveSequence(_) => "ReactiveSequence",
            Composite::ReactiveSelector(_) => "ReactiveSelector",
            Composite::Parallel(_) => "Parallel",
            Composite::Utility(_) => "UtilitySelector",
            Composite::Weighted(_) => "WeightedRandomSelector",
        }
    }

    fn attach(&mut self, node: BoxedNode, score: Option<Score>) -> Result<()> {
        let name = self.name();
        match (self, score) {
            (Composite::Utility(u), Some(Score::Utility(f))) => u.push(node, f),
            (Composite::Weighted(w), Some(Score::Weight(weight))) => w.push(node, weight),
            (Composite::Utility(_) | Composite::Weighted(_), _) => {
                return Err(BuildError::MissingScore { composite: name })
            }
            (_, Some(_)) => return Err(BuildError::MisplacedScore),
            (Composite::Sequence(c), None) => c.push(node),
            (Composite::Selector(c), None) => c.push(node),
            (Composite::ReactiveSequence(c), None) => c.push(node),
            (Composite::ReactiveSelector(c), None) => c.push(node),
            (Composite::Parallel(c), None) => c.push(node),
        }
        Ok(())
    }

    fn into_node(self) -> BoxedNode {
        match self {
            Composite::Sequence(c) => Box::new(c),
            Composite::Selector(c) => Box::new(c),
            Composite::ReactiveSequence(c) => Box::new(c),
            Composite::ReactiveSelector(c) => Box::new(c),
            Composite::Parallel(c) => Box::new(c),
            Composite::Utility(c) => Box::new(c),
            Composite::Weighted(c) => Box::new(c),
        }
    }
}

struct Open {
    composite: Composite,
    decorators: Vec<Transform>,
    score: Option<Score>,
}

pub struct Builder {
    root: Option<BoxedNode>,
    stack: Vec<Open>,
    pending: Vec<Transform>,
    pending_score: Option<Score>,
    clock: Arc<dyn Clock>,
    seed: u64,
    streams: u64,
    blackboard: Option<Arc<Blackboard>>,
    error: Option<BuildError>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            root: None,
            stack: Vec::new(),
            pending: Vec::new(),
            pending_score: None,
            clock: Arc::new(MonotonicClock::new()),
            seed: DEFAULT_SEED,
            streams: 0,
            blackboard: None,
            error: None,
        }
    }

    /// Clock used by `timeout` and `cooldown` decorators declared after this call.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Seed for weighted selectors declared after this call. Each selector draws
    /// from its own stream derived from the seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.streams = 0;
        self
    }

    /// Blackboard the built tree is bound to. A fresh one is created otherwise.
    pub fn blackboard(mut self, blackboard: Arc<Blackboard>) -> Self {
        self.blackboard = Some(blackboard);
        self
    }

    pub fn sequence(self) -> Self {
        self.open(Composite::Sequence(Sequence::default()))
    }

    pub fn selector(self) -> Self {
        self.open(Composite::Selector(Selector::default()))
    }

    pub fn reactive_sequence(self) -> Self {
        self.open(Composite::ReactiveSequence(ReactiveSequence::default()))
    }

    pub fn reactive_selector(self) -> Self {
        self.open(Composite::ReactiveSelector(ReactiveSelector::default()))
    }

    pub fn parallel(self, success: ParallelPolicy, failure: ParallelPolicy) -> Self {
        self.open(Composite::Parallel(Parallel::new(success, failure)))
    }

    /// Opens a utility selector. Every child must be preceded by [`Builder::utility`].
    pub fn utility_selector(self) -> Self {
        self.utility_selector_with(UtilityConfig::default())
    }

    pub fn utility_selector_with(self, config: UtilityConfig) -> Self {
        self.open(Composite::Utility(UtilitySelector::new().with_config(config)))
    }

    /// Opens a weighted random selector. Every child must be preceded by
    /// [`Builder::weight`].
    pub fn weighted_selector(self) -> Self {
        self.weighted_selector_with(WeightedConfig::default())
    }

    pub fn weighted_selector_with(mut self, config: WeightedConfig) -> Self {
        let rng = SplitMix64::new(derive_seed(self.seed, self.streams));
        self.streams += 1;
        self.open(Composite::Weighted(
            WeightedRandomSelector::with_rng(rng).with_config(config),
        ))
    }

    /// Utility score for the next child of the enclosing utility selector.
    pub fn utility(mut self, score: impl FnMut(&Blackboard) -> f32 + Send + 'static) -> Self {
        self.set_score(Score::Utility(Box::new(score)));
        self
    }

    /// Weight for the next child of the enclosing weighted selector.
    pub fn weight(mut self, weight: impl Into<Weight>) -> Self {
        self.set_score(Score::Weight(weight.into()));
        self
    }

    /// Closes the innermost open composite.
    pub fn end(mut self) -> Self {
        if self.error.is_some() {
            return self;
        }
        let Some(open) = self.stack.pop() else {
            self.fail(BuildError::UnbalancedEnd);
            return self;
        };
        let node = wrap(open.composite.into_node(), open.decorators);
        self.attach(node, open.score);
        self
    }

    pub fn action(self, f: impl FnMut(&Blackboard) -> Status + Send + 'static) -> Self {
        self.leaf(Box::new(Action::new(f)))
    }

    pub fn condition(self, f: impl FnMut(&Blackboard) -> bool + Send + 'static) -> Self {
        self.leaf(Box::new(Condition::new(f)))
    }

    /// Attaches a prebuilt node (any [`Node`] implementation) as a leaf.
    pub fn node(self, node: impl Node + 'static) -> Self {
        self.leaf(Box::new(node))
    }

    /// Queues a decorator for the next declared node.
    pub fn decorator(mut self, transform: Transform) -> Self {
        self.pending.push(transform);
        self
    }

    pub fn inverter(self) -> Self {
        self.decorator(Transform::Inverter)
    }

    pub fn succeeder(self) -> Self {
        self.decorator(Transform::Succeeder)
    }

    pub fn failer(self) -> Self {
        self.decorator(Transform::Failer)
    }

    /// `times <= 0` is unbounded.
    pub fn repeat(self, times: i32) -> Self {
        self.decorator(Transform::repeat(times))
    }

    /// `times <= 0` is unbounded.
    pub fn retry(self, times: i32) -> Self {
        self.decorator(Transform::retry(times))
    }

    pub fn timeout(self, secs: f32) -> Self {
        let clock = Arc::clone(&self.clock);
        self.decorator(Transform::timeout_secs(secs, clock))
    }

    pub fn cooldown(self, secs: f32) -> Self {
        let clock = Arc::clone(&self.clock);
        self.decorator(Transform::cooldown_secs(secs, clock))
    }

    pub fn build(self) -> Result<Tree> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.stack.is_empty() {
            return Err(BuildError::UnclosedComposite {
                depth: self.stack.len(),
            });
        }
        if !self.pending.is_empty() {
            return Err(BuildError::DanglingDecorator {
                count: self.pending.len(),
            });
        }
        if self.pending_score.is_some() {
            return Err(BuildError::MisplacedScore);
        }
        let root = self.root.ok_or(BuildError::NoRoot)?;
        let blackboard = self
            .blackboard
            .unwrap_or_else(|| Arc::new(Blackboard::new()));
        Ok(Tree::from_boxed(root, blackboard))
    }

    fn open(mut self, composite: Composite) -> Self {
        if self.error.is_some() {
            return self;
        }
        if self.stack.is_empty() && self.root.is_some() {
            self.fail(BuildError::RootAlreadySet);
            return self;
        }
        self.stack.push(Open {
            composite,
            decorators: mem::take(&mut self.pending),
            score: self.pending_score.take(),
        });
        self
    }

    fn leaf(mut self, node: BoxedNode) -> Self {
        if self.error.is_some() {
            return self;
        }
        let node = wrap(node, mem::take(&mut self.pending));
        let score = self.pending_score.take();
        self.attach(node, score);
        self
    }

    fn attach(&mut self, node: BoxedNode, score: Option<Score>) {
        let result = match self.stack.last_mut() {
            Some(parent) => parent.composite.attach(node, score),
            None if score.is_some() => Err(BuildError::MisplacedScore),
            None if self.root.is_some() => Err(BuildError::RootAlreadySet),
            None => {
                self.root = Some(node);
                Ok(())
            }
        };
        if let Err(err) = result {
            self.fail(err);
        }
    }

    fn set_score(&mut self, score: Score) {
        if self.pending_score.is_some() {
            self.fail(BuildError::MisplacedScore);
            return;
        }
        self.pending_score = Some(score);
    }

    fn fail(&mut self, err: BuildError) {
        tracing::debug!(error = %err, "tree construction error");
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

fn wrap(node: BoxedNode, decorators: Vec<Transform>) -> BoxedNode {
    decorators
        .into_iter()
        .rev()
        .fold(node, |child, transform| -> BoxedNode {
            Box::new(Decorator::boxed(child, transform))
        })
}
