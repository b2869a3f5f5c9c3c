//! Score-driven selection: pick one child per tick by utility or by weighted draw.
//!
//! Neither selector remembers its previous choice when deciding; every tick
//! re-scores. What they do remember is which child they ticked last, so that a
//! child abandoned mid-run can be halted (see [`SwitchPolicy`]).

use std::fmt;

use bonsai_core::{Blackboard, DeterministicRng, SplitMix64, Status};

use crate::node::{BoxedNode, Node};

/// Scores a child against the current blackboard.
pub type ScoreFn = Box<dyn FnMut(&Blackboard) -> f32 + Send>;

/// What to do when a selector ticks a different child than on its previous tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchPolicy {
    /// Halt the previous child if it was still `Running`, and reset the newly
    /// chosen child before ticking it so it starts from a clean state. A tick
    /// that fails without choosing anyone also halts a still-running child.
    #[default]
    HaltPrevious,
    /// Leave both children untouched. A previously running child resumes where
    /// it stopped if it is chosen again later.
    Keep,
}

/// Which child was ticked last and what it returned.
#[derive(Debug, Clone, Copy, Default)]
enum LastTicked {
    #[default]
    Nothing,
    Ticked(usize, Status),
    /// The selector failed without ticking anyone after `index` had been
    /// ticked. `halted` is set when that child was halted on the way out.
    Abandoned { index: usize, halted: bool },
}

impl LastTicked {
    fn index(&self) -> Option<usize> {
        match *self {
            LastTicked::Ticked(i, _) => Some(i),
            _ => None,
        }
    }

    fn switch_to<C>(
        &mut self,
        children: &mut [C],
        node: fn(&mut C) -> &mut BoxedNode,
        next: usize,
        policy: SwitchPolicy,
    ) {
        if policy == SwitchPolicy::Keep {
            return;
        }
        match *self {
            LastTicked::Nothing => {}
            LastTicked::Ticked(prev, _) if prev == next => {}
            LastTicked::Ticked(prev, status) => {
                if status.is_running() {
                    tracing::debug!(from = prev, to = next, "selector abandons running child");
                    node(&mut children[prev]).halt();
                }
                node(&mut children[next]).reset();
            }
            LastTicked::Abandoned { index, halted } => {
                if halted || index != next {
                    node(&mut children[next]).reset();
                }
            }
        }
    }

    /// Called when a tick fails without ticking any child.
    fn abandon<C>(
        &mut self,
        children: &mut [C],
        node: fn(&mut C) -> &mut BoxedNode,
        policy: SwitchPolicy,
    ) {
        let LastTicked::Ticked(prev, status) = *self else {
            return;
        };
        let halted = policy == SwitchPolicy::HaltPrevious && status.is_running();
        if halted {
            tracing::debug!(from = prev, "selector abandons running child without a successor");
            node(&mut children[prev]).halt();
        }
        *self = LastTicked::Abandoned {
            index: prev,
            halted,
        };
    }

    fn record(&mut self, index: usize, status: Status) {
        *self = LastTicked::Ticked(index, status);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilityConfig {
    /// Minimum score the best child needs to be ticked. Below it, the selector
    /// fails without ticking anything.
    pub min_score: f32,
    pub switch: SwitchPolicy,
}

impl Default for UtilityConfig {
    fn default() -> Self {
        Self {
            min_score: f32::NEG_INFINITY,
            switch: SwitchPolicy::default(),
        }
    }
}

struct UtilityChild {
    node: BoxedNode,
    score: ScoreFn,
}

impl UtilityChild {
    fn node(&mut self) -> &mut BoxedNode {
        &mut self.node
    }

    fn score(&mut self, blackboard: &Blackboard) -> f32 {
        let s = (self.score)(blackboard);
        if s.is_nan() {
            tracing::warn!("utility score is NaN; treating as -inf");
            f32::NEG_INFINITY
        } else {
            s
        }
    }
}

/// Ticks the single child with the highest utility score.
///
/// Each tick:
/// - Scores every child against the blackboard (NaN counts as `-inf`).
/// - Picks the highest score; ties go to the earliest registered child.
/// - Ticks only that child and returns its status as-is.
/// - Fails when there are no children or the best score is below `min_score`.
///   With the default `min_score` of `-inf` some child is always ticked, even
///   when every score is `-inf`.
pub struct UtilitySelector {
    children: Vec<UtilityChild>,
    config: UtilityConfig,
    last: LastTicked,
    last_best_score: f32,
    halted: bool,
}

impl UtilitySelector {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            config: UtilityConfig::default(),
            last: LastTicked::default(),
            last_best_score: f32::NEG_INFINITY,
            halted: false,
        }
    }

    pub fn with_config(mut self, config: UtilityConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_child(
        &mut self,
        child: impl Node + 'static,
        score: impl FnMut(&Blackboard) -> f32 + Send + 'static,
    ) {
        self.push(Box::new(child), Box::new(score));
    }

    pub fn push(&mut self, node: BoxedNode, score: ScoreFn) {
        self.children.push(UtilityChild { node, score });
    }

    pub fn with_child(
        mut self,
        child: impl Node + 'static,
        score: impl FnMut(&Blackboard) -> f32 + Send + 'static,
    ) -> Self {
        self.add_child(child, score);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child ticked on the most recent tick, if any.
    pub fn last_choice(&self) -> Option<usize> {
        self.last.index()
    }

    pub fn last_best_score(&self) -> f32 {
        self.last_best_score
    }
}

impl Default for UtilitySelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for UtilitySelector {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        let mut best: Option<(usize, f32)> = None;
        for (i, child) in self.children.iter_mut().enumerate() {
            let score = child.score(blackboard);
            if best.is_none_or(|(_, b)| score > b) {
                best = Some((i, score));
            }
        }

        let Some((best_idx, best_score)) = best else {
            self.last_best_score = f32::NEG_INFINITY;
            return Status::Failure;
        };
        self.last_best_score = best_score;
        if best_score < self.config.min_score {
            self.last.abandon(&mut self.children, UtilityChild::node, self.config.switch);
            return Status::Failure;
        }

        self.last.switch_to(
            &mut self.children,
            UtilityChild::node,
            best_idx,
            self.config.switch,
        );
        let status = self.children[best_idx].node.tick(blackboard);
        self.last.record(best_idx, status);
        status
    }

    fn reset(&mut self) {
        self.halted = false;
        self.last = LastTicked::default();
        self.last_best_score = f32::NEG_INFINITY;
        for c in self.children.iter_mut() {
            c.node.reset();
        }
    }

    fn halt(&mut self) {
        self.halted = true;
        for c in self.children.iter_mut() {
            c.node.halt();
        }
    }

    fn is_halted(&self) -> bool {
        self.halted
    }
}

impl fmt::Debug for UtilitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UtilitySelector")
            .field("children", &self.children.len())
            .field("config", &self.config)
            .field("last_choice", &self.last.index())
            .finish()
    }
}

/// Selection weight of one [`WeightedRandomSelector`] child.
///
/// Negative, NaN and infinite weights count as zero. A zero weight excludes the
/// child from the draw.
pub enum Weight {
    Fixed(f32),
    Dynamic(ScoreFn),
}

impl Weight {
    pub fn dynamic(f: impl FnMut(&Blackboard) -> f32 + Send + 'static) -> Self {
        Weight::Dynamic(Box::new(f))
    }

    fn resolve(&mut self, blackboard: &Blackboard) -> f32 {
        let w = match self {
            Weight::Fixed(w) => *w,
            Weight::Dynamic(f) => f(blackboard),
        };
        if w.is_finite() && w > 0.0 {
            w
        } else {
            0.0
        }
    }
}

impl From<f32> for Weight {
    fn from(value: f32) -> Self {
        Weight::Fixed(value)
    }
}

impl fmt::Debug for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::Fixed(w) => f.debug_tuple("Fixed").field(w).finish(),
            Weight::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Behavior of a [`WeightedRandomSelector`] whose weights sum to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroWeightPolicy {
    /// Fail the tick without ticking any child.
    #[default]
    Fail,
    /// Draw uniformly among all children.
    Uniform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeightedConfig {
    pub zero_weight: ZeroWeightPolicy,
    pub switch: SwitchPolicy,
}

struct WeightedChild {
    node: BoxedNode,
    weight: Weight,
}

impl WeightedChild {
    fn node(&mut self) -> &mut BoxedNode {
        &mut self.node
    }
}

/// Ticks one child drawn at random, with probability proportional to its weight.
///
/// The random source is injected so that draws are reproducible; by default
/// it is a [`SplitMix64`] with a fixed seed.
pub struct WeightedRandomSelector {
    children: Vec<WeightedChild>,
    config: WeightedConfig,
    rng: Box<dyn DeterministicRng + Send>,
    weights: Vec<f32>,
    last: LastTicked,
    halted: bool,
}

impl WeightedRandomSelector {
    pub fn new() -> Self {
        Self::with_rng(SplitMix64::default())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SplitMix64::new(seed))
    }

    pub fn with_rng(rng: impl DeterministicRng + Send + 'static) -> Self {
        Self {
            children: Vec::new(),
            config: WeightedConfig::default(),
            rng: Box::new(rng),
            weights: Vec::new(),
            last: LastTicked::default(),
            halted: false,
        }
    }

    pub fn with_config(mut self, config: WeightedConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_child(&mut self, child: impl Node + 'static, weight: impl Into<Weight>) {
        self.push(Box::new(child), weight.into());
    }

    pub fn push(&mut self, node: BoxedNode, weight: Weight) {
        self.children.push(WeightedChild { node, weight });
    }

    pub fn with_child(mut self, child: impl Node + 'static, weight: impl Into<Weight>) -> Self {
        self.add_child(child, weight);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn last_choice(&self) -> Option<usize> {
        self.last.index()
    }

    fn draw(&mut self, blackboard: &Blackboard) -> Option<usize> {
        self.weights.clear();
        for child in self.children.iter_mut() {
            self.weights.push(child.weight.resolve(blackboard));
        }
        let total: f32 = self.weights.iter().sum();

        if total <= 0.0 {
            return match self.config.zero_weight {
                ZeroWeightPolicy::Fail => {
                    tracing::warn!(
                        children = self.children.len(),
                        "weighted selector has zero total weight"
                    );
                    None
                }
                ZeroWeightPolicy::Uniform => {
                    let n = self.children.len() as u64;
                    Some((self.rng.next_u64() % n) as usize)
                }
            };
        }

        let target = self.rng.next_f32_unit() * total;
        let mut acc = 0.0;
        let mut last_positive = None;
        for (i, &w) in self.weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            acc += w;
            last_positive = Some(i);
            if target < acc {
                return Some(i);
            }
        }
        // Rounding can leave `target` at or just above the accumulated total.
        last_positive
    }
}

impl Default for WeightedRandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for WeightedRandomSelector {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted || self.children.is_empty() {
            return Status::Failure;
        }

        let Some(chosen) = self.draw(blackboard) else {
            self.last.abandon(&mut self.children, WeightedChild::node, self.config.switch);
            return Status::Failure;
        };

        self.last.switch_to(
            &mut self.children,
            WeightedChild::node,
            chosen,
            self.config.switch,
        );
        let status = self.children[chosen].node.tick(blackboard);
        self.last.record(chosen, status);
        status
    }

    fn reset(&mut self) {
        self.halted = false;
        self.last = LastTicked::default();
        for c in self.children.iter_mut() {
            c.node.reset();
        }
    }

    fn halt(&mut self) {
        self.halted = true;
        for c in self.children.iter_mut() {
            c.node.halt();
        }
    }

    fn is_halted(&self) -> bool {
        self.halted
    }
}

impl fmt::Debug for WeightedRandomSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedRandomSelector")
            .field("children", &self.children.len())
            .field("config", &self.config)
            .field("last_choice", &self.last.index())
            .finish()
    }
}
