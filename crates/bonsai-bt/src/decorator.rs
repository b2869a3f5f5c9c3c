//! Single-child decorators.
//!
//! A [`Decorator`] ticks its child and passes the result through a [`Transform`].
//! Stateful transforms (repeat/retry counters, timeout and cooldown timestamps)
//! keep their state inside the transform value, which the decorator owns, so
//! `reset` and `halt` can clear it deterministically.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bonsai_core::{Blackboard, Clock, Status};

use crate::node::{BoxedNode, Node};

pub type TransformFn = Box<dyn FnMut(Status) -> Status + Send>;

/// Attempt counter shared by [`Transform::Repeat`] and [`Transform::Retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempts {
    limit: Option<u32>,
    count: u32,
}

impl Attempts {
    /// `limit <= 0` means unbounded.
    pub fn new(limit: i32) -> Self {
        Self {
            limit: u32::try_from(limit).ok().filter(|&n| n > 0),
            count: 0,
        }
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Failures observed in the current cycle.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns `Failure` when the limit is reached (and clears the counter),
    /// `Running` otherwise.
    fn on_failure(&mut self) -> Status {
        self.count = self.count.saturating_add(1);
        match self.limit {
            Some(limit) if self.count >= limit => {
                tracing::debug!(attempts = self.count, "giving up after repeated failures");
                self.count = 0;
                Status::Failure
            }
            _ => Status::Running,
        }
    }
}

pub struct Timer {
    limit: Duration,
    started: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl Timer {
    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn is_started(&self) -> bool {
        self.started.is_some()
    }
}

pub struct Gate {
    period: Duration,
    last_success: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl Gate {
    pub fn period(&self) -> Duration {
        self.period
    }

    /// `true` while inside the cooldown window of the last recorded success.
    pub fn is_closed(&self) -> bool {
        self.last_success
            .is_some_and(|last| self.clock.now().saturating_sub(last) < self.period)
    }
}

/// Status transformation applied by a [`Decorator`].
///
/// | transform | behavior |
/// |---|---|
/// | `Inverter` | swaps `Success` and `Failure`; `Running` unchanged |
/// | `Succeeder` | any terminal status becomes `Success` |
/// | `Failer` | any terminal status becomes `Failure` |
/// | `Repeat` | `Success` clears the counter and succeeds; `Failure` counts an attempt and is reported as `Running` until the limit, then `Failure` |
/// | `Retry` | like `Repeat`, and resets the child after every intermediate failure |
/// | `Timeout` | `Failure` once the child has been busy for `limit` since it started; the child is reset |
/// | `Cooldown` | after a child success, fails without ticking the child until `period` has passed |
/// | `Custom` | caller-supplied function |
pub enum Transform {
    Inverter,
    Succeeder,
    Failer,
    Repeat(Attempts),
    Retry(Attempts),
    Timeout(Timer),
    Cooldown(Gate),
    Custom(TransformFn),
}

impl Transform {
    /// `limit <= 0` retries failures forever.
    pub fn repeat(limit: i32) -> Self {
        Transform::Repeat(Attempts::new(limit))
    }

    /// `limit <= 0` retries failures forever.
    pub fn retry(limit: i32) -> Self {
        Transform::Retry(Attempts::new(limit))
    }

    pub fn timeout(limit: Duration, clock: Arc<dyn Clock>) -> Self {
        Transform::Timeout(Timer {
            limit,
            started: None,
            clock,
        })
    }

    pub fn timeout_secs(secs: f32, clock: Arc<dyn Clock>) -> Self {
        Self::timeout(secs_to_duration(secs), clock)
    }

    pub fn cooldown(period: Duration, clock: Arc<dyn Clock>) -> Self {
        Transform::Cooldown(Gate {
            period,
            last_success: None,
            clock,
        })
    }

    pub fn cooldown_secs(secs: f32, clock: Arc<dyn Clock>) -> Self {
        Self::cooldown(secs_to_duration(secs), clock)
    }

    pub fn custom(f: impl FnMut(Status) -> Status + Send + 'static) -> Self {
        Transform::Custom(Box::new(f))
    }

    /// Clears state that belongs to one run of the child: attempt counters and
    /// the timeout start. The cooldown timestamp is kept.
    fn reset_run(&mut self) {
        match self {
            Transform::Repeat(a) | Transform::Retry(a) => a.count = 0,
            Transform::Timeout(t) => t.started = None,
            _ => {}
        }
    }

    fn clear(&mut self) {
        self.reset_run();
        if let Transform::Cooldown(g) = self {
            g.last_success = None;
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Inverter => f.write_str("Inverter"),
            Transform::Succeeder => f.write_str("Succeeder"),
            Transform::Failer => f.write_str("Failer"),
            Transform::Repeat(a) => f.debug_tuple("Repeat").field(a).finish(),
            Transform::Retry(a) => f.debug_tuple("Retry").field(a).finish(),
            Transform::Timeout(t) => f
                .debug_struct("Timeout")
                .field("limit", &t.limit)
                .field("started", &t.started)
                .finish(),
            Transform::Cooldown(g) => f
                .debug_struct("Cooldown")
                .field("period", &g.period)
                .field("last_success", &g.last_success)
                .finish(),
            Transform::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn secs_to_duration(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs).unwrap_or(if secs > 0.0 {
        Duration::MAX
    } else {
        Duration::ZERO
    })
}

/// Wraps one child and transforms its status.
///
/// While halted, ticks fail without touching the child.
pub struct Decorator {
    child: BoxedNode,
    transform: Transform,
    halted: bool,
}

impl Decorator {
    pub fn new(child: impl Node + 'static, transform: Transform) -> Self {
        Self::boxed(Box::new(child), transform)
    }

    pub fn boxed(child: BoxedNode, transform: Transform) -> Self {
        Self {
            child,
            transform,
            halted: false,
        }
    }

    pub fn inverter(child: impl Node + 'static) -> Self {
        Self::new(child, Transform::Inverter)
    }

    pub fn succeeder(child: impl Node + 'static) -> Self {
        Self::new(child, Transform::Succeeder)
    }

    pub fn failer(child: impl Node + 'static) -> Self {
        Self::new(child, Transform::Failer)
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Clears all transform state, including the cooldown timestamp that
    /// survives [`Node::reset`].
    pub fn clear_state(&mut self) {
        self.transform.clear();
    }
}

impl Node for Decorator {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        if let Transform::Cooldown(gate) = &self.transform {
            if gate.is_closed() {
                return Status::Failure;
            }
        }

        let status = self.child.tick(blackboard);

        match &mut self.transform {
            Transform::Inverter => status.invert(),
            Transform::Succeeder => {
                if status.is_terminal() {
                    Status::Success
                } else {
                    status
                }
            }
            Transform::Failer => {
                if status.is_terminal() {
                    Status::Failure
                } else {
                    status
                }
            }
            Transform::Repeat(attempts) => match status {
                Status::Success => {
                    attempts.count = 0;
                    Status::Success
                }
                Status::Failure => attempts.on_failure(),
                other => other,
            },
            Transform::Retry(attempts) => match status {
                Status::Success => {
                    attempts.count = 0;
                    Status::Success
                }
                Status::Failure => {
                    let out = attempts.on_failure();
                    if out.is_running() {
                        self.child.reset();
                    }
                    out
                }
                other => other,
            },
            Transform::Timeout(timer) => {
                let now = timer.clock.now();
                let started = *timer.started.get_or_insert(now);
                if now.saturating_sub(started) >= timer.limit {
                    tracing::debug!(limit = ?timer.limit, "timeout expired");
                    timer.started = None;
                    self.child.reset();
                    Status::Failure
                } else {
                    if status.is_terminal() {
                        timer.started = None;
                    }
                    status
                }
            }
            Transform::Cooldown(gate) => {
                if status.is_success() {
                    tracing::debug!(period = ?gate.period, "cooldown started");
                    gate.last_success = Some(gate.clock.now());
                }
                status
            }
            Transform::Custom(f) => f(status),
        }
    }

    fn reset(&mut self) {
        self.halted = false;
        self.transform.reset_run();
        self.child.reset();
    }

    fn halt(&mut self) {
        self.halted = true;
        self.transform.reset_run();
        self.child.halt();
    }

    fn is_halted(&self) -> bool {
        self.halted
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator")
            .field("transform", &self.transform)
            .field("halted", &self.halted)
            .finish_non_exhaustive()
    }
}
