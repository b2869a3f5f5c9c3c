//! Leaf primitives for the bonsai behavior tree engine.
//!
//! Everything here is independent of the node model: the [`Status`] every node
//! reports, the thread-safe [`Blackboard`] nodes communicate through, and the
//! injectable sources of randomness and time that stateful nodes consume.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod clock;
pub mod rng;
pub mod status;

pub use blackboard::{BbKey, Blackboard};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use rng::{DeterministicRng, SplitMix64, DEFAULT_SEED};
pub use status::Status;
