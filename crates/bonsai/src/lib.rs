//! Umbrella crate that re-exports the `bonsai-*` crates.
//!
//! `bonsai::core` holds the primitives (status, blackboard, clocks, RNG) and
//! `bonsai::bt` the node model, builder and tree runtime. The most common
//! names are also available from [`prelude`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use bonsai_core as core;

#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub use bonsai_bt as bt;

#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub mod prelude {
    pub use bonsai_bt::{
        Action, Blackboard, Builder, Condition, Decorator, Node, ParallelPolicy, Status,
        Transform, Tree,
    };
}
