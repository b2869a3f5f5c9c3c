use thiserror::Error;

/// Errors raised while assembling a tree with [`crate::Builder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("cannot build tree: no root node")]
    NoRoot,

    #[error("root node is already complete; a leaf or closed composite does not accept children")]
    RootAlreadySet,

    #[error("end() called with no open composite")]
    UnbalancedEnd,

    #[error("{depth} composite(s) still open at build time")]
    UnclosedComposite { depth: usize },

    #[error("{count} decorator(s) declared but never applied to a node")]
    DanglingDecorator { count: usize },

    #[error("child of {composite} added without a score or weight")]
    MissingScore { composite: &'static str },

    #[error("score or weight declared outside a utility or weighted selector")]
    MisplacedScore,
}

pub type Result<T> = std::result::Result<T, BuildError>;
