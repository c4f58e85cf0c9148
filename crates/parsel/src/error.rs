//! Errors produced by grammar construction and by the recognition engine.

/// A program error: a mistake in how a grammar was assembled, detected while
/// building it rather than while parsing with it.
///
/// Construction-time only. `Grammar::parse` never returns this; at parse
/// time a grammar either accepts, rejects, or runs out of fuel.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GrammarError {
    #[error("nonterminal `{name}` redefined with a different input binding")]
    InputRebound { name: String },

    #[error("nonterminal `{name}` redefined with a different output binding")]
    OutputRebound { name: String },

    #[error(
        "nonterminal `{name}` declares an input attribute but was called without an input binding"
    )]
    MissingInputBinding { name: String },

    #[error("attribute binding attached to a node that is not a definition or a terminal")]
    MisplacedBinding,
}

/// Result alias for fallible grammar-construction operations.
pub type Result<T> = std::result::Result<T, GrammarError>;

/// An error surfaced by the recognition engine at parse time.
///
/// Distinct from the boolean accept/reject outcome of `Grammar::parse`: this
/// only fires when a [`FuelLimits`](crate::engine::FuelLimits) budget runs
/// out, which is how a left-recursive or otherwise runaway grammar is turned
/// into a catchable error instead of a hang or a stack overflow.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error("execution step limit exceeded")]
    FuelExhausted,

    #[error("recursion depth limit exceeded")]
    RecursionLimitExceeded,
}
