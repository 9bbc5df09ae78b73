//! Error types shared across the RandoForge crates.

use thiserror::Error;

/// Domain errors: programmer mistakes that are fatal to the current run.
///
/// Strict lookups fail with the `Unknown*` variants; structural misuse of
/// builders and selectors surfaces as [`RandoCoreError::InvalidOperation`].
#[derive(Debug, Error)]
pub enum RandoCoreError {
    /// A strict state-field lookup did not match any registered bool.
    #[error("unknown state bool: {0}")]
    UnknownStateBool(String),

    /// A strict state-field lookup did not match any registered int.
    #[error("unknown state int: {0}")]
    UnknownStateInt(String),

    /// A field lookup by name did not match any registered field of any kind.
    #[error("unknown state field: {0}")]
    UnknownStateField(String),

    /// A strict named-state lookup failed.
    #[error("unknown named state: {0}")]
    UnknownNamedState(String),

    /// A strict named-state-union lookup failed.
    #[error("unknown named state union: {0}")]
    UnknownNamedStateUnion(String),

    /// A strict term lookup failed.
    #[error("unknown term: {0}")]
    UnknownTerm(String),

    /// A variable name was not handled by any resolver in the chain.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// A name was registered twice in a builder.
    #[error("duplicate definition: {0}")]
    Duplicate(String),

    /// A compiled clause array violated the id banding or operator arity.
    #[error("malformed logic in {name}: {reason}")]
    MalformedLogic { name: String, reason: String },

    /// An operation was invoked in a state that does not permit it.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type alias for RandoForge operations.
pub type Result<T> = std::result::Result<T, RandoCoreError>;
