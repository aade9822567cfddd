//! Error taxonomy for command execution.

use tabula_store::StoreError;
use thiserror::Error;

/// Result type for command operations.
pub type CoreResult<T> = Result<T, CommandError>;

/// Subtype of a constraint failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// A NOT NULL constraint rejected the tuple.
    NotNull,
    /// A uniqueness constraint rejected the tuple.
    Unique,
    /// Some other declared constraint rejected the tuple.
    Other,
}

/// A classified constraint failure.
///
/// Built by the error translator from a raw store fault. The original
/// engine message is preserved verbatim; `column` is extracted from it
/// when the engine named one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConstraintError {
    /// Which class of constraint failed.
    pub kind: ConstraintKind,
    /// Offending column, when identifiable.
    pub column: Option<String>,
    /// The raw engine message text.
    pub message: String,
}

/// Errors surfaced by command execution.
///
/// `Validation` and `Constraint` are recoverable: the store is in its
/// pre-call state and the caller may retry with different input.
/// `Rollback` is not a failure at all but the control-flow signal a
/// transaction body raises to request rollback; it is caught by the
/// nearest transaction boundary and never observed by ordinary calling
/// code. Everything else is treated as fatal unless specifically
/// handled.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Input was rejected before reaching the store.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of what was rejected.
        message: String,
        /// Offending field names, when known.
        fields: Vec<String>,
    },

    /// The store rejected the mutation.
    #[error(transparent)]
    Constraint(ConstraintError),

    /// Explicit request to roll back the enclosing transaction.
    #[error("transaction rollback requested")]
    Rollback,

    /// A command declared `Cardinality::One` but the mutation produced
    /// a different number of rows.
    #[error("cardinality violation: expected {expected} tuple(s), got {got}")]
    Cardinality {
        /// Number of rows the declared cardinality requires.
        expected: usize,
        /// Number of rows the mutation actually produced.
        got: usize,
    },

    /// The command was invoked with input its kind cannot accept.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of the misuse.
        message: String,
    },

    /// Unclassified store fault, passed through for diagnostics.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl CommandError {
    /// Creates a validation error without field detail.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a validation error naming the offending fields.
    pub fn validation_fields(
        message: impl Into<String>,
        fields: impl IntoIterator<Item = String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            fields: fields.into_iter().collect(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Checks whether this error is recoverable: the store is unchanged
    /// and retrying with different input can succeed.
    ///
    /// Recoverable errors are the ones [`Attempt::run`] captures instead
    /// of propagating.
    ///
    /// [`Attempt::run`]: crate::Attempt::run
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Constraint(_))
    }
}
