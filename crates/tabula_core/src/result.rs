//! Success/failure wrapper for composing dependent commands.

use crate::error::{CommandError, CoreResult};

/// Outcome of a command invocation captured at the `run` boundary.
///
/// `Attempt` lets callers chain dependent operations without matching
/// on every expected failure: recoverable errors (validation and
/// constraint rejections) become a `Failure` value instead of an `Err`,
/// while unexpected faults still propagate as errors. A `Failure`
/// short-circuits [`and_then`](Attempt::and_then) chains, passing the
/// original error through unchanged.
#[derive(Debug)]
pub enum Attempt<T> {
    /// The operation succeeded with this value.
    Success(T),
    /// The operation failed with a recoverable, classified error.
    Failure(CommandError),
}

impl<T> Attempt<T> {
    /// Executes `body`, capturing recoverable failures.
    ///
    /// # Errors
    ///
    /// Propagates any error for which
    /// [`CommandError::is_recoverable`] is false.
    pub fn run(body: impl FnOnce() -> CoreResult<T>) -> CoreResult<Self> {
        match body() {
            Ok(value) => Ok(Self::Success(value)),
            Err(err) if err.is_recoverable() => Ok(Self::Failure(err)),
            Err(err) => Err(err),
        }
    }

    /// Chains a dependent operation.
    ///
    /// Runs `next` with the success value; a `Failure` short-circuits
    /// and carries the original error forward.
    pub fn and_then<U>(
        self,
        next: impl FnOnce(T) -> CoreResult<Attempt<U>>,
    ) -> CoreResult<Attempt<U>> {
        match self {
            Self::Success(value) => next(value),
            Self::Failure(err) => Ok(Attempt::Failure(err)),
        }
    }

    /// Maps the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Attempt<U> {
        match self {
            Self::Success(value) => Attempt::Success(f(value)),
            Self::Failure(err) => Attempt::Failure(err),
        }
    }

    /// Returns the success value, discarding a failure.
    pub fn value(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Returns the captured error, if this is a failure.
    pub fn error(&self) -> Option<&CommandError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err),
        }
    }

    /// Checks whether the attempt succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Checks whether the attempt captured a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}
