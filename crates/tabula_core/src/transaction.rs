//! Transaction coordination over a store connection.

use crate::error::{CommandError, CoreResult};
use tabula_store::Connection;

/// When the transaction rolls back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackMode {
    /// Roll back only on a fault or an explicit rollback request.
    #[default]
    OnError,
    /// Roll back unconditionally, even if the body succeeds.
    Always,
}

/// Options for a transaction scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionOptions {
    /// Rollback policy for this scope.
    pub rollback: RollbackMode,
}

impl TransactionOptions {
    /// Creates the default options (commit on success).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that force a full rollback even on success.
    #[must_use]
    pub const fn always_rollback() -> Self {
        Self {
            rollback: RollbackMode::Always,
        }
    }
}

/// Executes `body` inside a transaction on `conn`.
///
/// All store mutations performed within `body`, including those made
/// in nested `transaction` calls on the same connection, commit or
/// roll back together. Nested calls participate in the outermost
/// physical transaction; there is no partial commit of an inner scope.
///
/// Returns:
///
/// - `Ok(Some(value))` when `body` succeeds. With
///   [`RollbackMode::Always`] the value is still produced but the whole
///   transaction is rolled back at the outermost boundary.
/// - `Ok(None)` when `body` raised [`CommandError::Rollback`]: the
///   signal is caught here, the whole transaction is marked for
///   rollback, and no error reaches the caller.
/// - `Err(e)` for any other fault, after the transaction unwinds; the
///   original fault is preserved for the caller.
///
/// A panic inside `body` also unwinds the scope (and marks rollback)
/// before propagating.
pub fn transaction<T>(
    conn: &Connection,
    options: TransactionOptions,
    body: impl FnOnce() -> CoreResult<T>,
) -> CoreResult<Option<T>> {
    let scope = Scope::enter(conn);
    match body() {
        Ok(value) => {
            if options.rollback == RollbackMode::Always {
                conn.mark_rollback();
            }
            scope.leave();
            Ok(Some(value))
        }
        Err(CommandError::Rollback) => {
            tracing::debug!("rollback requested by transaction body");
            conn.mark_rollback();
            scope.leave();
            Ok(None)
        }
        Err(err) => {
            conn.mark_rollback();
            scope.leave();
            Err(err)
        }
    }
}

/// Guard tying scope entry to exit, so a panicking body cannot leave
/// the connection's transaction open.
struct Scope<'c> {
    conn: &'c Connection,
    armed: bool,
}

impl<'c> Scope<'c> {
    fn enter(conn: &'c Connection) -> Self {
        conn.begin();
        Self { conn, armed: true }
    }

    fn leave(mut self) {
        self.armed = false;
        self.conn.end();
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.conn.mark_rollback();
            self.conn.end();
        }
    }
}
