//! Store handle and connection-scoped transactions.

use crate::error::{StoreError, StoreResult};
use crate::relation::Relation;
use crate::schema::TableSchema;
use crate::table::Table;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::collections::HashMap;
use std::sync::Arc;

type Tables = HashMap<String, Table>;
type TablesGuard = ArcMutexGuard<RawMutex, Tables>;

/// The shared table set.
///
/// A `Store` owns the data; all access goes through [`Connection`]s
/// obtained from [`Store::connect`].
#[derive(Debug, Clone, Default)]
pub struct Store {
    tables: Arc<Mutex<Tables>>,
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableExists`] if the table is already defined.
    pub fn create_table(&self, schema: TableSchema) -> StoreResult<()> {
        let mut tables = self.tables.lock();
        if tables.contains_key(&schema.name) {
            return Err(StoreError::TableExists {
                name: schema.name.clone(),
            });
        }
        tables.insert(schema.name.clone(), Table::new(schema));
        Ok(())
    }

    /// Opens a connection to this store.
    ///
    /// Each call returns an independent connection with its own
    /// transaction state. Cloning a `Connection` shares that state;
    /// calling `connect` again does not.
    #[must_use]
    pub fn connect(&self) -> Connection {
        Connection {
            tables: Arc::clone(&self.tables),
            tx: Arc::new(Mutex::new(None)),
        }
    }
}

/// How a call to [`Connection::end`] resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    /// The outermost transaction committed.
    Committed,
    /// The outermost transaction was rolled back.
    RolledBack,
    /// A nested scope ended; the outer transaction is still open.
    Participating,
}

/// In-flight physical transaction state for one connection.
struct TxState {
    /// Nesting depth; the physical transaction opened at depth 1.
    depth: usize,
    /// Whether the whole transaction is marked for rollback at the end.
    rollback: bool,
    /// Table set as of `begin`, restored on rollback.
    snapshot: Tables,
    /// Exclusive table-set lock held for the transaction's lifetime.
    guard: TablesGuard,
}

/// A connection to a [`Store`].
///
/// Connections are cheap to clone; clones share the same transaction
/// state and therefore represent the *same* connection. Transaction
/// nesting is tracked per connection: `begin` at depth zero takes the
/// physical table-set lock and a snapshot, deeper `begin` calls only
/// bump the depth counter. Two connections to the same store never
/// share transaction state.
#[derive(Clone)]
pub struct Connection {
    tables: Arc<Mutex<Tables>>,
    tx: Arc<Mutex<Option<TxState>>>,
}

impl Connection {
    /// Returns an unfiltered relation over the named table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoSuchTable`] if the table is not defined.
    pub fn relation(&self, name: &str) -> StoreResult<Relation> {
        let exists = self.with_tables(|tables| tables.contains_key(name));
        if !exists {
            return Err(StoreError::no_such_table(name));
        }
        Ok(Relation::new(self.clone(), name))
    }

    /// Enters a transaction scope.
    ///
    /// At depth zero this opens the physical transaction: it acquires
    /// the exclusive table-set lock and snapshots the tables. At any
    /// deeper level it only records participation in the existing
    /// transaction.
    pub fn begin(&self) {
        let mut tx = self.tx.lock();
        match tx.as_mut() {
            Some(state) => {
                state.depth += 1;
                tracing::trace!(depth = state.depth, "joined open transaction");
            }
            None => {
                let guard = self.tables.lock_arc();
                let snapshot = guard.clone();
                *tx = Some(TxState {
                    depth: 1,
                    rollback: false,
                    snapshot,
                    guard,
                });
                tracing::debug!("transaction opened");
            }
        }
    }

    /// Marks the whole open transaction for rollback.
    ///
    /// Effective at the outermost [`end`](Connection::end), regardless
    /// of the depth at which the mark was set. No-op outside a
    /// transaction.
    pub fn mark_rollback(&self) {
        if let Some(state) = self.tx.lock().as_mut() {
            state.rollback = true;
        }
    }

    /// Leaves the innermost transaction scope.
    ///
    /// Leaving the outermost scope resolves the physical transaction:
    /// commits, or restores the `begin`-time snapshot if any scope
    /// marked it for rollback. Called outside a transaction this is a
    /// no-op reported as [`TxOutcome::Participating`].
    pub fn end(&self) -> TxOutcome {
        let mut tx = self.tx.lock();
        if let Some(state) = tx.as_mut() {
            if state.depth > 1 {
                state.depth -= 1;
                return TxOutcome::Participating;
            }
        }

        // depth == 1: resolve the physical transaction.
        let Some(TxState {
            rollback,
            snapshot,
            mut guard,
            ..
        }) = tx.take()
        else {
            return TxOutcome::Participating;
        };
        if rollback {
            *guard = snapshot;
            tracing::debug!("transaction rolled back");
            TxOutcome::RolledBack
        } else {
            tracing::debug!("transaction committed");
            TxOutcome::Committed
        }
    }

    /// Current transaction nesting depth (0 = no open transaction).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.tx.lock().as_ref().map_or(0, |state| state.depth)
    }

    /// Checks whether a transaction is open on this connection.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.depth() > 0
    }

    /// Runs `f` against the table set.
    ///
    /// Inside a transaction this uses the held transaction guard; the
    /// lock is otherwise taken just for the duration of `f`.
    pub(crate) fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tx = self.tx.lock();
        match tx.as_mut() {
            Some(state) => f(&mut state.guard),
            None => {
                drop(tx);
                let mut tables = self.tables.lock();
                f(&mut tables)
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}
