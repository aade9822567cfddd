//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Extended result codes attached to constraint violations.
///
/// Codes follow the SQLite extended constraint code numbering so that
/// callers can classify failures structurally instead of parsing the
/// engine message text.
pub mod codes {
    /// Generic constraint failure.
    pub const CONSTRAINT: u32 = 19;
    /// CHECK constraint failed.
    pub const CONSTRAINT_CHECK: u32 = 275;
    /// NOT NULL constraint failed.
    pub const CONSTRAINT_NOTNULL: u32 = 1299;
    /// Primary key uniqueness failed.
    pub const CONSTRAINT_PRIMARYKEY: u32 = 1555;
    /// UNIQUE constraint failed.
    pub const CONSTRAINT_UNIQUE: u32 = 2067;
}

/// A rejected mutation: the statement violated a declared constraint.
///
/// Carries the extended result code and the engine-native message text,
/// e.g. `NOT NULL constraint failed: users.name`. The statement that
/// produced the violation has no effect on the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConstraintViolation {
    /// Extended result code (see [`codes`]).
    pub code: u32,
    /// Engine-native message text naming the constraint.
    pub message: String,
}

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A declared constraint rejected the statement.
    #[error("{0}")]
    Constraint(ConstraintViolation),

    /// The named table does not exist.
    #[error("no such table: {name}")]
    NoSuchTable {
        /// Name of the missing table.
        name: String,
    },

    /// A statement referenced an undefined column.
    #[error("no such column: {table}.{column}")]
    NoSuchColumn {
        /// Table the statement targeted.
        table: String,
        /// The undefined column name.
        column: String,
    },

    /// The named table already exists.
    #[error("table already exists: {name}")]
    TableExists {
        /// Name of the existing table.
        name: String,
    },

    /// The connection to the store was lost.
    #[error("connection failure: {message}")]
    Connection {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a NOT NULL constraint violation for `table.column`.
    pub fn not_null(table: &str, column: &str) -> Self {
        Self::Constraint(ConstraintViolation {
            code: codes::CONSTRAINT_NOTNULL,
            message: format!("NOT NULL constraint failed: {table}.{column}"),
        })
    }

    /// Creates a UNIQUE constraint violation for `table.column`.
    pub fn unique(table: &str, column: &str) -> Self {
        Self::Constraint(ConstraintViolation {
            code: codes::CONSTRAINT_UNIQUE,
            message: format!("UNIQUE constraint failed: {table}.{column}"),
        })
    }

    /// Creates a primary key violation for `table.column`.
    pub fn primary_key(table: &str, column: &str) -> Self {
        Self::Constraint(ConstraintViolation {
            code: codes::CONSTRAINT_PRIMARYKEY,
            message: format!("UNIQUE constraint failed: {table}.{column}"),
        })
    }

    /// Creates a no-such-table error.
    pub fn no_such_table(name: impl Into<String>) -> Self {
        Self::NoSuchTable { name: name.into() }
    }

    /// Creates a no-such-column error.
    pub fn no_such_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::NoSuchColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a connection failure error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}
