//! # Tabula Core
//!
//! Transactional write-command core for Tabula.
//!
//! This crate mediates writes against a [`tabula_store`] relation:
//! every mutation runs as a [`Command`] that validates and transforms
//! its input, diffs updates against known prior state, executes inside
//! a (possibly nested) transaction scope, and surfaces failures as a
//! closed taxonomy of [`CommandError`] kinds instead of raw store
//! errors.
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{Attempt, Cardinality, Command};
//! use tabula_store::{tuple, ColumnDef, Store, TableSchema};
//!
//! let store = Store::new();
//! store
//!     .create_table(TableSchema::new("users").column(ColumnDef::new("name").not_null()))
//!     .unwrap();
//! let conn = store.connect();
//!
//! let create = Command::create(conn.relation("users").unwrap())
//!     .with_cardinality(Cardinality::One);
//!
//! let result = Attempt::run(|| create.call(tuple! { "name" => "Jane" })).unwrap();
//! let row = result.value().unwrap().one().unwrap();
//! assert_eq!(row, tuple! { "id" => 1, "name" => "Jane" });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod diff;
mod error;
mod input;
mod result;
mod transaction;
mod translate;

pub use command::{Cardinality, Command, CommandKind, Input, Output};
pub use diff::diff;
pub use error::{CommandError, ConstraintError, ConstraintKind, CoreResult};
pub use input::{InputPipeline, Transform, Validator};
pub use result::Attempt;
pub use transaction::{transaction, RollbackMode, TransactionOptions};
pub use translate::translate;
