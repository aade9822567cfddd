//! # Tabula Store
//!
//! Embedded in-memory relational store for Tabula.
//!
//! This crate provides the storage half of Tabula: tables with typed
//! values, column constraints, and a connection with nested-transaction
//! support. The write-command layer lives in `tabula_core` and talks to
//! this crate exclusively through [`Connection`] and [`Relation`].
//!
//! ## Design Principles
//!
//! - Tables hold plain attribute tuples; no query planner, no SQL
//! - Constraint failures surface as raw engine errors with extended
//!   result codes; classification is the caller's concern
//! - Exactly one physical transaction per connection at a time; nested
//!   `begin` calls participate in the outermost transaction
//! - Single-writer: the outermost transaction holds the table-set lock
//!   until commit or rollback
//!
//! ## Example
//!
//! ```rust
//! use tabula_store::{ColumnDef, Store, TableSchema, tuple};
//!
//! let store = Store::new();
//! store
//!     .create_table(TableSchema::new("users").column(ColumnDef::new("name")))
//!     .unwrap();
//!
//! let conn = store.connect();
//! let users = conn.relation("users").unwrap();
//! users.insert(&tuple! { "name" => "Jane" }).unwrap();
//! assert_eq!(users.count().unwrap(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod error;
mod relation;
mod schema;
mod table;
mod value;

pub use connection::{Connection, Store, TxOutcome};
pub use error::{codes, ConstraintViolation, StoreError, StoreResult};
pub use relation::{Predicate, Relation};
pub use schema::{ColumnDef, TableSchema};
pub use value::{Tuple, Value};
