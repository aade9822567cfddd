//! Relation handles: the per-table read/write surface.

use crate::connection::Connection;
use crate::error::{StoreError, StoreResult};
use crate::value::{Tuple, Value};

/// A row-filtering predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Column equals value.
    Eq(String, Value),
    /// Column value is a member of the given set.
    In(String, Vec<Value>),
    /// Both predicates hold.
    And(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// Builds an equality predicate.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(column.into(), value.into())
    }

    /// Builds a set-membership predicate.
    pub fn is_in(column: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Self::In(column.into(), values.into_iter().collect())
    }

    pub(crate) fn matches(&self, row: &Tuple) -> bool {
        match self {
            Self::Eq(column, value) => row.get(column) == Some(value),
            Self::In(column, values) => row
                .get(column)
                .is_some_and(|v| values.iter().any(|candidate| candidate == v)),
            Self::And(left, right) => left.matches(row) && right.matches(row),
        }
    }
}

/// A (possibly filtered) view over one table.
///
/// Relations are cheap value handles: `filter` and `unfiltered` return
/// new relations, never mutate the receiver. All data access goes
/// through the relation's connection, so reads and writes made inside
/// an open transaction observe that transaction's state.
#[derive(Debug, Clone)]
pub struct Relation {
    conn: Connection,
    table: String,
    filter: Option<Predicate>,
}

impl Relation {
    pub(crate) fn new(conn: Connection, table: &str) -> Self {
        Self {
            conn,
            table: table.to_string(),
            filter: None,
        }
    }

    /// The table this relation reads from and writes to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.table
    }

    /// The connection this relation operates on.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns a relation restricted by `predicate`.
    ///
    /// An existing restriction is kept; the predicates are conjoined.
    #[must_use]
    pub fn filter(&self, predicate: Predicate) -> Self {
        let filter = match self.filter.clone() {
            Some(existing) => Predicate::And(Box::new(existing), Box::new(predicate)),
            None => predicate,
        };
        Self {
            conn: self.conn.clone(),
            table: self.table.clone(),
            filter: Some(filter),
        }
    }

    /// Returns this relation with any restriction removed.
    #[must_use]
    pub fn unfiltered(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            table: self.table.clone(),
            filter: None,
        }
    }

    /// The table's primary key column name.
    pub fn primary_key(&self) -> StoreResult<String> {
        self.with_table(|table| Ok(table.schema().primary_key.clone()))
    }

    /// Returns the matching rows.
    pub fn tuples(&self) -> StoreResult<Vec<Tuple>> {
        self.with_table(|table| Ok(table.select(self.filter.as_ref())))
    }

    /// Returns the number of matching rows.
    pub fn count(&self) -> StoreResult<usize> {
        self.tuples().map(|rows| rows.len())
    }

    /// Inserts `attrs`, returning the assigned primary key value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Constraint`] when a declared constraint
    /// rejects the tuple; the table is left unchanged.
    pub fn insert(&self, attrs: &Tuple) -> StoreResult<Value> {
        let id = self.with_table_mut(|table| table.insert(attrs))?;
        tracing::trace!(table = %self.table, %id, "inserted row");
        Ok(id)
    }

    /// Applies `changes` to every matching row, returning the count.
    pub fn update(&self, changes: &Tuple) -> StoreResult<usize> {
        let filter = self.filter.clone();
        let count = self.with_table_mut(|table| table.update(filter.as_ref(), changes))?;
        tracing::trace!(table = %self.table, count, "updated rows");
        Ok(count)
    }

    /// Deletes every matching row, returning the count.
    pub fn delete(&self) -> StoreResult<usize> {
        let filter = self.filter.clone();
        let count = self.with_table_mut(|table| Ok(table.delete(filter.as_ref())))?;
        tracing::trace!(table = %self.table, count, "deleted rows");
        Ok(count)
    }

    fn with_table<R>(
        &self,
        f: impl FnOnce(&crate::table::Table) -> StoreResult<R>,
    ) -> StoreResult<R> {
        self.conn.with_tables(|tables| {
            let table = tables
                .get(&self.table)
                .ok_or_else(|| StoreError::no_such_table(&self.table))?;
            f(table)
        })
    }

    fn with_table_mut<R>(
        &self,
        f: impl FnOnce(&mut crate::table::Table) -> StoreResult<R>,
    ) -> StoreResult<R> {
        self.conn.with_tables(|tables| {
            let table = tables
                .get_mut(&self.table)
                .ok_or_else(|| StoreError::no_such_table(&self.table))?;
            f(table)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Store;
    use crate::schema::{ColumnDef, TableSchema};
    use crate::tuple;

    fn users() -> Relation {
        let store = Store::new();
        store
            .create_table(
                TableSchema::new("users")
                    .column(ColumnDef::new("name"))
                    .column(ColumnDef::new("age")),
            )
            .unwrap();
        store.connect().relation("users").unwrap()
    }

    #[test]
    fn filter_restricts_tuples() {
        let users = users();
        users.insert(&tuple! { "name" => "Jane", "age" => 30 }).unwrap();
        users.insert(&tuple! { "name" => "Jack", "age" => 40 }).unwrap();

        let janes = users.filter(Predicate::eq("name", "Jane"));
        let rows = janes.tuples().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["age"], Value::from(30));
    }

    #[test]
    fn chained_filters_conjoin() {
        let users = users();
        users.insert(&tuple! { "name" => "Jane", "age" => 30 }).unwrap();
        users.insert(&tuple! { "name" => "Jane", "age" => 40 }).unwrap();

        let narrowed = users
            .filter(Predicate::eq("name", "Jane"))
            .filter(Predicate::eq("age", 40));
        assert_eq!(narrowed.count().unwrap(), 1);
    }

    #[test]
    fn unfiltered_drops_restriction() {
        let users = users();
        users.insert(&tuple! { "name" => "Jane" }).unwrap();
        users.insert(&tuple! { "name" => "Jack" }).unwrap();

        let janes = users.filter(Predicate::eq("name", "Jane"));
        assert_eq!(janes.count().unwrap(), 1);
        assert_eq!(janes.unfiltered().count().unwrap(), 2);
    }

    #[test]
    fn membership_predicate() {
        let users = users();
        users.insert(&tuple! { "name" => "Jane" }).unwrap();
        users.insert(&tuple! { "name" => "Jack" }).unwrap();
        users.insert(&tuple! { "name" => "Jill" }).unwrap();

        let subset = users.filter(Predicate::is_in(
            "id",
            [Value::from(1), Value::from(3)],
        ));
        let names: Vec<_> = subset
            .tuples()
            .unwrap()
            .into_iter()
            .map(|row| row["name"].clone())
            .collect();
        assert_eq!(names, vec![Value::from("Jane"), Value::from("Jill")]);
    }

    #[test]
    fn update_honors_filter() {
        let users = users();
        users.insert(&tuple! { "name" => "Jane" }).unwrap();
        users.insert(&tuple! { "name" => "Jack" }).unwrap();

        let count = users
            .filter(Predicate::eq("name", "Jack"))
            .update(&tuple! { "age" => 50 })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn delete_honors_filter() {
        let users = users();
        users.insert(&tuple! { "name" => "Jane" }).unwrap();
        users.insert(&tuple! { "name" => "Jack" }).unwrap();

        let count = users.filter(Predicate::eq("name", "Jane")).delete().unwrap();
        assert_eq!(count, 1);
        assert_eq!(users.count().unwrap(), 1);
    }

    #[test]
    fn primary_key_comes_from_schema() {
        let users = users();
        assert_eq!(users.primary_key().unwrap(), "id");
    }
}
