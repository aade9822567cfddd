//! Row storage and statement-level constraint enforcement.

use crate::error::{StoreError, StoreResult};
use crate::relation::Predicate;
use crate::schema::TableSchema;
use crate::value::{Tuple, Value};

/// One table: schema, rows and the primary key counter.
///
/// All constraint checks run before any row is touched, so a failing
/// statement leaves the table exactly as it was.
#[derive(Debug, Clone)]
pub(crate) struct Table {
    schema: TableSchema,
    rows: Vec<Tuple>,
    next_id: i64,
}

impl Table {
    pub(crate) fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            next_id: 1,
        }
    }

    pub(crate) fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Inserts one tuple, returning the assigned primary key value.
    pub(crate) fn insert(&mut self, attrs: &Tuple) -> StoreResult<Value> {
        self.check_known_columns(attrs)?;

        let pk = self.schema.primary_key.clone();
        let table = self.schema.name.clone();

        // Resolve the primary key: explicit value or auto-assigned.
        let (id, auto) = match attrs.get(&pk) {
            Some(v) if !v.is_null() => (v.clone(), false),
            _ => (Value::Integer(self.next_id), true),
        };
        if self.rows.iter().any(|row| row.get(&pk) == Some(&id)) {
            return Err(StoreError::primary_key(&table, &pk));
        }

        for column in &self.schema.columns {
            let value = attrs.get(&column.name);
            if column.not_null && value.is_none_or(Value::is_null) {
                return Err(StoreError::not_null(&table, &column.name));
            }
            if column.unique {
                if let Some(v) = value.filter(|v| !v.is_null()) {
                    if self.rows.iter().any(|row| row.get(&column.name) == Some(v)) {
                        return Err(StoreError::unique(&table, &column.name));
                    }
                }
            }
        }

        let mut row = Tuple::new();
        row.insert(pk, id.clone());
        for column in &self.schema.columns {
            let value = attrs.get(&column.name).cloned().unwrap_or(Value::Null);
            row.insert(column.name.clone(), value);
        }
        self.rows.push(row);

        if auto {
            self.next_id += 1;
        } else if let Some(n) = id.as_integer() {
            self.next_id = self.next_id.max(n + 1);
        }
        Ok(id)
    }

    /// Applies `changes` to every row matching `predicate`.
    ///
    /// Returns the number of rows updated.
    pub(crate) fn update(
        &mut self,
        predicate: Option<&Predicate>,
        changes: &Tuple,
    ) -> StoreResult<usize> {
        self.check_known_columns(changes)?;

        let table = self.schema.name.clone();
        let pk = self.schema.primary_key.clone();
        let targets: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| predicate.is_none_or(|p| p.matches(row)))
            .map(|(i, _)| i)
            .collect();

        for (column, value) in changes {
            let def = self.schema.column_def(column);
            let is_pk = *column == pk;

            if value.is_null() {
                if is_pk || def.is_some_and(|d| d.not_null) {
                    return Err(StoreError::not_null(&table, column));
                }
                continue;
            }
            if is_pk || def.is_some_and(|d| d.unique) {
                // Assigning one value to several rows, or to a value some
                // untouched row already holds, would break uniqueness.
                if targets.len() > 1 {
                    return Err(if is_pk {
                        StoreError::primary_key(&table, column)
                    } else {
                        StoreError::unique(&table, column)
                    });
                }
                let taken = self
                    .rows
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !targets.contains(i))
                    .any(|(_, row)| row.get(column) == Some(value));
                if taken {
                    return Err(if is_pk {
                        StoreError::primary_key(&table, column)
                    } else {
                        StoreError::unique(&table, column)
                    });
                }
            }
        }

        for &index in &targets {
            for (column, value) in changes {
                self.rows[index].insert(column.clone(), value.clone());
            }
        }
        Ok(targets.len())
    }

    /// Deletes every row matching `predicate`, returning the count.
    pub(crate) fn delete(&mut self, predicate: Option<&Predicate>) -> usize {
        let before = self.rows.len();
        self.rows
            .retain(|row| !predicate.is_none_or(|p| p.matches(row)));
        before - self.rows.len()
    }

    /// Returns clones of every row matching `predicate`.
    pub(crate) fn select(&self, predicate: Option<&Predicate>) -> Vec<Tuple> {
        self.rows
            .iter()
            .filter(|row| predicate.is_none_or(|p| p.matches(row)))
            .cloned()
            .collect()
    }

    fn check_known_columns(&self, attrs: &Tuple) -> StoreResult<()> {
        for column in attrs.keys() {
            if !self.schema.has_column(column) {
                return Err(StoreError::no_such_column(&self.schema.name, column));
            }
        }
        Ok(())
    }
}
