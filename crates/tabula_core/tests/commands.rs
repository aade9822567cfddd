//! End-to-end tests for command execution, transactions and error
//! translation, exercised through the public API only.

use tabula_core::{
    Attempt, Cardinality, Command, CommandError, ConstraintKind, CoreResult, TransactionOptions,
};
use tabula_store::{tuple, ColumnDef, Connection, Predicate, Store, TableSchema, Value};

/// A `users` table with a single plain `name` column.
fn users_conn() -> Connection {
    let store = Store::new();
    store
        .create_table(TableSchema::new("users").column(ColumnDef::new("name")))
        .unwrap();
    store.connect()
}

/// An `accounts` table with NOT NULL and UNIQUE constraints.
fn accounts_conn() -> Connection {
    let store = Store::new();
    store
        .create_table(
            TableSchema::new("accounts")
                .column(ColumnDef::new("name").not_null())
                .column(ColumnDef::new("email").unique()),
        )
        .unwrap();
    store.connect()
}

#[test]
fn create_inside_transaction_commits() {
    let conn = users_conn();
    let create = Command::create(conn.relation("users").unwrap()).with_cardinality(Cardinality::One);

    let result = create
        .transaction(|| create.call(tuple! { "name" => "Jane" }))
        .unwrap();

    let row = result.unwrap().one().unwrap();
    assert_eq!(row, tuple! { "id" => 1, "name" => "Jane" });
}

#[test]
fn successful_nesting_commits_the_full_set() {
    let conn = users_conn();
    let create = Command::create(conn.relation("users").unwrap()).with_cardinality(Cardinality::One);

    let result = create
        .transaction(|| {
            create
                .transaction(|| create.call(tuple! { "name" => "Jane" }))
                .map(|inner| inner.unwrap())
        })
        .unwrap();

    let row = result.unwrap().one().unwrap();
    assert_eq!(row, tuple! { "id" => 1, "name" => "Jane" });
    assert_eq!(conn.relation("users").unwrap().count().unwrap(), 1);
}

#[test]
fn explicit_rollback_leaves_no_rows() {
    let conn = users_conn();
    let create = Command::create(conn.relation("users").unwrap());

    create
        .transaction_with(TransactionOptions::always_rollback(), || {
            create.call(tuple! { "name" => "Jane" })
        })
        .unwrap();

    assert_eq!(conn.relation("users").unwrap().count().unwrap(), 0);
}

#[test]
fn fault_in_nested_transaction_rolls_back_everything() {
    let conn = users_conn();
    let create = Command::create(conn.relation("users").unwrap());

    let result = create.transaction(|| {
        create.call(tuple! { "name" => "John" })?;
        create.transaction(|| {
            create.call(tuple! { "name" => "Jane" })?;
            Err::<(), _>(CommandError::validation("forced failure"))
        })?;
        Ok(())
    });

    assert!(matches!(result, Err(CommandError::Validation { .. })));
    assert_eq!(conn.relation("users").unwrap().count().unwrap(), 0);
}

#[test]
fn rollback_signal_discards_writes_without_an_error() {
    let conn = users_conn();
    let create = Command::create(conn.relation("users").unwrap());

    let result = create
        .transaction(|| {
            create.call(tuple! { "name" => "Jane" })?;
            Err::<(), _>(CommandError::Rollback)
        })
        .unwrap();

    assert_eq!(result, None);
    assert_eq!(conn.relation("users").unwrap().count().unwrap(), 0);
}

#[test]
fn cardinality_one_returns_a_single_tuple() {
    let conn = users_conn();
    let create = Command::create(conn.relation("users").unwrap()).with_cardinality(Cardinality::One);

    let result = Attempt::run(|| create.call(tuple! { "name" => "Jane" })).unwrap();
    let row = result.value().unwrap().one().unwrap();
    assert_eq!(row, tuple! { "id" => 1, "name" => "Jane" });
}

#[test]
fn cardinality_many_returns_the_batch() {
    let conn = users_conn();
    let create = Command::create(conn.relation("users").unwrap());

    let out = create
        .call(vec![tuple! { "name" => "Jane" }, tuple! { "name" => "Jack" }])
        .unwrap();

    let mut rows = out.into_tuples();
    rows.sort_by_key(|row| row["id"].as_integer());
    assert_eq!(
        rows,
        vec![
            tuple! { "id" => 1, "name" => "Jane" },
            tuple! { "id" => 2, "name" => "Jack" },
        ]
    );
}

#[test]
fn not_null_violation_translates_and_leaves_store_unchanged() {
    let conn = accounts_conn();
    let create = Command::create(conn.relation("accounts").unwrap());

    let result = Attempt::run(|| create.call(tuple! { "name" => Value::Null })).unwrap();

    let Some(CommandError::Constraint(detail)) = result.error() else {
        panic!("expected captured ConstraintError");
    };
    assert_eq!(detail.kind, ConstraintKind::NotNull);
    assert_eq!(detail.column.as_deref(), Some("name"));
    assert!(detail.message.contains("NOT NULL"));
    assert_eq!(conn.relation("accounts").unwrap().count().unwrap(), 0);
}

#[test]
fn unique_violation_translates_and_leaves_store_unchanged() {
    let conn = accounts_conn();
    let create = Command::create(conn.relation("accounts").unwrap());

    create
        .call(tuple! { "name" => "Jane", "email" => "jane@example.com" })
        .unwrap();
    let result = Attempt::run(|| {
        create.call(tuple! { "name" => "Jack", "email" => "jane@example.com" })
    })
    .unwrap();

    let Some(CommandError::Constraint(detail)) = result.error() else {
        panic!("expected captured ConstraintError");
    };
    assert_eq!(detail.kind, ConstraintKind::Unique);
    assert_eq!(detail.column.as_deref(), Some("email"));
    assert!(detail.message.contains("UNIQUE"));
    assert_eq!(conn.relation("accounts").unwrap().count().unwrap(), 1);
}

#[test]
fn constraint_failure_inside_transaction_rolls_back_prior_writes() {
    let conn = accounts_conn();
    let create = Command::create(conn.relation("accounts").unwrap());

    let result = create.transaction(|| {
        create.call(tuple! { "name" => "Jane", "email" => "jane@example.com" })?;
        create.call(tuple! { "name" => "Jack", "email" => "jane@example.com" })?;
        Ok(())
    });

    assert!(matches!(result, Err(CommandError::Constraint(_))));
    assert_eq!(conn.relation("accounts").unwrap().count().unwrap(), 0);
}

#[test]
fn update_refetches_by_identity_captured_before_the_write() {
    let conn = users_conn();
    let users = conn.relation("users").unwrap();
    Command::create(users.clone())
        .call(vec![tuple! { "name" => "Jane" }, tuple! { "name" => "Jack" }])
        .unwrap();

    // The targeting predicate references the column being changed;
    // re-filtering after the write would find nothing.
    let update = Command::update(users.filter(Predicate::eq("name", "Jane")))
        .change(tuple! { "name" => "Jane" });
    let out = update.call(tuple! { "name" => "Janet" }).unwrap();

    let rows = out.into_tuples();
    assert_eq!(rows, vec![tuple! { "id" => 1, "name" => "Janet" }]);
}

#[test]
fn noop_update_returns_empty_without_touching_rows() {
    let conn = users_conn();
    let users = conn.relation("users").unwrap();
    Command::create(users.clone())
        .call(tuple! { "name" => "Jane" })
        .unwrap();

    let update = Command::update(users.clone()).change(tuple! { "name" => "Jane" });
    let out = update.call(tuple! { "name" => "Jane" }).unwrap();

    assert!(out.is_empty());
    assert_eq!(
        users.tuples().unwrap(),
        vec![tuple! { "id" => 1, "name" => "Jane" }]
    );
}

#[test]
fn dependent_commands_chain_through_attempt() {
    let conn = accounts_conn();
    let create = Command::create(conn.relation("accounts").unwrap()).with_cardinality(Cardinality::One);

    let chained = Attempt::run(|| create.call(tuple! { "name" => "Jane" }))
        .unwrap()
        .and_then(|out| {
            let jane = out.one().expect("single tuple");
            assert_eq!(jane["id"], Value::from(1));
            // Second step fails on the NOT NULL constraint; the chain
            // captures it rather than raising.
            Attempt::run(|| create.call(tuple! { "name" => Value::Null }))
        })
        .unwrap();

    assert!(chained.is_failure());
    assert_eq!(conn.relation("accounts").unwrap().count().unwrap(), 1);
}

#[test]
fn change_binds_fresh_prior_state_per_call_site() {
    let conn = users_conn();
    let users = conn.relation("users").unwrap();
    Command::create(users.clone())
        .call(tuple! { "name" => "Jane" })
        .unwrap();

    let update = Command::update(users.filter(Predicate::eq("id", 1)));
    let current = users.tuples().unwrap().remove(0);

    // Binding the fetched row makes the identical input a no-op...
    let bound = update.change(current);
    assert!(bound.call(tuple! { "name" => "Jane" }).unwrap().is_empty());

    // ...while the unbound command still writes the full tuple.
    let out: CoreResult<_> = update.call(tuple! { "name" => "Jane" });
    assert_eq!(out.unwrap().len(), 1);
}
