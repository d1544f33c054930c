//! Two-phase statement execution.
//!
//! Phase one runs every deferred sub-query on its own and takes the named
//! column of its first row. Phase two substitutes those scalars as quoted
//! literals, or `NULL`, and runs the resulting statement.

use crate::error::StoreError;
use crate::store::Store;
use southwind_generator::{quote_literal, Fragment, Statement, SubQuery};
use tracing::debug;

/// Run `query` and return its scalar result as text, `None` for NULL.
pub fn fetch_scalar<S: Store + ?Sized>(
    store: &mut S,
    query: &SubQuery,
) -> Result<Option<String>, StoreError> {
    let rows = store.query(&query.sql)?;
    let row = rows
        .first()
        .ok_or_else(|| StoreError::EmptyResult(query.sql.clone()))?;
    let value = row
        .get(&query.column)
        .ok_or_else(|| StoreError::MissingColumn {
            column: query.column.clone(),
            sql: query.sql.clone(),
        })?;
    Ok((!value.is_null()).then(|| value.to_string()))
}

/// Resolve every deferred fragment and return the final SQL text.
pub fn resolve_statement<S: Store + ?Sized>(
    store: &mut S,
    statement: &Statement,
) -> Result<String, StoreError> {
    let mut sql = String::new();
    for fragment in statement.fragments() {
        match fragment {
            Fragment::Direct(text) => sql.push_str(text),
            Fragment::Deferred(query) => {
                let literal = quote_literal(fetch_scalar(store, query)?.as_deref());
                debug!("Resolved `{}` to {}", query.sql, literal);
                sql.push_str(&literal);
            }
        }
    }
    Ok(sql)
}

/// Resolve and run `statement`, returning the SQL that was executed.
pub fn execute_statement<S: Store + ?Sized>(
    store: &mut S,
    statement: &Statement,
) -> Result<String, StoreError> {
    let sql = resolve_statement(store, statement)?;
    store.execute(&sql)?;
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duckdb_store::DuckDbStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use southwind_core::{Action, Field, Imposter, Table, Value};
    use southwind_generator::{assemble, resolve::increment_query, resolve::random_lookup_query};

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Field::new("id", "INTEGER", Imposter::Increment, true, "users"),
                Field::new("name", "VARCHAR", Imposter::literal("O'Brien"), false, "users"),
            ],
            vec![],
        )
    }

    fn store_with(table: &Table) -> DuckDbStore {
        let mut store = DuckDbStore::in_memory().unwrap();
        store.create_table(table).unwrap();
        store
    }

    #[test]
    fn test_increment_on_empty_table_is_one() {
        let mut store = store_with(&users());
        let scalar = fetch_scalar(&mut store, &increment_query("users", "id")).unwrap();
        assert_eq!(scalar.as_deref(), Some("1"));
    }

    #[test]
    fn test_increment_counts_soft_deleted_rows() {
        let mut store = store_with(&users());
        store
            .execute("INSERT INTO users VALUES (1, 'a', 1, 'I'), (7, 'b', 2, 'D')")
            .unwrap();
        let scalar = fetch_scalar(&mut store, &increment_query("users", "id")).unwrap();
        assert_eq!(scalar.as_deref(), Some("8"));
    }

    #[test]
    fn test_lookup_default_when_no_live_rows() {
        let mut store = store_with(&users());
        let query = random_lookup_query("users", "id", "0");
        assert_eq!(fetch_scalar(&mut store, &query).unwrap().as_deref(), Some("0"));

        store
            .execute("INSERT INTO users VALUES (4, 'gone', 1, 'D')")
            .unwrap();
        assert_eq!(fetch_scalar(&mut store, &query).unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn test_null_lookup_default_is_none() {
        let mut store = store_with(&users());
        let query = random_lookup_query("users", "id", "NULL");
        assert_eq!(fetch_scalar(&mut store, &query).unwrap(), None);
    }

    #[test]
    fn test_lookup_only_returns_live_values() {
        let mut store = store_with(&users());
        store
            .execute(
                "INSERT INTO users VALUES (1, 'a', 1, 'I'), (2, 'b', 2, 'D'), (3, 'c', 3, 'U')",
            )
            .unwrap();
        let query = random_lookup_query("users", "id", "0");
        for _ in 0..50 {
            let scalar = fetch_scalar(&mut store, &query).unwrap().unwrap_or_default();
            assert!(scalar == "1" || scalar == "3", "unexpected lookup value {scalar}");
        }
    }

    #[test]
    fn test_missing_column_is_reported() {
        let mut store = DuckDbStore::in_memory().unwrap();
        let query = SubQuery {
            sql: "SELECT 1 AS a".to_string(),
            column: "b".to_string(),
        };
        assert!(matches!(
            fetch_scalar(&mut store, &query),
            Err(StoreError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_empty_result_is_reported() {
        let mut store = DuckDbStore::in_memory().unwrap();
        let query = SubQuery {
            sql: "SELECT 1 AS a WHERE FALSE".to_string(),
            column: "a".to_string(),
        };
        assert!(matches!(
            fetch_scalar(&mut store, &query),
            Err(StoreError::EmptyResult(_))
        ));
    }

    #[test]
    fn test_insert_round_trip() {
        let table = users();
        let mut store = store_with(&table);
        let mut rng = StdRng::seed_from_u64(42);
        let create = Action::Create {
            name: "signup".to_string(),
            frequency: 1.0,
        };

        for index in 0..3 {
            let statement = assemble(&table, &create, &mut rng, index).unwrap();
            execute_statement(&mut store, &statement).unwrap();
        }

        let rows = store.query("SELECT * FROM users ORDER BY id").unwrap();
        assert_eq!(rows.len(), 3);
        for (i, row) in rows.iter().enumerate() {
            let expected = i as i64 + 1;
            assert_eq!(row.get("id"), Some(&Value::Int(expected)));
            assert_eq!(row.get("change_token"), Some(&Value::Int(expected)));
            assert_eq!(row.get("name"), Some(&Value::Text("O'Brien".to_string())));
            assert_eq!(row.get("change_type"), Some(&Value::Text("I".to_string())));
        }
        assert_eq!(store.max_change_token("users").unwrap(), Some(3));
    }

    #[test]
    fn test_remove_then_purge() {
        let table = users();
        let mut store = store_with(&table);
        store
            .execute("INSERT INTO users VALUES (1, 'a', 1, 'I'), (2, 'b', 2, 'I')")
            .unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let remove = Action::Remove {
            name: "churn".to_string(),
            frequency: 1.0,
            condition: Some(southwind_core::WhereClause::parse("users.id == 2").unwrap()),
        };
        let statement = assemble(&table, &remove, &mut rng, 0).unwrap();
        let sql = execute_statement(&mut store, &statement).unwrap();
        assert!(sql.contains("change_token = '3'"));

        let latest = store.latest_rows("users").unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].get("id"), Some(&Value::Int(2)));
        assert_eq!(latest[0].get("change_type"), Some(&Value::Text("D".to_string())));
        assert_eq!(store.count_rows("users", false).unwrap(), 2);
        assert_eq!(store.count_rows("users", true).unwrap(), 1);

        store.purge_soft_deleted("users").unwrap();
        assert_eq!(store.count_rows("users", false).unwrap(), 1);
    }

    #[test]
    fn test_set_updates_every_live_row() {
        let table = users();
        let mut store = store_with(&table);
        store
            .execute(
                "INSERT INTO users VALUES (1, 'a', 1, 'I'), (2, 'b', 2, 'I'), (3, 'c', 3, 'D')",
            )
            .unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let set = Action::Set {
            name: "rename".to_string(),
            frequency: 1.0,
            field: "name".to_string(),
            value: Imposter::literal("z"),
            condition: None,
        };
        let statement = assemble(&table, &set, &mut rng, 0).unwrap();
        execute_statement(&mut store, &statement).unwrap();

        let latest = store.latest_rows("users").unwrap();
        assert_eq!(latest.len(), 2);
        for row in &latest {
            assert_eq!(row.get("name"), Some(&Value::Text("z".to_string())));
            assert_eq!(row.get("change_token"), Some(&Value::Int(4)));
            assert_eq!(row.get("change_type"), Some(&Value::Text("U".to_string())));
        }
    }

    fn orders() -> Table {
        Table::new(
            "orders",
            vec![
                Field::new("id", "INTEGER", Imposter::Increment, true, "orders"),
                Field::new(
                    "customer_id",
                    "INTEGER",
                    Imposter::parse("table_random(customers, id, NULL)").unwrap(),
                    false,
                    "orders",
                ),
            ],
            vec![],
        )
    }

    fn customers() -> Table {
        Table::new(
            "customers",
            vec![
                Field::new("id", "INTEGER", Imposter::Increment, true, "customers"),
                Field::new("email", "VARCHAR", Imposter::literal("x"), false, "customers"),
            ],
            vec![],
        )
    }

    #[test]
    fn test_null_lookup_default_inserts_null() {
        let mut store = store_with(&customers());
        let table = orders();
        store.create_table(&table).unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let create = Action::Create {
            name: "order".to_string(),
            frequency: 1.0,
        };
        let statement = assemble(&table, &create, &mut rng, 0).unwrap();
        let sql = execute_statement(&mut store, &statement).unwrap();
        assert!(sql.contains("NULL"), "{sql}");

        let rows = store.query("SELECT * FROM orders").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&Value::Int(1)));
        assert_eq!(rows[0].get("customer_id"), Some(&Value::Null));
    }

    #[test]
    fn test_sampled_null_value_stays_null() {
        let mut store = store_with(&customers());
        store
            .execute("INSERT INTO customers VALUES (1, NULL, 1, 'I')")
            .unwrap();
        let query = random_lookup_query("customers", "email", "none");
        assert_eq!(fetch_scalar(&mut store, &query).unwrap(), None);

        let mut rng = StdRng::seed_from_u64(3);
        let set = Action::Set {
            name: "copy".to_string(),
            frequency: 1.0,
            field: "email".to_string(),
            value: Imposter::parse("table_random(customers, email, none)").unwrap(),
            condition: None,
        };
        let statement = assemble(&customers(), &set, &mut rng, 0).unwrap();
        execute_statement(&mut store, &statement).unwrap();

        let latest = store.latest_rows("customers").unwrap();
        assert_eq!(latest[0].get("email"), Some(&Value::Null));
        assert_eq!(latest[0].get("change_type"), Some(&Value::Text("U".to_string())));
    }

    #[test]
    fn test_cross_table_condition_gates_whole_table() {
        let table = users();
        let mut store = store_with(&table);
        store.create_table(&customers()).unwrap();
        store
            .execute("INSERT INTO users VALUES (1, 'a', 1, 'I'), (2, 'b', 2, 'I')")
            .unwrap();
        store
            .execute("INSERT INTO customers VALUES (5, 'x', 1, 'I')")
            .unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let remove = |id: &str| Action::Remove {
            name: "churn".to_string(),
            frequency: 1.0,
            condition: Some(
                southwind_core::WhereClause::parse(&format!("customers.id == {id}")).unwrap(),
            ),
        };

        let statement = assemble(&table, &remove("9"), &mut rng, 0).unwrap();
        execute_statement(&mut store, &statement).unwrap();
        assert_eq!(store.count_rows("users", true).unwrap(), 2);

        let statement = assemble(&table, &remove("5"), &mut rng, 1).unwrap();
        execute_statement(&mut store, &statement).unwrap();
        assert_eq!(store.count_rows("users", true).unwrap(), 0);
        assert_eq!(store.count_rows("customers", true).unwrap(), 1);
    }

    #[test]
    fn test_table_exists() {
        let mut store = DuckDbStore::in_memory().unwrap();
        assert!(!store.table_exists("users").unwrap());
        store.create_table(&users()).unwrap();
        assert!(store.table_exists("users").unwrap());
        // Creating again is a no-op
        store.create_table(&users()).unwrap();
    }
}
