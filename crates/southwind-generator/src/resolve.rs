//! Imposter resolution.
//!
//! Resolving an imposter yields exactly one [`Resolved`] kind: inline
//! literal text, or a sub-query the store must run before the final
//! statement can be built.

use crate::generators::render_direct;
use rand::Rng;
use southwind_core::{Imposter, CHANGE_TYPE_FIELD};

/// A query whose first row holds the value in `column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubQuery {
    pub sql: String,
    pub column: String,
}

/// The outcome of resolving an imposter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Literal text to inline
    Direct(String),
    /// Random sample of a live value, with a fallback default
    Lookup(SubQuery),
    /// Next value of a counter column
    Increment(SubQuery),
}

/// Where a value is being produced.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Table the value is written to or compared against
    pub table: &'a str,
    /// Column the value is produced for
    pub field: &'a str,
    /// Current mutation cycle, for `{index}` placeholders
    pub index: u64,
}

/// Resolve an imposter in the given context.
pub fn resolve<R: Rng>(imposter: &Imposter, context: &ResolveContext<'_>, rng: &mut R) -> Resolved {
    match imposter {
        Imposter::Direct(value) => Resolved::Direct(render_direct(value, rng, context.index)),
        Imposter::Increment => Resolved::Increment(increment_query(context.table, context.field)),
        Imposter::RandomLookup {
            table,
            field,
            default,
        } => Resolved::Lookup(random_lookup_query(table, field, default)),
    }
}

/// `coalesce(max(field) + 1, 1)` over the whole table.
///
/// Soft-deleted rows are counted so their ids are never reused.
pub fn increment_query(table: &str, field: &str) -> SubQuery {
    SubQuery {
        sql: format!("SELECT coalesce(max({field}) + 1, 1) AS inc FROM {table}"),
        column: "inc".to_string(),
    }
}

/// One random live value of `field`, or `default` when `table` has no live rows.
///
/// Live rows are filtered before sampling; the fallback row ranks after the
/// sample so it only surfaces when the sample is empty.
pub fn random_lookup_query(table: &str, field: &str, default: &str) -> SubQuery {
    let default = sql_literal(default);
    SubQuery {
        sql: format!(
            "SELECT {field} FROM (\
             SELECT {field}, 0 AS fallback_rank FROM (\
             SELECT {field} FROM {table} WHERE {CHANGE_TYPE_FIELD} != 'D' \
             ORDER BY random() LIMIT 1) \
             UNION ALL SELECT {default} AS {field}, 1 AS fallback_rank) \
             ORDER BY fallback_rank LIMIT 1"
        ),
        column: field.to_string(),
    }
}

/// Quote text for inclusion between single quotes.
pub fn escape_literal(text: &str) -> String {
    text.replace('\'', "''")
}

/// A scalar as a SQL literal: quoted text, or a bare `NULL` when absent.
pub fn quote_literal(value: Option<&str>) -> String {
    match value {
        Some(text) => format!("'{}'", escape_literal(text)),
        None => "NULL".to_string(),
    }
}

/// Numbers and `NULL` stay bare; anything else becomes a quoted string.
fn sql_literal(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("null") || trimmed.parse::<f64>().is_ok() {
        trimmed.to_string()
    } else {
        format!("'{}'", escape_literal(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn context() -> ResolveContext<'static> {
        ResolveContext {
            table: "orders",
            field: "id",
            index: 3,
        }
    }

    #[test]
    fn test_resolve_direct() {
        let mut rng = StdRng::seed_from_u64(1);
        let resolved = resolve(&Imposter::literal("5"), &context(), &mut rng);
        assert_eq!(resolved, Resolved::Direct("5".to_string()));
    }

    #[test]
    fn test_resolve_increment_uses_context() {
        let mut rng = StdRng::seed_from_u64(1);
        match resolve(&Imposter::Increment, &context(), &mut rng) {
            Resolved::Increment(query) => {
                assert_eq!(
                    query.sql,
                    "SELECT coalesce(max(id) + 1, 1) AS inc FROM orders"
                );
                assert_eq!(query.column, "inc");
                assert!(!query.sql.contains("change_type"));
            }
            other => panic!("expected increment, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_lookup_targets_other_table() {
        let mut rng = StdRng::seed_from_u64(1);
        let imposter = Imposter::parse("table_random(customers, id, 0)").unwrap();
        match resolve(&imposter, &context(), &mut rng) {
            Resolved::Lookup(query) => {
                assert_eq!(query.column, "id");
                assert!(query.sql.contains("FROM customers WHERE change_type != 'D'"));
                assert!(query.sql.contains("SELECT 0 AS id, 1 AS fallback_rank"));
            }
            other => panic!("expected lookup, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_default_quoting() {
        let query = random_lookup_query("t", "name", "n'a");
        assert!(query.sql.contains("SELECT 'n''a' AS name"));
        let query = random_lookup_query("t", "name", "NULL");
        assert!(query.sql.contains("SELECT NULL AS name"));
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("O'Brien"), "O''Brien");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal(Some("O'Brien")), "'O''Brien'");
        assert_eq!(quote_literal(Some("")), "''");
        assert_eq!(quote_literal(None), "NULL");
    }
}
