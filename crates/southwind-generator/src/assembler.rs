//! Compiles an action on a table into a statement fragment sequence.

use crate::resolve::{resolve, ResolveContext, SubQuery};
use crate::statement::Statement;
use rand::Rng;
use southwind_core::{
    Action, ChangeType, Imposter, Table, WhereClause, CHANGE_TOKEN_FIELD, CHANGE_TYPE_FIELD,
};

/// Error type for statement assembly.
///
/// Config validation rules these out, so any occurrence is a bug.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("Invariant violated while assembling action `{action}` on table `{table}`: {reason}")]
    Invariant {
        table: String,
        action: String,
        reason: String,
    },
}

/// Next change token for `table`, counting soft-deleted rows.
pub fn next_token_query(table: &str) -> SubQuery {
    SubQuery {
        sql: format!(
            "SELECT coalesce(max({CHANGE_TOKEN_FIELD}) + 1, 1) AS next_token FROM {table}"
        ),
        column: "next_token".to_string(),
    }
}

/// Assemble the statement for `action` against `table`.
///
/// `index` is the current mutation cycle.
pub fn assemble<R: Rng>(
    table: &Table,
    action: &Action,
    rng: &mut R,
    index: u64,
) -> Result<Statement, AssembleError> {
    match action {
        Action::Create { .. } => Ok(assemble_insert(table, rng, index)),
        Action::Set {
            name,
            field,
            value,
            condition,
            ..
        } => {
            if table.get_field(field).is_none() {
                return Err(AssembleError::Invariant {
                    table: table.name.clone(),
                    action: name.clone(),
                    reason: format!("field `{field}` does not exist"),
                });
            }
            Ok(assemble_set(
                table,
                field,
                value,
                condition.as_ref(),
                rng,
                index,
            ))
        }
        Action::Remove { condition, .. } => {
            Ok(assemble_remove(table, condition.as_ref(), rng, index))
        }
    }
}

/// `INSERT INTO t (cols) VALUES ('v1', 'v2', ...)`, values in field order.
///
/// Each value is a complete literal, so a lookup may also yield `NULL`.
pub fn assemble_insert<R: Rng>(table: &Table, rng: &mut R, index: u64) -> Statement {
    let mut statement = Statement::new();
    statement.push_text(format!(
        "INSERT INTO {} ({}) VALUES (",
        table.name,
        table.field_names().join(", ")
    ));

    for (position, field) in table.fields().iter().enumerate() {
        if position > 0 {
            statement.push_text(", ");
        }
        let context = ResolveContext {
            table: &table.name,
            field: &field.name,
            index,
        };
        statement.push_resolved(resolve(&field.imposter, &context, rng));
    }

    statement.push_text(")");
    statement
}

/// `UPDATE t SET field = 'value', change_token = <next>, change_type = 'U' WHERE ...`
pub fn assemble_set<R: Rng>(
    table: &Table,
    field: &str,
    value: &Imposter,
    condition: Option<&WhereClause>,
    rng: &mut R,
    index: u64,
) -> Statement {
    let context = ResolveContext {
        table: &table.name,
        field,
        index,
    };

    let mut statement = Statement::new();
    statement
        .push_text(format!("UPDATE {} SET {field} = ", table.name))
        .push_resolved(resolve(value, &context, rng))
        .push_text(", ");
    push_change_columns(&mut statement, table, ChangeType::Update);
    push_where(&mut statement, table, condition, rng, index);
    statement
}

/// Soft delete: `UPDATE t SET change_token = <next>, change_type = 'D' WHERE ...`
pub fn assemble_remove<R: Rng>(
    table: &Table,
    condition: Option<&WhereClause>,
    rng: &mut R,
    index: u64,
) -> Statement {
    let mut statement = Statement::new();
    statement.push_text(format!("UPDATE {} SET ", table.name));
    push_change_columns(&mut statement, table, ChangeType::Delete);
    push_where(&mut statement, table, condition, rng, index);
    statement
}

fn push_change_columns(statement: &mut Statement, table: &Table, change: ChangeType) {
    statement
        .push_text(format!("{CHANGE_TOKEN_FIELD} = "))
        .push_deferred(next_token_query(&table.name))
        .push_text(format!(", {CHANGE_TYPE_FIELD} = '{}'", change.code()));
}

/// `[FROM other] WHERE <predicate | TRUE> AND t.change_type != 'D'`
///
/// A condition on another table is not joined to the mutated table: it acts
/// as a table-wide gate, so every live row is touched when some row of the
/// other table matches and none otherwise.
fn push_where<R: Rng>(
    statement: &mut Statement,
    table: &Table,
    condition: Option<&WhereClause>,
    rng: &mut R,
    index: u64,
) {
    match condition {
        Some(condition) => {
            if condition.table != table.name {
                statement.push_text(format!(" FROM {}", condition.table));
            }
            let context = ResolveContext {
                table: &condition.table,
                field: &condition.field,
                index,
            };
            statement
                .push_text(format!(
                    " WHERE {}.{} {} ",
                    condition.table,
                    condition.field,
                    condition.operator.sql()
                ))
                .push_resolved(resolve(&condition.value, &context, rng));
        }
        None => {
            statement.push_text(" WHERE TRUE");
        }
    }
    statement.push_text(format!(" AND {}.{CHANGE_TYPE_FIELD} != 'D'", table.name));
}
