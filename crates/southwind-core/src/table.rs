//! Tables: ordered fields plus the actions that mutate them.

use crate::action::Action;
use crate::field::Field;

/// A simulated table.
///
/// `fields` always ends with the reserved `change_token` and `change_type`
/// fields; their order is the column order of the DDL and of every INSERT.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    fields: Vec<Field>,
    pub actions: Vec<Action>,
}

impl Table {
    /// Build a table from its user fields, appending the reserved fields.
    pub fn new(name: impl Into<String>, fields: Vec<Field>, actions: Vec<Action>) -> Self {
        let name = name.into();
        let mut fields = fields;
        fields.extend(Field::reserved(&name));
        Self {
            name,
            fields,
            actions,
        }
    }

    /// All fields, reserved ones last.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields declared in the config.
    pub fn user_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_reserved())
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .fields
            .iter()
            .map(Field::column_ddl)
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS {} ({columns})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imposter::Imposter;

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Field::new("id", "integer", Imposter::Increment, true, "users"),
                Field::new("name", "varchar", Imposter::literal("bob"), false, "users"),
            ],
            vec![Action::Create {
                name: "signup".to_string(),
                frequency: 1.0,
            }],
        )
    }

    #[test]
    fn test_reserved_fields_are_last() {
        let table = users();
        assert_eq!(
            table.field_names(),
            vec!["id", "name", "change_token", "change_type"]
        );
        assert_eq!(table.user_fields().count(), 2);
    }

    #[test]
    fn test_create_table_sql() {
        assert_eq!(
            users().create_table_sql(),
            "CREATE TABLE IF NOT EXISTS users (id integer PRIMARY KEY, name varchar, \
             change_token INTEGER, change_type TEXT CHECK (change_type IN ('I', 'U', 'D')))"
        );
    }

    #[test]
    fn test_get_field() {
        let table = users();
        assert!(table.get_field("name").is_some());
        assert!(table.get_field("change_token").is_some());
        assert!(table.get_field("missing").is_none());
    }
}
