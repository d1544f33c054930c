//! Simulation config: YAML loading, the table registry and load-time validation.
//!
//! Loading happens in two steps. The YAML is first deserialized into raw
//! structs that mirror the file, then converted into [`Table`]s and checked
//! against the complete registry, so that no cross-table reference can fail
//! once the mutation loop is running.

use crate::action::Action;
use crate::error::ConfigError;
use crate::field::Field;
use crate::imposter::Imposter;
use crate::table::Table;
use crate::where_clause::WhereClause;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ============================================================================
// Settings
// ============================================================================

/// What happens to soft-deleted rows after each mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Purge `change_type = 'D'` rows from every table after each mutation
    Hard,
    /// Keep soft-deleted rows
    Soft,
}

impl FromStr for DeletePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HARD" => Ok(DeletePolicy::Hard),
            "SOFT" => Ok(DeletePolicy::Soft),
            other => Err(ConfigError::InvalidSetting(format!(
                "delete_behaviour must be 'HARD' or 'SOFT', got '{other}'"
            ))),
        }
    }
}

/// File format of exported change records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array per export
    Json,
    /// One JSON object per line
    Jsonl,
    /// Header line followed by one record per row
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ConfigError::InvalidSetting(format!(
                "output format must be one of json, jsonl, csv, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where exported change records go.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub path: PathBuf,
}

// ============================================================================
// Table registry
// ============================================================================

/// All tables of a simulation, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: Vec<Table>,
    table_map: HashMap<String, usize>,
}

impl Schema {
    /// Build a registry, rejecting duplicate table names.
    pub fn new(tables: Vec<Table>) -> Result<Self, ConfigError> {
        let mut table_map = HashMap::with_capacity(tables.len());
        for (idx, table) in tables.iter().enumerate() {
            if table_map.insert(table.name.clone(), idx).is_some() {
                return Err(ConfigError::Duplicate {
                    name: table.name.clone(),
                    context: "table names".to_string(),
                });
            }
        }
        Ok(Self { tables, table_map })
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.table_map
            .get(name)
            .and_then(|&idx| self.tables.get(idx))
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Check every cross-table and cross-field reference against the registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for table in &self.tables {
            for field in table.user_fields() {
                self.check_lookup(
                    &field.imposter,
                    &format!("value of field `{}.{}`", table.name, field.name),
                )?;
            }

            for action in &table.actions {
                let context = format!("action `{}` of table `{}`", action.name(), table.name);

                if let Action::Set { field, value, .. } = action {
                    match table.get_field(field) {
                        Some(f) if !f.is_reserved() => {}
                        Some(_) => {
                            return Err(ConfigError::ReservedField {
                                table: table.name.clone(),
                                field: field.clone(),
                            })
                        }
                        None => {
                            return Err(ConfigError::FieldNotFound {
                                table: table.name.clone(),
                                field: field.clone(),
                                context,
                            })
                        }
                    }
                    self.check_lookup(value, &context)?;
                }

                if let Some(condition) = action.condition() {
                    let where_context = format!("where condition `{}` of {context}", condition.raw);
                    self.check_column(&condition.table, &condition.field, &where_context)?;
                    self.check_lookup(&condition.value, &where_context)?;
                }
            }
        }
        Ok(())
    }

    fn check_lookup(&self, imposter: &Imposter, context: &str) -> Result<(), ConfigError> {
        match imposter.lookup_target() {
            Some((table, field)) => self.check_column(table, field, context),
            None => Ok(()),
        }
    }

    fn check_column(&self, table: &str, field: &str, context: &str) -> Result<(), ConfigError> {
        let target = self
            .get_table(table)
            .ok_or_else(|| ConfigError::TableNotFound {
                table: table.to_string(),
                context: context.to_string(),
            })?;
        if target.get_field(field).is_none() {
            return Err(ConfigError::FieldNotFound {
                table: table.to_string(),
                field: field.to_string(),
                context: context.to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Simulation config
// ============================================================================

/// Validated simulation config.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Store location; `:memory:` for an in-memory store
    pub db_path: PathBuf,
    pub output: OutputConfig,
    pub delete_policy: DeletePolicy,
    /// Seconds to wait after each table's mutation
    pub inter_action_delay: f64,
    /// Seed for reproducible action choice and generated values
    pub seed: Option<u64>,
    pub schema: Schema,
}

impl SimulationConfig {
    /// Load and validate a config from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load and validate a config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        raw.into_config()
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    db_path: Option<PathBuf>,
    output: Option<RawOutput>,
    delete_behaviour: Option<String>,
    inter_action_delay: Option<f64>,
    #[serde(default)]
    seed: Option<u64>,
    tables: Option<Vec<RawTable>>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    format: Option<String>,
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    name: Option<String>,
    fields: Option<Vec<RawField>>,
    #[serde(default)]
    actions: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: Option<String>,
    #[serde(rename = "type")]
    field_type: Option<String>,
    value: Option<serde_yaml::Value>,
    #[serde(default)]
    is_pk: bool,
    #[serde(default)]
    arguments: Vec<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    name: Option<String>,
    action: Option<String>,
    frequency: Option<f64>,
    field: Option<String>,
    value: Option<serde_yaml::Value>,
    where_condition: Option<String>,
    #[serde(default)]
    arguments: Vec<serde_yaml::Value>,
}

impl RawConfig {
    fn into_config(self) -> Result<SimulationConfig, ConfigError> {
        let db_path = self
            .db_path
            .ok_or_else(|| ConfigError::Missing("db_path".to_string()))?;
        let output = self
            .output
            .ok_or_else(|| ConfigError::Missing("output".to_string()))?;
        let output = OutputConfig {
            format: output
                .format
                .ok_or_else(|| ConfigError::Missing("output.format".to_string()))?
                .parse()?,
            path: output
                .path
                .ok_or_else(|| ConfigError::Missing("output.path".to_string()))?,
        };
        let delete_policy: DeletePolicy = self
            .delete_behaviour
            .ok_or_else(|| ConfigError::Missing("delete_behaviour".to_string()))?
            .parse()?;
        let inter_action_delay = self
            .inter_action_delay
            .ok_or_else(|| ConfigError::Missing("inter_action_delay".to_string()))?;
        if !inter_action_delay.is_finite() || inter_action_delay < 0.0 {
            return Err(ConfigError::InvalidSetting(format!(
                "inter_action_delay must be a non-negative number of seconds, got {inter_action_delay}"
            )));
        }

        let raw_tables = self.tables.ok_or_else(|| {
            ConfigError::Missing("tables (consult the README for a sample config)".to_string())
        })?;
        let tables = raw_tables
            .into_iter()
            .map(RawTable::into_table)
            .collect::<Result<Vec<_>, _>>()?;

        let schema = Schema::new(tables)?;
        schema.validate()?;

        Ok(SimulationConfig {
            db_path,
            output,
            delete_policy,
            inter_action_delay,
            seed: self.seed,
            schema,
        })
    }
}

impl RawTable {
    fn into_table(self) -> Result<Table, ConfigError> {
        let table_name = self
            .name
            .ok_or_else(|| ConfigError::Missing("table name".to_string()))?;
        let raw_fields = self
            .fields
            .ok_or_else(|| ConfigError::Missing(format!("fields of table `{table_name}`")))?;

        let mut fields: Vec<Field> = Vec::with_capacity(raw_fields.len());
        for raw in raw_fields {
            let field = raw.into_field(&table_name)?;
            if field.is_reserved() {
                return Err(ConfigError::ReservedField {
                    table: table_name,
                    field: field.name,
                });
            }
            if fields.iter().any(|f| f.name == field.name) {
                return Err(ConfigError::Duplicate {
                    name: field.name,
                    context: format!("fields of table `{table_name}`"),
                });
            }
            fields.push(field);
        }

        let actions = self
            .actions
            .into_iter()
            .map(|raw| raw.into_action(&table_name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Table::new(table_name, fields, actions))
    }
}

impl RawField {
    fn into_field(self, table: &str) -> Result<Field, ConfigError> {
        let name = self
            .name
            .ok_or_else(|| ConfigError::Missing(format!("field name in table `{table}`")))?;
        let field_type = self
            .field_type
            .ok_or_else(|| ConfigError::Missing(format!("type of field `{table}.{name}`")))?;
        let value = self
            .value
            .as_ref()
            .and_then(yaml_scalar_to_string)
            .ok_or_else(|| ConfigError::Missing(format!("value of field `{table}.{name}`")))?;
        let arguments = scalars_to_strings(&self.arguments);
        let imposter = Imposter::parse_with_arguments(&value, arguments)?;

        Ok(Field::new(name, field_type, imposter, self.is_pk, table))
    }
}

impl RawAction {
    fn into_action(self, table: &str) -> Result<Action, ConfigError> {
        let name = self
            .name
            .ok_or_else(|| ConfigError::Missing(format!("action name in table `{table}`")))?;
        let kind = self.action.ok_or_else(|| {
            ConfigError::Missing(format!("kind of action `{name}` in table `{table}`"))
        })?;
        let frequency = self.frequency.ok_or_else(|| {
            ConfigError::Missing(format!("frequency of action `{name}` in table `{table}`"))
        })?;
        if !(frequency > 0.0 && frequency <= 1.0) {
            return Err(ConfigError::InvalidFrequency {
                table: table.to_string(),
                action: name,
                frequency,
            });
        }
        let condition = self
            .where_condition
            .as_deref()
            .map(WhereClause::parse)
            .transpose()?;

        match kind.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Action::Create { name, frequency }),
            "remove" => Ok(Action::Remove {
                name,
                frequency,
                condition,
            }),
            "set" => {
                let field = self.field.ok_or_else(|| {
                    ConfigError::Missing(format!("field of set action `{name}` in table `{table}`"))
                })?;
                let value = self
                    .value
                    .as_ref()
                    .and_then(yaml_scalar_to_string)
                    .ok_or_else(|| {
                        ConfigError::Missing(format!(
                            "value of set action `{name}` in table `{table}`"
                        ))
                    })?;
                let value =
                    Imposter::parse_with_arguments(&value, scalars_to_strings(&self.arguments))?;
                Ok(Action::Set {
                    name,
                    frequency,
                    field,
                    value,
                    condition,
                })
            }
            _ => Err(ConfigError::UnknownAction {
                table: table.to_string(),
                action: name,
                kind,
            }),
        }
    }
}

/// Render a YAML scalar as text; sequences and mappings yield `None`.
fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
        serde_yaml::Value::Null | serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            None
        }
    }
}

fn scalars_to_strings(values: &[serde_yaml::Value]) -> Vec<String> {
    values
        .iter()
        .map(|v| yaml_scalar_to_string(v).unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imposter::DirectValue;
    use std::io::Write;

    const SAMPLE: &str = r#"
db_path: ":memory:"
output:
  format: json
  path: output
delete_behaviour: soft
inter_action_delay: 0.5
seed: 7
tables:
  - name: customers
    fields:
      - name: id
        type: integer
        value: increment
        is_pk: true
      - name: code
        type: varchar
        value: "C-{0}-{1}"
        arguments: [north, 7]
      - name: tier
        type: varchar
        value: one_of(gold, silver)
    actions:
      - name: signup
        action: create
        frequency: 0.6
      - name: retier
        action: Set
        field: tier
        value: one_of(gold, silver, bronze)
        where_condition: customers.id == table_random(customers, id, 0)
        frequency: 0.3
      - name: churn
        action: remove
        frequency: 0.1
  - name: orders
    fields:
      - name: id
        type: integer
        value: increment
        is_pk: true
      - name: customer_id
        type: integer
        value: table_random(customers, id, 0)
    actions:
      - name: place
        action: create
        frequency: 1
"#;

    #[test]
    fn test_load_sample() {
        let config = SimulationConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.db_path, PathBuf::from(":memory:"));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.delete_policy, DeletePolicy::Soft);
        assert_eq!(config.inter_action_delay, 0.5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.schema.table_names(), vec!["customers", "orders"]);

        let customers = config.schema.get_table("customers").unwrap();
        assert_eq!(customers.actions.len(), 3);
        assert!(matches!(customers.actions[1], Action::Set { .. }));
        assert_eq!(
            customers.get_field("code").unwrap().imposter,
            Imposter::Direct(DirectValue::Literal {
                text: "C-{0}-{1}".to_string(),
                arguments: vec!["north".to_string(), "7".to_string()],
            })
        );
        assert!(matches!(
            &customers.actions[2],
            Action::Remove { condition: None, .. }
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = SimulationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.schema.tables().len(), 2);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimulationConfig::from_file("/nonexistent/southwind.yaml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_policy_and_format_parsing() {
        assert_eq!("hard".parse::<DeletePolicy>().unwrap(), DeletePolicy::Hard);
        assert_eq!("SOFT".parse::<DeletePolicy>().unwrap(), DeletePolicy::Soft);
        assert!("purge".parse::<DeletePolicy>().is_err());
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("parquet".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_unknown_lookup_table() {
        let yaml = SAMPLE.replace(
            "value: table_random(customers, id, 0)",
            "value: table_random(clients, id, 0)",
        );
        match SimulationConfig::from_yaml(&yaml) {
            Err(ConfigError::TableNotFound { table, .. }) => assert_eq!(table, "clients"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_lookup_field() {
        let yaml = SAMPLE.replace(
            "value: table_random(customers, id, 0)",
            "value: table_random(customers, email, 0)",
        );
        assert!(matches!(
            SimulationConfig::from_yaml(&yaml),
            Err(ConfigError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_where_field() {
        let yaml = SAMPLE.replace(
            "where_condition: customers.id == table_random(customers, id, 0)",
            "where_condition: customers.uid == 3",
        );
        assert!(matches!(
            SimulationConfig::from_yaml(&yaml),
            Err(ConfigError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_where_clause() {
        let yaml = SAMPLE.replace(
            "where_condition: customers.id == table_random(customers, id, 0)",
            "where_condition: customers.id is 3",
        );
        assert!(matches!(
            SimulationConfig::from_yaml(&yaml),
            Err(ConfigError::InvalidWhereClause { .. })
        ));
    }

    #[test]
    fn test_frequency_out_of_range() {
        let yaml = SAMPLE.replace("frequency: 0.6", "frequency: 1.5");
        assert!(matches!(
            SimulationConfig::from_yaml(&yaml),
            Err(ConfigError::InvalidFrequency { .. })
        ));
        let yaml = SAMPLE.replace("frequency: 0.6", "frequency: 0");
        assert!(matches!(
            SimulationConfig::from_yaml(&yaml),
            Err(ConfigError::InvalidFrequency { .. })
        ));
    }

    #[test]
    fn test_reserved_field_name() {
        let yaml = SAMPLE.replace("- name: tier", "- name: change_type");
        assert!(matches!(
            SimulationConfig::from_yaml(&yaml),
            Err(ConfigError::ReservedField { .. })
        ));
    }

    #[test]
    fn test_set_unknown_field() {
        let yaml = SAMPLE.replace("field: tier", "field: rank");
        assert!(matches!(
            SimulationConfig::from_yaml(&yaml),
            Err(ConfigError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_action_kind() {
        let yaml = SAMPLE.replace("action: remove", "action: truncate");
        assert!(matches!(
            SimulationConfig::from_yaml(&yaml),
            Err(ConfigError::UnknownAction { .. })
        ));
    }

    #[test]
    fn test_negative_delay() {
        let yaml = SAMPLE.replace("inter_action_delay: 0.5", "inter_action_delay: -1");
        assert!(matches!(
            SimulationConfig::from_yaml(&yaml),
            Err(ConfigError::InvalidSetting(_))
        ));
    }

    #[test]
    fn test_missing_tables() {
        let yaml = "db_path: x\noutput: {format: json, path: out}\ndelete_behaviour: soft\ninter_action_delay: 0\n";
        assert!(matches!(
            SimulationConfig::from_yaml(yaml),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_duplicate_table() {
        let yaml = SAMPLE.replace("- name: orders", "- name: customers");
        assert!(matches!(
            SimulationConfig::from_yaml(&yaml),
            Err(ConfigError::Duplicate { .. })
        ));
    }
}
