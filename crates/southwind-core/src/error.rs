//! Error types for loading and validating a simulation config.

/// Error raised while loading or validating a simulation config.
///
/// Every variant is fatal at startup; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required setting is missing
    #[error("Missing setting: {0}")]
    Missing(String),

    /// A setting has a value outside of its allowed domain
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// A where condition could not be parsed
    #[error("Invalid where condition `{clause}`: {reason}")]
    InvalidWhereClause { clause: String, reason: String },

    /// A value expression could not be parsed
    #[error("Invalid value `{value}`: {reason}")]
    InvalidImposter { value: String, reason: String },

    /// Action kind is not one of create, remove or set
    #[error("Unknown action `{kind}` for action `{action}` in table `{table}`")]
    UnknownAction {
        table: String,
        action: String,
        kind: String,
    },

    /// Frequency outside of (0, 1]
    #[error("Frequency of action `{action}` in table `{table}` must be in (0, 1], got {frequency}")]
    InvalidFrequency {
        table: String,
        action: String,
        frequency: f64,
    },

    /// Referenced table does not exist
    #[error("Table `{table}` not found in config ({context})")]
    TableNotFound { table: String, context: String },

    /// Referenced field does not exist in its table
    #[error("Field `{field}` not found in table `{table}` ({context})")]
    FieldNotFound {
        table: String,
        field: String,
        context: String,
    },

    /// A user field uses a name the engine reserves
    #[error("Field `{field}` in table `{table}` uses a reserved name")]
    ReservedField { table: String, field: String },

    /// Two fields or two tables share a name
    #[error("Duplicate name `{name}` ({context})")]
    Duplicate { name: String, context: String },
}
