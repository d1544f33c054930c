//! Imposters: declarative value sources for fields, set actions and where conditions.
//!
//! An imposter is written as a short expression in the config:
//!
//! | Expression | Kind |
//! |---|---|
//! | `increment` | [`Imposter::Increment`] |
//! | `table_random(table, field, default)` | [`Imposter::RandomLookup`] |
//! | `static(value)` | [`DirectValue::Literal`] |
//! | `pattern("user_{index}")` | [`DirectValue::Pattern`] |
//! | `uuid()` | [`DirectValue::Uuid`] |
//! | `int_range(min, max)` | [`DirectValue::IntRange`] |
//! | `float_range(min, max)` | [`DirectValue::FloatRange`] |
//! | `one_of(a, b, c)` | [`DirectValue::OneOf`] |
//! | `weighted_bool(p)` | [`DirectValue::WeightedBool`] |
//! | `timestamp_range(start, end)` | [`DirectValue::TimestampRange`] |
//! | `timestamp_now()` | [`DirectValue::TimestampNow`] |
//! | anything else | [`DirectValue::Literal`] |
//!
//! Literals and patterns may carry positional arguments that fill `{0}`, `{1}`, ...

use crate::error::ConfigError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;

/// A value source that produces literal text when rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectValue {
    /// Fixed text, with `{n}` placeholders filled from `arguments`
    Literal {
        text: String,
        arguments: Vec<String>,
    },

    /// Pattern supporting `{index}`, `{uuid}`, `{rand:N}` and positional placeholders
    Pattern {
        pattern: String,
        arguments: Vec<String>,
    },

    /// Random UUID v4
    Uuid,

    /// Random integer in a range (inclusive)
    IntRange { min: i64, max: i64 },

    /// Random float in a range (inclusive)
    FloatRange { min: f64, max: f64 },

    /// Random selection from a list
    OneOf { values: Vec<String> },

    /// Boolean with the given probability of `true`
    WeightedBool { true_weight: f64 },

    /// Random timestamp between two instants, `start <= end`
    TimestampRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Current UTC timestamp at resolution time
    TimestampNow,
}

/// Declarative value-generation descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Imposter {
    /// Literal or generated value inlined into the statement
    Direct(DirectValue),

    /// `max(field) + 1` over the owning table, soft-deleted rows included
    Increment,

    /// Random live value of `field` in `table`, or `default` when none exist
    RandomLookup {
        table: String,
        field: String,
        default: String,
    },
}

impl Imposter {
    /// Plain literal with no arguments.
    pub fn literal(text: impl Into<String>) -> Self {
        Imposter::Direct(DirectValue::Literal {
            text: text.into(),
            arguments: Vec::new(),
        })
    }

    /// Parse an imposter expression without positional arguments.
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        Self::parse_with_arguments(expression, Vec::new())
    }

    /// Parse an imposter expression, attaching positional arguments to
    /// literal and pattern values.
    pub fn parse_with_arguments(
        expression: &str,
        arguments: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let expression = expression.trim();
        if expression.eq_ignore_ascii_case("increment") {
            return Ok(Imposter::Increment);
        }

        let Some((name, args)) = split_call(expression) else {
            return Ok(Imposter::Direct(DirectValue::Literal {
                text: unquote(expression).to_string(),
                arguments,
            }));
        };

        let invalid = |reason: &str| ConfigError::InvalidImposter {
            value: expression.to_string(),
            reason: reason.to_string(),
        };

        let direct = match name.to_ascii_lowercase().as_str() {
            "table_random" => {
                let [table, field, default]: [String; 3] = args
                    .try_into()
                    .map_err(|_| invalid("expected table_random(table, field, default)"))?;
                if table.is_empty() || field.is_empty() {
                    return Err(invalid("table and field must not be empty"));
                }
                return Ok(Imposter::RandomLookup {
                    table,
                    field,
                    default,
                });
            }
            "static" => {
                let [value]: [String; 1] = args
                    .try_into()
                    .map_err(|_| invalid("expected static(value)"))?;
                DirectValue::Literal {
                    text: value,
                    arguments,
                }
            }
            "pattern" => {
                let [pattern]: [String; 1] = args
                    .try_into()
                    .map_err(|_| invalid("expected pattern(\"...\")"))?;
                DirectValue::Pattern { pattern, arguments }
            }
            "uuid" => {
                if !args.is_empty() {
                    return Err(invalid("uuid() takes no arguments"));
                }
                DirectValue::Uuid
            }
            "int_range" => {
                let [min, max]: [String; 2] = args
                    .try_into()
                    .map_err(|_| invalid("expected int_range(min, max)"))?;
                let min: i64 = min.parse().map_err(|_| invalid("min is not an integer"))?;
                let max: i64 = max.parse().map_err(|_| invalid("max is not an integer"))?;
                if min > max {
                    return Err(invalid("min must not exceed max"));
                }
                DirectValue::IntRange { min, max }
            }
            "float_range" => {
                let [min, max]: [String; 2] = args
                    .try_into()
                    .map_err(|_| invalid("expected float_range(min, max)"))?;
                let min: f64 = min.parse().map_err(|_| invalid("min is not a number"))?;
                let max: f64 = max.parse().map_err(|_| invalid("max is not a number"))?;
                if !min.is_finite() || !max.is_finite() || !(max - min).is_finite() {
                    return Err(invalid("bounds must be finite and span a finite range"));
                }
                if min > max {
                    return Err(invalid("min must not exceed max"));
                }
                DirectValue::FloatRange { min, max }
            }
            "one_of" => {
                if args.is_empty() {
                    return Err(invalid("one_of needs at least one value"));
                }
                DirectValue::OneOf { values: args }
            }
            "weighted_bool" => {
                let [weight]: [String; 1] = args
                    .try_into()
                    .map_err(|_| invalid("expected weighted_bool(p)"))?;
                let true_weight: f64 = weight
                    .parse()
                    .map_err(|_| invalid("weight is not a number"))?;
                if !(0.0..=1.0).contains(&true_weight) {
                    return Err(invalid("weight must be within [0, 1]"));
                }
                DirectValue::WeightedBool { true_weight }
            }
            "timestamp_range" => {
                let [start, end]: [String; 2] = args
                    .try_into()
                    .map_err(|_| invalid("expected timestamp_range(start, end)"))?;
                let start = parse_timestamp(&start)
                    .ok_or_else(|| invalid("start is not an ISO 8601 timestamp or date"))?;
                let end = parse_timestamp(&end)
                    .ok_or_else(|| invalid("end is not an ISO 8601 timestamp or date"))?;
                if start > end {
                    return Err(invalid("start must not be after end"));
                }
                DirectValue::TimestampRange { start, end }
            }
            "timestamp_now" => {
                if !args.is_empty() {
                    return Err(invalid("timestamp_now() takes no arguments"));
                }
                DirectValue::TimestampNow
            }
            _ => DirectValue::Literal {
                text: expression.to_string(),
                arguments,
            },
        };

        Ok(Imposter::Direct(direct))
    }

    /// The `(table, field)` this imposter reads from, if it is a lookup.
    pub fn lookup_target(&self) -> Option<(&str, &str)> {
        match self {
            Imposter::RandomLookup { table, field, .. } => Some((table, field)),
            _ => None,
        }
    }
}

impl fmt::Display for Imposter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Imposter::Increment => write!(f, "increment"),
            Imposter::RandomLookup {
                table,
                field,
                default,
            } => write!(f, "table_random({table}, {field}, {default})"),
            Imposter::Direct(DirectValue::Literal { text, .. }) => write!(f, "{text}"),
            Imposter::Direct(DirectValue::Pattern { pattern, .. }) => {
                write!(f, "pattern(\"{pattern}\")")
            }
            Imposter::Direct(DirectValue::Uuid) => write!(f, "uuid()"),
            Imposter::Direct(DirectValue::IntRange { min, max }) => {
                write!(f, "int_range({min}, {max})")
            }
            Imposter::Direct(DirectValue::FloatRange { min, max }) => {
                write!(f, "float_range({min}, {max})")
            }
            Imposter::Direct(DirectValue::OneOf { values }) => {
                write!(f, "one_of({})", values.join(", "))
            }
            Imposter::Direct(DirectValue::WeightedBool { true_weight }) => {
                write!(f, "weighted_bool({true_weight})")
            }
            Imposter::Direct(DirectValue::TimestampRange { start, end }) => {
                write!(
                    f,
                    "timestamp_range({}, {})",
                    start.format(TIMESTAMP_DISPLAY_FORMAT),
                    end.format(TIMESTAMP_DISPLAY_FORMAT)
                )
            }
            Imposter::Direct(DirectValue::TimestampNow) => write!(f, "timestamp_now()"),
        }
    }
}

/// Split `name(a, b, "c, d")` into its name and unquoted, trimmed arguments.
///
/// Returns `None` when the expression is not shaped like a call.
fn split_call(expression: &str) -> Option<(&str, Vec<String>)> {
    let open = expression.find('(')?;
    if !expression.ends_with(')') {
        return None;
    }
    let name = expression[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let inner = &expression[open + 1..expression.len() - 1];
    if inner.trim().is_empty() {
        return Some((name, Vec::new()));
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for c in inner.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '(') => {
                depth += 1;
                current.push(c);
            }
            (None, ')') => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            (None, ',') if depth == 0 => {
                args.push(unquote(current.trim()).to_string());
                current.clear();
            }
            (None, c) => current.push(c),
        }
    }
    args.push(unquote(current.trim()).to_string());

    Some((name, args))
}

const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC) or a bare date at midnight UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Strip one layer of matching single or double quotes.
fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}
