/// Column types and value normalization
///
/// Values reach the data access layer as loosely typed JSON. Each column
/// type accepts the representations a form or JSON client is likely to send
/// and converts them to one canonical form, so that stored values and filter
/// values compare equal regardless of which backend holds them.
///
/// | Type       | Accepts                                   | Stored as            |
/// |------------|-------------------------------------------|----------------------|
/// | `Integer`  | integer, numeric string                   | integer              |
/// | `Boolean`  | bool, `"true"`/`"false"`, `1`/`0`         | bool                 |
/// | `String`   | string, number, bool (max length checked) | string               |
/// | `Text`     | string, number, bool                      | string               |
/// | `Enum`     | string or number matching a value         | string               |
/// | `Time`     | `HH:MM` or `HH:MM:SS`                     | `HH:MM:SS`           |
/// | `DateTime` | RFC 3339, `YYYY-MM-DD HH:MM:SS`, date     | RFC 3339 UTC, millis |

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde_json::Value;

use super::EntityKind;
use crate::error::FieldViolation;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    /// Bounded string (`VARCHAR(max)`)
    String { max: usize },
    Text,
    Boolean,
    /// One of a fixed set of string values (compared exactly, diacritics included)
    Enum(&'static [&'static str]),
    /// Time of day without date
    Time,
    /// Instant in UTC
    DateTime,
}

/// Value used when a caller omits a field on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Bool(bool),
}

impl FieldDefault {
    pub fn to_value(self) -> Value {
        match self {
            FieldDefault::Bool(value) => Value::Bool(value),
        }
    }
}

/// Caller-writable column
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<FieldDefault>,

    /// Kind whose primary key this column references
    pub references: Option<EntityKind>,
}

impl FieldDef {
    /// Non-nullable column without default
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            unique: false,
            default: None,
            references: None,
        }
    }

    /// Nullable column
    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
            unique: false,
            default: None,
            references: None,
        }
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn default_value(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn references(mut self, target: EntityKind) -> Self {
        self.references = Some(target);
        self
    }
}

pub(crate) fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl FieldType {
    /// Short description used in violation messages
    pub fn describe(&self) -> &'static str {
        match self {
            FieldType::Integer => "an integer",
            FieldType::String { .. } | FieldType::Text => "a string",
            FieldType::Boolean => "a boolean",
            FieldType::Enum(_) => "one of the allowed values",
            FieldType::Time => "a time of day (HH:MM[:SS])",
            FieldType::DateTime => "a date-time",
        }
    }

    /// Converts a non-null value to its canonical form
    pub fn normalize(
        &self,
        entity: EntityKind,
        field: &str,
        value: &Value,
    ) -> Result<Value, FieldViolation> {
        let wrong_type = || FieldViolation::WrongType {
            entity,
            field: field.to_string(),
            expected: self.describe(),
        };

        match self {
            FieldType::Integer => match value {
                Value::Number(n) => n.as_i64().map(Value::from).ok_or_else(wrong_type),
                Value::String(s) => s.trim().parse::<i64>().map(Value::from).map_err(|_| wrong_type()),
                _ => Err(wrong_type()),
            },
            FieldType::Boolean => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::Number(n) => match n.as_i64() {
                    Some(1) => Ok(Value::Bool(true)),
                    Some(0) => Ok(Value::Bool(false)),
                    _ => Err(wrong_type()),
                },
                Value::String(s) => match s.as_str() {
                    "true" | "1" => Ok(Value::Bool(true)),
                    "false" | "0" => Ok(Value::Bool(false)),
                    _ => Err(wrong_type()),
                },
                _ => Err(wrong_type()),
            },
            FieldType::String { max } => {
                let text = scalar_text(value).ok_or_else(wrong_type)?;
                if text.chars().count() > *max {
                    return Err(FieldViolation::TooLong {
                        entity,
                        field: field.to_string(),
                        max: *max,
                    });
                }
                Ok(Value::String(text))
            }
            FieldType::Text => scalar_text(value).map(Value::String).ok_or_else(wrong_type),
            FieldType::Enum(allowed) => {
                let text = scalar_text(value).ok_or_else(wrong_type)?;
                if allowed.contains(&text.as_str()) {
                    Ok(Value::String(text))
                } else {
                    Err(FieldViolation::NotAllowed {
                        entity,
                        field: field.to_string(),
                        allowed: allowed.join(", "),
                    })
                }
            }
            FieldType::Time => value
                .as_str()
                .and_then(parse_time)
                .map(|time| Value::String(time.format("%H:%M:%S").to_string()))
                .ok_or_else(wrong_type),
            FieldType::DateTime => value
                .as_str()
                .and_then(parse_datetime)
                .map(|instant| Value::String(format_timestamp(instant)))
                .ok_or_else(wrong_type),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}
