use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value types a field may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    /// RFC 3339 timestamp or plain `YYYY-MM-DD` date, stored as a string
    Date,
    Object,
    Array,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }

    /// Check a non-null JSON value against this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Date => value.as_str().map(is_date).unwrap_or(false),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
        }
    }

    /// Convert a query-string value into this type when it parses.
    /// Values that don't parse are returned unchanged.
    pub fn coerce(&self, raw: &str) -> Value {
        let parsed = match self {
            FieldType::Integer => raw.parse::<i64>().ok().map(Value::from),
            FieldType::Number => raw
                .parse::<i64>()
                .ok()
                .map(Value::from)
                .or_else(|| raw.parse::<f64>().ok().and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))),
            FieldType::Boolean => raw.parse::<bool>().ok().map(Value::Bool),
            FieldType::Object | FieldType::Array => serde_json::from_str::<Value>(raw)
                .ok()
                .filter(|v| self.accepts(v)),
            FieldType::String | FieldType::Date => None,
        };
        parsed.unwrap_or_else(|| Value::String(raw.to_string()))
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_date(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// One declared field of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldDef {
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}
