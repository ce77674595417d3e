use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while building a `SchemaDescriptor`
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid resource name: {0}")]
    InvalidResourceName(String),

    #[error("Invalid collection name: {0}")]
    InvalidCollectionName(String),

    #[error("Duplicate field '{field}' in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    #[error("Field name '{0}' is reserved")]
    ReservedField(String),

    #[error("Invalid field name: {0}")]
    InvalidFieldName(String),

    #[error("Default for field '{field}' does not match type {expected}")]
    InvalidDefault { field: String, expected: String },

    #[error("Required field '{0}' cannot declare a default")]
    RequiredWithDefault(String),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read schema file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Input rejected by a descriptor, with one message per offending field
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: HashMap<String, String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn with_fields(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        Self {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_id(id: &str) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert("id".to_string(), format!("Invalid identifier format: {}", id));
        Self::with_fields("Invalid identifier", field_errors)
    }
}
