use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::error::{SchemaError, ValidationError};
use super::field::FieldDef;

/// Field name reserved for the store-assigned identifier
pub const ID_FIELD: &str = "id";

/// On-disk shape of a descriptor file, checked by `SchemaDescriptor::new`
#[derive(Debug, Deserialize)]
struct RawDescriptor {
    name: String,
    collection: Option<String>,
    #[serde(default)]
    fields: Vec<FieldDef>,
}

/// Named, validated document shape for one resource
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDescriptor {
    name: String,
    collection: String,
    fields: Vec<FieldDef>,
}

impl SchemaDescriptor {
    pub fn new(
        name: impl Into<String>,
        collection: Option<String>,
        fields: Vec<FieldDef>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(SchemaError::InvalidResourceName(name));
        }

        let collection = collection.unwrap_or_else(|| name.replace('-', "_"));
        if !is_identifier(&collection) {
            return Err(SchemaError::InvalidCollectionName(collection));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if field.name == ID_FIELD {
                return Err(SchemaError::ReservedField(field.name.clone()));
            }
            if !is_identifier(&field.name) {
                return Err(SchemaError::InvalidFieldName(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    schema: name.clone(),
                    field: field.name.clone(),
                });
            }
            if let Some(default) = &field.default {
                if field.required {
                    return Err(SchemaError::RequiredWithDefault(field.name.clone()));
                }
                if !default.is_null() && !field.field_type.accepts(default) {
                    return Err(SchemaError::InvalidDefault {
                        field: field.name.clone(),
                        expected: field.field_type.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            name,
            collection,
            fields,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaError> {
        let raw: RawDescriptor = serde_yaml::from_str(content)?;
        Self::new(raw.name, raw.collection, raw.fields)
    }

    pub fn from_json_str(content: &str) -> Result<Self, SchemaError> {
        let raw: RawDescriptor = serde_json::from_str(content)?;
        Self::new(raw.name, raw.collection, raw.fields)
    }

    /// Load a descriptor file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate a full input document for insertion.
    ///
    /// Required fields must be present and non-null, present fields must match
    /// their declared type, absent optional fields receive their default, and
    /// undeclared keys are dropped.
    pub fn validate_create(&self, input: Value) -> Result<Map<String, Value>, ValidationError> {
        let mut input = expect_object(input)?;
        let mut output = Map::new();
        let mut field_errors = HashMap::new();

        for field in &self.fields {
            match input.remove(&field.name) {
                Some(Value::Null) | None => {
                    if field.required {
                        field_errors.insert(field.name.clone(), "This field is required".to_string());
                    } else if let Some(default) = &field.default {
                        output.insert(field.name.clone(), default.clone());
                    }
                }
                Some(value) => {
                    if field.field_type.accepts(&value) {
                        output.insert(field.name.clone(), value);
                    } else {
                        field_errors.insert(field.name.clone(), type_mismatch(field));
                    }
                }
            }
        }

        if !input.is_empty() {
            tracing::debug!(
                "Stripping undeclared fields from '{}' input: {:?}",
                self.name,
                input.keys().collect::<Vec<_>>()
            );
        }

        if field_errors.is_empty() {
            Ok(output)
        } else {
            Err(ValidationError::with_fields(
                format!("Invalid {} document", self.name),
                field_errors,
            ))
        }
    }

    /// Validate a partial update. Only the fields present are checked; every
    /// key must be declared, and `null` is only accepted for optional fields.
    pub fn validate_patch(&self, patch: Value) -> Result<Map<String, Value>, ValidationError> {
        let patch = expect_object(patch)?;
        let mut field_errors = HashMap::new();

        for (key, value) in &patch {
            let Some(field) = self.field(key) else {
                let message = if key == ID_FIELD {
                    "Identifier cannot be changed".to_string()
                } else {
                    "Unknown field".to_string()
                };
                field_errors.insert(key.clone(), message);
                continue;
            };

            if value.is_null() {
                if field.required {
                    field_errors.insert(key.clone(), "This field is required".to_string());
                }
            } else if !field.field_type.accepts(value) {
                field_errors.insert(key.clone(), type_mismatch(field));
            }
        }

        if field_errors.is_empty() {
            Ok(patch)
        } else {
            Err(ValidationError::with_fields(
                format!("Invalid {} update", self.name),
                field_errors,
            ))
        }
    }

    /// Coerce string filter values to the declared field type where they parse
    pub fn normalize_filter(&self, filter: Map<String, Value>) -> Map<String, Value> {
        filter
            .into_iter()
            .map(|(key, value)| {
                let value = match (self.field(&key), value) {
                    (Some(field), Value::String(raw)) => field.field_type.coerce(&raw),
                    (_, value) => value,
                };
                (key, value)
            })
            .collect()
    }
}

fn expect_object(value: Value) -> Result<Map<String, Value>, ValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::new("Expected JSON object")),
    }
}

fn type_mismatch(field: &FieldDef) -> String {
    format!("Expected {}", field.field_type)
}

/// Storage-safe identifier: letter or underscore first, then alphanumerics/underscores
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
