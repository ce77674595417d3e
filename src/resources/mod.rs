//! Resource registration.
//!
//! A resource is a `SchemaDescriptor` bound to a `Facade`. The registry owns
//! one facade per resource, rejects duplicate names and collections, and
//! builds each resource's HTTP routes, applying any per-resource extension.

pub mod person;

use axum::Router;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::controller::Controller;
use crate::facade::Facade;
use crate::handlers::resource::ResourceRouter;
use crate::schema::{SchemaDescriptor, SchemaError};
use crate::store::{DocumentStore, StoreError};

/// Top-level paths the server mounts itself; no resource may take them
pub const RESERVED_NAMES: &[&str] = &["health"];

/// Adds resource-specific routes on top of the generic five
pub type Extension = fn(ResourceRouter) -> ResourceRouter;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Resource name '{0}' is reserved by the server")]
    ReservedResource(String),

    #[error("Resource '{0}' is already registered")]
    DuplicateResource(String),

    #[error("Collection '{collection}' is already used by resource '{owner}'")]
    DuplicateCollection { collection: String, owner: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to read schema directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

struct Resource {
    facade: Arc<Facade>,
    extension: Option<Extension>,
}

pub struct ResourceRegistry {
    store: Arc<dyn DocumentStore>,
    resources: BTreeMap<String, Resource>,
}

impl ResourceRegistry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            resources: BTreeMap::new(),
        }
    }

    /// Registry with the built-in resources plus any descriptors in `config.schema_dir`
    pub fn from_config(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new(store);
        registry.register_with(person::descriptor()?, person::extend)?;
        if let Some(dir) = &config.schema_dir {
            let loaded = registry.load_dir(dir)?;
            info!("Loaded {} resource descriptor(s) from {}", loaded, dir.display());
        }
        Ok(registry)
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn register(&mut self, schema: SchemaDescriptor) -> Result<Arc<Facade>, RegistryError> {
        self.insert(schema, None)
    }

    pub fn register_with(
        &mut self,
        schema: SchemaDescriptor,
        extension: Extension,
    ) -> Result<Arc<Facade>, RegistryError> {
        self.insert(schema, Some(extension))
    }

    fn insert(
        &mut self,
        schema: SchemaDescriptor,
        extension: Option<Extension>,
    ) -> Result<Arc<Facade>, RegistryError> {
        if RESERVED_NAMES.iter().any(|reserved| *reserved == schema.name()) {
            return Err(RegistryError::ReservedResource(schema.name().to_string()));
        }
        if self.resources.contains_key(schema.name()) {
            return Err(RegistryError::DuplicateResource(schema.name().to_string()));
        }
        if let Some(owner) = self
            .resources
            .values()
            .find(|r| r.facade.schema().collection() == schema.collection())
        {
            return Err(RegistryError::DuplicateCollection {
                collection: schema.collection().to_string(),
                owner: owner.facade.name().to_string(),
            });
        }

        let name = schema.name().to_string();
        let facade = Arc::new(Facade::new(schema, self.store.clone()));
        self.resources.insert(
            name.clone(),
            Resource {
                facade: facade.clone(),
                extension,
            },
        );
        info!("Registered resource '{}'", name);
        Ok(facade)
    }

    /// Register every `*.yaml`, `*.yml` and `*.json` descriptor in `dir`
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, RegistryError> {
        let io_err = |source| RegistryError::Io {
            path: dir.display().to_string(),
            source,
        };
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml") | Some("json")
            ) {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            self.register(SchemaDescriptor::from_file(path)?)?;
        }
        Ok(paths.len())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Facade>> {
        self.resources.get(name).map(|r| r.facade.clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.resources.keys().cloned().collect()
    }

    /// Create backing collections for every registered resource
    pub async fn prepare_all(&self) -> Result<(), StoreError> {
        for resource in self.resources.values() {
            resource.facade.prepare().await?;
        }
        Ok(())
    }

    /// Routes for every resource, each mounted at `/<name>`
    pub fn routes(&self) -> Router {
        self.resources
            .values()
            .fold(Router::new(), |router, resource| {
                let base = ResourceRouter::new(Controller::new(resource.facade.clone()));
                let resource_router = match resource.extension {
                    Some(extend) => extend(base),
                    None => base,
                };
                info!("Mounted resource routes at {}", resource_router.prefix());
                router.merge(resource_router.into_router())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, FieldType};
    use crate::store::MemoryStore;

    fn pet() -> SchemaDescriptor {
        SchemaDescriptor::new("pet", None, vec![FieldDef::required("species", FieldType::String)]).unwrap()
    }

    #[test]
    fn registers_builtin_person() {
        let registry =
            ResourceRegistry::from_config(Arc::new(MemoryStore::new()), &AppConfig::development()).unwrap();
        let person = registry.get("person").unwrap();
        assert_eq!(person.schema().collection(), "people");
        assert_eq!(registry.names(), vec!["person".to_string()]);
    }

    #[test]
    fn rejects_duplicate_names_and_collections() {
        let mut registry = ResourceRegistry::new(Arc::new(MemoryStore::new()));
        registry.register(pet()).unwrap();
        assert!(matches!(
            registry.register(pet()),
            Err(RegistryError::DuplicateResource(_))
        ));

        let clash = SchemaDescriptor::new("animal", Some("pet".into()), vec![]).unwrap();
        assert!(matches!(
            registry.register(clash),
            Err(RegistryError::DuplicateCollection { .. })
        ));
    }

    #[test]
    fn rejects_server_owned_names() {
        let mut registry = ResourceRegistry::new(Arc::new(MemoryStore::new()));
        let health = SchemaDescriptor::new("health", Some("health_checks".into()), vec![]).unwrap();
        assert!(matches!(
            registry.register(health),
            Err(RegistryError::ReservedResource(name)) if name == "health"
        ));
        assert!(registry.names().is_empty());
    }

    #[test]
    fn reserved_descriptor_in_directory_is_an_error() {
        let dir = std::env::temp_dir().join(format!("people-api-schemas-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("health.yaml"), "name: health\n").unwrap();

        let mut config = AppConfig::development();
        config.schema_dir = Some(dir.clone());
        let result = ResourceRegistry::from_config(Arc::new(MemoryStore::new()), &config);
        assert!(matches!(result, Err(RegistryError::ReservedResource(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn loads_descriptors_from_directory() {
        let dir = std::env::temp_dir().join(format!("people-api-schemas-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("pet.yaml"), "name: pet\nfields:\n  - name: species\n    type: string\n").unwrap();
        std::fs::write(
            dir.join("car.json"),
            r#"{"name": "car", "fields": [{"name": "wheels", "type": "integer", "default": 4}]}"#,
        )
        .unwrap();
        std::fs::write(dir.join("README.txt"), "ignored").unwrap();

        let mut registry = ResourceRegistry::new(Arc::new(MemoryStore::new()));
        assert_eq!(registry.load_dir(&dir).unwrap(), 2);
        assert!(registry.get("pet").is_some());
        assert!(registry.get("car").is_some());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
