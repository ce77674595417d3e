//! Generic data access for one resource.
//!
//! A `Facade` pairs a `SchemaDescriptor` with a collection in the shared
//! `DocumentStore`. Every resource gets the same validation and error
//! semantics; nothing here is resource-specific.
//!
//! Operations are independent store round-trips. There is no locking across
//! calls, so a `get` followed by an `update` may interleave with another
//! writer. A caller that drops an operation's future (e.g. on request
//! timeout) gets no guarantee about whether the store applied it.

pub mod error;

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::schema::{SchemaDescriptor, ValidationError};
use crate::store::{Document, DocumentId, DocumentStore, Filter, StoreError};
use crate::types::Operation;

pub use error::FacadeError;

pub struct Facade {
    schema: Arc<SchemaDescriptor>,
    store: Arc<dyn DocumentStore>,
}

impl Facade {
    pub fn new(schema: SchemaDescriptor, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            schema: Arc::new(schema),
            store,
        }
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Resource name of the bound descriptor
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    fn collection(&self) -> &str {
        self.schema.collection()
    }

    /// Make sure the backing collection exists
    pub async fn prepare(&self) -> Result<(), StoreError> {
        self.store.ensure_collection(self.collection()).await
    }

    /// Validate `input`, apply defaults and insert it
    pub async fn create(&self, input: Value) -> Result<Document, FacadeError> {
        let fields = self
            .schema
            .validate_create(input)
            .map_err(|e| self.rejected(Operation::Create, e))?;

        let document = self
            .store
            .insert(self.collection(), fields)
            .await
            .map_err(|e| self.failed(Operation::Create, e))?;

        debug!("Created {} {}", self.name(), document.id);
        Ok(document)
    }

    /// Documents matching an exact-match filter, or all of them
    pub async fn list(&self, filter: Option<Filter>) -> Result<Vec<Document>, FacadeError> {
        let filter = self.schema.normalize_filter(filter.unwrap_or_default());
        let documents = self
            .store
            .find(self.collection(), &filter)
            .await
            .map_err(|e| self.failed(Operation::List, e))?;

        debug!("Listed {} {} document(s)", documents.len(), self.name());
        Ok(documents)
    }

    /// Number of documents `list` would return for the same filter
    pub async fn count(&self, filter: Option<Filter>) -> Result<usize, FacadeError> {
        let filter = self.schema.normalize_filter(filter.unwrap_or_default());
        self.store
            .find(self.collection(), &filter)
            .await
            .map(|documents| documents.len())
            .map_err(|e| self.failed(Operation::Count, e))
    }

    pub async fn get(&self, id: &str) -> Result<Document, FacadeError> {
        let id = self.parse_id(Operation::Get, id)?;
        self.store
            .find_one(self.collection(), id)
            .await
            .map_err(|e| self.failed(Operation::Get, e))?
            .ok_or_else(|| FacadeError::not_found(self.name(), id))
    }

    /// Merge a partial field map into an existing document. The patch is
    /// validated before the store is touched, so a bad patch is a validation
    /// error even when `id` is absent. `null` clears an optional field.
    pub async fn update(&self, id: &str, patch: Value) -> Result<Document, FacadeError> {
        let id = self.parse_id(Operation::Update, id)?;
        let patch = self
            .schema
            .validate_patch(patch)
            .map_err(|e| self.rejected(Operation::Update, e))?;

        let document = self
            .store
            .update_one(self.collection(), id, patch)
            .await
            .map_err(|e| self.failed(Operation::Update, e))?
            .ok_or_else(|| FacadeError::not_found(self.name(), id))?;

        debug!("Updated {} {}", self.name(), document.id);
        Ok(document)
    }

    /// Remove a document and return it. A repeated delete is `NotFound`.
    pub async fn delete(&self, id: &str) -> Result<Document, FacadeError> {
        let id = self.parse_id(Operation::Delete, id)?;
        let document = self
            .store
            .delete_one(self.collection(), id)
            .await
            .map_err(|e| self.failed(Operation::Delete, e))?
            .ok_or_else(|| FacadeError::not_found(self.name(), id))?;

        debug!("Deleted {} {}", self.name(), document.id);
        Ok(document)
    }

    fn parse_id(&self, operation: Operation, id: &str) -> Result<DocumentId, FacadeError> {
        DocumentId::parse_str(id).map_err(|_| self.rejected(operation, ValidationError::invalid_id(id)))
    }

    fn rejected(&self, operation: Operation, err: ValidationError) -> FacadeError {
        warn!("Rejected {} {}: {:?}", self.name(), operation, err.field_errors);
        FacadeError::Validation(err)
    }

    fn failed(&self, operation: Operation, err: StoreError) -> FacadeError {
        error!("Store failure during {} {}: {}", self.name(), operation, err);
        FacadeError::store(operation, err)
    }
}
