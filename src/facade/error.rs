use thiserror::Error;

use crate::schema::ValidationError;
use crate::store::StoreError;
use crate::types::Operation;

/// Typed failures of a `Facade` operation
#[derive(Debug, Error)]
pub enum FacadeError {
    /// Caller input does not conform to the resource descriptor
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The referenced identifier does not exist
    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },

    /// The document store failed; never retried at this layer
    #[error("Store error during {operation}: {source}")]
    Store {
        operation: Operation,
        #[source]
        source: StoreError,
    },
}

impl FacadeError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        FacadeError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn store(operation: Operation, source: StoreError) -> Self {
        FacadeError::Store { operation, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FacadeError::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FacadeError::Validation(_))
    }
}
