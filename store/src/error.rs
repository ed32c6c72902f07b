use thiserror::Error;
use wicket_types::UniqueField;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    /// The backend's atomic uniqueness constraint rejected a write.
    #[error("duplicate {0}")]
    Duplicate(UniqueField),

    /// Tables or databases have not been created; migrations have not run.
    #[error("storage schema not initialized: {0}")]
    SchemaMissing(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}

impl StoreError {
    /// Whether the store cannot serve requests at all (as opposed to a fault
    /// in a single operation). Operators fix these by deploying, not debugging.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::SchemaMissing(_) | Self::Unavailable(_))
    }
}
