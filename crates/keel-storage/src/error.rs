use keel_core::models::constraint_state::{ConstraintStateKey, ConstraintStatus};
use keel_core::models::resource::ResourceId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no resource with id {0}")]
    NoSuchResourceId(ResourceId),

    #[error("no application named {0}")]
    NoSuchApplication(String),

    #[error("no delivery config named {0}")]
    NoSuchDeliveryConfig(String),

    #[error("no artifact {reference} in delivery config {delivery_config}")]
    NoSuchArtifact {
        delivery_config: String,
        reference: String,
    },

    #[error("constraint state {key} is already {status} and can only be overridden")]
    ConstraintStateSealed {
        key: ConstraintStateKey,
        status: ConstraintStatus,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}
