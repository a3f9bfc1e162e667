use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid resource kind: {0} (expected group/kind@vN)")]
    InvalidResourceKind(String),

    #[error("invalid resource id: {0}")]
    InvalidResourceId(String),

    #[error("delivery config {delivery_config} has no environment named {environment}")]
    UnknownEnvironment {
        delivery_config: String,
        environment: String,
    },
}
