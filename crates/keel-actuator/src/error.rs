use keel_core::models::resource::ResourceKind;
use keel_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("no resource handler supports {0}")]
    UnsupportedKind(ResourceKind),

    /// The handler cannot determine current state for a reason that won't
    /// go away by retrying (missing dependency, bad reference, ...).
    #[error("current state cannot be resolved: {0}")]
    Unresolvable(String),

    #[error("resource handler error: {0}")]
    Handler(String),

    #[error("resource creation failed: {0}")]
    CreateFailed(String),

    #[error("resource update failed: {0}")]
    UpdateFailed(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ActuatorError {
    /// Prepend resource identity to the error message.
    pub fn with_resource(self, kind: &ResourceKind, name: &str) -> Self {
        match self {
            Self::Unresolvable(msg) => Self::Unresolvable(format!("{kind} ({name}): {msg}")),
            Self::Handler(msg) => Self::Handler(format!("{kind} ({name}): {msg}")),
            Self::CreateFailed(msg) => Self::CreateFailed(format!("{kind} ({name}): {msg}")),
            Self::UpdateFailed(msg) => Self::UpdateFailed(format!("{kind} ({name}): {msg}")),
            other => other,
        }
    }
}

/// Walk the full error chain and join all causes into one string.
///
/// Plugin errors often have terse `Display` impls but useful detail in the
/// source chain; this is what ends up in `ResourceCheckError` events.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
