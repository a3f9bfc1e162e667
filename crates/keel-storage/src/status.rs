use keel_core::models::resource::ResourceId;
use keel_core::models::resource_status::ResourceStatus;
use keel_core::{STATUS_HISTORY_WINDOW, derive_status};

use crate::error::StorageError;
use crate::event_log::EventLog;
use crate::repository::ResourceRepository;

/// Current status of a managed resource, derived from its recent history.
///
/// Fails with [`StorageError::NoSuchResourceId`] when the resource is not
/// (or no longer) under management.
pub async fn resource_status(
    resources: &dyn ResourceRepository,
    events: &dyn EventLog,
    id: &ResourceId,
) -> Result<ResourceStatus, StorageError> {
    if !resources.has(id).await? {
        return Err(StorageError::NoSuchResourceId(id.clone()));
    }
    let history = events.resource_history(id, STATUS_HISTORY_WINDOW).await?;
    Ok(derive_status(&history))
}
