use keel_core::models::events::{ApplicationEvent, ResourceEvent};
use keel_core::models::resource::ResourceId;

use crate::BoxFuture;
use crate::error::StorageError;

/// Append-only history of typed events, keyed by owning entity.
///
/// Events are never updated or deleted. Histories come back newest first.
/// Appending an event whose type collapses repeats
/// (`ignore_repeated_in_history`) is a no-op when the entity's newest event
/// has the same type; the return value says whether anything was written.
pub trait EventLog: Send + Sync {
    fn append_resource_event(&self, event: ResourceEvent) -> BoxFuture<'_, Result<bool, StorageError>>;

    fn append_application_event(
        &self,
        event: ApplicationEvent,
    ) -> BoxFuture<'_, Result<bool, StorageError>>;

    fn resource_history<'a>(
        &'a self,
        id: &'a ResourceId,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ResourceEvent>, StorageError>>;

    fn application_history<'a>(
        &'a self,
        application: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ApplicationEvent>, StorageError>>;

    fn last_resource_event<'a>(
        &'a self,
        id: &'a ResourceId,
    ) -> BoxFuture<'a, Result<Option<ResourceEvent>, StorageError>> {
        Box::pin(async move { Ok(self.resource_history(id, 1).await?.into_iter().next()) })
    }

    fn last_application_event<'a>(
        &'a self,
        application: &'a str,
    ) -> BoxFuture<'a, Result<Option<ApplicationEvent>, StorageError>> {
        Box::pin(async move {
            Ok(self
                .application_history(application, 1)
                .await?
                .into_iter()
                .next())
        })
    }
}
