use std::collections::HashMap;

use keel_core::models::events::{ApplicationEvent, ResourceEvent};
use keel_core::models::resource::ResourceId;
use tokio::sync::Mutex;

use crate::BoxFuture;
use crate::error::StorageError;
use crate::event_log::EventLog;

/// Per-entity histories, each kept sorted oldest-first by timestamp.
#[derive(Default)]
pub struct InMemoryEventLog {
    resources: Mutex<HashMap<ResourceId, Vec<ResourceEvent>>>,
    applications: Mutex<HashMap<String, Vec<ApplicationEvent>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventLog for InMemoryEventLog {
    fn append_resource_event(&self, event: ResourceEvent) -> BoxFuture<'_, Result<bool, StorageError>> {
        Box::pin(async move {
            let mut resources = self.resources.lock().await;
            let history = resources.entry(event.resource_id.clone()).or_default();

            if event.details.ignore_repeated_in_history()
                && history
                    .last()
                    .is_some_and(|last| last.details.same_type(&event.details))
            {
                tracing::debug!(
                    resource_id = %event.resource_id,
                    event = event.details.name(),
                    "collapsing repeated event"
                );
                return Ok(false);
            }

            // equal timestamps keep append order
            let at = history.partition_point(|e| e.timestamp <= event.timestamp);
            history.insert(at, event);
            Ok(true)
        })
    }

    fn append_application_event(
        &self,
        event: ApplicationEvent,
    ) -> BoxFuture<'_, Result<bool, StorageError>> {
        Box::pin(async move {
            let mut applications = self.applications.lock().await;
            let history = applications.entry(event.application.clone()).or_default();

            if event.details.ignore_repeated_in_history()
                && history
                    .last()
                    .is_some_and(|last| last.details.same_type(&event.details))
            {
                tracing::debug!(
                    application = %event.application,
                    event = event.details.name(),
                    "collapsing repeated event"
                );
                return Ok(false);
            }

            let at = history.partition_point(|e| e.timestamp <= event.timestamp);
            history.insert(at, event);
            Ok(true)
        })
    }

    fn resource_history<'a>(
        &'a self,
        id: &'a ResourceId,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ResourceEvent>, StorageError>> {
        Box::pin(async move {
            let resources = self.resources.lock().await;
            Ok(resources
                .get(id)
                .map(|history| history.iter().rev().take(limit).cloned().collect())
                .unwrap_or_default())
        })
    }

    fn application_history<'a>(
        &'a self,
        application: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ApplicationEvent>, StorageError>> {
        Box::pin(async move {
            let applications = self.applications.lock().await;
            Ok(applications
                .get(application)
                .map(|history| history.iter().rev().take(limit).cloned().collect())
                .unwrap_or_default())
        })
    }
}
