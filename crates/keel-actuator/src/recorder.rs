use std::sync::Arc;

use keel_core::Clock;
use keel_core::models::events::{
    ApplicationEvent, ApplicationEventType, ResourceEvent, ResourceEventType,
};
use keel_core::models::resource::Resource;
use keel_core::notification::{EventPublisher, Notification};
use keel_storage::{EventLog, StorageError};

/// Appends timestamped events and publishes the ones that were written.
#[derive(Clone)]
pub struct EventRecorder {
    events: Arc<dyn EventLog>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl EventRecorder {
    pub fn new(
        events: Arc<dyn EventLog>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            publisher,
            clock,
        }
    }

    pub fn events(&self) -> &Arc<dyn EventLog> {
        &self.events
    }

    pub async fn resource(
        &self,
        resource: &Resource,
        details: ResourceEventType,
    ) -> Result<bool, StorageError> {
        let event = ResourceEvent::new(resource, details, self.clock.now());
        let written = self.events.append_resource_event(event.clone()).await?;
        if written {
            self.publisher.publish(Notification::Resource(event));
        }
        Ok(written)
    }

    pub async fn application(
        &self,
        application: &str,
        details: ApplicationEventType,
    ) -> Result<bool, StorageError> {
        let event = ApplicationEvent::new(application, details, self.clock.now());
        let written = self.events.append_application_event(event.clone()).await?;
        if written {
            self.publisher.publish(Notification::Application(event));
        }
        Ok(written)
    }
}
