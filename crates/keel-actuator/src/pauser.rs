use std::sync::Arc;

use keel_core::models::events::{ApplicationEventType, ResourceEventType};
use keel_core::models::resource::ResourceId;
use keel_storage::{DeliveryConfigRepository, PauseScope, PausedRepository, ResourceRepository};
use tracing::info;

use crate::error::ActuatorError;
use crate::recorder::EventRecorder;

/// Operator entry point for stopping and restarting actuation.
pub struct ActuationPauser {
    delivery_configs: Arc<dyn DeliveryConfigRepository>,
    resources: Arc<dyn ResourceRepository>,
    paused: Arc<dyn PausedRepository>,
    recorder: EventRecorder,
}

impl ActuationPauser {
    pub fn new(
        delivery_configs: Arc<dyn DeliveryConfigRepository>,
        resources: Arc<dyn ResourceRepository>,
        paused: Arc<dyn PausedRepository>,
        recorder: EventRecorder,
    ) -> Self {
        Self {
            delivery_configs,
            resources,
            paused,
            recorder,
        }
    }

    pub async fn pause_application(&self, application: &str, triggered_by: &str) -> Result<(), ActuatorError> {
        self.delivery_configs.get_by_application(application).await?;
        if self.paused.pause(PauseScope::Application, application).await? {
            info!(application, triggered_by, "application actuation paused");
            self.recorder
                .application(
                    application,
                    ApplicationEventType::ActuationPaused {
                        triggered_by: triggered_by.to_string(),
                    },
                )
                .await?;
        }
        Ok(())
    }

    pub async fn resume_application(&self, application: &str, triggered_by: &str) -> Result<(), ActuatorError> {
        self.delivery_configs.get_by_application(application).await?;
        if !self.paused.resume(PauseScope::Application, application).await? {
            return Ok(());
        }

        info!(application, triggered_by, "application actuation resumed");
        self.recorder
            .application(
                application,
                ApplicationEventType::ActuationResumed {
                    triggered_by: triggered_by.to_string(),
                },
            )
            .await?;
        for resource in self.resources.get_by_application(application).await? {
            self.recorder
                .resource(
                    &resource,
                    ResourceEventType::ActuationResumed {
                        triggered_by: triggered_by.to_string(),
                    },
                )
                .await?;
        }
        Ok(())
    }

    pub async fn pause_resource(&self, id: &ResourceId, triggered_by: &str) -> Result<(), ActuatorError> {
        let resource = self.resources.get(id).await?;
        if self.paused.pause(PauseScope::Resource, id.as_str()).await? {
            info!(resource_id = %id, triggered_by, "resource actuation paused");
            self.recorder
                .resource(
                    &resource,
                    ResourceEventType::ActuationPaused {
                        reason: format!("paused by {triggered_by}"),
                    },
                )
                .await?;
        }
        Ok(())
    }

    pub async fn resume_resource(&self, id: &ResourceId, triggered_by: &str) -> Result<(), ActuatorError> {
        let resource = self.resources.get(id).await?;
        if self.paused.resume(PauseScope::Resource, id.as_str()).await? {
            info!(resource_id = %id, triggered_by, "resource actuation resumed");
            self.recorder
                .resource(
                    &resource,
                    ResourceEventType::ActuationResumed {
                        triggered_by: triggered_by.to_string(),
                    },
                )
                .await?;
        }
        Ok(())
    }
}
