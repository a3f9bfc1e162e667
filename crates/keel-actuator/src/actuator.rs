use std::sync::Arc;

use keel_core::models::events::{ResourceEventType, Task};
use keel_core::models::resource::Resource;
use keel_storage::{PauseScope, PausedRepository};
use tracing::{debug, info, warn};

use crate::error::{ActuatorError, format_err_chain};
use crate::handler::ResourceHandler;
use crate::recorder::EventRecorder;

/// How a launched task ended, as reported by the task system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed { reason: String },
}

/// Checks one resource against its handler and launches whatever brings it
/// back to desired state.
pub struct ResourceActuator {
    handlers: Vec<Arc<dyn ResourceHandler>>,
    paused: Arc<dyn PausedRepository>,
    recorder: EventRecorder,
}

impl ResourceActuator {
    pub fn new(
        handlers: Vec<Arc<dyn ResourceHandler>>,
        paused: Arc<dyn PausedRepository>,
        recorder: EventRecorder,
    ) -> Self {
        Self {
            handlers,
            paused,
            recorder,
        }
    }

    fn handler_for(&self, resource: &Resource) -> Option<&Arc<dyn ResourceHandler>> {
        self.handlers.iter().find(|h| h.supports(&resource.kind))
    }

    /// Run one check of `resource`.
    ///
    /// Handler failures are recorded as events and swallowed; only storage
    /// failures and a missing handler are returned.
    pub async fn check_resource(&self, resource: &Resource) -> Result<(), ActuatorError> {
        if let Some(reason) = self.pause_reason(resource).await? {
            debug!(resource_id = %resource.id, %reason, "actuation paused, skipping check");
            self.recorder
                .resource(resource, ResourceEventType::ActuationPaused { reason })
                .await?;
            return Ok(());
        }

        let Some(handler) = self.handler_for(resource) else {
            let err = ActuatorError::UnsupportedKind(resource.kind.clone());
            warn!(resource_id = %resource.id, kind = %resource.kind, "no handler for resource");
            self.recorder
                .resource(
                    resource,
                    ResourceEventType::CheckError {
                        message: format_err_chain(&err),
                    },
                )
                .await?;
            return Err(err);
        };

        match self.reconcile(handler.as_ref(), resource).await {
            Ok(()) => Ok(()),
            Err(ActuatorError::Storage(e)) => Err(ActuatorError::Storage(e)),
            Err(ActuatorError::Unresolvable(message)) => {
                warn!(resource_id = %resource.id, %message, "current state unresolvable");
                self.recorder
                    .resource(resource, ResourceEventType::CheckUnresolvable { message })
                    .await?;
                Ok(())
            }
            Err(err) => {
                let message = format_err_chain(&err.with_resource(&resource.kind, &resource.name));
                warn!(resource_id = %resource.id, %message, "resource check failed");
                self.recorder
                    .resource(resource, ResourceEventType::CheckError { message })
                    .await?;
                Ok(())
            }
        }
    }

    async fn reconcile(
        &self,
        handler: &dyn ResourceHandler,
        resource: &Resource,
    ) -> Result<(), ActuatorError> {
        let desired = handler.desired(resource).await?;

        let Some(current) = handler.current(resource).await? else {
            self.recorder.resource(resource, ResourceEventType::Missing).await?;
            info!(resource_id = %resource.id, "resource missing, creating");
            let tasks = handler.create(resource, &desired).await?;
            self.launched(handler, resource, tasks).await?;
            return Ok(());
        };

        let drift = handler.diff(&desired, &current);
        if !drift.is_empty() {
            self.recorder
                .resource(
                    resource,
                    ResourceEventType::DeltaDetected {
                        delta: drift.clone(),
                    },
                )
                .await?;

            if handler.actuation_in_progress(resource).await? {
                debug!(resource_id = %resource.id, "actuation already in progress");
                return Ok(());
            }

            info!(resource_id = %resource.id, fields = drift.len(), "resource drifted, updating");
            let tasks = handler.update(resource, &desired, &drift).await?;
            self.launched(handler, resource, tasks).await?;
            return Ok(());
        }

        let previous = self.recorder.events().last_resource_event(&resource.id).await?;
        let recovering = previous.is_some_and(|e| {
            matches!(
                e.details,
                ResourceEventType::DeltaDetected { .. }
                    | ResourceEventType::Missing
                    | ResourceEventType::ActuationLaunched { .. }
                    | ResourceEventType::TaskSucceeded { .. }
                    | ResourceEventType::TaskFailed { .. }
            )
        });

        if recovering {
            info!(resource_id = %resource.id, "resource back in sync");
            self.recorder.resource(resource, ResourceEventType::DeltaResolved).await?;
        } else {
            debug!(resource_id = %resource.id, "resource in sync");
            self.recorder.resource(resource, ResourceEventType::Valid).await?;
        }
        Ok(())
    }

    async fn launched(
        &self,
        handler: &dyn ResourceHandler,
        resource: &Resource,
        tasks: Vec<Task>,
    ) -> Result<(), ActuatorError> {
        info!(
            resource_id = %resource.id,
            plugin = handler.name(),
            tasks = tasks.len(),
            "actuation launched"
        );
        self.recorder
            .resource(
                resource,
                ResourceEventType::ActuationLaunched {
                    plugin: handler.name().to_string(),
                    tasks,
                },
            )
            .await?;
        Ok(())
    }

    async fn pause_reason(&self, resource: &Resource) -> Result<Option<String>, ActuatorError> {
        if self
            .paused
            .is_paused(PauseScope::Application, &resource.application)
            .await?
        {
            return Ok(Some(format!(
                "actuation paused for application {}",
                resource.application
            )));
        }
        if self
            .paused
            .is_paused(PauseScope::Resource, resource.id.as_str())
            .await?
        {
            return Ok(Some(format!("actuation paused for resource {}", resource.id)));
        }
        Ok(None)
    }

    /// Record the outcome of tasks launched by an earlier check.
    pub async fn report_task_outcome(
        &self,
        resource: &Resource,
        tasks: Vec<Task>,
        outcome: TaskOutcome,
    ) -> Result<(), ActuatorError> {
        let details = match outcome {
            TaskOutcome::Succeeded => {
                info!(resource_id = %resource.id, tasks = tasks.len(), "tasks succeeded");
                ResourceEventType::TaskSucceeded { tasks }
            }
            TaskOutcome::Failed { reason } => {
                warn!(resource_id = %resource.id, %reason, "tasks failed");
                ResourceEventType::TaskFailed { reason, tasks }
            }
        };
        self.recorder.resource(resource, details).await?;
        Ok(())
    }
}
