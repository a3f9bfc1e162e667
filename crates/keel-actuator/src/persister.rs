use std::collections::HashSet;
use std::sync::Arc;

use keel_core::models::delivery_config::DeliveryConfig;
use keel_core::models::events::ResourceEventType;
use keel_core::models::resource::ResourceId;
use keel_storage::{
    ArtifactRepository, DeliveryConfigRepository, ResourceRepository, StorageError, UpsertOutcome,
};
use tracing::info;

use crate::error::ActuatorError;
use crate::recorder::EventRecorder;

/// What a delivery config upsert changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PersistedConfig {
    pub created: Vec<ResourceId>,
    pub updated: Vec<ResourceId>,
    pub unchanged: Vec<ResourceId>,
    pub deleted: Vec<ResourceId>,
}

/// Writes submitted delivery configs and the resources they declare.
pub struct ResourcePersister {
    delivery_configs: Arc<dyn DeliveryConfigRepository>,
    resources: Arc<dyn ResourceRepository>,
    artifacts: Arc<dyn ArtifactRepository>,
    recorder: EventRecorder,
}

impl ResourcePersister {
    pub fn new(
        delivery_configs: Arc<dyn DeliveryConfigRepository>,
        resources: Arc<dyn ResourceRepository>,
        artifacts: Arc<dyn ArtifactRepository>,
        recorder: EventRecorder,
    ) -> Self {
        Self {
            delivery_configs,
            resources,
            artifacts,
            recorder,
        }
    }

    async fn previous(&self, name: &str) -> Result<Option<DeliveryConfig>, StorageError> {
        match self.delivery_configs.get(name).await {
            Ok(config) => Ok(Some(config)),
            Err(StorageError::NoSuchDeliveryConfig(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Store a delivery config, its resources and artifacts.
    ///
    /// Resources that were part of the previous version of the same config
    /// but are no longer declared are deleted.
    pub async fn upsert(&self, config: DeliveryConfig) -> Result<PersistedConfig, ActuatorError> {
        let mut config = config.with_inherited_locations();
        let name = config.name.clone();
        for artifact in &mut config.artifacts {
            artifact.delivery_config_name = name.clone();
        }
        let previous = self.previous(&config.name).await?;
        let mut summary = PersistedConfig::default();

        for resource in config.resources() {
            match self.resources.store(resource).await? {
                UpsertOutcome::Created => {
                    info!(resource_id = %resource.id, delivery_config = %config.name, "resource created");
                    self.recorder.resource(resource, ResourceEventType::Created).await?;
                    summary.created.push(resource.id.clone());
                }
                UpsertOutcome::Updated => {
                    info!(resource_id = %resource.id, delivery_config = %config.name, "resource updated");
                    summary.updated.push(resource.id.clone());
                }
                UpsertOutcome::Unchanged => summary.unchanged.push(resource.id.clone()),
            }
        }

        for artifact in &config.artifacts {
            self.artifacts.register(artifact).await?;
        }

        self.delivery_configs.store(&config).await?;

        // Orphan pass: resources in the previous version but not in this one
        if let Some(previous) = previous {
            let declared: HashSet<&ResourceId> = config.resources().map(|r| &r.id).collect();
            for resource in previous.resources() {
                if !declared.contains(&resource.id) {
                    info!(resource_id = %resource.id, delivery_config = %config.name, "deleting resource dropped from delivery config");
                    self.delete_resource(&resource.id).await?;
                    summary.deleted.push(resource.id.clone());
                }
            }
        }

        Ok(summary)
    }

    /// Remove a delivery config and every resource it declares.
    pub async fn delete(&self, name: &str) -> Result<Vec<ResourceId>, ActuatorError> {
        let config = self.delivery_configs.get(name).await?;
        let mut deleted = Vec::new();
        for resource in config.resources() {
            info!(resource_id = %resource.id, delivery_config = %name, "deleting resource");
            self.delete_resource(&resource.id).await?;
            deleted.push(resource.id.clone());
        }
        self.delivery_configs.delete(name).await?;
        Ok(deleted)
    }

    async fn delete_resource(&self, id: &ResourceId) -> Result<(), StorageError> {
        match self.resources.delete(id).await {
            Ok(()) | Err(StorageError::NoSuchResourceId(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
