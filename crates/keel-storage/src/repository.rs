use keel_core::models::delivery_config::{DeliveryArtifact, DeliveryConfig};
use keel_core::models::resource::{Resource, ResourceId};
use serde::{Deserialize, Serialize};

use crate::BoxFuture;
use crate::error::StorageError;
use crate::periodically_checked::PeriodicallyChecked;

/// What an upsert did to the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Current desired state of every managed resource.
pub trait ResourceRepository: PeriodicallyChecked<Resource> {
    /// Insert or replace by id. A re-submitted resource keeps its original
    /// `uid`; only the spec, metadata and ownership are replaced.
    fn store<'a>(&'a self, resource: &'a Resource) -> BoxFuture<'a, Result<UpsertOutcome, StorageError>>;

    fn get<'a>(&'a self, id: &'a ResourceId) -> BoxFuture<'a, Result<Resource, StorageError>>;

    fn has<'a>(&'a self, id: &'a ResourceId) -> BoxFuture<'a, Result<bool, StorageError>>;

    fn get_by_application<'a>(
        &'a self,
        application: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Resource>, StorageError>>;

    /// Remove the desired state. The resource's event history is kept.
    fn delete<'a>(&'a self, id: &'a ResourceId) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// One environment of a delivery config that is due for a promotion check.
#[derive(Debug, Clone, PartialEq)]
pub struct DueEnvironment {
    pub delivery_config: DeliveryConfig,
    pub environment: String,
}

pub trait DeliveryConfigRepository: PeriodicallyChecked<DueEnvironment> {
    fn store<'a>(&'a self, config: &'a DeliveryConfig) -> BoxFuture<'a, Result<(), StorageError>>;

    fn get<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<DeliveryConfig, StorageError>>;

    /// Fails with [`StorageError::NoSuchApplication`] when the application has no config.
    fn get_by_application<'a>(
        &'a self,
        application: &'a str,
    ) -> BoxFuture<'a, Result<DeliveryConfig, StorageError>>;

    fn delete<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// Known versions of each artifact and where they are approved, deployed or vetoed.
///
/// Artifacts are identified by `(delivery_config_name, reference)`. Every
/// operation on an unregistered artifact fails with
/// [`StorageError::NoSuchArtifact`].
pub trait ArtifactRepository: PeriodicallyChecked<DeliveryArtifact> {
    fn register<'a>(&'a self, artifact: &'a DeliveryArtifact) -> BoxFuture<'a, Result<(), StorageError>>;

    fn get<'a>(
        &'a self,
        delivery_config_name: &'a str,
        reference: &'a str,
    ) -> BoxFuture<'a, Result<DeliveryArtifact, StorageError>>;

    /// Returns `true` when the version was not known before.
    fn store_version<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>>;

    /// Known versions, newest first.
    fn versions<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
    ) -> BoxFuture<'a, Result<Vec<String>, StorageError>>;

    /// Returns `true` when the version was not already approved for the environment.
    fn approve_version_for<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>>;

    fn is_approved_for<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>>;

    fn latest_approved_version<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<Option<String>, StorageError>>;

    fn mark_as_successfully_deployed_to<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    fn was_successfully_deployed_to<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>>;

    fn mark_as_vetoed<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    fn is_vetoed<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>>;
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseScope {
    Application,
    Resource,
}

/// Operator-set pause flags. Paused entities are skipped by actuation.
pub trait PausedRepository: Send + Sync {
    /// Returns `true` when the entity was not already paused.
    fn pause<'a>(&'a self, scope: PauseScope, name: &'a str) -> BoxFuture<'a, Result<bool, StorageError>>;

    /// Returns `true` when the entity was paused.
    fn resume<'a>(&'a self, scope: PauseScope, name: &'a str) -> BoxFuture<'a, Result<bool, StorageError>>;

    fn is_paused<'a>(&'a self, scope: PauseScope, name: &'a str) -> BoxFuture<'a, Result<bool, StorageError>>;
}
