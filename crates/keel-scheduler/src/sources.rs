use keel_core::models::delivery_config::{ArtifactType, DeliveryArtifact};
use keel_storage::BoxFuture;

use crate::error::SchedulerError;

/// Where new versions of an artifact come from (a package repository, a
/// container registry, ...).
pub trait ArtifactVersionSource: Send + Sync {
    fn supports(&self, artifact_type: ArtifactType) -> bool;

    /// Versions currently published, oldest first.
    fn versions<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
    ) -> BoxFuture<'a, Result<Vec<String>, SchedulerError>>;
}

/// Housekeeping work that should run on one worker per interval.
pub trait ScheduledAgent: Send + Sync {
    /// Lease key; must be unique across agents.
    fn name(&self) -> &str;

    fn invoke(&self) -> BoxFuture<'_, Result<(), SchedulerError>>;
}
