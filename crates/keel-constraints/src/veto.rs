use std::sync::Arc;

use keel_core::models::delivery_config::{DeliveryArtifact, DeliveryConfig, Environment};
use keel_storage::{ArtifactRepository, BoxFuture};

use crate::error::ConstraintError;
use crate::evaluator::ConstraintEvaluator;

/// Blocks versions an operator vetoed for an environment. Applies everywhere.
pub struct VetoEvaluator {
    artifacts: Arc<dyn ArtifactRepository>,
}

impl VetoEvaluator {
    pub const TYPE: &'static str = "veto";

    pub fn new(artifacts: Arc<dyn ArtifactRepository>) -> Self {
        Self { artifacts }
    }
}

impl ConstraintEvaluator for VetoEvaluator {
    fn constraint_type(&self) -> &'static str {
        Self::TYPE
    }

    fn is_implicit(&self) -> bool {
        true
    }

    fn can_promote<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        _delivery_config: &'a DeliveryConfig,
        target_environment: &'a Environment,
    ) -> BoxFuture<'a, Result<bool, ConstraintError>> {
        Box::pin(async move {
            let vetoed = self
                .artifacts
                .is_vetoed(artifact, version, &target_environment.name)
                .await?;
            Ok(!vetoed)
        })
    }
}
