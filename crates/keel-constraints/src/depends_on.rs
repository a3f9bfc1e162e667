use std::sync::Arc;

use keel_core::models::delivery_config::{Constraint, DeliveryArtifact, DeliveryConfig, Environment};
use keel_storage::{ArtifactRepository, BoxFuture};

use crate::error::ConstraintError;
use crate::evaluator::{ConstraintEvaluator, constraint_for};

/// Passes once the version has been successfully deployed to another
/// environment of the same delivery config.
pub struct DependsOnEvaluator {
    artifacts: Arc<dyn ArtifactRepository>,
}

impl DependsOnEvaluator {
    pub fn new(artifacts: Arc<dyn ArtifactRepository>) -> Self {
        Self { artifacts }
    }
}

impl ConstraintEvaluator for DependsOnEvaluator {
    fn constraint_type(&self) -> &'static str {
        Constraint::DEPENDS_ON
    }

    fn can_promote<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        delivery_config: &'a DeliveryConfig,
        target_environment: &'a Environment,
    ) -> BoxFuture<'a, Result<bool, ConstraintError>> {
        Box::pin(async move {
            let Constraint::DependsOn {
                environment: required,
            } = constraint_for(Constraint::DEPENDS_ON, target_environment)?
            else {
                return Err(ConstraintError::MissingConstraint {
                    constraint_type: Constraint::DEPENDS_ON.to_string(),
                    environment: target_environment.name.clone(),
                });
            };

            delivery_config
                .environment(required)
                .map_err(|_| ConstraintError::UnknownEnvironment {
                    delivery_config: delivery_config.name.clone(),
                    environment: required.clone(),
                })?;

            Ok(self
                .artifacts
                .was_successfully_deployed_to(artifact, version, required)
                .await?)
        })
    }
}
