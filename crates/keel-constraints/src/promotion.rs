use std::sync::Arc;

use keel_core::models::delivery_config::{DeliveryArtifact, DeliveryConfig, Environment};
use keel_storage::ArtifactRepository;
use tracing::{debug, info};

use crate::error::ConstraintError;
use crate::evaluator::ConstraintEvaluator;

/// Outcome of checking one artifact against one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionDecision {
    pub artifact: String,
    /// The newest version every gate allowed, if any.
    pub version: Option<String>,
    /// False when `version` was already approved before this check.
    pub newly_approved: bool,
}

/// Picks, per artifact, the newest version allowed into an environment and approves it.
pub struct EnvironmentPromotionChecker {
    evaluators: Vec<Arc<dyn ConstraintEvaluator>>,
    artifacts: Arc<dyn ArtifactRepository>,
}

impl EnvironmentPromotionChecker {
    pub fn new(evaluators: Vec<Arc<dyn ConstraintEvaluator>>, artifacts: Arc<dyn ArtifactRepository>) -> Self {
        Self {
            evaluators,
            artifacts,
        }
    }

    /// Configured constraint types first, in manifest order, then implicit ones.
    fn evaluators_for(&self, environment: &Environment) -> Result<Vec<&dyn ConstraintEvaluator>, ConstraintError> {
        let mut applicable: Vec<&dyn ConstraintEvaluator> = Vec::new();
        for constraint in &environment.constraints {
            let constraint_type = constraint.constraint_type();
            if applicable.iter().any(|e| e.constraint_type() == constraint_type) {
                continue;
            }
            let evaluator = self
                .evaluators
                .iter()
                .find(|e| e.constraint_type() == constraint_type)
                .ok_or_else(|| ConstraintError::NoEvaluator(constraint_type.to_string()))?;
            applicable.push(evaluator.as_ref());
        }
        applicable.extend(self.evaluators.iter().filter(|e| e.is_implicit()).map(|e| e.as_ref()));
        Ok(applicable)
    }

    pub async fn check_environment(
        &self,
        delivery_config: &DeliveryConfig,
        environment_name: &str,
    ) -> Result<Vec<PromotionDecision>, ConstraintError> {
        let environment = delivery_config
            .environment(environment_name)
            .map_err(|_| ConstraintError::UnknownEnvironment {
                delivery_config: delivery_config.name.clone(),
                environment: environment_name.to_string(),
            })?;
        let evaluators = self.evaluators_for(environment)?;

        let mut decisions = Vec::with_capacity(delivery_config.artifacts.len());
        for artifact in &delivery_config.artifacts {
            decisions.push(
                self.check_artifact(artifact, delivery_config, environment, &evaluators)
                    .await?,
            );
        }
        Ok(decisions)
    }

    async fn check_artifact(
        &self,
        artifact: &DeliveryArtifact,
        delivery_config: &DeliveryConfig,
        environment: &Environment,
        evaluators: &[&dyn ConstraintEvaluator],
    ) -> Result<PromotionDecision, ConstraintError> {
        for version in self.artifacts.versions(artifact).await? {
            if !self
                .all_pass(evaluators, artifact, &version, delivery_config, environment)
                .await?
            {
                continue;
            }

            let newly_approved = self
                .artifacts
                .approve_version_for(artifact, &version, &environment.name)
                .await?;
            if newly_approved {
                info!(
                    artifact = %artifact.reference,
                    version = %version,
                    environment = %environment.name,
                    "version approved for environment"
                );
            } else {
                debug!(artifact = %artifact.reference, version = %version, environment = %environment.name, "version already approved");
            }
            return Ok(PromotionDecision {
                artifact: artifact.reference.clone(),
                version: Some(version),
                newly_approved,
            });
        }

        debug!(artifact = %artifact.reference, environment = %environment.name, "no version can be promoted");
        Ok(PromotionDecision {
            artifact: artifact.reference.clone(),
            version: None,
            newly_approved: false,
        })
    }

    async fn all_pass(
        &self,
        evaluators: &[&dyn ConstraintEvaluator],
        artifact: &DeliveryArtifact,
        version: &str,
        delivery_config: &DeliveryConfig,
        environment: &Environment,
    ) -> Result<bool, ConstraintError> {
        for evaluator in evaluators {
            if !evaluator
                .can_promote(artifact, version, delivery_config, environment)
                .await?
            {
                debug!(
                    constraint_type = evaluator.constraint_type(),
                    version,
                    environment = %environment.name,
                    "constraint blocks promotion"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}
