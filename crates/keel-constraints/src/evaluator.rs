use keel_core::models::delivery_config::{Constraint, DeliveryArtifact, DeliveryConfig, Environment};
use keel_storage::BoxFuture;

use crate::error::ConstraintError;

/// One impl per constraint type.
pub trait ConstraintEvaluator: Send + Sync {
    /// The manifest `type` this evaluator handles.
    fn constraint_type(&self) -> &'static str;

    /// Implicit evaluators apply to every environment whether or not the
    /// manifest mentions them.
    fn is_implicit(&self) -> bool {
        false
    }

    fn can_promote<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        delivery_config: &'a DeliveryConfig,
        target_environment: &'a Environment,
    ) -> BoxFuture<'a, Result<bool, ConstraintError>>;
}

/// The single constraint of `constraint_type` configured on `environment`.
pub fn constraint_for<'a>(
    constraint_type: &str,
    environment: &'a Environment,
) -> Result<&'a Constraint, ConstraintError> {
    let mut matching = environment.constraints_of_type(constraint_type);
    let Some(constraint) = matching.next() else {
        return Err(ConstraintError::MissingConstraint {
            constraint_type: constraint_type.to_string(),
            environment: environment.name.clone(),
        });
    };
    if matching.next().is_some() {
        return Err(ConstraintError::DuplicateConstraint {
            constraint_type: constraint_type.to_string(),
            environment: environment.name.clone(),
        });
    }
    Ok(constraint)
}
