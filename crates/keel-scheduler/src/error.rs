use keel_actuator::ActuatorError;
use keel_constraints::ConstraintError;
use keel_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("actuation error: {0}")]
    Actuator(#[from] ActuatorError),

    #[error("constraint error: {0}")]
    Constraint(#[from] ConstraintError),

    #[error("artifact source error: {0}")]
    ArtifactSource(String),

    #[error("agent {agent} failed: {message}")]
    Agent { agent: String, message: String },
}
