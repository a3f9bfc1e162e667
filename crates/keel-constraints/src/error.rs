use jiff::SignedDuration;
use keel_core::models::constraint_state::{ConstraintStateKey, ConstraintStatus};
use keel_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("environment {environment} has no {constraint_type} constraint")]
    MissingConstraint {
        constraint_type: String,
        environment: String,
    },

    #[error("environment {environment} has more than one {constraint_type} constraint")]
    DuplicateConstraint {
        constraint_type: String,
        environment: String,
    },

    #[error("no evaluator registered for constraint type {0}")]
    NoEvaluator(String),

    #[error("invalid time window {value:?}: {reason}")]
    InvalidTimeWindow { value: String, reason: String },

    #[error("manual judgement timeout {0} is negative")]
    NegativeTimeout(SignedDuration),

    #[error("unknown time zone {0}")]
    UnknownTimeZone(String),

    #[error("delivery config {delivery_config} has no environment named {environment}")]
    UnknownEnvironment {
        delivery_config: String,
        environment: String,
    },

    #[error("{0} is not an override status")]
    InvalidOverride(ConstraintStatus),

    #[error("constraint {0} has never been evaluated")]
    UnknownConstraintState(ConstraintStateKey),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
