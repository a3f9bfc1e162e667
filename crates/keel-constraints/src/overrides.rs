use std::sync::Arc;

use keel_core::Clock;
use keel_core::models::constraint_state::{ConstraintState, ConstraintStateKey, ConstraintStatus};
use keel_core::notification::{ConstraintStateChanged, EventPublisher, Notification};
use keel_storage::{ConstraintStateRepository, DeliveryConfigRepository};
use tracing::info;

use crate::error::ConstraintError;

/// Operator judgements on constraint states.
pub struct ConstraintOverrides {
    states: Arc<dyn ConstraintStateRepository>,
    delivery_configs: Arc<dyn DeliveryConfigRepository>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl ConstraintOverrides {
    pub fn new(
        states: Arc<dyn ConstraintStateRepository>,
        delivery_configs: Arc<dyn DeliveryConfigRepository>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            states,
            delivery_configs,
            publisher,
            clock,
        }
    }

    /// Force an existing constraint state to `OVERRIDE_PASS` or `OVERRIDE_FAIL`.
    pub async fn override_constraint(
        &self,
        key: &ConstraintStateKey,
        status: ConstraintStatus,
        judged_by: &str,
        comment: Option<String>,
    ) -> Result<ConstraintState, ConstraintError> {
        if !status.is_override() {
            return Err(ConstraintError::InvalidOverride(status));
        }

        let previous = self
            .states
            .get(key)
            .await?
            .ok_or_else(|| ConstraintError::UnknownConstraintState(key.clone()))?;

        let mut current = previous.clone();
        current.judge(status, judged_by, self.clock.now());
        current.comment = comment;
        self.states.store(&current).await?;

        info!(key = %key, %status, judged_by, "constraint overridden");

        // the manifest may have changed since the state was created
        let constraint = match self.delivery_configs.get(&key.delivery_config_name).await {
            Ok(config) => config
                .environment(&key.environment_name)
                .ok()
                .and_then(|env| env.constraints_of_type(&key.constraint_type).next().cloned()),
            Err(_) => None,
        };

        self.publisher
            .publish(Notification::ConstraintStateChanged(ConstraintStateChanged {
                delivery_config: key.delivery_config_name.clone(),
                environment: key.environment_name.clone(),
                constraint,
                previous: Some(previous),
                current: current.clone(),
            }));
        Ok(current)
    }
}
