use std::sync::Arc;

use jiff::Timestamp;
use keel_core::Clock;
use keel_core::models::constraint_state::{ConstraintState, ConstraintStateKey};
use keel_core::models::delivery_config::{Constraint, DeliveryArtifact, DeliveryConfig, Environment};
use keel_core::notification::{ConstraintStateChanged, EventPublisher, Notification};
use keel_storage::{BoxFuture, ConstraintStateRepository, StorageError};
use tracing::{debug, info};

use crate::error::ConstraintError;
use crate::evaluator::{ConstraintEvaluator, constraint_for};

/// Everything constraint logic may look at when deciding a pending state.
pub struct DecisionContext<'a> {
    pub artifact: &'a DeliveryArtifact,
    pub version: &'a str,
    pub delivery_config: &'a DeliveryConfig,
    pub environment: &'a Environment,
    pub constraint: &'a Constraint,
    pub now: Timestamp,
}

/// The constraint-specific half of a stateful evaluator.
pub trait StatefulConstraintLogic: Send + Sync {
    fn constraint_type(&self) -> &'static str;

    /// Called only while the state is `PENDING`. Mutating `state` persists
    /// and publishes the change; leaving it alone keeps waiting.
    fn decide<'a>(
        &'a self,
        ctx: &'a DecisionContext<'a>,
        state: &'a mut ConstraintState,
    ) -> BoxFuture<'a, Result<(), ConstraintError>>;
}

/// Wraps constraint logic with persisted, sticky state.
///
/// The first evaluation of a key creates a `PENDING` record. Once a record
/// is terminal its answer is returned without running the logic again.
pub struct StatefulEvaluator<L> {
    logic: L,
    states: Arc<dyn ConstraintStateRepository>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl<L: StatefulConstraintLogic> StatefulEvaluator<L> {
    pub fn new(
        logic: L,
        states: Arc<dyn ConstraintStateRepository>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            logic,
            states,
            publisher,
            clock,
        }
    }

    async fn reload(&self, key: &ConstraintStateKey) -> Result<ConstraintState, ConstraintError> {
        self.states
            .get(key)
            .await?
            .ok_or_else(|| ConstraintError::UnknownConstraintState(key.clone()))
    }

    async fn load_or_create(
        &self,
        key: ConstraintStateKey,
        delivery_config: &DeliveryConfig,
        constraint: &Constraint,
    ) -> Result<ConstraintState, ConstraintError> {
        if let Some(state) = self.states.get(&key).await? {
            return Ok(state);
        }

        let pending = ConstraintState::pending(key, self.clock.now());
        if !self.states.store_if_absent(&pending).await? {
            // another worker created it first
            return self.reload(&pending.key).await;
        }

        info!(
            delivery_config = %delivery_config.name,
            environment = %pending.key.environment_name,
            version = %pending.key.artifact_version,
            constraint_type = %pending.key.constraint_type,
            "constraint pending"
        );
        self.publish(delivery_config, constraint, None, pending.clone());
        Ok(pending)
    }

    fn publish(
        &self,
        delivery_config: &DeliveryConfig,
        constraint: &Constraint,
        previous: Option<ConstraintState>,
        current: ConstraintState,
    ) {
        self.publisher
            .publish(Notification::ConstraintStateChanged(ConstraintStateChanged {
                delivery_config: delivery_config.name.clone(),
                environment: current.key.environment_name.clone(),
                constraint: Some(constraint.clone()),
                previous,
                current,
            }));
    }
}

impl<L: StatefulConstraintLogic> ConstraintEvaluator for StatefulEvaluator<L> {
    fn constraint_type(&self) -> &'static str {
        self.logic.constraint_type()
    }

    fn can_promote<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        delivery_config: &'a DeliveryConfig,
        target_environment: &'a Environment,
    ) -> BoxFuture<'a, Result<bool, ConstraintError>> {
        Box::pin(async move {
            let constraint = constraint_for(self.constraint_type(), target_environment)?;
            let key = ConstraintStateKey::new(
                &delivery_config.name,
                &target_environment.name,
                version,
                self.constraint_type(),
            );

            let mut state = self.load_or_create(key, delivery_config, constraint).await?;
            if state.status.is_terminal() {
                debug!(key = %state.key, status = %state.status, "constraint already decided");
                return Ok(state.status.passes());
            }

            let previous = state.clone();
            let ctx = DecisionContext {
                artifact,
                version,
                delivery_config,
                environment: target_environment,
                constraint,
                now: self.clock.now(),
            };
            self.logic.decide(&ctx, &mut state).await?;

            if state != previous {
                match self.states.store(&state).await {
                    Ok(()) => {
                        info!(key = %state.key, status = %state.status, "constraint state changed");
                        self.publish(delivery_config, constraint, Some(previous), state.clone());
                    }
                    Err(StorageError::ConstraintStateSealed { .. }) => {
                        // decided elsewhere (usually an override) while we were looking
                        state = self.reload(&state.key).await?;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            Ok(state.status.passes())
        })
    }
}
