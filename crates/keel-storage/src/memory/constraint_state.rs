use std::collections::HashMap;

use keel_core::models::constraint_state::{ConstraintState, ConstraintStateKey};
use tokio::sync::Mutex;

use crate::BoxFuture;
use crate::constraint_state::ConstraintStateRepository;
use crate::error::StorageError;

#[derive(Default)]
pub struct InMemoryConstraintStateRepository {
    states: Mutex<HashMap<ConstraintStateKey, ConstraintState>>,
}

impl InMemoryConstraintStateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConstraintStateRepository for InMemoryConstraintStateRepository {
    fn get<'a>(
        &'a self,
        key: &'a ConstraintStateKey,
    ) -> BoxFuture<'a, Result<Option<ConstraintState>, StorageError>> {
        Box::pin(async move { Ok(self.states.lock().await.get(key).cloned()) })
    }

    fn store<'a>(&'a self, state: &'a ConstraintState) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let mut states = self.states.lock().await;
            if let Some(existing) = states.get(&state.key)
                && existing.status.is_terminal()
                && !state.status.is_override()
                && existing != state
            {
                return Err(StorageError::ConstraintStateSealed {
                    key: state.key.clone(),
                    status: existing.status,
                });
            }
            states.insert(state.key.clone(), state.clone());
            Ok(())
        })
    }

    fn store_if_absent<'a>(
        &'a self,
        state: &'a ConstraintState,
    ) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            let mut states = self.states.lock().await;
            if states.contains_key(&state.key) {
                return Ok(false);
            }
            states.insert(state.key.clone(), state.clone());
            Ok(true)
        })
    }

    fn states_for_environment<'a>(
        &'a self,
        delivery_config_name: &'a str,
        environment_name: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ConstraintState>, StorageError>> {
        Box::pin(async move {
            let mut matching: Vec<ConstraintState> = self
                .states
                .lock()
                .await
                .values()
                .filter(|s| {
                    s.key.delivery_config_name == delivery_config_name
                        && s.key.environment_name == environment_name
                })
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.key.cmp(&b.key)));
            matching.truncate(limit);
            Ok(matching)
        })
    }
}
