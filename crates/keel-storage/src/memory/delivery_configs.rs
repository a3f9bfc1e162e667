use std::collections::HashMap;
use std::sync::Arc;

use jiff::SignedDuration;
use keel_core::Clock;
use keel_core::models::delivery_config::DeliveryConfig;
use tokio::sync::Mutex;

use super::check_tracker::CheckTracker;
use crate::BoxFuture;
use crate::error::StorageError;
use crate::periodically_checked::PeriodicallyChecked;
use crate::repository::{DeliveryConfigRepository, DueEnvironment};

/// Environments are tracked for checks as `(delivery config name, environment name)`.
pub struct InMemoryDeliveryConfigRepository {
    configs: Mutex<HashMap<String, DeliveryConfig>>,
    checks: CheckTracker<(String, String)>,
}

impl InMemoryDeliveryConfigRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            configs: Mutex::new(HashMap::new()),
            checks: CheckTracker::new(clock),
        }
    }
}

impl DeliveryConfigRepository for InMemoryDeliveryConfigRepository {
    fn store<'a>(&'a self, config: &'a DeliveryConfig) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let previous = self
                .configs
                .lock()
                .await
                .insert(config.name.clone(), config.clone());

            if let Some(previous) = previous {
                for env in &previous.environments {
                    if config.environment(&env.name).is_err() {
                        self.checks.untrack(&(config.name.clone(), env.name.clone())).await;
                    }
                }
            }
            for env in &config.environments {
                self.checks.track((config.name.clone(), env.name.clone())).await;
            }
            Ok(())
        })
    }

    fn get<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<DeliveryConfig, StorageError>> {
        Box::pin(async move {
            self.configs
                .lock()
                .await
                .get(name)
                .cloned()
                .ok_or_else(|| StorageError::NoSuchDeliveryConfig(name.to_string()))
        })
    }

    fn get_by_application<'a>(
        &'a self,
        application: &'a str,
    ) -> BoxFuture<'a, Result<DeliveryConfig, StorageError>> {
        Box::pin(async move {
            self.configs
                .lock()
                .await
                .values()
                .find(|c| c.application == application)
                .cloned()
                .ok_or_else(|| StorageError::NoSuchApplication(application.to_string()))
        })
    }

    fn delete<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let removed = self
                .configs
                .lock()
                .await
                .remove(name)
                .ok_or_else(|| StorageError::NoSuchDeliveryConfig(name.to_string()))?;
            for env in &removed.environments {
                self.checks.untrack(&(removed.name.clone(), env.name.clone())).await;
            }
            Ok(())
        })
    }
}

impl PeriodicallyChecked<DueEnvironment> for InMemoryDeliveryConfigRepository {
    fn items_due_for_check(
        &self,
        min_time_since_last_check: SignedDuration,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<DueEnvironment>, StorageError>> {
        Box::pin(async move {
            let keys = self.checks.check_out(min_time_since_last_check, limit).await;
            let configs = self.configs.lock().await;
            Ok(keys
                .into_iter()
                .filter_map(|(config_name, environment)| {
                    let config = configs.get(&config_name)?;
                    config.environment(&environment).ok()?;
                    Some(DueEnvironment {
                        delivery_config: config.clone(),
                        environment,
                    })
                })
                .collect())
        })
    }
}
