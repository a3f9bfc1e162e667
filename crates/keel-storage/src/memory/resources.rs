use std::collections::HashMap;
use std::sync::Arc;

use jiff::SignedDuration;
use keel_core::Clock;
use keel_core::models::resource::{Resource, ResourceId};
use tokio::sync::Mutex;

use super::check_tracker::CheckTracker;
use crate::BoxFuture;
use crate::error::StorageError;
use crate::periodically_checked::PeriodicallyChecked;
use crate::repository::{ResourceRepository, UpsertOutcome};

pub struct InMemoryResourceRepository {
    resources: Mutex<HashMap<ResourceId, Resource>>,
    checks: CheckTracker<ResourceId>,
}

impl InMemoryResourceRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            resources: Mutex::new(HashMap::new()),
            checks: CheckTracker::new(clock),
        }
    }
}

impl ResourceRepository for InMemoryResourceRepository {
    fn store<'a>(&'a self, resource: &'a Resource) -> BoxFuture<'a, Result<UpsertOutcome, StorageError>> {
        Box::pin(async move {
            let outcome = {
                let mut resources = self.resources.lock().await;
                match resources.get_mut(&resource.id) {
                    Some(existing) => {
                        let replacement = Resource {
                            uid: existing.uid,
                            ..resource.clone()
                        };
                        if *existing == replacement {
                            UpsertOutcome::Unchanged
                        } else {
                            *existing = replacement;
                            UpsertOutcome::Updated
                        }
                    }
                    None => {
                        resources.insert(resource.id.clone(), resource.clone());
                        UpsertOutcome::Created
                    }
                }
            };
            self.checks.track(resource.id.clone()).await;
            Ok(outcome)
        })
    }

    fn get<'a>(&'a self, id: &'a ResourceId) -> BoxFuture<'a, Result<Resource, StorageError>> {
        Box::pin(async move {
            self.resources
                .lock()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| StorageError::NoSuchResourceId(id.clone()))
        })
    }

    fn has<'a>(&'a self, id: &'a ResourceId) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move { Ok(self.resources.lock().await.contains_key(id)) })
    }

    fn get_by_application<'a>(
        &'a self,
        application: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Resource>, StorageError>> {
        Box::pin(async move {
            let mut owned: Vec<Resource> = self
                .resources
                .lock()
                .await
                .values()
                .filter(|r| r.application == application)
                .cloned()
                .collect();
            owned.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(owned)
        })
    }

    fn delete<'a>(&'a self, id: &'a ResourceId) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.resources
                .lock()
                .await
                .remove(id)
                .ok_or_else(|| StorageError::NoSuchResourceId(id.clone()))?;
            self.checks.untrack(id).await;
            Ok(())
        })
    }
}

impl PeriodicallyChecked<Resource> for InMemoryResourceRepository {
    fn items_due_for_check(
        &self,
        min_time_since_last_check: SignedDuration,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<Resource>, StorageError>> {
        Box::pin(async move {
            let ids = self.checks.check_out(min_time_since_last_check, limit).await;
            let resources = self.resources.lock().await;
            // a resource deleted between check-out and lookup is simply dropped
            Ok(ids.iter().filter_map(|id| resources.get(id).cloned()).collect())
        })
    }
}
