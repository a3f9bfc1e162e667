use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use jiff::SignedDuration;
use keel_core::Clock;
use keel_core::models::delivery_config::DeliveryArtifact;
use tokio::sync::Mutex;

use super::check_tracker::CheckTracker;
use crate::BoxFuture;
use crate::error::StorageError;
use crate::periodically_checked::PeriodicallyChecked;
use crate::repository::ArtifactRepository;

type ArtifactKey = (String, String);

fn key_of(artifact: &DeliveryArtifact) -> ArtifactKey {
    (artifact.delivery_config_name.clone(), artifact.reference.clone())
}

#[derive(Default)]
struct ArtifactRecord {
    artifact: Option<DeliveryArtifact>,
    /// Oldest first.
    versions: Vec<String>,
    /// `(version, environment)` pairs.
    approved: Vec<(String, String)>,
    deployed: HashSet<(String, String)>,
    vetoed: HashSet<(String, String)>,
}

pub struct InMemoryArtifactRepository {
    records: Mutex<HashMap<ArtifactKey, ArtifactRecord>>,
    checks: CheckTracker<ArtifactKey>,
}

impl InMemoryArtifactRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            checks: CheckTracker::new(clock),
        }
    }

    /// Run `f` against the record of a registered artifact.
    async fn with_record<T>(
        &self,
        artifact: &DeliveryArtifact,
        f: impl FnOnce(&mut ArtifactRecord) -> T,
    ) -> Result<T, StorageError> {
        let mut records = self.records.lock().await;
        match records.get_mut(&key_of(artifact)) {
            Some(record) => Ok(f(record)),
            None => Err(StorageError::NoSuchArtifact {
                delivery_config: artifact.delivery_config_name.clone(),
                reference: artifact.reference.clone(),
            }),
        }
    }
}

impl ArtifactRepository for InMemoryArtifactRepository {
    fn register<'a>(&'a self, artifact: &'a DeliveryArtifact) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.records
                .lock()
                .await
                .entry(key_of(artifact))
                .or_default()
                .artifact = Some(artifact.clone());
            self.checks.track(key_of(artifact)).await;
            Ok(())
        })
    }

    fn get<'a>(
        &'a self,
        delivery_config_name: &'a str,
        reference: &'a str,
    ) -> BoxFuture<'a, Result<DeliveryArtifact, StorageError>> {
        Box::pin(async move {
            self.records
                .lock()
                .await
                .get(&(delivery_config_name.to_string(), reference.to_string()))
                .and_then(|r| r.artifact.clone())
                .ok_or_else(|| StorageError::NoSuchArtifact {
                    delivery_config: delivery_config_name.to_string(),
                    reference: reference.to_string(),
                })
        })
    }

    fn store_version<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            self.with_record(artifact, |record| {
                if record.versions.iter().any(|v| v == version) {
                    false
                } else {
                    record.versions.push(version.to_string());
                    true
                }
            })
            .await
        })
    }

    fn versions<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
    ) -> BoxFuture<'a, Result<Vec<String>, StorageError>> {
        Box::pin(async move {
            self.with_record(artifact, |record| record.versions.iter().rev().cloned().collect())
                .await
        })
    }

    fn approve_version_for<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            self.with_record(artifact, |record| {
                let pair = (version.to_string(), environment.to_string());
                if record.approved.contains(&pair) {
                    false
                } else {
                    record.approved.push(pair);
                    true
                }
            })
            .await
        })
    }

    fn is_approved_for<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            self.with_record(artifact, |record| {
                record
                    .approved
                    .iter()
                    .any(|(v, e)| v == version && e == environment)
            })
            .await
        })
    }

    fn latest_approved_version<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        Box::pin(async move {
            self.with_record(artifact, |record| {
                // newest known version wins, regardless of approval order
                record
                    .versions
                    .iter()
                    .rev()
                    .find(|v| {
                        record
                            .approved
                            .iter()
                            .any(|(av, e)| av == *v && e == environment)
                            && !record
                                .vetoed
                                .contains(&(v.to_string(), environment.to_string()))
                    })
                    .cloned()
            })
            .await
        })
    }

    fn mark_as_successfully_deployed_to<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.with_record(artifact, |record| {
                record
                    .deployed
                    .insert((version.to_string(), environment.to_string()));
            })
            .await
        })
    }

    fn was_successfully_deployed_to<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            self.with_record(artifact, |record| {
                record
                    .deployed
                    .contains(&(version.to_string(), environment.to_string()))
            })
            .await
        })
    }

    fn mark_as_vetoed<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.with_record(artifact, |record| {
                record
                    .vetoed
                    .insert((version.to_string(), environment.to_string()));
            })
            .await
        })
    }

    fn is_vetoed<'a>(
        &'a self,
        artifact: &'a DeliveryArtifact,
        version: &'a str,
        environment: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            self.with_record(artifact, |record| {
                record
                    .vetoed
                    .contains(&(version.to_string(), environment.to_string()))
            })
            .await
        })
    }
}

impl PeriodicallyChecked<DeliveryArtifact> for InMemoryArtifactRepository {
    fn items_due_for_check(
        &self,
        min_time_since_last_check: SignedDuration,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<DeliveryArtifact>, StorageError>> {
        Box::pin(async move {
            let keys = self.checks.check_out(min_time_since_last_check, limit).await;
            let records = self.records.lock().await;
            Ok(keys
                .iter()
                .filter_map(|key| records.get(key).and_then(|r| r.artifact.clone()))
                .collect())
        })
    }
}
