use std::sync::Arc;

use jiff::SignedDuration;
use keel_core::Clock;

use super::check_tracker::CheckTracker;
use crate::BoxFuture;
use crate::error::StorageError;
use crate::periodically_checked::PeriodicallyChecked;

/// Run leases for scheduled agents, keyed by agent name.
///
/// An agent is due when its lease is older than the requested interval.
/// Checking it out takes the lease, so only one worker runs it per interval.
pub struct InMemoryAgentLeases {
    leases: CheckTracker<String>,
}

impl InMemoryAgentLeases {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            leases: CheckTracker::new(clock),
        }
    }

    pub async fn register(&self, name: impl Into<String>) {
        self.leases.track(name.into()).await;
    }
}

impl PeriodicallyChecked<String> for InMemoryAgentLeases {
    fn items_due_for_check(
        &self,
        min_time_since_last_check: SignedDuration,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<String>, StorageError>> {
        Box::pin(async move { Ok(self.leases.check_out(min_time_since_last_check, limit).await) })
    }
}
