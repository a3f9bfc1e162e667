use keel_core::models::constraint_state::{ConstraintState, ConstraintStateKey};

use crate::BoxFuture;
use crate::error::StorageError;

/// Persisted promotion-gate records. Records are never deleted.
pub trait ConstraintStateRepository: Send + Sync {
    /// `None` means the constraint was never evaluated for this key.
    fn get<'a>(
        &'a self,
        key: &'a ConstraintStateKey,
    ) -> BoxFuture<'a, Result<Option<ConstraintState>, StorageError>>;

    /// Upsert by key.
    ///
    /// Replacing a terminal state is only allowed with an override status
    /// (or an identical record); anything else fails with
    /// [`StorageError::ConstraintStateSealed`].
    fn store<'a>(&'a self, state: &'a ConstraintState) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Insert only if no record exists for the key. Returns `true` for the
    /// single caller whose record was written.
    fn store_if_absent<'a>(
        &'a self,
        state: &'a ConstraintState,
    ) -> BoxFuture<'a, Result<bool, StorageError>>;

    /// Records for one environment, newest first.
    fn states_for_environment<'a>(
        &'a self,
        delivery_config_name: &'a str,
        environment_name: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ConstraintState>, StorageError>>;
}
