use jiff::SignedDuration;

use crate::BoxFuture;
use crate::error::StorageError;

/// Hands out items that have not been checked recently.
///
/// The call *is* the check-out: every returned item is marked as checked
/// "now" in the same atomic step that selected it, so two callers never
/// receive the same item within `min_time_since_last_check` of each other.
/// Items never checked come first, then the longest-unchecked. An item last
/// checked at `T` is due again at `T + min_time_since_last_check`; the lease
/// is soft, so work lost to a crashed worker is simply picked up then.
///
/// One mechanism serves resources, artifacts, environments and agents.
pub trait PeriodicallyChecked<T>: Send + Sync {
    fn items_due_for_check(
        &self,
        min_time_since_last_check: SignedDuration,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<T>, StorageError>>;
}
