//! Event-sourced resource status.
//!
//! Status is never stored. It is projected at read time from the newest slice
//! of a resource's history, so it can always be recomputed from the log.

use crate::models::events::{ResourceEvent, ResourceEventType};
use crate::models::resource_status::ResourceStatus;

/// How many of the most recent events a status projection looks at.
pub const STATUS_HISTORY_WINDOW: usize = 10;

/// Derive a status from a newest-first history.
///
/// Only the first [`STATUS_HISTORY_WINDOW`] events are considered. The
/// flapping check runs over that whole window before the single-event rules.
pub fn derive_status(history: &[ResourceEvent]) -> ResourceStatus {
    let window = &history[..history.len().min(STATUS_HISTORY_WINDOW)];

    if is_flapping(window) {
        return ResourceStatus::Unhappy;
    }

    let Some(latest) = window.first() else {
        return ResourceStatus::Unknown;
    };

    match latest.details {
        ResourceEventType::Valid | ResourceEventType::DeltaResolved => ResourceStatus::Happy,
        ResourceEventType::ActuationLaunched { .. }
        | ResourceEventType::TaskSucceeded { .. }
        | ResourceEventType::TaskFailed { .. } => ResourceStatus::Actuating,
        ResourceEventType::CheckError { .. } => ResourceStatus::Error,
        ResourceEventType::Created => ResourceStatus::Created,
        ResourceEventType::DeltaDetected { .. }
        | ResourceEventType::Missing
        | ResourceEventType::CheckUnresolvable { .. } => ResourceStatus::Diff,
        ResourceEventType::ActuationPaused { .. } => ResourceStatus::Paused,
        ResourceEventType::ActuationVetoed { .. } => ResourceStatus::Vetoed,
        ResourceEventType::ActuationResumed { .. } => ResourceStatus::Resumed,
    }
}

/// The window is nothing but drift detections and actuation launches, alternating.
///
/// Needs at least one of each, so a lone drift or a lone launch is not flapping.
fn is_flapping(window: &[ResourceEvent]) -> bool {
    window.len() >= 2
        && window.iter().all(|e| {
            matches!(
                e.details,
                ResourceEventType::DeltaDetected { .. } | ResourceEventType::ActuationLaunched { .. }
            )
        })
        && window
            .windows(2)
            .all(|pair| !pair[0].details.same_type(&pair[1].details))
}
