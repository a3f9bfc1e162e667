//! Notifications the core publishes to the outside world.

use serde::{Deserialize, Serialize};

use crate::models::constraint_state::ConstraintState;
use crate::models::delivery_config::Constraint;
use crate::models::events::{ApplicationEvent, ResourceEvent};

/// A constraint state was created or moved to a new status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintStateChanged {
    pub delivery_config: String,
    pub environment: String,
    /// `None` for implicit constraints, which have no manifest entry.
    pub constraint: Option<Constraint>,
    pub previous: Option<ConstraintState>,
    pub current: ConstraintState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "notification", rename_all = "snake_case")]
pub enum Notification {
    ConstraintStateChanged(ConstraintStateChanged),
    Resource(ResourceEvent),
    Application(ApplicationEvent),
}

/// Publish/subscribe sink. Delivery and retry are the subscriber's concern.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, notification: Notification);
}
