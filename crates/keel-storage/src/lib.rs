//! keel-storage
//!
//! The storage boundary the reconciliation core depends on, plus an
//! in-memory reference backend.
//!
//! Every trait returns boxed futures so backends can be used as trait objects.
//! The in-memory backend gives the same guarantees a durable one must:
//! append-only histories, atomic read-and-mark for due items, and conditional
//! writes for constraint state.

use std::future::Future;
use std::pin::Pin;

pub mod constraint_state;
pub mod error;
pub mod event_log;
pub mod memory;
pub mod periodically_checked;
pub mod publisher;
pub mod repository;
pub mod status;

pub use crate::constraint_state::ConstraintStateRepository;
pub use crate::error::StorageError;
pub use crate::event_log::EventLog;
pub use crate::periodically_checked::PeriodicallyChecked;
pub use crate::publisher::{BroadcastPublisher, InMemoryPublisher};
pub use crate::repository::{
    ArtifactRepository, DeliveryConfigRepository, DueEnvironment, PauseScope, PausedRepository,
    ResourceRepository, UpsertOutcome,
};
pub use crate::status::resource_status;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
