//! In-memory reference backend.
//!
//! Each store guards its state with a single `tokio::sync::Mutex`, which is
//! what makes read-and-mark and insert-if-absent atomic here. A durable
//! backend must provide the same atomicity with conditional writes.

mod agents;
mod artifacts;
mod check_tracker;
mod constraint_state;
mod delivery_configs;
mod event_log;
mod paused;
mod resources;

pub use agents::InMemoryAgentLeases;
pub use artifacts::InMemoryArtifactRepository;
pub use check_tracker::CheckTracker;
pub use constraint_state::InMemoryConstraintStateRepository;
pub use delivery_configs::InMemoryDeliveryConfigRepository;
pub use event_log::InMemoryEventLog;
pub use paused::InMemoryPausedRepository;
pub use resources::InMemoryResourceRepository;
