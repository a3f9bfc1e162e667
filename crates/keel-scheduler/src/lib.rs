//! keel-scheduler
//!
//! Periodic check cycles. Each cycle pulls a batch of due items and fans the
//! work out in parallel; any number of schedulers can share the same stores.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod sources;

pub use crate::config::{CycleConfig, SchedulerConfig};
pub use crate::error::SchedulerError;
pub use crate::scheduler::CheckScheduler;
pub use crate::sources::{ArtifactVersionSource, ScheduledAgent};
