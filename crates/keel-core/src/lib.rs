//! keel-core
//!
//! Pure domain types for the Keel reconciliation core: resources, their event
//! history, delivery configs, constraint state, and status derivation.
//! No storage or async runtime dependency; this is the shared vocabulary.

pub mod clock;
pub mod error;
pub mod models;
pub mod notification;
pub mod status;

pub use crate::clock::{Clock, MutableClock, SystemClock};
pub use crate::error::CoreError;
pub use crate::status::{derive_status, STATUS_HISTORY_WINDOW};
