//! keel-actuator
//!
//! Drives managed resources toward their desired state and records every
//! observation in the event log.

pub mod actuator;
pub mod error;
pub mod handler;
pub mod pauser;
pub mod persister;
pub mod recorder;

pub use crate::actuator::{ResourceActuator, TaskOutcome};
pub use crate::error::{ActuatorError, format_err_chain};
pub use crate::handler::ResourceHandler;
pub use crate::pauser::ActuationPauser;
pub use crate::persister::{PersistedConfig, ResourcePersister};
pub use crate::recorder::EventRecorder;
