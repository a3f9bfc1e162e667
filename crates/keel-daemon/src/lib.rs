//! keel-daemon
//!
//! Process bootstrap: configuration, logging, and wiring the in-memory
//! engine together in dependency order.

pub mod config;
pub mod engine;
pub mod logging;
pub mod manifests;
