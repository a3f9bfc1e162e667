use serde::{Deserialize, Serialize};

/// Coarse health of a resource, projected from its recent event history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    Happy,
    Actuating,
    /// Drifting and being re-actuated over and over without converging.
    Unhappy,
    Created,
    Diff,
    Error,
    Paused,
    Vetoed,
    Resumed,
    Unknown,
}
