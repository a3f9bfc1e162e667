use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintStatus {
    Pending,
    Pass,
    Fail,
    OverridePass,
    OverrideFail,
}

impl ConstraintStatus {
    /// Every status except `Pending` is terminal and never recomputed.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn passes(self) -> bool {
        matches!(self, Self::Pass | Self::OverridePass)
    }

    pub fn fails(self) -> bool {
        matches!(self, Self::Fail | Self::OverrideFail)
    }

    pub fn is_override(self) -> bool {
        matches!(self, Self::OverridePass | Self::OverrideFail)
    }
}

impl fmt::Display for ConstraintStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::OverridePass => "OVERRIDE_PASS",
            Self::OverrideFail => "OVERRIDE_FAIL",
        };
        f.write_str(s)
    }
}

/// Composite key of a promotion-gate record.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ConstraintStateKey {
    pub delivery_config_name: String,
    pub environment_name: String,
    pub artifact_version: String,
    pub constraint_type: String,
}

impl ConstraintStateKey {
    pub fn new(
        delivery_config_name: impl Into<String>,
        environment_name: impl Into<String>,
        artifact_version: impl Into<String>,
        constraint_type: impl Into<String>,
    ) -> Self {
        Self {
            delivery_config_name: delivery_config_name.into(),
            environment_name: environment_name.into(),
            artifact_version: artifact_version.into(),
            constraint_type: constraint_type.into(),
        }
    }
}

impl fmt::Display for ConstraintStateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.delivery_config_name, self.environment_name, self.artifact_version, self.constraint_type
        )
    }
}

/// Persisted state of one constraint for one artifact version in one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintState {
    #[serde(flatten)]
    pub key: ConstraintStateKey,
    pub status: ConstraintStatus,
    pub created_at: Timestamp,
    pub judged_by: Option<String>,
    pub judged_at: Option<Timestamp>,
    pub comment: Option<String>,
    /// Constraint-specific data (approval metadata, window info, ...)
    #[serde(default)]
    pub attributes: Value,
}

impl ConstraintState {
    /// A freshly created, never-judged record.
    pub fn pending(key: ConstraintStateKey, created_at: Timestamp) -> Self {
        Self {
            key,
            status: ConstraintStatus::Pending,
            created_at,
            judged_by: None,
            judged_at: None,
            comment: None,
            attributes: Value::Null,
        }
    }

    /// Move to a new status, stamping who decided and when.
    pub fn judge(&mut self, status: ConstraintStatus, judged_by: impl Into<String>, at: Timestamp) {
        self.status = status;
        self.judged_by = Some(judged_by.into());
        self.judged_at = Some(at);
    }
}
