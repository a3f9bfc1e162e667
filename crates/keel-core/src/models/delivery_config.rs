use jiff::SignedDuration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::resource::{Resource, ResourceId};
use crate::error::CoreError;

/// The submitted manifest: artifacts plus the environments they are promoted through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    pub name: String,
    pub application: String,
    pub service_account: String,
    #[serde(default)]
    pub artifacts: Vec<DeliveryArtifact>,
    #[serde(default)]
    pub environments: Vec<Environment>,
}

impl DeliveryConfig {
    pub fn environment(&self, name: &str) -> Result<&Environment, CoreError> {
        self.environments
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| CoreError::UnknownEnvironment {
                delivery_config: self.name.clone(),
                environment: name.to_string(),
            })
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.environments.iter().flat_map(|e| e.resources.iter())
    }

    pub fn environment_of(&self, resource_id: &ResourceId) -> Option<&Environment> {
        self.environments
            .iter()
            .find(|e| e.resources.iter().any(|r| &r.id == resource_id))
    }

    /// Copy each environment's shared `locations` into resources that omit their own.
    pub fn with_inherited_locations(mut self) -> Self {
        for env in &mut self.environments {
            let Some(locations) = &env.locations else {
                continue;
            };
            let Ok(locations) = serde_json::to_value(locations) else {
                continue;
            };
            for resource in &mut env.resources {
                if let Value::Object(spec) = &mut resource.spec {
                    spec.entry("locations").or_insert_with(|| locations.clone());
                }
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub notifications: Vec<NotificationConfig>,
    /// Defaults inherited by resources that don't declare `locations`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<EnvironmentLocations>,
}

impl Environment {
    pub fn constraints_of_type<'a>(&'a self, constraint_type: &str) -> impl Iterator<Item = &'a Constraint> {
        self.constraints
            .iter()
            .filter(move |c| c.constraint_type() == constraint_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentLocations {
    pub account: String,
    pub regions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub address: String,
    #[serde(default)]
    pub frequency: NotificationFrequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Slack,
    Email,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationFrequency {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// A promotable artifact stream.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryArtifact {
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    /// Unique within the delivery config; how environments refer to the artifact.
    pub reference: String,
    pub delivery_config_name: String,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    Deb,
    Docker,
    Npm,
}

/// A promotion gate attached to an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Constraint {
    ManualJudgement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<SignedDuration>,
    },
    DependsOn {
        environment: String,
    },
    AllowedTimes {
        windows: Vec<TimeWindow>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tz: Option<String>,
    },
}

impl Constraint {
    pub const MANUAL_JUDGEMENT: &'static str = "manual-judgement";
    pub const DEPENDS_ON: &'static str = "depends-on";
    pub const ALLOWED_TIMES: &'static str = "allowed-times";

    pub fn constraint_type(&self) -> &'static str {
        match self {
            Self::ManualJudgement { .. } => Self::MANUAL_JUDGEMENT,
            Self::DependsOn { .. } => Self::DEPENDS_ON,
            Self::AllowedTimes { .. } => Self::ALLOWED_TIMES,
        }
    }
}

/// Days like `mon-fri,sun` and hours like `9-17,20`; both ranges inclusive.
/// An omitted field matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
}
