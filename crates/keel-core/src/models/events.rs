use std::mem;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::drift::FieldDrift;
use super::resource::{Resource, ResourceId, ResourceKind};

/// A unit of work launched by a resource handler (e.g. an orchestration task id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
}

/// An immutable, timestamped fact about one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEvent {
    pub resource_id: ResourceId,
    pub kind: ResourceKind,
    pub application: String,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub details: ResourceEventType,
}

impl ResourceEvent {
    pub fn new(resource: &Resource, details: ResourceEventType, timestamp: Timestamp) -> Self {
        Self {
            resource_id: resource.id.clone(),
            kind: resource.kind.clone(),
            application: resource.application.clone(),
            timestamp,
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResourceEventType {
    #[serde(rename = "ResourceCreated")]
    Created,
    #[serde(rename = "ResourceValid")]
    Valid,
    #[serde(rename = "ResourceMissing")]
    Missing,
    #[serde(rename = "ResourceDeltaDetected")]
    DeltaDetected { delta: Vec<FieldDrift> },
    #[serde(rename = "ResourceDeltaResolved")]
    DeltaResolved,
    #[serde(rename = "ResourceActuationLaunched")]
    ActuationLaunched { plugin: String, tasks: Vec<Task> },
    #[serde(rename = "ResourceActuationPaused")]
    ActuationPaused { reason: String },
    #[serde(rename = "ResourceActuationResumed")]
    ActuationResumed { triggered_by: String },
    #[serde(rename = "ResourceActuationVetoed")]
    ActuationVetoed { reason: String },
    #[serde(rename = "ResourceTaskSucceeded")]
    TaskSucceeded { tasks: Vec<Task> },
    #[serde(rename = "ResourceTaskFailed")]
    TaskFailed { reason: String, tasks: Vec<Task> },
    #[serde(rename = "ResourceCheckError")]
    CheckError { message: String },
    #[serde(rename = "ResourceCheckUnresolvable")]
    CheckUnresolvable { message: String },
}

impl ResourceEventType {
    /// Whether an append of this type collapses into an identical-typed newest entry.
    pub fn ignore_repeated_in_history(&self) -> bool {
        match self {
            Self::Valid
            | Self::Missing
            | Self::DeltaDetected { .. }
            | Self::ActuationPaused { .. }
            | Self::ActuationVetoed { .. }
            | Self::CheckError { .. }
            | Self::CheckUnresolvable { .. } => true,
            Self::Created
            | Self::DeltaResolved
            | Self::ActuationLaunched { .. }
            | Self::ActuationResumed { .. }
            | Self::TaskSucceeded { .. }
            | Self::TaskFailed { .. } => false,
        }
    }

    /// Same variant, payload ignored.
    pub fn same_type(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// The serialized type tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created => "ResourceCreated",
            Self::Valid => "ResourceValid",
            Self::Missing => "ResourceMissing",
            Self::DeltaDetected { .. } => "ResourceDeltaDetected",
            Self::DeltaResolved => "ResourceDeltaResolved",
            Self::ActuationLaunched { .. } => "ResourceActuationLaunched",
            Self::ActuationPaused { .. } => "ResourceActuationPaused",
            Self::ActuationResumed { .. } => "ResourceActuationResumed",
            Self::ActuationVetoed { .. } => "ResourceActuationVetoed",
            Self::TaskSucceeded { .. } => "ResourceTaskSucceeded",
            Self::TaskFailed { .. } => "ResourceTaskFailed",
            Self::CheckError { .. } => "ResourceCheckError",
            Self::CheckUnresolvable { .. } => "ResourceCheckUnresolvable",
        }
    }
}

/// An immutable, timestamped fact about an application as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationEvent {
    pub application: String,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub details: ApplicationEventType,
}

impl ApplicationEvent {
    pub fn new(application: impl Into<String>, details: ApplicationEventType, timestamp: Timestamp) -> Self {
        Self {
            application: application.into(),
            timestamp,
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApplicationEventType {
    #[serde(rename = "ApplicationActuationPaused")]
    ActuationPaused { triggered_by: String },
    #[serde(rename = "ApplicationActuationResumed")]
    ActuationResumed { triggered_by: String },
}

impl ApplicationEventType {
    pub fn ignore_repeated_in_history(&self) -> bool {
        match self {
            Self::ActuationPaused { .. } | Self::ActuationResumed { .. } => true,
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ActuationPaused { .. } => "ApplicationActuationPaused",
            Self::ActuationResumed { .. } => "ApplicationActuationResumed",
        }
    }
}
