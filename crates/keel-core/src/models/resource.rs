use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ulid::Ulid;

use crate::error::CoreError;

/// Namespaced resource type tag, written `group/kind@vN` (e.g. `ec2/cluster@v1`).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKind {
    pub group: String,
    pub kind: String,
    pub version: String,
}

impl ResourceKind {
    pub fn new(group: impl Into<String>, kind: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
            version: version.into(),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidResourceKind(s.to_string());
        let (group, rest) = s.split_once('/').ok_or_else(invalid)?;
        let (kind, version) = rest.split_once('@').ok_or_else(invalid)?;
        if group.is_empty() || kind.is_empty() || !version.starts_with('v') || version.len() < 2 {
            return Err(invalid());
        }
        Ok(Self::new(group, kind, version))
    }
}

impl TryFrom<String> for ResourceKind {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}@{}", self.group, self.kind, self.version)
    }
}

/// Globally unique, never-reused resource identifier.
///
/// Derived once from kind, account and name: `{group}:{kind}:{account}:{name}`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn derive(kind: &ResourceKind, account: &str, name: &str) -> Self {
        Self(format!("{}:{}:{account}:{name}", kind.group, kind.kind))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResourceId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.splitn(4, ':').filter(|part| !part.is_empty()).count() != 4 {
            return Err(CoreError::InvalidResourceId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An addressable desired-state record.
///
/// `spec` and `metadata` are opaque to the core; only the resource handler
/// registered for `kind` interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    /// Sortable storage identity, kept across re-submission.
    #[serde(default = "Ulid::new")]
    pub uid: Ulid,
    pub kind: ResourceKind,
    pub api_version: String,
    pub name: String,
    pub account: String,
    pub application: String,
    pub spec: Value,
    #[serde(default)]
    pub metadata: Value,
}

impl Resource {
    pub fn new(
        kind: ResourceKind,
        api_version: impl Into<String>,
        name: impl Into<String>,
        account: impl Into<String>,
        application: impl Into<String>,
        spec: Value,
    ) -> Self {
        let name = name.into();
        let account = account.into();
        Self {
            id: ResourceId::derive(&kind, &account, &name),
            uid: Ulid::new(),
            kind,
            api_version: api_version.into(),
            name,
            account,
            application: application.into(),
            spec,
            metadata: Value::Null,
        }
    }
}
