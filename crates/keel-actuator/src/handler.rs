use keel_core::models::drift::{FieldDrift, json_drift};
use keel_core::models::events::Task;
use keel_core::models::resource::{Resource, ResourceKind};
use keel_storage::BoxFuture;
use serde_json::Value;

use crate::error::ActuatorError;

/// One impl per resource kind (or family of kinds) keel can manage.
///
/// Handlers are the plugin boundary: they know how to read a resource from
/// the cloud and how to launch the tasks that change it. They never touch
/// storage.
pub trait ResourceHandler: Send + Sync {
    /// Plugin name recorded on `ResourceActuationLaunched` events.
    fn name(&self) -> &str;

    fn supports(&self, kind: &ResourceKind) -> bool;

    /// Resolve the resource's spec into the concrete state to compare against.
    fn desired<'a>(&'a self, resource: &'a Resource) -> BoxFuture<'a, Result<Value, ActuatorError>>;

    /// Read current state. `None` means the resource doesn't exist.
    fn current<'a>(
        &'a self,
        resource: &'a Resource,
    ) -> BoxFuture<'a, Result<Option<Value>, ActuatorError>>;

    /// Empty when in sync.
    fn diff(&self, desired: &Value, current: &Value) -> Vec<FieldDrift> {
        json_drift(desired, current)
    }

    fn create<'a>(
        &'a self,
        resource: &'a Resource,
        desired: &'a Value,
    ) -> BoxFuture<'a, Result<Vec<Task>, ActuatorError>>;

    fn update<'a>(
        &'a self,
        resource: &'a Resource,
        desired: &'a Value,
        drift: &'a [FieldDrift],
    ) -> BoxFuture<'a, Result<Vec<Task>, ActuatorError>>;

    /// Whether tasks launched earlier for this resource are still running.
    fn actuation_in_progress<'a>(
        &'a self,
        _resource: &'a Resource,
    ) -> BoxFuture<'a, Result<bool, ActuatorError>> {
        Box::pin(async { Ok(false) })
    }
}
