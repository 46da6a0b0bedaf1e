//! Resource fragments
//!
//! A fragment is an opaque document: one Kubernetes resource, a list of them,
//! or a nested object of them (the way generators group related resources).
//! The composer never looks inside collaborator fragments; the only structural
//! operation is flattening into individual resources for a manifest stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dss_common::{Error, Result};

/// One opaque resource definition unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fragment(Value);

impl Fragment {
    /// Wrap an already-built document
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Build a fragment from a typed resource (k8s-openapi struct, etc.)
    pub fn from_resource<T: Serialize>(resource: &T) -> Result<Self> {
        serde_json::to_value(resource).map(Self).map_err(|e| {
            Error::serialization_for_kind(
                std::any::type_name::<T>().rsplit("::").next().unwrap_or("resource"),
                e.to_string(),
            )
        })
    }

    /// Borrow the underlying document
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the underlying document
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Individual Kubernetes resources contained in this fragment.
    ///
    /// An object with both `apiVersion` and `kind` is a resource. Arrays are
    /// walked in order and other objects in key order, so nested generator
    /// output (`{statefulset: {...}, service: {...}}`) flattens too. Scalars
    /// and nulls contribute nothing.
    pub fn resources(&self) -> Vec<&Value> {
        let mut out = Vec::new();
        collect_resources(&self.0, &mut out);
        out
    }
}

impl From<Value> for Fragment {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Whether a document looks like a Kubernetes resource
pub fn is_resource(value: &Value) -> bool {
    value.get("apiVersion").is_some_and(Value::is_string)
        && value.get("kind").is_some_and(Value::is_string)
}

fn collect_resources<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(_) if is_resource(value) => out.push(value),
        Value::Object(map) => map.values().for_each(|v| collect_resources(v, out)),
        Value::Array(items) => items.iter().for_each(|v| collect_resources(v, out)),
        _ => {}
    }
}
