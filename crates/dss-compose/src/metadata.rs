//! Deployment metadata: the single input of a composition run
//!
//! Metadata arrives as an untyped document (YAML or JSON) and is validated
//! here, once, before any generator runs. Optional feature flags are resolved
//! against [`FeatureDefaults`] at the same time, so the composer never sees an
//! unresolved flag. Fields the composer does not interpret are kept verbatim
//! for collaborators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dss_common::kube_utils::validate_dns_label;
use dss_common::yaml::parse_yaml;
use dss_common::{Error, Result};

/// Values applied when an optional feature flag is absent from metadata.
///
/// Absence means "disabled" for every flag. Keeping the defaults in one
/// record makes that policy visible and testable instead of scattering
/// `unwrap_or(false)` through the composition logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureDefaults {
    /// Default for `enable_istio`
    pub enable_istio: bool,
    /// Default for `alert.enable`
    pub alert_enable: bool,
    /// Default for `PSP.roleBinding`
    pub psp_role_binding: bool,
}

impl FeatureDefaults {
    /// All optional features disabled
    pub const DISABLED: FeatureDefaults = FeatureDefaults {
        enable_istio: false,
        alert_enable: false,
        psp_role_binding: false,
    };
}

impl Default for FeatureDefaults {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Alerting settings
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlertConfig {
    /// Whether the alerting stack is generated
    pub enable: bool,
    /// Collaborator-specific fields (receivers, routes, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Pod-security-policy binding settings
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PspConfig {
    /// Whether to emit the privileged RoleBinding
    #[serde(rename = "roleBinding")]
    pub role_binding: bool,
    /// Name of the ClusterRole to bind; always set when `role_binding` is true
    #[serde(rename = "roleRef", skip_serializing_if = "Option::is_none")]
    pub role_ref: Option<String>,
    /// Collaborator-specific fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Validated deployment metadata
///
/// The only constructors are [`Metadata::from_value`] and its siblings, so
/// every instance has passed validation. Fields are read through accessors.
///
/// Serializes back to the input's key names with defaults filled in, which
/// is the shape collaborators and templates see.
///
/// ```compile_fail
/// use dss_compose::{AlertConfig, Metadata, PspConfig};
///
/// let unchecked = Metadata {
///     namespace: String::new(),
///     cluster_name: String::new(),
///     enable_istio: false,
///     alert: AlertConfig { enable: false, extra: Default::default() },
///     psp: PspConfig { role_binding: true, role_ref: None, extra: Default::default() },
///     extra: Default::default(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metadata {
    namespace: String,
    #[serde(rename = "clusterName")]
    cluster_name: String,
    enable_istio: bool,
    alert: AlertConfig,
    #[serde(rename = "PSP")]
    psp: PspConfig,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// Top-level keys the template context defines itself; metadata may not use them
pub const RESERVED_KEYS: [&str; 2] = ["metadata", "slot"];

// Unvalidated wire shape. Every field is optional so that missing fields
// surface as validation errors naming the field, not as serde messages.
#[derive(Deserialize)]
struct RawMetadata {
    namespace: Option<Value>,
    #[serde(rename = "clusterName")]
    cluster_name: Option<Value>,
    enable_istio: Option<Value>,
    alert: Option<Value>,
    #[serde(rename = "PSP")]
    psp: Option<Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl Metadata {
    /// Validate a metadata document using the default feature policy
    pub fn from_value(value: Value) -> Result<Self> {
        Self::from_value_with_defaults(value, FeatureDefaults::default())
    }

    /// Validate a metadata document, resolving absent flags from `defaults`
    ///
    /// All checks run before the value is returned; a caller holding a
    /// `Metadata` never needs to re-validate.
    pub fn from_value_with_defaults(value: Value, defaults: FeatureDefaults) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::validation(format!(
                "metadata must be an object, got {}",
                type_name(&value)
            )));
        }

        let raw: RawMetadata = serde_json::from_value(value)
            .map_err(|e| Error::validation(format!("malformed metadata: {e}")))?;

        if let Some(key) = RESERVED_KEYS.iter().find(|key| raw.extra.contains_key(**key)) {
            return Err(Error::validation_for_field(
                *key,
                "reserved for the template context",
            ));
        }

        let namespace = required_string(raw.namespace, "namespace")?;
        validate_dns_label(&namespace)
            .map_err(|msg| Error::validation_for_field("namespace", msg))?;

        let cluster_name = required_string(raw.cluster_name, "clusterName")?;

        let enable_istio = optional_bool(raw.enable_istio, "enable_istio")?
            .unwrap_or(defaults.enable_istio);

        let mut alert_fields = optional_object(raw.alert, "alert")?;
        let alert_enable = optional_bool(alert_fields.remove("enable"), "alert.enable")?
            .unwrap_or(defaults.alert_enable);

        let mut psp_fields = optional_object(raw.psp, "PSP")?;
        let role_binding = optional_bool(psp_fields.remove("roleBinding"), "PSP.roleBinding")?
            .unwrap_or(defaults.psp_role_binding);
        let role_ref = optional_string(psp_fields.remove("roleRef"), "PSP.roleRef")?;
        if role_binding && role_ref.as_deref().map_or(true, str::is_empty) {
            return Err(Error::validation_for_field(
                "PSP.roleRef",
                "required when PSP.roleBinding is true",
            ));
        }

        Ok(Self {
            namespace,
            cluster_name,
            enable_istio,
            alert: AlertConfig {
                enable: alert_enable,
                extra: alert_fields,
            },
            psp: PspConfig {
                role_binding,
                role_ref,
                extra: psp_fields,
            },
            extra: raw.extra,
        })
    }

    /// Parse and validate a YAML or JSON metadata document
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let value = parse_yaml(input)
            .map_err(|e| Error::validation(format!("metadata is not valid YAML: {e}")))?;
        Self::from_value(value)
    }

    /// The metadata as a JSON document, defaults filled in
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| Error::serialization(format!("failed to serialize metadata: {e}")))
    }

    /// Target namespace for every generated resource
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Logical cluster instance name
    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Generate the Istio overlay and enable sidecar injection
    pub fn enable_istio(&self) -> bool {
        self.enable_istio
    }

    /// Alerting settings
    pub fn alert(&self) -> &AlertConfig {
        &self.alert
    }

    /// Privileged binding settings
    pub fn psp(&self) -> &PspConfig {
        &self.psp
    }

    /// Fields consumed only by collaborators
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    /// The ClusterRole to bind, if the privileged binding is requested
    pub fn privileged_role(&self) -> Option<&str> {
        if self.psp.role_binding {
            self.psp.role_ref.as_deref()
        } else {
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn required_string(value: Option<Value>, field: &str) -> Result<String> {
    match optional_string(value, field)? {
        Some(s) if !s.is_empty() => Ok(s),
        Some(_) => Err(Error::validation_for_field(field, "must not be empty")),
        None => Err(Error::validation_for_field(field, "required field is missing")),
    }
}

fn optional_string(value: Option<Value>, field: &str) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(Error::validation_for_field(
            field,
            format!("expected string, got {}", type_name(&other)),
        )),
    }
}

fn optional_bool(value: Option<Value>, field: &str) -> Result<Option<bool>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(other) => Err(Error::validation_for_field(
            field,
            format!("expected boolean, got {}", type_name(&other)),
        )),
    }
}

fn optional_object(value: Option<Value>, field: &str) -> Result<BTreeMap<String, Value>> {
    match value {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Object(map)) => Ok(map.into_iter().collect()),
        Some(other) => Err(Error::validation_for_field(
            field,
            format!("expected object, got {}", type_name(&other)),
        )),
    }
}
