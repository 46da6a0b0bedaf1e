//! Common types for dss-deploy: errors, naming rules, YAML and template support

#![deny(missing_docs)]

pub mod error;
pub mod kube_utils;
pub mod telemetry;
pub mod template;
pub mod yaml;

pub use error::{BoxError, Error};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Name of the ConfigMap carrying the logical cluster identity
pub const CLUSTER_METADATA_CONFIGMAP: &str = "cluster-metadata";

/// Name of the RoleBinding granting the privileged policy to a namespace
pub const PRIVILEGED_ROLE_BINDING_NAME: &str = "default:privileged";

/// Namespace label that turns on Istio sidecar injection
pub const ISTIO_INJECTION_LABEL: &str = "istio-injection";

/// Value of [`ISTIO_INJECTION_LABEL`] when injection is on
pub const ISTIO_INJECTION_ENABLED: &str = "enabled";

/// Environment variable naming the default template directory
pub const TEMPLATES_DIR_ENV: &str = "DSS_DEPLOY_TEMPLATES";

/// Environment variable selecting the log output format (`text` or `json`)
pub const LOG_FORMAT_ENV: &str = "DSS_LOG_FORMAT";
