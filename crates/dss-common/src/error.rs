//! Error types for dss-deploy
//!
//! Errors carry the context an automated pipeline needs to point at the
//! culprit: the metadata field for validation failures, the logical slot for
//! collaborator failures.

use thiserror::Error;

/// Boxed error returned by collaborator generators
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for composition
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Metadata is missing a required field or has a field of the wrong shape
    #[error("validation error{}: {message}", field_suffix(.field))]
    Validation {
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "PSP.roleRef")
        field: Option<String>,
    },

    /// A collaborator generator failed
    #[error("collaborator for slot {slot} failed: {source}")]
    Collaborator {
        /// Logical name of the slot being generated (e.g., "sset", "istio.kiali")
        slot: String,
        /// The collaborator's own error, unchanged
        #[source]
        source: BoxError,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// Template loading or rendering error
    #[error("template error [{template}]: {message}")]
    Template {
        /// Template name or path
        template: String,
        /// Description of what failed
        message: String,
    },

    /// Filesystem error
    #[error("io error [{path}]: {source}")]
    Io {
        /// Path being read or written
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

fn field_suffix(field: &Option<String>) -> String {
    field.as_deref().map(|f| format!(" at {f}")).unwrap_or_default()
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error pointing at a metadata field
    pub fn validation_for_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Tag a collaborator failure with the slot it was generating
    pub fn collaborator(slot: impl Into<String>, source: BoxError) -> Self {
        Self::Collaborator {
            slot: slot.into(),
            source,
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error for a specific resource kind
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create a template error
    pub fn template(template: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
            message: msg.into(),
        }
    }

    /// Wrap an I/O error with the path it concerned
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The slot name for collaborator failures
    pub fn slot(&self) -> Option<&str> {
        match self {
            Self::Collaborator { slot, .. } => Some(slot),
            _ => None,
        }
    }

    /// Whether this error was raised before any fragment was generated
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
