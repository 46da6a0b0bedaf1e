//! Resource-graph composition for DSS deployments
//!
//! A [`Composer`] takes one deployment [`Metadata`] object and produces a
//! [`ResourceGraph`]: the target namespace, a cluster-metadata ConfigMap, an
//! optional privileged RoleBinding, and one fragment per component slot
//! (storage cluster, gateway, backend, monitoring, optional alerting and an
//! optional Istio overlay).
//!
//! Component fragments come from injected [`Collaborator`]s. In production
//! those are YAML templates loaded with [`TemplateSet`]; in tests they are
//! closures or mocks.
//!
//! ```no_run
//! use dss_compose::{Composer, Metadata, TemplateSet};
//!
//! let metadata = Metadata::from_yaml_str("namespace: uss1\nclusterName: c1\n")?;
//! let collaborators = TemplateSet::new("deploy/templates").load()?;
//! let graph = Composer::new(collaborators).compose(&metadata)?;
//! print!("{}", graph.to_yaml_stream()?);
//! # Ok::<(), dss_common::Error>(())
//! ```

#![deny(missing_docs)]

pub mod binding;
pub mod collaborator;
pub mod engine;
pub mod fragment;
pub mod graph;
pub mod metadata;
pub mod resources;
pub mod rules;
pub mod slot;
pub mod template;

pub use collaborator::{from_fn, Absent, Collaborator, Collaborators, MeshCollaborators, SharedCollaborator};
pub use engine::{compose, Composer};
pub use fragment::Fragment;
pub use graph::{kind_priority, MeshOverlay, ResourceGraph};
pub use metadata::{AlertConfig, FeatureDefaults, Metadata, PspConfig};
pub use rules::InclusionPlan;
pub use slot::{MeshSlot, Slot};
pub use template::{load_collaborators, TemplateCollaborator, TemplateSet};
