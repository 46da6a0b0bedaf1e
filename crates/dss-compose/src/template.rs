//! Template-backed collaborators
//!
//! Production collaborators are YAML templates rendered against the metadata.
//! A template set is a directory laid out by slot name:
//!
//! ```text
//! templates/
//!   sset.yaml  auxiliary.yaml  gateway.yaml  backend.yaml
//!   prometheus.yaml  grafana.yaml  alertmanager.yaml
//!   istio/
//!     base.yaml  crd.yaml  kiali.yaml  tracing.yaml
//! ```
//!
//! Missing files leave their slot absent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use dss_common::template::TemplateEngine;
use dss_common::yaml::parse_yaml_multi;
use dss_common::{BoxError, Error, Result};

use crate::collaborator::{Absent, Collaborator, Collaborators, MeshCollaborators, SharedCollaborator};
use crate::fragment::Fragment;
use crate::metadata::Metadata;
use crate::slot::{MeshSlot, Slot};

/// Subdirectory holding the mesh sub-slot templates
pub const MESH_TEMPLATE_DIR: &str = "istio";

/// Collaborator rendering one YAML template
///
/// The template sees every metadata key at top level, the whole metadata
/// object as `metadata`, and its own slot name as `slot`. A render with no
/// documents yields nothing, one document yields that document and several
/// yield an array. Metadata validation rejects top-level `metadata` and
/// `slot` keys, so nothing in the context is shadowed.
pub struct TemplateCollaborator {
    name: String,
    source: String,
    engine: Arc<TemplateEngine>,
}

impl TemplateCollaborator {
    /// Create a collaborator for the template `source`
    ///
    /// `name` labels render errors and is exposed to the template as `slot`.
    pub fn new(name: impl Into<String>, source: impl Into<String>, engine: Arc<TemplateEngine>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            engine,
        }
    }

    /// Slot name this template renders
    pub fn name(&self) -> &str {
        &self.name
    }

    fn context(&self, metadata: &Metadata) -> Result<Value> {
        let value = metadata.to_value()?;
        let mut ctx = match &value {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        ctx.insert("metadata".to_string(), value);
        ctx.insert("slot".to_string(), Value::String(self.name.clone()));
        Ok(Value::Object(ctx))
    }
}

impl std::fmt::Debug for TemplateCollaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateCollaborator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Collaborator for TemplateCollaborator {
    fn generate(&self, metadata: &Metadata) -> std::result::Result<Option<Fragment>, BoxError> {
        let ctx = self.context(metadata)?;
        let rendered = self.engine.render(&self.name, &self.source, &ctx)?;
        let mut docs = parse_yaml_multi(&rendered)
            .map_err(|e| Error::template(&self.name, format!("rendered output is not valid YAML: {e}")))?;

        debug!(slot = %self.name, documents = docs.len(), "rendered template");
        Ok(match docs.len() {
            0 => None,
            1 => docs.pop().map(Fragment::new),
            _ => Some(Fragment::new(Value::Array(docs))),
        })
    }
}

/// Loader for a directory of slot templates
#[derive(Clone, Debug)]
pub struct TemplateSet {
    root: PathBuf,
    engine: Arc<TemplateEngine>,
}

impl TemplateSet {
    /// Template set rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            engine: Arc::new(TemplateEngine::new()),
        }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that backs a top-level slot, if the slot is template-generated
    pub fn path_for(&self, slot: Slot) -> Option<PathBuf> {
        match slot {
            Slot::DefaultNamespace | Slot::ClusterMetadata | Slot::PspRoleBinding | Slot::Istio => None,
            other => Some(self.root.join(format!("{}.yaml", other.as_str()))),
        }
    }

    /// File that backs a mesh sub-slot
    pub fn mesh_path_for(&self, slot: MeshSlot) -> PathBuf {
        self.root
            .join(MESH_TEMPLATE_DIR)
            .join(format!("{}.yaml", slot.as_str()))
    }

    /// Build the full collaborator set from the directory
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if the root is not a directory, [`Error::Io`] if
    /// an existing template cannot be read.
    pub fn load(&self) -> Result<Collaborators> {
        if !self.root.is_dir() {
            return Err(Error::validation(format!(
                "template directory {} does not exist",
                self.root.display()
            )));
        }

        let slot = |slot: Slot| -> Result<SharedCollaborator> {
            match self.path_for(slot) {
                Some(path) => self.load_file(slot.as_str(), &path),
                None => Ok(Arc::new(Absent)),
            }
        };
        let mesh = |slot: MeshSlot| self.load_file(&slot.qualified_name(), &self.mesh_path_for(slot));

        Ok(Collaborators {
            storage: slot(Slot::StorageCluster)?,
            auxiliary: slot(Slot::Auxiliary)?,
            gateway: slot(Slot::Gateway)?,
            backend: slot(Slot::Backend)?,
            prometheus: slot(Slot::Prometheus)?,
            grafana: slot(Slot::Grafana)?,
            alertmanager: slot(Slot::Alertmanager)?,
            mesh: MeshCollaborators {
                base: mesh(MeshSlot::Base)?,
                crd: mesh(MeshSlot::Crd)?,
                kiali: mesh(MeshSlot::Kiali)?,
                tracing: mesh(MeshSlot::Tracing)?,
            },
        })
    }

    fn load_file(&self, name: &str, path: &Path) -> Result<SharedCollaborator> {
        if !path.exists() {
            warn!(slot = name, path = %path.display(), "no template for slot, it will be absent");
            return Ok(Arc::new(Absent));
        }
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        debug!(slot = name, path = %path.display(), "loaded template");
        Ok(Arc::new(TemplateCollaborator::new(
            name,
            source,
            Arc::clone(&self.engine),
        )))
    }
}

/// Load the collaborators for a template directory
pub fn load_collaborators(root: impl Into<PathBuf>) -> Result<Collaborators> {
    TemplateSet::new(root).load()
}
