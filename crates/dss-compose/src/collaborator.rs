//! Collaborator generators
//!
//! Everything outside the composer's own glue resources (storage cluster,
//! gateway, backend, monitoring, mesh) comes from a collaborator: a pure
//! function of the metadata that returns a fragment or nothing. Collaborators
//! are injected through [`Collaborators`] instead of being looked up, so the
//! composer can be driven by stubs in tests and by templates in production.

use std::fmt;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use dss_common::BoxError;

use crate::fragment::Fragment;
use crate::metadata::Metadata;
use crate::slot::{MeshSlot, Slot};

/// A fragment generator for one slot
///
/// Implementations must be deterministic and must not depend on any other
/// collaborator's output. Returning `Ok(None)` leaves the slot absent.
#[cfg_attr(test, automock)]
pub trait Collaborator: Send + Sync {
    /// Generate this collaborator's fragment for `metadata`
    fn generate(&self, metadata: &Metadata) -> Result<Option<Fragment>, BoxError>;
}

impl<F> Collaborator for F
where
    F: Fn(&Metadata) -> Result<Option<Fragment>, BoxError> + Send + Sync,
{
    fn generate(&self, metadata: &Metadata) -> Result<Option<Fragment>, BoxError> {
        self(metadata)
    }
}

/// Shared handle to a collaborator
pub type SharedCollaborator = Arc<dyn Collaborator>;

/// Wrap a closure as a shared collaborator
///
/// Exists mostly so closure argument types are inferred.
pub fn from_fn<F>(f: F) -> SharedCollaborator
where
    F: Fn(&Metadata) -> Result<Option<Fragment>, BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Collaborator that never produces anything
#[derive(Clone, Copy, Debug, Default)]
pub struct Absent;

impl Collaborator for Absent {
    fn generate(&self, _metadata: &Metadata) -> Result<Option<Fragment>, BoxError> {
        Ok(None)
    }
}

/// Collaborators for the four mesh sub-slots
#[derive(Clone)]
pub struct MeshCollaborators {
    /// Mesh base definitions
    pub base: SharedCollaborator,
    /// Custom resource definitions
    pub crd: SharedCollaborator,
    /// Service-graph visualization
    pub kiali: SharedCollaborator,
    /// Distributed tracing
    pub tracing: SharedCollaborator,
}

impl MeshCollaborators {
    /// All four sub-collaborators absent
    pub fn absent() -> Self {
        Self {
            base: Arc::new(Absent),
            crd: Arc::new(Absent),
            kiali: Arc::new(Absent),
            tracing: Arc::new(Absent),
        }
    }

    /// The collaborator for a mesh sub-slot
    pub fn for_slot(&self, slot: MeshSlot) -> &dyn Collaborator {
        match slot {
            MeshSlot::Base => self.base.as_ref(),
            MeshSlot::Crd => self.crd.as_ref(),
            MeshSlot::Kiali => self.kiali.as_ref(),
            MeshSlot::Tracing => self.tracing.as_ref(),
        }
    }
}

/// The full set of collaborators handed to a [`Composer`](crate::Composer)
#[derive(Clone)]
pub struct Collaborators {
    /// CockroachDB storage cluster (`sset`)
    pub storage: SharedCollaborator,
    /// Auxiliary services
    pub auxiliary: SharedCollaborator,
    /// HTTP gateway
    pub gateway: SharedCollaborator,
    /// gRPC backend
    pub backend: SharedCollaborator,
    /// Prometheus metrics
    pub prometheus: SharedCollaborator,
    /// Grafana dashboards
    pub grafana: SharedCollaborator,
    /// Alertmanager alerting
    pub alertmanager: SharedCollaborator,
    /// Istio mesh overlay
    pub mesh: MeshCollaborators,
}

impl Collaborators {
    /// Every collaborator absent; override fields with struct update syntax
    pub fn absent() -> Self {
        Self {
            storage: Arc::new(Absent),
            auxiliary: Arc::new(Absent),
            gateway: Arc::new(Absent),
            backend: Arc::new(Absent),
            prometheus: Arc::new(Absent),
            grafana: Arc::new(Absent),
            alertmanager: Arc::new(Absent),
            mesh: MeshCollaborators::absent(),
        }
    }

    /// The collaborator generating a top-level slot.
    ///
    /// `None` for slots the composer builds itself (namespace, cluster
    /// metadata, binding) and for the composite `istio` slot, whose parts
    /// come from [`MeshCollaborators`].
    pub fn for_slot(&self, slot: Slot) -> Option<&dyn Collaborator> {
        let collaborator = match slot {
            Slot::StorageCluster => &self.storage,
            Slot::Auxiliary => &self.auxiliary,
            Slot::Gateway => &self.gateway,
            Slot::Backend => &self.backend,
            Slot::Prometheus => &self.prometheus,
            Slot::Grafana => &self.grafana,
            Slot::Alertmanager => &self.alertmanager,
            Slot::DefaultNamespace | Slot::ClusterMetadata | Slot::PspRoleBinding | Slot::Istio => {
                return None
            }
        };
        Some(collaborator.as_ref())
    }
}

impl fmt::Debug for MeshCollaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshCollaborators").finish_non_exhaustive()
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("mesh", &self.mesh)
            .finish_non_exhaustive()
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::absent()
    }
}
