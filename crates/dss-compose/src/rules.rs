//! Conditional-inclusion rules
//!
//! Every decision about *whether* something is generated is made here, once
//! per composition run, from the validated metadata. Generation code only
//! consults the resulting [`InclusionPlan`].

use serde::Serialize;

use crate::metadata::Metadata;
use crate::slot::{MeshSlot, Slot};

/// Evaluated inclusion decisions for one metadata object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct InclusionPlan {
    /// The namespace carries the Istio sidecar-injection label
    pub mesh_injection: bool,
    /// The privileged RoleBinding is generated
    pub psp_role_binding: bool,
    /// The alerting collaborator is invoked
    pub alerting: bool,
    /// The four mesh collaborators are invoked
    pub mesh_overlay: bool,
}

impl InclusionPlan {
    /// Evaluate the inclusion rules against `metadata`
    pub fn evaluate(metadata: &Metadata) -> Self {
        Self {
            // Namespace is always generated; the label is the only part that
            // depends on the mesh flag.
            mesh_injection: metadata.enable_istio(),
            psp_role_binding: metadata.privileged_role().is_some(),
            alerting: metadata.alert().enable,
            mesh_overlay: metadata.enable_istio(),
        }
    }

    /// Whether the composer requests `slot` at all.
    ///
    /// Unconditional slots always return true. A requested collaborator slot
    /// may still end up absent if the collaborator itself returns nothing.
    pub fn includes(&self, slot: Slot) -> bool {
        match slot {
            Slot::PspRoleBinding => self.psp_role_binding,
            Slot::Alertmanager => self.alerting,
            Slot::Istio => self.mesh_overlay,
            Slot::DefaultNamespace
            | Slot::ClusterMetadata
            | Slot::StorageCluster
            | Slot::Auxiliary
            | Slot::Gateway
            | Slot::Backend
            | Slot::Prometheus
            | Slot::Grafana => true,
        }
    }

    /// Names of every slot and mesh sub-slot that would be requested
    pub fn requested_slots(&self) -> Vec<String> {
        let mut names = Vec::new();
        for slot in Slot::ALL {
            if !self.includes(slot) {
                continue;
            }
            if slot == Slot::Istio {
                names.extend(MeshSlot::ALL.iter().map(|m| m.qualified_name()));
            } else {
                names.push(slot.as_str().to_string());
            }
        }
        names
    }

    /// Names of the slots that are skipped
    pub fn skipped_slots(&self) -> Vec<&'static str> {
        Slot::ALL
            .into_iter()
            .filter(|slot| !self.includes(*slot))
            .map(Slot::as_str)
            .collect()
    }
}
