//! The resource graph: output of one composition run
//!
//! Each slot is an `Option`: `None` means the slot was not requested or its
//! collaborator produced nothing. Absent slots are omitted when serialized,
//! never rendered as empty documents.

use serde::Serialize;
use serde_json::Value;

use dss_common::{Error, Result};

use crate::fragment::Fragment;
use crate::slot::{MeshSlot, Slot};

/// The Istio overlay composite
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeshOverlay {
    /// Mesh base definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<Fragment>,
    /// Custom resource definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crd: Option<Fragment>,
    /// Service-graph visualization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kiali: Option<Fragment>,
    /// Distributed tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracing: Option<Fragment>,
}

impl MeshOverlay {
    /// The fragment for a mesh sub-slot
    pub fn get(&self, slot: MeshSlot) -> Option<&Fragment> {
        match slot {
            MeshSlot::Base => self.base.as_ref(),
            MeshSlot::Crd => self.crd.as_ref(),
            MeshSlot::Kiali => self.kiali.as_ref(),
            MeshSlot::Tracing => self.tracing.as_ref(),
        }
    }

    /// Whether no sub-slot holds anything
    pub fn is_empty(&self) -> bool {
        MeshSlot::ALL.into_iter().all(|slot| self.get(slot).is_none())
    }

    /// Fragments in sub-slot order, skipping absent ones
    pub fn fragments(&self) -> impl Iterator<Item = (MeshSlot, &Fragment)> {
        MeshSlot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|f| (slot, f)))
    }
}

/// Named collection of fragments produced by one composition run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResourceGraph {
    /// Target namespace
    pub default_namespace: Fragment,
    /// ConfigMap carrying the cluster name
    pub cluster_metadata: Fragment,
    /// Privileged RoleBinding, when requested
    #[serde(rename = "pspRB", skip_serializing_if = "Option::is_none")]
    pub psp_role_binding: Option<Fragment>,
    /// Storage cluster
    #[serde(rename = "sset", skip_serializing_if = "Option::is_none")]
    pub storage_cluster: Option<Fragment>,
    /// Auxiliary services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<Fragment>,
    /// HTTP gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Fragment>,
    /// gRPC backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<Fragment>,
    /// Prometheus metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<Fragment>,
    /// Grafana dashboards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grafana: Option<Fragment>,
    /// Alerting, when enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alertmanager: Option<Fragment>,
    /// Mesh overlay, when enabled and at least one part was generated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub istio: Option<MeshOverlay>,
}

impl ResourceGraph {
    /// The fragment in a non-composite slot
    ///
    /// Returns `None` for `Slot::Istio`; use the `istio` field for the overlay.
    pub fn get(&self, slot: Slot) -> Option<&Fragment> {
        match slot {
            Slot::DefaultNamespace => Some(&self.default_namespace),
            Slot::ClusterMetadata => Some(&self.cluster_metadata),
            Slot::PspRoleBinding => self.psp_role_binding.as_ref(),
            Slot::StorageCluster => self.storage_cluster.as_ref(),
            Slot::Auxiliary => self.auxiliary.as_ref(),
            Slot::Gateway => self.gateway.as_ref(),
            Slot::Backend => self.backend.as_ref(),
            Slot::Prometheus => self.prometheus.as_ref(),
            Slot::Grafana => self.grafana.as_ref(),
            Slot::Alertmanager => self.alertmanager.as_ref(),
            Slot::Istio => None,
        }
    }

    /// Whether a slot holds anything
    pub fn contains(&self, slot: Slot) -> bool {
        match slot {
            Slot::Istio => self.istio.is_some(),
            other => self.get(other).is_some(),
        }
    }

    /// Every present fragment with its qualified slot name, in graph order
    pub fn fragments(&self) -> Vec<(String, &Fragment)> {
        let mut out = Vec::new();
        for slot in Slot::ALL {
            if slot == Slot::Istio {
                if let Some(mesh) = &self.istio {
                    out.extend(
                        mesh.fragments()
                            .map(|(sub, fragment)| (sub.qualified_name(), fragment)),
                    );
                }
            } else if let Some(fragment) = self.get(slot) {
                out.push((slot.as_str().to_string(), fragment));
            }
        }
        out
    }

    /// Qualified names of the present slots (`istio.kiali` for mesh parts)
    pub fn present_slots(&self) -> Vec<String> {
        self.fragments().into_iter().map(|(name, _)| name).collect()
    }

    /// Flatten into individual resources in apply order.
    ///
    /// Resources are collected slot by slot, then stably sorted by
    /// [`kind_priority`] so namespaces, CRDs and RBAC land before workloads.
    pub fn manifests(&self) -> Vec<&Value> {
        let mut resources: Vec<&Value> = self
            .fragments()
            .into_iter()
            .flat_map(|(_, fragment)| fragment.resources())
            .collect();
        resources.sort_by_key(|r| kind_priority(r["kind"].as_str().unwrap_or_default()));
        resources
    }

    /// Render [`manifests`](Self::manifests) as a `---`-separated YAML stream
    pub fn to_yaml_stream(&self) -> Result<String> {
        let mut out = String::new();
        for resource in self.manifests() {
            let doc = serde_yaml::to_string(resource).map_err(|e| {
                Error::serialization_for_kind(
                    resource["kind"].as_str().unwrap_or("unknown"),
                    e.to_string(),
                )
            })?;
            out.push_str("---\n");
            out.push_str(&doc);
        }
        Ok(out)
    }

    /// The whole graph as a JSON document keyed by slot name
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| Error::serialization(format!("failed to serialize resource graph: {e}")))
    }
}

/// Apply priority for a Kubernetes resource kind (lower = apply first)
pub fn kind_priority(kind: &str) -> u8 {
    match kind {
        "Namespace" => 0,
        "CustomResourceDefinition" => 1,
        "ServiceAccount" => 2,
        "ClusterRole" | "Role" => 3,
        "ClusterRoleBinding" | "RoleBinding" => 4,
        "ConfigMap" | "Secret" => 5,
        "Service" => 6,
        "Deployment" | "DaemonSet" | "StatefulSet" => 7,
        "HorizontalPodAutoscaler" => 8,
        _ => 10,
    }
}
