//! Logical slot names of the resource graph
//!
//! Slot names are a stable contract with whatever submits the graph to a
//! cluster: renaming one is a breaking change.

use std::fmt;

/// Top-level slot of a [`ResourceGraph`](crate::ResourceGraph)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Target namespace
    DefaultNamespace,
    /// ConfigMap carrying the cluster name
    ClusterMetadata,
    /// Privileged RoleBinding for all namespace service accounts
    PspRoleBinding,
    /// CockroachDB storage cluster
    StorageCluster,
    /// Auxiliary services
    Auxiliary,
    /// HTTP gateway
    Gateway,
    /// gRPC backend
    Backend,
    /// Prometheus metrics
    Prometheus,
    /// Grafana dashboards
    Grafana,
    /// Alertmanager alerting
    Alertmanager,
    /// Istio mesh overlay
    Istio,
}

impl Slot {
    /// All slots in graph order
    pub const ALL: [Slot; 11] = [
        Slot::DefaultNamespace,
        Slot::ClusterMetadata,
        Slot::PspRoleBinding,
        Slot::StorageCluster,
        Slot::Auxiliary,
        Slot::Gateway,
        Slot::Backend,
        Slot::Prometheus,
        Slot::Grafana,
        Slot::Alertmanager,
        Slot::Istio,
    ];

    /// Logical name used as the graph key
    pub const fn as_str(self) -> &'static str {
        match self {
            Slot::DefaultNamespace => "default_namespace",
            Slot::ClusterMetadata => "cluster_metadata",
            Slot::PspRoleBinding => "pspRB",
            Slot::StorageCluster => "sset",
            Slot::Auxiliary => "auxiliary",
            Slot::Gateway => "gateway",
            Slot::Backend => "backend",
            Slot::Prometheus => "prometheus",
            Slot::Grafana => "grafana",
            Slot::Alertmanager => "alertmanager",
            Slot::Istio => "istio",
        }
    }

    /// Look up a slot by its logical name
    pub fn from_name(name: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.as_str() == name)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-slot of the Istio mesh overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshSlot {
    /// Mesh base definitions
    Base,
    /// Custom resource definitions
    Crd,
    /// Service-graph visualization
    Kiali,
    /// Distributed tracing
    Tracing,
}

impl MeshSlot {
    /// All mesh sub-slots in graph order
    pub const ALL: [MeshSlot; 4] = [MeshSlot::Base, MeshSlot::Crd, MeshSlot::Kiali, MeshSlot::Tracing];

    /// Key inside the `istio` composite
    pub const fn as_str(self) -> &'static str {
        match self {
            MeshSlot::Base => "base",
            MeshSlot::Crd => "crd",
            MeshSlot::Kiali => "kiali",
            MeshSlot::Tracing => "tracing",
        }
    }

    /// Fully qualified name, e.g. `istio.kiali`, used in errors and listings
    pub fn qualified_name(self) -> String {
        format!("{}.{}", Slot::Istio, self.as_str())
    }
}

impl fmt::Display for MeshSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
