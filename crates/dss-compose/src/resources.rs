//! Resources the composer builds itself
//!
//! The namespace and the cluster-metadata ConfigMap are the glue every other
//! fragment refers to, so they are generated here rather than by a
//! collaborator.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use dss_common::{CLUSTER_METADATA_CONFIGMAP, ISTIO_INJECTION_ENABLED, ISTIO_INJECTION_LABEL};

use crate::metadata::Metadata;

/// ConfigMap key holding the cluster name
pub const CLUSTER_NAME_KEY: &str = "clusterName";

/// The target namespace.
///
/// Labelled for Istio sidecar injection only when `mesh_injection` is set;
/// otherwise it carries no labels at all.
pub fn namespace(metadata: &Metadata, mesh_injection: bool) -> Namespace {
    let labels = mesh_injection.then(|| {
        BTreeMap::from([(
            ISTIO_INJECTION_LABEL.to_string(),
            ISTIO_INJECTION_ENABLED.to_string(),
        )])
    });

    Namespace {
        metadata: ObjectMeta {
            name: Some(metadata.namespace().to_string()),
            labels,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// ConfigMap publishing the logical cluster name to workloads in the namespace
pub fn cluster_metadata(metadata: &Metadata) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(CLUSTER_METADATA_CONFIGMAP.to_string()),
            namespace: Some(metadata.namespace().to_string()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            CLUSTER_NAME_KEY.to_string(),
            metadata.cluster_name().to_string(),
        )])),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> Metadata {
        Metadata::from_value(json!({
            "namespace": "uss1",
            "clusterName": "c1",
            "alert": {"enable": true},
            "region": "us-east1",
        }))
        .unwrap()
    }

    #[test]
    fn namespace_without_mesh_has_no_labels() {
        let ns = namespace(&metadata(), false);
        assert_eq!(ns.metadata.name.as_deref(), Some("uss1"));
        assert!(ns.metadata.labels.is_none());
    }

    #[test]
    fn namespace_with_mesh_gets_injection_label() {
        let ns = namespace(&metadata(), true);
        let labels = ns.metadata.labels.unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("istio-injection").map(String::as_str), Some("enabled"));
    }

    #[test]
    fn cluster_metadata_carries_only_the_cluster_name() {
        let cm = cluster_metadata(&metadata());
        assert_eq!(cm.metadata.name.as_deref(), Some("cluster-metadata"));
        assert_eq!(cm.metadata.namespace.as_deref(), Some("uss1"));

        let data = cm.data.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("clusterName").map(String::as_str), Some("c1"));
    }
}
