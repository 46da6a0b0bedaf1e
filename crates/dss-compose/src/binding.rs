//! Privileged access-policy binding
//!
//! Grants a cluster-scoped privileged role (historically the PodSecurityPolicy
//! `use` role) to **every** service account in the target namespace by
//! binding it to the `system:serviceaccounts:<namespace>` group. The storage,
//! gateway and backend workloads all run under their own service accounts in
//! that namespace and all need the policy, so the subject must stay the
//! namespace-wide group.

use k8s_openapi::api::rbac::v1::{RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use dss_common::kube_utils::{service_account_group, RBAC_API_GROUP};
use dss_common::PRIVILEGED_ROLE_BINDING_NAME;

/// Bind ClusterRole `role_ref` to all service accounts in `namespace`
pub fn privileged_role_binding(namespace: &str, role_ref: &str) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(PRIVILEGED_ROLE_BINDING_NAME.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.to_string(),
            kind: "ClusterRole".to_string(),
            name: role_ref.to_string(),
        },
        subjects: Some(vec![Subject {
            api_group: Some(RBAC_API_GROUP.to_string()),
            kind: "Group".to_string(),
            name: service_account_group(namespace),
            namespace: None,
        }]),
    }
}
