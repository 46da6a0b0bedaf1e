//! Composition engine
//!
//! Turns one validated [`Metadata`] into one [`ResourceGraph`]:
//!
//! 1. Evaluate the [`InclusionPlan`] (which optional slots are requested).
//! 2. Build the glue resources: namespace, cluster-metadata ConfigMap and,
//!    when requested, the privileged RoleBinding.
//! 3. Ask each collaborator for its fragment. Alerting and the four mesh
//!    collaborators are only called when their flag is set.
//!
//! Slots are generated sequentially in graph order. No slot reads another
//! slot's output, so the order is not observable.

use serde_json::Value;
use tracing::{debug, info, instrument};

use dss_common::{Error, Result};

use crate::binding::privileged_role_binding;
use crate::collaborator::{Collaborator, Collaborators};
use crate::fragment::Fragment;
use crate::graph::{MeshOverlay, ResourceGraph};
use crate::metadata::{FeatureDefaults, Metadata};
use crate::resources;
use crate::rules::InclusionPlan;
use crate::slot::{MeshSlot, Slot};

/// Assembles resource graphs from metadata using injected collaborators
#[derive(Clone)]
pub struct Composer {
    collaborators: Collaborators,
    defaults: FeatureDefaults,
}

impl Composer {
    /// Create a composer with the default feature policy
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            defaults: FeatureDefaults::default(),
        }
    }

    /// Override the feature policy used by [`compose_value`](Self::compose_value)
    pub fn with_defaults(mut self, defaults: FeatureDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// The injected collaborators
    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Validate an untyped metadata document, then compose.
    ///
    /// Validation completes before any collaborator is called; a validation
    /// failure never leaves a partial graph behind.
    pub fn compose_value(&self, metadata: &Value) -> Result<ResourceGraph> {
        let metadata = Metadata::from_value_with_defaults(metadata.clone(), self.defaults)?;
        self.compose(&metadata)
    }

    /// Compose the resource graph for validated metadata
    ///
    /// # Errors
    ///
    /// [`Error::Collaborator`] tagged with the failing slot if any
    /// collaborator fails, or [`Error::Serialization`] if a glue resource
    /// cannot be serialized.
    #[instrument(skip_all, fields(namespace = %metadata.namespace(), cluster = %metadata.cluster_name()))]
    pub fn compose(&self, metadata: &Metadata) -> Result<ResourceGraph> {
        let plan = InclusionPlan::evaluate(metadata);
        debug!(?plan, "evaluated inclusion plan");

        let default_namespace =
            Fragment::from_resource(&resources::namespace(metadata, plan.mesh_injection))?;
        let cluster_metadata = Fragment::from_resource(&resources::cluster_metadata(metadata))?;

        let psp_role_binding = match metadata.privileged_role() {
            Some(role_ref) if plan.psp_role_binding => Some(Fragment::from_resource(
                &privileged_role_binding(metadata.namespace(), role_ref),
            )?),
            _ => None,
        };

        let graph = ResourceGraph {
            default_namespace,
            cluster_metadata,
            psp_role_binding,
            storage_cluster: self.generate(Slot::StorageCluster, metadata)?,
            auxiliary: self.generate(Slot::Auxiliary, metadata)?,
            gateway: self.generate(Slot::Gateway, metadata)?,
            backend: self.generate(Slot::Backend, metadata)?,
            prometheus: self.generate(Slot::Prometheus, metadata)?,
            grafana: self.generate(Slot::Grafana, metadata)?,
            alertmanager: if plan.alerting {
                self.generate(Slot::Alertmanager, metadata)?
            } else {
                None
            },
            istio: if plan.mesh_overlay {
                self.generate_mesh(metadata)?
            } else {
                None
            },
        };

        info!(slots = ?graph.present_slots(), "composed resource graph");
        Ok(graph)
    }

    fn generate(&self, slot: Slot, metadata: &Metadata) -> Result<Option<Fragment>> {
        let Some(collaborator) = self.collaborators.for_slot(slot) else {
            return Ok(None);
        };
        run(collaborator, slot.as_str(), metadata)
    }

    /// The mesh overlay, or `None` when every sub-collaborator produced nothing
    fn generate_mesh(&self, metadata: &Metadata) -> Result<Option<MeshOverlay>> {
        let mesh = &self.collaborators.mesh;
        let generate =
            |slot: MeshSlot| run(mesh.for_slot(slot), &slot.qualified_name(), metadata);

        let overlay = MeshOverlay {
            base: generate(MeshSlot::Base)?,
            crd: generate(MeshSlot::Crd)?,
            kiali: generate(MeshSlot::Kiali)?,
            tracing: generate(MeshSlot::Tracing)?,
        };
        Ok((!overlay.is_empty()).then_some(overlay))
    }
}

fn run(collaborator: &dyn Collaborator, slot: &str, metadata: &Metadata) -> Result<Option<Fragment>> {
    let fragment = collaborator
        .generate(metadata)
        .map_err(|source| Error::collaborator(slot, source))?;
    debug!(slot, present = fragment.is_some(), "collaborator finished");
    Ok(fragment)
}

/// Compose a graph in one call
pub fn compose(metadata: &Metadata, collaborators: Collaborators) -> Result<ResourceGraph> {
    Composer::new(collaborators).compose(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;

    use crate::collaborator::{from_fn, MeshCollaborators, MockCollaborator, SharedCollaborator};

    fn metadata_value(istio: bool, alert: bool, binding: bool) -> Value {
        json!({
            "namespace": "uss1",
            "clusterName": "c1",
            "enable_istio": istio,
            "alert": {"enable": alert},
            "PSP": {"roleBinding": binding, "roleRef": "psp:privileged"},
        })
    }

    fn metadata(istio: bool, alert: bool, binding: bool) -> Metadata {
        Metadata::from_value(metadata_value(istio, alert, binding)).unwrap()
    }

    /// Stub returning a fragment derived from the metadata, so outputs differ
    /// per slot and per namespace.
    fn echo(name: &'static str) -> SharedCollaborator {
        from_fn(move |m: &Metadata| {
            Ok(Some(Fragment::new(json!({
                "generator": name,
                "namespace": m.namespace(),
                "cluster": m.cluster_name(),
            }))))
        })
    }

    fn echo_collaborators() -> Collaborators {
        Collaborators {
            storage: echo("sset"),
            auxiliary: echo("auxiliary"),
            gateway: echo("gateway"),
            backend: echo("backend"),
            prometheus: echo("prometheus"),
            grafana: echo("grafana"),
            alertmanager: echo("alertmanager"),
            mesh: MeshCollaborators {
                base: echo("base"),
                crd: echo("crd"),
                kiali: echo("kiali"),
                tracing: echo("tracing"),
            },
        }
    }

    /// Collaborator counting its invocations
    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl Collaborator for Counting {
        fn generate(&self, _metadata: &Metadata) -> std::result::Result<Option<Fragment>, dss_common::BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Fragment::new(json!({"counted": true}))))
        }
    }

    fn counting(calls: &Arc<AtomicUsize>) -> SharedCollaborator {
        Arc::new(Counting {
            calls: Arc::clone(calls),
        })
    }

    #[test]
    fn example_metadata_produces_the_documented_graph() {
        let graph = Composer::new(echo_collaborators())
            .compose_value(&metadata_value(false, false, false))
            .unwrap();

        let ns = graph.default_namespace.as_value();
        assert_eq!(ns["kind"], "Namespace");
        assert_eq!(ns["metadata"]["name"], "uss1");
        assert!(ns["metadata"].get("labels").is_none());

        let cm = graph.cluster_metadata.as_value();
        assert_eq!(cm["kind"], "ConfigMap");
        assert_eq!(cm["data"], json!({"clusterName": "c1"}));

        assert!(graph.psp_role_binding.is_none());
        assert!(graph.alertmanager.is_none());
        assert!(graph.istio.is_none());

        for slot in [
            Slot::StorageCluster,
            Slot::Auxiliary,
            Slot::Gateway,
            Slot::Backend,
            Slot::Prometheus,
            Slot::Grafana,
        ] {
            let fragment = graph.get(slot).unwrap_or_else(|| panic!("{slot} missing"));
            assert_eq!(fragment.as_value()["namespace"], "uss1");
        }
    }

    #[test]
    fn mesh_disabled_never_invokes_mesh_collaborators() {
        let calls = Arc::new(AtomicUsize::new(0));
        let collaborators = Collaborators {
            mesh: MeshCollaborators {
                base: counting(&calls),
                crd: counting(&calls),
                kiali: counting(&calls),
                tracing: counting(&calls),
            },
            ..echo_collaborators()
        };

        let graph = compose(&metadata(false, true, true), collaborators).unwrap();

        assert!(graph.istio.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn mesh_disabled_with_mock_expectations() {
        let mut never = MockCollaborator::new();
        never.expect_generate().times(0);
        let never: SharedCollaborator = Arc::new(never);

        let collaborators = Collaborators {
            mesh: MeshCollaborators {
                base: never.clone(),
                crd: never.clone(),
                kiali: never.clone(),
                tracing: never,
            },
            ..echo_collaborators()
        };
        let graph = compose(&metadata(false, false, false), collaborators).unwrap();
        assert!(graph.istio.is_none());
    }

    #[test]
    fn mesh_enabled_holds_each_collaborators_isolated_output() {
        let collaborators = echo_collaborators();
        let metadata = metadata(true, false, false);
        let graph = compose(&metadata, collaborators.clone()).unwrap();

        let mesh = graph.istio.as_ref().expect("mesh overlay present");
        assert_eq!(mesh.fragments().count(), 4);
        for slot in MeshSlot::ALL {
            let isolated = collaborators.mesh.for_slot(slot).generate(&metadata).unwrap();
            assert_eq!(mesh.get(slot), isolated.as_ref(), "{slot}");
        }

        let labels = &graph.default_namespace.as_value()["metadata"]["labels"];
        assert_eq!(labels["istio-injection"], "enabled");
    }

    #[test]
    fn mesh_enabled_calls_each_sub_collaborator_once() {
        let mut once = MockCollaborator::new();
        once.expect_generate()
            .times(1)
            .returning(|m| Ok(Some(Fragment::new(json!({"ns": m.namespace()})))));
        let calls = Arc::new(AtomicUsize::new(0));

        let collaborators = Collaborators {
            mesh: MeshCollaborators {
                base: Arc::new(once),
                crd: counting(&calls),
                kiali: counting(&calls),
                tracing: counting(&calls),
            },
            ..echo_collaborators()
        };
        let graph = compose(&metadata(true, false, false), collaborators).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let mesh = graph.istio.unwrap();
        assert_eq!(mesh.base.unwrap().as_value()["ns"], "uss1");
    }

    #[test]
    fn mesh_with_no_output_leaves_istio_absent() {
        let graph = compose(&metadata(true, false, false), Collaborators::absent()).unwrap();

        assert!(graph.istio.is_none());
        assert!(!graph.contains(Slot::Istio));
        assert!(graph.to_value().unwrap().get("istio").is_none());
        // The namespace is still labelled for injection
        let labels = &graph.default_namespace.as_value()["metadata"]["labels"];
        assert_eq!(labels["istio-injection"], "enabled");
    }

    #[test]
    fn partial_mesh_output_keeps_the_overlay() {
        let collaborators = Collaborators {
            mesh: MeshCollaborators {
                crd: echo("crd"),
                ..MeshCollaborators::absent()
            },
            ..Collaborators::absent()
        };
        let graph = compose(&metadata(true, false, false), collaborators).unwrap();
        assert_eq!(graph.present_slots(), ["default_namespace", "cluster_metadata", "istio.crd"]);
        assert!(graph.contains(Slot::Istio));
    }

    #[test]
    fn role_binding_present_only_when_requested() {
        let graph = compose(&metadata(false, false, false), echo_collaborators()).unwrap();
        assert!(graph.psp_role_binding.is_none());

        let graph = compose(&metadata(false, false, true), echo_collaborators()).unwrap();
        let binding = graph.psp_role_binding.expect("binding present");
        let binding = binding.as_value();
        assert_eq!(binding["kind"], "RoleBinding");
        assert_eq!(binding["roleRef"]["name"], "psp:privileged");
        assert_eq!(binding["roleRef"]["kind"], "ClusterRole");
        assert_eq!(binding["subjects"][0]["kind"], "Group");
        assert_eq!(binding["subjects"][0]["name"], "system:serviceaccounts:uss1");
    }

    #[test]
    fn alerting_follows_its_flag() {
        let mut alerting = MockCollaborator::new();
        alerting.expect_generate().times(0);
        let collaborators = Collaborators {
            alertmanager: Arc::new(alerting),
            ..echo_collaborators()
        };
        let graph = compose(&metadata(false, false, false), collaborators).unwrap();
        assert!(graph.alertmanager.is_none());

        let collaborators = echo_collaborators();
        let metadata = metadata(false, true, false);
        let graph = compose(&metadata, collaborators.clone()).unwrap();
        let expected = collaborators.alertmanager.generate(&metadata).unwrap();
        assert_eq!(graph.alertmanager, expected);
        assert!(graph.alertmanager.is_some());
    }

    #[test]
    fn composing_twice_yields_equal_graphs() {
        let composer = Composer::new(echo_collaborators());
        let metadata = metadata(true, true, true);
        assert_eq!(
            composer.compose(&metadata).unwrap(),
            composer.compose(&metadata).unwrap()
        );
    }

    #[test]
    fn toggling_alerting_changes_only_alertmanager() {
        let composer = Composer::new(echo_collaborators());
        let off = composer.compose(&metadata(true, false, true)).unwrap();
        let on = composer.compose(&metadata(true, true, true)).unwrap();

        assert_ne!(off.alertmanager, on.alertmanager);
        let mut on_without_alerting = on.clone();
        on_without_alerting.alertmanager = None;
        assert_eq!(off, on_without_alerting);
    }

    #[test]
    fn collaborator_absence_leaves_slot_absent() {
        let collaborators = Collaborators {
            storage: echo("sset"),
            ..Collaborators::absent()
        };
        let graph = compose(&metadata(false, false, false), collaborators).unwrap();
        assert!(graph.storage_cluster.is_some());
        assert!(graph.gateway.is_none());
        assert_eq!(
            graph.present_slots(),
            ["default_namespace", "cluster_metadata", "sset"]
        );
    }

    #[test]
    fn collaborator_failure_is_tagged_with_its_slot() {
        let collaborators = Collaborators {
            backend: from_fn(|_: &Metadata| Err("grpc image missing".into())),
            ..echo_collaborators()
        };
        let err = compose(&metadata(false, false, false), collaborators).unwrap_err();
        assert_eq!(err.slot(), Some("backend"));
        assert!(err.to_string().contains("grpc image missing"));
    }

    #[test]
    fn mesh_failure_is_tagged_with_the_sub_slot() {
        let collaborators = Collaborators {
            mesh: MeshCollaborators {
                kiali: from_fn(|_: &Metadata| Err("no kiali version".into())),
                ..echo_collaborators().mesh
            },
            ..echo_collaborators()
        };
        let err = compose(&metadata(true, false, false), collaborators).unwrap_err();
        assert_eq!(err.slot(), Some("istio.kiali"));
    }

    #[test]
    fn invalid_metadata_fails_before_any_collaborator_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let collaborators = Collaborators {
            storage: counting(&calls),
            auxiliary: counting(&calls),
            gateway: counting(&calls),
            backend: counting(&calls),
            prometheus: counting(&calls),
            grafana: counting(&calls),
            alertmanager: counting(&calls),
            mesh: MeshCollaborators {
                base: counting(&calls),
                crd: counting(&calls),
                kiali: counting(&calls),
                tracing: counting(&calls),
            },
        };
        let composer = Composer::new(collaborators);

        let err = composer
            .compose_value(&json!({"namespace": "uss1", "enable_istio": true}))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn requested_binding_always_reaches_the_graph() {
        // Metadata can only come out of validation, so a requested binding
        // always has its role and is never silently dropped.
        let metadata = metadata(false, false, true);
        assert_eq!(metadata.privileged_role(), Some("psp:privileged"));

        let graph = compose(&metadata, Collaborators::absent()).unwrap();
        assert!(graph.psp_role_binding.is_some());
        assert_eq!(graph.default_namespace.as_value()["metadata"]["name"], "uss1");

        let err = Composer::new(Collaborators::absent())
            .compose_value(&json!({
                "namespace": "",
                "clusterName": "",
                "PSP": {"roleBinding": true},
            }))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn composer_defaults_apply_to_untyped_metadata() {
        let composer = Composer::new(echo_collaborators()).with_defaults(FeatureDefaults {
            alert_enable: true,
            ..FeatureDefaults::DISABLED
        });
        let graph = composer
            .compose_value(&json!({"namespace": "uss1", "clusterName": "c1"}))
            .unwrap();
        assert!(graph.alertmanager.is_some());
        assert!(graph.istio.is_none());
    }
}
