//! Manifest templating
//!
//! Templates use `${...}` for values so they coexist with the `{{...}}`
//! placeholders found in Grafana dashboards and Prometheus alert rules:
//! - Variables: `${ namespace }`, `${ metadata.alert.receiver | default("ops") }`
//! - Blocks: `{% if enable_istio %}...{% endif %}`
//! - Comments: `{# ... #}`
//! - Escape: `$${` renders as a literal `${`

mod engine;
mod filters;

pub use engine::TemplateEngine;
