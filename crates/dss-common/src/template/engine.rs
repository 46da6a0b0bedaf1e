//! Template engine built on minijinja
//!
//! Uses a custom syntax configuration:
//! - Variable delimiters: `${...}`
//! - Block delimiters: `{%...%}`
//! - Comment delimiters: `{#...#}`
//! - Escape: `$${...}` produces literal `${...}`

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use super::filters;
use crate::{Error, Result};

/// Placeholder for escaped `$${` during preprocessing
const ESCAPED_PLACEHOLDER: &str = "\x00__DSS_ESCAPED_DOLLAR_BRACE__\x00";

/// Template engine for manifest templates
///
/// Supports:
/// - `${...}` variable syntax
/// - `$${...}` escape syntax (produces literal `${...}`)
/// - `{%...%}` block syntax
/// - Strict undefined variable handling
/// - Custom filters (default, required, base64_encode, quote)
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine").finish_non_exhaustive()
    }
}

impl TemplateEngine {
    /// Create a new template engine
    ///
    /// # Panics
    ///
    /// Panics if minijinja rejects the hardcoded delimiters, which would mean
    /// an incompatible minijinja release.
    pub fn new() -> Self {
        let syntax = SyntaxConfig::builder()
            .variable_delimiters("${", "}")
            .block_delimiters("{%", "%}")
            .comment_delimiters("{#", "#}")
            .build()
            .expect("template syntax configuration is hardcoded and valid");

        let mut env = Environment::new();
        env.set_syntax(syntax);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        // Manifests are YAML, never HTML
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        env.set_keep_trailing_newline(true);

        env.add_filter("default", filters::default_filter);
        env.add_filter("required", filters::required);
        env.add_filter("base64_encode", filters::base64_encode);
        env.add_filter("quote", filters::quote);

        Self { env }
    }

    /// Render a template string with the given context
    ///
    /// `name` is only used to label errors (usually the template's path).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the syntax is invalid, a referenced
    /// variable is undefined, or a filter fails.
    pub fn render<C: Serialize>(&self, name: &str, template: &str, ctx: &C) -> Result<String> {
        let preprocessed = template.replace("$${", ESCAPED_PLACEHOLDER);

        let rendered = self
            .env
            .render_str(&preprocessed, ctx)
            .map_err(|e| Error::template(name, format!("{e:#}")))?;

        Ok(rendered.replace(ESCAPED_PLACEHOLDER, "${"))
    }
}
