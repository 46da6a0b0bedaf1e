//! Render command

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use tracing::info;

use dss_compose::{Composer, ResourceGraph, TemplateSet};

use super::{load_metadata, write_output};
use crate::config::resolve_templates_dir;
use crate::Result;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Deployment metadata file (YAML or JSON)
    #[arg(short, long)]
    pub metadata: PathBuf,

    /// Template directory (defaults to $DSS_DEPLOY_TEMPLATES, then ./templates)
    #[arg(short, long)]
    pub templates: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Stream)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// How the composed graph is written
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `---`-separated manifests in apply order
    #[default]
    Stream,
    /// The graph keyed by slot name, as YAML
    GraphYaml,
    /// The graph keyed by slot name, as pretty JSON
    GraphJson,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let rendered = render(&args)?;
    write_output(args.output.as_deref(), &rendered)
}

/// Compose the graph described by `args` and format it
pub fn render(args: &RenderArgs) -> Result<String> {
    let metadata = load_metadata(&args.metadata)?;
    let templates = resolve_templates_dir(args.templates.as_deref());
    info!(templates = %templates.display(), "loading templates");

    let collaborators = TemplateSet::new(templates).load()?;
    let graph = Composer::new(collaborators).compose(&metadata)?;
    format_graph(&graph, args.format)
}

pub fn format_graph(graph: &ResourceGraph, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Stream => graph.to_yaml_stream()?,
        OutputFormat::GraphYaml => serde_yaml::to_string(graph)?,
        OutputFormat::GraphJson => {
            let mut json = serde_json::to_string_pretty(graph)?;
            json.push('\n');
            json
        }
    })
}
