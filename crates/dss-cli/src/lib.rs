//! dss-deploy CLI library

pub mod commands;
pub mod config;
pub mod error;

pub use error::{Error, Result};

use clap::{Parser, Subcommand};

use dss_common::telemetry::LogFormat;
use dss_common::LOG_FORMAT_ENV;

/// dss-deploy - compose Kubernetes manifests for a DSS instance
#[derive(Parser, Debug)]
#[command(name = "dss-deploy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log output format (text or json)
    #[arg(long, global = true, env = LOG_FORMAT_ENV, default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compose the resource graph and write it out
    Render(commands::render::RenderArgs),
    /// Validate metadata and show which slots would be generated
    Validate(commands::validate::ValidateArgs),
}

impl Cli {
    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Render(args) => commands::render::run(args),
            Commands::Validate(args) => commands::validate::run(args),
        }
    }
}
