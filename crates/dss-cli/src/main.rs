//! dss-deploy
//!
//! Composes the Kubernetes manifests of a DSS deployment from a metadata file.

use clap::Parser;

use dss_cli::{Cli, Result};
use dss_common::telemetry::{init_logging, LogConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LogConfig {
        format: cli.log_format,
        ..Default::default()
    })?;

    cli.run()
}
