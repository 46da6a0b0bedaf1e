//! Validate command

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;

use dss_compose::{InclusionPlan, Metadata};

use super::load_metadata;
use crate::Result;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Deployment metadata file (YAML or JSON)
    #[arg(short, long)]
    pub metadata: PathBuf,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let metadata = load_metadata(&args.metadata)?;
    print!("{}", report(&metadata));
    Ok(())
}

/// Human-readable summary of what a render would produce
pub fn report(metadata: &Metadata) -> String {
    let plan = InclusionPlan::evaluate(metadata);
    let mut out = String::new();

    let _ = writeln!(out, "namespace: {}", metadata.namespace());
    let _ = writeln!(out, "cluster:   {}", metadata.cluster_name());
    let _ = writeln!(
        out,
        "istio injection: {}",
        if plan.mesh_injection { "enabled" } else { "disabled" }
    );

    let _ = writeln!(out, "\nRequested slots:");
    for slot in plan.requested_slots() {
        let _ = writeln!(out, "  - {slot}");
    }

    let skipped = plan.skipped_slots();
    if !skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped slots:");
        for slot in skipped {
            let _ = writeln!(out, "  - {slot}");
        }
    }

    let _ = writeln!(out, "\nMetadata is valid");
    out
}
