//! CLI commands

use std::path::Path;

use tracing::debug;

use dss_compose::Metadata;

use crate::{Error, Result};

pub mod render;
pub mod validate;

/// Read and validate a metadata file (YAML or JSON)
pub fn load_metadata(path: &Path) -> Result<Metadata> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let metadata = Metadata::from_yaml_str(&contents)?;
    debug!(path = %path.display(), namespace = %metadata.namespace(), "loaded metadata");
    Ok(metadata)
}

/// Write `contents` to `output`, or stdout when no path is given
pub fn write_output(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, contents).map_err(|e| Error::io(path, e)),
        None => {
            print!("{contents}");
            Ok(())
        }
    }
}
