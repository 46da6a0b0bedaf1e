//! Template directory resolution
//!
//! The resolution chain (highest priority first):
//! 1. Explicit `--templates` flag
//! 2. `DSS_DEPLOY_TEMPLATES` environment variable
//! 3. `./templates`

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use dss_common::TEMPLATES_DIR_ENV;

/// Fallback template directory, relative to the working directory
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Resolve the template directory using the process environment
pub fn resolve_templates_dir(explicit: Option<&Path>) -> PathBuf {
    resolve_with_env(explicit, std::env::var_os(TEMPLATES_DIR_ENV))
}

/// Resolve the template directory from an explicit value and an env value.
///
/// An empty env value counts as unset.
pub fn resolve_with_env(explicit: Option<&Path>, env: Option<OsString>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_TEMPLATES_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flag_wins() {
        let resolved = resolve_with_env(Some(Path::new("/flag")), Some("/env".into()));
        assert_eq!(resolved, PathBuf::from("/flag"));
    }

    #[test]
    fn env_is_used_without_flag() {
        assert_eq!(resolve_with_env(None, Some("/env".into())), PathBuf::from("/env"));
    }

    #[test]
    fn falls_back_to_local_templates() {
        assert_eq!(resolve_with_env(None, None), PathBuf::from("templates"));
        assert_eq!(resolve_with_env(None, Some(OsString::new())), PathBuf::from("templates"));
    }
}
