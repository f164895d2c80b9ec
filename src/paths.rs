//! Path resolution for the manifest and state files
//!
//! # Environment Variables
//!
//! - `MOCKAPI_MANIFEST` - Override the manifest path
//! - `MOCKAPI_STATE_FILE` - Override the state file path
//!
//! Both are read by clap; this module only expands `~` and `$VAR` in
//! whatever value ends up selected.

use std::path::PathBuf;

/// Environment variable for the manifest path
pub const ENV_MANIFEST: &str = "MOCKAPI_MANIFEST";

/// Environment variable for the state file path
pub const ENV_STATE_FILE: &str = "MOCKAPI_STATE_FILE";

/// Manifest read when no path is given
pub const DEFAULT_MANIFEST: &str = "mockapi.toml";

/// State file written when no path is given
pub const DEFAULT_STATE_FILE: &str = "mockapi.state.toml";

/// Expand ~ and environment variables in a path
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            log::debug!("Could not expand {path}: {e}");
            PathBuf::from(shellexpand::tilde(path).as_ref())
        }
    }
}
