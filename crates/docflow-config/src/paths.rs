//! Application paths management.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "docflow.toml";

/// Platform-specific locations used when no local config file exists.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl AppPaths {
    /// Create paths using platform-specific directories.
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("com", "docflow", "docflow")?;
        let config_dir = proj_dirs.config_dir().to_path_buf();

        Some(Self {
            config_file: config_dir.join("config.toml"),
            config_dir,
        })
    }

    /// Resolve which config file to read.
    ///
    /// An explicit path wins, then `./docflow.toml`, then the platform
    /// config file. `None` means no file exists and defaults apply.
    pub fn resolve_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }

        Self::new()
            .map(|paths| paths.config_file)
            .filter(|path| path.exists())
    }
}
