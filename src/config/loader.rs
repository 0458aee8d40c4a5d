// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::ConfigFile;
use crate::errors::{DagrunError, Result};

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; DAG validation (unknown
/// dependencies, cycles) happens when the graph is built.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: ConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Resolve a `--config` argument to a concrete path.
///
/// - An absolute path is used directly.
/// - Anything else is searched for by walking up the directory tree from the
///   current working directory, so `dagrun run` works from any subdirectory
///   of a project.
pub fn discover_config(name_or_path: &str) -> Result<PathBuf> {
    let candidate = Path::new(name_or_path);

    if candidate.is_absolute() {
        if candidate.exists() {
            return Ok(candidate.to_path_buf());
        }
        return Err(DagrunError::ConfigError(format!(
            "configuration file '{name_or_path}' not found"
        )));
    }

    let start = std::env::current_dir()?;
    discover_config_from(&start, name_or_path)
}

/// Walk up from `start`, looking for `name` in each directory.
pub fn discover_config_from(start: &Path, name: &str) -> Result<PathBuf> {
    let mut dir = start.to_path_buf();

    loop {
        let candidate = dir.join(name);
        if candidate.exists() {
            return Ok(candidate);
        }
        if !dir.pop() {
            break;
        }
    }

    Err(DagrunError::ConfigError(format!(
        "configuration file '{name}' not found in '{}' or any parent directory",
        start.display()
    )))
}

/// Convenience entry point: discover, then load.
pub fn discover_and_load(name_or_path: &str) -> Result<(PathBuf, ConfigFile)> {
    let path = discover_config(name_or_path)?;
    let config = load_from_path(&path)?;
    Ok((path, config))
}
