//! Locates and parses the optional TOML configuration file.

use super::file::ConfigFile;
use crate::core::error::{AppError, Result};
use std::path::{Path, PathBuf};

const DEFAULT_FILE_NAME: &str = "email-warden.toml";

/// Loads a [`ConfigFile`] from the explicit path if given, otherwise from
/// the first default search location that exists. Returns `Ok(None)` when no
/// file is found (defaults apply); an explicit path that is missing or
/// malformed is an error.
pub(crate) fn load_config_file(explicit: Option<&str>) -> Result<Option<(ConfigFile, String)>> {
    if let Some(path) = explicit {
        let file = parse_file(Path::new(path))?;
        return Ok(Some((file, path.to_string())));
    }

    for candidate in default_search_paths() {
        if candidate.is_file() {
            tracing::debug!("Found configuration file at {:?}", candidate);
            let file = parse_file(&candidate)?;
            return Ok(Some((file, candidate.display().to_string())));
        }
    }

    tracing::debug!("No configuration file found; using built-in defaults.");
    Ok(None)
}

fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(DEFAULT_FILE_NAME)];
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(
            PathBuf::from(home)
                .join(".config")
                .join("email-warden")
                .join("config.toml"),
        );
    }
    paths
}

fn parse_file(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    toml::from_str(&contents)
        .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
}
