//! Configuration module for deep-research-rs
//!
//! Handles loading settings from YAML files, `.env` and environment variables.
//! Settings are resolved once at startup; the research core never reads the
//! environment while a run is in flight.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load settings from an explicit path, the usual locations, or defaults
///
/// `.env` is read first so its values participate in the environment merge.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    if let Some(path) = explicit {
        info!("Loading settings from: {}", path.display());
        let mut settings = Settings::from_file(path)?;
        settings.merge_env();
        return Ok(settings);
    }

    // Check environment variable first
    if let Ok(path) = std::env::var("RESEARCH_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    if let Some(path) = search_paths().into_iter().find(|p| p.exists()) {
        info!("Loading settings from: {}", path.display());
        let mut settings = Settings::from_file(&path)?;
        settings.merge_env();
        return Ok(settings);
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

/// Default locations checked for settings.yml, in order
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/deep-research/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("deep-research-rs/settings.yml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "research:\n  search_count: 2\nserver:\n  port: 8123").unwrap();

        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.research.search_count, 2);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = load(Some(Path::new("/definitely/not/here/settings.yml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_search_paths_order() {
        let paths = search_paths();
        assert_eq!(paths[0], PathBuf::from("settings.yml"));
        assert_eq!(paths[1], PathBuf::from("config/settings.yml"));
    }
}
