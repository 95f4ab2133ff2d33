//! Read-only settings.
//!
//! Looked up in the platform config folder (`settings.toml`), e.g.
//! `~/.config/filterdash/settings.toml` on Linux. Missing or broken files
//! fall back to defaults; command line flags override whatever was loaded.

use crate::error::{DashError, Result};
use crate::export::ExportFormat;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "filterdash";
const APP_NAME: &str = "filterdash";
const CONFIG_FILENAME: &str = "settings.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Where `/upload` and `/search` live.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_owned(),
            timeout_secs: 30,
        }
    }
}

impl ServerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub format: ExportFormat,
}

pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

pub fn parse_settings(content: &str) -> Result<Settings> {
    toml::from_str(content).map_err(|e| DashError::Settings(e.to_string()))
}

/// Loads `path`, or the default location when `path` is `None`.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match settings_path() {
            Some(p) => p,
            None => {
                log::warn!("Could not determine settings path, using defaults");
                return Settings::default();
            }
        },
    };

    match fs::read_to_string(&path) {
        Ok(content) => match parse_settings(&content) {
            Ok(settings) => {
                log::info!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Settings::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No settings file found at {:?}, using defaults", path);
            Settings::default()
        }
        Err(e) => {
            log::warn!("Failed to read settings file: {}, using defaults", e);
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = parse_settings(
            r#"
            [server]
            base_url = "http://data.local:8080"
            "#,
        )
        .unwrap();
        assert_eq!(settings.server.base_url, "http://data.local:8080");
        assert_eq!(settings.server.timeout_secs, 30);
        assert_eq!(settings.export.format, ExportFormat::Csv);
    }

    #[test]
    fn export_format_by_name() {
        let settings = parse_settings("[export]\nformat = \"tsv\"\n").unwrap();
        assert_eq!(settings.export.format, ExportFormat::Tsv);
    }

    #[test]
    fn bad_file_is_an_error() {
        assert!(matches!(
            parse_settings("[server]\ntimeout_secs = \"soon\""),
            Err(DashError::Settings(_))
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("filterdash-does-not-exist.toml");
        assert_eq!(load_settings(Some(&path)), Settings::default());
    }
}
