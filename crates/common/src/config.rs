//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote overlay/stream API.
    #[serde(default)]
    pub api: ApiConfig,

    /// Default video surface parameters.
    #[serde(default)]
    pub surface: SurfaceDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the overlay/stream API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix.
    pub base_url: String,

    /// Optional request timeout. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Default video surface parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceDefaults {
    /// Intrinsic surface width in pixels.
    pub width: u32,

    /// Intrinsic surface height in pixels.
    pub height: u32,

    /// Initial playback volume in `[0.0, 1.0]`.
    pub volume: f32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "streamlay=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            surface: SurfaceDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for SurfaceDefaults {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            volume: 1.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("streamlay").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_api() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert!(config.api.timeout_secs.is_none());
        assert_eq!((config.surface.width, config.surface.height), (1280, 720));
    }

    #[test]
    fn test_partial_config_fills_missing_sections() {
        let config: AppConfig =
            serde_json::from_str(r#"{"api": {"base_url": "http://media-box:8080/api"}}"#).unwrap();
        assert_eq!(config.api.base_url, "http://media-box:8080/api");
        assert_eq!(config.logging.level, "info");
        assert!((config.surface.volume - 1.0).abs() < f32::EPSILON);
    }
}
