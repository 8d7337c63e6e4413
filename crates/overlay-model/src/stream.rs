//! Stream settings and remote stream payloads.

use serde::{Deserialize, Serialize};

/// The saved stream configuration. One record per deployment, overwritten on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSettings {
    #[serde(default)]
    pub rtsp_url: String,
}

impl StreamSettings {
    pub fn new(rtsp_url: impl Into<String>) -> Self {
        Self {
            rtsp_url: rtsp_url.into(),
        }
    }
}

/// Body of `GET /stream/settings`.
///
/// Some deployments wrap the record as `{success, data}`, others return it
/// bare. Both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SettingsResponse {
    Wrapped {
        success: bool,
        #[serde(default)]
        data: Option<StreamSettings>,
    },
    Bare(StreamSettings),
}

impl SettingsResponse {
    /// The settings carried by the response; an unsuccessful or empty
    /// envelope yields the empty default.
    pub fn into_settings(self) -> StreamSettings {
        match self {
            SettingsResponse::Wrapped {
                success: true,
                data: Some(settings),
            } => settings,
            SettingsResponse::Wrapped { .. } => StreamSettings::default(),
            SettingsResponse::Bare(settings) => settings,
        }
    }
}

/// Body of `GET /stream/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStatus {
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub current_url: Option<String>,
    #[serde(default)]
    pub hls_url: Option<String>,
}

/// Body of `POST /stream/start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStarted {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub hls_url: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}
