// SPDX-License-Identifier: GPL-3.0-only

//! Settings loaded once at install time
//!
//! The settings file is a single JSON document shipped next to the host
//! application. Every field is optional; a missing or unreadable file
//! yields the defaults, never a failure.

use crate::constants::selfie;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outbound proxy tuple surfaced to the socket substitution hook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Proxy host/port/credential tuple, if outbound traffic is redirected
    #[serde(default)]
    pub proxy: Option<ProxySettings>,
    /// Device identifier override reported to the host app
    #[serde(default)]
    pub device_id: Option<String>,
    /// Wifi MAC override reported to the host app
    #[serde(default)]
    pub wifi_mac: Option<String>,
    /// Degrees added to the display rotation when a front-facing device opens
    #[serde(default = "default_selfie_rotation_offset")]
    pub selfie_rotation_offset: u32,
    /// Override for the per-channel image directory (mainly for tests)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_selfie_rotation_offset() -> u32 {
    selfie::DEFAULT_ROTATION_OFFSET
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proxy: None,
            device_id: None,
            wifi_mac: None,
            selfie_rotation_offset: selfie::DEFAULT_ROTATION_OFFSET,
            data_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&text)?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults if missing or malformed
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(settings) => {
                info!(path = %path.display(), "Loaded settings");
                settings
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Using default settings");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(
            settings.selfie_rotation_offset,
            selfie::DEFAULT_ROTATION_OFFSET
        );
    }

    #[test]
    fn test_proxy_tuple_parses() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "proxy": { "host": "10.0.0.2", "port": 1080, "username": "u" },
                "device_id": "f3a81c2d9b7e5064",
                "selfie_rotation_offset": 0
            }"#,
        )
        .unwrap();
        let proxy = settings.proxy.unwrap();
        assert_eq!(proxy.host, "10.0.0.2");
        assert_eq!(proxy.port, 1080);
        assert_eq!(proxy.username.as_deref(), Some("u"));
        assert_eq!(proxy.password, None);
        assert_eq!(settings.device_id.as_deref(), Some("f3a81c2d9b7e5064"));
        assert_eq!(settings.selfie_rotation_offset, 0);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = Settings::load_or_default(Some(Path::new("/nonexistent/fauxcam.json")));
        assert_eq!(settings, Settings::default());
    }
}
