//! Configuration for the inspector core and CLI.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dispatcher::DEFAULT_OUTPUT_MODES;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "A2A_INSPECTOR_CONFIG";

/// Inspector configuration, typically stored at `~/.a2a-inspector/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Timeout for fetching an agent card, in seconds.
    #[serde(default = "default_card_timeout")]
    pub card_timeout_secs: u64,

    /// Timeout for JSON-RPC calls (including whole streams), in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// MIME types advertised in `acceptedOutputModes`.
    #[serde(default = "default_output_modes")]
    pub accepted_output_modes: Vec<String>,

    /// Custom headers sent with every card fetch and RPC call.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            card_timeout_secs: default_card_timeout(),
            request_timeout_secs: default_request_timeout(),
            accepted_output_modes: default_output_modes(),
            headers: BTreeMap::new(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl InspectorConfig {
    /// `~/.a2a-inspector/config.toml`, if a home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".a2a-inspector").join("config.toml"))
    }

    /// Load from `A2A_INSPECTOR_CONFIG` or the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);

        match path {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit file.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Add or replace custom headers.
    pub fn merge_headers<I>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.headers.extend(headers);
    }

    /// Custom headers as borrowed pairs.
    pub fn header_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn card_timeout(&self) -> Duration {
        Duration::from_secs(self.card_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_card_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    600
}

fn default_output_modes() -> Vec<String> {
    DEFAULT_OUTPUT_MODES.iter().map(|m| m.to_string()).collect()
}

/// Telemetry/observability configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Whether to export spans over OTLP.
    #[serde(default)]
    pub enabled: bool,

    /// OTLP exporter endpoint.
    #[serde(default = "default_otlp_endpoint")]
    pub otlp_endpoint: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: default_otlp_endpoint(),
        }
    }
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: InspectorConfig = toml::from_str("").unwrap();
        assert_eq!(config, InspectorConfig::default());
        assert_eq!(config.card_timeout(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(600));
        assert_eq!(config.accepted_output_modes, vec!["text/plain", "video/mp4"]);
        assert!(!config.telemetry.enabled);
    }

    #[test]
    fn test_partial_file() {
        let config: InspectorConfig = toml::from_str(
            r#"
            request_timeout_secs = 5

            [headers]
            Authorization = "Bearer abc"

            [telemetry]
            enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.card_timeout_secs, 30);
        assert_eq!(
            config.header_pairs().collect::<Vec<_>>(),
            vec![("Authorization", "Bearer abc")]
        );
        assert!(config.telemetry.enabled);
        assert_eq!(config.telemetry.otlp_endpoint, "http://localhost:4317");
    }

    #[test]
    fn test_merge_headers_overrides() {
        let mut config = InspectorConfig::default();
        config.merge_headers([("X-Trace".to_string(), "1".to_string())]);
        config.merge_headers([("X-Trace".to_string(), "2".to_string())]);
        assert_eq!(config.headers.get("X-Trace").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "a2a-inspector-config-{}.toml",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, "card_timeout_secs = 7\n").unwrap();

        let config = InspectorConfig::load_from(&path).unwrap();
        assert_eq!(config.card_timeout_secs, 7);

        std::fs::remove_file(&path).unwrap();
        assert!(InspectorConfig::load_from(&path).is_err());
    }
}
