//! Client configuration, loadable from RON.
//!
//! ```ron
//! (
//!     relay_addr: "10.0.0.5:7878",
//!     debounce_ms: 400,
//! )
//! ```
//!
//! Missing fields take their defaults from [`crate::constants`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEBOUNCE_WINDOW, DEFAULT_PLACEHOLDER, DEFAULT_RELAY_HOST, DEFAULT_RELAY_PORT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host:port` of the relay.
    pub relay_addr: String,
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Shown in the surface until the relay assigns a site identity.
    pub placeholder: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_addr: format!("{DEFAULT_RELAY_HOST}:{DEFAULT_RELAY_PORT}"),
            debounce_ms: DEBOUNCE_WINDOW.as_millis() as u64,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }
}

/// Error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.relay_addr, "127.0.0.1:7878");
        assert_eq!(config.debounce_window(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = ClientConfig::from_ron_str("(debounce_ms: 400)").unwrap();
        assert_eq!(config.debounce_ms, 400);
        assert_eq!(config.relay_addr, ClientConfig::default().relay_addr);
        assert_eq!(config.placeholder, DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.ron");
        std::fs::write(&path, r#"(relay_addr: "relay.local:9000", placeholder: "")"#).unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.relay_addr, "relay.local:9000");
        assert_eq!(config.placeholder, "");
    }

    #[test]
    fn test_bad_input() {
        assert!(matches!(
            ClientConfig::from_ron_str("(debounce_ms: \"soon\")"),
            Err(ConfigError::Ron(_))
        ));
        assert!(matches!(
            ClientConfig::load("/nonexistent/quill/client.ron"),
            Err(ConfigError::Io(_))
        ));
    }
}
