//! Relay configuration, loadable from RON.
//!
//! ```ron
//! (
//!     bind: "0.0.0.0",
//!     port: 7878,
//!     history_limit: 0,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BIND_ADDRESS, DEFAULT_HISTORY_LIMIT, DEFAULT_RELAY_PORT};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub bind: String,
    pub port: u16,
    /// Most batches kept in memory for late joiners. Zero means no limit.
    /// Once the log would grow past it, new sites are refused.
    pub history_limit: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_RELAY_PORT,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl RelayConfig {
    /// `bind:port`, ready for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.listen_addr(), "127.0.0.1:7878");
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.ron");
        std::fs::write(&path, "(port: 9100, history_limit: 0)").unwrap();

        let config = RelayConfig::load(&path).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.history_limit, 0);
        assert_eq!(config.bind, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_rejects_bad_ron() {
        assert!(matches!(
            RelayConfig::from_ron_str("(port: -1)"),
            Err(RelayError::Config(_))
        ));
    }
}
