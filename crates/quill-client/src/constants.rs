//! Client configuration constants.
//!
//! Centralizes hardcoded values for easier configuration and documentation.

use std::time::Duration;

/// Quiet period after the last surface change before a sync pass runs.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);

/// Default relay host for local development.
pub const DEFAULT_RELAY_HOST: &str = "127.0.0.1";

/// Default relay port.
pub const DEFAULT_RELAY_PORT: u16 = 7878;

/// Text shown in the surface while waiting for a site identity.
pub const DEFAULT_PLACEHOLDER: &str = "Connecting…";

/// Longest line accepted from the relay. A full-document batch from a
/// late-joiner replay is the largest thing that travels, so this is generous.
pub const MAX_LINE_LENGTH: usize = 8 * 1024 * 1024;
