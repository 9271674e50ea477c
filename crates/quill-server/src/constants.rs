//! Relay configuration constants.
//!
//! Centralizes hardcoded values for easier configuration and documentation.

/// Default relay port.
pub const DEFAULT_RELAY_PORT: u16 = 7878;

/// Default bind address (localhost only for security).
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Most batches the catch-up log may hold. Zero means no limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 0;

/// Longest line accepted from a site.
pub const MAX_LINE_LENGTH: usize = 8 * 1024 * 1024;
