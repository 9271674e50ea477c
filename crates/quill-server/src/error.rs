//! Error types for the relay.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error("framing error: {0}")]
    Codec(#[from] tokio_util::codec::LinesCodecError),

    #[error("site identities exhausted")]
    SiteIdsExhausted,

    #[error("catch-up log exceeded {limit} batches; refusing new sites")]
    HistoryFull { limit: usize },
}

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
