//! Error types for the wire format.

use thiserror::Error;

/// Errors raised while encoding or decoding wire payloads.
#[derive(Error, Debug)]
pub enum WireError {
    /// One serialized operation in a batch could not be decoded.
    #[error("malformed operation at index {index}: {source}")]
    MalformedOperation {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// An operation could not be turned into its wire shape.
    #[error("failed to encode operation: {0}")]
    Encode(#[source] serde_json::Error),

    /// A named-event envelope could not be parsed or written.
    #[error("malformed envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}
