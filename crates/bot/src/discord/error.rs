//! Discord-related errors.

use thiserror::Error;

/// Errors that can occur when interacting with Discord.
#[derive(Debug, Error)]
pub enum DiscordError {
    /// HTTP request failed.
    #[error("Discord request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("Discord response error: {0}")]
    Response(String),

    /// Discord API returned an error status.
    #[error("Discord API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Invalid request signature.
    #[error("Invalid Discord signature: {0}")]
    InvalidSignature(String),

    /// Failed to parse interaction payload.
    #[error("Invalid interaction payload: {0}")]
    InvalidPayload(String),

    /// Configuration error.
    #[error("Discord configuration error: {0}")]
    Config(String),
}
