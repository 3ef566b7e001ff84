//! Unified error handling for the bot.
//!
//! Every interaction handler catches its own errors: once Discord has been
//! answered there is nobody left to return an error to. Handlers render
//! [`BotError::user_message`] to the acting user and, when
//! [`BotError::escalates`] is true, copy the failure to the audit channel.
//! `IntoResponse` only matters at the HTTP boundary, before an interaction
//! has been acknowledged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rolebutton_core::UserId;
use thiserror::Error;

use crate::discord::DiscordError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum BotError {
    /// Bad operator or user input. Re-prompt.
    #[error("{0}")]
    Validation(String),

    /// A referenced role, message or session no longer exists.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The bot or the caller is not allowed to do this.
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Discord rejected or failed a request.
    #[error("Discord error: {0}")]
    HostTransport(String),

    /// Anything else.
    #[error("Internal error: {0}")]
    Generic(String),
}

impl From<DiscordError> for BotError {
    fn from(err: DiscordError) -> Self {
        match err {
            DiscordError::InvalidSignature(reason) => Self::Permission(reason),
            DiscordError::InvalidPayload(reason) => Self::Validation(reason),
            other => Self::HostTransport(other.to_string()),
        }
    }
}

impl BotError {
    /// Text shown to the user who triggered the failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::NotFound(_) | Self::Permission(_) => self.to_string(),
            Self::HostTransport(message) => {
                format!("Discord rejected that request: {message}")
            }
            Self::Generic(_) => {
                "Sorry, something went wrong. The moderators have been notified.".to_string()
            }
        }
    }

    /// Whether the failure should be duplicated to the audit channel.
    #[must_use]
    pub const fn escalates(&self) -> bool {
        matches!(
            self,
            Self::Permission(_) | Self::HostTransport(_) | Self::Generic(_)
        )
    }

    /// Short category name used in logs and audit notices.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Permission(_) => "permission",
            Self::HostTransport(_) => "host_transport",
            Self::Generic(_) => "generic",
        }
    }
}

impl IntoResponse for BotError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Generic(_) | Self::HostTransport(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Interaction request error"
            );
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Permission(_) => StatusCode::UNAUTHORIZED,
            Self::HostTransport(_) => StatusCode::BAD_GATEWAY,
            Self::Generic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Generic(_) => "Internal server error".to_string(),
            Self::HostTransport(_) => "External service error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Capture an unexpected error to Sentry with the Discord user who hit it.
pub fn capture_for_user(err: &BotError, user_id: UserId) {
    let event_id = sentry::with_scope(
        |scope| {
            scope.set_user(Some(sentry::User {
                id: Some(user_id.to_string()),
                ..Default::default()
            }));
        },
        || sentry::capture_error(err),
    );
    tracing::error!(
        error = %err,
        user_id = %user_id,
        sentry_event_id = %event_id,
        "Unexpected interaction failure"
    );
}
