//! HTTP route handlers for the bot.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! POST /api/interactions       - Discord interactions webhook (signed)
//! ```

use axum::Router;

use crate::state::AppState;

pub mod interactions;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new().merge(interactions::router())
}
