//! Discord adapter.
//!
//! This module provides:
//! - [`DiscordClient`] for the REST endpoints, implementing the guild host traits
//! - [`InteractionResponder`] for answering a single interaction
//! - Wire types for interactions, responses and REST resources
//! - Ed25519 request signature verification
//!
//! # Flow
//!
//! 1. Discord POSTs an interaction; the route verifies its signature
//! 2. The interaction is dispatched to the wizard or the press handler with a
//!    fresh responder
//! 3. The first response is returned as the HTTP response, later ones go
//!    through the interaction webhook

mod client;
mod error;
mod responder;
mod signature;
pub mod types;

pub use client::{DiscordClient, MANAGE_BUTTONS_COMMAND};
pub use error::DiscordError;
pub use responder::InteractionResponder;
pub use signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER, verify_signature};
pub use types::{Interaction, InteractionResponse, InteractionType};
