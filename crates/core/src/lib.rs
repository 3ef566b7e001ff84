//! Role Button Core - Shared types library.
//!
//! This crate provides the types shared by the role button bot and its tests:
//! - `bot` - Discord interactions service (wizard, commit engine, press handler)
//! - `integration-tests` - In-memory host and end-to-end scenarios
//!
//! # Architecture
//!
//! The core crate contains only types and parsers - no I/O, no HTTP clients,
//! no async runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Snowflake IDs, button actions/styles/emoji, control identifiers
//!   and layout bounds

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
