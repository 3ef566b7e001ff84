//! Role Button Bot library.
//!
//! This crate provides the bot as a library, allowing the wizard, the commit
//! engine and the press handler to be tested against an in-memory host.
//!
//! # Modules
//!
//! - [`wizard`] - Six-step button creation wizard and its sessions
//! - [`commit`] - Merging a draft into a message's controls
//! - [`press`] - Applying presses on persistent role buttons
//! - [`host`] - Traits the above talk to Discord through
//! - [`discord`] - REST client, interaction responder, signature checks
//! - [`routes`] - Interactions webhook

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod audit;
pub mod commit;
pub mod config;
pub mod descriptor;
pub mod discord;
pub mod error;
pub mod host;
pub mod press;
pub mod routes;
pub mod state;
pub mod ui;
pub mod wizard;
