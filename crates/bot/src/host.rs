//! Collaborator seams between the bot's logic and Discord.
//!
//! The wizard, commit engine and press handler only talk to Discord through
//! these traits. [`crate::discord::DiscordClient`] implements the guild-level
//! ones and [`crate::discord::InteractionResponder`] implements
//! [`InteractionSurface`]; tests substitute in-memory fakes.

use std::future::Future;

use rolebutton_core::{ChannelId, GuildId, MessageId, RoleId, UserId};

use crate::error::BotError;
use crate::ui::{ActionRow, Form, Screen};

/// A guild role as resolved at one point in time. Never cache across
/// interactions; hierarchy and management can change at any moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    /// Hierarchy position; higher outranks lower.
    pub position: i64,
    /// Owned by an integration or bot and not assignable by anyone else.
    pub managed: bool,
}

impl Role {
    /// Mention markup for screens and audit notices.
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}

/// Location of a message within the guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

impl MessageRef {
    /// Browser link that jumps to the message.
    #[must_use]
    pub fn jump_url(&self) -> String {
        format!(
            "https://discord.com/channels/{}/{}/{}",
            self.guild_id, self.channel_id, self.message_id
        )
    }
}

/// The user behind an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
}

impl Actor {
    /// Mention markup for screens and audit notices.
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// Responses to one incoming interaction.
///
/// The first call answers the interaction; later calls edit or follow up on
/// that answer.
pub trait InteractionSurface: Send + Sync {
    /// Acknowledge a component press without changing its message yet.
    fn defer_update(&self) -> impl Future<Output = Result<(), BotError>> + Send;

    /// Acknowledge with a private "thinking" placeholder, later replaced by
    /// [`Self::edit_reply`].
    fn defer_ephemeral(&self) -> impl Future<Output = Result<(), BotError>> + Send;

    /// Send a new private message carrying a screen and its controls.
    fn send_step(
        &self,
        screen: Screen,
        rows: Vec<ActionRow>,
    ) -> impl Future<Output = Result<(), BotError>> + Send;

    /// Replace the content and controls of the message the interaction came
    /// from, in a single edit.
    fn show_step(
        &self,
        screen: Screen,
        rows: Vec<ActionRow>,
    ) -> impl Future<Output = Result<(), BotError>> + Send;

    /// Pop up a form. Only valid as the first response.
    fn open_form(&self, form: Form) -> impl Future<Output = Result<(), BotError>> + Send;

    /// Send a separate private message without controls.
    fn reply_ephemeral(&self, screen: Screen) -> impl Future<Output = Result<(), BotError>> + Send;

    /// Replace the deferred placeholder (or the first reply).
    fn edit_reply(&self, screen: Screen) -> impl Future<Output = Result<(), BotError>> + Send;
}

/// Reading and rewriting a message's controls.
pub trait MessageHost: Send + Sync {
    /// Current action rows on a message.
    fn fetch_message_controls(
        &self,
        message: &MessageRef,
    ) -> impl Future<Output = Result<Vec<ActionRow>, BotError>> + Send;

    /// Replace the message's full control set in one edit.
    fn edit_message_controls(
        &self,
        message: &MessageRef,
        rows: Vec<ActionRow>,
    ) -> impl Future<Output = Result<(), BotError>> + Send;
}

/// Role lookups and membership changes.
pub trait PermissionHost: Send + Sync {
    /// Look a role up by ID against the live role list.
    fn resolve_role(
        &self,
        role_id: RoleId,
    ) -> impl Future<Output = Result<Option<Role>, BotError>> + Send;

    /// Whether the bot's own highest role sits above `role`.
    fn agent_outranks(&self, role: &Role) -> impl Future<Output = Result<bool, BotError>> + Send;

    /// Whether a member currently holds a role.
    fn member_has_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> impl Future<Output = Result<bool, BotError>> + Send;

    fn add_member_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> impl Future<Output = Result<(), BotError>> + Send;

    fn remove_member_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> impl Future<Output = Result<(), BotError>> + Send;

    /// Whether a member holds at least one of `role_ids`.
    fn caller_has_any_role(
        &self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> impl Future<Output = Result<bool, BotError>> + Send;
}

/// Destination for audit notifications.
pub trait AuditSink: Send + Sync {
    fn send_notification(
        &self,
        channel_id: ChannelId,
        notice: Screen,
    ) -> impl Future<Output = Result<(), BotError>> + Send;
}

/// Everything the bot needs from the guild.
pub trait Host: MessageHost + PermissionHost + AuditSink + 'static {}

impl<T> Host for T where T: MessageHost + PermissionHost + AuditSink + 'static {}
