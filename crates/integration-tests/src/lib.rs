//! In-memory stand-ins for Discord, shared by the end-to-end tests.
//!
//! [`FakeGuild`] implements every guild-level host trait over a single
//! mutex-guarded state; [`FakeSurface`] records what one interaction
//! answered. Message edits round-trip through JSON so tests see exactly what
//! Discord would store.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rolebutton_bot::audit::AuditChannel;
use rolebutton_bot::error::BotError;
use rolebutton_bot::host::{
    Actor, AuditSink, InteractionSurface, MessageHost, MessageRef, PermissionHost, Role,
};
use rolebutton_bot::ui::{ActionRow, Form, Screen};
use rolebutton_bot::wizard::WizardEngine;
use rolebutton_core::{ChannelId, GuildId, MessageId, RoleId, UserId};

/// Guild the fixtures live in.
pub const GUILD: GuildId = GuildId::new(1);
/// Channel holding the target message.
pub const CHANNEL: ChannelId = ChannelId::new(2);
/// The message buttons are attached to.
pub const MESSAGE: MessageId = MessageId::new(3);
/// Channel receiving audit notices.
pub const AUDIT_CHANNEL: ChannelId = ChannelId::new(99);
/// Role that may open the wizard.
pub const MOD_ROLE: RoleId = RoleId::new(500);
/// A member holding [`MOD_ROLE`].
pub const MODERATOR: UserId = UserId::new(100);
/// The bot's highest role position.
pub const BOT_POSITION: i64 = 10;

/// The fixture message.
#[must_use]
pub const fn target() -> MessageRef {
    MessageRef {
        guild_id: GUILD,
        channel_id: CHANNEL,
        message_id: MESSAGE,
    }
}

/// The fixture moderator.
#[must_use]
pub fn moderator() -> Actor {
    actor(MODERATOR, "mod")
}

#[must_use]
pub fn actor(id: UserId, name: &str) -> Actor {
    Actor {
        id,
        name: name.to_string(),
    }
}

/// A wizard engine over `guild` with [`MOD_ROLE`] elevated.
#[must_use]
pub fn wizard(guild: &FakeGuild) -> WizardEngine<FakeGuild> {
    WizardEngine::new(guild.clone(), AuditChannel::new(AUDIT_CHANNEL), vec![MOD_ROLE])
}

// =============================================================================
// Guild
// =============================================================================

#[derive(Debug, Default)]
struct GuildState {
    roles: HashMap<RoleId, Role>,
    bot_position: i64,
    members: HashMap<UserId, HashSet<RoleId>>,
    messages: HashMap<MessageId, Vec<ActionRow>>,
    audit: Vec<(ChannelId, Screen)>,
    edits: usize,
    member_delay: Option<Duration>,
    role_delay: Option<Duration>,
    fail_edits: bool,
}

/// A guild with roles, members and messages held in memory.
#[derive(Debug, Clone)]
pub struct FakeGuild {
    state: Arc<Mutex<GuildState>>,
}

impl Default for FakeGuild {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGuild {
    /// A guild with the moderator role, the moderator, and an empty fixture
    /// message.
    #[must_use]
    pub fn new() -> Self {
        let guild = Self {
            state: Arc::new(Mutex::new(GuildState {
                bot_position: BOT_POSITION,
                ..GuildState::default()
            })),
        };
        guild
            .with_role(MOD_ROLE, "Moderators", BOT_POSITION + 5)
            .with_member(MODERATOR, &[MOD_ROLE])
            .with_message(MESSAGE, Vec::new())
    }

    fn lock(&self) -> MutexGuard<'_, GuildState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an assignable role.
    #[must_use]
    pub fn with_role(self, id: RoleId, name: &str, position: i64) -> Self {
        self.insert_role(id, name, position, false);
        self
    }

    /// Add a role owned by an integration.
    #[must_use]
    pub fn with_managed_role(self, id: RoleId, name: &str, position: i64) -> Self {
        self.insert_role(id, name, position, true);
        self
    }

    fn insert_role(&self, id: RoleId, name: &str, position: i64, managed: bool) {
        self.lock().roles.insert(
            id,
            Role {
                id,
                name: name.to_string(),
                position,
                managed,
            },
        );
    }

    /// Add a member holding `roles`.
    #[must_use]
    pub fn with_member(self, id: UserId, roles: &[RoleId]) -> Self {
        self.lock()
            .members
            .insert(id, roles.iter().copied().collect());
        self
    }

    /// Set a message's controls.
    #[must_use]
    pub fn with_message(self, id: MessageId, rows: Vec<ActionRow>) -> Self {
        self.lock().messages.insert(id, rows);
        self
    }

    /// Delete a role, as if a moderator removed it from the server.
    pub fn delete_role(&self, id: RoleId) {
        self.lock().roles.remove(&id);
    }

    /// Move a role in the hierarchy.
    pub fn move_role(&self, id: RoleId, position: i64) {
        if let Some(role) = self.lock().roles.get_mut(&id) {
            role.position = position;
        }
    }

    /// Make member lookups stall for `delay`.
    pub fn stall_member_lookups(&self, delay: Duration) {
        self.lock().member_delay = Some(delay);
    }

    /// Make role lookups stall for `delay`.
    pub fn stall_role_lookups(&self, delay: Duration) {
        self.lock().role_delay = Some(delay);
    }

    /// Let message edits succeed again.
    pub fn restore_edits(&self) {
        self.lock().fail_edits = false;
    }

    /// Make every message edit fail.
    pub fn fail_edits(&self) {
        self.lock().fail_edits = true;
    }

    /// Overwrite a message's controls behind the bot's back.
    pub fn replace_controls(&self, id: MessageId, rows: Vec<ActionRow>) {
        self.lock().messages.insert(id, rows);
    }

    /// A message's current controls.
    #[must_use]
    pub fn controls(&self, id: MessageId) -> Vec<ActionRow> {
        self.lock().messages.get(&id).cloned().unwrap_or_default()
    }

    /// Roles a member currently holds.
    #[must_use]
    pub fn member_roles(&self, id: UserId) -> HashSet<RoleId> {
        self.lock().members.get(&id).cloned().unwrap_or_default()
    }

    /// Audit notices posted so far.
    #[must_use]
    pub fn audit_log(&self) -> Vec<Screen> {
        self.lock()
            .audit
            .iter()
            .map(|(_, screen)| screen.clone())
            .collect()
    }

    /// Channels audit notices went to.
    #[must_use]
    pub fn audit_channels(&self) -> Vec<ChannelId> {
        self.lock().audit.iter().map(|(channel, _)| *channel).collect()
    }

    /// Number of successful message edits.
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.lock().edits
    }

    async fn member_pause(&self) {
        let delay = self.lock().member_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn role_pause(&self) {
        let delay = self.lock().role_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl PermissionHost for FakeGuild {
    async fn resolve_role(&self, role_id: RoleId) -> Result<Option<Role>, BotError> {
        self.role_pause().await;
        Ok(self.lock().roles.get(&role_id).cloned())
    }

    async fn agent_outranks(&self, role: &Role) -> Result<bool, BotError> {
        Ok(role.position < self.lock().bot_position)
    }

    async fn member_has_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool, BotError> {
        self.member_pause().await;
        Ok(self
            .lock()
            .members
            .get(&user_id)
            .is_some_and(|roles| roles.contains(&role_id)))
    }

    async fn add_member_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        _reason: &str,
    ) -> Result<(), BotError> {
        self.lock().members.entry(user_id).or_default().insert(role_id);
        Ok(())
    }

    async fn remove_member_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        _reason: &str,
    ) -> Result<(), BotError> {
        if let Some(roles) = self.lock().members.get_mut(&user_id) {
            roles.remove(&role_id);
        }
        Ok(())
    }

    async fn caller_has_any_role(
        &self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> Result<bool, BotError> {
        Ok(self
            .lock()
            .members
            .get(&user_id)
            .is_some_and(|roles| role_ids.iter().any(|id| roles.contains(id))))
    }
}

impl MessageHost for FakeGuild {
    async fn fetch_message_controls(&self, message: &MessageRef) -> Result<Vec<ActionRow>, BotError> {
        self.lock()
            .messages
            .get(&message.message_id)
            .cloned()
            .ok_or_else(|| BotError::NotFound(format!("message {}", message.message_id)))
    }

    async fn edit_message_controls(
        &self,
        message: &MessageRef,
        rows: Vec<ActionRow>,
    ) -> Result<(), BotError> {
        let wire = serde_json::to_value(&rows).map_err(|e| BotError::Generic(e.to_string()))?;
        let stored: Vec<ActionRow> =
            serde_json::from_value(wire).map_err(|e| BotError::Generic(e.to_string()))?;

        let mut state = self.lock();
        if state.fail_edits {
            return Err(BotError::HostTransport(
                "Invalid Form Body (components)".to_string(),
            ));
        }
        state.messages.insert(message.message_id, stored);
        state.edits += 1;
        Ok(())
    }
}

impl AuditSink for FakeGuild {
    async fn send_notification(&self, channel_id: ChannelId, notice: Screen) -> Result<(), BotError> {
        self.lock().audit.push((channel_id, notice));
        Ok(())
    }
}

// =============================================================================
// Surface
// =============================================================================

/// One answer given to an interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    DeferUpdate,
    DeferEphemeral,
    SendStep(Screen, Vec<ActionRow>),
    ShowStep(Screen, Vec<ActionRow>),
    OpenForm(Form),
    ReplyEphemeral(Screen),
    EditReply(Screen),
}

/// Records the answers to one interaction.
#[derive(Debug, Default)]
pub struct FakeSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl FakeSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: SurfaceEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Everything answered, in order.
    #[must_use]
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The last step shown or sent.
    #[must_use]
    pub fn last_step(&self) -> Option<(Screen, Vec<ActionRow>)> {
        self.events().into_iter().rev().find_map(|event| match event {
            SurfaceEvent::SendStep(screen, rows) | SurfaceEvent::ShowStep(screen, rows) => {
                Some((screen, rows))
            }
            _ => None,
        })
    }

    /// The last private reply, sent or edited.
    #[must_use]
    pub fn last_reply(&self) -> Option<Screen> {
        self.events().into_iter().rev().find_map(|event| match event {
            SurfaceEvent::ReplyEphemeral(screen) | SurfaceEvent::EditReply(screen) => Some(screen),
            _ => None,
        })
    }

    /// The last form opened.
    #[must_use]
    pub fn last_form(&self) -> Option<Form> {
        self.events().into_iter().rev().find_map(|event| match event {
            SurfaceEvent::OpenForm(form) => Some(form),
            _ => None,
        })
    }
}

impl InteractionSurface for FakeSurface {
    async fn defer_update(&self) -> Result<(), BotError> {
        self.record(SurfaceEvent::DeferUpdate);
        Ok(())
    }

    async fn defer_ephemeral(&self) -> Result<(), BotError> {
        self.record(SurfaceEvent::DeferEphemeral);
        Ok(())
    }

    async fn send_step(&self, screen: Screen, rows: Vec<ActionRow>) -> Result<(), BotError> {
        self.record(SurfaceEvent::SendStep(screen, rows));
        Ok(())
    }

    async fn show_step(&self, screen: Screen, rows: Vec<ActionRow>) -> Result<(), BotError> {
        self.record(SurfaceEvent::ShowStep(screen, rows));
        Ok(())
    }

    async fn open_form(&self, form: Form) -> Result<(), BotError> {
        self.record(SurfaceEvent::OpenForm(form));
        Ok(())
    }

    async fn reply_ephemeral(&self, screen: Screen) -> Result<(), BotError> {
        self.record(SurfaceEvent::ReplyEphemeral(screen));
        Ok(())
    }

    async fn edit_reply(&self, screen: Screen) -> Result<(), BotError> {
        self.record(SurfaceEvent::EditReply(screen));
        Ok(())
    }
}
