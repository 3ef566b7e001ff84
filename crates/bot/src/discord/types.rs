//! Discord wire types for interactions and the REST endpoints the bot uses.
//!
//! Only the fields the bot reads are modelled; everything else is ignored on
//! deserialize.
//!
//! See: <https://discord.com/developers/docs/interactions/receiving-and-responding>

use rolebutton_core::{ApplicationId, ChannelId, GuildId, InteractionId, MessageId, RoleId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::host::{self, Actor};
use crate::ui::{ActionRow, Form, FormSubmission, Screen};

// =============================================================================
// Incoming Interactions
// =============================================================================

/// Interaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    Autocomplete,
    ModalSubmit,
}

impl TryFrom<u8> for InteractionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Ping),
            2 => Ok(Self::ApplicationCommand),
            3 => Ok(Self::MessageComponent),
            4 => Ok(Self::Autocomplete),
            5 => Ok(Self::ModalSubmit),
            other => Err(format!("unknown interaction type {other}")),
        }
    }
}

/// An incoming interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub application_id: ApplicationId,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    /// Present for interactions in a guild.
    #[serde(default)]
    pub member: Option<Member>,
    /// Present for interactions in DMs.
    #[serde(default)]
    pub user: Option<User>,
    pub token: String,
    /// The message a component was on.
    #[serde(default)]
    pub message: Option<InteractionMessage>,
}

impl Interaction {
    /// The user who triggered the interaction.
    #[must_use]
    pub fn actor(&self) -> Option<Actor> {
        let user = self
            .member
            .as_ref()
            .map(|member| &member.user)
            .or(self.user.as_ref())?;
        Some(Actor {
            id: user.id,
            name: user.display_name().to_string(),
        })
    }

    /// Custom ID of the pressed component or submitted modal.
    #[must_use]
    pub fn custom_id(&self) -> Option<&str> {
        self.data.as_ref()?.custom_id.as_deref()
    }
}

/// Payload specific to the interaction type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionData {
    /// Command name.
    #[serde(default)]
    pub name: Option<String>,
    /// Command type (3 for message context commands).
    #[serde(default, rename = "type")]
    pub command_type: Option<u8>,
    /// Message a context command was invoked on.
    #[serde(default)]
    pub target_id: Option<MessageId>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub component_type: Option<u8>,
    /// Modal rows.
    #[serde(default)]
    pub components: Vec<ModalRow>,
}

impl InteractionData {
    /// Text input values from a modal submit.
    #[must_use]
    pub fn submission(&self) -> FormSubmission {
        FormSubmission::from_pairs(
            self.components
                .iter()
                .flat_map(|row| &row.components)
                .map(|input| (input.custom_id.clone(), input.value.clone())),
        )
    }
}

/// A row of a submitted modal.
#[derive(Debug, Clone, Deserialize)]
pub struct ModalRow {
    #[serde(default)]
    pub components: Vec<ModalValue>,
}

/// One submitted text input.
#[derive(Debug, Clone, Deserialize)]
pub struct ModalValue {
    pub custom_id: String,
    #[serde(default)]
    pub value: String,
}

/// Guild member attached to an interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user: User,
    #[serde(default)]
    pub roles: Vec<RoleId>,
}

/// A Discord user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
}

impl User {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

/// The message a component interaction came from.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
}

// =============================================================================
// Interaction Responses
// =============================================================================

/// Response types.
pub mod response_type {
    pub const PONG: u8 = 1;
    pub const CHANNEL_MESSAGE: u8 = 4;
    pub const DEFERRED_CHANNEL_MESSAGE: u8 = 5;
    pub const DEFERRED_UPDATE: u8 = 6;
    pub const UPDATE_MESSAGE: u8 = 7;
    pub const MODAL: u8 = 9;
}

/// Message flag hiding a response from everyone but the invoking user.
pub const EPHEMERAL: u64 = 1 << 6;

/// Text input component type.
const TEXT_INPUT_TYPE: u8 = 4;
/// Single-line text input style.
const TEXT_INPUT_SHORT: u8 = 1;

/// Body of an interaction callback.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl InteractionResponse {
    #[must_use]
    pub const fn pong() -> Self {
        Self {
            kind: response_type::PONG,
            data: None,
        }
    }

    /// "Thinking..." placeholder visible only to the invoking user.
    #[must_use]
    pub fn deferred_ephemeral() -> Self {
        Self {
            kind: response_type::DEFERRED_CHANNEL_MESSAGE,
            data: Some(serde_json::json!({ "flags": EPHEMERAL })),
        }
    }

    #[must_use]
    pub const fn deferred_update() -> Self {
        Self {
            kind: response_type::DEFERRED_UPDATE,
            data: None,
        }
    }

    /// A new message.
    #[must_use]
    pub fn message(body: &MessageBody) -> Self {
        Self {
            kind: response_type::CHANNEL_MESSAGE,
            data: serde_json::to_value(body).ok(),
        }
    }

    /// Replace the message the component was on.
    #[must_use]
    pub fn update(body: &MessageBody) -> Self {
        Self {
            kind: response_type::UPDATE_MESSAGE,
            data: serde_json::to_value(body).ok(),
        }
    }

    #[must_use]
    pub fn modal(form: &Form) -> Self {
        Self {
            kind: response_type::MODAL,
            data: serde_json::to_value(Modal::from(form)).ok(),
        }
    }
}

/// Message content, used for callbacks, webhook edits and channel posts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Embed>>,
    /// `Some(vec![])` clears the message's components.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ActionRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl MessageBody {
    /// A screen with its controls.
    #[must_use]
    pub fn screen(screen: Screen, rows: Vec<ActionRow>) -> Self {
        Self {
            content: None,
            embeds: Some(vec![Embed::from(screen)]),
            components: Some(rows),
            flags: None,
        }
    }

    #[must_use]
    pub const fn ephemeral(mut self) -> Self {
        self.flags = Some(EPHEMERAL);
        self
    }

    /// Only the message's components, leaving content and embeds alone.
    #[must_use]
    pub fn components_only(rows: Vec<ActionRow>) -> Self {
        Self {
            components: Some(rows),
            ..Self::default()
        }
    }
}

/// Embed built from a [`Screen`].
#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl From<Screen> for Embed {
    fn from(screen: Screen) -> Self {
        Self {
            title: screen.title,
            description: screen.description,
            color: screen.tone.colour(),
            fields: screen
                .fields
                .into_iter()
                .map(|field| EmbedField {
                    name: field.name,
                    value: field.value,
                    inline: field.inline,
                })
                .collect(),
            footer: screen.footer.map(|text| EmbedFooter { text }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Modal {
    custom_id: String,
    title: String,
    components: Vec<ModalInputRow>,
}

#[derive(Debug, Clone, Serialize)]
struct ModalInputRow {
    #[serde(rename = "type")]
    kind: u8,
    components: [TextInput; 1],
}

#[derive(Debug, Clone, Serialize)]
struct TextInput {
    #[serde(rename = "type")]
    kind: u8,
    custom_id: String,
    label: String,
    style: u8,
    required: bool,
    max_length: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

impl From<&Form> for Modal {
    fn from(form: &Form) -> Self {
        Self {
            custom_id: form.custom_id.clone(),
            title: form.title.clone(),
            components: form
                .fields
                .iter()
                .map(|field| ModalInputRow {
                    kind: 1,
                    components: [TextInput {
                        kind: TEXT_INPUT_TYPE,
                        custom_id: field.id.clone(),
                        label: field.label.clone(),
                        style: TEXT_INPUT_SHORT,
                        required: field.required,
                        max_length: field.max_length,
                        placeholder: field.placeholder.clone(),
                        value: field.value.clone(),
                    }],
                })
                .collect(),
        }
    }
}

// =============================================================================
// REST Resources
// =============================================================================

/// Message context command registration.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRegistration {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

/// Message context command type.
pub const MESSAGE_COMMAND: u8 = 3;

/// A guild role.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRole {
    pub id: RoleId,
    pub name: String,
    pub position: i64,
    #[serde(default)]
    pub managed: bool,
}

impl From<ApiRole> for host::Role {
    fn from(role: ApiRole) -> Self {
        Self {
            id: role.id,
            name: role.name,
            position: role.position,
            managed: role.managed,
        }
    }
}

/// A guild member.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildMember {
    #[serde(default)]
    pub roles: Vec<RoleId>,
}

/// The bot's own user.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
}

/// A channel message. Only its components are read.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    pub id: MessageId,
    #[serde(default)]
    pub components: Vec<ActionRow>,
}

/// Error body returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u64,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ui::{FormField, Tone};

    #[test]
    fn test_parse_message_command() {
        let interaction: Interaction = serde_json::from_value(json!({
            "id": "1",
            "application_id": "2",
            "type": 2,
            "token": "tok",
            "guild_id": "10",
            "channel_id": "11",
            "member": {"user": {"id": "5", "username": "mod", "global_name": "Mod"}, "roles": ["9"]},
            "data": {"id": "3", "name": "Manage Buttons", "type": 3, "target_id": "12"}
        }))
        .unwrap();

        assert_eq!(interaction.kind, InteractionType::ApplicationCommand);
        let data = interaction.data.as_ref().unwrap();
        assert_eq!(data.target_id, Some(MessageId::new(12)));
        assert_eq!(data.command_type, Some(MESSAGE_COMMAND));
        assert_eq!(interaction.actor().unwrap().name, "Mod");
    }

    #[test]
    fn test_modal_submission_values() {
        let data: InteractionData = serde_json::from_value(json!({
            "custom_id": "wizard:x:form:face",
            "components": [
                {"type": 1, "components": [{"type": 4, "custom_id": "label", "value": "Join"}]},
                {"type": 1, "components": [{"type": 4, "custom_id": "emoji", "value": ""}]}
            ]
        }))
        .unwrap();

        let submission = data.submission();
        assert_eq!(submission.get("label"), Some("Join"));
        assert_eq!(submission.get("emoji"), None);
    }

    #[test]
    fn test_unknown_interaction_type_rejected() {
        let result = serde_json::from_value::<Interaction>(json!({
            "id": "1", "application_id": "2", "type": 42, "token": "t"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_modal_response_shape() {
        let form = Form {
            custom_id: "wizard:x:form:role".into(),
            title: "Set Role".into(),
            fields: vec![FormField::new("role_id", "Enter Role ID", 20).required()],
        };
        let value = serde_json::to_value(InteractionResponse::modal(&form)).unwrap();
        assert_eq!(value["type"], 9);
        assert_eq!(value["data"]["components"][0]["type"], 1);
        assert_eq!(value["data"]["components"][0]["components"][0]["type"], 4);
        assert_eq!(value["data"]["components"][0]["components"][0]["required"], true);
    }

    #[test]
    fn test_screen_becomes_embed() {
        let screen = Screen::new(Tone::Success, "done").field("a", "b", true);
        let body = MessageBody::screen(screen, Vec::new()).ephemeral();
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["embeds"][0]["color"], 0x80_ff_80);
        assert_eq!(value["flags"], 64);
        assert_eq!(value["components"], json!([]));
    }
}
