//! Discord REST API client.
//!
//! Covers the handful of endpoints the bot needs: interaction callbacks and
//! webhooks, guild roles and members, and channel messages. Implements the
//! guild-level host traits so the wizard and press handler can run against
//! the live API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rolebutton_core::{ApplicationId, ChannelId, GuildId, InteractionId, RoleId, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, error, instrument};

use super::error::DiscordError;
use super::types::{
    ApiErrorBody, ApiMessage, ApiRole, CommandRegistration, CurrentUser, Embed, GuildMember,
    InteractionResponse, MESSAGE_COMMAND, MessageBody,
};
use crate::config::DiscordConfig;
use crate::error::BotError;
use crate::host::{AuditSink, MessageHost, MessageRef, PermissionHost, Role};
use crate::ui::{ActionRow, Screen};

/// Name of the message context command that opens the wizard.
pub const MANAGE_BUTTONS_COMMAND: &str = "Manage Buttons";

/// Header Discord records in the guild audit log.
const AUDIT_LOG_REASON: &str = "X-Audit-Log-Reason";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Discord REST client for one guild.
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    api_base: String,
    bot_token: SecretString,
    application_id: ApplicationId,
    guild_id: GuildId,
    /// The bot's own user ID, fetched on first use.
    bot_user: Arc<OnceCell<UserId>>,
}

impl std::fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordClient")
            .field("api_base", &self.api_base)
            .field("bot_token", &"[REDACTED]")
            .field("application_id", &self.application_id)
            .field("guild_id", &self.guild_id)
            .finish_non_exhaustive()
    }
}

impl DiscordClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `DiscordError::Config` if the HTTP client cannot be built.
    pub fn new(config: &DiscordConfig) -> Result<Self, DiscordError> {
        let client = Client::builder()
            .user_agent(concat!(
                "DiscordBot (https://github.com/rolebutton, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DiscordError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            bot_token: config.bot_token.clone(),
            application_id: config.application_id,
            guild_id: config.guild_id,
            bot_user: Arc::new(OnceCell::new()),
        })
    }

    #[must_use]
    pub const fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// Authenticate, send, and turn error statuses into `DiscordError::Api`.
    async fn send(&self, request: RequestBuilder) -> Result<Response, DiscordError> {
        let response = request
            .header(
                AUTHORIZATION,
                format!("Bot {}", self.bot_token.expose_secret()),
            )
            .send()
            .await
            .map_err(|e| DiscordError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| format!("{} (code {})", e.message, e.code))
            .unwrap_or(body);
        error!(status = %status, message = %message, "Discord API error");
        Err(DiscordError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, DiscordError> {
        response
            .json()
            .await
            .map_err(|e| DiscordError::Response(e.to_string()))
    }

    // =========================================================================
    // Interactions
    // =========================================================================

    /// Answer an interaction through the callback endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Discord rejects it.
    #[instrument(skip(self, token, response), fields(kind = response.kind))]
    pub async fn create_interaction_response(
        &self,
        id: InteractionId,
        token: &str,
        response: &InteractionResponse,
    ) -> Result<(), DiscordError> {
        let url = self.url(&format!("/interactions/{id}/{token}/callback"));
        self.send(self.client.post(url).json(response)).await?;
        debug!("Interaction answered");
        Ok(())
    }

    /// Edit the message that answered an interaction.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Discord rejects it.
    #[instrument(skip_all)]
    pub async fn edit_original_response(
        &self,
        token: &str,
        body: &MessageBody,
    ) -> Result<(), DiscordError> {
        let url = self.url(&format!(
            "/webhooks/{}/{token}/messages/@original",
            self.application_id
        ));
        self.send(self.client.patch(url).json(body)).await?;
        Ok(())
    }

    /// Send an additional message for an interaction.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Discord rejects it.
    #[instrument(skip_all)]
    pub async fn create_followup(&self, token: &str, body: &MessageBody) -> Result<(), DiscordError> {
        let url = self.url(&format!("/webhooks/{}/{token}", self.application_id));
        self.send(self.client.post(url).json(body)).await?;
        Ok(())
    }

    /// Replace the guild's commands with the wizard's context command.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Discord rejects it.
    #[instrument(skip(self))]
    pub async fn register_commands(&self) -> Result<(), DiscordError> {
        let url = self.url(&format!(
            "/applications/{}/guilds/{}/commands",
            self.application_id, self.guild_id
        ));
        let commands = [CommandRegistration {
            name: MANAGE_BUTTONS_COMMAND.to_string(),
            kind: MESSAGE_COMMAND,
        }];
        self.send(self.client.put(url).json(&commands)).await?;
        debug!("Guild commands registered");
        Ok(())
    }

    // =========================================================================
    // Guild
    // =========================================================================

    /// Fetch a guild member.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the member does not exist.
    pub async fn guild_member(&self, user_id: UserId) -> Result<GuildMember, DiscordError> {
        let url = self.url(&format!("/guilds/{}/members/{user_id}", self.guild_id));
        let response = self.send(self.client.get(url)).await?;
        Self::json(response).await
    }

    /// Fetch every role in the guild.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn guild_roles(&self) -> Result<Vec<ApiRole>, DiscordError> {
        let url = self.url(&format!("/guilds/{}/roles", self.guild_id));
        let response = self.send(self.client.get(url)).await?;
        Self::json(response).await
    }

    async fn bot_user_id(&self) -> Result<UserId, DiscordError> {
        self.bot_user
            .get_or_try_init(|| async {
                let response = self.send(self.client.get(self.url("/users/@me"))).await?;
                let user: CurrentUser = Self::json(response).await?;
                Ok::<_, DiscordError>(user.id)
            })
            .await
            .copied()
    }

    async fn member_role_ids(&self, user_id: UserId) -> Result<Vec<RoleId>, DiscordError> {
        Ok(self.guild_member(user_id).await?.roles)
    }
}

impl PermissionHost for DiscordClient {
    async fn resolve_role(&self, role_id: RoleId) -> Result<Option<Role>, BotError> {
        let url = self.url(&format!("/guilds/{}/roles/{role_id}", self.guild_id));
        match self.send(self.client.get(url)).await {
            Ok(response) => {
                let role: ApiRole = Self::json(response).await?;
                Ok(Some(role.into()))
            }
            Err(DiscordError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn agent_outranks(&self, role: &Role) -> Result<bool, BotError> {
        let bot_id = self.bot_user_id().await?;
        let own_roles = self.member_role_ids(bot_id).await?;
        let top = self
            .guild_roles()
            .await?
            .into_iter()
            .filter(|guild_role| own_roles.contains(&guild_role.id))
            .map(|guild_role| guild_role.position)
            .max()
            .unwrap_or(0);
        Ok(role.position < top)
    }

    async fn member_has_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool, BotError> {
        Ok(self.member_role_ids(user_id).await?.contains(&role_id))
    }

    #[instrument(skip(self, reason))]
    async fn add_member_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> Result<(), BotError> {
        let url = self.url(&format!(
            "/guilds/{}/members/{user_id}/roles/{role_id}",
            self.guild_id
        ));
        self.send(self.client.put(url).header(AUDIT_LOG_REASON, reason))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, reason))]
    async fn remove_member_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        reason: &str,
    ) -> Result<(), BotError> {
        let url = self.url(&format!(
            "/guilds/{}/members/{user_id}/roles/{role_id}",
            self.guild_id
        ));
        self.send(self.client.delete(url).header(AUDIT_LOG_REASON, reason))
            .await?;
        Ok(())
    }

    async fn caller_has_any_role(
        &self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> Result<bool, BotError> {
        let held = self.member_role_ids(user_id).await?;
        Ok(held.iter().any(|role| role_ids.contains(role)))
    }
}

impl MessageHost for DiscordClient {
    #[instrument(skip(self), fields(message_id = %message.message_id))]
    async fn fetch_message_controls(&self, message: &MessageRef) -> Result<Vec<ActionRow>, BotError> {
        let url = self.url(&format!(
            "/channels/{}/messages/{}",
            message.channel_id, message.message_id
        ));
        let response = self.send(self.client.get(url)).await?;
        let fetched: ApiMessage = Self::json(response).await?;
        Ok(fetched.components)
    }

    #[instrument(skip(self, rows), fields(message_id = %message.message_id, rows = rows.len()))]
    async fn edit_message_controls(
        &self,
        message: &MessageRef,
        rows: Vec<ActionRow>,
    ) -> Result<(), BotError> {
        let url = self.url(&format!(
            "/channels/{}/messages/{}",
            message.channel_id, message.message_id
        ));
        let body = MessageBody::components_only(rows);
        self.send(self.client.patch(url).json(&body)).await?;
        Ok(())
    }
}

impl AuditSink for DiscordClient {
    async fn send_notification(&self, channel_id: ChannelId, notice: Screen) -> Result<(), BotError> {
        let url = self.url(&format!("/channels/{channel_id}/messages"));
        let body = MessageBody {
            embeds: Some(vec![Embed::from(notice)]),
            ..MessageBody::default()
        };
        self.send(self.client.post(url).json(&body)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;

    use super::*;

    fn config() -> DiscordConfig {
        DiscordConfig {
            api_base: "https://discord.test/api/v10".to_string(),
            bot_token: SecretString::from("very-secret-token".to_string()),
            application_id: ApplicationId::new(1),
            public_key: SigningKey::from_bytes(&[7; 32]).verifying_key(),
            guild_id: GuildId::new(2),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = DiscordClient::new(&config()).expect("client");
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("very-secret-token"));
    }

    #[test]
    fn test_url_joins_base() {
        let client = DiscordClient::new(&config()).expect("client");
        assert_eq!(
            client.url("/users/@me"),
            "https://discord.test/api/v10/users/@me"
        );
        assert_eq!(client.guild_id(), GuildId::new(2));
    }
}
