//! Application state shared across handlers.

use std::sync::Arc;

use crate::audit::AuditChannel;
use crate::config::BotConfig;
use crate::discord::{DiscordClient, DiscordError};
use crate::press::PressHandler;
use crate::wizard::WizardEngine;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: BotConfig,
    discord: DiscordClient,
    wizard: WizardEngine<DiscordClient>,
    press: PressHandler<DiscordClient>,
}

impl AppState {
    /// Build the state, including the Discord client.
    ///
    /// # Errors
    ///
    /// Returns `DiscordError::Config` if the HTTP client cannot be built.
    pub fn new(config: BotConfig) -> Result<Self, DiscordError> {
        let discord = DiscordClient::new(&config.discord)?;
        let audit = AuditChannel::new(config.audit_channel_id);

        let wizard = WizardEngine::new(
            discord.clone(),
            audit,
            config.elevated_role_ids.clone(),
        );
        let press = PressHandler::new(discord.clone(), audit, config.press_timeout);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                discord,
                wizard,
                press,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn discord(&self) -> &DiscordClient {
        &self.inner.discord
    }

    #[must_use]
    pub fn wizard(&self) -> &WizardEngine<DiscordClient> {
        &self.inner.wizard
    }

    #[must_use]
    pub fn press(&self) -> &PressHandler<DiscordClient> {
        &self.inner.press
    }
}
