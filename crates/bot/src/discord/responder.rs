//! Responding to one interaction.
//!
//! Discord expects the first response as the HTTP response to the webhook,
//! within three seconds. The route hands the responder a oneshot channel for
//! that first response; if the handler does not produce one in time the
//! route answers with a deferral on its own and the channel is closed. Every
//! later response goes through the interaction's webhook.

use std::sync::Mutex;

use rolebutton_core::InteractionId;
use tokio::sync::oneshot;

use super::client::DiscordClient;
use super::types::{InteractionResponse, MessageBody};
use crate::error::BotError;
use crate::host::InteractionSurface;
use crate::ui::{ActionRow, Form, Screen};

/// [`InteractionSurface`] backed by Discord's interaction endpoints.
#[derive(Debug)]
pub struct InteractionResponder {
    client: DiscordClient,
    id: InteractionId,
    token: String,
    initial: Mutex<Option<oneshot::Sender<InteractionResponse>>>,
}

impl InteractionResponder {
    #[must_use]
    pub const fn new(
        client: DiscordClient,
        id: InteractionId,
        token: String,
        initial: oneshot::Sender<InteractionResponse>,
    ) -> Self {
        Self {
            client,
            id,
            token,
            initial: Mutex::new(Some(initial)),
        }
    }

    /// Interaction this responder answers.
    #[must_use]
    pub const fn interaction_id(&self) -> InteractionId {
        self.id
    }

    /// Try to use `response` as the interaction's first response.
    ///
    /// Returns false if the interaction was already answered, by an earlier
    /// call or by the route's deferral.
    fn initial(&self, response: InteractionResponse) -> bool {
        let sender = self.initial.lock().ok().and_then(|mut slot| slot.take());
        sender.is_some_and(|tx| tx.send(response).is_ok())
    }

    async fn edit_original(&self, body: &MessageBody) -> Result<(), BotError> {
        self.client
            .edit_original_response(&self.token, body)
            .await
            .map_err(Into::into)
    }
}

impl InteractionSurface for InteractionResponder {
    async fn defer_update(&self) -> Result<(), BotError> {
        self.initial(InteractionResponse::deferred_update());
        Ok(())
    }

    async fn defer_ephemeral(&self) -> Result<(), BotError> {
        self.initial(InteractionResponse::deferred_ephemeral());
        Ok(())
    }

    async fn send_step(&self, screen: Screen, rows: Vec<ActionRow>) -> Result<(), BotError> {
        let body = MessageBody::screen(screen, rows).ephemeral();
        if self.initial(InteractionResponse::message(&body)) {
            return Ok(());
        }
        self.edit_original(&body).await
    }

    async fn show_step(&self, screen: Screen, rows: Vec<ActionRow>) -> Result<(), BotError> {
        let body = MessageBody::screen(screen, rows);
        if self.initial(InteractionResponse::update(&body)) {
            return Ok(());
        }
        self.edit_original(&body).await
    }

    async fn open_form(&self, form: Form) -> Result<(), BotError> {
        if self.initial(InteractionResponse::modal(&form)) {
            return Ok(());
        }
        Err(BotError::HostTransport(
            "the form could not be opened in time. Press the button again.".to_string(),
        ))
    }

    async fn reply_ephemeral(&self, screen: Screen) -> Result<(), BotError> {
        let body = MessageBody::screen(screen, Vec::new()).ephemeral();
        if self.initial(InteractionResponse::message(&body)) {
            return Ok(());
        }
        self.client
            .create_followup(&self.token, &body)
            .await
            .map_err(Into::into)
    }

    async fn edit_reply(&self, screen: Screen) -> Result<(), BotError> {
        let body = MessageBody::screen(screen, Vec::new()).ephemeral();
        if self.initial(InteractionResponse::message(&body)) {
            return Ok(());
        }
        self.edit_original(&body).await
    }
}
