//! Discord interactions webhook.
//!
//! Verifies the request signature, answers pings, and hands everything else
//! to the wizard or the press handler on a background task. The handler's
//! first response becomes this request's HTTP response if it arrives within
//! the initial window; otherwise Discord is sent a deferral and the handler
//! finishes through the interaction webhook.

use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use rolebutton_core::RoleButtonId;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use crate::discord::{
    Interaction, InteractionResponder, InteractionResponse, InteractionType,
    MANAGE_BUTTONS_COMMAND, SIGNATURE_HEADER, TIMESTAMP_HEADER, verify_signature,
};
use crate::error::BotError;
use crate::host::{Actor, InteractionSurface, MessageRef};
use crate::state::AppState;
use crate::wizard::{WizardControl, WizardCustomId, screens};

/// How long to wait for a handler's first response before deferring.
/// Discord allows three seconds.
const INITIAL_RESPONSE_WINDOW: Duration = Duration::from_millis(2500);

/// Create interaction webhook routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/interactions", post(handle_interaction))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, BotError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| BotError::Permission(format!("missing {name} header")))
}

/// Handle a Discord interaction webhook.
#[instrument(skip_all)]
async fn handle_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InteractionResponse>, BotError> {
    let timestamp = header(&headers, TIMESTAMP_HEADER)?;
    let signature = header(&headers, SIGNATURE_HEADER)?;
    verify_signature(&state.config().discord.public_key, timestamp, &body, signature)?;

    let interaction: Interaction = serde_json::from_slice(&body)
        .map_err(|e| BotError::Validation(format!("Failed to parse interaction: {e}")))?;

    if interaction.kind == InteractionType::Ping {
        debug!("Answering ping");
        return Ok(Json(InteractionResponse::pong()));
    }

    let deferral = deferral_for(&interaction);
    let (tx, mut rx) = oneshot::channel();
    let responder = InteractionResponder::new(
        state.discord().clone(),
        interaction.id,
        interaction.token.clone(),
        tx,
    );
    tokio::spawn(dispatch(state, interaction, responder));

    let response = match tokio::time::timeout(INITIAL_RESPONSE_WINDOW, &mut rx).await {
        Ok(Ok(response)) => response,
        Ok(Err(_)) => deferral,
        Err(_) => {
            // Close first so a response racing the deadline is either taken
            // here or refused to the handler, never lost.
            rx.close();
            rx.try_recv().unwrap_or_else(|_| {
                debug!("Handler still running, deferring");
                deferral
            })
        }
    };
    Ok(Json(response))
}

/// Deferral used when a handler misses the initial window.
///
/// Role button replies and new wizards are private messages; wizard steps
/// edit the wizard's own message.
fn deferral_for(interaction: &Interaction) -> InteractionResponse {
    let role_button = interaction
        .custom_id()
        .is_some_and(RoleButtonId::is_role_button);
    match interaction.kind {
        InteractionType::ApplicationCommand => InteractionResponse::deferred_ephemeral(),
        InteractionType::MessageComponent if role_button => {
            InteractionResponse::deferred_ephemeral()
        }
        _ => InteractionResponse::deferred_update(),
    }
}

async fn dispatch(state: AppState, interaction: Interaction, responder: InteractionResponder) {
    let Some(actor) = interaction.actor() else {
        warn!("Interaction without a user");
        return;
    };

    let result = match interaction.kind {
        InteractionType::ApplicationCommand => {
            open_wizard(&state, &interaction, actor, &responder).await
        }
        InteractionType::MessageComponent => {
            component(&state, &interaction, &actor, &responder).await
        }
        InteractionType::ModalSubmit => form(&state, &interaction, &actor, &responder).await,
        InteractionType::Ping | InteractionType::Autocomplete => Ok(()),
    };

    if let Err(err) = result {
        debug!(error = %err, kind = err.kind(), "Interaction finished with an error");
    }
}

/// Reject an interaction that cannot be routed.
async fn reject<S: InteractionSurface>(surface: &S, err: BotError) -> Result<(), BotError> {
    if let Err(reply_err) = surface.reply_ephemeral(screens::error(&err)).await {
        warn!(error = %reply_err, "Failed to reject interaction");
    }
    Err(err)
}

async fn open_wizard(
    state: &AppState,
    interaction: &Interaction,
    actor: Actor,
    responder: &InteractionResponder,
) -> Result<(), BotError> {
    let data = interaction.data.clone().unwrap_or_default();
    if data.name.as_deref() != Some(MANAGE_BUTTONS_COMMAND) {
        return reject(responder, BotError::Validation("Unknown command.".to_string())).await;
    }

    let Some(target) = message_ref(state, interaction, data.target_id) else {
        return reject(
            responder,
            BotError::Validation("Use this command on a message in the server.".to_string()),
        )
        .await;
    };

    state.wizard().open(responder, actor, target).await.map(|_| ())
}

async fn component(
    state: &AppState,
    interaction: &Interaction,
    actor: &Actor,
    responder: &InteractionResponder,
) -> Result<(), BotError> {
    let custom_id = interaction.custom_id().unwrap_or_default();

    if RoleButtonId::is_role_button(custom_id) {
        let message_id = interaction.message.as_ref().map(|message| message.id);
        let Some(message) = message_ref(state, interaction, message_id) else {
            return reject(
                responder,
                BotError::Validation("Role buttons only work inside the server.".to_string()),
            )
            .await;
        };
        return state
            .press()
            .handle(responder, actor, message, custom_id)
            .await
            .map(|_| ());
    }

    match custom_id.parse::<WizardCustomId>() {
        Ok(WizardCustomId {
            session,
            control: WizardControl::Button(action),
        }) => {
            state
                .wizard()
                .on_step_button(responder, actor, session, action)
                .await
        }
        _ => {
            reject(
                responder,
                BotError::Validation("This button is no longer in use.".to_string()),
            )
            .await
        }
    }
}

async fn form(
    state: &AppState,
    interaction: &Interaction,
    actor: &Actor,
    responder: &InteractionResponder,
) -> Result<(), BotError> {
    let data = interaction.data.clone().unwrap_or_default();
    let custom_id = data.custom_id.as_deref().unwrap_or_default();

    match custom_id.parse::<WizardCustomId>() {
        Ok(WizardCustomId {
            session,
            control: WizardControl::Form(kind),
        }) => {
            state
                .wizard()
                .on_form_submit(responder, actor, session, kind, &data.submission())
                .await
        }
        _ => {
            reject(
                responder,
                BotError::Validation("This form is no longer in use.".to_string()),
            )
            .await
        }
    }
}

/// Locate a message in the configured guild. Interactions from other guilds
/// and DMs yield `None`.
fn message_ref(
    state: &AppState,
    interaction: &Interaction,
    message_id: Option<rolebutton_core::MessageId>,
) -> Option<MessageRef> {
    let guild_id = interaction.guild_id?;
    if guild_id != state.config().discord.guild_id {
        return None;
    }
    let channel_id = interaction
        .message
        .as_ref()
        .map(|message| message.channel_id)
        .or(interaction.channel_id)?;
    Some(MessageRef {
        guild_id,
        channel_id,
        message_id: message_id?,
    })
}
