//! The role button wizard.
//!
//! A moderator opens the wizard on a message from its context menu. The
//! wizard walks them through six steps in a private message, stages one or
//! more buttons in a draft, and commits the draft onto the message in one
//! edit.
//!
//! # Flow
//!
//! 1. `open` checks the caller is a moderator, snapshots the message's role
//!    buttons and sends the first step
//! 2. Each press or form submit locks the session, checks the control is on
//!    the current screen, applies it and re-renders in a single edit
//! 3. Commit merges the draft and ends the session; cancel just ends it
//!
//! Sessions live in memory only. They end when the operator commits or
//! cancels; the wizard never times them out itself.

pub mod custom_id;
pub mod draft;
pub mod gates;
pub mod screens;
pub mod session;
pub mod steps;

use rolebutton_core::{RoleId, UserId};
use tracing::instrument;

pub use custom_id::{FormKind, SessionId, WizardAction, WizardControl, WizardCustomId};
pub use session::{SessionState, SessionStore, WizardSession};
pub use steps::WizardStep;

use crate::audit::{self, AuditChannel};
use crate::commit::CommitEngine;
use crate::descriptor::ButtonDescriptor;
use crate::error::{BotError, capture_for_user};
use crate::host::{Actor, Host, InteractionSurface, MessageRef};
use crate::ui::{ActionRow, Component, FormSubmission};

/// Role buttons currently on a message, in row order.
#[must_use]
pub fn decode_existing(target: MessageRef, rows: &[ActionRow]) -> Vec<ButtonDescriptor> {
    rows.iter()
        .enumerate()
        .flat_map(|(r, row)| {
            row.components
                .iter()
                .filter_map(Component::as_button)
                .filter_map(move |button| ButtonDescriptor::from_control(target, button, r))
        })
        .collect()
}

fn expired() -> BotError {
    BotError::NotFound(
        "this wizard has expired. Open it again from the message's Apps menu.".to_string(),
    )
}

fn stale() -> BotError {
    BotError::Validation(
        "That button belongs to an earlier step. Use the buttons on the latest screen."
            .to_string(),
    )
}

/// Drives wizard sessions against a host.
#[derive(Debug)]
pub struct WizardEngine<H> {
    host: H,
    sessions: SessionStore,
    audit: AuditChannel,
    elevated_roles: Vec<RoleId>,
}

impl<H: Host> WizardEngine<H> {
    #[must_use]
    pub fn new(host: H, audit: AuditChannel, elevated_roles: Vec<RoleId>) -> Self {
        Self {
            host,
            sessions: SessionStore::new(),
            audit,
            elevated_roles,
        }
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Open a wizard on `target` for `operator`.
    ///
    /// # Errors
    ///
    /// Returns the failure, already reported to the operator.
    #[instrument(
        skip(self, surface, operator),
        fields(operator_id = %operator.id, message_id = %target.message_id)
    )]
    pub async fn open<S: InteractionSurface>(
        &self,
        surface: &S,
        operator: Actor,
        target: MessageRef,
    ) -> Result<SessionId, BotError> {
        let operator_id = operator.id;
        let result = self.try_open(surface, operator, target).await;
        if let Err(err) = &result {
            self.report(surface, operator_id, Some(&target), err).await;
        }
        result
    }

    async fn try_open<S: InteractionSurface>(
        &self,
        surface: &S,
        operator: Actor,
        target: MessageRef,
    ) -> Result<SessionId, BotError> {
        if !self
            .host
            .caller_has_any_role(operator.id, &self.elevated_roles)
            .await?
        {
            return Err(BotError::Permission(
                "only moderators can manage role buttons".to_string(),
            ));
        }

        let rows = self.host.fetch_message_controls(&target).await?;
        let session = WizardSession::new(operator, target, decode_existing(target, &rows));
        let id = session.id;
        let (screen, rows) = steps::render(&session);
        self.sessions.insert(session).await;

        if let Err(err) = surface.send_step(screen, rows).await {
            self.sessions.remove(id).await;
            return Err(err);
        }
        tracing::info!(session_id = %id, "Wizard opened");
        Ok(id)
    }

    /// Apply a press on one of the wizard's own buttons.
    ///
    /// # Errors
    ///
    /// Returns the failure, already reported to the operator.
    #[instrument(skip(self, surface, actor), fields(actor_id = %actor.id))]
    pub async fn on_step_button<S: InteractionSurface>(
        &self,
        surface: &S,
        actor: &Actor,
        session_id: SessionId,
        action: WizardAction,
    ) -> Result<(), BotError> {
        let result = self.step_button(surface, actor, session_id, action).await;
        if let Err(err) = &result {
            self.report(surface, actor.id, None, err).await;
        }
        result
    }

    async fn step_button<S: InteractionSurface>(
        &self,
        surface: &S,
        actor: &Actor,
        session_id: SessionId,
        action: WizardAction,
    ) -> Result<(), BotError> {
        let handle = self.sessions.get(session_id).await.ok_or_else(expired)?;
        let mut session = handle.lock().await;
        check_active(&session, actor)?;
        if !steps::accepts(&session, action) {
            return Err(stale());
        }

        match action {
            WizardAction::OpenForm(kind) => {
                return surface.open_form(screens::form(&session, kind)).await;
            }
            WizardAction::Cancel => {
                session.state = SessionState::Cancelled;
                drop(session);
                self.sessions.remove(session_id).await;
                tracing::info!(session_id = %session_id, "Wizard cancelled");
                return surface.show_step(screens::cancelled(), Vec::new()).await;
            }
            WizardAction::Commit => {
                let report = CommitEngine::new(&self.host, self.audit)
                    .commit(
                        &session.operator,
                        &session.target,
                        &session.draft,
                        Some(&session.baseline()),
                    )
                    .await?;
                session.state = SessionState::Committed;
                let screen = screens::committed(&session, &report);
                drop(session);
                self.sessions.remove(session_id).await;
                return surface.show_step(screen, Vec::new()).await;
            }
            WizardAction::Prev => {
                if let Some(prev) = session.step.prev() {
                    session.step = prev;
                }
            }
            WizardAction::Next => self.advance(&mut session).await?,
            WizardAction::ChooseAction(choice) => {
                session.current.action = Some(choice);
                self.advance(&mut session).await?;
            }
            WizardAction::ChooseStyle(choice) => {
                session.current.style = Some(choice);
                self.advance(&mut session).await?;
            }
            WizardAction::AddAnother => {
                session.current.reset();
                session.step = WizardStep::ChooseRole;
            }
            WizardAction::Review => {
                session.current.reset();
                session.step = WizardStep::Confirm;
            }
            WizardAction::EditExisting(index) => {
                let existing = session.existing.get(index).cloned().ok_or_else(stale)?;
                let key = existing.key();
                // Re-editing a button already staged picks up the staged version.
                let staged = session
                    .draft
                    .iter()
                    .find(|entry| entry.replaces.is_some() && entry.replaces == key)
                    .cloned();
                session.current = staged.unwrap_or(ButtonDescriptor {
                    replaces: key,
                    ..existing
                });
                session.step = WizardStep::ChooseRole;
            }
            WizardAction::EditDraft(index) => {
                session.current = session.draft.get(index).cloned().ok_or_else(stale)?;
                session.step = WizardStep::ChooseRole;
            }
        }

        let (screen, rows) = steps::render(&session);
        surface.show_step(screen, rows).await
    }

    /// Apply a submitted wizard form.
    ///
    /// # Errors
    ///
    /// Returns the failure, already reported to the operator. Invalid input
    /// leaves the session unchanged.
    #[instrument(skip(self, surface, actor, submission), fields(actor_id = %actor.id))]
    pub async fn on_form_submit<S: InteractionSurface>(
        &self,
        surface: &S,
        actor: &Actor,
        session_id: SessionId,
        kind: FormKind,
        submission: &FormSubmission,
    ) -> Result<(), BotError> {
        let result = self.form_submit(surface, actor, session_id, kind, submission).await;
        if let Err(err) = &result {
            self.report(surface, actor.id, None, err).await;
        }
        result
    }

    async fn form_submit<S: InteractionSurface>(
        &self,
        surface: &S,
        actor: &Actor,
        session_id: SessionId,
        kind: FormKind,
        submission: &FormSubmission,
    ) -> Result<(), BotError> {
        let handle = self.sessions.get(session_id).await.ok_or_else(expired)?;
        let mut session = handle.lock().await;
        check_active(&session, actor)?;
        if !steps::accepts(&session, WizardAction::OpenForm(kind)) {
            return Err(stale());
        }

        match kind {
            FormKind::Role => {
                let role_id = gates::parse_role_input(submission.get(screens::ROLE_FIELD))?;
                let role = gates::assignable_role(&self.host, role_id).await?;
                session.current.role_id = Some(role.id);
                session.current.role = Some(role);
                session.step = WizardStep::ConfirmRole;
            }
            FormKind::Face => {
                let face = gates::parse_face_form(submission)?;
                let previous = session.current.clone();
                session.current.label = face.label;
                session.current.emoji = face.emoji;
                session.current.position = face.position;
                if let Err(err) = gates::pass(&mut session, &self.host).await {
                    session.current = previous;
                    return Err(err);
                }
                session.step = WizardStep::Confirm;
            }
        }

        let (screen, rows) = steps::render(&session);
        surface.show_step(screen, rows).await
    }

    async fn advance(&self, session: &mut WizardSession) -> Result<(), BotError> {
        gates::pass(session, &self.host).await?;
        if let Some(next) = session.step.next() {
            session.step = next;
        }
        Ok(())
    }

    /// Tell the actor what went wrong and copy serious failures to the audit
    /// channel.
    async fn report<S: InteractionSurface>(
        &self,
        surface: &S,
        actor: UserId,
        target: Option<&MessageRef>,
        err: &BotError,
    ) {
        if matches!(err, BotError::Generic(_)) {
            capture_for_user(err, actor);
        }
        tracing::warn!(error = %err, kind = err.kind(), "Wizard interaction failed");

        if let Err(reply_err) = surface.reply_ephemeral(screens::error(err)).await {
            tracing::warn!(error = %reply_err, "Failed to show wizard error");
        }
        if err.escalates() {
            self.audit
                .notify(
                    &self.host,
                    audit::interaction_failed(actor, err, target, None),
                )
                .await;
        }
    }
}

fn check_active(session: &WizardSession, actor: &Actor) -> Result<(), BotError> {
    if session.state != SessionState::Active {
        return Err(expired());
    }
    if session.operator.id != actor.id {
        return Err(BotError::Permission(
            "only the moderator who opened this wizard can use it".to_string(),
        ));
    }
    Ok(())
}
