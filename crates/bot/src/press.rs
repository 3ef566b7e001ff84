//! Handling presses on persistent role buttons.
//!
//! Everything needed to act on a press is encoded in the button's custom ID,
//! so presses keep working across restarts. The role is re-resolved on every
//! press; the bot never trusts what it knew when the button was created.

use std::time::Duration;

use rolebutton_core::{ButtonAction, RoleButtonId, RoleId};
use tracing::instrument;

use crate::audit::{self, AuditChannel};
use crate::error::{BotError, capture_for_user};
use crate::host::{Actor, Host, InteractionSurface, MessageRef, Role};
use crate::ui::{Screen, Tone};
use crate::wizard::gates::assignable_role;
use crate::wizard::screens;

/// What a press did to the member's roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    Added,
    AlreadyHad,
    Removed,
    AlreadyLacked,
}

impl PressOutcome {
    /// The outcome of pressing `action` for a member who `has` the role.
    #[must_use]
    pub const fn decide(action: ButtonAction, has: bool) -> Self {
        match (action, has) {
            (ButtonAction::Grant | ButtonAction::Toggle, false) => Self::Added,
            (ButtonAction::Grant, true) => Self::AlreadyHad,
            (ButtonAction::Revoke | ButtonAction::Toggle, true) => Self::Removed,
            (ButtonAction::Revoke, false) => Self::AlreadyLacked,
        }
    }

    /// Reply shown to the member.
    #[must_use]
    pub fn message(self, role: &Role) -> String {
        let name = &role.name;
        match self {
            Self::Added => format!("✅ You now have the **{name}** role."),
            Self::Removed => format!("✅ The **{name}** role has been removed."),
            Self::AlreadyHad => format!("You already have the **{name}** role."),
            Self::AlreadyLacked => {
                format!("You don't have the **{name}** role, so there was nothing to remove.")
            }
        }
    }
}

/// A completed press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Press {
    pub role: Role,
    pub outcome: PressOutcome,
}

/// Applies role button presses.
#[derive(Debug, Clone)]
pub struct PressHandler<H> {
    host: H,
    audit: AuditChannel,
    timeout: Duration,
}

impl<H: Host> PressHandler<H> {
    #[must_use]
    pub const fn new(host: H, audit: AuditChannel, timeout: Duration) -> Self {
        Self {
            host,
            audit,
            timeout,
        }
    }

    /// Handle one press end to end, replying to the member.
    ///
    /// The reply is always sent; the returned result is for logging and
    /// tests.
    ///
    /// # Errors
    ///
    /// Returns the failure that was reported to the member.
    #[instrument(skip(self, surface, user), fields(user_id = %user.id))]
    pub async fn handle<S: InteractionSurface>(
        &self,
        surface: &S,
        user: &Actor,
        message: MessageRef,
        custom_id: &str,
    ) -> Result<Press, BotError> {
        let id = match RoleButtonId::parse(custom_id) {
            Ok(id) => id,
            Err(e) => {
                let err = BotError::Validation(format!("This button is broken: {e}."));
                if let Err(reply_err) = surface.reply_ephemeral(screens::error(&err)).await {
                    tracing::warn!(error = %reply_err, "Failed to reply to broken button press");
                }
                return Err(err);
            }
        };

        surface.defer_ephemeral().await?;

        let timed = tokio::time::timeout(self.timeout, self.apply(user, id)).await;
        let timed_out = timed.is_err();
        let result = match timed {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(role_id = %id.role_id, "Role button press timed out");
                self.audit
                    .notify(
                        &self.host,
                        audit::press_timed_out(user.id, id.role_id, &message, self.timeout),
                    )
                    .await;
                Err(BotError::HostTransport(
                    "Discord took too long to respond. Try again in a moment.".to_string(),
                ))
            }
        };

        let reply = match &result {
            Ok(press) => Screen::new(
                if matches!(press.outcome, PressOutcome::Added | PressOutcome::Removed) {
                    Tone::Success
                } else {
                    Tone::Question
                },
                press.outcome.message(&press.role),
            ),
            Err(err) => {
                if matches!(err, BotError::Generic(_)) {
                    capture_for_user(err, user.id);
                }
                // Timeouts were already reported above.
                if err.escalates() && !timed_out {
                    self.audit
                        .notify(
                            &self.host,
                            audit::interaction_failed(user.id, err, Some(&message), Some(id.role_id)),
                        )
                        .await;
                }
                screens::error(err)
            }
        };

        if let Err(e) = surface.edit_reply(reply).await {
            tracing::warn!(error = %e, "Failed to deliver role button reply");
        }
        result
    }

    async fn apply(&self, user: &Actor, id: RoleButtonId) -> Result<Press, BotError> {
        let role = assignable_role(&self.host, id.role_id).await?;
        let has = self.host.member_has_role(user.id, role.id).await?;
        let outcome = PressOutcome::decide(id.action, has);

        match outcome {
            PressOutcome::Added => {
                self.host
                    .add_member_role(user.id, role.id, &reason(id.role_id, id.action))
                    .await?;
            }
            PressOutcome::Removed => {
                self.host
                    .remove_member_role(user.id, role.id, &reason(id.role_id, id.action))
                    .await?;
            }
            PressOutcome::AlreadyHad | PressOutcome::AlreadyLacked => {}
        }

        tracing::info!(role_id = %role.id, outcome = ?outcome, "Role button pressed");
        Ok(Press { role, outcome })
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }
}

fn reason(role_id: RoleId, action: ButtonAction) -> String {
    format!("Role button ({action}) for role {role_id}")
}
