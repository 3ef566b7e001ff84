//! Input parsing and the preconditions for leaving each step.

use rolebutton_core::{ButtonEmoji, ButtonLabel, RoleId, RowPosition};

use super::draft::check_conflict;
use super::screens::{EMOJI_FIELD, LABEL_FIELD, ROW_FIELD};
use super::session::WizardSession;
use super::steps::Gate;
use crate::error::BotError;
use crate::host::{PermissionHost, Role};
use crate::ui::FormSubmission;

/// Resolve a role and check the bot may hand it out.
///
/// Resolution happens against the live role list every time; a role that was
/// assignable when a button was created may have moved above the bot since.
///
/// # Errors
///
/// - `BotError::NotFound` if the role does not exist
/// - `BotError::Permission` if the role is managed by an integration or sits
///   at or above the bot's highest role
pub async fn assignable_role<H: PermissionHost>(host: &H, role_id: RoleId) -> Result<Role, BotError> {
    let role = host
        .resolve_role(role_id)
        .await?
        .ok_or_else(|| BotError::NotFound(format!("role {role_id} does not exist")))?;

    if role.managed {
        return Err(BotError::Permission(format!(
            "{} is managed by an integration and cannot be assigned",
            role.mention()
        )));
    }
    if !host.agent_outranks(&role).await? {
        return Err(BotError::Permission(format!(
            "{} is at or above my highest role, so I cannot assign it",
            role.mention()
        )));
    }
    Ok(role)
}

/// Parse the role form's input as a snowflake.
///
/// # Errors
///
/// Returns `BotError::Validation` if the input is blank or not a role ID.
pub fn parse_role_input(input: Option<&str>) -> Result<RoleId, BotError> {
    let input = input.ok_or_else(|| BotError::Validation("Enter a role ID.".to_string()))?;
    let digits = input
        .strip_prefix("<@&")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(input);
    match digits.parse::<RoleId>() {
        Ok(id) if id.get() != 0 => Ok(id),
        _ => Err(BotError::Validation(format!(
            "`{input}` is not a role ID. Role IDs are long numbers like 800091021852803072."
        ))),
    }
}

/// Parsed label, emoji and row from the face form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceInput {
    pub label: Option<ButtonLabel>,
    pub emoji: Option<ButtonEmoji>,
    pub position: Option<RowPosition>,
}

/// Parse the face form. Nothing is applied unless every field is valid.
///
/// # Errors
///
/// Returns `BotError::Validation` if both label and emoji are blank, or any
/// field fails to parse.
pub fn parse_face_form(submission: &FormSubmission) -> Result<FaceInput, BotError> {
    let label = submission
        .get(LABEL_FIELD)
        .map(ButtonLabel::parse)
        .transpose()
        .map_err(|e| BotError::Validation(format!("Invalid label: {e}.")))?;
    let emoji = submission
        .get(EMOJI_FIELD)
        .map(ButtonEmoji::parse)
        .transpose()
        .map_err(|e| BotError::Validation(format!("Invalid emoji: {e}.")))?;
    let position = submission
        .get(ROW_FIELD)
        .map(RowPosition::parse_one_based)
        .transpose()
        .map_err(|e| BotError::Validation(format!("Invalid row: {e}.")))?;

    if label.is_none() && emoji.is_none() {
        return Err(BotError::Validation(
            "You must give the button *at least one* of either **label** or **emoji**."
                .to_string(),
        ));
    }

    Ok(FaceInput {
        label,
        emoji,
        position,
    })
}

/// Check the current step's gate and apply its side effects.
///
/// # Errors
///
/// Returns the gate's failure. The session is left unchanged on error.
pub async fn pass<H: PermissionHost>(session: &mut WizardSession, host: &H) -> Result<(), BotError> {
    match session.step.definition().gate {
        Gate::Open | Gate::Terminal => Ok(()),
        Gate::AssignableRole => {
            let role_id = session
                .current
                .role_id
                .ok_or_else(|| BotError::Validation("Enter a role ID first.".to_string()))?;
            let role = assignable_role(host, role_id).await?;
            session.current.role = Some(role);
            Ok(())
        }
        Gate::ActionChosen => session.current.action.map(|_| ()).ok_or_else(|| {
            BotError::Validation("Choose what the button does first.".to_string())
        }),
        Gate::StyleChosen => session
            .current
            .style
            .map(|_| ())
            .ok_or_else(|| BotError::Validation("Choose a colour first.".to_string())),
        Gate::FaceChosen => {
            if !session.current.has_face() {
                return Err(BotError::Validation(
                    "You must give the button *at least one* of either **label** or **emoji**."
                        .to_string(),
                ));
            }
            check_conflict(session.existing_except(&session.current), &session.current)?;
            let staged = session.current.clone();
            session.draft.upsert(staged)
        }
    }
}
