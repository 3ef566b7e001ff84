//! Screen, control and form builders for the wizard.
//!
//! Builders are pure: they read a session and return what to show. The
//! registry in [`super::steps`] decides which builder runs at which step.

use rolebutton_core::{ButtonAction, ButtonStyle, MAX_BUTTONS_PER_ROW, MAX_ROWS};

use super::custom_id::{FormKind, WizardAction, WizardCustomId};
use super::session::WizardSession;
use crate::commit::CommitReport;
use crate::descriptor::ButtonDescriptor;
use crate::error::BotError;
use crate::ui::{ActionRow, Button, Component, Form, FormField, Screen, Tone};

/// Form field carrying the role ID.
pub const ROLE_FIELD: &str = "role_id";
/// Form field carrying the button label.
pub const LABEL_FIELD: &str = "label";
/// Form field carrying the button emoji.
pub const EMOJI_FIELD: &str = "emoji";
/// Form field carrying the one-based row.
pub const ROW_FIELD: &str = "row";

/// Discord's limit on button label length.
const MAX_BUTTON_LABEL: usize = 80;
/// Discord's limit on an embed field value.
const MAX_FIELD_VALUE: usize = 1024;

// =============================================================================
// Step Screens
// =============================================================================

pub fn choose_role(session: &WizardSession) -> Screen {
    let mut screen = step_screen(
        session,
        "Enter the ID of the role this button will manage. In Server Settings → Roles, \
         right-click the role and choose **Copy Role ID**.",
    );

    if let Some(key) = session.current.replaces {
        screen = screen.field("Editing", key.to_string(), false);
    }
    if let Some(role_id) = session.current.role_id {
        screen = screen.field("Current role", format!("<@&{role_id}>"), false);
    }

    if !session.draft.is_empty() {
        screen = listing_fields(screen, "Ready to add", session.draft.iter());
    }
    if !session.existing.is_empty() {
        screen = listing_fields(screen, "Buttons already on this message", &session.existing)
            .footer("Press one of the existing buttons below to edit it instead.");
    }

    screen
}

pub fn choose_role_controls(session: &WizardSession) -> Vec<ActionRow> {
    let mut nav = nav_row(
        session,
        [Button::new(
            button_id(session, WizardAction::OpenForm(FormKind::Role)),
            ButtonStyle::Primary,
            "Enter Role ID",
        )],
        Some("►"),
    );
    if !session.draft.is_empty() {
        nav.components.push(Component::Button(Button::new(
            button_id(session, WizardAction::Review),
            ButtonStyle::Affirmative,
            "Back to review",
        )));
    }
    let mut rows = vec![nav];
    rows.extend(descriptor_rows(
        session,
        &session.existing,
        WizardAction::EditExisting,
    ));
    rows
}

pub fn confirm_role(session: &WizardSession) -> Screen {
    let role = session.current.role.as_ref().map_or_else(
        || "No role selected".to_string(),
        |role| format!("{} (**{}**)", role.mention(), role.name),
    );
    step_screen(
        session,
        format!("This button will manage {role}.\n\nPress ✔ to continue or ◄ to pick another role."),
    )
}

pub fn confirm_role_controls(session: &WizardSession) -> Vec<ActionRow> {
    vec![ActionRow::buttons([
        prev_button(session),
        cancel_button(session),
        Button::new(
            button_id(session, WizardAction::Next),
            ButtonStyle::Affirmative,
            "✔ Confirm",
        ),
    ])]
}

pub fn choose_action(session: &WizardSession) -> Screen {
    let options = ButtonAction::ALL
        .iter()
        .map(|action| format!("**{}**: {}", action.label(), action.describe()))
        .collect::<Vec<_>>()
        .join("\n");
    let mut screen = step_screen(
        session,
        format!("What should happen when someone presses the button?\n\n{options}"),
    );
    if let Some(action) = session.current.action {
        screen = screen.field("Selected", action.label(), true);
    }
    screen
}

pub fn choose_action_controls(session: &WizardSession) -> Vec<ActionRow> {
    let choices = ButtonAction::ALL.map(|action| {
        let style = if session.current.action == Some(action) {
            ButtonStyle::Primary
        } else {
            ButtonStyle::Neutral
        };
        Button::new(
            button_id(session, WizardAction::ChooseAction(action)),
            style,
            action.label(),
        )
    });
    vec![
        ActionRow::buttons(choices),
        nav_row(session, [], Some("►")),
    ]
}

pub fn choose_style(session: &WizardSession) -> Screen {
    let mut screen = step_screen(session, "Pick the colour of the button.");
    if let Some(style) = session.current.style {
        screen = screen.field("Selected", style.display_name(), true);
    }
    screen
}

pub fn choose_style_controls(session: &WizardSession) -> Vec<ActionRow> {
    let choices = ButtonStyle::ALL.map(|style| {
        let short = style
            .display_name()
            .split_once(' ')
            .map_or(style.display_name(), |(name, _)| name);
        Button::new(
            button_id(session, WizardAction::ChooseStyle(style)),
            style,
            short,
        )
    });
    vec![
        ActionRow::buttons(choices),
        nav_row(session, [], Some("►")),
    ]
}

pub fn choose_face(session: &WizardSession) -> Screen {
    let current = &session.current;
    step_screen(
        session,
        "Give the button a label, an emoji, or both. Emoji can be typed directly, as a \
         `:shortcode:`, or as a server emoji like `<:name:id>`. Optionally pick the row \
         (1-4) it goes on.",
    )
    .field(
        "Label",
        current
            .label
            .as_ref()
            .map_or_else(|| "Not set".to_string(), ToString::to_string),
        true,
    )
    .field(
        "Emoji",
        current
            .emoji
            .as_ref()
            .map_or_else(|| "Not set".to_string(), ToString::to_string),
        true,
    )
    .field(
        "Row",
        current
            .position
            .map_or_else(|| "Automatic".to_string(), |row| row.to_string()),
        true,
    )
}

pub fn choose_face_controls(session: &WizardSession) -> Vec<ActionRow> {
    vec![nav_row(
        session,
        [Button::new(
            button_id(session, WizardAction::OpenForm(FormKind::Face)),
            ButtonStyle::Primary,
            "Choose",
        )],
        Some("►"),
    )]
}

pub fn confirm(session: &WizardSession) -> Screen {
    let screen = step_screen(
        session,
        format!(
            "These buttons will be saved to {}. Press **✔ Commit** to save them, \
             **➕ Add Another** to configure another button, or one of the previews \
             below to change it.",
            session.target.jump_url()
        ),
    );
    listing_fields(screen, "Ready to add", session.draft.iter())
}

pub fn confirm_controls(session: &WizardSession) -> Vec<ActionRow> {
    let mut rows = vec![ActionRow::buttons([
        prev_button(session),
        cancel_button(session),
        Button::new(
            button_id(session, WizardAction::AddAnother),
            ButtonStyle::Neutral,
            "➕ Add Another",
        ),
        Button::new(
            button_id(session, WizardAction::Commit),
            ButtonStyle::Affirmative,
            "✔ Commit",
        ),
    ])];
    let staged: Vec<ButtonDescriptor> = session.draft.iter().cloned().collect();
    rows.extend(descriptor_rows(session, &staged, WizardAction::EditDraft));
    rows
}

// =============================================================================
// Terminal Screens
// =============================================================================

/// Shown after the operator cancels. Carries no controls.
#[must_use]
pub fn cancelled() -> Screen {
    Screen::new(
        Tone::Error,
        "❎ **Button creation cancelled**. You can dismiss this message.",
    )
}

/// Shown after a successful commit. Carries no controls.
#[must_use]
pub fn committed(session: &WizardSession, report: &CommitReport) -> Screen {
    let mut screen = Screen::new(
        Tone::Success,
        format!("✅ **Buttons saved to {}**.", session.target.jump_url()),
    );
    for entry in &report.added {
        screen = screen.field("Added", describe(entry), false);
    }
    for entry in &report.updated {
        screen = screen.field("Updated", describe(entry), false);
    }
    screen.footer("You can dismiss this message.")
}

/// Error shown to the acting user.
#[must_use]
pub fn error(err: &BotError) -> Screen {
    Screen::new(Tone::Error, format!("❌ {}", err.user_message()))
}

// =============================================================================
// Forms
// =============================================================================

/// The form opened by a step button.
#[must_use]
pub fn form(session: &WizardSession, kind: FormKind) -> Form {
    match kind {
        FormKind::Role => role_form(session),
        FormKind::Face => face_form(session),
    }
}

fn role_form(session: &WizardSession) -> Form {
    Form {
        custom_id: WizardCustomId::form(session.id, FormKind::Role).to_string(),
        title: "Set Role".to_string(),
        fields: vec![
            FormField::new(ROLE_FIELD, "Enter Role ID", 20)
                .required()
                .placeholder("e.g. 800091021852803072")
                .prefill(session.current.role_id.map(|id| id.to_string())),
        ],
    }
}

fn face_form(session: &WizardSession) -> Form {
    let current = &session.current;
    Form {
        custom_id: WizardCustomId::form(session.id, FormKind::Face).to_string(),
        title: "Set Label & Emoji".to_string(),
        fields: vec![
            FormField::new(LABEL_FIELD, "Label", 80)
                .placeholder("The text that will appear on your button.")
                .prefill(current.label.as_ref().map(ToString::to_string)),
            FormField::new(EMOJI_FIELD, "Emoji", 60)
                .placeholder("The emoji that will appear on your button.")
                .prefill(current.emoji.as_ref().map(ToString::to_string)),
            FormField::new(ROW_FIELD, "Row (1-4)", 1)
                .placeholder("Leave blank to place it automatically.")
                .prefill(current.position.map(|row| (row.index() + 1).to_string())),
        ],
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn button_id(session: &WizardSession, action: WizardAction) -> String {
    WizardCustomId::button(session.id, action).to_string()
}

fn step_screen(session: &WizardSession, description: impl Into<String>) -> Screen {
    let step = session.step;
    Screen::new(Tone::Question, description).title(format!(
        "Step {} of 6: {}",
        step.index() + 1,
        step.definition().title
    ))
}

fn prev_button(session: &WizardSession) -> Button {
    Button::new(
        button_id(session, WizardAction::Prev),
        ButtonStyle::Neutral,
        "◄",
    )
    .disabled(session.step.prev().is_none())
}

fn cancel_button(session: &WizardSession) -> Button {
    Button::new(
        button_id(session, WizardAction::Cancel),
        ButtonStyle::Destructive,
        "✗",
    )
}

/// Prev, cancel, any step-specific buttons, then next.
fn nav_row<const N: usize>(
    session: &WizardSession,
    extra: [Button; N],
    next_label: Option<&str>,
) -> ActionRow {
    let mut buttons = vec![prev_button(session), cancel_button(session)];
    buttons.extend(extra);
    if let Some(label) = next_label {
        buttons.push(Button::new(
            button_id(session, WizardAction::Next),
            ButtonStyle::Neutral,
            label,
        ));
    }
    ActionRow::buttons(buttons)
}

/// Preview buttons for descriptors, five per row, at most four rows.
fn descriptor_rows(
    session: &WizardSession,
    descriptors: &[ButtonDescriptor],
    action: fn(usize) -> WizardAction,
) -> Vec<ActionRow> {
    let buttons: Vec<Button> = descriptors
        .iter()
        .take(MAX_ROWS * MAX_BUTTONS_PER_ROW)
        .enumerate()
        .map(|(i, descriptor)| {
            let label = match &descriptor.label {
                Some(label) => truncate(label.as_str(), MAX_BUTTON_LABEL),
                None if descriptor.emoji.is_none() => format!("Button {}", i + 1),
                None => String::new(),
            };
            let mut button = Button::new(
                button_id(session, action(i)),
                descriptor.style.unwrap_or(ButtonStyle::Neutral),
                label,
            );
            if button.label.as_deref() == Some("") {
                button.label = None;
            }
            if let Some(emoji) = &descriptor.emoji {
                button = button.with_emoji(emoji);
            }
            button
        })
        .collect();

    buttons
        .chunks(MAX_BUTTONS_PER_ROW)
        .map(|chunk| ActionRow::buttons(chunk.to_vec()))
        .collect()
}

/// One-line description of a descriptor for embed fields.
fn describe(descriptor: &ButtonDescriptor) -> String {
    let role = descriptor
        .role_id
        .map_or_else(|| "no role".to_string(), |id| format!("<@&{id}>"));
    let action = descriptor.action.map_or("No action", ButtonAction::label);
    let row = descriptor
        .position
        .map_or_else(|| "automatic row".to_string(), |row| row.to_string());
    format!(
        "{}: **{action}** {role} ({row})",
        descriptor.display_name()
    )
}

/// Numbered one-line descriptions, packed into as many fields as it takes to
/// keep each under Discord's field limit.
fn listing_fields<'a>(
    mut screen: Screen,
    name: &str,
    descriptors: impl IntoIterator<Item = &'a ButtonDescriptor>,
) -> Screen {
    let mut chunks: Vec<String> = Vec::new();
    for (i, descriptor) in descriptors.into_iter().enumerate() {
        let line = truncate(
            &format!("{}. {}", i + 1, describe(descriptor)),
            MAX_FIELD_VALUE,
        );
        match chunks.last_mut() {
            Some(chunk) if chunk.chars().count() + 1 + line.chars().count() <= MAX_FIELD_VALUE => {
                chunk.push('\n');
                chunk.push_str(&line);
            }
            _ => chunks.push(line),
        }
    }

    for (i, chunk) in chunks.into_iter().enumerate() {
        let title = if i == 0 {
            name.to_string()
        } else {
            format!("{name} (continued)")
        };
        screen = screen.field(title, chunk, false);
    }
    screen
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
