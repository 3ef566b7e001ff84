//! End-to-end tests for the role button wizard.
//!
//! Each test drives a wizard against an in-memory guild the way Discord
//! would: one surface per interaction, forms submitted by custom ID.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use rolebutton_bot::descriptor::ButtonDescriptor;
use rolebutton_bot::error::BotError;
use rolebutton_bot::ui::{ActionRow, Button, Component, FormSubmission};
use rolebutton_bot::wizard::{
    FormKind, SessionId, SessionState, WizardAction, WizardCustomId, WizardEngine, WizardStep,
    decode_existing,
};
use rolebutton_core::{ButtonAction, ButtonLabel, ButtonStyle, RoleId, RowPosition, UserId};
use rolebutton_integration_tests::{
    FakeGuild, FakeSurface, MESSAGE, MOD_ROLE, SurfaceEvent, actor, moderator, target, wizard,
};

const TEAM: RoleId = RoleId::new(42);
const SEVEN: RoleId = RoleId::new(7);

async fn press(engine: &WizardEngine<FakeGuild>, id: SessionId, action: WizardAction) -> FakeSurface {
    let surface = FakeSurface::new();
    engine
        .on_step_button(&surface, &moderator(), id, action)
        .await
        .expect("step button accepted");
    surface
}

async fn submit(
    engine: &WizardEngine<FakeGuild>,
    id: SessionId,
    kind: FormKind,
    fields: &[(&str, &str)],
) -> Result<FakeSurface, BotError> {
    let surface = FakeSurface::new();
    let submission = FormSubmission::from_pairs(fields.iter().copied());
    engine
        .on_form_submit(&surface, &moderator(), id, kind, &submission)
        .await
        .map(|()| surface)
}

async fn step(engine: &WizardEngine<FakeGuild>, id: SessionId) -> WizardStep {
    let handle = engine.sessions().get(id).await.expect("session alive");
    let session = handle.lock().await;
    session.step
}

fn title(surface: &FakeSurface) -> String {
    surface
        .last_step()
        .and_then(|(screen, _)| screen.title)
        .unwrap_or_default()
}

fn first_button(rows: &[ActionRow]) -> Button {
    rows.first()
        .and_then(|row| row.components.first())
        .and_then(Component::as_button)
        .cloned()
        .expect("a button")
}

/// Open a wizard and walk it to the face step for `role`.
async fn walk_to_face(
    engine: &WizardEngine<FakeGuild>,
    role: RoleId,
    action: ButtonAction,
    style: ButtonStyle,
) -> SessionId {
    let id = engine
        .open(&FakeSurface::new(), moderator(), target())
        .await
        .expect("open");
    let role_id = role.to_string();
    submit(engine, id, FormKind::Role, &[("role_id", role_id.as_str())])
        .await
        .expect("role accepted");
    press(engine, id, WizardAction::Next).await;
    press(engine, id, WizardAction::ChooseAction(action)).await;
    press(engine, id, WizardAction::ChooseStyle(style)).await;
    assert_eq!(step(engine, id).await, WizardStep::ChooseFace);
    id
}

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn test_add_grant_button_end_to_end() {
    let guild = FakeGuild::new().with_role(TEAM, "Team", 3);
    let engine = wizard(&guild);

    let opened = FakeSurface::new();
    let id = engine
        .open(&opened, moderator(), target())
        .await
        .expect("open");
    assert!(matches!(
        opened.events().first(),
        Some(SurfaceEvent::SendStep(..))
    ));
    assert_eq!(title(&opened), "Step 1 of 6: Choose a role");

    let form = press(&engine, id, WizardAction::OpenForm(FormKind::Role))
        .await
        .last_form()
        .expect("role form");
    assert_eq!(form.title, "Set Role");
    assert_eq!(
        form.custom_id,
        WizardCustomId::form(id, FormKind::Role).to_string()
    );

    let confirmed = submit(&engine, id, FormKind::Role, &[("role_id", "42")])
        .await
        .expect("role accepted");
    let (screen, _) = confirmed.last_step().expect("confirm step");
    assert!(screen.description.contains("<@&42>"));
    assert!(screen.description.contains("**Team**"));

    let action = press(&engine, id, WizardAction::Next).await;
    assert_eq!(title(&action), "Step 3 of 6: Choose what the button does");

    press(&engine, id, WizardAction::ChooseAction(ButtonAction::Grant)).await;
    let face = press(&engine, id, WizardAction::ChooseStyle(ButtonStyle::Primary)).await;
    assert_eq!(title(&face), "Step 5 of 6: Choose a label and emoji");

    let review = submit(
        &engine,
        id,
        FormKind::Face,
        &[("label", "Join Team"), ("emoji", ""), ("row", "")],
    )
    .await
    .expect("face accepted");
    let (screen, rows) = review.last_step().expect("review step");
    assert_eq!(screen.title.as_deref(), Some("Step 6 of 6: Review and commit"));
    assert_eq!(rows.len(), 2, "nav row plus one preview row");

    let done = press(&engine, id, WizardAction::Commit).await;
    let (screen, rows) = done.last_step().expect("committed screen");
    assert!(screen.description.contains("Buttons saved"));
    assert!(rows.is_empty());

    let controls = guild.controls(MESSAGE);
    assert_eq!(controls.len(), 1);
    let button = first_button(&controls);
    assert_eq!(button.custom_id, "button:role:42:message:3:action:give");
    assert_eq!(button.style, ButtonStyle::Primary.code());
    assert_eq!(button.label.as_deref(), Some("Join Team"));
    assert_eq!(button.emoji, None);

    let decoded = decode_existing(target(), &controls);
    let reopened = decoded.first().expect("decoded button");
    assert_eq!(reopened.role_id, Some(TEAM));
    assert_eq!(reopened.action, Some(ButtonAction::Grant));
    assert_eq!(reopened.style, Some(ButtonStyle::Primary));
    assert_eq!(reopened.label.as_ref().map(ButtonLabel::as_str), Some("Join Team"));
    assert_eq!(reopened.emoji, None);
    assert_eq!(reopened.position.map(RowPosition::index), Some(0));

    let audit = guild.audit_log();
    assert_eq!(audit.len(), 1);
    assert!(
        audit
            .first()
            .unwrap()
            .description
            .starts_with("<@100> added a **Give** button for <@&42>")
    );

    assert!(engine.sessions().get(id).await.is_none());
}

#[tokio::test]
async fn test_add_another_stages_two_buttons_in_one_edit() {
    let guild = FakeGuild::new()
        .with_role(TEAM, "Team", 3)
        .with_role(SEVEN, "Seven", 2);
    let engine = wizard(&guild);

    let id = walk_to_face(&engine, TEAM, ButtonAction::Toggle, ButtonStyle::Primary).await;
    submit(&engine, id, FormKind::Face, &[("label", "Team")])
        .await
        .expect("first face");

    press(&engine, id, WizardAction::AddAnother).await;
    assert_eq!(step(&engine, id).await, WizardStep::ChooseRole);
    {
        let handle = engine.sessions().get(id).await.expect("session");
        let session = handle.lock().await;
        assert_eq!(session.draft.len(), 1);
        assert_eq!(session.current.role_id, None);
        assert_eq!(session.current.action, None);
    }

    submit(&engine, id, FormKind::Role, &[("role_id", "<@&7>")])
        .await
        .expect("second role");
    press(&engine, id, WizardAction::Next).await;
    press(&engine, id, WizardAction::ChooseAction(ButtonAction::Revoke)).await;
    press(&engine, id, WizardAction::ChooseStyle(ButtonStyle::Destructive)).await;
    submit(&engine, id, FormKind::Face, &[("emoji", ":wave:"), ("row", "2")])
        .await
        .expect("second face");

    press(&engine, id, WizardAction::Commit).await;

    assert_eq!(guild.edit_count(), 1);
    let controls = guild.controls(MESSAGE);
    assert_eq!(controls.len(), 2);
    assert_eq!(
        first_button(&controls).custom_id,
        "button:role:42:message:3:action:toggle"
    );
    let second = first_button(controls.get(1..).unwrap());
    assert_eq!(second.custom_id, "button:role:7:message:3:action:take");
    assert_eq!(second.label, None);
    assert_eq!(guild.audit_log().len(), 2);
}

#[tokio::test]
async fn test_edit_existing_button_in_place() {
    let existing = ButtonDescriptor::builder(target())
        .role_id(SEVEN)
        .action(ButtonAction::Grant)
        .style(ButtonStyle::Primary)
        .label(ButtonLabel::parse("Seven").unwrap())
        .build()
        .to_control()
        .unwrap();
    let guild = FakeGuild::new()
        .with_role(SEVEN, "Seven", 2)
        .with_message(MESSAGE, vec![ActionRow::buttons([existing.clone()])]);
    let engine = wizard(&guild);

    let opened = FakeSurface::new();
    let id = engine
        .open(&opened, moderator(), target())
        .await
        .expect("open");
    let (_, rows) = opened.last_step().expect("first step");
    let preview = first_button(rows.get(1..).unwrap());
    assert_eq!(preview.label.as_deref(), Some("Seven"));
    assert_eq!(
        preview.custom_id,
        WizardCustomId::button(id, WizardAction::EditExisting(0)).to_string()
    );

    press(&engine, id, WizardAction::EditExisting(0)).await;
    press(&engine, id, WizardAction::Next).await;
    assert_eq!(step(&engine, id).await, WizardStep::ConfirmRole);
    press(&engine, id, WizardAction::Next).await;
    press(&engine, id, WizardAction::ChooseAction(ButtonAction::Grant)).await;
    press(&engine, id, WizardAction::ChooseStyle(ButtonStyle::Destructive)).await;
    submit(&engine, id, FormKind::Face, &[("label", "Seven!")])
        .await
        .expect("face");
    press(&engine, id, WizardAction::Commit).await;

    let controls = guild.controls(MESSAGE);
    assert_eq!(controls.len(), 1);
    assert_eq!(controls.first().unwrap().components.len(), 1);
    let button = first_button(&controls);
    assert_eq!(button.custom_id, existing.custom_id);
    assert_eq!(button.style, ButtonStyle::Destructive.code());
    assert_eq!(button.label.as_deref(), Some("Seven!"));

    let audit = guild.audit_log();
    assert_eq!(audit.len(), 1);
    assert!(audit.first().unwrap().description.contains("updated a **Give** button"));
}

#[tokio::test]
async fn test_back_to_review_after_add_another() {
    let guild = FakeGuild::new().with_role(TEAM, "Team", 3);
    let engine = wizard(&guild);

    let id = walk_to_face(&engine, TEAM, ButtonAction::Grant, ButtonStyle::Primary).await;
    submit(&engine, id, FormKind::Face, &[("label", "Team")])
        .await
        .expect("face");

    let restarted = press(&engine, id, WizardAction::AddAnother).await;
    let (screen, rows) = restarted.last_step().expect("first step");
    assert!(screen.fields.iter().any(|f| f.name == "Ready to add"));
    let review = WizardCustomId::button(id, WizardAction::Review).to_string();
    assert!(
        rows.iter()
            .flat_map(|row| &row.components)
            .filter_map(Component::as_button)
            .any(|button| button.custom_id == review)
    );

    let back = press(&engine, id, WizardAction::Review).await;
    assert_eq!(title(&back), "Step 6 of 6: Review and commit");
    {
        let handle = engine.sessions().get(id).await.expect("session");
        let session = handle.lock().await;
        assert_eq!(session.draft.len(), 1);
        assert_eq!(session.current.role_id, None);
    }

    press(&engine, id, WizardAction::Commit).await;
    let controls = guild.controls(MESSAGE);
    assert_eq!(
        first_button(&controls).custom_id,
        "button:role:42:message:3:action:give"
    );
    assert_eq!(guild.edit_count(), 1);
}

#[tokio::test]
async fn test_edit_draft_entry_restages_in_place() {
    let guild = FakeGuild::new().with_role(TEAM, "Team", 3);
    let engine = wizard(&guild);

    let id = walk_to_face(&engine, TEAM, ButtonAction::Toggle, ButtonStyle::Primary).await;
    submit(&engine, id, FormKind::Face, &[("label", "Team")])
        .await
        .expect("face");
    let staged_id = {
        let handle = engine.sessions().get(id).await.expect("session");
        let session = handle.lock().await;
        session.draft.get(0).expect("staged").session_id
    };

    press(&engine, id, WizardAction::EditDraft(0)).await;
    {
        let handle = engine.sessions().get(id).await.expect("session");
        let session = handle.lock().await;
        assert_eq!(session.step, WizardStep::ChooseRole);
        assert_eq!(session.current.role_id, Some(TEAM));
        assert_eq!(session.current.session_id, staged_id);
    }

    press(&engine, id, WizardAction::Next).await;
    press(&engine, id, WizardAction::Next).await;
    press(&engine, id, WizardAction::ChooseAction(ButtonAction::Toggle)).await;
    press(&engine, id, WizardAction::ChooseStyle(ButtonStyle::Destructive)).await;
    submit(&engine, id, FormKind::Face, &[("label", "Team!")])
        .await
        .expect("same role and action is not a conflict with itself");

    {
        let handle = engine.sessions().get(id).await.expect("session");
        let session = handle.lock().await;
        assert_eq!(session.step, WizardStep::Confirm);
        assert_eq!(session.draft.len(), 1);
        let entry = session.draft.get(0).unwrap();
        assert_eq!(entry.label.as_ref().map(ButtonLabel::as_str), Some("Team!"));
        assert_eq!(entry.style, Some(ButtonStyle::Destructive));
    }

    press(&engine, id, WizardAction::Commit).await;
    let controls = guild.controls(MESSAGE);
    assert_eq!(controls.first().unwrap().components.len(), 1);
    let button = first_button(&controls);
    assert_eq!(button.label.as_deref(), Some("Team!"));
    assert_eq!(button.style, ButtonStyle::Destructive.code());
}

#[tokio::test]
async fn test_failed_commit_keeps_the_draft() {
    let guild = FakeGuild::new().with_role(TEAM, "Team", 3);
    let engine = wizard(&guild);

    let id = walk_to_face(&engine, TEAM, ButtonAction::Grant, ButtonStyle::Primary).await;
    submit(&engine, id, FormKind::Face, &[("label", "Join")])
        .await
        .expect("face");

    guild.fail_edits();
    let surface = FakeSurface::new();
    let result = engine
        .on_step_button(&surface, &moderator(), id, WizardAction::Commit)
        .await;
    assert!(matches!(result, Err(BotError::HostTransport(_))));
    assert!(surface.last_reply().unwrap().description.starts_with("❌"));
    assert!(guild.controls(MESSAGE).is_empty());
    {
        let handle = engine.sessions().get(id).await.expect("session kept");
        let session = handle.lock().await;
        assert_eq!(session.state, SessionState::Active);
        assert_eq!(session.step, WizardStep::Confirm);
        assert_eq!(session.draft.len(), 1);
    }

    guild.restore_edits();
    press(&engine, id, WizardAction::Commit).await;
    assert_eq!(guild.controls(MESSAGE).len(), 1);
    assert!(engine.sessions().get(id).await.is_none());
}

#[tokio::test]
async fn test_session_survives_a_pause_between_steps() {
    let guild = FakeGuild::new().with_role(TEAM, "Team", 3);
    let engine = wizard(&guild);
    let id = engine
        .open(&FakeSurface::new(), moderator(), target())
        .await
        .expect("open");

    tokio::time::sleep(Duration::from_millis(600)).await;

    let form = press(&engine, id, WizardAction::OpenForm(FormKind::Role)).await;
    assert!(form.last_form().is_some());
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_concurrent_submits_on_one_session_apply_once() {
    let guild = FakeGuild::new().with_role(TEAM, "Team", 3);
    let engine = wizard(&guild);
    let id = engine
        .open(&FakeSurface::new(), moderator(), target())
        .await
        .expect("open");
    guild.stall_role_lookups(Duration::from_millis(50));

    let (first, second) = tokio::join!(
        submit(&engine, id, FormKind::Role, &[("role_id", "42")]),
        submit(&engine, id, FormKind::Role, &[("role_id", "42")]),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    let rejected = results.iter().find_map(|result| result.as_ref().err()).unwrap();
    assert!(matches!(rejected, BotError::Validation(_)));
    assert!(rejected.to_string().contains("earlier step"));
    assert_eq!(step(&engine, id).await, WizardStep::ConfirmRole);
}

// =============================================================================
// Cancel and Stale Controls
// =============================================================================

#[tokio::test]
async fn test_cancel_discards_without_touching_message() {
    let guild = FakeGuild::new().with_role(TEAM, "Team", 3);
    let engine = wizard(&guild);

    let id = engine
        .open(&FakeSurface::new(), moderator(), target())
        .await
        .expect("open");
    submit(&engine, id, FormKind::Role, &[("role_id", "42")])
        .await
        .expect("role");
    press(&engine, id, WizardAction::Next).await;
    assert_eq!(step(&engine, id).await, WizardStep::ChooseAction);

    let cancelled = press(&engine, id, WizardAction::Cancel).await;
    let (screen, rows) = cancelled.last_step().expect("cancelled screen");
    assert!(screen.description.contains("cancelled"));
    assert!(rows.is_empty());
    assert_eq!(guild.edit_count(), 0);
    assert!(guild.audit_log().is_empty());

    let late = FakeSurface::new();
    let result = engine
        .on_step_button(&late, &moderator(), id, WizardAction::Next)
        .await;
    assert!(matches!(result, Err(BotError::NotFound(_))));
    assert!(late.last_reply().unwrap().description.contains("expired"));
}

#[tokio::test]
async fn test_control_from_earlier_step_is_rejected() {
    let guild = FakeGuild::new().with_role(TEAM, "Team", 3);
    let engine = wizard(&guild);

    let id = engine
        .open(&FakeSurface::new(), moderator(), target())
        .await
        .expect("open");
    submit(&engine, id, FormKind::Role, &[("role_id", "42")])
        .await
        .expect("role");
    press(&engine, id, WizardAction::Next).await;

    let surface = FakeSurface::new();
    let result = engine
        .on_step_button(&surface, &moderator(), id, WizardAction::OpenForm(FormKind::Role))
        .await;
    assert!(matches!(result, Err(BotError::Validation(_))));
    assert!(surface.last_form().is_none());
    assert!(
        surface
            .last_reply()
            .unwrap()
            .description
            .contains("earlier step")
    );
    assert_eq!(step(&engine, id).await, WizardStep::ChooseAction);
}

#[tokio::test]
async fn test_prev_is_disabled_on_first_step() {
    let guild = FakeGuild::new();
    let engine = wizard(&guild);
    let id = engine
        .open(&FakeSurface::new(), moderator(), target())
        .await
        .expect("open");

    let result = engine
        .on_step_button(&FakeSurface::new(), &moderator(), id, WizardAction::Prev)
        .await;
    assert!(matches!(result, Err(BotError::Validation(_))));
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_two_glyph_emoji_leaves_fields_unchanged() {
    let guild = FakeGuild::new().with_role(TEAM, "Team", 3);
    let engine = wizard(&guild);

    let id = walk_to_face(&engine, TEAM, ButtonAction::Grant, ButtonStyle::Primary).await;
    submit(&engine, id, FormKind::Face, &[("label", "Join"), ("emoji", "🎢")])
        .await
        .expect("first face");
    press(&engine, id, WizardAction::Prev).await;
    assert_eq!(step(&engine, id).await, WizardStep::ChooseFace);

    let surface = FakeSurface::new();
    let submission = FormSubmission::from_pairs([("label", "Other"), ("emoji", "🎢🎡")]);
    let result = engine
        .on_form_submit(&surface, &moderator(), id, FormKind::Face, &submission)
        .await;
    assert!(matches!(result, Err(BotError::Validation(_))));
    assert!(
        surface
            .last_reply()
            .unwrap()
            .description
            .contains("Invalid emoji")
    );

    let handle = engine.sessions().get(id).await.expect("session");
    let session = handle.lock().await;
    assert_eq!(session.step, WizardStep::ChooseFace);
    assert_eq!(session.current.label.as_ref().map(ButtonLabel::as_str), Some("Join"));
    assert_eq!(
        session.current.emoji.as_ref().map(ToString::to_string).as_deref(),
        Some("🎢")
    );
    assert_eq!(session.draft.len(), 1);
}

#[tokio::test]
async fn test_blank_face_is_rejected() {
    let guild = FakeGuild::new().with_role(TEAM, "Team", 3);
    let engine = wizard(&guild);
    let id = walk_to_face(&engine, TEAM, ButtonAction::Grant, ButtonStyle::Primary).await;

    let result = submit(&engine, id, FormKind::Face, &[("label", " "), ("emoji", "")]).await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("at least one"));
    assert_eq!(step(&engine, id).await, WizardStep::ChooseFace);
}

#[tokio::test]
async fn test_next_without_role_is_rejected() {
    let guild = FakeGuild::new();
    let engine = wizard(&guild);
    let id = engine
        .open(&FakeSurface::new(), moderator(), target())
        .await
        .expect("open");

    let result = engine
        .on_step_button(&FakeSurface::new(), &moderator(), id, WizardAction::Next)
        .await;
    assert!(matches!(result, Err(BotError::Validation(_))));
    assert_eq!(step(&engine, id).await, WizardStep::ChooseRole);
}

#[tokio::test]
async fn test_duplicate_role_and_action_is_rejected_at_face_step() {
    let existing = ButtonDescriptor::builder(target())
        .role_id(SEVEN)
        .action(ButtonAction::Grant)
        .style(ButtonStyle::Primary)
        .label(ButtonLabel::parse("Seven").unwrap())
        .build()
        .to_control()
        .unwrap();
    let guild = FakeGuild::new()
        .with_role(SEVEN, "Seven", 2)
        .with_message(MESSAGE, vec![ActionRow::buttons([existing])]);
    let engine = wizard(&guild);

    let id = walk_to_face(&engine, SEVEN, ButtonAction::Grant, ButtonStyle::Affirmative).await;
    let err = submit(&engine, id, FormKind::Face, &[("label", "Again")])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    let handle = engine.sessions().get(id).await.expect("session");
    let session = handle.lock().await;
    assert!(session.draft.is_empty());
    assert_eq!(session.current.label, None);
}

// =============================================================================
// Role Checks
// =============================================================================

#[tokio::test]
async fn test_role_above_bot_is_refused() {
    let admins = RoleId::new(43);
    let guild = FakeGuild::new().with_role(admins, "Admins", 20);
    let engine = wizard(&guild);
    let id = engine
        .open(&FakeSurface::new(), moderator(), target())
        .await
        .expect("open");

    let err = submit(&engine, id, FormKind::Role, &[("role_id", "43")])
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::Permission(_)));
    assert_eq!(step(&engine, id).await, WizardStep::ChooseRole);
    assert_eq!(guild.audit_log().len(), 1);
}

#[tokio::test]
async fn test_managed_role_is_refused() {
    let booster = RoleId::new(44);
    let guild = FakeGuild::new().with_managed_role(booster, "Server Booster", 1);
    let engine = wizard(&guild);
    let id = engine
        .open(&FakeSurface::new(), moderator(), target())
        .await
        .expect("open");

    let err = submit(&engine, id, FormKind::Role, &[("role_id", "44")])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("managed"));
}

#[tokio::test]
async fn test_unknown_role_is_not_escalated() {
    let guild = FakeGuild::new();
    let engine = wizard(&guild);
    let id = engine
        .open(&FakeSurface::new(), moderator(), target())
        .await
        .expect("open");

    let err = submit(&engine, id, FormKind::Role, &[("role_id", "12345")])
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::NotFound(_)));
    assert!(guild.audit_log().is_empty());
}

// =============================================================================
// Access
// =============================================================================

#[tokio::test]
async fn test_non_moderator_cannot_open() {
    let guild = FakeGuild::new().with_member(UserId::new(200), &[]);
    let engine = wizard(&guild);

    let surface = FakeSurface::new();
    let result = engine
        .open(&surface, actor(UserId::new(200), "someone"), target())
        .await;
    assert!(matches!(result, Err(BotError::Permission(_))));
    assert!(surface.last_step().is_none());
    assert!(surface.last_reply().unwrap().description.contains("moderators"));

    let audit = guild.audit_log();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit.first().unwrap().title.as_deref(), Some("Interaction failed"));
}

#[tokio::test]
async fn test_only_opener_can_drive_wizard() {
    let other = UserId::new(101);
    let guild = FakeGuild::new().with_member(other, &[MOD_ROLE]);
    let engine = wizard(&guild);
    let id = engine
        .open(&FakeSurface::new(), moderator(), target())
        .await
        .expect("open");

    let result = engine
        .on_step_button(
            &FakeSurface::new(),
            &actor(other, "other mod"),
            id,
            WizardAction::Cancel,
        )
        .await;
    assert!(matches!(result, Err(BotError::Permission(_))));
    assert_eq!(step(&engine, id).await, WizardStep::ChooseRole);
}
