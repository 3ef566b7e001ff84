//! Wizard steps and the registry that drives them.
//!
//! Each step has a screen, a control set, and a gate that must pass before
//! `Next` leaves it. A press is only honoured if its button is part of the
//! control set currently rendered for the session; presses from older
//! screens (double clicks, stale messages) are rejected instead of being
//! applied to the wrong step.

use super::custom_id::{WizardAction, WizardCustomId};
use super::screens;
use super::session::WizardSession;
use crate::ui::{ActionRow, Component, Screen};

/// The six wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    ChooseRole,
    ConfirmRole,
    ChooseAction,
    ChooseStyle,
    ChooseFace,
    Confirm,
}

impl WizardStep {
    pub const ALL: [Self; 6] = [
        Self::ChooseRole,
        Self::ConfirmRole,
        Self::ChooseAction,
        Self::ChooseStyle,
        Self::ChooseFace,
        Self::Confirm,
    ];

    /// Zero-based position.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::ChooseRole => 0,
            Self::ConfirmRole => 1,
            Self::ChooseAction => 2,
            Self::ChooseStyle => 3,
            Self::ChooseFace => 4,
            Self::Confirm => 5,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    #[must_use]
    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Registry entry for this step.
    #[must_use]
    #[allow(clippy::indexing_slicing)] // index() is always below ALL.len()
    pub fn definition(self) -> &'static StepDefinition {
        &REGISTRY[self.index()]
    }
}

/// Precondition for leaving a step forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The role resolves and the bot may assign it.
    AssignableRole,
    /// Always passes.
    Open,
    ActionChosen,
    StyleChosen,
    /// Label or emoji set; the button is then staged into the draft.
    FaceChosen,
    /// Last step; leaving it means committing.
    Terminal,
}

/// What the wizard shows and accepts at one step.
#[derive(Debug)]
pub struct StepDefinition {
    pub step: WizardStep,
    pub title: &'static str,
    pub gate: Gate,
    pub screen: fn(&WizardSession) -> Screen,
    pub controls: fn(&WizardSession) -> Vec<ActionRow>,
}

static REGISTRY: [StepDefinition; 6] = [
    StepDefinition {
        step: WizardStep::ChooseRole,
        title: "Choose a role",
        gate: Gate::AssignableRole,
        screen: screens::choose_role,
        controls: screens::choose_role_controls,
    },
    StepDefinition {
        step: WizardStep::ConfirmRole,
        title: "Confirm the role",
        gate: Gate::Open,
        screen: screens::confirm_role,
        controls: screens::confirm_role_controls,
    },
    StepDefinition {
        step: WizardStep::ChooseAction,
        title: "Choose what the button does",
        gate: Gate::ActionChosen,
        screen: screens::choose_action,
        controls: screens::choose_action_controls,
    },
    StepDefinition {
        step: WizardStep::ChooseStyle,
        title: "Choose a colour",
        gate: Gate::StyleChosen,
        screen: screens::choose_style,
        controls: screens::choose_style_controls,
    },
    StepDefinition {
        step: WizardStep::ChooseFace,
        title: "Choose a label and emoji",
        gate: Gate::FaceChosen,
        screen: screens::choose_face,
        controls: screens::choose_face_controls,
    },
    StepDefinition {
        step: WizardStep::Confirm,
        title: "Review and commit",
        gate: Gate::Terminal,
        screen: screens::confirm,
        controls: screens::confirm_controls,
    },
];

/// Screen and controls for the session's current step, pushed together.
#[must_use]
pub fn render(session: &WizardSession) -> (Screen, Vec<ActionRow>) {
    let definition = session.step.definition();
    (
        (definition.screen)(session),
        (definition.controls)(session),
    )
}

/// Whether `action` is an enabled control on the session's current screen.
#[must_use]
pub fn accepts(session: &WizardSession, action: WizardAction) -> bool {
    let wanted = WizardCustomId::button(session.id, action).to_string();
    (session.step.definition().controls)(session)
        .iter()
        .flat_map(|row| &row.components)
        .filter_map(Component::as_button)
        .any(|button| button.custom_id == wanted && !button.disabled)
}
