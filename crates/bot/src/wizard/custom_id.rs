//! Custom IDs for the wizard's own controls and forms.
//!
//! ```text
//! wizard:<session-uuid>:next
//! wizard:<session-uuid>:action:give
//! wizard:<session-uuid>:style:primary
//! wizard:<session-uuid>:open:face      (button that pops the form)
//! wizard:<session-uuid>:form:face      (the form itself)
//! wizard:<session-uuid>:existing:3
//! ```
//!
//! These IDs only live as long as the ephemeral wizard surface, so unlike role
//! button IDs the layout may change between releases.

use core::fmt;
use core::str::FromStr;

use rolebutton_core::{ButtonAction, ButtonStyle};
use thiserror::Error;
use uuid::Uuid;

/// Prefix shared by every wizard custom ID.
pub const WIZARD_PREFIX: &str = "wizard:";

/// Error returned for custom IDs that are not wizard controls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised wizard control: {0}")]
pub struct UnknownControl(pub String);

/// Identifies one wizard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// The two forms the wizard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    /// Role ID input (step 0).
    Role,
    /// Label, emoji and row input (step 4).
    Face,
}

impl FormKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Face => "face",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "role" => Some(Self::Role),
            "face" => Some(Self::Face),
            _ => None,
        }
    }
}

/// A wizard button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardAction {
    Prev,
    Next,
    Cancel,
    /// Pop up a form.
    OpenForm(FormKind),
    ChooseAction(ButtonAction),
    ChooseStyle(ButtonStyle),
    Commit,
    /// Stage another button for the same message.
    AddAnother,
    /// Return to the review step without staging the working button.
    Review,
    /// Load the n-th existing role button for editing.
    EditExisting(usize),
    /// Pull the n-th draft entry back into the working descriptor.
    EditDraft(usize),
}

impl fmt::Display for WizardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prev => f.write_str("prev"),
            Self::Next => f.write_str("next"),
            Self::Cancel => f.write_str("cancel"),
            Self::OpenForm(kind) => write!(f, "open:{}", kind.as_str()),
            Self::ChooseAction(action) => write!(f, "action:{}", action.as_str()),
            Self::ChooseStyle(style) => write!(f, "style:{}", style.key()),
            Self::Commit => f.write_str("commit"),
            Self::AddAnother => f.write_str("another"),
            Self::Review => f.write_str("review"),
            Self::EditExisting(index) => write!(f, "existing:{index}"),
            Self::EditDraft(index) => write!(f, "draft:{index}"),
        }
    }
}

impl WizardAction {
    fn parse(s: &str) -> Option<Self> {
        let (head, arg) = match s.split_once(':') {
            Some((head, arg)) => (head, Some(arg)),
            None => (s, None),
        };

        match (head, arg) {
            ("prev", None) => Some(Self::Prev),
            ("next", None) => Some(Self::Next),
            ("cancel", None) => Some(Self::Cancel),
            ("commit", None) => Some(Self::Commit),
            ("another", None) => Some(Self::AddAnother),
            ("review", None) => Some(Self::Review),
            ("open", Some(kind)) => FormKind::parse(kind).map(Self::OpenForm),
            ("action", Some(action)) => action.parse().ok().map(Self::ChooseAction),
            ("style", Some(style)) => ButtonStyle::from_key(style).map(Self::ChooseStyle),
            ("existing", Some(index)) => index.parse().ok().map(Self::EditExisting),
            ("draft", Some(index)) => index.parse().ok().map(Self::EditDraft),
            _ => None,
        }
    }
}

/// What a wizard custom ID points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardControl {
    Button(WizardAction),
    Form(FormKind),
}

/// Decoded wizard custom ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WizardCustomId {
    pub session: SessionId,
    pub control: WizardControl,
}

impl WizardCustomId {
    /// ID for a wizard button.
    #[must_use]
    pub const fn button(session: SessionId, action: WizardAction) -> Self {
        Self {
            session,
            control: WizardControl::Button(action),
        }
    }

    /// ID for a wizard form.
    #[must_use]
    pub const fn form(session: SessionId, kind: FormKind) -> Self {
        Self {
            session,
            control: WizardControl::Form(kind),
        }
    }

    /// Whether a custom ID belongs to the wizard.
    #[must_use]
    pub fn is_wizard(custom_id: &str) -> bool {
        custom_id.starts_with(WIZARD_PREFIX)
    }
}

impl fmt::Display for WizardCustomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.control {
            WizardControl::Button(action) => write!(f, "{WIZARD_PREFIX}{}:{action}", self.session),
            WizardControl::Form(kind) => {
                write!(f, "{WIZARD_PREFIX}{}:form:{}", self.session, kind.as_str())
            }
        }
    }
}

impl FromStr for WizardCustomId {
    type Err = UnknownControl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownControl(s.to_string());

        let (session, rest) = s
            .strip_prefix(WIZARD_PREFIX)
            .and_then(|rest| rest.split_once(':'))
            .ok_or_else(unknown)?;
        let session = session.parse::<SessionId>().map_err(|_| unknown())?;

        let control = match rest.strip_prefix("form:") {
            Some(kind) => WizardControl::Form(FormKind::parse(kind).ok_or_else(unknown)?),
            None => WizardControl::Button(WizardAction::parse(rest).ok_or_else(unknown)?),
        };

        Ok(Self { session, control })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_actions() -> Vec<WizardAction> {
        let mut actions = vec![
            WizardAction::Prev,
            WizardAction::Next,
            WizardAction::Cancel,
            WizardAction::OpenForm(FormKind::Role),
            WizardAction::OpenForm(FormKind::Face),
            WizardAction::Commit,
            WizardAction::AddAnother,
            WizardAction::Review,
            WizardAction::EditExisting(19),
            WizardAction::EditDraft(0),
        ];
        actions.extend(ButtonAction::ALL.map(WizardAction::ChooseAction));
        actions.extend(ButtonStyle::ALL.map(WizardAction::ChooseStyle));
        actions
    }

    #[test]
    fn test_every_button_id_parses_back() {
        let session = SessionId::new();
        for action in all_actions() {
            let id = WizardCustomId::button(session, action);
            let encoded = id.to_string();
            assert!(encoded.len() <= 100, "{encoded} exceeds Discord's limit");
            assert_eq!(encoded.parse::<WizardCustomId>(), Ok(id));
        }
    }

    #[test]
    fn test_form_ids_are_distinct_from_open_buttons() {
        let session = SessionId::new();
        let form = WizardCustomId::form(session, FormKind::Face);
        let open = WizardCustomId::button(session, WizardAction::OpenForm(FormKind::Face));
        assert_ne!(form.to_string(), open.to_string());
        assert_eq!(form.to_string().parse::<WizardCustomId>(), Ok(form));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("wizard:not-a-uuid:next".parse::<WizardCustomId>().is_err());
        let session = SessionId::new();
        assert!(
            format!("wizard:{session}:sideways")
                .parse::<WizardCustomId>()
                .is_err()
        );
        assert!(
            format!("wizard:{session}:style:green")
                .parse::<WizardCustomId>()
                .is_err()
        );
        assert!("button:role:1:message:2:action:give".parse::<WizardCustomId>().is_err());
    }
}
