//! The button record built up across wizard steps.

use core::fmt;

use rolebutton_core::{
    ButtonAction, ButtonEmoji, ButtonLabel, ButtonStyle, RoleButtonId, RoleId, RowPosition,
};
use uuid::Uuid;

use crate::error::BotError;
use crate::host::{MessageRef, Role};
use crate::ui::Button;

/// A role and action pair. At most one button per message may carry a
/// given key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlKey {
    pub role_id: RoleId,
    pub action: ButtonAction,
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <@&{}>", self.action.label(), self.role_id)
    }
}

/// One role button, complete or in progress.
///
/// Fields stay `None` until the wizard step that sets them succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonDescriptor {
    /// Message the button attaches to. Fixed for the descriptor's lifetime.
    pub target: MessageRef,
    pub role_id: Option<RoleId>,
    /// Role as resolved by the wizard during this session.
    pub role: Option<Role>,
    pub action: Option<ButtonAction>,
    pub style: Option<ButtonStyle>,
    pub label: Option<ButtonLabel>,
    pub emoji: Option<ButtonEmoji>,
    /// Explicit row; `None` lets the commit pick the first row with space.
    pub position: Option<RowPosition>,
    /// Identifies this entry inside a draft list across edits.
    pub session_id: Uuid,
    /// Key of the existing control this descriptor is an edit of.
    pub replaces: Option<ControlKey>,
}

impl ButtonDescriptor {
    /// An empty descriptor for a new button. The action starts as toggle.
    #[must_use]
    pub fn new(target: MessageRef) -> Self {
        Self {
            target,
            role_id: None,
            role: None,
            action: Some(ButtonAction::default()),
            style: None,
            label: None,
            emoji: None,
            position: None,
            session_id: Uuid::new_v4(),
            replaces: None,
        }
    }

    /// Start building a descriptor with named fields.
    #[must_use]
    pub fn builder(target: MessageRef) -> ButtonDescriptorBuilder {
        ButtonDescriptorBuilder {
            inner: Self::new(target),
        }
    }

    /// Clear every per-button field so the wizard can collect another button
    /// for the same message. The descriptor becomes a new draft entry.
    pub fn reset(&mut self) {
        *self = Self {
            action: None,
            ..Self::new(self.target)
        };
    }

    /// Role and action, once both are set.
    #[must_use]
    pub fn key(&self) -> Option<ControlKey> {
        Some(ControlKey {
            role_id: self.role_id?,
            action: self.action?,
        })
    }

    /// Whether a label or an emoji is set.
    #[must_use]
    pub const fn has_face(&self) -> bool {
        self.label.is_some() || self.emoji.is_some()
    }

    /// How the button looks, for conflict reports and summaries.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.emoji, &self.label) {
            (Some(emoji), Some(label)) => format!("{emoji} {label}"),
            (Some(emoji), None) => emoji.to_string(),
            (None, Some(label)) => label.to_string(),
            (None, None) => "(no label)".to_string(),
        }
    }

    /// Decode an existing control on `target`.
    ///
    /// Returns `None` for controls that are not role buttons. The role handle
    /// is left unresolved.
    #[must_use]
    pub fn from_control(target: MessageRef, button: &Button, row: usize) -> Option<Self> {
        let id = RoleButtonId::parse(&button.custom_id).ok()?;
        Some(Self {
            target,
            role_id: Some(id.role_id),
            role: None,
            action: Some(id.action),
            style: button.button_style(),
            label: button
                .label
                .as_deref()
                .and_then(|label| ButtonLabel::parse(label).ok()),
            emoji: button
                .emoji
                .as_ref()
                .and_then(crate::ui::ComponentEmoji::to_button_emoji),
            position: RowPosition::new(row).ok(),
            session_id: Uuid::new_v4(),
            replaces: None,
        })
    }

    /// Serialize into a persistent control.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Validation` if the role, action, style, or both
    /// label and emoji are missing.
    pub fn to_control(&self) -> Result<Button, BotError> {
        let key = self
            .key()
            .ok_or_else(|| BotError::Validation("button has no role or action".to_string()))?;
        let style = self
            .style
            .ok_or_else(|| BotError::Validation("button has no style".to_string()))?;
        if !self.has_face() {
            return Err(BotError::Validation(
                "button needs a label, an emoji, or both".to_string(),
            ));
        }

        let custom_id = RoleButtonId::new(key.role_id, self.target.message_id, key.action);
        Ok(Button {
            custom_id: custom_id.to_string(),
            style: style.code(),
            label: self.label.as_ref().map(ToString::to_string),
            emoji: self.emoji.as_ref().map(Into::into),
            disabled: false,
        })
    }
}

/// Builder for [`ButtonDescriptor`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ButtonDescriptorBuilder {
    inner: ButtonDescriptor,
}

impl ButtonDescriptorBuilder {
    pub const fn role_id(mut self, role_id: RoleId) -> Self {
        self.inner.role_id = Some(role_id);
        self
    }

    /// Set the resolved role (and its ID).
    pub fn role(mut self, role: Role) -> Self {
        self.inner.role_id = Some(role.id);
        self.inner.role = Some(role);
        self
    }

    pub const fn action(mut self, action: ButtonAction) -> Self {
        self.inner.action = Some(action);
        self
    }

    pub const fn style(mut self, style: ButtonStyle) -> Self {
        self.inner.style = Some(style);
        self
    }

    pub fn label(mut self, label: ButtonLabel) -> Self {
        self.inner.label = Some(label);
        self
    }

    pub fn emoji(mut self, emoji: ButtonEmoji) -> Self {
        self.inner.emoji = Some(emoji);
        self
    }

    pub const fn position(mut self, position: RowPosition) -> Self {
        self.inner.position = Some(position);
        self
    }

    pub const fn replaces(mut self, key: ControlKey) -> Self {
        self.inner.replaces = Some(key);
        self
    }

    #[must_use]
    pub fn build(self) -> ButtonDescriptor {
        self.inner
    }
}
