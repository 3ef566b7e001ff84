//! Button action and style enums.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// What pressing a role button does to the pressing member's roles.
///
/// The wire names (`give`, `take`, `toggle`) are stored inside persistent
/// control identifiers and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ButtonAction {
    /// Add the role if the member lacks it, otherwise do nothing.
    #[serde(rename = "give")]
    Grant,
    /// Remove the role if the member has it, otherwise do nothing.
    #[serde(rename = "take")]
    Revoke,
    /// Add the role if absent, remove it if present.
    #[default]
    #[serde(rename = "toggle")]
    Toggle,
}

impl ButtonAction {
    /// All actions, in the order they are offered to operators.
    pub const ALL: [Self; 3] = [Self::Grant, Self::Revoke, Self::Toggle];

    /// Wire name used in control identifiers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grant => "give",
            Self::Revoke => "take",
            Self::Toggle => "toggle",
        }
    }

    /// Human-readable label for wizard screens.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Grant => "Give",
            Self::Revoke => "Take",
            Self::Toggle => "Toggle",
        }
    }

    /// One-line description of the press semantics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Grant => "Gives the role to anyone who presses it. Never removes it.",
            Self::Revoke => "Removes the role from anyone who presses it. Never gives it.",
            Self::Toggle => "Gives the role if the user lacks it, removes it if they have it.",
        }
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown action name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown button action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for ButtonAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "give" => Ok(Self::Grant),
            "take" => Ok(Self::Revoke),
            "toggle" => Ok(Self::Toggle),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// Visual style of a role button.
///
/// Maps onto Discord's button styles: success (green), primary (blurple),
/// secondary (grey) and danger (red).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Affirmative,
    Primary,
    Neutral,
    Destructive,
}

impl ButtonStyle {
    /// All styles, in the order they are offered to operators.
    pub const ALL: [Self; 4] = [
        Self::Affirmative,
        Self::Primary,
        Self::Neutral,
        Self::Destructive,
    ];

    /// Discord component style code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Primary => 1,
            Self::Neutral => 2,
            Self::Affirmative => 3,
            Self::Destructive => 4,
        }
    }

    /// Style for a Discord component style code.
    ///
    /// Link (5) and premium (6) buttons are not role buttons and yield `None`.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Primary),
            2 => Some(Self::Neutral),
            3 => Some(Self::Affirmative),
            4 => Some(Self::Destructive),
            _ => None,
        }
    }

    /// Short key used inside wizard custom IDs.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Affirmative => "affirmative",
            Self::Primary => "primary",
            Self::Neutral => "neutral",
            Self::Destructive => "destructive",
        }
    }

    /// Style for a wizard custom ID key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.key() == key)
    }

    /// Readable name including the colour.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Affirmative => "Success (Green)",
            Self::Primary => "Primary (Blurple)",
            Self::Neutral => "Secondary (Grey)",
            Self::Destructive => "Danger (Red)",
        }
    }
}
