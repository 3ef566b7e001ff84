//! Persistent control identifiers for role buttons.
//!
//! A role button's custom ID is the only state the bot keeps between process
//! restarts. Discord stores it with the message, and the press handler rebuilds
//! everything it needs from it:
//!
//! ```text
//! button:role:<role_id>:message:<message_id>:action:<give|take|toggle>
//! ```

use core::fmt;
use core::str::FromStr;

use super::button::ButtonAction;
use super::id::{MessageId, RoleId};

/// Prefix shared by every role button custom ID.
pub const ROLE_BUTTON_PREFIX: &str = "button:role:";

/// Errors that can occur when parsing a [`RoleButtonId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlIdError {
    /// The ID does not start with `button:role:`.
    #[error("not a role button identifier")]
    NotRoleButton,
    /// The ID has the prefix but not the expected segments.
    #[error("malformed role button identifier: {0}")]
    Malformed(String),
    /// A numeric segment is not a valid snowflake.
    #[error("invalid {field} in role button identifier")]
    InvalidNumber {
        /// Which segment failed.
        field: &'static str,
    },
    /// The action segment is not a known action.
    #[error("unknown action {0:?} in role button identifier")]
    UnknownAction(String),
}

/// Decoded role button custom ID.
///
/// ## Examples
///
/// ```
/// use rolebutton_core::{ButtonAction, MessageId, RoleButtonId, RoleId};
///
/// let id = RoleButtonId::new(RoleId::new(42), MessageId::new(7), ButtonAction::Grant);
/// assert_eq!(id.to_string(), "button:role:42:message:7:action:give");
/// assert_eq!("button:role:42:message:7:action:give".parse(), Ok(id));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleButtonId {
    pub role_id: RoleId,
    pub message_id: MessageId,
    pub action: ButtonAction,
}

impl RoleButtonId {
    /// Create a new identifier.
    #[must_use]
    pub const fn new(role_id: RoleId, message_id: MessageId, action: ButtonAction) -> Self {
        Self {
            role_id,
            message_id,
            action,
        }
    }

    /// Whether a custom ID looks like a role button, without fully parsing it.
    #[must_use]
    pub fn is_role_button(custom_id: &str) -> bool {
        custom_id.starts_with(ROLE_BUTTON_PREFIX)
    }

    /// Parse a custom ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a role button identifier or any
    /// segment is malformed.
    pub fn parse(custom_id: &str) -> Result<Self, ControlIdError> {
        let rest = custom_id
            .strip_prefix(ROLE_BUTTON_PREFIX)
            .ok_or(ControlIdError::NotRoleButton)?;

        let mut parts = rest.split(':');
        let (Some(role), Some("message"), Some(message), Some("action"), Some(action), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(ControlIdError::Malformed(custom_id.to_string()));
        };

        let role_id = parse_snowflake(role, "role")?;
        let message_id = parse_snowflake(message, "message")?;
        let action = action
            .parse::<ButtonAction>()
            .map_err(|_| ControlIdError::UnknownAction(action.to_string()))?;

        Ok(Self::new(
            RoleId::new(role_id),
            MessageId::new(message_id),
            action,
        ))
    }
}

/// Parse a decimal snowflake, rejecting signs and whitespace.
fn parse_snowflake(segment: &str, field: &'static str) -> Result<u64, ControlIdError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ControlIdError::InvalidNumber { field });
    }
    segment
        .parse::<u64>()
        .map_err(|_| ControlIdError::InvalidNumber { field })
}

impl fmt::Display for RoleButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ROLE_BUTTON_PREFIX}{}:message:{}:action:{}",
            self.role_id, self.message_id, self.action
        )
    }
}

impl FromStr for RoleButtonId {
    type Err = ControlIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_extremes() {
        for action in ButtonAction::ALL {
            let id = RoleButtonId::new(RoleId::new(u64::MAX), MessageId::new(0), action);
            assert_eq!(RoleButtonId::parse(&id.to_string()), Ok(id));
        }
    }

    #[test]
    fn test_encoded_length_fits_discord_limit() {
        // Discord custom IDs are limited to 100 characters.
        let id = RoleButtonId::new(
            RoleId::new(u64::MAX),
            MessageId::new(u64::MAX),
            ButtonAction::Toggle,
        );
        assert!(id.to_string().len() <= 100);
    }

    #[test]
    fn test_rejects_legacy_message_first_layout() {
        let result = RoleButtonId::parse("button:message:7:role:42");
        assert_eq!(result, Err(ControlIdError::NotRoleButton));
    }

    #[test]
    fn test_rejects_missing_action() {
        let result = RoleButtonId::parse("button:role:42:message:7");
        assert!(matches!(result, Err(ControlIdError::Malformed(_))));
    }

    #[test]
    fn test_rejects_trailing_segments() {
        let result = RoleButtonId::parse("button:role:42:message:7:action:give:extra");
        assert!(matches!(result, Err(ControlIdError::Malformed(_))));
    }

    #[test]
    fn test_rejects_signed_numbers() {
        let result = RoleButtonId::parse("button:role:+42:message:7:action:give");
        assert_eq!(result, Err(ControlIdError::InvalidNumber { field: "role" }));
    }

    #[test]
    fn test_rejects_unknown_action() {
        let result = RoleButtonId::parse("button:role:42:message:7:action:grant");
        assert_eq!(result, Err(ControlIdError::UnknownAction("grant".into())));
    }
}
