//! Core types for the role button bot.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the wizard, the commit engine and the press handler.

pub mod button;
pub mod control_id;
pub mod emoji;
pub mod id;
pub mod layout;

pub use button::{ButtonAction, ButtonStyle, UnknownAction};
pub use control_id::{ControlIdError, ROLE_BUTTON_PREFIX, RoleButtonId};
pub use emoji::{ButtonEmoji, EmojiError};
pub use id::*;
pub use layout::{
    ButtonLabel, LabelError, MAX_BUTTONS_PER_MESSAGE, MAX_BUTTONS_PER_ROW, MAX_ROWS,
    PositionError, RowPosition,
};
