//! Interactive surface building blocks.
//!
//! Action rows and buttons use Discord's component wire shape directly, so a
//! message's controls can be fetched, merged and written back without a
//! translation layer. Anything on a message that is not a plain button with a
//! custom ID (link buttons, select menus) is kept as raw JSON in
//! [`Component::Other`] and written back untouched.
//!
//! Screens and forms are platform-neutral; the Discord adapter turns them into
//! embeds and modals.
//!
//! See: <https://discord.com/developers/docs/interactions/message-components>

use std::collections::HashMap;

use rolebutton_core::{ButtonEmoji, ButtonStyle, EmojiId};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

const ACTION_ROW_TYPE: u8 = 1;
const BUTTON_TYPE: u64 = 2;

// =============================================================================
// Components
// =============================================================================

/// A row of up to five components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    tag: ActionRowTag,
    /// Components in display order.
    pub components: Vec<Component>,
}

impl ActionRow {
    /// Create a row from components.
    #[must_use]
    pub const fn new(components: Vec<Component>) -> Self {
        Self {
            tag: ActionRowTag,
            components,
        }
    }

    /// Create a row of buttons.
    #[must_use]
    pub fn buttons(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self::new(buttons.into_iter().map(Component::Button).collect())
    }
}

/// Serializes as the action row component type and rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActionRowTag;

impl Serialize for ActionRowTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(ACTION_ROW_TYPE)
    }
}

impl<'de> Deserialize<'de> for ActionRowTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            ACTION_ROW_TYPE => Ok(Self),
            other => Err(D::Error::custom(format!(
                "expected action row (type 1), got type {other}"
            ))),
        }
    }
}

/// A component inside an action row.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// A button carrying a custom ID.
    Button(Button),
    /// Anything else, preserved verbatim.
    Other(Value),
}

impl Component {
    /// The button, if this component is one.
    #[must_use]
    pub const fn as_button(&self) -> Option<&Button> {
        match self {
            Self::Button(button) => Some(button),
            Self::Other(_) => None,
        }
    }
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Button(button) => {
                let mut value = serde_json::to_value(button).map_err(S::Error::custom)?;
                if let Value::Object(map) = &mut value {
                    map.insert("type".to_string(), Value::from(BUTTON_TYPE));
                }
                value.serialize(serializer)
            }
            Self::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        let is_custom_button = value.get("type").and_then(Value::as_u64) == Some(BUTTON_TYPE)
            && value.get("custom_id").is_some_and(Value::is_string)
            && value
                .get("style")
                .and_then(Value::as_u64)
                .and_then(|code| u8::try_from(code).ok())
                .and_then(ButtonStyle::from_code)
                .is_some();

        if is_custom_button && let Ok(button) = serde_json::from_value::<Button>(value.clone()) {
            return Ok(Self::Button(button));
        }
        Ok(Self::Other(value))
    }
}

/// An interactive button.
///
/// `style` is the raw Discord style code so buttons the bot did not create
/// survive a fetch and rewrite unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Identifier delivered back when the button is pressed.
    pub custom_id: String,
    /// Discord style code.
    pub style: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<ComponentEmoji>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl Button {
    /// Create a labelled button.
    #[must_use]
    pub fn new(custom_id: impl Into<String>, style: ButtonStyle, label: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            style: style.code(),
            label: Some(label.into()),
            emoji: None,
            disabled: false,
        }
    }

    /// Attach an emoji.
    #[must_use]
    pub fn with_emoji(mut self, emoji: &ButtonEmoji) -> Self {
        self.emoji = Some(ComponentEmoji::from(emoji));
        self
    }

    /// Grey the button out.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Style, if the code is one of the four interactive styles.
    #[must_use]
    pub const fn button_style(&self) -> Option<ButtonStyle> {
        ButtonStyle::from_code(self.style)
    }
}

/// Emoji as Discord sends it on a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEmoji {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EmojiId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,
}

impl From<&ButtonEmoji> for ComponentEmoji {
    fn from(emoji: &ButtonEmoji) -> Self {
        match emoji {
            ButtonEmoji::Unicode { glyph } => Self {
                id: None,
                name: Some(glyph.clone()),
                animated: false,
            },
            ButtonEmoji::Custom { id, name, animated } => Self {
                id: Some(*id),
                name: Some(name.clone()),
                animated: *animated,
            },
        }
    }
}

impl ComponentEmoji {
    /// Convert back into a domain emoji. Returns `None` if Discord sent
    /// neither an ID nor a name.
    #[must_use]
    pub fn to_button_emoji(&self) -> Option<ButtonEmoji> {
        match (self.id, &self.name) {
            (Some(id), name) => Some(ButtonEmoji::Custom {
                id,
                name: name.clone().unwrap_or_default(),
                animated: self.animated,
            }),
            (None, Some(glyph)) => Some(ButtonEmoji::unicode(glyph.clone())),
            (None, None) => None,
        }
    }
}

// =============================================================================
// Screens
// =============================================================================

/// Colour family of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Asking the operator for input.
    Question,
    /// Something worked.
    Success,
    /// Something failed.
    Error,
}

impl Tone {
    /// Embed colour.
    #[must_use]
    pub const fn colour(self) -> u32 {
        match self {
            Self::Question => 0x00_d9_ff,
            Self::Success => 0x80_ff_80,
            Self::Error => 0x80_00_00,
        }
    }
}

/// Name/value pair shown under a screen's description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Descriptive content of one surface update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub tone: Tone,
    pub title: Option<String>,
    pub description: String,
    pub fields: Vec<ScreenField>,
    pub footer: Option<String>,
}

impl Screen {
    /// Create a screen with a description.
    #[must_use]
    pub fn new(tone: Tone, description: impl Into<String>) -> Self {
        Self {
            tone,
            title: None,
            description: description.into(),
            fields: Vec::new(),
            footer: None,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(ScreenField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Set the footer.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

// =============================================================================
// Forms
// =============================================================================

/// A pop-up form with text inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// Identifier delivered back on submit.
    pub custom_id: String,
    pub title: String,
    pub fields: Vec<FormField>,
}

/// One single-line text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub id: String,
    pub label: String,
    pub placeholder: Option<String>,
    /// Pre-filled value.
    pub value: Option<String>,
    pub required: bool,
    pub max_length: u16,
}

impl FormField {
    /// Create an input.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, max_length: u16) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            placeholder: None,
            value: None,
            required: false,
            max_length,
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Pre-fill the input. Empty values are dropped.
    #[must_use]
    pub fn prefill(mut self, value: Option<String>) -> Self {
        self.value = value.filter(|v| !v.is_empty());
        self
    }
}

/// Values submitted from a [`Form`], keyed by field ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    values: HashMap<String, String>,
}

impl FormSubmission {
    /// Build a submission from `(field_id, value)` pairs.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The raw value of a field, as typed.
    #[must_use]
    pub fn raw(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    /// The trimmed value of a field, or `None` if it was left blank.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.raw(id).map(str::trim).filter(|v| !v.is_empty())
    }
}
