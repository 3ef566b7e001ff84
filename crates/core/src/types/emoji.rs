//! Button emoji type and the best-effort emoji validator.
//!
//! Operators type emoji into a free-text form field, so the input can be a
//! raw glyph (`🎢`), a shortcode (`:roller_coaster:`), a guild custom emoji
//! (`<:pants:1153794231438168095>`), or nonsense. Discord rejects the whole
//! message edit if a button carries an emoji it can't render, so the wizard
//! validates up front.
//!
//! ## Failure mode
//!
//! Glyph counting uses extended grapheme clusters and the `emojis` table. Some
//! compound sequences (newer ZWJ families, unusual modifier stacks) are either
//! missing from the table or split into several clusters and are rejected even
//! though Discord would render them. This is accepted: the operator can still
//! use a custom emoji or a simpler glyph.

use core::fmt;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use super::id::EmojiId;

/// Errors that can occur when parsing a [`ButtonEmoji`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmojiError {
    /// The input is empty after trimming.
    #[error("emoji cannot be empty")]
    Empty,
    /// The raw input is too long.
    #[error("emoji must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input has custom-emoji brackets but not the `<:name:id>` shape.
    #[error("custom emoji must look like <:name:id> or <a:name:id>")]
    MalformedCustom,
    /// The input resolves to more than one glyph.
    #[error(
        "emoji must be a single emoji, but this resolves to {count} characters. \
         Compound emoji are sometimes miscounted; try a simpler one or a custom emoji"
    )]
    NotSingleGlyph {
        /// How many grapheme clusters the input resolved to.
        count: usize,
    },
    /// The input is one character but not a known emoji (or an unknown shortcode).
    #[error("{0:?} is not an emoji Discord can show on a button")]
    NotAnEmoji(String),
}

/// An emoji shown on a button.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ButtonEmoji {
    /// A standard Unicode emoji, stored as its glyph.
    Unicode {
        /// The glyph itself.
        glyph: String,
    },
    /// A guild custom emoji.
    Custom {
        /// Emoji snowflake.
        id: EmojiId,
        /// Emoji name (without colons).
        name: String,
        /// Whether the emoji is animated.
        animated: bool,
    },
}

impl ButtonEmoji {
    /// Maximum length of the raw operator input, in characters.
    pub const MAX_INPUT_LENGTH: usize = 60;

    /// Parse and validate operator input.
    ///
    /// Shortcodes outside custom-emoji brackets are resolved to glyphs first;
    /// the result must then be exactly one known emoji.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, a malformed custom
    /// emoji, or does not resolve to exactly one renderable glyph.
    pub fn parse(input: &str) -> Result<Self, EmojiError> {
        if input.chars().count() > Self::MAX_INPUT_LENGTH {
            return Err(EmojiError::TooLong {
                max: Self::MAX_INPUT_LENGTH,
            });
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EmojiError::Empty);
        }

        if trimmed.starts_with('<') {
            return parse_custom(trimmed);
        }

        let expanded = expand_shortcodes(trimmed);
        let clusters: Vec<&str> = expanded.graphemes(true).collect();
        match clusters.as_slice() {
            [] => Err(EmojiError::Empty),
            [glyph] => lookup_glyph(glyph)
                .map(|glyph| Self::Unicode { glyph })
                .ok_or_else(|| EmojiError::NotAnEmoji(trimmed.to_string())),
            many => Err(EmojiError::NotSingleGlyph { count: many.len() }),
        }
    }

    /// Build a Unicode emoji without validation (used when decoding controls
    /// Discord already accepted).
    #[must_use]
    pub fn unicode(glyph: impl Into<String>) -> Self {
        Self::Unicode {
            glyph: glyph.into(),
        }
    }
}

impl fmt::Display for ButtonEmoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicode { glyph } => f.write_str(glyph),
            Self::Custom {
                id,
                name,
                animated: true,
            } => write!(f, "<a:{name}:{id}>"),
            Self::Custom { id, name, .. } => write!(f, "<:{name}:{id}>"),
        }
    }
}

/// Parse `<:name:id>` or `<a:name:id>`.
fn parse_custom(input: &str) -> Result<ButtonEmoji, EmojiError> {
    let inner = input
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or(EmojiError::MalformedCustom)?;

    let mut parts = inner.split(':');
    let (Some(flag), Some(name), Some(id), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(EmojiError::MalformedCustom);
    };

    let animated = match flag {
        "" => false,
        "a" => true,
        _ => return Err(EmojiError::MalformedCustom),
    };

    let name_len = name.chars().count();
    if !(2..=32).contains(&name_len)
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(EmojiError::MalformedCustom);
    }

    let id = id
        .parse::<u64>()
        .map_err(|_| EmojiError::MalformedCustom)?;

    Ok(ButtonEmoji::Custom {
        id: EmojiId::new(id),
        name: name.to_string(),
        animated,
    })
}

/// Replace every `:shortcode:` the emoji table knows with its glyph.
///
/// Unknown shortcodes are left as typed so the glyph count rejects them.
fn expand_shortcodes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some((before, tail)) = rest.split_once(':') {
        out.push_str(before);
        if let Some((name, after)) = tail.split_once(':')
            && is_shortcode_name(name)
            && let Some(emoji) = emojis::get_by_shortcode(name)
        {
            out.push_str(emoji.as_str());
            rest = after;
            continue;
        }
        out.push(':');
        rest = tail;
    }

    out.push_str(rest);
    out
}

fn is_shortcode_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
}

/// Look a single grapheme up in the emoji table, tolerating a missing or
/// extra variation selector.
fn lookup_glyph(glyph: &str) -> Option<String> {
    const VS16: char = '\u{FE0F}';

    if emojis::get(glyph).is_some() {
        return Some(glyph.to_string());
    }

    let stripped: String = glyph.chars().filter(|&c| c != VS16).collect();
    if emojis::get(&stripped).is_some() {
        return Some(stripped);
    }

    let with_selector = format!("{stripped}{VS16}");
    emojis::get(&with_selector).map(|_| with_selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_glyph() {
        assert_eq!(ButtonEmoji::parse("🎢"), Ok(ButtonEmoji::unicode("🎢")));
    }

    #[test]
    fn test_glyph_is_trimmed() {
        assert_eq!(ButtonEmoji::parse("  👍 "), Ok(ButtonEmoji::unicode("👍")));
    }

    #[test]
    fn test_shortcode_resolves() {
        let emoji = ButtonEmoji::parse(":thumbsup:").expect("known shortcode");
        assert_eq!(emoji, ButtonEmoji::unicode("👍"));
    }

    #[test]
    fn test_unknown_shortcode_rejected() {
        let result = ButtonEmoji::parse(":definitely_not_an_emoji:");
        assert!(matches!(result, Err(EmojiError::NotSingleGlyph { .. })));
    }

    #[test]
    fn test_two_glyphs_rejected() {
        assert_eq!(
            ButtonEmoji::parse("👍👍"),
            Err(EmojiError::NotSingleGlyph { count: 2 })
        );
    }

    #[test]
    fn test_plain_letter_rejected() {
        assert!(matches!(
            ButtonEmoji::parse("a"),
            Err(EmojiError::NotAnEmoji(_))
        ));
    }

    #[test]
    fn test_custom_emoji() {
        let emoji = ButtonEmoji::parse("<:pants:1153794231438168095>").expect("custom");
        assert_eq!(
            emoji,
            ButtonEmoji::Custom {
                id: EmojiId::new(1_153_794_231_438_168_095),
                name: "pants".into(),
                animated: false,
            }
        );
        assert_eq!(emoji.to_string(), "<:pants:1153794231438168095>");
    }

    #[test]
    fn test_animated_custom_emoji() {
        let emoji = ButtonEmoji::parse("<a:party_parrot:42>").expect("animated");
        assert!(matches!(emoji, ButtonEmoji::Custom { animated: true, .. }));
    }

    #[test]
    fn test_malformed_custom_rejected() {
        assert_eq!(
            ButtonEmoji::parse("<:pants>"),
            Err(EmojiError::MalformedCustom)
        );
        assert_eq!(
            ButtonEmoji::parse("<x:pants:42>"),
            Err(EmojiError::MalformedCustom)
        );
    }

    #[test]
    fn test_empty_and_too_long() {
        assert_eq!(ButtonEmoji::parse("   "), Err(EmojiError::Empty));
        assert_eq!(
            ButtonEmoji::parse(&"x".repeat(61)),
            Err(EmojiError::TooLong { max: 60 })
        );
    }
}
