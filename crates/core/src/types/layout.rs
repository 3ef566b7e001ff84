//! Button labels and placement bounds on a message.
//!
//! Discord allows five action rows per message with five buttons each. The bot
//! reserves the last row, so role buttons live on rows 0-3: at most four rows
//! of five, twenty buttons per message.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Number of rows role buttons may occupy.
pub const MAX_ROWS: usize = 4;

/// Number of buttons Discord allows in one action row.
pub const MAX_BUTTONS_PER_ROW: usize = 5;

/// Maximum number of role buttons on one message.
pub const MAX_BUTTONS_PER_MESSAGE: usize = MAX_ROWS * MAX_BUTTONS_PER_ROW;

/// Errors that can occur when building a [`RowPosition`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    /// Row input is not a number.
    #[error("row must be a number from 1 to {MAX_ROWS}")]
    NotANumber,
    /// Row is outside the allowed range.
    #[error("row must be from 1 to {MAX_ROWS} (got {0})")]
    OutOfRange(usize),
}

/// Zero-based action row a button is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowPosition(u8);

impl RowPosition {
    /// Create a position from a zero-based row index.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is not below [`MAX_ROWS`].
    pub fn new(row: usize) -> Result<Self, PositionError> {
        if row >= MAX_ROWS {
            return Err(PositionError::OutOfRange(row.saturating_add(1)));
        }
        u8::try_from(row)
            .map(Self)
            .map_err(|_| PositionError::OutOfRange(row.saturating_add(1)))
    }

    /// Parse operator input, which counts rows from 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a number from 1 to [`MAX_ROWS`].
    pub fn parse_one_based(input: &str) -> Result<Self, PositionError> {
        let row = input
            .trim()
            .parse::<usize>()
            .map_err(|_| PositionError::NotANumber)?;
        if row == 0 {
            return Err(PositionError::OutOfRange(0));
        }
        Self::new(row - 1)
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RowPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0 + 1)
    }
}

/// Errors that can occur when parsing a [`ButtonLabel`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// The input is empty after trimming.
    #[error("label cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("label must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Text shown on a button.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonLabel(String);

impl ButtonLabel {
    /// Maximum label length Discord accepts.
    pub const MAX_LENGTH: usize = 80;

    /// Parse a label, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than 80
    /// characters.
    pub fn parse(input: &str) -> Result<Self, LabelError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LabelError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(LabelError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ButtonLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_bounds() {
        assert!(RowPosition::new(0).is_ok());
        assert!(RowPosition::new(3).is_ok());
        assert_eq!(RowPosition::new(4), Err(PositionError::OutOfRange(5)));
    }

    #[test]
    fn test_row_parse_is_one_based() {
        assert_eq!(RowPosition::parse_one_based("1").map(RowPosition::index), Ok(0));
        assert_eq!(RowPosition::parse_one_based(" 4 ").map(RowPosition::index), Ok(3));
        assert_eq!(
            RowPosition::parse_one_based("0"),
            Err(PositionError::OutOfRange(0))
        );
        assert_eq!(
            RowPosition::parse_one_based("two"),
            Err(PositionError::NotANumber)
        );
    }

    #[test]
    fn test_label_length_counts_characters() {
        assert!(ButtonLabel::parse(&"é".repeat(80)).is_ok());
        assert_eq!(
            ButtonLabel::parse(&"é".repeat(81)),
            Err(LabelError::TooLong { max: 80 })
        );
    }

    #[test]
    fn test_label_trims() {
        let label = ButtonLabel::parse("  Join Team ").expect("valid");
        assert_eq!(label.as_str(), "Join Team");
        assert_eq!(ButtonLabel::parse("  "), Err(LabelError::Empty));
    }

    #[test]
    fn test_capacity() {
        assert_eq!(MAX_BUTTONS_PER_MESSAGE, 20);
    }
}
