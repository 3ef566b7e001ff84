//! Draft list and the role/action conflict rule.

use rolebutton_core::MAX_BUTTONS_PER_MESSAGE;

use crate::descriptor::ButtonDescriptor;
use crate::error::BotError;

/// Find an entry that already uses the candidate's role and action.
///
/// The candidate's own entry (same `session_id`) is skipped so re-staging an
/// edited descriptor does not conflict with its previous version. Candidates
/// without a complete key never conflict.
pub fn find_conflict<'a, I>(entries: I, candidate: &ButtonDescriptor) -> Option<&'a ButtonDescriptor>
where
    I: IntoIterator<Item = &'a ButtonDescriptor>,
{
    let key = candidate.key()?;
    entries
        .into_iter()
        .filter(|entry| entry.session_id != candidate.session_id)
        .find(|entry| entry.key() == Some(key))
}

/// Like [`find_conflict`], as a validation error naming the clashing button.
///
/// # Errors
///
/// Returns `BotError::Validation` if another entry has the same key.
pub fn check_conflict<'a, I>(entries: I, candidate: &ButtonDescriptor) -> Result<(), BotError>
where
    I: IntoIterator<Item = &'a ButtonDescriptor>,
{
    match (find_conflict(entries, candidate), candidate.key()) {
        (Some(existing), Some(key)) => Err(BotError::Validation(format!(
            "A {key} button already exists for this message: {}. \
             Pick a different role or action.",
            existing.display_name()
        ))),
        _ => Ok(()),
    }
}

/// Buttons staged for one message, in the order they will be placed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftList {
    entries: Vec<ButtonDescriptor>,
}

impl DraftList {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a descriptor, or replace the entry with the same `session_id`.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Validation` if another entry has the same role and
    /// action, or the draft is already full.
    pub fn upsert(&mut self, descriptor: ButtonDescriptor) -> Result<(), BotError> {
        check_conflict(&self.entries, &descriptor)?;

        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|entry| entry.session_id == descriptor.session_id)
        {
            *slot = descriptor;
            return Ok(());
        }

        if self.entries.len() >= MAX_BUTTONS_PER_MESSAGE {
            return Err(BotError::Validation(format!(
                "A message can hold at most {MAX_BUTTONS_PER_MESSAGE} role buttons."
            )));
        }
        self.entries.push(descriptor);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ButtonDescriptor> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ButtonDescriptor> {
        self.entries.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a DraftList {
    type Item = &'a ButtonDescriptor;
    type IntoIter = std::slice::Iter<'a, ButtonDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
