//! Merging a draft into a message's existing controls.
//!
//! A commit reads the message's current rows, lays the draft out on top of
//! them and writes the result back in a single edit. Controls the bot does
//! not own (link buttons, select menus, other bots' buttons) keep their row
//! and order. Nothing is written if any entry fails validation.

use std::collections::HashSet;

use rolebutton_core::{MAX_BUTTONS_PER_ROW, MAX_ROWS, RowPosition};
use serde_json::Value;
use tracing::instrument;

use crate::audit::{self, AuditChannel};
use crate::descriptor::{ButtonDescriptor, ControlKey};
use crate::error::BotError;
use crate::host::{Actor, AuditSink, MessageHost, MessageRef};
use crate::ui::{ActionRow, Button, Component};
use crate::wizard::draft::{DraftList, check_conflict};

/// Discord's limit on action rows per message.
const MESSAGE_ROW_LIMIT: usize = 5;

/// What a commit changed, with final row positions filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub added: Vec<ButtonDescriptor>,
    pub updated: Vec<ButtonDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Added,
    Updated,
}

/// One position in the message's layout while the merge is in progress.
#[derive(Debug)]
enum Slot {
    /// A role button already on the message, written back unchanged.
    Existing {
        descriptor: ButtonDescriptor,
        button: Button,
    },
    /// A draft entry.
    Staged {
        descriptor: ButtonDescriptor,
        change: Change,
    },
    /// Anything the bot does not own.
    Foreign(Component),
}

impl Slot {
    fn existing_key(&self) -> Option<ControlKey> {
        match self {
            Self::Existing { descriptor, .. } => descriptor.key(),
            _ => None,
        }
    }

    /// Select menus and other non-button components fill their row.
    fn fills_row(&self) -> bool {
        match self {
            Self::Foreign(Component::Other(value)) => {
                value.get("type").and_then(Value::as_u64) != Some(2)
            }
            _ => false,
        }
    }
}

type Grid = Vec<Vec<Slot>>;

fn row_has_space(row: Option<&Vec<Slot>>) -> bool {
    row.is_none_or(|row| row.len() < MAX_BUTTONS_PER_ROW && !row.iter().any(Slot::fills_row))
}

/// Decode fetched rows into slots.
///
/// Existing role buttons are kept by key only and their roles are not looked
/// up again. They are written back byte for byte, so a button whose role has
/// since been deleted is carried through rather than failing the commit, and
/// the commit costs no role lookups for buttons it does not change.
fn decode(target: MessageRef, rows: Vec<ActionRow>) -> Grid {
    rows.into_iter()
        .enumerate()
        .map(|(r, row)| {
            row.components
                .into_iter()
                .map(|component| match component {
                    Component::Button(button) => {
                        match ButtonDescriptor::from_control(target, &button, r) {
                            Some(descriptor) => Slot::Existing { descriptor, button },
                            None => Slot::Foreign(Component::Button(button)),
                        }
                    }
                    other => Slot::Foreign(other),
                })
                .collect()
        })
        .collect()
}

fn existing_descriptors(grid: &Grid) -> impl Iterator<Item = &ButtonDescriptor> {
    grid.iter().flatten().filter_map(|slot| match slot {
        Slot::Existing { descriptor, .. } => Some(descriptor),
        _ => None,
    })
}

fn locate(grid: &Grid, key: ControlKey) -> Option<(usize, usize)> {
    grid.iter().enumerate().find_map(|(r, row)| {
        row.iter()
            .position(|slot| slot.existing_key() == Some(key))
            .map(|c| (r, c))
    })
}

/// Append a slot to its requested row, or the first row with space.
///
/// Automatic placement starts at the last occupied row so new buttons land
/// after the ones already there rather than filling gaps above them.
fn place(grid: &mut Grid, slot: Slot, position: Option<RowPosition>) -> Result<(), BotError> {
    let row = match position {
        Some(position) => {
            let r = position.index();
            if !row_has_space(grid.get(r)) {
                return Err(BotError::Validation(format!(
                    "Row {} of this message is full. Pick another row, or leave the row \
                     blank to place the button automatically.",
                    r + 1
                )));
            }
            r
        }
        None => {
            let start = grid
                .iter()
                .take(MAX_ROWS)
                .rposition(|row| !row.is_empty())
                .unwrap_or(0);
            (start..MAX_ROWS)
                .find(|&r| row_has_space(grid.get(r)))
                .ok_or_else(|| {
                    BotError::Validation(
                        "This message has no room left for another button. Pick a row \
                         explicitly, or remove a button first."
                            .to_string(),
                    )
                })?
        }
    };

    while grid.len() <= row {
        grid.push(Vec::new());
    }
    if let Some(target) = grid.get_mut(row) {
        target.push(slot);
    }
    Ok(())
}

/// Writes drafts onto messages.
#[derive(Debug)]
pub struct CommitEngine<'a, H> {
    host: &'a H,
    audit: AuditChannel,
}

impl<'a, H> CommitEngine<'a, H>
where
    H: MessageHost + AuditSink,
{
    #[must_use]
    pub const fn new(host: &'a H, audit: AuditChannel) -> Self {
        Self { host, audit }
    }

    /// Merge `draft` into the target message's controls.
    ///
    /// When `baseline` is given, the commit is refused if the message's role
    /// buttons no longer match it; someone else changed the message since the
    /// draft was started.
    ///
    /// # Errors
    ///
    /// - `BotError::Validation` for an empty draft, an incomplete entry, a
    ///   role/action conflict, a full row, or a stale baseline
    /// - `BotError::HostTransport` if reading or editing the message fails
    #[instrument(
        skip_all,
        fields(message_id = %target.message_id, entries = draft.len())
    )]
    pub async fn commit(
        &self,
        operator: &Actor,
        target: &MessageRef,
        draft: &DraftList,
        baseline: Option<&HashSet<ControlKey>>,
    ) -> Result<CommitReport, BotError> {
        if draft.is_empty() {
            return Err(BotError::Validation(
                "There is nothing to commit. Configure at least one button first.".to_string(),
            ));
        }
        for entry in draft {
            if entry.role.is_none() {
                return Err(BotError::Validation(format!(
                    "The {} button has no verified role. Go back and enter its role again.",
                    entry.display_name()
                )));
            }
            entry.to_control()?;
        }

        let rows = self.host.fetch_message_controls(target).await?;
        let mut grid = decode(*target, rows);

        if let Some(baseline) = baseline {
            let current: HashSet<ControlKey> = existing_descriptors(&grid)
                .filter_map(ButtonDescriptor::key)
                .collect();
            if &current != baseline {
                return Err(BotError::Validation(
                    "The buttons on this message changed while you were editing. Cancel and \
                     open the wizard again to see the latest version."
                        .to_string(),
                ));
            }
        }

        for entry in draft {
            check_conflict(
                existing_descriptors(&grid).filter(|existing| {
                    entry.replaces.is_none() || existing.key() != entry.replaces
                }),
                entry,
            )?;
            check_conflict(draft, entry)?;
        }

        for entry in draft {
            let located = entry.replaces.and_then(|key| locate(&grid, key));
            match located {
                Some((r, c)) if entry.position.is_none_or(|p| p.index() == r) => {
                    if let Some(slot) = grid.get_mut(r).and_then(|row| row.get_mut(c)) {
                        *slot = Slot::Staged {
                            descriptor: entry.clone(),
                            change: Change::Updated,
                        };
                    }
                }
                Some((r, c)) => {
                    if let Some(row) = grid.get_mut(r) {
                        row.remove(c);
                    }
                    let slot = Slot::Staged {
                        descriptor: entry.clone(),
                        change: Change::Updated,
                    };
                    place(&mut grid, slot, entry.position)?;
                }
                None => {
                    let slot = Slot::Staged {
                        descriptor: entry.clone(),
                        change: Change::Added,
                    };
                    place(&mut grid, slot, entry.position)?;
                }
            }
        }

        let mut report = CommitReport::default();
        let mut rows = Vec::new();
        for slots in grid.into_iter().filter(|row| !row.is_empty()) {
            let r = rows.len();
            let mut components = Vec::with_capacity(slots.len());
            for slot in slots {
                match slot {
                    Slot::Existing { button, .. } => components.push(Component::Button(button)),
                    Slot::Foreign(component) => components.push(component),
                    Slot::Staged {
                        mut descriptor,
                        change,
                    } => {
                        descriptor.position = RowPosition::new(r).ok();
                        components.push(Component::Button(descriptor.to_control()?));
                        match change {
                            Change::Added => report.added.push(descriptor),
                            Change::Updated => report.updated.push(descriptor),
                        }
                    }
                }
            }
            rows.push(ActionRow::new(components));
        }

        if rows.len() > MESSAGE_ROW_LIMIT {
            return Err(BotError::Validation(
                "This message has too many rows of controls to add another one.".to_string(),
            ));
        }

        self.host.edit_message_controls(target, rows).await?;

        for descriptor in &report.added {
            self.audit
                .notify(self.host, audit::button_added(operator, descriptor))
                .await;
        }
        for descriptor in &report.updated {
            self.audit
                .notify(self.host, audit::button_updated(operator, descriptor))
                .await;
        }

        tracing::info!(
            operator = %operator.id,
            added = report.added.len(),
            updated = report.updated.len(),
            "Committed role buttons"
        );

        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rolebutton_core::{ButtonAction, ButtonLabel, ButtonStyle, ChannelId, GuildId, MessageId, RoleId};
    use serde_json::json;

    use super::*;

    fn target() -> MessageRef {
        MessageRef {
            guild_id: GuildId::new(1),
            channel_id: ChannelId::new(2),
            message_id: MessageId::new(3),
        }
    }

    fn staged(role: u64) -> Slot {
        Slot::Staged {
            descriptor: ButtonDescriptor::builder(target())
                .role_id(RoleId::new(role))
                .action(ButtonAction::Toggle)
                .style(ButtonStyle::Primary)
                .label(ButtonLabel::parse("x").unwrap())
                .build(),
            change: Change::Added,
        }
    }

    fn foreign_button() -> Slot {
        Slot::Foreign(Component::Other(json!({"type": 2, "style": 5, "url": "https://example.org"})))
    }

    #[test]
    fn test_auto_placement_starts_at_last_occupied_row() {
        let mut grid: Grid = vec![vec![foreign_button()], Vec::new(), vec![foreign_button()]];
        place(&mut grid, staged(1), None).unwrap();
        assert_eq!(grid.get(2).unwrap().len(), 2);
        assert_eq!(grid.get(1).unwrap().len(), 0);
    }

    #[test]
    fn test_auto_placement_moves_past_full_rows() {
        let mut grid: Grid = vec![(0..5).map(|_| foreign_button()).collect()];
        place(&mut grid, staged(1), None).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.get(1).unwrap().len(), 1);
    }

    #[test]
    fn test_select_menu_row_counts_as_full() {
        let select = Slot::Foreign(Component::Other(json!({"type": 3, "custom_id": "menu"})));
        let mut grid: Grid = vec![vec![select]];
        let err = place(&mut grid, staged(1), Some(RowPosition::new(0).unwrap())).unwrap_err();
        assert!(err.to_string().contains("Row 1"));
        place(&mut grid, staged(1), None).unwrap();
        assert_eq!(grid.get(1).unwrap().len(), 1);
    }

    #[test]
    fn test_explicit_row_beyond_grid_extends_it() {
        let mut grid: Grid = Vec::new();
        place(&mut grid, staged(1), Some(RowPosition::new(3).unwrap())).unwrap();
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn test_no_room_anywhere() {
        let mut grid: Grid = (0..MAX_ROWS)
            .map(|_| (0..5).map(|_| foreign_button()).collect())
            .collect();
        assert!(matches!(
            place(&mut grid, staged(1), None),
            Err(BotError::Validation(_))
        ));
    }

    #[test]
    fn test_decode_separates_role_buttons_from_foreign() {
        let rows = vec![ActionRow::buttons([
            Button::new("button:role:7:message:3:action:give", ButtonStyle::Primary, "Seven"),
            Button::new("poll:yes", ButtonStyle::Neutral, "Yes"),
        ])];
        let grid = decode(target(), rows);
        let keys: Vec<_> = existing_descriptors(&grid).filter_map(ButtonDescriptor::key).collect();
        assert_eq!(
            keys,
            [ControlKey {
                role_id: RoleId::new(7),
                action: ButtonAction::Grant,
            }]
        );
        assert!(matches!(grid.first().unwrap().get(1), Some(Slot::Foreign(_))));
    }
}
