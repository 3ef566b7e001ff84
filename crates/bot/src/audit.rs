//! Audit channel notices.
//!
//! Every button added or changed, and every failure worth a moderator's
//! attention, is posted to a fixed channel. Posting is best effort: a failed
//! notice is logged and never surfaces to the user who caused it.

use std::time::Duration;

use chrono::Utc;
use rolebutton_core::{ChannelId, RoleId, UserId};

use crate::descriptor::ButtonDescriptor;
use crate::error::BotError;
use crate::host::{Actor, AuditSink, MessageRef};
use crate::ui::{Screen, Tone};

/// The channel audit notices go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditChannel(ChannelId);

impl AuditChannel {
    #[must_use]
    pub const fn new(channel_id: ChannelId) -> Self {
        Self(channel_id)
    }

    #[must_use]
    pub const fn id(self) -> ChannelId {
        self.0
    }

    /// Post a notice, logging (not returning) any failure.
    pub async fn notify<S: AuditSink>(self, sink: &S, notice: Screen) {
        if let Err(e) = sink.send_notification(self.0, notice).await {
            tracing::warn!(
                channel_id = %self.0,
                error = %e,
                "Failed to post audit notice"
            );
        }
    }
}

/// A role button was added to a message.
#[must_use]
pub fn button_added(operator: &Actor, descriptor: &ButtonDescriptor) -> Screen {
    button_notice(operator, descriptor, "added")
}

/// An existing role button was changed.
#[must_use]
pub fn button_updated(operator: &Actor, descriptor: &ButtonDescriptor) -> Screen {
    button_notice(operator, descriptor, "updated")
}

fn button_notice(operator: &Actor, descriptor: &ButtonDescriptor, verb: &str) -> Screen {
    let action = descriptor.action.map_or("?", |a| a.label());
    let role = descriptor
        .role_id
        .map_or_else(|| "an unknown role".to_string(), |id| format!("<@&{id}>"));

    let mut screen = Screen::new(
        Tone::Success,
        format!(
            "{} {verb} a **{action}** button for {role} on {}",
            operator.mention(),
            descriptor.target.jump_url()
        ),
    )
    .title(format!("Role button {verb}"))
    .field("Button", descriptor.display_name(), true);

    if let Some(style) = descriptor.style {
        screen = screen.field("Colour", style.display_name(), true);
    }
    if let Some(row) = descriptor.position {
        screen = screen.field("Row", row.to_string(), true);
    }
    screen.footer(timestamp())
}

/// An interaction failed in a way moderators should see.
#[must_use]
pub fn interaction_failed(
    actor: UserId,
    err: &BotError,
    target: Option<&MessageRef>,
    role_id: Option<RoleId>,
) -> Screen {
    let mut screen = Screen::new(
        Tone::Error,
        format!("An interaction by <@{actor}> failed: {err}"),
    )
    .title("Interaction failed")
    .field("Kind", err.kind(), true);

    if let Some(role_id) = role_id {
        screen = screen.field("Role", format!("<@&{role_id}>"), true);
    }
    if let Some(target) = target {
        screen = screen.field("Message", target.jump_url(), false);
    }
    screen.footer(timestamp())
}

/// A role button press ran out of time.
#[must_use]
pub fn press_timed_out(
    user: UserId,
    role_id: RoleId,
    target: &MessageRef,
    timeout: Duration,
) -> Screen {
    Screen::new(
        Tone::Error,
        format!(
            "A press by <@{user}> on the <@&{role_id}> button did not finish within {}s. \
             The role change may or may not have been applied.",
            timeout.as_secs()
        ),
    )
    .title("Role button timed out")
    .field("Message", target.jump_url(), false)
    .footer(timestamp())
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use rolebutton_core::{ButtonAction, ButtonStyle, GuildId, MessageId};

    use super::*;

    fn target() -> MessageRef {
        MessageRef {
            guild_id: GuildId::new(1),
            channel_id: ChannelId::new(2),
            message_id: MessageId::new(3),
        }
    }

    #[test]
    fn test_button_added_mentions_operator_role_and_message() {
        let operator = Actor {
            id: UserId::new(5),
            name: "mod".into(),
        };
        let descriptor = ButtonDescriptor::builder(target())
            .role_id(RoleId::new(42))
            .action(ButtonAction::Grant)
            .style(ButtonStyle::Affirmative)
            .build();

        let notice = button_added(&operator, &descriptor);
        assert_eq!(
            notice.description,
            "<@5> added a **Give** button for <@&42> on https://discord.com/channels/1/2/3"
        );
        assert!(notice.fields.iter().any(|f| f.value == "Success (Green)"));
    }

    #[test]
    fn test_failure_notice_carries_kind() {
        let notice = interaction_failed(
            UserId::new(9),
            &BotError::Permission("nope".into()),
            Some(&target()),
            Some(RoleId::new(42)),
        );
        assert_eq!(notice.tone, Tone::Error);
        assert!(notice.fields.iter().any(|f| f.value == "permission"));
        assert!(notice.fields.iter().any(|f| f.value == "<@&42>"));
    }

    #[test]
    fn test_timeout_notice() {
        let notice = press_timed_out(
            UserId::new(9),
            RoleId::new(42),
            &target(),
            Duration::from_secs(10),
        );
        assert!(notice.description.contains("within 10s"));
    }
}
