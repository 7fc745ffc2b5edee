//! `createinvite [duration] [uses]` - manual invite for the invoking channel.

use tracing::warn;

use super::{CommandContext, CommandReply};
use crate::bot::dispatcher::AppState;
use crate::database::models::Setting;
use crate::error::InviteError;
use crate::invites::ChannelTarget;

pub async fn createinvite_command(
    state: &AppState,
    ctx: &CommandContext,
    args: &[&str],
) -> CommandReply {
    let mut config = state.configs.get(ctx.guild.id).await;

    // Overrides apply to this invite only and are never stored.
    let overrides = [("duration", args.first()), ("uses", args.get(1))];
    for (key, raw) in overrides {
        let Some(raw) = raw else { continue };
        match Setting::parse(key, raw) {
            Ok(setting) => setting.apply(&mut config),
            Err(e) => return CommandReply::error(e.to_string()),
        }
    }

    let target = ChannelTarget {
        guild: &ctx.guild,
        channel_id: ctx.channel_id,
    };

    match state.creator.try_create_invite(&target, Some(&config)).await {
        Ok(url) => CommandReply::embed("🔗 Invite Created", format!("[Click here to join]({url})"))
            .field("Duration", format!("{} seconds", config.duration))
            .field("Max Uses", config.max_uses),
        Err(e) => {
            warn!("Manual invite failed in guild {}: {}", ctx.guild.id, e);
            CommandReply::error(failure_message(&e))
        }
    }
}

fn failure_message(error: &InviteError) -> String {
    match error {
        InviteError::PermissionDenied { .. } => {
            "The bot is missing the Create Invite permission in this server".to_string()
        }
        InviteError::Throttled { retry_after } => format!(
            "Invite creation is rate limited, try again in {}s",
            retry_after.ceil() as u64
        ),
        InviteError::NoChannelAvailable { .. } => {
            "No channel in this server allows the bot to create invites".to_string()
        }
        InviteError::ChannelUnavailable { .. } | InviteError::Provider { .. } => {
            "Failed to create invite. Check bot permissions.".to_string()
        }
    }
}
