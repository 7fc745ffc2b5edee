//! `invitestats` - per-guild invite statistics.

use tracing::error;

use super::{CommandContext, CommandReply};
use crate::bot::dispatcher::AppState;

pub async fn invitestats_command(state: &AppState, ctx: &CommandContext) -> CommandReply {
    let guild_id = ctx.guild.id;

    let active_threads = match state.records.count_for_guild(guild_id).await {
        Ok(count) => count,
        Err(e) => {
            error!("Failed to count thread invites for guild {}: {}", guild_id, e);
            return CommandReply::error("Error retrieving statistics");
        }
    };

    let cached = u8::from(state.invite_cache().contains(guild_id));

    let rate_limit = match state.rate_limiter().remaining(guild_id) {
        Some(remaining) => format!("{}s remaining", remaining.num_seconds().max(0)),
        None => "✅ Clear".to_string(),
    };

    CommandReply::embed("📊 Invite Plugin Statistics", "")
        .field("Active Thread Invites", active_threads)
        .field("Cached Invites", cached)
        .field("Rate Limit", rate_limit)
}
