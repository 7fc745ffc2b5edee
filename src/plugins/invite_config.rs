//! `inviteconfig` - view and change a guild's invite settings.

use tracing::{error, info};

use super::{CommandContext, CommandReply};
use crate::bot::dispatcher::AppState;
use crate::database::models::{GuildConfig, Setting};
use crate::error::ConfigError;
use crate::utils::{channel_mention, format_duration};

/// `inviteconfig` shows the settings; `inviteconfig <setting> <value>` changes one.
pub async fn inviteconfig_command(
    state: &AppState,
    ctx: &CommandContext,
    args: &[&str],
) -> CommandReply {
    let Some((key, rest)) = args.split_first() else {
        let config = state.configs.get(ctx.guild.id).await;
        return show_config(ctx, &config);
    };

    let setting = match Setting::parse(key, &rest.join(" ")) {
        Ok(setting) => setting,
        Err(e) => return CommandReply::error(e.to_string()),
    };

    if let Setting::FallbackChannel(Some(channel_id)) = setting
        && ctx.guild.channel(channel_id).is_none()
    {
        return CommandReply::error(format!(
            "Channel {channel_id} is not a text channel in this server"
        ));
    }

    match state.configs.set(ctx.guild.id, setting).await {
        Ok(()) => {
            info!("Guild {} updated {}", ctx.guild.id, setting.field());
            CommandReply::success(confirmation(setting))
        }
        Err(ConfigError::Validation(e)) => CommandReply::error(e.to_string()),
        Err(ConfigError::Persistence(e)) => {
            error!("Failed to save settings for guild {}: {}", ctx.guild.id, e);
            CommandReply::error("Failed to save settings, try again later")
        }
    }
}

fn show_config(ctx: &CommandContext, config: &GuildConfig) -> CommandReply {
    let fallback = match config.fallback_channel {
        Some(id) if ctx.guild.channel(id).is_some() => channel_mention(id),
        Some(id) => format!("Invalid Channel ({id})"),
        None => "None".to_string(),
    };

    CommandReply::embed(
        "🔗 Invite Plugin Configuration",
        "Current settings for Discord invite generation",
    )
    .field("Duration", format_duration(config.duration))
    .field("Max Uses", config.max_uses)
    .field("Auto Create", check(config.auto_create))
    .field("Temporary", check(config.temporary))
    .field("Fallback Channel", fallback)
    .field("Rate Limit Cooldown", format_duration(config.cooldown_seconds))
    .field("Cache Duration", format_duration(config.cache_duration))
    .footer("Use the subcommands to modify settings")
}

fn confirmation(setting: Setting) -> String {
    match setting {
        Setting::Duration(secs) => format!("Invite duration set to {}", format_duration(secs)),
        Setting::MaxUses(uses) => format!("Invite usage limit set to {uses}"),
        Setting::AutoCreate(true) => "Automatic invite creation enabled".to_string(),
        Setting::AutoCreate(false) => "Automatic invite creation disabled".to_string(),
        Setting::Temporary(true) => "Invites will now grant temporary membership".to_string(),
        Setting::Temporary(false) => "Invites will now grant permanent membership".to_string(),
        Setting::FallbackChannel(Some(id)) => {
            format!("Fallback channel set to {}", channel_mention(id))
        }
        Setting::FallbackChannel(None) => "Fallback channel cleared".to_string(),
        Setting::Cooldown(secs) => {
            format!("Rate limit cooldown set to {}", format_duration(secs))
        }
        Setting::CacheDuration(secs) => {
            format!("Invite cache duration set to {}", format_duration(secs))
        }
    }
}

fn check(enabled: bool) -> &'static str {
    if enabled { "✅" } else { "❌" }
}
