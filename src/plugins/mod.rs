//! Administrative commands.
//!
//! The host parses the command line and forwards the command name, its
//! arguments and a snapshot of the invoking guild. Every command requires
//! the Manage Server permission.

pub mod create_invite;
pub mod invite_config;
pub mod stats;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bot::dispatcher::AppState;
use crate::invites::GuildSnapshot;

/// Where and by whom a command was invoked.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandContext {
    pub guild: GuildSnapshot,
    pub channel_id: u64,
    pub invoker_can_manage_guild: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyField {
    pub name: String,
    pub value: String,
}

/// Reply rendered by the host, either as a plain message or an embed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandReply {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ReplyField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl CommandReply {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            ok: true,
            description: format!("✅ {}", description.into()),
            ..Default::default()
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            ok: false,
            description: format!("❌ {}", description.into()),
            ..Default::default()
        }
    }

    pub fn embed(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            ok: true,
            title: Some(title.into()),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push(ReplyField {
            name: name.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Value of a field by name.
    #[cfg(test)]
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }
}

/// All commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    InviteConfig,
    CreateInvite,
    InviteStats,
}

impl Command {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim_start_matches(['!', '?', '/']).to_lowercase().as_str() {
            "inviteconfig" => Some(Self::InviteConfig),
            "createinvite" => Some(Self::CreateInvite),
            "invitestats" => Some(Self::InviteStats),
            _ => None,
        }
    }
}

/// Route a command to its handler.
pub async fn dispatch(
    state: &AppState,
    ctx: &CommandContext,
    name: &str,
    args: &[&str],
) -> CommandReply {
    let Some(command) = Command::parse(name) else {
        return CommandReply::error(format!("Unknown command `{name}`"));
    };

    if !ctx.invoker_can_manage_guild {
        debug!(
            "Rejected {:?} in guild {}: invoker lacks Manage Server",
            command, ctx.guild.id
        );
        return CommandReply::error("You need the Manage Server permission to use this command");
    }

    match command {
        Command::InviteConfig => invite_config::inviteconfig_command(state, ctx, args).await,
        Command::CreateInvite => create_invite::createinvite_command(state, ctx, args).await,
        Command::InviteStats => stats::invitestats_command(state, ctx).await,
    }
}
