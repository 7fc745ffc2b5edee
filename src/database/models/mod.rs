//! Stored document models.

pub mod guild_config;
pub mod thread_invite;

pub use guild_config::{GuildConfig, Setting};
pub use thread_invite::ThreadInviteRecord;
