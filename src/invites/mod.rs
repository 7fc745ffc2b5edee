//! Invite creation: provider seam, cooldowns and the fallback procedure.

pub mod creator;
pub mod discord;
pub mod provider;
pub mod rate_limit;

#[cfg(test)]
pub mod testing;

pub use creator::InviteCreator;
pub use discord::DiscordProvider;
pub use provider::{ChannelTarget, GuildSnapshot, InviteProvider, ThreadSnapshot};
pub use rate_limit::RateLimiter;
