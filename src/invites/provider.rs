//! Host snapshots and the invite provider seam.
//!
//! The host bot owns guild state and permission resolution. It hands the
//! plugin a snapshot of what the bot may do; the plugin only ever asks the
//! provider to mint an invite on a given channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::database::models::GuildConfig;

/// A text channel as seen by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: i32,
    /// The bot may create invites on this channel.
    #[serde(default)]
    pub can_create_invites: bool,
}

/// A guild as seen by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSnapshot {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Guild-wide create-invite permission of the bot.
    pub can_create_invites: bool,
    #[serde(default)]
    pub text_channels: Vec<ChannelSnapshot>,
}

impl GuildSnapshot {
    pub fn channel(&self, channel_id: u64) -> Option<&ChannelSnapshot> {
        self.text_channels.iter().find(|c| c.id == channel_id)
    }

    /// Text channels in display order (position, then id).
    pub fn channels_in_order(&self) -> Vec<&ChannelSnapshot> {
        let mut channels: Vec<_> = self.text_channels.iter().collect();
        channels.sort_by_key(|c| (c.position, c.id));
        channels
    }
}

/// Anything an invite can be created for: a channel inside a guild, plus an
/// identifier used in the audit reason.
pub trait InviteTarget {
    fn channel_id(&self) -> u64;
    fn guild(&self) -> &GuildSnapshot;
    fn target_id(&self) -> u64;
}

/// A modmail thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    pub thread_id: u64,
    pub channel_id: u64,
    pub guild: GuildSnapshot,
}

impl InviteTarget for ThreadSnapshot {
    fn channel_id(&self) -> u64 {
        self.channel_id
    }

    fn guild(&self) -> &GuildSnapshot {
        &self.guild
    }

    fn target_id(&self) -> u64 {
        self.thread_id
    }
}

/// A plain channel standing in for a thread (manual invite command).
#[derive(Debug, Clone, Copy)]
pub struct ChannelTarget<'a> {
    pub guild: &'a GuildSnapshot,
    pub channel_id: u64,
}

impl InviteTarget for ChannelTarget<'_> {
    fn channel_id(&self) -> u64 {
        self.channel_id
    }

    fn guild(&self) -> &GuildSnapshot {
        self.guild
    }

    fn target_id(&self) -> u64 {
        self.channel_id
    }
}

/// Parameters of one invite creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteRequest {
    /// Lifetime in seconds.
    pub max_age: u32,
    pub max_uses: u32,
    pub temporary: bool,
    /// Ask for a fresh invite instead of reusing a matching one. Always set:
    /// a reused single-use link would be handed to two users.
    pub unique: bool,
    /// Audit log reason.
    pub reason: String,
}

impl InviteRequest {
    /// Lifetime of last-resort invites.
    pub const EMERGENCY_MAX_AGE: u32 = 3600;

    /// Request built from guild settings.
    pub fn from_config(config: &GuildConfig, reason: impl Into<String>) -> Self {
        Self {
            max_age: config.duration,
            max_uses: config.max_uses,
            temporary: config.temporary,
            unique: true,
            reason: reason.into(),
        }
    }

    /// Short-lived single-use invite for the last fallback tier.
    pub fn emergency(reason: impl Into<String>) -> Self {
        Self {
            max_age: Self::EMERGENCY_MAX_AGE,
            max_uses: 1,
            temporary: false,
            unique: true,
            reason: reason.into(),
        }
    }
}

/// How a failed call should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TooManyRequests,
    Forbidden,
    Other,
}

/// A failed invite call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    /// HTTP status, or 0 when the request never got a response.
    pub status: u16,
    /// Provider's retry hint in seconds.
    pub retry_after: Option<f64>,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_retry_after(mut self, secs: f64) -> Self {
        self.retry_after = Some(secs);
        self
    }

    pub fn kind(&self) -> FailureKind {
        match self.status {
            429 => FailureKind::TooManyRequests,
            403 => FailureKind::Forbidden,
            _ => FailureKind::Other,
        }
    }
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

/// The external invite-creation capability.
#[async_trait]
pub trait InviteProvider: Send + Sync {
    /// Create an invite on `channel_id` and return its URL.
    async fn create_invite(
        &self,
        channel_id: u64,
        request: &InviteRequest,
    ) -> Result<String, ProviderFailure>;
}
