//! Error taxonomy.
//!
//! Only [`ValidationError`] is ever shown to an end user. Everything else is
//! logged and converted into a "no invite" outcome at the call site.

use thiserror::Error;

/// A configuration value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Duration must be between 60 and 604800 seconds (1 minute to 7 days)")]
    Duration,

    #[error("Uses must be between 1 and 100")]
    Uses,

    #[error("Cooldown must be between 1 and 3600 seconds")]
    Cooldown,

    #[error("Cache duration must be between 60 and 300 seconds")]
    CacheDuration,

    #[error("{0} must be true or false")]
    Boolean(&'static str),

    #[error("Fallback channel must be a channel ID or empty")]
    FallbackChannel,

    #[error("`{0}` is not a whole number")]
    NotANumber(String),

    #[error("Unknown setting `{0}`")]
    UnknownSetting(String),
}

/// Why an invite could not be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InviteError {
    #[error("bot is missing the create-invite permission in guild {guild_id}")]
    PermissionDenied { guild_id: u64 },

    #[error("invite creation is rate limited, retry after {retry_after:.0}s")]
    Throttled { retry_after: f64 },

    #[error("channel {channel_id} could not host an invite: {reason}")]
    ChannelUnavailable { channel_id: u64, reason: String },

    #[error("no channels available for invite creation in guild {guild_id}")]
    NoChannelAvailable { guild_id: u64 },

    #[error("invite provider failed with status {status}: {message}")]
    Provider { status: u16, message: String },
}

/// A persistence partition operation failed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("malformed document `{id}`: {reason}")]
    Malformed { id: String, reason: String },
}

/// Failure of a configuration write.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
