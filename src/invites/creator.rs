//! Invite creation.
//!
//! Order of attempts:
//! 1. guild-wide permission check
//! 2. rate-limit gate (serve the cached invite or give up)
//! 3. the target's own channel
//! 4. on 403: the configured fallback channel, then the first permitted
//!    text channel with a short single-use invite
//!
//! A 429 records a guild cooldown and never falls back.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::provider::{FailureKind, GuildSnapshot, InviteProvider, InviteRequest, InviteTarget};
use super::rate_limit::RateLimiter;
use crate::cache::InviteCache;
use crate::database::models::GuildConfig;
use crate::database::ConfigStore;
use crate::error::InviteError;

#[derive(Clone)]
pub struct InviteCreator {
    provider: Arc<dyn InviteProvider>,
    configs: ConfigStore,
    cache: InviteCache,
    limiter: RateLimiter,
}

impl InviteCreator {
    pub fn new(
        provider: Arc<dyn InviteProvider>,
        configs: ConfigStore,
        cache: InviteCache,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            provider,
            configs,
            cache,
            limiter,
        }
    }

    /// Create (or reuse) an invite for the target. `None` means no invite
    /// could be produced; the reason has already been logged.
    pub async fn create_invite<T>(&self, target: &T, config: Option<&GuildConfig>) -> Option<String>
    where
        T: InviteTarget + Sync + ?Sized,
    {
        self.try_create_invite(target, config).await.ok()
    }

    /// Like [`create_invite`](Self::create_invite) but reports why nothing
    /// was produced.
    pub async fn try_create_invite<T>(
        &self,
        target: &T,
        config: Option<&GuildConfig>,
    ) -> Result<String, InviteError>
    where
        T: InviteTarget + Sync + ?Sized,
    {
        let guild = target.guild();
        let config = match config {
            Some(config) => config.clone(),
            None => self.configs.get(guild.id).await,
        };

        if !guild.can_create_invites {
            warn!(
                "Permission error in guild {}: bot missing CREATE_INSTANT_INVITE",
                guild.id
            );
            return Err(InviteError::PermissionDenied { guild_id: guild.id });
        }

        if self.limiter.is_limited(guild.id) {
            if let Some(url) = self.cache.get(guild.id) {
                debug!("Returning cached invite for rate limited guild {}", guild.id);
                return Ok(url);
            }

            warn!("Rate limited and no cached invite for guild {}", guild.id);
            let retry_after = self
                .limiter
                .remaining(guild.id)
                .map_or(0.0, |left| left.num_milliseconds() as f64 / 1000.0);
            return Err(InviteError::Throttled { retry_after });
        }

        let request = InviteRequest::from_config(
            &config,
            format!("Modmail invite for thread {}", target.target_id()),
        );

        let failure = match self.provider.create_invite(target.channel_id(), &request).await {
            Ok(url) => {
                self.cache
                    .put(guild.id, &url, config.duration, config.cache_duration);
                info!(
                    "Created invite for thread {} in guild {}",
                    target.target_id(),
                    guild.id
                );
                return Ok(url);
            }
            Err(failure) => failure,
        };

        match failure.kind() {
            FailureKind::TooManyRequests => {
                let retry_after = failure
                    .retry_after
                    .unwrap_or(f64::from(config.cooldown_seconds));
                self.limiter.set_limit(guild.id, retry_after);
                warn!(
                    "Rate limited in guild {}, retry after {}s",
                    guild.id, retry_after
                );

                self.cache
                    .get(guild.id)
                    .ok_or(InviteError::Throttled { retry_after })
            }
            FailureKind::Forbidden => {
                warn!(
                    "Permission denied for thread channel in guild {}, trying fallback",
                    guild.id
                );
                self.try_fallback(guild, &config).await
            }
            FailureKind::Other => {
                error!("Error creating invite in guild {}: {}", guild.id, failure);
                Err(InviteError::Provider {
                    status: failure.status,
                    message: failure.message,
                })
            }
        }
    }

    /// Configured fallback channel first, then any permitted text channel.
    async fn try_fallback(
        &self,
        guild: &GuildSnapshot,
        config: &GuildConfig,
    ) -> Result<String, InviteError> {
        if let Some(fallback_id) = config.fallback_channel {
            match guild.channel(fallback_id) {
                Some(channel) if channel.can_create_invites => {
                    let request =
                        InviteRequest::from_config(config, "Modmail invite (fallback channel)");
                    match self.provider.create_invite(channel.id, &request).await {
                        Ok(url) => {
                            self.cache
                                .put(guild.id, &url, config.duration, config.cache_duration);
                            info!(
                                "Created fallback invite in channel {} for guild {}",
                                channel.id, guild.id
                            );
                            return Ok(url);
                        }
                        Err(failure) => {
                            let unavailable = InviteError::ChannelUnavailable {
                                channel_id: channel.id,
                                reason: failure.to_string(),
                            };
                            warn!("Fallback failed in guild {}: {}", guild.id, unavailable);
                        }
                    }
                }
                Some(channel) => {
                    debug!("No invite permission in fallback channel {}", channel.id);
                }
                None => {
                    warn!(
                        "Fallback channel {} not found in guild {}",
                        fallback_id, guild.id
                    );
                }
            }
        }

        let request = InviteRequest::emergency("Modmail invite (emergency fallback)");
        for channel in guild
            .channels_in_order()
            .into_iter()
            .filter(|c| c.can_create_invites)
        {
            match self.provider.create_invite(channel.id, &request).await {
                Ok(url) => {
                    info!(
                        "Created emergency fallback invite in channel {} for guild {}",
                        channel.id, guild.id
                    );
                    return Ok(url);
                }
                Err(failure) => {
                    debug!("Emergency invite failed in channel {}: {}", channel.id, failure);
                }
            }
        }

        error!("No channels available for invite creation in guild {}", guild.id);
        Err(InviteError::NoChannelAvailable { guild_id: guild.id })
    }

    pub fn cache(&self) -> &InviteCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}
