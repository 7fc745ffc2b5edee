//! Last created invite per guild.
//!
//! An entry never outlives the invite it points to: the TTL is the invite
//! lifetime capped at [`MAX_CACHE_SECS`] (or the guild's `cache_duration`,
//! whichever is lower), minus a [`SAFETY_MARGIN_SECS`] margin.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

/// Hard ceiling on how long an invite is reused.
pub const MAX_CACHE_SECS: u32 = 300;

/// Subtracted from every TTL so a link is dropped before it really expires.
pub const SAFETY_MARGIN_SECS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedInvite {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Volatile guild → invite map with lazy expiry.
#[derive(Clone, Default)]
pub struct InviteCache {
    entries: Arc<DashMap<u64, CachedInvite>>,
}

impl InviteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds an invite of `duration` may be served from cache.
    pub fn ttl_secs(duration: u32, cache_cap: u32) -> i64 {
        let cap = cache_cap.min(MAX_CACHE_SECS);
        i64::from(duration.min(cap)) - SAFETY_MARGIN_SECS
    }

    /// Cache `url` for a guild. Overwrites any previous entry.
    pub fn put(&self, guild_id: u64, url: &str, duration: u32, cache_cap: u32) {
        self.put_at(guild_id, url, duration, cache_cap, Utc::now());
    }

    pub fn put_at(&self, guild_id: u64, url: &str, duration: u32, cache_cap: u32, now: DateTime<Utc>) {
        let ttl = Self::ttl_secs(duration, cache_cap);
        if ttl <= 0 {
            debug!("Invite for guild {} too short-lived to cache", guild_id);
            return;
        }

        self.entries.insert(
            guild_id,
            CachedInvite {
                url: url.to_string(),
                expires_at: now + Duration::seconds(ttl),
            },
        );
    }

    /// Cached URL if still valid. Expired entries are evicted on the way out.
    pub fn get(&self, guild_id: u64) -> Option<String> {
        self.get_at(guild_id, Utc::now())
    }

    pub fn get_at(&self, guild_id: u64, now: DateTime<Utc>) -> Option<String> {
        let cached = self.entries.get(&guild_id).map(|entry| entry.value().clone())?;

        if cached.expires_at > now {
            return Some(cached.url);
        }

        self.entries
            .remove_if(&guild_id, |_, entry| entry.expires_at <= now);
        None
    }

    /// Whether a still-valid entry exists for the guild.
    pub fn contains(&self, guild_id: u64) -> bool {
        self.entries
            .get(&guild_id)
            .is_some_and(|entry| entry.expires_at > Utc::now())
    }

    pub fn invalidate(&self, guild_id: u64) {
        self.entries.remove(&guild_id);
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn evict_expired_at(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<u64> = self
            .entries
            .iter()
            .filter(|entry| entry.expires_at <= now)
            .map(|entry| *entry.key())
            .collect();

        expired
            .into_iter()
            .filter(|guild_id| {
                self.entries
                    .remove_if(guild_id, |_, entry| entry.expires_at <= now)
                    .is_some()
            })
            .count()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for InviteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InviteCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_ttl_respects_cap_and_margin() {
        assert_eq!(InviteCache::ttl_secs(86_400, 300), 270);
        assert_eq!(InviteCache::ttl_secs(120, 300), 90);
        assert_eq!(InviteCache::ttl_secs(86_400, 120), 90);
        assert_eq!(InviteCache::ttl_secs(86_400, 900), 270);
    }

    #[test]
    fn test_entry_valid_until_margin_before_expiry() {
        for duration in [60, 120, 300, 86_400] {
            let cache = InviteCache::new();
            cache.put_at(1, "https://discord.gg/abc", duration, 300, at(0));

            let window = i64::from(duration.min(300));
            assert_eq!(
                cache.get_at(1, at(window - 31)).as_deref(),
                Some("https://discord.gg/abc"),
                "duration {duration}"
            );
            assert_eq!(cache.get_at(1, at(window - 29)), None, "duration {duration}");
        }
    }

    #[test]
    fn test_expired_read_evicts_entry() {
        let cache = InviteCache::new();
        cache.put_at(1, "https://discord.gg/abc", 300, 300, at(0));

        assert_eq!(cache.get_at(1, at(400)), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_put_overwrites_previous_invite() {
        let cache = InviteCache::new();
        cache.put_at(1, "https://discord.gg/old", 300, 300, at(0));
        cache.put_at(1, "https://discord.gg/new", 300, 300, at(10));

        assert_eq!(cache.get_at(1, at(20)).as_deref(), Some("https://discord.gg/new"));
    }

    #[test]
    fn test_evict_expired_keeps_live_entries() {
        let cache = InviteCache::new();
        cache.put_at(1, "https://discord.gg/short", 60, 300, at(0));
        cache.put_at(2, "https://discord.gg/long", 86_400, 300, at(0));

        assert_eq!(cache.evict_expired_at(at(100)), 1);
        assert_eq!(cache.get_at(2, at(100)).as_deref(), Some("https://discord.gg/long"));
        assert_eq!(cache.get_at(1, at(0)), None);
    }
}
