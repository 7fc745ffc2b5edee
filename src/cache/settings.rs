//! Read cache for guild settings, backed by Moka.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use crate::database::models::GuildConfig;

/// Loaded guild configs, keyed by guild id.
///
/// Cloning is cheap and shares the underlying cache.
#[derive(Clone)]
pub struct SettingsCache {
    inner: Arc<Cache<u64, GuildConfig>>,
}

impl SettingsCache {
    /// Create a cache holding at most `max_capacity` guilds for `ttl` each.
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(cache),
        }
    }

    pub fn get(&self, guild_id: u64) -> Option<GuildConfig> {
        self.inner.get(&guild_id)
    }

    pub fn insert(&self, guild_id: u64, config: GuildConfig) {
        self.inner.insert(guild_id, config);
    }

    pub fn invalidate(&self, guild_id: u64) {
        self.inner.invalidate(&guild_id);
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new(10_000, Duration::from_secs(300))
    }
}

impl std::fmt::Debug for SettingsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}
