//! Shared application state.
//!
//! Wires the partition and the invite provider into the repositories,
//! caches and handlers that the bridge routes dispatch to.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{InviteCache, SettingsCache};
use crate::database::{ConfigStore, Partition, ThreadInviteRepository};
use crate::events::ThreadHooks;
use crate::invites::{InviteCreator, InviteProvider, RateLimiter};

/// Guild settings kept in the read cache at most.
const SETTINGS_CACHE_CAPACITY: u64 = 10_000;

#[derive(Clone)]
pub struct AppState {
    /// Guild settings (cached).
    pub configs: ConfigStore,

    /// Invite creation with cache, cooldowns and fallback.
    pub creator: InviteCreator,

    /// Thread lifecycle hooks.
    pub hooks: ThreadHooks,

    /// Persisted thread invites.
    pub records: ThreadInviteRepository,

    /// Shared secret expected in `x-bridge-secret`, if any.
    pub bridge_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        partition: Arc<dyn Partition>,
        provider: Arc<dyn InviteProvider>,
        settings_ttl: Duration,
        bridge_secret: Option<String>,
    ) -> Self {
        let invites = InviteCache::new();
        let limiter = RateLimiter::new();
        let configs = ConfigStore::new(
            partition.clone(),
            SettingsCache::new(SETTINGS_CACHE_CAPACITY, settings_ttl),
            invites.clone(),
        );
        let records = ThreadInviteRepository::new(partition);
        let creator = InviteCreator::new(provider, configs.clone(), invites, limiter);
        let hooks = ThreadHooks::new(configs.clone(), creator.clone(), records.clone());

        Self {
            configs,
            creator,
            hooks,
            records,
            bridge_secret: bridge_secret.map(Arc::from),
        }
    }

    pub fn invite_cache(&self) -> &InviteCache {
        self.creator.cache()
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        self.creator.limiter()
    }
}
