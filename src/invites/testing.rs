//! Fakes shared by the test modules.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::Document;
use parking_lot::Mutex;

use super::creator::InviteCreator;
use super::provider::{
    ChannelSnapshot, GuildSnapshot, InviteProvider, InviteRequest, ProviderFailure, ThreadSnapshot,
};
use super::rate_limit::RateLimiter;
use crate::cache::{InviteCache, SettingsCache};
use crate::database::partition::{Partition, PartitionFilter};
use crate::database::{ConfigStore, MemoryPartition};
use crate::error::PersistenceError;

/// Provider answering from per-channel queues. Channels without a queued
/// answer refuse with 403.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<HashMap<u64, VecDeque<Result<String, ProviderFailure>>>>,
    calls: Mutex<Vec<(u64, InviteRequest)>>,
}

impl ScriptedProvider {
    pub fn respond(&self, channel_id: u64, response: Result<&str, ProviderFailure>) {
        self.responses
            .lock()
            .entry(channel_id)
            .or_default()
            .push_back(response.map(str::to_string));
    }

    pub fn calls(&self) -> Vec<(u64, InviteRequest)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl InviteProvider for ScriptedProvider {
    async fn create_invite(
        &self,
        channel_id: u64,
        request: &InviteRequest,
    ) -> Result<String, ProviderFailure> {
        self.calls.lock().push((channel_id, request.clone()));
        self.responses
            .lock()
            .get_mut(&channel_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(ProviderFailure::new(403, "Missing Permissions")))
    }
}

/// Partition whose every operation fails.
pub struct FailingPartition;

impl FailingPartition {
    fn error() -> PersistenceError {
        PersistenceError::Malformed {
            id: "*".into(),
            reason: "storage offline".into(),
        }
    }
}

#[async_trait]
impl Partition for FailingPartition {
    async fn find_one(&self, _id: &str) -> Result<Option<Document>, PersistenceError> {
        Err(Self::error())
    }

    async fn upsert(&self, _id: &str, _fields: Document) -> Result<(), PersistenceError> {
        Err(Self::error())
    }

    async fn delete_one(&self, _id: &str) -> Result<bool, PersistenceError> {
        Err(Self::error())
    }

    async fn delete_many(&self, _filter: &PartitionFilter) -> Result<u64, PersistenceError> {
        Err(Self::error())
    }

    async fn count(&self, _filter: &PartitionFilter) -> Result<u64, PersistenceError> {
        Err(Self::error())
    }
}

/// Guild with channels 100 (thread channel, refuses invites), 200 (refuses),
/// 300 and 400 (both permitted), listed out of order.
pub fn guild(id: u64, can_create_invites: bool) -> GuildSnapshot {
    let channel = |id, position, can_create_invites| ChannelSnapshot {
        id,
        name: format!("channel-{id}"),
        position,
        can_create_invites,
    };

    GuildSnapshot {
        id,
        name: "Support".into(),
        can_create_invites,
        text_channels: vec![
            channel(400, 3, true),
            channel(200, 1, false),
            channel(100, 0, false),
            channel(300, 2, true),
        ],
    }
}

/// Thread 9000 on channel 100.
pub fn thread(guild: GuildSnapshot) -> ThreadSnapshot {
    ThreadSnapshot {
        thread_id: 9000,
        channel_id: 100,
        guild,
    }
}

/// Creator wired to a scripted provider and an in-memory partition.
pub struct Harness {
    pub provider: Arc<ScriptedProvider>,
    pub partition: Arc<MemoryPartition>,
    pub configs: ConfigStore,
    pub cache: InviteCache,
    pub limiter: RateLimiter,
    pub creator: InviteCreator,
}

impl Harness {
    pub fn new() -> Self {
        let partition = Arc::new(MemoryPartition::new());
        let provider = Arc::new(ScriptedProvider::default());
        let cache = InviteCache::new();
        let limiter = RateLimiter::new();
        let configs = ConfigStore::new(partition.clone(), SettingsCache::default(), cache.clone());
        let creator = InviteCreator::new(
            provider.clone(),
            configs.clone(),
            cache.clone(),
            limiter.clone(),
        );

        Self {
            provider,
            partition,
            configs,
            cache,
            limiter,
            creator,
        }
    }
}
