//! Thread invite records.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::database::models::ThreadInviteRecord;
use crate::database::partition::{Partition, PartitionFilter};
use crate::error::PersistenceError;

/// Repository for `thread_<id>` documents.
#[derive(Clone)]
pub struct ThreadInviteRepository {
    partition: Arc<dyn Partition>,
}

impl ThreadInviteRepository {
    pub fn new(partition: Arc<dyn Partition>) -> Self {
        Self { partition }
    }

    /// Save (upsert) a record.
    pub async fn save(&self, record: &ThreadInviteRecord) -> Result<(), PersistenceError> {
        let id = ThreadInviteRecord::document_id(record.thread_id);
        let fields = record.to_fields().map_err(|e| PersistenceError::Malformed {
            id: id.clone(),
            reason: e.to_string(),
        })?;
        self.partition.upsert(&id, fields).await?;

        debug!("Stored invite for thread {}", record.thread_id);
        Ok(())
    }

    /// Fetch a record, if present.
    pub async fn get(&self, thread_id: u64) -> Result<Option<ThreadInviteRecord>, PersistenceError> {
        let id = ThreadInviteRecord::document_id(thread_id);
        let Some(document) = self.partition.find_one(&id).await? else {
            return Ok(None);
        };

        match ThreadInviteRecord::from_document(&document) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("Malformed thread record {}: {}", id, e);
                Err(PersistenceError::Malformed {
                    id,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Delete the record for a thread. Returns whether one existed.
    pub async fn delete(&self, thread_id: u64) -> Result<bool, PersistenceError> {
        self.partition
            .delete_one(&ThreadInviteRecord::document_id(thread_id))
            .await
    }

    /// Delete every record created before `cutoff`.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, PersistenceError> {
        let filter =
            PartitionFilter::id_prefix(ThreadInviteRecord::PREFIX).older_than("created_at", cutoff);
        self.partition.delete_many(&filter).await
    }

    /// Number of stored records for a guild.
    pub async fn count_for_guild(&self, guild_id: u64) -> Result<u64, PersistenceError> {
        let filter = PartitionFilter::id_prefix(ThreadInviteRecord::PREFIX)
            .field_eq("guild_id", guild_id as i64);
        self.partition.count(&filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryPartition;
    use chrono::Duration;

    fn repo() -> ThreadInviteRepository {
        ThreadInviteRepository::new(Arc::new(MemoryPartition::new()))
    }

    #[tokio::test]
    async fn test_save_get_delete() {
        let repo = repo();
        let record = ThreadInviteRecord::new(10, 1, "https://discord.gg/abc");

        repo.save(&record).await.unwrap();
        let stored = repo.get(10).await.unwrap().unwrap();
        assert_eq!(stored.invite_url, "https://discord.gg/abc");
        assert_eq!(stored.guild_id, 1);
        assert_eq!(
            stored.created_at.timestamp_millis(),
            record.created_at.timestamp_millis()
        );

        assert!(repo.delete(10).await.unwrap());
        assert_eq!(repo.get(10).await.unwrap(), None);
        assert!(!repo.delete(10).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_older_than_spares_newer_records() {
        let repo = repo();
        let now = Utc::now();

        let mut stale = ThreadInviteRecord::new(1, 5, "https://discord.gg/stale");
        stale.created_at = now - Duration::days(8);
        let mut recent = ThreadInviteRecord::new(2, 5, "https://discord.gg/recent");
        recent.created_at = now - Duration::days(6);
        repo.save(&stale).await.unwrap();
        repo.save(&recent).await.unwrap();

        let deleted = repo.delete_older_than(now - Duration::days(7)).await.unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(repo.get(1).await.unwrap(), None);
        assert!(repo.get(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_malformed_record_is_an_error() {
        let partition = Arc::new(MemoryPartition::new());
        partition
            .upsert("thread_4", mongodb::bson::doc! { "invite_url": 12_i64 })
            .await
            .unwrap();
        let repo = ThreadInviteRepository::new(partition);

        assert!(matches!(
            repo.get(4).await,
            Err(PersistenceError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_ids_beyond_int64_are_not_saved() {
        let partition = Arc::new(MemoryPartition::new());
        let repo = ThreadInviteRepository::new(partition.clone());
        let record = ThreadInviteRecord::new(u64::MAX, 1, "https://discord.gg/abc");

        assert!(matches!(
            repo.save(&record).await,
            Err(PersistenceError::Malformed { .. })
        ));
        assert_eq!(partition.len(), 0);
    }

    #[tokio::test]
    async fn test_count_for_guild() {
        let repo = repo();
        repo.save(&ThreadInviteRecord::new(1, 5, "a")).await.unwrap();
        repo.save(&ThreadInviteRecord::new(2, 5, "b")).await.unwrap();
        repo.save(&ThreadInviteRecord::new(3, 6, "c")).await.unwrap();

        assert_eq!(repo.count_for_guild(5).await.unwrap(), 2);
        assert_eq!(repo.count_for_guild(9).await.unwrap(), 0);
    }
}
