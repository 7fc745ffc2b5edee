//! Invite persisted for an open thread.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use serde::{Deserialize, Serialize};

/// Stored under `thread_<thread>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadInviteRecord {
    pub thread_id: u64,
    pub guild_id: u64,
    pub invite_url: String,
    /// BSON datetime, so the sweeper can filter on it with `$lt`.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ThreadInviteRecord {
    /// Key prefix shared by every thread record.
    pub const PREFIX: &'static str = "thread_";

    pub fn new(thread_id: u64, guild_id: u64, invite_url: impl Into<String>) -> Self {
        Self {
            thread_id,
            guild_id,
            invite_url: invite_url.into(),
            created_at: Utc::now(),
        }
    }

    /// Partition key for a thread record.
    pub fn document_id(thread_id: u64) -> String {
        format!("{}{thread_id}", Self::PREFIX)
    }

    /// Fields written with `$set`.
    pub fn to_fields(&self) -> Result<Document, bson::ser::Error> {
        bson::to_document(self)
    }

    /// Decode a stored record. The partition's `_id` is ignored.
    pub fn from_document(document: &Document) -> Result<Self, bson::de::Error> {
        bson::from_document(document.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_document_round_trip() {
        let record = ThreadInviteRecord::new(9000, 1, "https://discord.gg/abc");

        let mut stored = record.to_fields().unwrap();
        assert!(stored.get_datetime("created_at").is_ok());
        stored.insert("_id", ThreadInviteRecord::document_id(9000));

        let decoded = ThreadInviteRecord::from_document(&stored).unwrap();
        assert_eq!(decoded.thread_id, 9000);
        assert_eq!(decoded.guild_id, 1);
        assert_eq!(decoded.invite_url, "https://discord.gg/abc");
        assert_eq!(
            decoded.created_at.timestamp_millis(),
            record.created_at.timestamp_millis()
        );
    }

    #[test]
    fn test_ids_are_stored_as_int64() {
        let record = ThreadInviteRecord::new(9000, 1, "https://discord.gg/abc");
        let stored = record.to_fields().unwrap();

        assert_eq!(stored.get_i64("guild_id").unwrap(), 1);
        assert_eq!(stored.get_i64("thread_id").unwrap(), 9000);
    }

    #[test]
    fn test_negative_ids_are_rejected() {
        let stored = doc! {
            "thread_id": -5_i64,
            "guild_id": 1_i64,
            "invite_url": "https://discord.gg/abc",
            "created_at": bson::DateTime::now(),
        };

        assert!(ThreadInviteRecord::from_document(&stored).is_err());
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let stored = doc! { "thread_id": 5_i64, "invite_url": "https://discord.gg/abc" };

        assert!(ThreadInviteRecord::from_document(&stored).is_err());
    }
}
