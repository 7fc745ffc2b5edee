//! Plugin persistence partition.
//!
//! A partition is a flat set of keyed documents. Keys follow the
//! `config_<guild>` / `thread_<thread>` convention, so a key prefix is
//! enough to select one kind of record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, Bson, Document};

use crate::error::PersistenceError;

/// Document store operations the plugin relies on.
#[async_trait]
pub trait Partition: Send + Sync {
    /// Fetch a document by key.
    async fn find_one(&self, id: &str) -> Result<Option<Document>, PersistenceError>;

    /// `$set` the given fields on a document, creating it when missing.
    ///
    /// Field names may be dotted paths (`settings.invite_uses`).
    async fn upsert(&self, id: &str, fields: Document) -> Result<(), PersistenceError>;

    /// Delete a document by key. Returns whether anything was removed.
    async fn delete_one(&self, id: &str) -> Result<bool, PersistenceError>;

    /// Delete every document matching the filter.
    async fn delete_many(&self, filter: &PartitionFilter) -> Result<u64, PersistenceError>;

    /// Count documents matching the filter.
    async fn count(&self, filter: &PartitionFilter) -> Result<u64, PersistenceError>;
}

/// Conjunctive filter over partition documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionFilter {
    id_prefix: Option<String>,
    equals: Vec<(String, Bson)>,
    before: Option<(String, DateTime<Utc>)>,
}

impl PartitionFilter {
    /// Match documents whose key starts with `prefix`.
    pub fn id_prefix(prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: Some(prefix.into()),
            ..Default::default()
        }
    }

    /// Additionally require `field == value`.
    #[must_use]
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    /// Additionally require the datetime `field` to be strictly before `cutoff`.
    #[must_use]
    pub fn older_than(mut self, field: impl Into<String>, cutoff: DateTime<Utc>) -> Self {
        self.before = Some((field.into(), cutoff));
        self
    }

    /// Render as a MongoDB query document.
    pub fn to_document(&self) -> Document {
        let mut query = Document::new();

        if let Some(prefix) = &self.id_prefix {
            query.insert("_id", doc! { "$regex": format!("^{}", regex::escape(prefix)) });
        }

        for (field, value) in &self.equals {
            query.insert(field.clone(), value.clone());
        }

        if let Some((field, cutoff)) = &self.before {
            query.insert(field.clone(), doc! { "$lt": to_bson_datetime(*cutoff) });
        }

        query
    }

    /// Evaluate the filter against a stored document.
    pub fn matches(&self, id: &str, document: &Document) -> bool {
        if let Some(prefix) = &self.id_prefix
            && !id.starts_with(prefix.as_str())
        {
            return false;
        }

        let equal = self
            .equals
            .iter()
            .all(|(field, value)| document.get(field) == Some(value));
        if !equal {
            return false;
        }

        match &self.before {
            Some((field, cutoff)) => document
                .get_datetime(field)
                .is_ok_and(|stored| stored.timestamp_millis() < cutoff.timestamp_millis()),
            None => true,
        }
    }
}

/// Convert a chrono timestamp into a BSON datetime (millisecond precision).
pub fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_filter_renders_mongo_query() {
        let cutoff = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let filter = PartitionFilter::id_prefix("thread_")
            .field_eq("guild_id", 42_i64)
            .older_than("created_at", cutoff);

        let query = filter.to_document();
        assert_eq!(
            query.get_document("_id").unwrap().get_str("$regex").unwrap(),
            "^thread_"
        );
        assert_eq!(query.get_i64("guild_id").unwrap(), 42);
        assert_eq!(
            query.get_document("created_at").unwrap().get_datetime("$lt").unwrap(),
            &to_bson_datetime(cutoff)
        );
    }

    #[test]
    fn test_filter_matches_documents() {
        let now = Utc::now();
        let filter = PartitionFilter::id_prefix("thread_").older_than("created_at", now);

        let old = doc! { "created_at": to_bson_datetime(now - Duration::days(1)) };
        let fresh = doc! { "created_at": to_bson_datetime(now + Duration::seconds(1)) };

        assert!(filter.matches("thread_1", &old));
        assert!(!filter.matches("thread_1", &fresh));
        assert!(!filter.matches("config_1", &old));
        assert!(!filter.matches("thread_2", &doc! {}));
    }

    #[test]
    fn test_prefix_metacharacters_are_escaped() {
        let query = PartitionFilter::id_prefix("a.b(").to_document();
        let pattern = query.get_document("_id").unwrap().get_str("$regex").unwrap();

        assert_eq!(pattern, "^a\\.b\\(");
        let re = regex::Regex::new(pattern).unwrap();
        assert!(re.is_match("a.b(1"));
        assert!(!re.is_match("axb(1"));
    }
}
