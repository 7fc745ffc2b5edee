//! In-process persistence partition.
//!
//! Same semantics as the MongoDB partition, minus durability. Used when no
//! `MONGODB_URI` is configured and throughout the test suite.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use parking_lot::RwLock;

use super::partition::{Partition, PartitionFilter};
use crate::error::PersistenceError;

/// Documents keyed by `_id`, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryPartition {
    documents: Arc<RwLock<BTreeMap<String, Document>>>,
}

impl MemoryPartition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }
}

#[async_trait]
impl Partition for MemoryPartition {
    async fn find_one(&self, id: &str) -> Result<Option<Document>, PersistenceError> {
        Ok(self.documents.read().get(id).cloned())
    }

    async fn upsert(&self, id: &str, fields: Document) -> Result<(), PersistenceError> {
        let mut documents = self.documents.write();
        let document = documents
            .entry(id.to_string())
            .or_insert_with(|| doc! { "_id": id });

        for (path, value) in fields {
            set_path(document, &path, value);
        }

        Ok(())
    }

    async fn delete_one(&self, id: &str) -> Result<bool, PersistenceError> {
        Ok(self.documents.write().remove(id).is_some())
    }

    async fn delete_many(&self, filter: &PartitionFilter) -> Result<u64, PersistenceError> {
        let mut documents = self.documents.write();
        let before = documents.len();
        documents.retain(|id, document| !filter.matches(id, document));
        Ok((before - documents.len()) as u64)
    }

    async fn count(&self, filter: &PartitionFilter) -> Result<u64, PersistenceError> {
        let documents = self.documents.read();
        let count = documents
            .iter()
            .filter(|(id, document)| filter.matches(id, document))
            .count();
        Ok(count as u64)
    }
}

/// Apply a `$set` on a possibly dotted path, creating intermediate documents.
fn set_path(document: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(document.get(head), Some(Bson::Document(_))) {
                document.insert(head, Document::new());
            }
            if let Some(Bson::Document(child)) = document.get_mut(head) {
                set_path(child, rest, value);
            }
        }
    }
}
