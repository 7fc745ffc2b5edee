//! MongoDB-backed persistence partition.

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::{options::ClientOptions, Client, Collection};
use tracing::{debug, info};

use super::partition::{Partition, PartitionFilter};
use crate::error::PersistenceError;

/// Database wrapper for MongoDB operations.
#[derive(Debug, Clone)]
pub struct Database {
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns error if the connection string is invalid or the ping fails.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB");

        Ok(Self {
            db: client.database(db_name),
        })
    }

    /// Open the plugin partition stored in collection `name`.
    pub fn partition(&self, name: &str) -> MongoPartition {
        MongoPartition {
            collection: self.db.collection(name),
        }
    }
}

/// A partition backed by one MongoDB collection of untyped documents.
#[derive(Debug, Clone)]
pub struct MongoPartition {
    collection: Collection<Document>,
}

#[async_trait]
impl Partition for MongoPartition {
    async fn find_one(&self, id: &str) -> Result<Option<Document>, PersistenceError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn upsert(&self, id: &str, fields: Document) -> Result<(), PersistenceError> {
        self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .upsert(true)
            .await?;

        debug!("Upserted {}", id);
        Ok(())
    }

    async fn delete_one(&self, id: &str) -> Result<bool, PersistenceError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_many(&self, filter: &PartitionFilter) -> Result<u64, PersistenceError> {
        let result = self.collection.delete_many(filter.to_document()).await?;
        Ok(result.deleted_count)
    }

    async fn count(&self, filter: &PartitionFilter) -> Result<u64, PersistenceError> {
        Ok(self.collection.count_documents(filter.to_document()).await?)
    }
}
