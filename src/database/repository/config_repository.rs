//! Guild settings repository.
//!
//! Reads go through a Moka cache; writes validate first, then `$set` a
//! single field and invalidate both the settings cache and the guild's
//! cached invite, so the next invite reflects the new settings.

use std::sync::Arc;

use mongodb::bson::doc;
use tracing::{debug, warn};

use crate::cache::{InviteCache, SettingsCache};
use crate::database::models::{GuildConfig, Setting};
use crate::database::partition::Partition;
use crate::error::ConfigError;

#[derive(Clone)]
pub struct ConfigStore {
    partition: Arc<dyn Partition>,
    cache: SettingsCache,
    invites: InviteCache,
}

impl ConfigStore {
    pub fn new(partition: Arc<dyn Partition>, cache: SettingsCache, invites: InviteCache) -> Self {
        Self {
            partition,
            cache,
            invites,
        }
    }

    /// Settings for a guild: defaults merged with stored overrides.
    ///
    /// Never fails. Storage errors are logged and answered with the defaults,
    /// which are then not cached. A stored field that fails to decode is
    /// logged by name and left at its default; the other overrides still apply.
    pub async fn get(&self, guild_id: u64) -> GuildConfig {
        if let Some(config) = self.cache.get(guild_id) {
            return config;
        }

        let id = GuildConfig::document_id(guild_id);
        let document = match self.partition.find_one(&id).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to load settings for guild {}: {}", guild_id, e);
                return GuildConfig::default();
            }
        };

        let config = match document {
            Some(document) => {
                let (config, rejected) = GuildConfig::from_document(&document);
                for (field, e) in rejected {
                    warn!(
                        "Malformed setting `{}` for guild {}, using default: {}",
                        field, guild_id, e
                    );
                }
                config
            }
            None => GuildConfig::default(),
        };

        self.cache.insert(guild_id, config.clone());
        config
    }

    /// Validate and persist one setting.
    ///
    /// # Errors
    /// `ConfigError::Validation` when the value is out of range; nothing is
    /// written in that case. `ConfigError::Persistence` when the write fails.
    pub async fn set(&self, guild_id: u64, setting: Setting) -> Result<(), ConfigError> {
        setting.validate()?;

        let field = format!("settings.{}", setting.field());
        self.partition
            .upsert(
                &GuildConfig::document_id(guild_id),
                doc! { field.as_str(): setting.to_bson() },
            )
            .await?;

        self.cache.invalidate(guild_id);
        self.invites.invalidate(guild_id);

        debug!("Set {} for guild {}", field, guild_id);
        Ok(())
    }
}
