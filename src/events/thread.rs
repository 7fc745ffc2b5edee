//! Thread lifecycle hooks.
//!
//! Neither hook ever returns an error: an invite problem must not block the
//! host from opening or closing a thread.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error};

use crate::database::models::ThreadInviteRecord;
use crate::database::{ConfigStore, ThreadInviteRepository};
use crate::invites::{InviteCreator, ThreadSnapshot};

/// Variables published to the host's message templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateVariables(BTreeMap<&'static str, String>);

impl TemplateVariables {
    /// `{invite}` and `{invite_link}` both resolve to the URL.
    pub fn invite(url: &str) -> Self {
        let mut vars = BTreeMap::new();
        vars.insert("invite", url.to_string());
        vars.insert("invite_link", url.to_string());
        Self(vars)
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone)]
pub struct ThreadHooks {
    configs: ConfigStore,
    creator: InviteCreator,
    records: ThreadInviteRepository,
}

impl ThreadHooks {
    pub fn new(configs: ConfigStore, creator: InviteCreator, records: ThreadInviteRepository) -> Self {
        Self {
            configs,
            creator,
            records,
        }
    }

    /// A thread finished opening. Returns the template variables to publish
    /// (empty when no invite was created).
    pub async fn on_thread_ready(&self, thread: &ThreadSnapshot) -> TemplateVariables {
        let config = self.configs.get(thread.guild.id).await;
        if !config.auto_create {
            debug!("Auto-create disabled for guild {}", thread.guild.id);
            return TemplateVariables::default();
        }

        let Some(url) = self.creator.create_invite(thread, Some(&config)).await else {
            return TemplateVariables::default();
        };

        let variables = TemplateVariables::invite(&url);

        let record = ThreadInviteRecord::new(thread.thread_id, thread.guild.id, url);
        match self.records.save(&record).await {
            Ok(()) => debug!("Stored invite variable for thread {}", thread.thread_id),
            Err(e) => error!("Error in thread-ready hook for thread {}: {}", thread.thread_id, e),
        }

        variables
    }

    /// A thread was closed.
    pub async fn on_thread_close(&self, thread_id: u64) {
        match self.records.delete(thread_id).await {
            Ok(true) => debug!("Cleaned up data for closed thread {}", thread_id),
            Ok(false) => debug!("No invite stored for closed thread {}", thread_id),
            Err(e) => error!("Error cleaning up thread {}: {}", thread_id, e),
        }
    }
}
