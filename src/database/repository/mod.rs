//! Repositories over the plugin partition.

mod config_repository;
mod thread_repository;

pub use config_repository::ConfigStore;
pub use thread_repository::ThreadInviteRepository;
