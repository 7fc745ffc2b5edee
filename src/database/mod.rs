//! Persistence partition and the repositories built on it.

pub mod memory;
pub mod models;
pub mod mongo;
pub mod partition;
pub mod repository;

pub use memory::MemoryPartition;
pub use mongo::Database;
pub use partition::Partition;
pub use repository::{ConfigStore, ThreadInviteRepository};
