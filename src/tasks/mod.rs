//! Background tasks.

pub mod cleanup;

pub use cleanup::{spawn as spawn_cleanup, CleanupSchedule, CleanupSweeper};
