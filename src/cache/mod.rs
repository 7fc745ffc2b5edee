//! In-memory state.
//!
//! - `InviteCache` - last created invite per guild, short TTL, lazy expiry
//! - `SettingsCache` - Moka read cache in front of the settings documents
//!
//! Both live for the lifetime of the process and are lost on restart.

mod invite;
mod settings;

pub use invite::InviteCache;
pub use settings::SettingsCache;
