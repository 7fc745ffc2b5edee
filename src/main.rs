//! Modmail Invites - invite links for modmail support threads.
//!
//! Runs beside a modmail bot and attaches a Discord invite to every new
//! support thread, so users who left the server can rejoin.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - Persistence partition (MongoDB or in-memory) and repositories
//! - `cache` - Guild settings (Moka) and last-invite cache
//! - `invites` - Invite creation, cooldowns and fallback channels
//! - `events` - Thread lifecycle hooks
//! - `plugins` - Administrative commands
//! - `tasks` - Periodic cleanup
//! - `bot` - Shared state and the HTTP bridge to the host bot
//! - `utils` - Parsing and formatting helpers

mod bot;
mod cache;
mod config;
mod database;
mod error;
mod events;
mod invites;
mod plugins;
mod tasks;
mod utils;

use std::sync::Arc;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bot::AppState;
use config::Config;
use database::{Database, MemoryPartition, Partition, ThreadInviteRepository};
use invites::DiscordProvider;
use tasks::{CleanupSchedule, CleanupSweeper};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("modmail_invites=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Modmail Invites...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    let partition: Arc<dyn Partition> = match config.mongodb_uri.as_deref() {
        Some(uri) => {
            info!("Connecting to MongoDB...");
            let db = Database::connect(uri, &config.mongodb_database).await?;
            info!("Database connected, using partition `{}`", config.plugin_partition);
            Arc::new(db.partition(&config.plugin_partition))
        }
        None => {
            warn!("MONGODB_URI not set, settings and thread invites will not survive a restart");
            Arc::new(MemoryPartition::new())
        }
    };

    let provider = DiscordProvider::new(config.discord_api_base.clone(), &config.discord_token)?;
    info!("Invite provider ready ({})", config.discord_api_base);

    let state = AppState::new(
        partition.clone(),
        Arc::new(provider),
        config.settings_cache_ttl,
        config.bridge_secret.clone(),
    );
    if state.bridge_secret.is_none() {
        warn!("BRIDGE_SECRET not set, the bridge accepts unauthenticated requests");
    }

    let sweeper = CleanupSweeper::new(
        ThreadInviteRepository::new(partition),
        state.invite_cache().clone(),
        config.record_retention,
    );
    let sweeper = tasks::spawn_cleanup(
        sweeper,
        CleanupSchedule {
            startup_delay: config.cleanup_startup_delay,
            period: config.cleanup_interval,
        },
    );

    let served = bot::run(config.bridge_addr, state).await;

    sweeper.cancel().await;
    info!("Shutdown complete");

    served
}
