//! Configuration module.
//!
//! Loads configuration from environment variables (a `.env` file is read
//! first when present).

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};
use url::Url;

const DEFAULT_API_BASE: &str = "https://discord.com/api/v10/";
const MAX_RETENTION_DAYS: u64 = 36_500;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Discord
    pub discord_token: String,
    /// Always ends with `/` so relative joins keep the version segment.
    pub discord_api_base: Url,

    // MongoDB. Without a URI state is kept in memory only.
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    /// Collection holding this plugin's documents.
    pub plugin_partition: String,

    // Bridge
    pub bridge_addr: SocketAddr,
    pub bridge_secret: Option<String>,

    // Maintenance
    pub cleanup_interval: Duration,
    pub cleanup_startup_delay: Duration,
    pub record_retention: chrono::Duration,
    pub settings_cache_ttl: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let discord_token = get("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;

        let mut api_base = get("DISCORD_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        if !api_base.ends_with('/') {
            api_base.push('/');
        }
        let discord_api_base =
            Url::parse(&api_base).with_context(|| format!("Invalid DISCORD_API_BASE `{api_base}`"))?;

        let bridge_addr = get("BRIDGE_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8088".to_string())
            .parse()
            .context("Invalid BRIDGE_ADDR")?;

        let retention_days = parse_number(&get, "RECORD_RETENTION_DAYS", 7)?;
        if !(1..=MAX_RETENTION_DAYS).contains(&retention_days) {
            bail!("RECORD_RETENTION_DAYS must be between 1 and {MAX_RETENTION_DAYS}");
        }

        let cleanup_interval = parse_number(&get, "CLEANUP_INTERVAL_SECS", 3600)?;
        if cleanup_interval == 0 {
            bail!("CLEANUP_INTERVAL_SECS must be at least 1");
        }

        Ok(Self {
            discord_token,
            discord_api_base,
            mongodb_uri: get("MONGODB_URI"),
            mongodb_database: get("MONGODB_DATABASE").unwrap_or_else(|| "modmail".to_string()),
            plugin_partition: get("PLUGIN_PARTITION")
                .unwrap_or_else(|| "plugin_invites".to_string()),
            bridge_addr,
            bridge_secret: get("BRIDGE_SECRET"),
            cleanup_interval: Duration::from_secs(cleanup_interval),
            cleanup_startup_delay: Duration::from_secs(parse_number(
                &get,
                "CLEANUP_STARTUP_DELAY_SECS",
                0,
            )?),
            record_retention: chrono::Duration::days(retention_days as i64),
            settings_cache_ttl: Duration::from_secs(parse_number(
                &get,
                "SETTINGS_CACHE_TTL_SECS",
                300,
            )?),
        })
    }
}

fn parse_number<G>(get: &G, key: &str, default: u64) -> anyhow::Result<u64>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be a whole number, got `{raw}`")),
        None => Ok(default),
    }
}
