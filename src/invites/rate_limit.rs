//! Per-guild invite cooldown.
//!
//! Each guild has a "not before" instant set when the provider throttles
//! us. Volatile: a restart clears every cooldown.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Longest cooldown honoured for a single throttle response.
pub const MAX_LIMIT_SECS: f64 = 86_400.0;

#[derive(Clone, Default)]
pub struct RateLimiter {
    cutoffs: Arc<DashMap<u64, DateTime<Utc>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_limited(&self, guild_id: u64) -> bool {
        self.is_limited_at(guild_id, Utc::now())
    }

    pub fn is_limited_at(&self, guild_id: u64, now: DateTime<Utc>) -> bool {
        self.cutoffs
            .get(&guild_id)
            .is_some_and(|cutoff| now < *cutoff)
    }

    /// Block invite creation for the guild for `secs` seconds.
    pub fn set_limit(&self, guild_id: u64, secs: f64) {
        self.set_limit_at(guild_id, secs, Utc::now());
    }

    /// `secs` is clamped to `0..=MAX_LIMIT_SECS`; NaN counts as zero.
    pub fn set_limit_at(&self, guild_id: u64, secs: f64, now: DateTime<Utc>) {
        let millis = (secs.max(0.0).min(MAX_LIMIT_SECS) * 1000.0).round() as i64;
        let cutoff = now
            .checked_add_signed(Duration::milliseconds(millis))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.cutoffs.insert(guild_id, cutoff);
    }

    /// Time left on the guild's cooldown, if any.
    pub fn remaining(&self, guild_id: u64) -> Option<Duration> {
        self.remaining_at(guild_id, Utc::now())
    }

    pub fn remaining_at(&self, guild_id: u64, now: DateTime<Utc>) -> Option<Duration> {
        let cutoff = *self.cutoffs.get(&guild_id)?;
        (cutoff > now).then(|| cutoff - now)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("guilds", &self.cutoffs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_unknown_guild_is_not_limited() {
        let limiter = RateLimiter::new();
        assert!(!limiter.is_limited(1));
        assert_eq!(limiter.remaining(1), None);
    }

    #[test]
    fn test_limit_window() {
        let limiter = RateLimiter::new();
        limiter.set_limit_at(1, 60.0, at(0));

        assert!(limiter.is_limited_at(1, at(59)));
        assert!(!limiter.is_limited_at(1, at(61)));
        assert!(!limiter.is_limited_at(2, at(30)));
    }

    #[test]
    fn test_fractional_retry_after() {
        let limiter = RateLimiter::new();
        limiter.set_limit_at(1, 1.5, at(0));

        assert_eq!(limiter.remaining_at(1, at(1)), Some(Duration::milliseconds(500)));
        assert_eq!(limiter.remaining_at(1, at(2)), None);
    }

    #[test]
    fn test_huge_retry_after_is_capped() {
        let limiter = RateLimiter::new();
        limiter.set_limit_at(1, 1e15, at(0));
        limiter.set_limit_at(2, f64::INFINITY, at(0));

        let cap = Duration::seconds(MAX_LIMIT_SECS as i64);
        assert_eq!(limiter.remaining_at(1, at(0)), Some(cap));
        assert_eq!(limiter.remaining_at(2, at(0)), Some(cap));
    }

    #[test]
    fn test_cutoff_saturates_at_end_of_time() {
        let limiter = RateLimiter::new();
        let late = DateTime::<Utc>::MAX_UTC - Duration::seconds(10);
        limiter.set_limit_at(1, 60.0, late);

        assert!(limiter.is_limited_at(1, late));
        assert!(!limiter.is_limited_at(1, DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_negative_and_nan_are_no_cooldown() {
        let limiter = RateLimiter::new();
        limiter.set_limit_at(1, -5.0, at(0));
        limiter.set_limit_at(2, f64::NAN, at(0));

        assert!(!limiter.is_limited_at(1, at(0)));
        assert!(!limiter.is_limited_at(2, at(0)));
    }
}
