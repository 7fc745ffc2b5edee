//! Per-guild invite settings.

use mongodb::bson::{self, Bson, Document};
use serde::de::DeserializeOwned;

use crate::error::ValidationError;
use crate::utils::{parse_bool, parse_channel_id};

pub const MIN_DURATION_SECS: u32 = 60;
pub const MAX_DURATION_SECS: u32 = 604_800;
pub const MIN_USES: u32 = 1;
pub const MAX_USES: u32 = 100;

/// Invite settings for one guild.
///
/// Stored under `config_<guild>` as `{settings: {...}}`, one field per
/// [`Setting`]. Fields missing from the document keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildConfig {
    /// Invite lifetime in seconds.
    pub duration: u32,

    /// Maximum number of joins per invite.
    pub max_uses: u32,

    /// Create an invite automatically when a thread opens.
    pub auto_create: bool,

    /// Channel tried when the thread channel refuses invites.
    pub fallback_channel: Option<u64>,

    /// Cooldown applied when the provider throttles without a retry hint.
    pub cooldown_seconds: u32,

    /// Invites grant temporary membership.
    pub temporary: bool,

    /// Upper bound for how long a created invite is reused, in seconds.
    pub cache_duration: u32,
}

impl Default for GuildConfig {
    fn default() -> Self {
        Self {
            duration: 86_400,
            max_uses: 1,
            auto_create: true,
            fallback_channel: None,
            cooldown_seconds: 60,
            temporary: false,
            cache_duration: 300,
        }
    }
}

impl GuildConfig {
    /// Partition key for a guild's settings document.
    pub fn document_id(guild_id: u64) -> String {
        format!("config_{guild_id}")
    }

    /// Build from a stored `config_<guild>` document.
    ///
    /// Fields are decoded one at a time. A field that fails to decode keeps
    /// its default and is returned with the error; unknown fields are ignored.
    pub fn from_document(document: &Document) -> (Self, Vec<(String, bson::de::Error)>) {
        let mut config = Self::default();
        let mut rejected = Vec::new();

        let settings = match document.get("settings") {
            None => return (config, rejected),
            Some(Bson::Document(settings)) => settings,
            Some(other) => {
                let e = bson::from_bson::<Document>(other.clone()).err();
                rejected.extend(e.map(|e| ("settings".to_string(), e)));
                return (config, rejected);
            }
        };

        for (field, value) in settings {
            match Setting::from_stored(field, value) {
                Some(Ok(setting)) => setting.apply(&mut config),
                Some(Err(e)) => rejected.push((field.clone(), e)),
                None => {}
            }
        }

        (config, rejected)
    }
}

/// A single validated configuration change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Duration(u32),
    MaxUses(u32),
    AutoCreate(bool),
    Temporary(bool),
    FallbackChannel(Option<u64>),
    Cooldown(u32),
    CacheDuration(u32),
}

impl Setting {
    /// Parse a setting from command text, e.g. `("uses", "5")`.
    pub fn parse(key: &str, raw: &str) -> Result<Self, ValidationError> {
        let setting = match key.to_lowercase().as_str() {
            "duration" | "invite_duration" => Self::Duration(parse_number(raw)?),
            "uses" | "invite_uses" => Self::MaxUses(parse_number(raw)?),
            "autocreate" | "auto_create" => Self::AutoCreate(
                parse_bool(raw).ok_or(ValidationError::Boolean("Auto create"))?,
            ),
            "temporary" => {
                Self::Temporary(parse_bool(raw).ok_or(ValidationError::Boolean("Temporary"))?)
            }
            "fallback" | "fallback_channel" => Self::FallbackChannel(
                parse_channel_id(raw).ok_or(ValidationError::FallbackChannel)?,
            ),
            "cooldown" | "rate_limit_cooldown" => Self::Cooldown(parse_number(raw)?),
            "cacheduration" | "cache_duration" => Self::CacheDuration(parse_number(raw)?),
            other => return Err(ValidationError::UnknownSetting(other.to_string())),
        };

        setting.validate()?;
        Ok(setting)
    }

    /// Check the value against its allowed range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Self::Duration(secs) if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&secs) => {
                Err(ValidationError::Duration)
            }
            Self::MaxUses(uses) if !(MIN_USES..=MAX_USES).contains(&uses) => {
                Err(ValidationError::Uses)
            }
            Self::Cooldown(secs) if !(1..=3600).contains(&secs) => Err(ValidationError::Cooldown),
            Self::CacheDuration(secs) if !(60..=300).contains(&secs) => {
                Err(ValidationError::CacheDuration)
            }
            Self::FallbackChannel(Some(0)) => Err(ValidationError::FallbackChannel),
            _ => Ok(()),
        }
    }

    /// Stored field name inside `settings`.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Duration(_) => "invite_duration",
            Self::MaxUses(_) => "invite_uses",
            Self::AutoCreate(_) => "auto_create",
            Self::Temporary(_) => "temporary",
            Self::FallbackChannel(_) => "fallback_channel",
            Self::Cooldown(_) => "rate_limit_cooldown",
            Self::CacheDuration(_) => "cache_duration",
        }
    }

    /// Decode one stored `settings` field. `None` for fields we don't own.
    ///
    /// Stored values are not range-checked.
    pub fn from_stored(field: &str, value: &Bson) -> Option<Result<Self, bson::de::Error>> {
        fn decode<T: DeserializeOwned>(value: &Bson) -> Result<T, bson::de::Error> {
            bson::from_bson(value.clone())
        }

        let setting = match field {
            "invite_duration" => decode(value).map(Self::Duration),
            "invite_uses" => decode(value).map(Self::MaxUses),
            "auto_create" => decode(value).map(Self::AutoCreate),
            "temporary" => decode(value).map(Self::Temporary),
            "fallback_channel" => decode(value).map(Self::FallbackChannel),
            "rate_limit_cooldown" => decode(value).map(Self::Cooldown),
            "cache_duration" => decode(value).map(Self::CacheDuration),
            _ => return None,
        };
        Some(setting)
    }

    /// Value as stored in the partition.
    pub fn to_bson(&self) -> Bson {
        match *self {
            Self::Duration(v) | Self::MaxUses(v) | Self::Cooldown(v) | Self::CacheDuration(v) => {
                Bson::Int64(i64::from(v))
            }
            Self::AutoCreate(v) | Self::Temporary(v) => Bson::Boolean(v),
            // Snowflakes stay below 2^63.
            Self::FallbackChannel(Some(id)) => Bson::Int64(id as i64),
            Self::FallbackChannel(None) => Bson::Null,
        }
    }

    /// Apply to an in-memory config.
    pub fn apply(&self, config: &mut GuildConfig) {
        match *self {
            Self::Duration(v) => config.duration = v,
            Self::MaxUses(v) => config.max_uses = v,
            Self::AutoCreate(v) => config.auto_create = v,
            Self::Temporary(v) => config.temporary = v,
            Self::FallbackChannel(v) => config.fallback_channel = v,
            Self::Cooldown(v) => config.cooldown_seconds = v,
            Self::CacheDuration(v) => config.cache_duration = v,
        }
    }
}

fn parse_number(raw: &str) -> Result<u32, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber(raw.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_defaults_when_settings_missing() {
        let (config, rejected) = GuildConfig::from_document(&doc! { "_id": "config_1" });
        assert_eq!(config, GuildConfig::default());
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_partial_settings_merge_with_defaults() {
        let document = doc! {
            "_id": "config_1",
            "settings": { "invite_uses": 5_i64, "fallback_channel": 99_i64, "legacy": "x" },
        };
        let (config, rejected) = GuildConfig::from_document(&document);

        assert!(rejected.is_empty());
        assert_eq!(config.max_uses, 5);
        assert_eq!(config.fallback_channel, Some(99));
        assert_eq!(config.duration, 86_400);
        assert!(config.auto_create);
    }

    #[test]
    fn test_mistyped_field_keeps_the_rest() {
        let document = doc! {
            "settings": {
                "invite_uses": "lots",
                "invite_duration": 3600_i64,
                "temporary": true,
                "fallback_channel": -1_i64,
            },
        };
        let (config, rejected) = GuildConfig::from_document(&document);

        let fields: Vec<&str> = rejected.iter().map(|(field, _)| field.as_str()).collect();
        assert_eq!(fields, ["invite_uses", "fallback_channel"]);
        assert_eq!(config.max_uses, 1);
        assert_eq!(config.fallback_channel, None);
        assert_eq!(config.duration, 3600);
        assert!(config.temporary);
    }

    #[test]
    fn test_settings_that_are_not_a_document() {
        let (config, rejected) = GuildConfig::from_document(&doc! { "settings": "broken" });

        assert_eq!(config, GuildConfig::default());
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, "settings");
    }

    #[test]
    fn test_duration_bounds() {
        assert_eq!(Setting::Duration(30).validate(), Err(ValidationError::Duration));
        assert_eq!(Setting::Duration(700_000).validate(), Err(ValidationError::Duration));
        assert!(Setting::Duration(60).validate().is_ok());
        assert!(Setting::Duration(604_800).validate().is_ok());
    }

    #[test]
    fn test_uses_bounds() {
        assert_eq!(Setting::MaxUses(0).validate(), Err(ValidationError::Uses));
        assert_eq!(Setting::MaxUses(150).validate(), Err(ValidationError::Uses));
        assert!(Setting::MaxUses(100).validate().is_ok());
    }

    #[test]
    fn test_parse_from_command_text() {
        assert_eq!(Setting::parse("uses", "5"), Ok(Setting::MaxUses(5)));
        assert_eq!(Setting::parse("autocreate", "off"), Ok(Setting::AutoCreate(false)));
        assert_eq!(
            Setting::parse("fallback", "<#1234>"),
            Ok(Setting::FallbackChannel(Some(1234)))
        );
        assert_eq!(Setting::parse("fallback", "none"), Ok(Setting::FallbackChannel(None)));
        assert_eq!(
            Setting::parse("temporary", "maybe"),
            Err(ValidationError::Boolean("Temporary"))
        );
        assert_eq!(
            Setting::parse("duration", "soon"),
            Err(ValidationError::NotANumber("soon".into()))
        );
        assert_eq!(
            Setting::parse("colour", "red"),
            Err(ValidationError::UnknownSetting("colour".into()))
        );
    }

    #[test]
    fn test_stored_values_round_trip_through_settings() {
        let mut document = Document::new();
        for setting in [Setting::Duration(3600), Setting::FallbackChannel(Some(7))] {
            document.insert(setting.field(), setting.to_bson());
        }
        let (config, _) = GuildConfig::from_document(&doc! { "settings": document });

        let mut expected = GuildConfig::default();
        Setting::Duration(3600).apply(&mut expected);
        Setting::FallbackChannel(Some(7)).apply(&mut expected);
        assert_eq!(config, expected);
    }
}
