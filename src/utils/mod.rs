//! Utility functions.
//!
//! Parsing and formatting helpers shared by the command surface and the
//! settings model.

/// Format a duration the way the config view shows it.
///
/// Whole days or hours are preferred; anything shorter is shown in seconds.
pub fn format_duration(secs: u32) -> String {
    if secs >= 86_400 {
        format!("{} day(s)", secs / 86_400)
    } else if secs >= 3600 {
        format!("{} hour(s)", secs / 3600)
    } else {
        format!("{} second(s)", secs)
    }
}

/// Parse a user-supplied boolean (`true`, `on`, `yes`, `enable`, ...).
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "y" | "1" | "enable" | "enabled" => Some(true),
        "false" | "off" | "no" | "n" | "0" | "disable" | "disabled" => Some(false),
        _ => None,
    }
}

/// Parse a channel reference: a raw id, a `<#id>` mention, or an empty /
/// `none` value meaning "no channel".
///
/// Returns `None` when the input is not a channel reference at all, and
/// `Some(None)` when it explicitly clears the channel.
pub fn parse_channel_id(raw: &str) -> Option<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() || matches!(raw.to_lowercase().as_str(), "none" | "clear" | "off") {
        return Some(None);
    }

    let digits = raw
        .strip_prefix("<#")
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(raw);

    digits.parse::<u64>().ok().filter(|id| *id > 0).map(Some)
}

/// Render a channel mention.
pub fn channel_mention(channel_id: u64) -> String {
    format!("<#{}>", channel_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(86_400), "1 day(s)");
        assert_eq!(format_duration(604_800), "7 day(s)");
        assert_eq!(format_duration(7200), "2 hour(s)");
        assert_eq!(format_duration(90), "90 second(s)");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool(" false "), Some(false));
        assert_eq!(parse_bool("perhaps"), None);
    }

    #[test]
    fn test_parse_channel_id() {
        assert_eq!(parse_channel_id("123"), Some(Some(123)));
        assert_eq!(parse_channel_id("<#456>"), Some(Some(456)));
        assert_eq!(parse_channel_id(""), Some(None));
        assert_eq!(parse_channel_id("None"), Some(None));
        assert_eq!(parse_channel_id("#general"), None);
        assert_eq!(parse_channel_id("0"), None);
    }
}
