//! Time expression resolution.
//!
//! Rules are tried in a fixed order and the first match wins:
//! `now`, named ranges, relative durations (`30m`), 13-digit epoch millis,
//! ISO 8601 with a zone, ISO 8601 without a zone (UTC) and bare dates
//! (midnight UTC).

use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, TimeZone, Utc,
};
use protocol::EpochMillis;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::QueryError;

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Clone, Copy)]
enum NamedRange {
    Back(i64),
    StartOfToday,
    StartOfYesterday,
}

fn named_range(name: &str) -> Option<NamedRange> {
    let range = match name {
        "last-hour" => NamedRange::Back(3_600),
        "last-24h" | "last-day" => NamedRange::Back(86_400),
        "last-week" => NamedRange::Back(7 * 86_400),
        "today" => NamedRange::StartOfToday,
        "yesterday" => NamedRange::StartOfYesterday,
        _ => return None,
    };
    Some(range)
}

fn relative_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)([smhd])$").expect("relative duration regex"))
}

/// Resolve `text` against the current wall clock, using the local zone for
/// `today` and `yesterday`.
pub fn resolve(text: &str) -> Result<EpochMillis, QueryError> {
    resolve_at(text, &Local::now())
}

/// Resolve `text` as if the current instant were `now`. Day boundaries are
/// taken in `now`'s time zone.
pub fn resolve_at<Tz: TimeZone>(text: &str, now: &DateTime<Tz>) -> Result<EpochMillis, QueryError> {
    let millis = resolve_rules(text.trim(), now).ok_or_else(|| QueryError::TimeFormat {
        input: text.to_string(),
    })?;
    if millis < 0 {
        return Err(QueryError::TimeBeforeEpoch {
            input: text.to_string(),
            millis,
        });
    }
    Ok(millis)
}

fn resolve_rules<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> Option<EpochMillis> {
    let lowered = input.to_ascii_lowercase();
    if lowered == "now" {
        return Some(now.timestamp_millis());
    }
    if let Some(range) = named_range(&lowered) {
        return resolve_named(range, now);
    }
    if let Some(captures) = relative_pattern().captures(input) {
        let amount: i64 = captures[1].parse().ok()?;
        let unit_secs = match &captures[2] {
            "s" => 1,
            "m" => 60,
            "h" => 3_600,
            _ => 86_400,
        };
        return seconds_before(now, amount.checked_mul(unit_secs)?);
    }
    if input.len() == 13 && input.bytes().all(|byte| byte.is_ascii_digit()) {
        return input.parse().ok();
    }
    parse_zoned(input)
        .or_else(|| parse_naive(input))
        .or_else(|| parse_date(input))
}

fn resolve_named<Tz: TimeZone>(range: NamedRange, now: &DateTime<Tz>) -> Option<EpochMillis> {
    match range {
        NamedRange::Back(secs) => seconds_before(now, secs),
        NamedRange::StartOfToday => local_midnight(now, now.date_naive()),
        NamedRange::StartOfYesterday => local_midnight(now, now.date_naive().pred_opt()?),
    }
}

fn seconds_before<Tz: TimeZone>(now: &DateTime<Tz>, secs: i64) -> Option<EpochMillis> {
    let delta = TimeDelta::try_seconds(secs)?;
    now.clone()
        .checked_sub_signed(delta)
        .map(|instant| instant.timestamp_millis())
}

fn local_midnight<Tz: TimeZone>(now: &DateTime<Tz>, day: NaiveDate) -> Option<EpochMillis> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map(|instant| instant.timestamp_millis())
}

fn parse_zoned(input: &str) -> Option<EpochMillis> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.timestamp_millis());
    }
    let normalized = match input
        .strip_suffix('Z')
        .or_else(|| input.strip_suffix('z'))
    {
        Some(stripped) => format!("{stripped}+00:00"),
        None => input.to_string(),
    };
    ZONED_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&normalized, format).ok())
        .map(|parsed| parsed.timestamp_millis())
}

fn parse_naive(input: &str) -> Option<EpochMillis> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|parsed| parsed.and_utc().timestamp_millis())
}

fn parse_date(input: &str) -> Option<EpochMillis> {
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// `1733392800000 (2024-12-05T10:00:00.000Z)`, for diagnostics.
pub fn describe_millis(millis: EpochMillis) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(instant) => format!(
            "{millis} ({})",
            instant.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        None => millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::FixedOffset;

    fn fixed_now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3_600)
            .unwrap()
            .with_ymd_and_hms(2025, 12, 5, 10, 30, 15)
            .unwrap()
    }

    #[test]
    fn now_resolves_to_reference_instant() {
        let now = fixed_now();
        assert_eq!(resolve_at("now", &now).unwrap(), now.timestamp_millis());
        assert_eq!(resolve_at("  NOW ", &now).unwrap(), now.timestamp_millis());
    }

    #[test]
    fn now_is_monotonic_across_calls() {
        let mut previous = resolve("now").unwrap();
        for _ in 0..50 {
            let current = resolve("now").unwrap();
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn relative_durations_subtract_from_now() {
        let now = fixed_now();
        let base = now.timestamp_millis();
        for (text, secs) in [
            ("45s", 45),
            ("30m", 30 * 60),
            ("1h", 3_600),
            ("2d", 2 * 86_400),
            ("0m", 0),
        ] {
            assert_eq!(resolve_at(text, &now).unwrap(), base - secs * 1000, "{text}");
        }
    }

    #[test]
    fn relative_duration_against_wall_clock_is_within_tolerance() {
        let before = Utc::now().timestamp_millis();
        let resolved = resolve("15m").unwrap();
        let after = Utc::now().timestamp_millis();
        let window = 15 * 60 * 1000;
        assert!(resolved >= before - window);
        assert!(resolved <= after - window);
    }

    #[test]
    fn named_ranges_resolve_to_deltas() {
        let now = fixed_now();
        let base = now.timestamp_millis();
        assert_eq!(resolve_at("last-hour", &now).unwrap(), base - 3_600_000);
        assert_eq!(resolve_at("last-24h", &now).unwrap(), base - 86_400_000);
        assert_eq!(resolve_at("last-day", &now).unwrap(), base - 86_400_000);
        assert_eq!(resolve_at("Last-Week", &now).unwrap(), base - 7 * 86_400_000);
    }

    #[test]
    fn today_and_yesterday_use_local_midnight() {
        let now = fixed_now();
        let offset = now.timezone();
        let today = offset.with_ymd_and_hms(2025, 12, 5, 0, 0, 0).unwrap();
        let yesterday = offset.with_ymd_and_hms(2025, 12, 4, 0, 0, 0).unwrap();
        assert_eq!(resolve_at("today", &now).unwrap(), today.timestamp_millis());
        assert_eq!(
            resolve_at("yesterday", &now).unwrap(),
            yesterday.timestamp_millis()
        );
    }

    #[test]
    fn thirteen_digit_values_are_epoch_millis() {
        let now = fixed_now();
        assert_eq!(
            resolve_at("1733395200000", &now).unwrap(),
            1_733_395_200_000
        );
    }

    #[test]
    fn other_digit_strings_are_rejected() {
        let now = fixed_now();
        let err = resolve_at("12345678901234", &now).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimeFormat);
        assert!(resolve_at("1733395200", &now).is_err());
    }

    #[test]
    fn iso_with_and_without_zone_marker_agree() {
        let now = fixed_now();
        let zoned = resolve_at("2025-12-05T10:00:00Z", &now).unwrap();
        let naive = resolve_at("2025-12-05T10:00:00", &now).unwrap();
        assert_eq!(zoned, naive);
        assert_eq!(zoned, 1_764_928_800_000);
    }

    #[test]
    fn iso_offsets_are_honoured() {
        let now = fixed_now();
        assert_eq!(
            resolve_at("2025-12-05T12:00:00+02:00", &now).unwrap(),
            1_764_928_800_000
        );
        assert_eq!(
            resolve_at("2025-12-05T10:00:00.250Z", &now).unwrap(),
            1_764_928_800_250
        );
        assert_eq!(
            resolve_at("2025-12-05 10:00:00", &now).unwrap(),
            1_764_928_800_000
        );
    }

    #[test]
    fn bare_dates_are_midnight_utc() {
        let now = fixed_now();
        assert_eq!(resolve_at("2025-12-05", &now).unwrap(), 1_764_892_800_000);
    }

    #[test]
    fn unknown_formats_fail_with_supported_list() {
        let now = fixed_now();
        for text in ["soon", "1w", "5 minutes", "", "2025-13-40"] {
            let err = resolve_at(text, &now).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TimeFormat, "{text}");
            assert!(err.to_string().contains("relative (1h, 2d)"));
        }
    }

    #[test]
    fn pre_epoch_results_are_rejected() {
        let now = fixed_now();
        let err = resolve_at("1969-12-31", &now).unwrap_err();
        assert!(matches!(err, QueryError::TimeBeforeEpoch { .. }));
    }

    #[test]
    fn describe_millis_includes_rfc3339() {
        assert_eq!(
            describe_millis(1_764_928_800_000),
            "1764928800000 (2025-12-05T10:00:00.000Z)"
        );
    }
}
