//! Utility functions for date handling, log truncation, and JSON error classification.
//!
//! This module provides helper functions used throughout the application:
//! - Picking the news day a run targets
//! - Computing the wait until the next scheduled run
//! - String truncation for logging upstream payloads
//! - JSON error detection for truncated generation responses

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use tracing::instrument;

/// The UTC calendar day before today; the default target of a run.
pub fn yesterday_utc() -> NaiveDate {
    (Utc::now() - Duration::days(1)).date_naive()
}

/// Time left from `now` until the next local midnight.
///
/// Used by the `--daily` scheduling loop. Falls back to a full day when the
/// next midnight does not exist in the local zone (DST gap).
#[instrument(level = "debug")]
pub fn duration_until_next_midnight(now: DateTime<Local>) -> std::time::Duration {
    let next_day = now.date_naive() + Duration::days(1);
    let next_midnight = next_day
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest());

    let wait = match next_midnight {
        Some(midnight) => midnight - now,
        None => Duration::days(1),
    };
    tracing::debug!(%now, wait_secs = wait.num_seconds(), "Computed wait until midnight");
    wait.to_std().unwrap_or_default()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// When the generation response is cut off (e.g., due to token limits), the
/// resulting JSON fails to parse with an EOF error.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let s = "é".repeat(10);
        let result = truncate_for_log(&s, 3);
        assert!(result.starts_with('é'));
        assert!(result.contains("…(+18 bytes)"));
    }

    #[test]
    fn test_looks_truncated() {
        let json_eof = r#"[{"questionText": "value"#;
        let err = serde_json::from_str::<serde_json::Value>(json_eof).unwrap_err();
        assert!(looks_truncated(&err));

        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(!looks_truncated(&err));
    }

    #[test]
    fn test_duration_until_next_midnight() {
        let now = Local.with_ymd_and_hms(2025, 5, 6, 23, 0, 0).earliest().unwrap();
        let wait = duration_until_next_midnight(now);
        assert!(wait.as_secs() > 0);
        assert!(wait.as_secs() <= 2 * 3600);
    }

    #[test]
    fn test_yesterday_is_before_today() {
        assert!(yesterday_utc() < Utc::now().date_naive());
    }
}
