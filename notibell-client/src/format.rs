//! Pure display helpers: relative timestamps and markup escaping.

use chrono::{Datelike, NaiveDateTime};

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 1440;

/// Renders `created_at` relative to `now`.
///
/// Under a minute (including timestamps slightly in the future) is "방금 전",
/// then whole minutes, then whole hours. From one day on the timestamp's own
/// month and day are shown, without a year.
pub fn format_time_ago(created_at: NaiveDateTime, now: NaiveDateTime) -> String {
    let diff_mins = (now - created_at).num_minutes();

    if diff_mins < 1 {
        return "방금 전".to_string();
    }
    if diff_mins < MINUTES_PER_HOUR {
        return format!("{}분 전", diff_mins);
    }
    if diff_mins < MINUTES_PER_DAY {
        return format!("{}시간 전", diff_mins / MINUTES_PER_HOUR);
    }
    format!("{}월 {}일", created_at.month(), created_at.day())
}

/// Neutralizes markup-significant characters so untrusted text can be placed
/// in element content or a quoted attribute. Absent or empty input yields "".
pub fn escape_for_display(text: Option<&str>) -> String {
    text.map(|t| html_escape::encode_quoted_attribute(t).into_owned())
        .unwrap_or_default()
}
