//! Display formatting for dates, counters and slugs.
//!
//! Every time-dependent function takes `now` so output is reproducible.

use chrono::{DateTime, Datelike, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_SLUG: Regex =
        Regex::new(r"[^a-z0-9_\x{4e00}-\x{9fa5}]+").expect("Invalid NON_SLUG regex pattern");
}

/// Beyond this many days a relative date falls back to the calendar date.
const RELATIVE_LIMIT_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateStyle {
    /// `2024-03-15 14:30:25`
    Full,
    /// `2024-03-15`
    #[default]
    Date,
    /// `3 days ago`, or the date when older than 30 days
    Relative,
}

pub fn format_date(date: DateTime<Utc>, style: DateStyle, now: DateTime<Utc>) -> String {
    match style {
        DateStyle::Full => date.format("%Y-%m-%d %H:%M:%S").to_string(),
        DateStyle::Date => date.format("%Y-%m-%d").to_string(),
        DateStyle::Relative => {
            if (now - date).num_days() > RELATIVE_LIMIT_DAYS {
                date.format("%Y-%m-%d").to_string()
            } else {
                relative_time(date, now)
            }
        }
    }
}

/// Humanized distance between `date` and `now`, rounded the way
/// relative-time libraries usually do (45 s → a minute, 22 h → a day, ...).
pub fn relative_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now - date;
    let future = delta < Duration::zero();
    let secs = delta.num_seconds().unsigned_abs() as f64;

    let minutes = secs / 60.0;
    let hours = minutes / 60.0;
    let days = hours / 24.0;

    let phrase = if secs < 45.0 {
        return "just now".to_string();
    } else if secs < 90.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        plural(minutes.round() as u64, "minute")
    } else if minutes < 90.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        plural(hours.round() as u64, "hour")
    } else if hours < 36.0 {
        "a day".to_string()
    } else if days < 26.0 {
        plural(days.round() as u64, "day")
    } else if days < 46.0 {
        "a month".to_string()
    } else if days < 320.0 {
        plural((days / 30.4).round() as u64, "month")
    } else if days < 548.0 {
        "a year".to_string()
    } else {
        plural((days / 365.0).round() as u64, "year")
    };

    if future {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

/// `today 14:30`, `yesterday 09:15`, `03-15 14:30` within this year,
/// otherwise `2023-03-15`.
pub fn format_friendly_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let day = date.date_naive();
    let today = now.date_naive();

    if day == today {
        format!("today {}", date.format("%H:%M"))
    } else if today.pred_opt() == Some(day) {
        format!("yesterday {}", date.format("%H:%M"))
    } else if date.year() == now.year() {
        date.format("%m-%d %H:%M").to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

/// Compact counters: `999`, `1.2k`, `3.4w` (w = 10 000).
pub fn format_number(num: u64) -> String {
    if num >= 10_000 {
        format!("{:.1}w", num as f64 / 10_000.0)
    } else if num >= 1_000 {
        format!("{:.1}k", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Lowercased, with runs of anything but ASCII word characters and common
/// CJK ideographs collapsed to `-`.
pub fn slugify(text: &str) -> String {
    NON_SLUG
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

pub fn format_reading_time(word_count: usize, words_per_minute: usize) -> String {
    let minutes = word_count.div_ceil(words_per_minute.max(1));
    format!("{} min read", minutes)
}

pub fn is_within_days(date: DateTime<Utc>, days: i64, now: DateTime<Utc>) -> bool {
    (now - date).num_days() <= days
}

/// `2 days 3 hours 5 minutes`; spans under a minute read `just now`.
pub fn format_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let span = end - start;
    let parts: Vec<String> = [
        (span.num_days(), "day"),
        (span.num_hours() % 24, "hour"),
        (span.num_minutes() % 60, "minute"),
    ]
    .iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, unit)| plural(*n as u64, unit))
    .collect();

    if parts.is_empty() {
        "just now".to_string()
    } else {
        parts.join(" ")
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}
