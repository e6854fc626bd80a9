use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

/// How long ago something happened, bucketed for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeTime {
    JustNow,
    Minutes(i64),
    Hours(i64),
    Days(i64),
    /// Older than a week
    Date(NaiveDate),
}

impl RelativeTime {
    pub fn between(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let minutes = (now - timestamp).num_minutes();
        let hours = minutes / 60;
        let days = hours / 24;

        if minutes < 1 {
            RelativeTime::JustNow
        } else if minutes < 60 {
            RelativeTime::Minutes(minutes)
        } else if hours < 24 {
            RelativeTime::Hours(hours)
        } else if days < 7 {
            RelativeTime::Days(days)
        } else {
            RelativeTime::Date(timestamp.date_naive())
        }
    }
}

impl fmt::Display for RelativeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelativeTime::JustNow => write!(f, "Только что"),
            RelativeTime::Minutes(minutes) => write!(f, "{minutes} мин назад"),
            RelativeTime::Hours(hours) => write!(f, "{hours} ч назад"),
            RelativeTime::Days(days) => write!(f, "{days} дн назад"),
            RelativeTime::Date(date) => write!(f, "{}", date.format("%d.%m.%Y")),
        }
    }
}

/// Stopwatch display of a running session: `MM:SS`, or `HH:MM:SS` past an hour.
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Duration of a session as shown in the history list.
pub fn format_duration(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> String {
    let Some(end) = end else {
        return "В процессе".to_string();
    };
    let total_minutes = (end - start).num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        format!("{hours}ч {minutes}м")
    } else {
        format!("{minutes}м")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_time_buckets() {
        let now = now();
        let cases = [
            (Duration::seconds(30), "Только что"),
            (Duration::minutes(5), "5 мин назад"),
            (Duration::minutes(59), "59 мин назад"),
            (Duration::minutes(60), "1 ч назад"),
            (Duration::hours(23), "23 ч назад"),
            (Duration::hours(24), "1 дн назад"),
            (Duration::days(6), "6 дн назад"),
            (Duration::days(7), "13.05.2024"),
        ];

        for (ago, expected) in cases {
            assert_eq!(RelativeTime::between(now - ago, now).to_string(), expected);
        }
    }

    #[test]
    fn test_future_timestamp_is_just_now() {
        let now = now();
        assert_eq!(
            RelativeTime::between(now + Duration::hours(2), now),
            RelativeTime::JustNow
        );
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3599), "59:59");
        assert_eq!(format_elapsed(3661), "01:01:01");
    }

    #[test]
    fn test_format_duration() {
        let start = now();
        assert_eq!(format_duration(start, None), "В процессе");
        assert_eq!(format_duration(start, Some(start + Duration::minutes(45))), "45м");
        assert_eq!(
            format_duration(start, Some(start + Duration::minutes(135))),
            "2ч 15м"
        );
    }
}
