use chrono::{Local, NaiveDate, Utc};

use crate::config::TodayTimezone;

pub fn now_ts() -> f64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_secs_f64()
}

/// Calendar date at the moment of the call, in the configured zone.
pub fn today(tz: TodayTimezone) -> NaiveDate {
    match tz {
        TodayTimezone::Local => Local::now().date_naive(),
        TodayTimezone::Utc => Utc::now().date_naive(),
    }
}

/// Parse the leading run of ASCII digits, ignoring surrounding whitespace.
/// `"2abc"` gives 2, `"abc"` gives None. Values past `u64::MAX` saturate.
pub fn parse_leading_digits(s: &str) -> Option<u64> {
    let t = s.trim();
    let end = t
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(t.len());
    let digits = &t[..end];
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_digits() {
        assert_eq!(parse_leading_digits("12"), Some(12));
        assert_eq!(parse_leading_digits(" 7 "), Some(7));
        assert_eq!(parse_leading_digits("2abc"), Some(2));
        assert_eq!(parse_leading_digits("-3"), None);
        assert_eq!(parse_leading_digits("abc"), None);
        assert_eq!(parse_leading_digits(""), None);
    }

    #[test]
    fn leading_digits_saturate() {
        assert_eq!(parse_leading_digits("99999999999999999999"), Some(u64::MAX));
        assert_eq!(parse_leading_digits("18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_leading_digits("18446744073709551614x"), Some(u64::MAX - 1));
    }

    #[test]
    fn now_ts_is_positive() {
        assert!(now_ts() > 0.0);
    }
}
