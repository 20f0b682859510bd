// src/scrape/date.rs
//! Date recognition for announcement text.
//!
//! The page mixes `15.3.2024`, `15. 3. 2024`, `15 marec 2024` and ISO dates.
//! Patterns are tried in a fixed order against the lower-cased text; only the
//! first textual match of each pattern is considered, and a match that is not a
//! real calendar date falls through to the next pattern.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_DOTTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\.\s*(\d{1,2})\.\s*(\d{4})").expect("dotted date regex"));
static RE_MONTH_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s+(\w+)\s+(\d{4})").expect("month-name date regex"));
static RE_ISO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("iso date regex"));

/// Slovak month names as they appear on the site (nominative).
const SLOVAK_MONTHS: [(&str, u32); 12] = [
    ("január", 1),
    ("február", 2),
    ("marec", 3),
    ("apríl", 4),
    ("máj", 5),
    ("jún", 6),
    ("júl", 7),
    ("august", 8),
    ("september", 9),
    ("október", 10),
    ("november", 11),
    ("december", 12),
];

fn month_from_name(name: &str) -> Option<u32> {
    SLOVAK_MONTHS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, m)| *m)
}

fn ymd(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    let year: i32 = year.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn dotted(text: &str) -> Option<NaiveDate> {
    let caps = RE_DOTTED.captures(text)?;
    let month: u32 = caps[2].parse().ok()?;
    ymd(&caps[3], month, &caps[1])
}

fn month_name(text: &str) -> Option<NaiveDate> {
    let caps = RE_MONTH_NAME.captures(text)?;
    let month = month_from_name(&caps[2])?;
    ymd(&caps[3], month, &caps[1])
}

fn iso(text: &str) -> Option<NaiveDate> {
    let caps = RE_ISO.captures(text)?;
    let month: u32 = caps[2].parse().ok()?;
    ymd(&caps[1], month, &caps[3])
}

/// Same as [`parse_date`] but without the warning. Used where most inputs are
/// expected not to be dates (full-document scans).
pub fn try_parse_date(text: &str) -> Option<NaiveDate> {
    if text.trim().is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    dotted(&lower)
        .or_else(|| month_name(&lower))
        .or_else(|| iso(&lower))
}

/// Find the first recognizable date in `text`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.trim().is_empty() {
        return None;
    }
    let parsed = try_parse_date(text);
    if parsed.is_none() {
        tracing::warn!(text = %text.trim(), "could not parse date");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, day)
    }

    #[test]
    fn three_notations_agree() {
        assert_eq!(parse_date("15.3.2024"), d(2024, 3, 15));
        assert_eq!(parse_date("15 marec 2024"), d(2024, 3, 15));
        assert_eq!(parse_date("2024-03-15"), d(2024, 3, 15));
    }

    #[test]
    fn spaced_dots_and_case_are_tolerated() {
        assert_eq!(parse_date("Zverejnené: 05. 11. 2024"), d(2024, 11, 5));
        assert_eq!(parse_date("1 JÚN 2025"), d(2025, 6, 1));
    }

    #[test]
    fn invalid_calendar_values_are_rejected() {
        assert_eq!(parse_date("32.13.2024"), None);
        assert_eq!(parse_date("30.2.2024"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn unknown_month_name_falls_through_to_iso() {
        // "15 march 2024" is not Slovak, the ISO date later in the text wins
        assert_eq!(parse_date("15 march 2024 / 2024-03-20"), d(2024, 3, 20));
    }

    #[test]
    fn invalid_dotted_match_falls_through() {
        assert_eq!(parse_date("99.99.2024 alebo 2024-01-02"), d(2024, 1, 2));
    }

    #[test]
    fn empty_and_plain_text_yield_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(try_parse_date("Výzva na mobilitu"), None);
    }
}
