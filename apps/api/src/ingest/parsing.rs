//! Tolerant value parsers shared by every source adapter's output.
//!
//! All functions degrade to `None` on input they cannot read. None of them read the clock.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::job::{Salary, SalaryPeriod};

static RE_SALARY_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(k|m)?\b\s*(?:-|–|—|to)\s*[^\d\s]{0,3}\s*(\d[\d,]*(?:\.\d+)?)\s*(k|m)?\b",
    )
    .unwrap()
});

static RE_SALARY_SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(k|m)?\b").unwrap());

static RE_CURRENCY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(USD|EUR|GBP|INR|CAD|AUD)\b").unwrap());

static RE_LAKHS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(lpa|lakhs?|lacs?)\b").unwrap());

static RE_HOURLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(hour|hourly|hr|hrs)\b").unwrap());
static RE_DAILY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(day|daily)\b").unwrap());
static RE_WEEKLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(week|weekly|wk)\b").unwrap());
static RE_MONTHLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(month|monthly|mo|mth)\b").unwrap());

static RE_RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d+|an?|one)\+?\s*(minutes?|mins?|hours?|hrs?|days?|weeks?|wks?|months?|mos?|years?|yrs?|h|d|w|m|y)\s+ago\b",
    )
    .unwrap()
});

static RE_EXPERIENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*(?:\+|plus)?\s*(?:(?:-|–|to)\s*\d+(?:\.\d+)?\s*)?\+?\s*(?:years?|yrs?)\b",
    )
    .unwrap()
});

const LAKH: f64 = 100_000.0;
const MAX_PLAUSIBLE_EXPERIENCE: f64 = 50.0;

/// Parses free-text pay such as `"$50k-70k"`, `"50,000 - 70,000 USD/year"`, `"£40/hr"`
/// or `"10-15 LPA"`. Text with no usable number (`"Competitive"`) yields `None`.
pub fn parse_salary_text(text: &str) -> Option<Salary> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let is_lakhs = RE_LAKHS.is_match(text);

    let (min, max) = if let Some(caps) = RE_SALARY_RANGE.captures(text) {
        let low = parse_number(caps.get(1)?.as_str())?;
        let high = parse_number(caps.get(3)?.as_str())?;
        let high_suffix = caps.get(4).map(|m| m.as_str());
        // "50-70k": the trailing suffix covers the whole range
        let low_suffix = caps
            .get(2)
            .map(|m| m.as_str())
            .or(if low < 1000.0 { high_suffix } else { None });
        (
            Some(apply_suffix(low, low_suffix)),
            Some(apply_suffix(high, high_suffix)),
        )
    } else {
        let caps = RE_SALARY_SINGLE.captures(text)?;
        let value = parse_number(caps.get(1)?.as_str())?;
        let value = apply_suffix(value, caps.get(2).map(|m| m.as_str()));
        (Some(value), Some(value))
    };

    let (min, max, currency, period) = if is_lakhs {
        (
            min.map(|v| v * LAKH),
            max.map(|v| v * LAKH),
            Some("INR".to_string()),
            SalaryPeriod::Yearly,
        )
    } else {
        (min, max, detect_currency(text), detect_period(text))
    };

    Salary::from_bounds(min, max, currency, period)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

fn apply_suffix(value: f64, suffix: Option<&str>) -> f64 {
    match suffix.map(|s| s.to_ascii_lowercase()) {
        Some(s) if s == "k" => value * 1_000.0,
        Some(s) if s == "m" => value * 1_000_000.0,
        _ => value,
    }
}

fn detect_currency(text: &str) -> Option<String> {
    if let Some(code) = RE_CURRENCY_CODE.captures(text).and_then(|c| c.get(1)) {
        return Some(code.as_str().to_uppercase());
    }

    let upper = text.to_uppercase();
    let code = if upper.contains("CA$") || upper.contains("C$") {
        "CAD"
    } else if upper.contains("AU$") || upper.contains("A$") {
        "AUD"
    } else if text.contains('$') {
        "USD"
    } else if text.contains('£') {
        "GBP"
    } else if text.contains('€') {
        "EUR"
    } else if text.contains('₹') {
        "INR"
    } else {
        return None;
    };
    Some(code.to_string())
}

fn detect_period(text: &str) -> SalaryPeriod {
    if RE_HOURLY.is_match(text) {
        SalaryPeriod::Hourly
    } else if RE_DAILY.is_match(text) {
        SalaryPeriod::Daily
    } else if RE_WEEKLY.is_match(text) {
        SalaryPeriod::Weekly
    } else if RE_MONTHLY.is_match(text) {
        SalaryPeriod::Monthly
    } else {
        SalaryPeriod::Yearly
    }
}

/// Resolves posting dates like `"3 days ago"`, `"Just posted"`, `"2024-05-01"` or an RSS
/// `pubDate` against the supplied `now`.
pub fn resolve_relative_date(text: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let today = now.date_naive();
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    match lower.as_str() {
        "just posted" | "just now" | "today" | "posted today" | "new" => return Some(today),
        "yesterday" | "posted yesterday" => return today.pred_opt(),
        _ => {}
    }

    if let Some(caps) = RE_RELATIVE.captures(&lower) {
        let count: i64 = match caps.get(1)?.as_str() {
            "a" | "an" | "one" => 1,
            n => n.parse().ok()?,
        };
        let unit = caps.get(2)?.as_str();
        let days = match unit.chars().next()? {
            'd' => Some(count),
            'w' => count.checked_mul(7),
            'y' => count.checked_mul(365),
            'm' if unit.starts_with("mo") => count.checked_mul(30),
            // minutes, hours and bare "m"/"h" all land on today
            _ => Some(0),
        }?;
        // Out-of-range offsets ("1000000 years ago") are unreadable, not fatal
        return Duration::try_days(days).and_then(|offset| today.checked_sub_signed(offset));
    }

    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Some(prefix) = trimmed.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }
    // Unix epoch seconds, as some JSON feeds publish them
    if trimmed.len() >= 9 && trimmed.len() <= 11 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let secs: i64 = trimmed.parse().ok()?;
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive());
    }

    None
}

/// Finds the first "N years" style requirement. Ranges ("3-5 years") give the lower bound.
pub fn extract_min_experience(text: &str) -> Option<f64> {
    for caps in RE_EXPERIENCE.captures_iter(text) {
        let whole = caps.get(0)?;
        // "founded 20 years ago" is not a requirement
        if text[whole.end()..].trim_start().to_lowercase().starts_with("ago") {
            continue;
        }
        let years: f64 = caps.get(1)?.as_str().parse().ok()?;
        if years <= MAX_PLAUSIBLE_EXPERIENCE {
            return Some(years);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_salary_k_range_with_dollar() {
        let s = parse_salary_text("$50k-70k").unwrap();
        assert_eq!(s.min, Some(50_000.0));
        assert_eq!(s.max, Some(70_000.0));
        assert_eq!(s.currency.as_deref(), Some("USD"));
        assert_eq!(s.period, SalaryPeriod::Yearly);
    }

    #[test]
    fn test_salary_comma_range_with_code_and_period() {
        let s = parse_salary_text("50,000 - 70,000 USD/year").unwrap();
        assert_eq!(s.min, Some(50_000.0));
        assert_eq!(s.max, Some(70_000.0));
        assert_eq!(s.currency.as_deref(), Some("USD"));
        assert_eq!(s.period, SalaryPeriod::Yearly);
    }

    #[test]
    fn test_salary_trailing_suffix_covers_range() {
        let s = parse_salary_text("€50-70k").unwrap();
        assert_eq!(s.min, Some(50_000.0));
        assert_eq!(s.max, Some(70_000.0));
        assert_eq!(s.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_salary_competitive_is_none() {
        assert!(parse_salary_text("Competitive").is_none());
        assert!(parse_salary_text("").is_none());
        assert!(parse_salary_text("DOE").is_none());
    }

    #[test]
    fn test_salary_hourly_single_value() {
        let s = parse_salary_text("£40/hr").unwrap();
        assert_eq!(s.min, Some(40.0));
        assert_eq!(s.max, Some(40.0));
        assert_eq!(s.currency.as_deref(), Some("GBP"));
        assert_eq!(s.period, SalaryPeriod::Hourly);
    }

    #[test]
    fn test_salary_lpa_range() {
        let s = parse_salary_text("10-15 LPA").unwrap();
        assert_eq!(s.min, Some(1_000_000.0));
        assert_eq!(s.max, Some(1_500_000.0));
        assert_eq!(s.currency.as_deref(), Some("INR"));
    }

    #[test]
    fn test_salary_monthly() {
        let s = parse_salary_text("3000 EUR per month").unwrap();
        assert_eq!(s.period, SalaryPeriod::Monthly);
        assert_eq!(s.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_relative_days_ago() {
        assert_eq!(resolve_relative_date("3 days ago", now()), Some(date(2025, 3, 12)));
        assert_eq!(resolve_relative_date("Posted 2 weeks ago", now()), Some(date(2025, 3, 1)));
        assert_eq!(resolve_relative_date("30+ days ago", now()), Some(date(2025, 2, 13)));
        assert_eq!(resolve_relative_date("a month ago", now()), Some(date(2025, 2, 13)));
    }

    #[test]
    fn test_relative_just_posted_and_hours() {
        assert_eq!(resolve_relative_date("Just posted", now()), Some(date(2025, 3, 15)));
        assert_eq!(resolve_relative_date("5 hours ago", now()), Some(date(2025, 3, 15)));
        assert_eq!(resolve_relative_date("Yesterday", now()), Some(date(2025, 3, 14)));
    }

    #[test]
    fn test_absolute_dates() {
        assert_eq!(resolve_relative_date("2024-05-01", now()), Some(date(2024, 5, 1)));
        assert_eq!(
            resolve_relative_date("2024-05-01T09:30:00Z", now()),
            Some(date(2024, 5, 1))
        );
        assert_eq!(
            resolve_relative_date("Wed, 01 May 2024 09:30:00 +0000", now()),
            Some(date(2024, 5, 1))
        );
        assert_eq!(resolve_relative_date("1714555800", now()), Some(date(2024, 5, 1)));
    }

    #[test]
    fn test_relative_offset_out_of_range_is_none() {
        assert_eq!(resolve_relative_date("1000000 years ago", now()), None);
        assert_eq!(resolve_relative_date("9223372036854775807 weeks ago", now()), None);
        assert_eq!(resolve_relative_date("99999999999 days ago", now()), None);
    }

    #[test]
    fn test_unreadable_date_is_none() {
        assert_eq!(resolve_relative_date("sometime soon", now()), None);
        assert_eq!(resolve_relative_date("", now()), None);
    }

    #[test]
    fn test_experience_extraction() {
        assert_eq!(extract_min_experience("We need 5+ years of Python"), Some(5.0));
        assert_eq!(extract_min_experience("3-5 years experience"), Some(3.0));
        assert_eq!(extract_min_experience("at least 2 yrs in backend"), Some(2.0));
        assert_eq!(extract_min_experience("No experience needed"), None);
    }

    #[test]
    fn test_experience_skips_company_age() {
        assert_eq!(
            extract_min_experience("Founded 20 years ago. Requires 4 years of Go."),
            Some(4.0)
        );
    }
}
