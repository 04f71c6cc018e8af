//! Display formatting for prices and timestamps (en-US conventions).
//!
//! Timestamps are interpreted and shown in UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

pub const DEFAULT_CURRENCY: &str = "USD";

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const THIRTY_DAYS: i64 = 30 * DAY;

/// `1234.5, "USD"` -> `$1,234.50`. Unknown codes are written as a prefix,
/// e.g. `CHF 12.00`.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let code = match currency.trim() {
        "" => DEFAULT_CURRENCY.to_string(),
        code => code.to_uppercase(),
    };
    let (symbol, decimals) = match code.as_str() {
        "USD" => (Some("$"), 2),
        "EUR" => (Some("€"), 2),
        "GBP" => (Some("£"), 2),
        "JPY" => (Some("¥"), 0),
        _ => (None, 2),
    };

    let rounded = amount
        .abs()
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.*}", decimals as usize, rounded);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut number = group_thousands(whole);
    if let Some(fraction) = fraction {
        number.push('.');
        number.push_str(fraction);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match symbol {
        Some(symbol) => format!("{}{}{}", sign, symbol, number),
        None => format!("{}{} {}", sign, code, number),
    }
}

/// `2024-01-05T10:00:00Z` -> `January 5, 2024`.
pub fn format_date(timestamp: &str) -> Option<String> {
    parse_timestamp(timestamp).map(|at| at.format("%B %-d, %Y").to_string())
}

/// Coarse age relative to `now`: `just now`, `5m ago`, `3h ago`, `2d ago`,
/// and the short date (`Jan 5`) from thirty days on. Future timestamps
/// count as just now.
pub fn format_relative_time(timestamp: &str, now: DateTime<Utc>) -> Option<String> {
    let at = parse_timestamp(timestamp)?;
    let seconds = (now - at).num_seconds();

    Some(match seconds {
        s if s < MINUTE => "just now".to_string(),
        s if s < HOUR => format!("{}m ago", s / MINUTE),
        s if s < DAY => format!("{}h ago", s / HOUR),
        s if s < THIRTY_DAYS => format!("{}d ago", s / DAY),
        _ => at.format("%b %-d").to_string(),
    })
}

/// Accepts RFC 3339, zone-less date-times (as the server emits them) and
/// plain dates.
pub fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    let timestamp = timestamp.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(at.and_utc());
    }
    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn currency_symbols_and_grouping() {
        assert_eq!(format_currency(dec("4.5"), "USD"), "$4.50");
        assert_eq!(format_currency(dec("1234.5"), "usd"), "$1,234.50");
        assert_eq!(format_currency(dec("1234567.891"), "EUR"), "€1,234,567.89");
        assert_eq!(format_currency(dec("0"), "GBP"), "£0.00");
        assert_eq!(format_currency(dec("1234.5"), "JPY"), "¥1,235");
        assert_eq!(format_currency(dec("12"), "CHF"), "CHF 12.00");
        assert_eq!(format_currency(dec("12"), ""), "$12.00");
    }

    #[test]
    fn currency_rounding_and_sign() {
        assert_eq!(format_currency(dec("0.005"), "USD"), "$0.01");
        assert_eq!(format_currency(dec("-1000"), "USD"), "-$1,000.00");
        assert_eq!(format_currency(dec("-0.001"), "USD"), "$0.00");
        assert_eq!(format_currency(dec("999.999"), "USD"), "$1,000.00");
    }

    #[test]
    fn dates_in_long_form() {
        assert_eq!(
            format_date("2024-01-05T10:00:00Z").as_deref(),
            Some("January 5, 2024")
        );
        assert_eq!(
            format_date("2024-12-31T23:59:59.123456").as_deref(),
            Some("December 31, 2024")
        );
        assert_eq!(format_date("2024-03-09").as_deref(), Some("March 9, 2024"));
        assert_eq!(format_date("yesterday"), None);
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let cases = [
            ("2024-03-01T11:59:30Z", "just now"),
            ("2024-03-01T12:05:00Z", "just now"),
            ("2024-03-01T11:55:00Z", "5m ago"),
            ("2024-03-01T09:00:00Z", "3h ago"),
            ("2024-02-28T12:00:00Z", "2d ago"),
            ("2024-01-05T12:00:00Z", "Jan 5"),
        ];
        for (at, expected) in cases {
            assert_eq!(
                format_relative_time(at, now).as_deref(),
                Some(expected),
                "{}",
                at
            );
        }
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let at = parse_timestamp("2024-01-05T01:00:00+02:00").unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2024, 1, 4, 23, 0, 0).unwrap());
    }
}
