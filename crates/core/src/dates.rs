//! Date formatting for letters and placeholder values.
//!
//! Month names come from chrono's built-in English tables, so output never depends on the
//! process locale.
//!
//! Placeholder dates are offered in three styles. Each style has its own format string rather
//! than being derived from one shared formatter; a change to one style must be mirrored in the
//! others by hand.

use casedesk_types::LetterDateFormat;
use chrono::NaiveDate;

/// Formats the date shown in the letter's date block.
///
/// - `Full`: `January 6, 2026`
/// - `Short`: `01/06/2026`
/// - `Iso`: `2026-01-06`
pub fn format_letter_date(date: NaiveDate, format: LetterDateFormat) -> String {
    match format {
        LetterDateFormat::Full => date.format("%B %-d, %Y").to_string(),
        LetterDateFormat::Short => date.format("%m/%d/%Y").to_string(),
        LetterDateFormat::Iso => date.format("%Y-%m-%d").to_string(),
    }
}

/// `Jan 6, 2026`, used for the bare `{{Namespace.field}}` key.
pub(crate) fn standard_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `January 6, 2026`, used for the `_long` key.
pub(crate) fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// `01/06/2026`, used for the `_short` key.
pub(crate) fn short_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Formats an amount held in cents as US dollars with thousands separators.
pub(crate) fn format_cents(cents: i64) -> String {
    let negative = cents < 0;
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();
    let remainder = abs % 100;

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        remainder
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_6() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 6).unwrap()
    }

    #[test]
    fn test_format_letter_date_full_and_short() {
        assert_eq!(
            format_letter_date(jan_6(), LetterDateFormat::Full),
            "January 6, 2026"
        );
        assert_eq!(
            format_letter_date(jan_6(), LetterDateFormat::Short),
            "01/06/2026"
        );
        assert_eq!(format_letter_date(jan_6(), LetterDateFormat::Iso), "2026-01-06");
    }

    #[test]
    fn test_format_letter_date_is_deterministic() {
        let a = format_letter_date(jan_6(), LetterDateFormat::Full);
        let b = format_letter_date(jan_6(), LetterDateFormat::Full);
        assert_eq!(a, b);
    }

    #[test]
    fn test_placeholder_date_styles() {
        assert_eq!(standard_date(jan_6()), "Jan 6, 2026");
        assert_eq!(long_date(jan_6()), "January 6, 2026");
        assert_eq!(short_date(jan_6()), "01/06/2026");
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(0), "$0.00");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(123_456), "$1,234.56");
        assert_eq!(format_cents(100_000_000), "$1,000,000.00");
        assert_eq!(format_cents(-1_250), "-$12.50");
    }
}
