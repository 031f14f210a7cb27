//! # Invoice Numbering
//!
//! Formats human-readable bill numbers.
//!
//! ## Shape
//! ```text
//!   INV-A1B2-20240115-0001
//!   │   │    │        └── per-(shop, day) sequence, 4 digits minimum
//!   │   │    └─────────── UTC business date of the sale
//!   │   └──────────────── last 4 alphanumerics of the shop id, upper case
//!   └──────────────────── fixed prefix
//! ```
//!
//! The sequence itself comes from an atomic counter in kirana-db; this
//! module only formats.

use chrono::{DateTime, NaiveDate, Utc};

/// Fixed prefix of every bill number.
pub const BILL_PREFIX: &str = "INV";

/// Length of the shop suffix.
const SUFFIX_LEN: usize = 4;

/// Derives the shop suffix: last four ASCII alphanumeric characters of the
/// shop id, upper-cased, left-padded with `0`.
///
/// ```rust
/// use kirana_core::invoice::shop_suffix;
///
/// assert_eq!(shop_suffix("550e8400-e29b-41d4-a716-446655440000"), "0000");
/// assert_eq!(shop_suffix("shop-a1b2"), "A1B2");
/// assert_eq!(shop_suffix("x9"), "00X9");
/// ```
pub fn shop_suffix(shop_id: &str) -> String {
    let alnum: Vec<char> = shop_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let tail = &alnum[alnum.len().saturating_sub(SUFFIX_LEN)..];
    let mut suffix = "0".repeat(SUFFIX_LEN - tail.len());
    suffix.extend(tail);
    suffix
}

/// The calendar day a sale belongs to for numbering purposes.
#[inline]
pub fn business_date(created_at: DateTime<Utc>) -> NaiveDate {
    created_at.date_naive()
}

/// Formats a bill number from its parts.
///
/// ```rust
/// use chrono::NaiveDate;
/// use kirana_core::invoice::format_bill_number;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// assert_eq!(format_bill_number("shop-a1b2", date, 1), "INV-A1B2-20240115-0001");
/// assert_eq!(format_bill_number("shop-a1b2", date, 12345), "INV-A1B2-20240115-12345");
/// ```
pub fn format_bill_number(shop_id: &str, date: NaiveDate, seq: i64) -> String {
    format!(
        "{}-{}-{}-{:04}",
        BILL_PREFIX,
        shop_suffix(shop_id),
        date.format("%Y%m%d"),
        seq
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_suffix_skips_punctuation() {
        assert_eq!(shop_suffix("kirana_store-7f"), "RE7F");
        assert_eq!(shop_suffix("--"), "0000");
        assert_eq!(shop_suffix(""), "0000");
    }

    #[test]
    fn test_business_date_is_utc() {
        // 23:30 UTC is already the next day in IST, but numbering uses UTC
        let ts = Utc.with_ymd_and_hms(2024, 3, 31, 23, 30, 0).unwrap();
        assert_eq!(
            business_date(ts),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        );
    }

    #[test]
    fn test_numbers_sort_within_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let a = format_bill_number("s1", date, 9);
        let b = format_bill_number("s1", date, 10);
        assert_eq!(a, "INV-00S1-20240115-0009");
        assert!(a < b);
    }
}
