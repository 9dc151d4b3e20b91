//! Filtering of readings whose period has not elapsed yet
//!
//! The usage endpoints return a full month (or day) of slots, including
//! slots in the future and the hour that is still being metered. Those
//! entries are placeholders and are dropped before data reaches the caller.
//!
//! # Examples
//!
//! ```
//! use kcwater_core::filters::{DateValidator, HistoryFilter};
//! use kcwater_core::types::UsageRecord;
//! use chrono::NaiveDate;
//!
//! let now = NaiveDate::from_ymd_opt(2024, 3, 5)
//!     .unwrap()
//!     .and_hms_opt(11, 30, 0)
//!     .unwrap();
//! let filter = HistoryFilter::new(DateValidator::new(now));
//!
//! let history = vec![
//!     UsageRecord::new("04-Mar-2024"),
//!     UsageRecord::new("05-Mar-2024").with_read_date_time("9 AM"),
//!     UsageRecord::new("05-Mar-2024").with_read_date_time("11 AM"),
//!     UsageRecord::new("06-Mar-2024"),
//! ];
//! let kept = filter.apply(history).unwrap();
//! assert_eq!(kept.len(), 2);
//! ```

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::cmp::Ordering;
use tracing::debug;

use crate::clock::Clock;
use crate::error::{KcWaterError, Result};
use crate::types::{ALT_DATE_FORMAT, API_DATE_FORMAT, UsageHistory, UsageRecord};

/// Parse a charge date in `DD-Mon-YYYY`, falling back to `MM-DD-YYYY`
pub fn parse_charge_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, API_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, ALT_DATE_FORMAT))
        .map_err(|_| {
            KcWaterError::InvalidDate(format!(
                "'{raw}', expected DD-Mon-YYYY or MM-DD-YYYY"
            ))
        })
}

/// Parse a read time such as `"3 PM"` into the meter's hour number
///
/// AM keeps the hour, PM adds twelve. 12 AM and 12 PM are not special-cased
/// and come out as 12 and 24 respectively, which is how the meter slots are
/// numbered.
pub fn parse_read_hour(raw: &str) -> Result<u32> {
    let invalid = || KcWaterError::InvalidReadTime(format!("'{raw}', expected \"<hour> AM|PM\""));

    let mut parts = raw.split_whitespace();
    let (Some(hour), Some(meridiem), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour) {
        return Err(invalid());
    }

    match meridiem.to_ascii_uppercase().as_str() {
        "AM" => Ok(hour),
        "PM" => Ok(hour + 12),
        _ => Err(invalid()),
    }
}

/// Decides whether a reading's period has fully elapsed at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateValidator {
    now: NaiveDateTime,
}

impl DateValidator {
    /// Create a validator that treats `now` as the current local time
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Create a validator from the current time of a clock
    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.now())
    }

    /// The instant this validator compares against
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Check whether the record's reading period has elapsed
    ///
    /// Past charge dates are always valid and future ones never are. A reading
    /// dated today is valid only once the hour after its read hour has
    /// started; without a read time it is not valid yet.
    pub fn is_valid(&self, record: &UsageRecord) -> Result<bool> {
        let charge_date = parse_charge_date(&record.charge_date_raw)?;

        match charge_date.cmp(&self.now.date()) {
            Ordering::Less => Ok(true),
            Ordering::Greater => Ok(false),
            Ordering::Equal => match record.read_date_time() {
                Some(read_time) => {
                    let hour = parse_read_hour(read_time)?;
                    // +1 so the hour still being metered is excluded
                    let cutoff = charge_date.and_time(NaiveTime::MIN)
                        + Duration::hours(i64::from(hour) + 1);
                    Ok(self.now >= cutoff)
                }
                None => Ok(false),
            },
        }
    }
}

/// Applies a [`DateValidator`] across a usage history
#[derive(Debug, Clone, Copy)]
pub struct HistoryFilter {
    validator: DateValidator,
}

impl HistoryFilter {
    /// Create a filter around a validator
    pub fn new(validator: DateValidator) -> Self {
        Self { validator }
    }

    /// Create a filter using the current time of a clock
    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(DateValidator::from_clock(clock))
    }

    /// Keep only the records whose period has elapsed, in their original order
    ///
    /// The first unparseable charge date or read time aborts the whole
    /// filter with a parse error.
    pub fn apply(&self, history: UsageHistory) -> Result<UsageHistory> {
        let total = history.len();
        let mut kept = Vec::with_capacity(total);

        for record in history {
            if self.validator.is_valid(&record)? {
                kept.push(record);
            }
        }

        debug!(
            "Kept {} of {} readings (now = {})",
            kept.len(),
            total,
            self.validator.now()
        );
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_charge_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_charge_date("05-Mar-2024").unwrap(), expected);
        assert_eq!(parse_charge_date("03-05-2024").unwrap(), expected);
        assert!(matches!(
            parse_charge_date("2024-03-05"),
            Err(KcWaterError::InvalidDate(_))
        ));
        assert!(parse_charge_date("").is_err());
    }

    #[test]
    fn test_parse_charge_date_rejects_trailing_text() {
        for bad in ["05-Mar-2024 ", "03-05-2024\n", "05-Mar-2024 9 AM"] {
            assert!(
                matches!(parse_charge_date(bad), Err(KcWaterError::InvalidDate(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_read_hour() {
        assert_eq!(parse_read_hour("9 AM").unwrap(), 9);
        assert_eq!(parse_read_hour("3 PM").unwrap(), 15);
        assert_eq!(parse_read_hour("3 pm").unwrap(), 15);
        // 12 AM/PM keep the literal arithmetic
        assert_eq!(parse_read_hour("12 AM").unwrap(), 12);
        assert_eq!(parse_read_hour("12 PM").unwrap(), 24);

        for bad in ["9", "9AM", "0 AM", "13 PM", "nine AM", "9 XM", "9 AM extra"] {
            assert!(
                matches!(parse_read_hour(bad), Err(KcWaterError::InvalidReadTime(_))),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_past_dates_always_valid() {
        let validator = DateValidator::new(at(2024, 3, 5, 0, 0, 0));
        assert!(validator.is_valid(&UsageRecord::new("04-Mar-2024")).unwrap());
        assert!(
            validator
                .is_valid(&UsageRecord::new("04-Mar-2024").with_read_date_time("11 PM"))
                .unwrap()
        );
        // A past record's read time is never inspected
        assert!(
            validator
                .is_valid(&UsageRecord::new("02-29-2024").with_read_date_time("garbage"))
                .unwrap()
        );
    }

    #[test]
    fn test_future_dates_never_valid() {
        let validator = DateValidator::new(at(2024, 3, 5, 23, 59, 59));
        assert!(!validator.is_valid(&UsageRecord::new("06-Mar-2024")).unwrap());
        assert!(
            !validator
                .is_valid(&UsageRecord::new("03-06-2024").with_read_date_time("1 AM"))
                .unwrap()
        );
    }

    #[test]
    fn test_today_without_read_time_is_invalid() {
        let validator = DateValidator::new(at(2024, 3, 5, 23, 59, 59));
        assert!(!validator.is_valid(&UsageRecord::new("05-Mar-2024")).unwrap());
    }

    #[test]
    fn test_today_morning_cutoff() {
        let record = UsageRecord::new("05-Mar-2024").with_read_date_time("9 AM");
        assert!(!DateValidator::new(at(2024, 3, 5, 9, 59, 59)).is_valid(&record).unwrap());
        assert!(DateValidator::new(at(2024, 3, 5, 10, 0, 0)).is_valid(&record).unwrap());
    }

    #[test]
    fn test_today_afternoon_cutoff_is_inclusive() {
        let record = UsageRecord::new("05-Mar-2024").with_read_date_time("3 PM");
        assert!(!DateValidator::new(at(2024, 3, 5, 15, 59, 59)).is_valid(&record).unwrap());
        assert!(DateValidator::new(at(2024, 3, 5, 16, 0, 0)).is_valid(&record).unwrap());
    }

    #[test]
    fn test_twelve_pm_rolls_past_midnight() {
        // 12 PM maps to hour 24, so its cutoff lands on the next day at 01:00
        let record = UsageRecord::new("05-Mar-2024").with_read_date_time("12 PM");
        assert!(!DateValidator::new(at(2024, 3, 5, 23, 59, 59)).is_valid(&record).unwrap());
    }

    #[test]
    fn test_today_with_bad_read_time_errors() {
        let validator = DateValidator::new(at(2024, 3, 5, 12, 0, 0));
        let result = validator.is_valid(&UsageRecord::new("05-Mar-2024").with_read_date_time("noon"));
        assert!(matches!(result, Err(KcWaterError::InvalidReadTime(_))));
    }

    #[test]
    fn test_filter_preserves_order() {
        let filter = HistoryFilter::from_clock(&FixedClock(at(2024, 3, 5, 11, 30, 0)));
        let history = vec![
            UsageRecord::new("03-Mar-2024").with_gallons(1.0),
            UsageRecord::new("07-Mar-2024").with_gallons(2.0),
            UsageRecord::new("01-Mar-2024").with_gallons(3.0),
            UsageRecord::new("05-Mar-2024").with_read_date_time("10 AM").with_gallons(4.0),
            UsageRecord::new("05-Mar-2024").with_read_date_time("11 AM").with_gallons(5.0),
        ];

        let kept = filter.apply(history).unwrap();
        let gallons: Vec<_> = kept.iter().filter_map(|r| r.gallons()).collect();
        assert_eq!(gallons, vec![1.0, 3.0, 4.0]);

        let again = filter.apply(kept.clone()).unwrap();
        assert_eq!(again, kept);
    }

    #[test]
    fn test_filter_empty_history() {
        let filter = HistoryFilter::new(DateValidator::new(at(2024, 3, 5, 12, 0, 0)));
        assert!(filter.apply(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_filter_propagates_parse_error() {
        let filter = HistoryFilter::new(DateValidator::new(at(2024, 3, 5, 12, 0, 0)));
        let history = vec![
            UsageRecord::new("04-Mar-2024"),
            UsageRecord::new("March 5th"),
        ];
        assert!(matches!(
            filter.apply(history),
            Err(KcWaterError::InvalidDate(_))
        ));
    }
}
