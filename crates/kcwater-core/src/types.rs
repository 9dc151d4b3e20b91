//! Core domain types for kcwater
//!
//! Usage records come from the portal verbatim. Only the date-related fields
//! are interpreted; everything else is carried through untouched so that JSON
//! output round-trips what the server sent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Date format the portal uses for request dates and most charge dates
/// (e.g. `05-Mar-2024`)
pub const API_DATE_FORMAT: &str = "%d-%b-%Y";

/// Fallback charge-date format seen on some records (e.g. `03-05-2024`)
pub const ALT_DATE_FORMAT: &str = "%m-%d-%Y";

/// Format a date the way the usage endpoints expect it
///
/// # Examples
/// ```
/// use kcwater_core::types::format_api_date;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(format_api_date(date), "05-Mar-2024");
/// ```
pub fn format_api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

/// Portal login credentials
///
/// The password is never shown by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Create credentials from a username and password
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Granularity of a usage request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageKind {
    /// One record per hour of a single day
    Hourly,
    /// One record per day of a month
    Daily,
}

impl UsageKind {
    /// Lowercase name, used for diagnostic file names and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageKind::Hourly => "hourly",
            UsageKind::Daily => "daily",
        }
    }
}

impl fmt::Display for UsageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single meter reading as returned by the usage endpoints
///
/// # Examples
/// ```
/// use kcwater_core::types::UsageRecord;
///
/// let record: UsageRecord = serde_json::from_str(
///     r#"{"chargeDateRaw":"05-Mar-2024","readDate":"03/05/2024","readDateTime":"9 AM","gallonsConsumption":12.5}"#,
/// ).unwrap();
/// assert_eq!(record.read_date_time(), Some("9 AM"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Charge date, `DD-Mon-YYYY` or `MM-DD-YYYY`
    pub charge_date_raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_date: Option<String>,
    /// Hour of the reading, e.g. `"3 PM"`; absent on daily records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_date_time: Option<String>,
    /// Kept as the server's number so integers stay integers on output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallons_consumption: Option<Number>,
    /// Every other field the server sent
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UsageRecord {
    /// Create a record with only a charge date set
    pub fn new(charge_date_raw: impl Into<String>) -> Self {
        Self {
            charge_date_raw: charge_date_raw.into(),
            read_date: None,
            read_date_time: None,
            gallons_consumption: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the read time (e.g. `"9 AM"`)
    pub fn with_read_date_time(mut self, read_date_time: impl Into<String>) -> Self {
        self.read_date_time = Some(read_date_time.into());
        self
    }

    /// Set the read date as displayed by the portal
    pub fn with_read_date(mut self, read_date: impl Into<String>) -> Self {
        self.read_date = Some(read_date.into());
        self
    }

    /// Set the consumption in gallons; non-finite values leave it unset
    pub fn with_gallons(mut self, gallons: f64) -> Self {
        self.gallons_consumption = Number::from_f64(gallons);
        self
    }

    /// Consumption in gallons as a float
    pub fn gallons(&self) -> Option<f64> {
        self.gallons_consumption.as_ref().and_then(Number::as_f64)
    }

    /// Read date as displayed by the portal, if sent
    pub fn read_date(&self) -> Option<&str> {
        self.read_date.as_deref()
    }

    /// Read time, treating an empty string the same as a missing one
    pub fn read_date_time(&self) -> Option<&str> {
        self.read_date_time
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Ordered list of readings for a requested period
pub type UsageHistory = Vec<UsageRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("user@example.com", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_usage_kind_display() {
        assert_eq!(UsageKind::Hourly.to_string(), "hourly");
        assert_eq!(UsageKind::Daily.to_string(), "daily");
    }

    #[test]
    fn test_record_keeps_unknown_fields() {
        let raw = json!({
            "chargeDateRaw": "05-Mar-2024",
            "readDate": "03/05/2024",
            "readDateTime": "3 PM",
            "gallonsConsumption": 7.48,
            "usageValue": 1.0,
            "unitOfMeasure": "CCF"
        });
        let record: UsageRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.charge_date_raw, "05-Mar-2024");
        assert_eq!(record.gallons(), Some(7.48));
        assert_eq!(record.extra.get("unitOfMeasure"), Some(&json!("CCF")));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_empty_read_time_is_absent() {
        let record = UsageRecord::new("05-Mar-2024").with_read_date_time("  ");
        assert_eq!(record.read_date_time(), None);

        let record: UsageRecord =
            serde_json::from_value(json!({"chargeDateRaw": "05-Mar-2024", "readDateTime": null}))
                .unwrap();
        assert_eq!(record.read_date_time(), None);
        assert_eq!(record.read_date(), None);
    }

    #[test]
    fn test_sparse_record_serializes_as_received() {
        let raw = json!({"chargeDateRaw": "01-Mar-2024", "gallonsConsumption": 12});
        let record: UsageRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.gallons(), Some(12.0));
        assert_eq!(record.read_date(), None);

        let back = serde_json::to_string(&record).unwrap();
        assert_eq!(back, r#"{"chargeDateRaw":"01-Mar-2024","gallonsConsumption":12}"#);
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn test_null_read_date_is_accepted() {
        let record: UsageRecord = serde_json::from_value(json!({
            "chargeDateRaw": "01-Mar-2024",
            "readDate": null,
            "gallonsConsumption": 3.0
        }))
        .unwrap();
        assert_eq!(record.read_date(), None);
        assert_eq!(record.gallons(), Some(3.0));
    }

    #[test]
    fn test_with_gallons_ignores_nan() {
        assert_eq!(UsageRecord::new("01-Mar-2024").with_gallons(f64::NAN).gallons(), None);
    }
}
