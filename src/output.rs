//! Output formatting module for kcwater
//!
//! This module provides formatters for displaying usage data in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use kcwater::output::get_formatter;
//! use kcwater::types::{UsageKind, UsageRecord};
//!
//! let history = vec![
//!     UsageRecord::new("05-Mar-2024").with_read_date("03/05/2024").with_gallons(42.0),
//! ];
//!
//! let formatter = get_formatter(false);
//! println!("{}", formatter.format_history(UsageKind::Daily, &history));
//! ```

use crate::session::Session;
use colored::Colorize;
use kcwater_core::types::{UsageKind, UsageRecord};
use prettytable::{Cell, Row, Table, format, row};
use serde_json::json;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a filtered usage history with a total
    fn format_history(&self, kind: UsageKind, data: &[UsageRecord]) -> String;

    /// Format the identifiers of a logged-in session
    fn format_account(&self, session: &Session) -> String;

    /// Format the most recent daily and hourly readings
    fn format_latest(&self, daily: Option<&UsageRecord>, hourly: Option<&UsageRecord>) -> String;
}

/// Sum of `gallonsConsumption` over a history, ignoring records without one
pub fn total_gallons(data: &[UsageRecord]) -> f64 {
    data.iter().filter_map(UsageRecord::gallons).sum()
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl TableFormatter {
    fn format_gallons(gallons: Option<f64>) -> String {
        match gallons {
            Some(g) => format!("{g:.2}"),
            None => "-".to_string(),
        }
    }

    fn describe(record: &UsageRecord) -> String {
        let date = record.read_date().unwrap_or(record.charge_date_raw.as_str());
        match record.read_date_time() {
            Some(time) => format!("{date} {time}"),
            None => date.to_string(),
        }
    }
}

impl OutputFormatter for TableFormatter {
    fn format_history(&self, kind: UsageKind, data: &[UsageRecord]) -> String {
        if data.is_empty() {
            return format!("No {kind} readings available yet\n");
        }

        let hourly = kind == UsageKind::Hourly;
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        if hourly {
            table.set_titles(row![b -> "Charge Date", b -> "Read Date", b -> "Hour", b -> "Gallons"]);
        } else {
            table.set_titles(row![b -> "Charge Date", b -> "Read Date", b -> "Gallons"]);
        }

        for record in data {
            let gallons = Self::format_gallons(record.gallons());
            if hourly {
                table.add_row(row![
                    record.charge_date_raw,
                    record.read_date().unwrap_or("-"),
                    record.read_date_time().unwrap_or("-"),
                    r -> gallons
                ]);
            } else {
                table.add_row(row![
                    record.charge_date_raw,
                    record.read_date().unwrap_or("-"),
                    r -> gallons
                ]);
            }
        }

        let columns = if hourly { 4 } else { 3 };
        table.add_row(Row::new(vec![Cell::new(""); columns]));

        let total = Self::format_gallons(Some(total_gallons(data)));
        if hourly {
            table.add_row(row![b -> "TOTAL", "", "", br -> total]);
        } else {
            table.add_row(row![b -> "TOTAL", "", br -> total]);
        }

        table.to_string()
    }

    fn format_account(&self, session: &Session) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table.add_row(row![b -> "Customer ID", session.customer_id().unwrap_or("-")]);
        table.add_row(row![b -> "Account Number", session.account_number().unwrap_or("-")]);
        table.add_row(row![b -> "Service ID", session.service_id().unwrap_or("-")]);
        table.to_string()
    }

    fn format_latest(&self, daily: Option<&UsageRecord>, hourly: Option<&UsageRecord>) -> String {
        let mut output = String::new();
        for (label, record) in [("daily", daily), ("hourly", hourly)] {
            match record {
                Some(record) => output.push_str(&format!(
                    "Last {} reading: {} gal for {}\n",
                    label,
                    Self::format_gallons(record.gallons()).bold(),
                    Self::describe(record)
                )),
                None => output.push_str(&format!("Last {label} reading: {}\n", "no readings".dimmed())),
            }
        }
        output
    }
}

/// JSON formatter for machine-readable output
///
/// Records are emitted with every field the server sent.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_history(&self, kind: UsageKind, data: &[UsageRecord]) -> String {
        let output = json!({
            "kind": kind.as_str(),
            "readings": data,
            "totals": {
                "readings": data.len(),
                "gallons": total_gallons(data),
            }
        });
        serde_json::to_string_pretty(&output).unwrap_or_default()
    }

    fn format_account(&self, session: &Session) -> String {
        let output = json!({
            "customer_id": session.customer_id(),
            "account_number": session.account_number(),
            "service_id": session.service_id(),
        });
        serde_json::to_string_pretty(&output).unwrap_or_default()
    }

    fn format_latest(&self, daily: Option<&UsageRecord>, hourly: Option<&UsageRecord>) -> String {
        let output = json!({
            "daily": daily,
            "hourly": hourly,
        });
        serde_json::to_string_pretty(&output).unwrap_or_default()
    }
}

/// Pick a formatter for the requested output mode
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}
