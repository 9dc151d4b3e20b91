//! CLI interface for kcwater
//!
//! # Example
//!
//! ```bash
//! # Hourly readings for a given day
//! kcwater hourly --date 2024-03-05
//!
//! # Daily readings for March 2024, as JSON
//! kcwater daily --date 2024-03 --json
//!
//! # Latest daily and hourly reading (the default)
//! kcwater
//! ```

use crate::client::DEFAULT_BASE_URL;
use crate::error::{KcWaterError, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use kcwater_core::types::API_DATE_FORMAT;
use std::path::PathBuf;

/// Fetch water usage from the KC Water customer portal
#[derive(Parser, Debug, Clone)]
#[command(name = "kcwater")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Portal username
    #[arg(long, short = 'u', env = "KCWATER_USERNAME", global = true)]
    pub username: Option<String>,

    /// Portal password
    #[arg(long, env = "KCWATER_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// JSON file with "username" and "password"
    /// (default: <config dir>/kcwater/credentials.json)
    #[arg(long, env = "KCWATER_CREDENTIALS", global = true)]
    pub credentials: Option<PathBuf>,

    /// Portal base URL
    #[arg(long, env = "KCWATER_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Timezone used to decide which readings are complete (e.g. "America/Chicago")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use UTC (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Write raw API responses into this directory
    #[arg(long, global = true)]
    pub dump_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hourly readings for one day
    Hourly {
        /// Day to fetch (YYYY-MM-DD, default: today)
        #[arg(long, short = 'd')]
        date: Option<String>,
    },

    /// Daily readings for one month
    Daily {
        /// Any day of the month to fetch (YYYY-MM-DD or YYYY-MM, default: this month)
        #[arg(long, short = 'd')]
        date: Option<String>,
    },

    /// Show the resolved account identifiers
    Account,

    /// Show the most recent daily and hourly reading
    Latest,
}

/// Parse a single day given as `YYYY-MM-DD` or `DD-Mon-YYYY`
pub fn parse_day(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_str, API_DATE_FORMAT))
        .map_err(|_| {
            KcWaterError::InvalidArgument(format!(
                "Invalid date '{date_str}', expected YYYY-MM-DD"
            ))
        })
}

/// Parse a month selector: a full day, or `YYYY-MM` meaning the first of that month
pub fn parse_month(date_str: &str) -> Result<NaiveDate> {
    if let Ok(date) = parse_day(date_str) {
        return Ok(date);
    }

    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() == 2 {
        let year = parts[0]
            .parse::<i32>()
            .map_err(|_| KcWaterError::InvalidArgument(format!("Invalid year in '{date_str}'")))?;
        let month = parts[1]
            .parse::<u32>()
            .map_err(|_| KcWaterError::InvalidArgument(format!("Invalid month in '{date_str}'")))?;

        if !(1..=12).contains(&month) {
            return Err(KcWaterError::InvalidArgument(format!(
                "Month must be between 1-12, got {month}"
            )));
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| KcWaterError::InvalidArgument(format!("Invalid date: {date_str}")))
    } else {
        Err(KcWaterError::InvalidArgument(format!(
            "Invalid date format '{date_str}', expected YYYY-MM-DD or YYYY-MM"
        )))
    }
}
