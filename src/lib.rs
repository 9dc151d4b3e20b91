//! kcwater - Fetch water usage from the KC Water customer portal
//!
//! This library provides functionality to:
//! - Log in to the portal and resolve the account's meter identifiers
//! - Fetch hourly readings for a day and daily readings for a month
//! - Drop readings whose metering period has not finished yet
//! - Dump raw API responses for troubleshooting
//!
//! # Examples
//!
//! ```no_run
//! use kcwater::{client::UsageClient, types::Credentials};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> kcwater::Result<()> {
//!     let mut client = UsageClient::new(Credentials::new("me@example.com", "secret"));
//!     client.login().await?;
//!
//!     let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
//!     let hourly = client.get_usage_hourly(day).await?.unwrap_or_default();
//!     println!("{} hourly readings", hourly.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod output;
pub mod session;
pub mod transport;

#[cfg(test)]
pub mod test_utils;

pub use kcwater_core::{clock, error, filters, types};

// Re-export commonly used types
pub use client::UsageClient;
pub use error::{KcWaterError, Result};
pub use session::Session;
pub use types::{Credentials, UsageHistory, UsageKind, UsageRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
