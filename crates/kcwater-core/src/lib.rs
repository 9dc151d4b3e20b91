//! Core types, traits, and utilities for kcwater
//!
//! This crate provides the usage record types, the error type, the clock
//! (including timezone resolution) and the date validation that removes
//! readings whose period has not elapsed yet. Nothing in here touches the network.

pub mod clock;
pub mod error;
pub mod filters;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{KcWaterError, Result};
pub use filters::{DateValidator, HistoryFilter};
pub use types::{Credentials, UsageHistory, UsageKind, UsageRecord};
