//! Source of the current wall-clock time
//!
//! Charge dates and read hours are wall-clock values in the utility's local
//! time, so date validation needs "now" in a chosen zone rather than in UTC.
//! Taking that value from a [`Clock`] instead of the process clock also lets
//! tests pin it to any instant.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{KcWaterError, Result};

/// Provides the current local date and time
pub trait Clock: Send + Sync {
    /// Current wall-clock time in the utility's timezone
    fn now(&self) -> NaiveDateTime;

    /// Current local date
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Reads the system clock and converts it to a configured timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemClock {
    zone: Tz,
}

impl SystemClock {
    /// Create a clock for the given timezone
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Clock in the zone selected by `--timezone` / `--utc`
    ///
    /// `utc` wins over `zone`; with neither the machine's zone is used.
    pub fn from_args(zone: Option<&str>, utc: bool) -> Result<Self> {
        match (utc, zone) {
            (true, _) => Ok(Self::new(Tz::UTC)),
            (false, Some(name)) => parse_zone(name).map(Self::new),
            (false, None) => Ok(Self::local()),
        }
    }

    /// Clock in the machine's zone: `TZ`, then the OS setting, then UTC
    pub fn local() -> Self {
        Self::new(detect_zone())
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::local()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.zone).naive_local()
    }
}

fn parse_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>().map_err(|_| {
        KcWaterError::InvalidTimezone(format!(
            "'{name}'. Use an IANA name such as 'America/Chicago' or 'UTC'"
        ))
    })
}

fn detect_zone() -> Tz {
    let from_env = std::env::var("TZ").ok().and_then(|name| name.parse::<Tz>().ok());
    if let Some(zone) = from_env {
        debug!("Meter hours read in {} (from TZ)", zone.name());
        return zone;
    }

    match iana_time_zone::get_timezone().map(|name| name.parse::<Tz>()) {
        Ok(Ok(zone)) => {
            debug!("Meter hours read in {} (system zone)", zone.name());
            zone
        }
        Ok(Err(e)) => {
            debug!("Unknown system zone ({}), reading meter hours in UTC", e);
            Tz::UTC
        }
        Err(e) => {
            debug!("No system zone ({:?}), reading meter hours in UTC", e);
            Tz::UTC
        }
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
