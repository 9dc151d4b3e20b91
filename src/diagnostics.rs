//! Raw response capture for troubleshooting
//!
//! The portal API is undocumented, so when something looks off it helps to
//! see exactly what came back. A [`DiagnosticSink`] receives every raw usage
//! response before filtering. The default sink discards it; [`FileDumpSink`]
//! writes it to disk.

use kcwater_core::error::Result;
use kcwater_core::types::UsageKind;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Receives raw usage responses
pub trait DiagnosticSink: Send + Sync {
    /// Record the untouched response of a usage request
    fn record(&self, kind: UsageKind, response: &Value) -> Result<()>;
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record(&self, _kind: UsageKind, _response: &Value) -> Result<()> {
        Ok(())
    }
}

/// Writes responses as pretty-printed JSON files
///
/// For each request kind two files are written into the target directory:
/// `<kind>_output.json` with the full response and `<kind>_secondary.json`
/// with the decoded `jsonData` payload, which the server sends as a string
/// containing JSON. Files are overwritten on every request.
#[derive(Debug, Clone)]
pub struct FileDumpSink {
    dir: PathBuf,
}

impl FileDumpSink {
    /// Dump into `dir`, which must already exist
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the full-response dump for `kind`
    pub fn output_path(&self, kind: UsageKind) -> PathBuf {
        self.dir.join(format!("{kind}_output.json"))
    }

    /// Path of the decoded `jsonData` dump for `kind`
    pub fn secondary_path(&self, kind: UsageKind) -> PathBuf {
        self.dir.join(format!("{kind}_secondary.json"))
    }
}

impl DiagnosticSink for FileDumpSink {
    fn record(&self, kind: UsageKind, response: &Value) -> Result<()> {
        let output_path = self.output_path(kind);
        std::fs::write(&output_path, serde_json::to_string_pretty(response)?)?;
        debug!("Wrote raw {} response to {}", kind, output_path.display());

        if let Some(Value::String(encoded)) = response.get("jsonData") {
            let secondary: Value = serde_json::from_str(encoded)?;
            let secondary_path = self.secondary_path(kind);
            std::fs::write(&secondary_path, serde_json::to_string_pretty(&secondary)?)?;
            debug!("Wrote {} jsonData to {}", kind, secondary_path.display());
        }

        Ok(())
    }
}
