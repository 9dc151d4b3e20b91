//! Credential loading
//!
//! Credentials come from, in order of precedence:
//! 1. `--username` / `--password` (or `KCWATER_USERNAME` / `KCWATER_PASSWORD`)
//! 2. a JSON file `{"username": "...", "password": "..."}` given with
//!    `--credentials` (or `KCWATER_CREDENTIALS`)
//! 3. `<config dir>/kcwater/credentials.json`
//!
//! A value given on the command line overrides the same field from the file,
//! so a file holding only the username can be combined with a password from
//! the environment.

use kcwater_core::error::{KcWaterError, Result};
use kcwater_core::types::Credentials;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the credentials file
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kcwater").join("credentials.json"))
}

#[derive(Deserialize)]
struct CredentialsFile {
    username: Option<String>,
    password: Option<String>,
}

fn read_credentials_file(path: &Path) -> Result<CredentialsFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            KcWaterError::Config(format!("credentials file not found: {}", path.display()))
        } else {
            KcWaterError::Io(e)
        }
    })?;
    debug!("Loaded credentials file {}", path.display());
    Ok(serde_json::from_str(&content)?)
}

/// Load a complete set of credentials from a JSON file
pub fn load_credentials_file(path: &Path) -> Result<Credentials> {
    resolve_credentials(None, None, Some(path))
}

/// Combine command-line values with a credentials file
///
/// The file is only read when a field is missing from the command line.
/// `file` falls back to [`default_credentials_path`] when `None`.
pub fn resolve_credentials(
    username: Option<String>,
    password: Option<String>,
    file: Option<&Path>,
) -> Result<Credentials> {
    if let (Some(username), Some(password)) = (&username, &password) {
        return Ok(Credentials::new(username.clone(), password.clone()));
    }

    let path = match file {
        Some(path) => path.to_path_buf(),
        None => default_credentials_path().ok_or_else(|| {
            KcWaterError::Config(
                "no credentials given and no config directory to look in; \
                 pass --username and --password"
                    .into(),
            )
        })?,
    };
    let from_file = read_credentials_file(&path)?;

    let username = username
        .or(from_file.username)
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| KcWaterError::Config(format!("no username in {}", path.display())))?;
    let password = password
        .or(from_file.password)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| KcWaterError::Config(format!("no password in {}", path.display())))?;

    Ok(Credentials::new(username, password))
}
