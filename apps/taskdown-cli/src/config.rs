//! Platform configuration paths and credential storage.
//!
//! Credentials live under the data directory, backups and the log under the
//! cache directory, both with one subdirectory per profile:
//!
//! - Linux: `~/.local/share/taskdown/<user>/`, `~/.cache/taskdown/<user>/`
//! - macOS: `~/Library/Application Support/taskdown/<user>/`, `~/Library/Caches/taskdown/<user>/`
//!
//! `TASKDOWN_DATA_DIR` and `TASKDOWN_CACHE_DIR` override the roots.

use crate::error::{CliError, CliResult};
use std::path::PathBuf;
use taskdown_gtasks::auth::Credentials;

/// Filesystem locations for one profile.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Per-profile data directory (credentials).
    pub data_dir: PathBuf,
    /// Per-profile cache directory (backups).
    pub cache_dir: PathBuf,
    /// Path to the stored credentials file.
    pub credentials_file: PathBuf,
    /// Shared log file, one per machine rather than per profile.
    pub log_file: PathBuf,
}

impl ConfigPaths {
    pub fn for_user(user: &str) -> CliResult<Self> {
        let data_root = match std::env::var("TASKDOWN_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::data_dir()
                .ok_or_else(|| {
                    CliError::Config("could not determine the data directory".to_string())
                })?
                .join("taskdown"),
        };
        let cache_root = match std::env::var("TASKDOWN_CACHE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::cache_dir()
                .ok_or_else(|| {
                    CliError::Config("could not determine the cache directory".to_string())
                })?
                .join("taskdown"),
        };

        let data_dir = data_root.join(user);
        let cache_dir = cache_root.join(user);
        Ok(Self {
            credentials_file: data_dir.join("credentials.json"),
            log_file: cache_root.join("log.txt"),
            data_dir,
            cache_dir,
        })
    }

    /// Create the profile directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> CliResult<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }
}

/// Load the stored credentials for a profile.
pub fn load_credentials(paths: &ConfigPaths) -> CliResult<Credentials> {
    let bytes = std::fs::read(&paths.credentials_file).map_err(|_| CliError::NotAuthenticated)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CliError::Config(format!("unreadable credentials file: {e}")))
}

/// Validate and store a credentials file for a profile.
///
/// The input must parse as a credentials document; storing garbage would
/// only surface as a confusing failure on the next fetch.
pub fn save_credentials(paths: &ConfigPaths, text: &str) -> CliResult<()> {
    let credentials: Credentials = serde_json::from_str(text)
        .map_err(|e| CliError::Validation(format!("not a valid credentials file: {e}")))?;

    paths.ensure_dirs()?;
    let pretty = serde_json::to_string_pretty(&credentials)
        .map_err(|e| CliError::Config(format!("could not serialize credentials: {e}")))?;
    std::fs::write(&paths.credentials_file, pretty)?;
    Ok(())
}
