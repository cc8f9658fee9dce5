//! CLI error types and exit codes.

use taskdown_doc::DocError;
use taskdown_gtasks::ApiError;
use thiserror::Error;

/// Exit codes:
/// - 0: success
/// - 1: general error (including partially failed reconciliations)
/// - 2: credentials missing or rejected
/// - 3: network error
/// - 4: invalid input
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("No credentials for this profile. Run 'taskdown auth <credentials-file>' first.")]
    NotAuthenticated,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Document(#[from] DocError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Editor exited with an error; remote state left untouched.")]
    EditorAborted,

    #[error("Editor '{command}' could not be started: {message}")]
    EditorSpawn { command: String, message: String },

    #[error("No backup found")]
    NoBackup,

    #[error("{failed} operation(s) failed; see the log for details")]
    PartialFailure { failed: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotAuthenticated | Self::Api(ApiError::Auth(_)) => 2,
            Self::Api(ApiError::Http(_)) | Self::Api(ApiError::RateLimited { .. }) => 3,
            Self::Validation(_) | Self::Document(_) => 4,
            _ => 1,
        }
    }

    pub fn print(&self) {
        eprintln!("error: {self}");
    }
}
