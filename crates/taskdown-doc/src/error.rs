//! Document conversion errors.

use thiserror::Error;

pub type DocResult<T> = Result<T, DocError>;

#[derive(Debug, Error)]
pub enum DocError {
    /// The document does not follow the expected structure. Surfaced before
    /// any remote call is attempted.
    #[error("malformed task document: {0}")]
    Parse(String),
}

impl DocError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
