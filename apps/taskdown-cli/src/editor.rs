//! External editor invocation.

use crate::error::{CliError, CliResult};
use std::io::Write;
use std::process::Command;
use tracing::debug;

/// Wraps the user's editor of choice.
pub struct Editor {
    command: String,
}

impl Editor {
    /// Resolve which editor to run: the explicit flag, then `$VISUAL`, then
    /// `$EDITOR`, then `vim`.
    #[must_use]
    pub fn resolve(flag: &str) -> Self {
        let command = if !flag.is_empty() {
            flag.to_string()
        } else if let Ok(visual) = std::env::var("VISUAL") {
            visual
        } else if let Ok(editor) = std::env::var("EDITOR") {
            editor
        } else {
            "vim".to_string()
        };
        Self { command }
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Edit `text` in a temporary markdown file and return the result.
    ///
    /// A non-zero editor exit aborts the whole flow; nothing has touched the
    /// network at that point.
    pub fn edit(&self, text: &str) -> CliResult<String> {
        let mut file = tempfile::Builder::new()
            .prefix("taskdown-")
            .suffix(".md")
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        debug!(command = %self.command, "Launching editor");
        let status = Command::new(&self.command)
            .arg(file.path())
            .status()
            .map_err(|e| CliError::EditorSpawn {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(CliError::EditorAborted);
        }

        Ok(std::fs::read_to_string(file.path())?)
    }
}
