//! Rotating backups of the rendered document.
//!
//! Ten slots (`0.bak.md` … `9.bak.md`) in the profile's cache directory,
//! with a `marker` file recording the most recently written slot. Writing
//! advances the marker; `pop` steps it back so repeated rollbacks walk
//! through history.

use crate::error::CliResult;
use std::path::PathBuf;
use tracing::debug;

const SLOTS: i64 = 10;

pub struct Backup {
    cache_dir: PathBuf,
}

impl Backup {
    #[must_use]
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn marker_path(&self) -> PathBuf {
        self.cache_dir.join("marker")
    }

    fn slot_path(&self, slot: i64) -> PathBuf {
        self.cache_dir.join(format!("{slot}.bak.md"))
    }

    fn read_marker(&self) -> Option<i64> {
        std::fs::read_to_string(self.marker_path())
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    /// Write `text` to the next slot and advance the marker.
    pub fn write(&self, text: &str) -> CliResult<()> {
        std::fs::create_dir_all(&self.cache_dir)?;
        let slot = self.read_marker().map_or(0, |m| m + 1).rem_euclid(SLOTS);
        std::fs::write(self.marker_path(), slot.to_string())?;
        std::fs::write(self.slot_path(slot), text)?;
        debug!(slot, "Wrote backup");
        Ok(())
    }

    /// Step the marker back one slot and return the most recent backup, if
    /// any exists.
    pub fn pop(&self) -> CliResult<Option<PathBuf>> {
        if !self.marker_path().is_file() {
            return Ok(None);
        }
        let slot = self.read_marker().unwrap_or(0).rem_euclid(SLOTS);
        std::fs::write(self.marker_path(), (slot - 1).to_string())?;

        let path = self.slot_path(slot);
        Ok(path.is_file().then_some(path))
    }
}
