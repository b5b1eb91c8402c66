use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use filetime::FileTime;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Copy,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Transferred,
    SkippedExisting,
}

/// Copies or moves one file to its planned destination. Each transfer is
/// atomic per file: the destination either appears complete or not at all,
/// and re-running over the same pool skips what already landed.
pub struct Mover {
    mode: TransferMode,
    dry_run: bool,
}

impl Mover {
    pub fn new(mode: TransferMode, dry_run: bool) -> Self {
        Self { mode, dry_run }
    }

    pub fn transfer(&self, source: &Path, dest: &Path) -> Result<TransferOutcome> {
        if dest.exists() {
            debug!("destination already exists, skipping {}", dest.display());
            return Ok(TransferOutcome::SkippedExisting);
        }

        let verb = match self.mode {
            TransferMode::Copy => "copy",
            TransferMode::Move => "move",
        };
        if self.dry_run {
            println!("Would {verb} {} to {}", source.display(), dest.display());
            return Ok(TransferOutcome::Transferred);
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::copy(source, dest)
            .with_context(|| format!("failed to {verb} {} to {}", source.display(), dest.display()))?;

        // fs::copy keeps permissions but not timestamps; carry the source
        // mtime over so the library reflects capture-era dates.
        if let Ok(meta) = fs::metadata(source) {
            let mtime = FileTime::from_last_modification_time(&meta);
            if let Err(err) = filetime::set_file_mtime(dest, mtime) {
                debug!("could not preserve mtime on {}: {err}", dest.display());
            }
        }

        if self.mode == TransferMode::Move {
            fs::remove_file(source)
                .with_context(|| format!("removing moved source {}", source.display()))?;
        }
        Ok(TransferOutcome::Transferred)
    }
}
