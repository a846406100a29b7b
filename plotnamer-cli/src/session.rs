//! Persistence of the per-session rename log. The core keeps the log in
//! memory; a one-shot CLI needs it carried between invocations, so it is
//! stored under `.plotnamer/session.json` and loaded before and saved after
//! every command that touches it.

use anyhow::{Context, Result};
use plotnamer_core::RenameLog;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

fn session_path(plotnamer_dir: &Path) -> PathBuf {
    plotnamer_dir.join("session.json")
}

/// Load the session log, or an empty one when none has been written yet.
pub fn load_log(plotnamer_dir: &Path) -> Result<RenameLog> {
    let path = session_path(plotnamer_dir);
    if !path.exists() {
        return Ok(RenameLog::new());
    }
    let file = File::open(&path)
        .with_context(|| format!("Failed to open session log: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse session log: {}", path.display()))
}

/// Save the session log, creating `.plotnamer/` on demand.
pub fn save_log(plotnamer_dir: &Path, log: &RenameLog) -> Result<()> {
    fs::create_dir_all(plotnamer_dir)?;
    let path = session_path(plotnamer_dir);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .with_context(|| format!("Failed to create session log: {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, log)
        .with_context(|| format!("Failed to write session log: {}", path.display()))?;
    Ok(())
}
