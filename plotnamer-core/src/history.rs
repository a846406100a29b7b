use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A single committed rename, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRecord {
    /// Path the file had before the rename.
    pub old: PathBuf,
    /// Path the file ended up at (inside the Done folder for full renames).
    pub new: PathBuf,
    /// Timestamp when the rename was performed.
    pub timestamp: String,
}

impl RenameRecord {
    pub fn new(old: &Path, new: &Path) -> Self {
        Self {
            old: old.to_path_buf(),
            new: new.to_path_buf(),
            timestamp: chrono::Local::now().to_rfc3339(),
        }
    }
}

/// Linear undo/redo stack over rename records.
///
/// Records live in an append-only arena; `active` counts how many of them are
/// currently applied, so `entries[..active]` is the undoable prefix and
/// `entries[active..]` the redoable tail. Recording a new rename discards the
/// tail (standard branch-truncation semantics).
///
/// The log is session-scoped and in-memory; persistence and export are the
/// caller's concern, which is why the whole structure derives serde.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RenameLog {
    entries: Vec<RenameRecord>,
    active: usize,
}

impl RenameLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed rename, discarding any redoable tail.
    pub fn record(&mut self, old: &Path, new: &Path) {
        self.entries.truncate(self.active);
        self.entries.push(RenameRecord::new(old, new));
        self.active = self.entries.len();
    }

    /// Step the cursor back and return the record that was undone, or `None`
    /// when nothing is left to undo. The record stays available for redo.
    pub fn undo(&mut self) -> Option<&RenameRecord> {
        if self.active == 0 {
            return None;
        }
        self.active -= 1;
        Some(&self.entries[self.active])
    }

    /// Step the cursor forward and return the record to re-apply, or `None`
    /// when nothing has been undone.
    pub fn redo(&mut self) -> Option<&RenameRecord> {
        if self.active == self.entries.len() {
            return None;
        }
        let record = &self.entries[self.active];
        self.active += 1;
        Some(record)
    }

    /// Drop everything; used by undo-all after the stack has been walked back.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.active = 0;
    }

    /// All records, oldest first, including undone ones.
    pub fn entries(&self) -> &[RenameRecord] {
        &self.entries
    }

    /// Number of currently applied (undoable) records.
    pub fn active_len(&self) -> usize {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export the full log as CSV rows for external reporting. Paths can
    /// contain commas (party folders are free-form names), so fields are
    /// quoted when they need it.
    pub fn export_csv<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "Timestamp,Original,New Name")?;
        for record in &self.entries {
            writeln!(
                writer,
                "{},{},{}",
                csv_field(&record.timestamp),
                csv_field(&record.old.display().to_string()),
                csv_field(&record.new.display().to_string())
            )?;
        }
        Ok(())
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
