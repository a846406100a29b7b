use crate::history::RenameRecord;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Write;
use std::path::PathBuf;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

/// Trait for formatting operation results in different formats
pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => self.format_json(),
            OutputFormat::Summary => self.format_summary(),
        }
    }
    fn format_json(&self) -> String;
    fn format_summary(&self) -> String;
}

/// How a single-file operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Success,
    /// Phase 1 committed but the move into Done failed; the file carries its
    /// canonical name in the wrong folder.
    Partial,
    Failure,
}

/// Result of a single rename or finalize.
#[derive(Debug, Serialize, Deserialize)]
pub struct RenameOutcome {
    pub kind: OutcomeKind,
    pub old: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<PathBuf>,
    pub detail: String,
}

impl RenameOutcome {
    pub fn success(old: PathBuf, new: PathBuf) -> Self {
        let detail = format!("Renamed: {}", new.display());
        Self {
            kind: OutcomeKind::Success,
            old,
            new: Some(new),
            detail,
        }
    }

    pub fn partial(old: PathBuf, renamed_to: PathBuf, detail: String) -> Self {
        Self {
            kind: OutcomeKind::Partial,
            old,
            new: Some(renamed_to),
            detail,
        }
    }

    pub fn failure(old: PathBuf, detail: String) -> Self {
        Self {
            kind: OutcomeKind::Failure,
            old,
            new: None,
            detail,
        }
    }
}

impl OutputFormatter for RenameOutcome {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.kind == OutcomeKind::Success,
            "operation": "rename",
            "kind": self.kind,
            "old": self.old,
            "new": self.new,
            "detail": self.detail,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        match self.kind {
            OutcomeKind::Success => format!("✓ {}\n", self.detail),
            OutcomeKind::Partial => format!("⚠ Partial: {}\n", self.detail),
            OutcomeKind::Failure => format!("✗ {}\n", self.detail),
        }
    }
}

/// Result of a batch rename.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResult {
    pub renamed: usize,
    pub failed: usize,
}

impl OutputFormatter for BatchResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.failed == 0,
            "operation": "batch",
            "renamed": self.renamed,
            "failed": self.failed,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        format!("Batch: {} renamed, {} failed\n", self.renamed, self.failed)
    }
}

/// Result of a single undo or redo.
#[derive(Debug, Serialize, Deserialize)]
pub struct UndoResult {
    pub undone: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_to: Option<PathBuf>,
}

impl OutputFormatter for UndoResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "undo",
            "undone": self.undone,
            "restored_to": self.restored_to,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        match &self.restored_to {
            Some(path) => format!("↩ Restored: {}\n", path.display()),
            None => "Nothing to undo\n".to_string(),
        }
    }
}

/// Result of a redo.
#[derive(Debug, Serialize, Deserialize)]
pub struct RedoResult {
    pub redone: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl OutputFormatter for RedoResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "redo",
            "redone": self.redone,
            "path": self.path,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        match &self.path {
            Some(path) => format!("⟳ Reapplied: {}\n", path.display()),
            None => "Nothing to redo\n".to_string(),
        }
    }
}

/// Result of a bulk undo.
#[derive(Debug, Serialize, Deserialize)]
pub struct UndoAllResult {
    pub restored: usize,
    pub failed: usize,
}

impl OutputFormatter for UndoAllResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": self.failed == 0,
            "operation": "undo_all",
            "restored": self.restored,
            "failed": self.failed,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        format!(
            "↩ Undo all: {} restored, {} failed\n",
            self.restored, self.failed
        )
    }
}

/// A scan listing row: `code | party | file name`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanItem {
    pub code: String,
    pub party: String,
    pub name: String,
    pub path: PathBuf,
}

/// Result of a scan.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResult {
    pub finalized_mode: bool,
    pub files: Vec<ScanItem>,
}

impl OutputFormatter for ScanResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "scan",
            "finalized_mode": self.finalized_mode,
            "count": self.files.len(),
            "files": self.files,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        let mut output = String::new();
        let mode = if self.finalized_mode {
            "Finalize mode"
        } else {
            "New files"
        };
        writeln!(output, "{}: {} files", mode, self.files.len()).unwrap();
        for item in &self.files {
            writeln!(output, "{} | {} | {}", item.code, item.party, item.name).unwrap();
        }
        output
    }
}

/// Result of a history listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResult {
    pub entries: Vec<RenameRecord>,
    pub active: usize,
}

impl OutputFormatter for HistoryResult {
    fn format_json(&self) -> String {
        serde_json::to_string(&json!({
            "success": true,
            "operation": "history",
            "active": self.active,
            "entries": self.entries,
        }))
        .unwrap_or_default()
    }

    fn format_summary(&self) -> String {
        if self.entries.is_empty() {
            return "No renames recorded in this session\n".to_string();
        }

        use comfy_table::{Cell, Color, Table};

        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("#").fg(Color::Cyan),
            Cell::new("Date").fg(Color::Cyan),
            Cell::new("Original").fg(Color::Cyan),
            Cell::new("New Name").fg(Color::Cyan),
            Cell::new("State").fg(Color::Cyan),
        ]);

        for (i, entry) in self.entries.iter().enumerate() {
            let date = entry
                .timestamp
                .split('T')
                .next()
                .unwrap_or(&entry.timestamp);
            let state = if i < self.active { "active" } else { "undone" };
            table.add_row(vec![
                (i + 1).to_string(),
                date.to_string(),
                entry.old.display().to_string(),
                entry.new.display().to_string(),
                state.to_string(),
            ]);
        }

        format!("{table}\n")
    }
}
