use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions the shop's plotters and proofing workflow produce.
pub const ALLOWED_EXTENSIONS: &[&str] = &["plt", "jpg", "jpeg", "jpe", "jfif"];

/// Name of the per-party subfolder that holds processed files.
pub const DONE_FOLDER: &str = "Done";

/// A file eligible for renaming, captured at scan time. The snapshot goes
/// stale the moment the underlying file moves, so operations re-check
/// existence before acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    /// Name of the containing folder; resolves to a party code for renames.
    pub party: String,
    pub stem: String,
    pub extension: String,
}

impl FileCandidate {
    /// Capture a candidate from a path. Returns `None` for paths without a
    /// usable file name or parent folder.
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?.to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let party = path.parent()?.file_name()?.to_str()?.to_string();
        Some(Self {
            path: path.to_path_buf(),
            party,
            stem,
            extension,
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem, self.extension)
    }
}

fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            let lower = e.to_lowercase();
            ALLOWED_EXTENSIONS.contains(&lower.as_str())
        })
}

fn is_in_done_folder(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|s| s.eq_ignore_ascii_case(DONE_FOLDER))
    })
}

/// Walk `root` and collect candidate files, sorted by lower-cased file name.
///
/// Default mode lists unprocessed files (anything not yet under a `Done`
/// folder). Finalized mode inverts that: only files already inside a `Done`
/// folder that still lack the `[ok]` completion marker, ready for the manual
/// finalize pass.
pub fn scan(root: &Path, show_finalized: bool) -> Result<Vec<FileCandidate>> {
    let mut candidates = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || !has_allowed_extension(path) {
            continue;
        }

        let in_done = is_in_done_folder(path.strip_prefix(root).unwrap_or(path));
        if in_done != show_finalized {
            continue;
        }
        if show_finalized
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains("[ok]"))
        {
            continue;
        }

        if let Some(candidate) = FileCandidate::from_path(path) {
            candidates.push(candidate);
        }
    }

    candidates.sort_by_key(|c| c.file_name().to_lowercase());
    Ok(candidates)
}
