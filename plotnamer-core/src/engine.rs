use crate::compose::{compose_name, finalize_name};
use crate::dimension::extract_dimensions;
use crate::history::{RenameLog, RenameRecord};
use crate::machine::MachineTag;
use crate::party::PartyTable;
use crate::quantity::detect_quantity;
use crate::scan::{FileCandidate, DONE_FOLDER};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Per-file and per-operation failures surfaced by the engine. Batch
/// operations count these and keep going; single-file operations report them
/// to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no party code for folder '{party}'")]
    UnknownParty { party: String },

    #[error("no machine selected")]
    NoMachineSelected,

    #[error("file no longer exists: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("file already carries the [ok] marker: {}", path.display())]
    AlreadyFinalized { path: PathBuf },

    #[error("target name already taken: {}", target.display())]
    TargetExists { target: PathBuf },

    #[error("renamed to '{}' but moving it into Done failed: {source}", renamed_to.display())]
    PartialMove {
        renamed_to: PathBuf,
        source: io::Error,
    },

    #[error("cannot restore '{}': destination is occupied", target.display())]
    UndoConflict { target: PathBuf },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Everything a rename decision depends on, passed explicitly so the engine
/// stays a pure function of its inputs plus the filesystem.
#[derive(Debug, Clone, Copy)]
pub struct RenameContext<'a> {
    pub parties: &'a PartyTable,
    pub keywords: &'a [String],
    pub machine: Option<MachineTag>,
}

impl<'a> RenameContext<'a> {
    /// The machine precondition: operations abort before touching any file
    /// when no machine is selected.
    pub fn machine(&self) -> Result<MachineTag, EngineError> {
        self.machine.ok_or(EngineError::NoMachineSelected)
    }
}

/// Outcome tallies for a best-effort batch rename.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub renamed: usize,
    pub failed: usize,
}

/// Outcome tallies for a bulk undo.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UndoAllSummary {
    pub restored: usize,
    pub failed: usize,
}

/// Append ` (n)` before the extension until the path is free.
fn disambiguate(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = parent.join(format!("{stem} ({counter}){ext}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Compose the canonical name a candidate would receive, without touching the
/// filesystem. Used for previews and by the rename path itself.
pub fn preview_name(
    candidate: &FileCandidate,
    ctx: &RenameContext<'_>,
) -> Result<String, EngineError> {
    let machine = ctx.machine()?;
    let code = ctx
        .parties
        .code(&candidate.party)
        .ok_or_else(|| EngineError::UnknownParty {
            party: candidate.party.clone(),
        })?;

    let dim = extract_dimensions(&candidate.file_name());
    let quantity = detect_quantity(&candidate.stem, ctx.keywords);
    Ok(compose_name(
        &candidate.stem,
        code,
        &candidate.extension,
        dim.as_ref(),
        quantity,
        machine,
    ))
}

/// Rename one file to its canonical name and move it into the sibling Done
/// folder, recording the committed pair in the log.
///
/// Two-phase: (1) collision-checked rename in place, (2) move into Done
/// (created if absent). A phase-2 failure is reported as `PartialMove` and
/// left as-is; retrying phase 2 by hand is the natural recovery, so nothing
/// is rolled back and nothing is logged.
pub fn rename_file(
    path: &Path,
    ctx: &RenameContext<'_>,
    log: &mut RenameLog,
) -> Result<PathBuf, EngineError> {
    ctx.machine()?;
    if !path.exists() {
        return Err(EngineError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let candidate = FileCandidate::from_path(path).ok_or_else(|| EngineError::MissingFile {
        path: path.to_path_buf(),
    })?;

    let new_name = preview_name(&candidate, ctx)?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    // Phase 1: rename in place.
    let staged = disambiguate(parent.join(&new_name));
    fs::rename(path, &staged)?;
    debug!(from = %path.display(), to = %staged.display(), "renamed in place");

    // Phase 2: move into Done.
    let final_path = move_into_done(&staged)?;

    log.record(path, &final_path);
    debug!(path = %final_path.display(), "rename committed");
    Ok(final_path)
}

fn move_into_done(staged: &Path) -> Result<PathBuf, EngineError> {
    let parent = staged.parent().unwrap_or_else(|| Path::new("."));
    let done_dir = parent.join(DONE_FOLDER);

    let partial = |source: io::Error| EngineError::PartialMove {
        renamed_to: staged.to_path_buf(),
        source,
    };

    fs::create_dir_all(&done_dir).map_err(partial)?;
    let file_name = staged
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("unnamed"));
    let final_path = disambiguate(done_dir.join(file_name));
    fs::rename(staged, &final_path).map_err(partial)?;
    Ok(final_path)
}

/// Rename a batch of candidates, one fully committed or failed before the
/// next begins. A missing file is stale scan state and skipped silently;
/// every other per-file failure is counted, logged, and stepped over.
pub fn rename_batch(
    candidates: &[FileCandidate],
    ctx: &RenameContext<'_>,
    log: &mut RenameLog,
) -> Result<BatchSummary, EngineError> {
    ctx.machine()?;

    let mut summary = BatchSummary::default();
    for candidate in candidates {
        match rename_file(&candidate.path, ctx, log) {
            Ok(_) => summary.renamed += 1,
            Err(EngineError::MissingFile { path }) => {
                debug!(path = %path.display(), "candidate vanished, skipping");
            },
            Err(e) => {
                warn!(path = %candidate.path.display(), error = %e, "batch rename failed");
                summary.failed += 1;
            },
        }
    }
    Ok(summary)
}

/// Apply an operator's corrected quantity/category to an already-processed
/// file and mark it `[ok]`. Single-phase: the file already lives in Done, so
/// it is renamed in place. An occupied target is refused, not disambiguated,
/// so the operator sees the clash instead of a silently numbered duplicate.
pub fn finalize_file(
    path: &Path,
    quantity: u32,
    category: &str,
    machine: MachineTag,
    log: &mut RenameLog,
) -> Result<PathBuf, EngineError> {
    if !path.exists() {
        return Err(EngineError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let candidate = FileCandidate::from_path(path).ok_or_else(|| EngineError::MissingFile {
        path: path.to_path_buf(),
    })?;

    let new_name = finalize_name(
        &candidate.stem,
        &candidate.extension,
        quantity,
        category,
        machine,
    )
    .ok_or_else(|| EngineError::AlreadyFinalized {
        path: path.to_path_buf(),
    })?;

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let target = parent.join(&new_name);
    if target.exists() {
        return Err(EngineError::TargetExists { target });
    }

    fs::rename(path, &target)?;
    log.record(path, &target);
    debug!(path = %target.display(), "finalize committed");
    Ok(target)
}

/// Reverse the most recent active record: move the file back from its
/// recorded new path to its recorded old path. Returns `Ok(None)` when
/// there is nothing to undo.
pub fn undo_last(log: &mut RenameLog) -> Result<Option<RenameRecord>, EngineError> {
    let Some(record) = log.undo().cloned() else {
        return Ok(None);
    };
    restore(&record)?;
    Ok(Some(record))
}

fn restore(record: &RenameRecord) -> Result<(), EngineError> {
    if record.old.exists() {
        return Err(EngineError::UndoConflict {
            target: record.old.clone(),
        });
    }
    if let Some(parent) = record.old.parent() {
        fs::create_dir_all(parent).map_err(|_| EngineError::UndoConflict {
            target: record.old.clone(),
        })?;
    }
    fs::rename(&record.new, &record.old)?;
    Ok(())
}

/// Walk the whole stack back, newest active record first, then clear the
/// log. Per-entry failures are logged and skipped so one conflicted file
/// never strands the rest.
pub fn undo_all(log: &mut RenameLog) -> UndoAllSummary {
    let mut summary = UndoAllSummary::default();
    while let Some(record) = log.undo().cloned() {
        match restore(&record) {
            Ok(()) => summary.restored += 1,
            Err(e) => {
                warn!(
                    old = %record.old.display(),
                    new = %record.new.display(),
                    error = %e,
                    "undo failed, skipping entry"
                );
                summary.failed += 1;
            },
        }
    }
    log.clear();
    summary
}

/// Re-apply the most recently undone record. The original target may have
/// been taken by an unrelated file in the interim, so this re-runs the full
/// two-phase rename (collision check, then move into Done) instead of a raw
/// move to the recorded path. A record whose old and new paths share a parent
/// came from an in-place finalize and is redone in place, without the move.
pub fn redo_last(log: &mut RenameLog) -> Result<Option<PathBuf>, EngineError> {
    let Some(record) = log.redo().cloned() else {
        return Ok(None);
    };
    if !record.old.exists() {
        return Err(EngineError::MissingFile {
            path: record.old.clone(),
        });
    }

    let parent = record.old.parent().unwrap_or_else(|| Path::new("."));
    let file_name = record
        .new
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("unnamed"));

    let staged = disambiguate(parent.join(file_name));
    fs::rename(&record.old, &staged)?;
    if record.new.parent() == record.old.parent() {
        debug!(path = %staged.display(), "redo committed in place");
        return Ok(Some(staged));
    }
    let final_path = move_into_done(&staged)?;
    debug!(path = %final_path.display(), "redo committed");
    Ok(Some(final_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::DEFAULT_KEYWORDS;
    use tempfile::TempDir;

    fn keywords() -> Vec<String> {
        DEFAULT_KEYWORDS.iter().map(ToString::to_string).collect()
    }

    fn table(dir: &TempDir) -> PartyTable {
        let path = dir.path().join("parties.csv");
        fs::write(&path, "Party Name,Code\nCreative,2\nSunrise,3\n").unwrap();
        PartyTable::load(&path).unwrap()
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"plot data").unwrap();
    }

    #[test]
    fn two_phase_rename_lands_in_done() {
        let dir = TempDir::new().unwrap();
        let parties = table(&dir);
        let keywords = keywords();
        let ctx = RenameContext {
            parties: &parties,
            keywords: &keywords,
            machine: Some(MachineTag::Solvent),
        };
        let file = dir.path().join("Creative/banner 24x30 2 copy.plt");
        touch(&file);

        let mut log = RenameLog::new();
        let final_path = rename_file(&file, &ctx, &mut log).unwrap();

        assert_eq!(
            final_path,
            dir.path()
                .join("Creative/Done/2_banner 24x30 2 copy (C.S)(FT.2x3)(Q.2)%%.plt")
        );
        assert!(final_path.exists());
        assert!(!file.exists());
        assert_eq!(log.active_len(), 1);
    }

    #[test]
    fn unknown_party_aborts_that_file() {
        let dir = TempDir::new().unwrap();
        let parties = table(&dir);
        let keywords = keywords();
        let ctx = RenameContext {
            parties: &parties,
            keywords: &keywords,
            machine: Some(MachineTag::Solvent),
        };
        let file = dir.path().join("Stranger/banner.plt");
        touch(&file);

        let mut log = RenameLog::new();
        let err = rename_file(&file, &ctx, &mut log).unwrap_err();
        assert!(matches!(err, EngineError::UnknownParty { party } if party == "Stranger"));
        assert!(file.exists());
        assert!(log.is_empty());
    }

    #[test]
    fn no_machine_aborts_before_touching_files() {
        let dir = TempDir::new().unwrap();
        let parties = table(&dir);
        let keywords = keywords();
        let ctx = RenameContext {
            parties: &parties,
            keywords: &keywords,
            machine: None,
        };
        let file = dir.path().join("Creative/banner.plt");
        touch(&file);

        let mut log = RenameLog::new();
        assert!(matches!(
            rename_file(&file, &ctx, &mut log),
            Err(EngineError::NoMachineSelected)
        ));
        assert!(file.exists());
    }

    #[test]
    fn collision_gets_numeric_disambiguator() {
        let dir = TempDir::new().unwrap();
        let parties = table(&dir);
        let keywords = keywords();
        let ctx = RenameContext {
            parties: &parties,
            keywords: &keywords,
            machine: Some(MachineTag::Solvent),
        };
        let file = dir.path().join("Creative/logo.plt");
        touch(&file);
        // Occupy the composed target so phase 1 has to disambiguate.
        touch(&dir.path().join("Creative/2_logo (C.S)(Q.1)%%.plt"));

        let mut log = RenameLog::new();
        let final_path = rename_file(&file, &ctx, &mut log).unwrap();
        assert_eq!(
            final_path.file_name().unwrap().to_str().unwrap(),
            "2_logo (C.S)(Q.1)%% (1).plt"
        );
    }

    #[test]
    fn batch_counts_unknown_parties_as_failures() {
        let dir = TempDir::new().unwrap();
        let parties = table(&dir);
        let keywords = keywords();
        let ctx = RenameContext {
            parties: &parties,
            keywords: &keywords,
            machine: Some(MachineTag::Eco),
        };
        touch(&dir.path().join("Creative/a.plt"));
        touch(&dir.path().join("Creative/b.plt"));
        touch(&dir.path().join("Nobody/c.plt"));

        let candidates = crate::scan::scan(dir.path(), false).unwrap();
        assert_eq!(candidates.len(), 3);

        let mut log = RenameLog::new();
        let summary = rename_batch(&candidates, &ctx, &mut log).unwrap();
        assert_eq!(summary, BatchSummary { renamed: 2, failed: 1 });
    }

    #[test]
    fn batch_skips_vanished_files_silently() {
        let dir = TempDir::new().unwrap();
        let parties = table(&dir);
        let keywords = keywords();
        let ctx = RenameContext {
            parties: &parties,
            keywords: &keywords,
            machine: Some(MachineTag::Solvent),
        };
        touch(&dir.path().join("Creative/a.plt"));
        let candidates = crate::scan::scan(dir.path(), false).unwrap();
        fs::remove_file(dir.path().join("Creative/a.plt")).unwrap();

        let mut log = RenameLog::new();
        let summary = rename_batch(&candidates, &ctx, &mut log).unwrap();
        assert_eq!(summary, BatchSummary { renamed: 0, failed: 0 });
    }

    #[test]
    fn undo_moves_file_back() {
        let dir = TempDir::new().unwrap();
        let parties = table(&dir);
        let keywords = keywords();
        let ctx = RenameContext {
            parties: &parties,
            keywords: &keywords,
            machine: Some(MachineTag::Solvent),
        };
        let file = dir.path().join("Creative/poster 40x60.plt");
        touch(&file);

        let mut log = RenameLog::new();
        let renamed = rename_file(&file, &ctx, &mut log).unwrap();
        assert!(!file.exists());

        let record = undo_last(&mut log).unwrap().unwrap();
        assert_eq!(record.old, file);
        assert!(file.exists());
        assert!(!renamed.exists());
    }

    #[test]
    fn undo_conflict_when_old_path_is_occupied() {
        let dir = TempDir::new().unwrap();
        let parties = table(&dir);
        let keywords = keywords();
        let ctx = RenameContext {
            parties: &parties,
            keywords: &keywords,
            machine: Some(MachineTag::Solvent),
        };
        let file = dir.path().join("Creative/poster.plt");
        touch(&file);

        let mut log = RenameLog::new();
        rename_file(&file, &ctx, &mut log).unwrap();
        // An unrelated file takes the original path.
        touch(&file);

        let err = undo_last(&mut log).unwrap_err();
        assert!(matches!(err, EngineError::UndoConflict { .. }));
    }

    #[test]
    fn redo_reapplies_with_fresh_two_phase_rename() {
        let dir = TempDir::new().unwrap();
        let parties = table(&dir);
        let keywords = keywords();
        let ctx = RenameContext {
            parties: &parties,
            keywords: &keywords,
            machine: Some(MachineTag::Solvent),
        };
        let file = dir.path().join("Creative/poster.plt");
        touch(&file);

        let mut log = RenameLog::new();
        let renamed = rename_file(&file, &ctx, &mut log).unwrap();
        undo_last(&mut log).unwrap();
        assert!(file.exists());

        let redone = redo_last(&mut log).unwrap().unwrap();
        assert_eq!(redone, renamed);
        assert!(redone.exists());
        assert!(!file.exists());

        // Nothing further to redo.
        assert!(redo_last(&mut log).unwrap().is_none());
    }

    #[test]
    fn undo_all_restores_everything_and_clears() {
        let dir = TempDir::new().unwrap();
        let parties = table(&dir);
        let keywords = keywords();
        let ctx = RenameContext {
            parties: &parties,
            keywords: &keywords,
            machine: Some(MachineTag::Solvent),
        };
        let a = dir.path().join("Creative/a.plt");
        let b = dir.path().join("Sunrise/b 30x40.plt");
        touch(&a);
        touch(&b);

        let mut log = RenameLog::new();
        rename_file(&a, &ctx, &mut log).unwrap();
        rename_file(&b, &ctx, &mut log).unwrap();

        let summary = undo_all(&mut log);
        assert_eq!(summary, UndoAllSummary { restored: 2, failed: 0 });
        assert!(a.exists());
        assert!(b.exists());
        assert!(log.is_empty());
    }

    #[test]
    fn finalize_renames_in_place_and_marks_ok() {
        let dir = TempDir::new().unwrap();
        let file = dir
            .path()
            .join("Creative/Done/2_banner (C.S)(FT.2x3)(Q.2)%%.plt");
        touch(&file);

        let mut log = RenameLog::new();
        let target = finalize_file(&file, 3, "A", MachineTag::Solvent, &mut log).unwrap();
        assert_eq!(
            target.file_name().unwrap().to_str().unwrap(),
            "2_banner (C.S)[ok](FT.2x3)(Q.3)%A%.plt"
        );
        assert!(target.exists());
        assert_eq!(log.active_len(), 1);

        // A second finalize attempt on the result is refused.
        let err = finalize_file(&target, 4, "B", MachineTag::Solvent, &mut log).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyFinalized { .. }));
    }

    #[test]
    fn failed_move_into_done_is_partial_and_unlogged() {
        let dir = TempDir::new().unwrap();
        let parties = table(&dir);
        let keywords = keywords();
        let ctx = RenameContext {
            parties: &parties,
            keywords: &keywords,
            machine: Some(MachineTag::Solvent),
        };
        let file = dir.path().join("Creative/banner.plt");
        touch(&file);
        // A regular file squatting on the Done name blocks phase 2.
        fs::write(dir.path().join("Creative/Done"), b"not a folder").unwrap();

        let mut log = RenameLog::new();
        let err = rename_file(&file, &ctx, &mut log).unwrap_err();
        let EngineError::PartialMove { renamed_to, .. } = err else {
            panic!("expected PartialMove, got {err:?}");
        };
        assert_eq!(
            renamed_to,
            dir.path().join("Creative/2_banner (C.S)(Q.1)%%.plt")
        );
        // Phase 1 stands: the file carries its canonical name in place.
        assert!(renamed_to.exists());
        assert!(!file.exists());
        assert!(log.is_empty());
    }

    #[test]
    fn redo_of_a_finalize_stays_in_place() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("Creative/Done/2_banner (C.S)(Q.2)%%.plt");
        touch(&file);

        let mut log = RenameLog::new();
        let target = finalize_file(&file, 3, "A", MachineTag::Solvent, &mut log).unwrap();
        undo_last(&mut log).unwrap();
        assert!(file.exists());

        let redone = redo_last(&mut log).unwrap().unwrap();
        assert_eq!(redone, target);
        assert!(redone.exists());
        assert!(!dir.path().join("Creative/Done/Done").exists());

        // The record still matches the tree, so it can be undone again.
        undo_last(&mut log).unwrap();
        assert!(file.exists());
    }

    #[test]
    fn undo_after_finalize_reverts_the_finalize_text() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("Creative/Done/2_banner (C.S)(Q.2)%%.plt");
        touch(&file);

        let mut log = RenameLog::new();
        finalize_file(&file, 5, "", MachineTag::Solvent, &mut log).unwrap();
        undo_last(&mut log).unwrap();
        assert!(file.exists());
    }
}
