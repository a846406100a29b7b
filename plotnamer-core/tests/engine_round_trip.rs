//! Full-session exercise of the rename engine against a real directory tree:
//! scan, batch rename, undo/redo cursor movement, and bulk undo.

use plotnamer_core::{
    rename_batch, rename_file, scan, undo_all, undo_last, MachineTag, PartyTable, RenameContext,
    RenameLog,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"data").unwrap();
}

fn setup(dir: &TempDir) -> PartyTable {
    let csv = dir.path().join("parties.csv");
    fs::write(&csv, "Party Name,Code\nCreative,2\nSunrise,3\n").unwrap();
    PartyTable::load(&csv).unwrap()
}

fn keywords() -> Vec<String> {
    plotnamer_core::DEFAULT_KEYWORDS
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn scan_batch_and_bulk_undo_restore_the_tree() {
    let dir = TempDir::new().unwrap();
    let parties = setup(&dir);
    let keywords = keywords();
    let ctx = RenameContext {
        parties: &parties,
        keywords: &keywords,
        machine: Some(MachineTag::Solvent),
    };

    let originals = [
        dir.path().join("Creative/banner 24x30 2 copy.plt"),
        dir.path().join("Creative/card.jpg"),
        dir.path().join("Sunrise/poster 40 x 60.plt"),
        dir.path().join("Mystery/orphan.plt"),
    ];
    for path in &originals {
        touch(path);
    }

    let candidates = scan(dir.path(), false).unwrap();
    assert_eq!(candidates.len(), 4);

    let mut log = RenameLog::new();
    let summary = rename_batch(&candidates, &ctx, &mut log).unwrap();
    assert_eq!(summary.renamed, 3);
    assert_eq!(summary.failed, 1); // Mystery has no party code

    // Renamed files sit in per-party Done folders; the unknown one stayed put.
    assert!(dir
        .path()
        .join("Creative/Done/2_banner 24x30 2 copy (C.S)(FT.2x3)(Q.2)%%.plt")
        .exists());
    assert!(dir.path().join("Mystery/orphan.plt").exists());

    // A fresh scan sees only the unprocessed leftover.
    let remaining = scan(dir.path(), false).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].party, "Mystery");

    let restored = undo_all(&mut log);
    assert_eq!(restored.restored, 3);
    assert_eq!(restored.failed, 0);
    for path in &originals {
        assert!(path.exists(), "missing after undo-all: {}", path.display());
    }
    assert!(log.is_empty());
}

#[test]
fn undo_then_new_rename_discards_redo_branch() {
    let dir = TempDir::new().unwrap();
    let parties = setup(&dir);
    let keywords = keywords();
    let ctx = RenameContext {
        parties: &parties,
        keywords: &keywords,
        machine: Some(MachineTag::Eco),
    };

    let first = dir.path().join("Creative/first.plt");
    let second = dir.path().join("Creative/second.plt");
    touch(&first);
    touch(&second);

    let mut log = RenameLog::new();
    rename_file(&first, &ctx, &mut log).unwrap();
    undo_last(&mut log).unwrap();
    assert!(first.exists());

    // Recording a new rename while the first is undone truncates the branch.
    rename_file(&second, &ctx, &mut log).unwrap();
    assert_eq!(log.entries().len(), 1);
    assert_eq!(log.entries()[0].old, second);
}
