//! End-to-end scenarios across store, index and checker
//!
//! Each test sets up drift the way real interrupted operations leave it and
//! checks that the checker converges.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Barrier;
use std::thread;
use vfs_core::{DiscrepancyKind, Fsck, FsckConfig, FsckOptions, FsckReport, FsckStatus, scan};
use vfs_fs::{LocalStore, LogicalPath};
use vfs_index::{FileIndex, Indexer};
use vfs_test_utils::TestTree;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn fixture(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures")
        .join(rel)
}

fn summary(report: &FsckReport) -> Vec<(DiscrepancyKind, String)> {
    report
        .logs
        .iter()
        .map(|l| (l.kind(), l.filename.to_string()))
        .collect()
}

fn repair_options() -> FsckOptions {
    FsckOptions {
        repair: true,
        ..FsckOptions::default()
    }
}

/// Store contents matching `interrupted.json` after a handful of
/// operations died halfway.
fn interrupted_tree() -> TestTree {
    let tree = TestTree::new();
    tree.write("photos/a.jpg", "alpha");
    tree.write("notes.txt", "new notes");
    tree.write("inbox/b.txt", "b");
    fs::copy(fixture("indexes/interrupted.json"), tree.index_path()).unwrap();
    tree
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn stored_index_fixture_converges() {
    let tree = interrupted_tree();
    let index = tree.open_index();
    let store = tree.store();

    let report = Fsck::new(&index, &store, repair_options()).run().unwrap();
    assert_eq!(
        summary(&report),
        vec![
            (DiscrepancyKind::ContentMismatch, "/notes.txt".to_string()),
            (DiscrepancyKind::FileMissing, "/photos/gone.jpg".to_string()),
            (DiscrepancyKind::IndexMissing, "/inbox".to_string()),
            (DiscrepancyKind::IndexMissing, "/inbox/b.txt".to_string()),
        ]
    );
    assert_eq!(report.counts.repaired, 3);
    assert_eq!(report.counts.failed, 0);
    assert_eq!(report.status, FsckStatus::Degraded);

    // Untouched documents keep their backlinks.
    let a = index
        .file_by_path(&LogicalPath::new("/photos/a.jpg"))
        .unwrap();
    assert_eq!(a.referenced_by.len(), 1);

    let notes = index.file_by_path(&LogicalPath::new("/notes.txt")).unwrap();
    assert_eq!(notes.size, "new notes".len() as u64);

    let orphan = index.doc_by_id("/inbox/b.txt").unwrap();
    let orphans = index.dir_by_path(&LogicalPath::new("/Orphans")).unwrap();
    assert_eq!(orphan.dir_id(), orphans.id);

    let again = Fsck::new(&index, &store, repair_options()).run().unwrap();
    assert_eq!(
        summary(&again),
        vec![(DiscrepancyKind::IndexMissing, "/inbox".to_string())]
    );
    assert_eq!(again.counts.repaired, 0);
}

#[test]
fn report_json_matches_record_schema() {
    let tree = interrupted_tree();
    let index = tree.open_index();
    let store = tree.store();

    let report = Fsck::new(&index, &store, repair_options()).run().unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let first = &json["logs"][0];
    assert_eq!(first["filename"], "/notes.txt");
    assert_eq!(first["file_id"], "/notes.txt");
    assert_eq!(
        first["prune_action"],
        "update index metadata to match stored content"
    );
    assert!(first.get("prune_error").is_none());

    let dir = &json["logs"][2];
    assert_eq!(dir["file_id"], "/inbox");
    assert!(dir.get("prune_action").is_none());
    assert_eq!(json["counts"]["index_missing"], 2);
}

#[test]
fn sample_config_drives_a_run() {
    let tree = interrupted_tree();
    let config_path = tree.root().join("vfsck.toml");
    fs::copy(fixture("vfsck.toml"), &config_path).unwrap();

    let config = FsckConfig::load(&config_path).unwrap();
    let (store_root, index_path) = config.require_paths().unwrap();
    assert_eq!(store_root, tree.store_root());
    assert_eq!(index_path, tree.index_path());

    let store = LocalStore::open(store_root).unwrap();
    let index = FileIndex::open(index_path).unwrap();
    let report = Fsck::new(&index, &store, config.options()).run().unwrap();
    assert_eq!(report.counts.repaired, 3);
}

#[test]
fn racing_checkers_leave_a_consistent_index() {
    const CHECKERS: usize = 3;
    let tree = interrupted_tree();
    let barrier = Barrier::new(CHECKERS);

    let reports: Vec<FsckReport> = thread::scope(|s| {
        let handles: Vec<_> = (0..CHECKERS)
            .map(|_| {
                let tree = &tree;
                let barrier = &barrier;
                s.spawn(move || {
                    let index = tree.open_index();
                    let store = tree.store();
                    barrier.wait();
                    Fsck::new(&index, &store, repair_options()).run().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Losers of each race record an error instead of overwriting.
    for report in &reports {
        for log in report.failures() {
            let err = log.prune_error.as_ref().unwrap();
            assert!(
                matches!(
                    err,
                    vfs_index::Error::Conflict { .. }
                        | vfs_index::Error::NotFound { .. }
                        | vfs_index::Error::AlreadyExists { .. }
                ),
                "unexpected repair error: {err}"
            );
        }
    }

    let index = tree.open_index();
    let orphan_dirs = index
        .snapshot()
        .unwrap()
        .children(vfs_fs::constants::ROOT_DIR_ID)
        .unwrap()
        .into_iter()
        .filter(|d| d.name() == "Orphans")
        .count();
    assert_eq!(orphan_dirs, 1);

    let rescan = scan(&index, &tree.store()).unwrap();
    let kinds: Vec<_> = rescan.iter().map(|l| (l.kind(), l.file_id().to_string())).collect();
    assert_eq!(kinds, vec![(DiscrepancyKind::IndexMissing, "/inbox".to_string())]);
}
