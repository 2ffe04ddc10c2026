//! Property tests: any drift converges after one repair pass

use proptest::prelude::*;
use vfs_core::{DiscrepancyKind, FsckLog, prune, scan};
use vfs_fs::constants::ROOT_DIR_ID;
use vfs_index::Indexer;
use vfs_test_utils::TestVfs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Both,
    StoreOnly,
    IndexOnly,
}

impl Side {
    fn in_store(self) -> bool {
        self != Side::IndexOnly
    }

    fn in_index(self) -> bool {
        self != Side::StoreOnly
    }
}

#[derive(Debug, Clone, Copy)]
enum FileState {
    Placed(Side),
    ContentDrift,
}

impl FileState {
    fn side(self) -> Side {
        match self {
            FileState::Placed(side) => side,
            FileState::ContentDrift => Side::Both,
        }
    }
}

fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Both), Just(Side::StoreOnly), Just(Side::IndexOnly)]
}

fn file_state() -> impl Strategy<Value = FileState> {
    prop_oneof![side().prop_map(FileState::Placed), Just(FileState::ContentDrift)]
}

/// Directories sit under the root. A file goes under its chosen directory
/// when that directory exists on every side the file needs, else the root.
fn build(dirs: &[Side], files: &[(FileState, usize)]) -> TestVfs {
    let vfs = TestVfs::new();
    for (i, side) in dirs.iter().enumerate() {
        let (id, name) = (format!("d{i}"), format!("dir{i}"));
        match side {
            Side::Both => vfs.both_dir(&id, ROOT_DIR_ID, &name),
            Side::StoreOnly => vfs.store_only_dir(&id, ROOT_DIR_ID, &name),
            Side::IndexOnly => vfs.index_only_dir(&id, ROOT_DIR_ID, &name),
        }
    }
    for (i, (state, parent)) in files.iter().enumerate() {
        let side = state.side();
        let dir_id = match dirs.get(*parent) {
            Some(dir)
                if (!side.in_store() || dir.in_store()) && (!side.in_index() || dir.in_index()) =>
            {
                format!("d{parent}")
            }
            _ => ROOT_DIR_ID.to_string(),
        };
        let (id, name, sum) = (format!("f{i}"), format!("file{i}"), format!("sum{i}"));
        match state {
            FileState::Placed(Side::Both) => vfs.both_file(&id, &dir_id, &name, &sum),
            FileState::Placed(Side::StoreOnly) => vfs.store_only_file(&id, &dir_id, &name, &sum),
            FileState::Placed(Side::IndexOnly) => vfs.index_only_file(&id, &dir_id, &name, &sum),
            FileState::ContentDrift => {
                vfs.both_file(&id, &dir_id, &name, &sum);
                vfs.rewrite_in_store(&id, &format!("drift{i}"));
            }
        }
    }
    vfs
}

fn ids(logs: &[FsckLog]) -> Vec<(DiscrepancyKind, String)> {
    logs.iter()
        .map(|l| (l.kind(), l.file_id().to_string()))
        .collect()
}

proptest! {
    #[test]
    fn scan_is_deterministic(
        dirs in prop::collection::vec(side(), 0..4),
        files in prop::collection::vec((file_state(), 0usize..5), 0..10),
    ) {
        let vfs = build(&dirs, &files);
        let first = scan(&vfs.index, &vfs.store).unwrap();
        let second = scan(&vfs.index, &vfs.store).unwrap();
        prop_assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn one_repair_pass_converges(
        dirs in prop::collection::vec(side(), 0..4),
        files in prop::collection::vec((file_state(), 0usize..5), 0..10),
    ) {
        let vfs = build(&dirs, &files);

        let mut first = scan(&vfs.index, &vfs.store).unwrap();
        for log in first.iter_mut() {
            prune(&vfs.index, log, false);
            prop_assert!(log.prune_error.is_none(), "{}: {:?}", log.file_id(), log.prune_error);
        }

        // Only unindexed directories survive a repair pass.
        let mut second = scan(&vfs.index, &vfs.store).unwrap();
        for log in &second {
            prop_assert_eq!(log.kind(), DiscrepancyKind::IndexMissing);
            prop_assert!(!log.is_file());
        }

        let settled = vfs.index.snapshot().unwrap();
        for log in second.iter_mut() {
            prune(&vfs.index, log, false);
        }
        prop_assert_eq!(vfs.index.snapshot().unwrap(), settled);
    }

    #[test]
    fn dry_run_leaves_index_untouched(
        dirs in prop::collection::vec(side(), 0..4),
        files in prop::collection::vec((file_state(), 0usize..5), 0..10),
    ) {
        let vfs = build(&dirs, &files);
        let before = vfs.index.snapshot().unwrap();

        let mut logs = scan(&vfs.index, &vfs.store).unwrap();
        for log in logs.iter_mut() {
            prune(&vfs.index, log, true);
        }

        prop_assert_eq!(vfs.index.snapshot().unwrap(), before);
        let rescan = scan(&vfs.index, &vfs.store).unwrap();
        prop_assert_eq!(ids(&rescan), ids(&logs));
    }
}
