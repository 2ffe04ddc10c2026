//! Repair policy
//!
//! [`prune`] applies at most one index mutation per record and writes the
//! outcome onto the record instead of returning it. The store is never
//! touched.

use tracing::{debug, warn};
use vfs_fs::{LogicalPath, WellKnownDir};
use vfs_index::{FileDoc, IndexDoc, Indexer};

use super::log::{Discrepancy, FsckLog};

pub const ACTION_REMOVE_ENTRY: &str = "remove the stale index entry";
pub const ACTION_CREATE_ORPHAN: &str = "create entry in orphan directory";
pub const ACTION_CREATE_IN_PLACE: &str = "create entry in place";
pub const ACTION_UPDATE_CONTENT: &str = "update index metadata to match stored content";

/// Where a file missing from the index will be recreated.
enum Placement {
    InPlace,
    Orphaned,
}

/// Try to fix one record against the index.
///
/// With `dry_run` the action is recorded but nothing is written. Any failure
/// lands in `log.prune_error`; this never fails itself.
pub fn prune(index: &dyn Indexer, log: &mut FsckLog, dry_run: bool) {
    let result = match &mut log.discrepancy {
        Discrepancy::FileMissing { doc } => {
            log.prune_action = ACTION_REMOVE_ENTRY.to_string();
            if dry_run {
                Ok(())
            } else {
                match doc {
                    IndexDoc::File(file) => index.delete_file_doc(file),
                    IndexDoc::Directory(dir) => index.delete_dir_doc(dir),
                }
            }
        }
        Discrepancy::IndexMissing {
            doc: IndexDoc::File(file),
        } => recreate_file(index, file, &mut log.prune_action, dry_run),
        // Directories are reported only.
        Discrepancy::IndexMissing {
            doc: IndexDoc::Directory(_),
        } => Ok(()),
        // Never guessed at: either side could be right.
        Discrepancy::TypeMismatch { .. } => Ok(()),
        Discrepancy::ContentMismatch { old, new } => {
            log.prune_action = ACTION_UPDATE_CONTENT.to_string();
            if dry_run {
                Ok(())
            } else {
                index.update_file_doc(old, new)
            }
        }
    };

    match result {
        Ok(()) if log.has_action() => {
            debug!(
                id = log.file_id(),
                path = %log.filename,
                action = %log.prune_action,
                dry_run,
                "Repaired"
            );
        }
        Ok(()) => {}
        Err(e) => {
            warn!(
                id = log.file_id(),
                path = %log.filename,
                action = %log.prune_action,
                error = %e,
                "Repair failed"
            );
            log.prune_error = Some(e);
        }
    }
}

fn recreate_file(
    index: &dyn Indexer,
    file: &mut FileDoc,
    action: &mut String,
    dry_run: bool,
) -> vfs_index::Result<()> {
    let placement = placement_for(index, file)?;
    *action = match placement {
        Placement::Orphaned => ACTION_CREATE_ORPHAN,
        Placement::InPlace => ACTION_CREATE_IN_PLACE,
    }
    .to_string();
    if dry_run {
        return Ok(());
    }

    if let Placement::Orphaned = placement {
        let orphans = index.ensure_dir(&LogicalPath::new(WellKnownDir::Orphans.as_str()))?;
        file.dir_id = orphans.id;
    }
    index.create_file_doc(file)
}

fn placement_for(index: &dyn Indexer, file: &FileDoc) -> vfs_index::Result<Placement> {
    if file.dir_id.is_empty() {
        return Ok(Placement::Orphaned);
    }
    let parent = match index.dir_by_id(&file.dir_id) {
        Ok(parent) => parent,
        Err(e) if e.is_not_found() => return Ok(Placement::Orphaned),
        Err(e) => return Err(e),
    };
    match index.file_by_path(&parent.fullpath.join(&file.name)) {
        Ok(_) => Ok(Placement::InPlace),
        Err(e) if e.is_not_found() => Ok(Placement::InPlace),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vfs_fs::constants::ROOT_DIR_ID;
    use vfs_index::{DirDoc, MemoryIndex};

    fn missing_from_index(file: FileDoc) -> FsckLog {
        let path = LogicalPath::new(format!("/{}", file.name));
        FsckLog::new(Discrepancy::IndexMissing { doc: file.into() }, path)
    }

    #[test]
    fn index_missing_with_known_parent_goes_in_place() {
        let index = MemoryIndex::new();
        let mut log = missing_from_index(FileDoc::new("f1", ROOT_DIR_ID, "a.txt", "x", 1));

        prune(&index, &mut log, false);

        assert_eq!(log.prune_action, ACTION_CREATE_IN_PLACE);
        assert!(log.prune_error.is_none());
        let stored = index.doc_by_id("f1").unwrap();
        assert_eq!(stored.dir_id(), ROOT_DIR_ID);
    }

    #[test]
    fn index_missing_without_parent_goes_to_orphans() {
        let index = MemoryIndex::new();
        let mut log = missing_from_index(FileDoc::new("f1", "", "a.txt", "x", 1));

        prune(&index, &mut log, false);

        assert_eq!(log.prune_action, ACTION_CREATE_ORPHAN);
        let orphans = index.dir_by_path(&LogicalPath::new("/Orphans")).unwrap();
        assert_eq!(index.doc_by_id("f1").unwrap().dir_id(), orphans.id);
    }

    #[test]
    fn dry_run_records_action_without_writing() {
        let index = MemoryIndex::new();
        let mut log = missing_from_index(FileDoc::new("f1", "gone", "a.txt", "x", 1));

        prune(&index, &mut log, true);

        assert_eq!(log.prune_action, ACTION_CREATE_ORPHAN);
        assert!(index.doc_by_id("f1").unwrap_err().is_not_found());
        assert!(
            index
                .dir_by_path(&LogicalPath::new("/Orphans"))
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn index_missing_directory_is_left_alone() {
        let index = MemoryIndex::new();
        let dir = DirDoc::new("d1", &DirDoc::root(), "photos");
        let mut log = FsckLog::new(
            Discrepancy::IndexMissing { doc: dir.into() },
            LogicalPath::new("/photos"),
        );

        prune(&index, &mut log, false);

        assert!(!log.has_action());
        assert!(log.prune_error.is_none());
        assert!(index.doc_by_id("d1").unwrap_err().is_not_found());
    }

    #[test]
    fn stale_revision_is_recorded_as_conflict() {
        let index = MemoryIndex::new();
        let current = FileDoc::new("doc1", ROOT_DIR_ID, "a", "a1b2", 4);
        index.create_file_doc(&current).unwrap();

        let stale = current.with_content("0000", 4, current.updated_at);
        let new = current.with_content("c3d4", 4, current.updated_at);
        let mut log = FsckLog::new(
            Discrepancy::ContentMismatch { old: stale, new },
            LogicalPath::new("/a"),
        );

        prune(&index, &mut log, false);

        assert_eq!(log.prune_action, ACTION_UPDATE_CONTENT);
        assert!(matches!(
            log.prune_error,
            Some(vfs_index::Error::Conflict { .. })
        ));
        let stored = index.doc_by_id("doc1").unwrap();
        assert_eq!(stored.as_file().unwrap().checksum, "a1b2");
    }
}
