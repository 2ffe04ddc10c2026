//! Bootstrapping an index from a content store

use serde::Serialize;
use tracing::{debug, info};
use vfs_fs::{ContentStore, WalkControl};

use crate::{DirDoc, Error, FileDoc, Indexer, Result};

/// What [`build_index_from_store`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Directory documents created
    pub dirs: usize,
    /// File documents created
    pub files: usize,
    /// Store nodes skipped because the index already had their identifier
    pub existing: usize,
}

/// Create a document for every store node the index does not know yet.
///
/// The store is walked in pre-order, so parents are always created before
/// their children. The first failure stops the walk and is returned.
pub fn build_index_from_store<I, S>(index: &I, store: &S) -> Result<SeedReport>
where
    I: Indexer + ?Sized,
    S: ContentStore + ?Sized,
{
    let mut report = SeedReport::default();
    let mut failure: Option<Error> = None;

    store.walk(&mut |node| {
        let outcome = match index.doc_by_id(&node.id) {
            Ok(_) => {
                report.existing += 1;
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                if node.is_dir() {
                    index
                        .create_dir_doc(&DirDoc::from_store_node(node))
                        .map(|()| report.dirs += 1)
                } else {
                    store
                        .checksum(&node.id)
                        .map_err(Error::from)
                        .and_then(|(sum, size)| {
                            index.create_file_doc(&FileDoc::from_store_node(node, sum, size))
                        })
                        .map(|()| report.files += 1)
                }
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                debug!(path = %node.path, "Seeded");
                WalkControl::Continue
            }
            Err(e) => {
                failure = Some(e);
                WalkControl::Stop
            }
        }
    })?;

    if let Some(e) = failure {
        return Err(e);
    }
    info!(
        dirs = report.dirs,
        files = report.files,
        existing = report.existing,
        "Seeded index from store"
    );
    Ok(report)
}
