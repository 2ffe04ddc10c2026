//! Reconciliation scanner
//!
//! Three read-only passes over one snapshot of the index, in this order:
//!
//! 1. **Index pass**: depth-first from the root document, children by name.
//!    Every document is classified against the store.
//! 2. **Unreachable sweep**: documents whose parent chain never reaches the
//!    root, by identifier.
//! 3. **Store pass**: the store's own pre-order walk finds nodes the index
//!    does not hold.
//!
//! A document only stands for a store node when it is reachable from the
//! root and filed under the node's parent with the node's name, or rehomed
//! under `/Orphans`. Anything else is reported from both sides: the entry as
//! FileMissing and the node as IndexMissing, so repairing the two in order
//! refiles the entry where the store has it.
//!
//! Given unchanged inputs the emitted sequence is always the same.

use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};
use vfs_fs::constants::ROOT_DIR_ID;
use vfs_fs::{ContentStore, LogicalPath, StoreNode, WalkControl, WellKnownDir};
use vfs_index::{DirDoc, FileDoc, IndexData, IndexDoc, Indexer};

use super::log::{Discrepancy, FsckLog};
use crate::{CancellationToken, Error, Result};

/// Walks an index and a store and reports where they disagree.
pub struct Scanner<'a> {
    index: &'a dyn Indexer,
    store: &'a dyn ContentStore,
    cancel: CancellationToken,
}

/// Whether to look below a classified directory.
enum Descend {
    Yes,
    No,
}

/// One index snapshot with the lookups the passes need.
struct IndexView {
    data: IndexData,
    children: HashMap<String, Vec<IndexDoc>>,
    orphans_id: Option<String>,
    /// Documents whose parent chain dangles or loops, ordered by id
    dangling: BTreeSet<String>,
}

impl IndexView {
    fn new(data: IndexData) -> Self {
        let docs = data.all_docs();

        let dangling = {
            let parents: HashMap<&str, &str> =
                docs.iter().map(|d| (d.id(), d.dir_id())).collect();
            docs.iter()
                .filter(|d| !reaches_root(d.id(), &parents))
                .map(|d| d.id().to_string())
                .collect()
        };

        let mut children: HashMap<String, Vec<IndexDoc>> = HashMap::new();
        for doc in docs {
            if doc.id() != ROOT_DIR_ID {
                children.entry(doc.dir_id().to_string()).or_default().push(doc);
            }
        }
        for siblings in children.values_mut() {
            siblings.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
        }

        let orphans_id = data
            .dir_by_path(&LogicalPath::new(WellKnownDir::Orphans.as_str()))
            .ok()
            .filter(|dir| dir.dir_id == ROOT_DIR_ID)
            .map(|dir| dir.id);

        Self {
            data,
            children,
            orphans_id,
            dangling,
        }
    }

    fn children(&self, dir_id: &str) -> &[IndexDoc] {
        self.children.get(dir_id).map(Vec::as_slice).unwrap_or_default()
    }

    fn is_orphans_dir(&self, doc: &IndexDoc) -> bool {
        doc.as_dir().is_some() && self.orphans_id.as_deref() == Some(doc.id())
    }

    /// Whether `doc` is the entry for `node`, type aside.
    fn is_entry_for(&self, doc: &IndexDoc, node: &StoreNode) -> bool {
        if self.dangling.contains(doc.id()) {
            return false;
        }
        if self.orphans_id.as_deref() == Some(doc.dir_id()) {
            return true;
        }
        doc.dir_id() == node.dir_id && doc.name() == node.name
    }

    fn best_effort_path(&self, doc: &IndexDoc) -> LogicalPath {
        match doc {
            IndexDoc::Directory(dir) => dir.fullpath.clone(),
            IndexDoc::File(file) => match self.data.dir_by_id(&file.dir_id) {
                Ok(parent) => parent.fullpath.join(&file.name),
                Err(_) => LogicalPath::root().join(&file.name),
            },
        }
    }
}

impl<'a> Scanner<'a> {
    pub fn new(index: &'a dyn Indexer, store: &'a dyn ContentStore) -> Self {
        Self {
            index,
            store,
            cancel: CancellationToken::default(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Collect every discrepancy.
    pub fn scan(&self) -> Result<Vec<FsckLog>> {
        let mut logs = Vec::new();
        self.scan_each(&mut |log| logs.push(log))?;
        Ok(logs)
    }

    /// Hand each discrepancy to `emit` as soon as it is found.
    ///
    /// The index is read once up front. Read errors from either side end the
    /// scan. On cancellation the records emitted so far stand and
    /// [`Error::Cancelled`] is returned.
    pub fn scan_each(&self, emit: &mut dyn FnMut(FsckLog)) -> Result<()> {
        self.cancel.check()?;
        let view = IndexView::new(self.index.snapshot()?);
        self.index_pass(&view, emit)?;
        self.unreachable_sweep(&view, emit)?;
        self.store_pass(&view, emit)
    }

    fn index_pass(&self, view: &IndexView, emit: &mut dyn FnMut(FsckLog)) -> Result<()> {
        let root = view.data.dir_by_id(ROOT_DIR_ID)?;
        let mut stack: Vec<(&IndexDoc, LogicalPath)> = Vec::new();
        push_children(view, &mut stack, &root);

        let mut visited = 0usize;
        while let Some((doc, path)) = stack.pop() {
            self.cancel.check()?;
            visited += 1;
            let descend = self.classify(view, doc, &path, emit)?;
            if let (Descend::Yes, IndexDoc::Directory(dir)) = (descend, doc) {
                push_children(view, &mut stack, dir);
            }
        }
        debug!(docs = visited, "Index pass complete");
        Ok(())
    }

    /// Documents with a dangling parent chain. Whatever the store holds under
    /// their ids, they are not where the store has them.
    fn unreachable_sweep(&self, view: &IndexView, emit: &mut dyn FnMut(FsckLog)) -> Result<()> {
        for id in &view.dangling {
            self.cancel.check()?;
            let doc = view.data.doc_by_id(id)?;
            let path = view.best_effort_path(&doc);
            debug!(id = %id, path = %path, "Parent chain does not reach the root");
            emit(FsckLog::new(Discrepancy::FileMissing { doc }, path));
        }
        if !view.dangling.is_empty() {
            debug!(docs = view.dangling.len(), "Swept unreachable documents");
        }
        Ok(())
    }

    /// Compare one reachable document with what the store holds under its id.
    fn classify(
        &self,
        view: &IndexView,
        doc: &IndexDoc,
        path: &LogicalPath,
        emit: &mut dyn FnMut(FsckLog),
    ) -> Result<Descend> {
        let Some(node) = self.store.stat(doc.id())? else {
            if view.is_orphans_dir(doc) {
                return Ok(Descend::Yes);
            }
            debug!(id = doc.id(), path = %path, "Missing from store");
            emit(FsckLog::new(
                Discrepancy::FileMissing { doc: doc.clone() },
                path.clone(),
            ));
            return Ok(Descend::Yes);
        };

        if !view.is_entry_for(doc, &node) {
            debug!(id = doc.id(), path = %path, store_path = %node.path, "Filed elsewhere on the store");
            emit(FsckLog::new(
                Discrepancy::FileMissing { doc: doc.clone() },
                path.clone(),
            ));
            return Ok(Descend::Yes);
        }

        match doc {
            IndexDoc::File(_) if node.is_dir() => self.type_mismatch(doc, node, path, emit),
            IndexDoc::Directory(_) if node.is_file() => self.type_mismatch(doc, node, path, emit),
            IndexDoc::File(file) => {
                let (checksum, size) = self.store.checksum(&file.id)?;
                if checksum != file.checksum {
                    debug!(id = %file.id, path = %path, "Checksum differs from store");
                    let at = node.modified.unwrap_or_else(Utc::now);
                    let new = file.with_content(checksum, size, at);
                    emit(FsckLog::new(
                        Discrepancy::ContentMismatch {
                            old: file.clone(),
                            new,
                        },
                        path.clone(),
                    ));
                } else {
                    trace!(id = %file.id, "Consistent");
                }
                Ok(Descend::No)
            }
            IndexDoc::Directory(_) => Ok(Descend::Yes),
        }
    }

    fn type_mismatch(
        &self,
        doc: &IndexDoc,
        node: StoreNode,
        path: &LogicalPath,
        emit: &mut dyn FnMut(FsckLog),
    ) -> Result<Descend> {
        debug!(id = doc.id(), path = %path, "Type differs from store");
        emit(FsckLog::new(
            Discrepancy::TypeMismatch {
                index_doc: doc.clone(),
                store_node: node,
            },
            path.clone(),
        ));
        Ok(Descend::No)
    }

    fn store_pass(&self, view: &IndexView, emit: &mut dyn FnMut(FsckLog)) -> Result<()> {
        let mut failure: Option<Error> = None;
        let mut visited = 0usize;

        self.store.walk(&mut |node| {
            visited += 1;
            match self.visit_store_node(view, node, &mut *emit) {
                Ok(control) => control,
                Err(e) => {
                    failure = Some(e);
                    WalkControl::Stop
                }
            }
        })?;

        if let Some(e) = failure {
            return Err(e);
        }
        debug!(nodes = visited, "Store pass complete");
        Ok(())
    }

    fn visit_store_node(
        &self,
        view: &IndexView,
        node: &StoreNode,
        emit: &mut dyn FnMut(FsckLog),
    ) -> Result<WalkControl> {
        self.cancel.check()?;
        match view.data.doc_by_id(&node.id) {
            Ok(doc) if !view.is_entry_for(&doc, node) => {
                debug!(id = %node.id, path = %node.path, "Indexed elsewhere");
                self.index_missing(node, emit)
            }
            Ok(doc) if doc.is_file() != node.is_file() => {
                // Reported by the index pass.
                Ok(if node.is_dir() {
                    WalkControl::SkipSubtree
                } else {
                    WalkControl::Continue
                })
            }
            Ok(_) => Ok(WalkControl::Continue),
            Err(e) if e.is_not_found() => {
                debug!(id = %node.id, path = %node.path, "Missing from index");
                self.index_missing(node, emit)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn index_missing(
        &self,
        node: &StoreNode,
        emit: &mut dyn FnMut(FsckLog),
    ) -> Result<WalkControl> {
        let doc: IndexDoc = if node.is_dir() {
            DirDoc::from_store_node(node).into()
        } else {
            let (checksum, size) = self.store.checksum(&node.id)?;
            FileDoc::from_store_node(node, checksum, size).into()
        };
        emit(FsckLog::new(
            Discrepancy::IndexMissing { doc },
            node.path.clone(),
        ));
        Ok(WalkControl::Continue)
    }
}

fn push_children<'v>(
    view: &'v IndexView,
    stack: &mut Vec<(&'v IndexDoc, LogicalPath)>,
    dir: &DirDoc,
) {
    stack.extend(view.children(&dir.id).iter().rev().map(|child| {
        let path = dir.fullpath.join(child.name());
        (child, path)
    }));
}

/// Collect every discrepancy between `index` and `store`.
pub fn scan(index: &dyn Indexer, store: &dyn ContentStore) -> Result<Vec<FsckLog>> {
    Scanner::new(index, store).scan()
}

/// Follow parent links from `id`; false when the chain dangles or loops.
fn reaches_root(id: &str, parents: &HashMap<&str, &str>) -> bool {
    let mut current = id;
    for _ in 0..=parents.len() {
        if current == ROOT_DIR_ID {
            return true;
        }
        match parents.get(current) {
            Some(&parent) => current = parent,
            None => return false,
        }
    }
    false
}
