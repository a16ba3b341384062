use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use snafu::prelude::*;
use tracing::{debug, info};

use crate::directory::{DirectoryNode, DirectorySid};
use crate::transport::{DirectoryClient, HttpTransport};
use crate::tree::error::{
    CreateSnafu, DeleteSnafu, EmptyNameSnafu, NoPendingEditSnafu, OperationInFlightSnafu,
    RefreshSnafu, RenameSnafu, RootNotDeletableSnafu, UnknownNodeSnafu,
};
use crate::tree::{DirectoryTree, EditKind, EditOutcome, PendingEdit, TreeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    /// Empty or identical name, nothing was sent
    Unchanged,
}

/// Keeps the displayed tree in step with the store.
///
/// Every mutation is sent to the store first and applied to the tree only once
/// the store confirms it. Operations on different nodes may be in flight at
/// the same time. A node with an operation in flight refuses a second one.
/// When a confirmation arrives for a node that has left the tree in the
/// meantime, it is dropped.
///
/// No `RefCell` borrow is held across an `.await`.
pub struct TreeEngine<T> {
    client: Rc<DirectoryClient<T>>,
    tree: RefCell<DirectoryTree>,
    edits: RefCell<HashMap<DirectorySid, PendingEdit>>,
    in_flight: RefCell<HashSet<DirectorySid>>,
}

impl<T: HttpTransport> TreeEngine<T> {
    pub fn new(client: Rc<DirectoryClient<T>>, root: DirectoryNode) -> Self {
        Self {
            client,
            tree: RefCell::new(DirectoryTree::new(root)),
            edits: RefCell::new(HashMap::new()),
            in_flight: RefCell::new(HashSet::new()),
        }
    }

    /// Borrow of the current tree. Drop it before awaiting any operation.
    pub fn tree(&self) -> Ref<'_, DirectoryTree> {
        self.tree.borrow()
    }

    pub fn snapshot(&self) -> DirectoryNode {
        self.tree.borrow().root().clone()
    }

    pub fn is_busy(&self, sid: DirectorySid) -> bool {
        self.in_flight.borrow().contains(&sid)
    }

    /// Creates `name` under `parent` and appends the store's node once.
    pub async fn create_child(
        &self,
        parent: DirectorySid,
        name: &str,
    ) -> Result<DirectorySid, TreeError> {
        ensure!(!name.trim().is_empty(), EmptyNameSnafu);
        self.ensure_present(parent)?;
        let _operation = self.start_operation(parent)?;

        debug!("Creating directory '{}' under {}", name, parent);
        let created = self
            .client
            .create_directory(name, Some(parent))
            .await
            .context(CreateSnafu { name })?;
        let sid = created.sid;

        match self.tree.borrow_mut().append_child(parent, created) {
            Ok(()) => info!("Created directory {} '{}' under {}", sid, name, parent),
            Err(e) => debug!("Discarding created directory {}: {}", sid, e),
        }
        Ok(sid)
    }

    /// Renames `sid` once the store confirms. An empty or identical name
    /// sends nothing.
    pub async fn rename(&self, sid: DirectorySid, name: &str) -> Result<RenameOutcome, TreeError> {
        let current = self
            .tree
            .borrow()
            .get(sid)
            .map(|node| node.name.clone())
            .context(UnknownNodeSnafu { sid })?;
        if name.trim().is_empty() || name == current {
            debug!("Skipping rename of {}: name unchanged or empty", sid);
            return Ok(RenameOutcome::Unchanged);
        }
        let _operation = self.start_operation(sid)?;

        debug!("Renaming directory {} to '{}'", sid, name);
        let renamed = self
            .client
            .rename_directory(sid, name)
            .await
            .context(RenameSnafu { sid })?;

        match self.tree.borrow_mut().rename(sid, renamed.name) {
            Some(previous) => info!("Renamed directory {} from '{}'", sid, previous),
            None => debug!("Discarding rename of {}: no longer displayed", sid),
        }
        Ok(RenameOutcome::Renamed)
    }

    /// Deletes `sid` and drops its cached subtree once the store confirms.
    pub async fn delete(&self, sid: DirectorySid) -> Result<(), TreeError> {
        {
            let tree = self.tree.borrow();
            ensure!(sid != tree.root_sid(), RootNotDeletableSnafu { sid });
            ensure!(tree.contains(sid), UnknownNodeSnafu { sid });
        }
        let _operation = self.start_operation(sid)?;

        debug!("Deleting directory {}", sid);
        self.client
            .delete_directory(sid)
            .await
            .context(DeleteSnafu { sid })?;

        let removed = self.tree.borrow_mut().remove(sid);
        match removed {
            Some(removed) => {
                let mut gone = Vec::new();
                collect_sids(&removed, &mut gone);
                self.edits.borrow_mut().retain(|sid, _| !gone.contains(sid));
                info!("Deleted directory {} ({} nodes)", sid, gone.len());
            }
            None => debug!("Discarding delete of {}: no longer displayed", sid),
        }
        Ok(())
    }

    /// Refetches the root and replaces the cached tree with the store's view.
    pub async fn refresh(&self) -> Result<(), TreeError> {
        let root_sid = self.tree.borrow().root_sid();
        let root = self
            .client
            .get_directory(root_sid)
            .await
            .context(RefreshSnafu { sid: root_sid })?;

        let mut tree = self.tree.borrow_mut();
        tree.replace(root);
        self.edits.borrow_mut().retain(|sid, _| tree.contains(*sid));
        info!("Refreshed tree from directory {} ({} nodes)", root_sid, tree.node_count());
        Ok(())
    }

    pub fn pending_edit(&self, sid: DirectorySid) -> Option<PendingEdit> {
        self.edits.borrow().get(&sid).cloned()
    }

    /// Opens a rename draft holding the current name.
    pub fn begin_rename(&self, sid: DirectorySid) -> Result<(), TreeError> {
        let name = self
            .tree
            .borrow()
            .get(sid)
            .map(|node| node.name.clone())
            .context(UnknownNodeSnafu { sid })?;
        self.edits.borrow_mut().insert(sid, PendingEdit::rename(name));
        Ok(())
    }

    /// Opens an empty draft for a new child of `sid`.
    pub fn begin_new_child(&self, sid: DirectorySid) -> Result<(), TreeError> {
        self.ensure_present(sid)?;
        self.edits.borrow_mut().insert(sid, PendingEdit::new_child());
        Ok(())
    }

    pub fn update_draft(&self, sid: DirectorySid, text: impl Into<String>) -> Result<(), TreeError> {
        let mut edits = self.edits.borrow_mut();
        let edit = edits.get_mut(&sid).context(NoPendingEditSnafu { sid })?;
        edit.draft = text.into();
        Ok(())
    }

    pub fn cancel_edit(&self, sid: DirectorySid) -> Option<PendingEdit> {
        self.edits.borrow_mut().remove(&sid)
    }

    /// Sends the draft of `sid` to the store.
    ///
    /// The edit closes before the request goes out, except for an empty
    /// new-child draft, which is ignored and stays open. While `sid` is busy
    /// the commit is refused and the draft is kept.
    pub async fn commit_edit(&self, sid: DirectorySid) -> Result<EditOutcome, TreeError> {
        let edit = self.pending_edit(sid).context(NoPendingEditSnafu { sid })?;
        if edit.kind == EditKind::NewChild && edit.draft.trim().is_empty() {
            return Ok(EditOutcome::Ignored);
        }
        ensure!(!self.is_busy(sid), OperationInFlightSnafu { sid });
        match edit.kind {
            EditKind::NewChild => {
                self.cancel_edit(sid);
                let created = self.create_child(sid, &edit.draft).await?;
                Ok(EditOutcome::Created(created))
            }
            EditKind::Rename => {
                self.cancel_edit(sid);
                match self.rename(sid, &edit.draft).await? {
                    RenameOutcome::Renamed => Ok(EditOutcome::Renamed),
                    RenameOutcome::Unchanged => Ok(EditOutcome::Unchanged),
                }
            }
        }
    }

    /// Leaving a rename input commits it. Leaving a new-child input discards it.
    pub async fn focus_lost(&self, sid: DirectorySid) -> Result<EditOutcome, TreeError> {
        let edit = self.pending_edit(sid).context(NoPendingEditSnafu { sid })?;
        match edit.kind {
            EditKind::Rename => self.commit_edit(sid).await,
            EditKind::NewChild => {
                self.cancel_edit(sid);
                Ok(EditOutcome::Cancelled)
            }
        }
    }

    fn ensure_present(&self, sid: DirectorySid) -> Result<(), TreeError> {
        ensure!(self.tree.borrow().contains(sid), UnknownNodeSnafu { sid });
        Ok(())
    }

    fn start_operation(&self, sid: DirectorySid) -> Result<InFlight<'_>, TreeError> {
        let inserted = self.in_flight.borrow_mut().insert(sid);
        ensure!(inserted, OperationInFlightSnafu { sid });
        Ok(InFlight {
            in_flight: &self.in_flight,
            sid,
        })
    }
}

/// Marks a node busy until dropped.
struct InFlight<'a> {
    in_flight: &'a RefCell<HashSet<DirectorySid>>,
    sid: DirectorySid,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.in_flight.borrow_mut().remove(&self.sid);
    }
}

fn collect_sids(node: &DirectoryNode, sids: &mut Vec<DirectorySid>) {
    sids.push(node.sid);
    for child in &node.children {
        collect_sids(child, sids);
    }
}
