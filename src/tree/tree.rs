use snafu::Snafu;

use crate::directory::{DirectoryNode, DirectorySid};

/// An owned directory subtree. Each node exclusively owns its children, so
/// removing a node drops its whole subtree with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryTree {
    root: DirectoryNode,
}

impl DirectoryTree {
    pub fn new(root: DirectoryNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &DirectoryNode {
        &self.root
    }

    pub fn root_sid(&self) -> DirectorySid {
        self.root.sid
    }

    pub fn get(&self, sid: DirectorySid) -> Option<&DirectoryNode> {
        self.root.find(sid)
    }

    pub fn contains(&self, sid: DirectorySid) -> bool {
        self.get(sid).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.root.subtree_len()
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// A sid may only appear once in the tree, so a child that is already
    /// present anywhere is refused.
    pub fn append_child(
        &mut self,
        parent: DirectorySid,
        child: DirectoryNode,
    ) -> Result<(), InsertError> {
        if self.contains(child.sid) {
            return Err(InsertError::AlreadyPresent { sid: child.sid });
        }
        let parent_node = self
            .root
            .find_mut(parent)
            .ok_or(InsertError::MissingParent { parent })?;
        parent_node.children.push(child);
        Ok(())
    }

    /// Detaches `sid` and its subtree. The root cannot be detached.
    pub fn remove(&mut self, sid: DirectorySid) -> Option<DirectoryNode> {
        let parent = self.root.find_parent_of_mut(sid)?;
        let index = parent.children.iter().position(|child| child.sid == sid)?;
        Some(parent.children.remove(index))
    }

    /// Sets the name of `sid` and returns the previous one.
    pub fn rename(&mut self, sid: DirectorySid, name: impl Into<String>) -> Option<String> {
        let node = self.root.find_mut(sid)?;
        Some(std::mem::replace(&mut node.name, name.into()))
    }

    /// Replaces the whole cached tree with a freshly fetched one.
    pub fn replace(&mut self, root: DirectoryNode) -> DirectoryNode {
        std::mem::replace(&mut self.root, root)
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum InsertError {
    #[snafu(display("Directory {} is already part of the tree", sid))]
    AlreadyPresent { sid: DirectorySid },
    #[snafu(display("Parent directory {} is not part of the tree", parent))]
    MissingParent { parent: DirectorySid },
}
