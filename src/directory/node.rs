use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a directory.
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectorySid(pub i64);

impl DirectorySid {
    /// Lookup key resolving to the caller's own root directory.
    pub const ROOT_LOOKUP: DirectorySid = DirectorySid(0);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryNode {
    pub sid: DirectorySid,
    pub name: String,
    /// Absent for the root directory
    #[serde(default, alias = "parent_sid", skip_serializing_if = "Option::is_none")]
    pub parent: Option<DirectorySid>,
    #[serde(default)]
    pub children: Vec<DirectoryNode>,
}

impl DirectoryNode {
    pub fn new(sid: DirectorySid, name: impl Into<String>) -> Self {
        Self {
            sid,
            name: name.into(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: DirectorySid) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_child(mut self, child: DirectoryNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search for `sid` in this subtree, including `self`.
    pub fn find(&self, sid: DirectorySid) -> Option<&DirectoryNode> {
        if self.sid == sid {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(sid))
    }

    pub fn find_mut(&mut self, sid: DirectorySid) -> Option<&mut DirectoryNode> {
        if self.sid == sid {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(sid))
    }

    /// Finds the node whose `children` directly contain `sid`.
    pub fn find_parent_of_mut(&mut self, sid: DirectorySid) -> Option<&mut DirectoryNode> {
        if self.children.iter().any(|child| child.sid == sid) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_parent_of_mut(sid))
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DirectoryNode::subtree_len)
            .sum::<usize>()
    }
}
