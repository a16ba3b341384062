use crate::directory::DirectorySid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// The node's own name is being edited
    Rename,
    /// A name for a new child of the node is being typed
    NewChild,
}

/// Text input open on one node. A node has at most one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub kind: EditKind,
    pub draft: String,
}

impl PendingEdit {
    pub fn rename(current_name: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Rename,
            draft: current_name.into(),
        }
    }

    pub fn new_child() -> Self {
        Self {
            kind: EditKind::NewChild,
            draft: String::new(),
        }
    }
}

/// What committing or leaving an edit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Created(DirectorySid),
    Renamed,
    /// The rename draft was empty or equal to the current name. No request was
    /// sent and the edit is closed.
    Unchanged,
    /// The new-child draft was empty. The edit stays open.
    Ignored,
    Cancelled,
}
