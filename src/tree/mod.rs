//! Client-side view of the directory hierarchy and its reconciliation with the
//! store.
//!
//! [`DirectoryTree`] is a plain owned tree. [`TreeEngine`] wraps it and applies
//! only store-confirmed mutations. A result that arrives after its target left
//! the tree is dropped.

mod edit;
mod engine;
mod error;
mod tree;

pub use edit::{EditKind, EditOutcome, PendingEdit};
pub use engine::{RenameOutcome, TreeEngine};
pub use error::TreeError;
pub use tree::{DirectoryTree, InsertError};
