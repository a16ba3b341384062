//! Directory entities exchanged with the directory store.
//!
//! A [`DirectoryNode`] is a folder with its fully populated subtree, exactly as
//! the store returns it. The request payloads are the bodies of the mutating
//! endpoints.

mod node;
mod request;

pub use node::{DirectoryNode, DirectorySid};
pub use request::{CreateDirectoryRequest, RenameDirectoryRequest};
