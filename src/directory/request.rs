use serde::Serialize;

use crate::directory::DirectorySid;

/// Body of `POST /directory`. A missing parent creates the directory under the
/// caller's root.
#[derive(Debug, Clone, Serialize)]
pub struct CreateDirectoryRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<DirectorySid>,
}

/// Body of `PUT /directory/{sid}`.
#[derive(Debug, Clone, Serialize)]
pub struct RenameDirectoryRequest<'a> {
    pub name: &'a str,
}
