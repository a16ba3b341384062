use snafu::Snafu;

use crate::directory::DirectorySid;
use crate::transport::ApiError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TreeError {
    #[snafu(display("Directory {} is not part of the displayed tree", sid))]
    UnknownNode { sid: DirectorySid },
    #[snafu(display("Directory name must not be empty"))]
    EmptyName,
    #[snafu(display("The root directory {} cannot be deleted", sid))]
    RootNotDeletable { sid: DirectorySid },
    #[snafu(display("Directory {} already has an operation in flight", sid))]
    OperationInFlight { sid: DirectorySid },
    #[snafu(display("Directory {} has no pending edit", sid))]
    NoPendingEdit { sid: DirectorySid },
    #[snafu(display("Failed to create directory '{}'", name))]
    CreateError { name: String, source: ApiError },
    #[snafu(display("Failed to rename directory {}", sid))]
    RenameError { sid: DirectorySid, source: ApiError },
    #[snafu(display("Failed to delete directory {}", sid))]
    DeleteError { sid: DirectorySid, source: ApiError },
    #[snafu(display("Failed to refresh directory {}", sid))]
    RefreshError { sid: DirectorySid, source: ApiError },
}

impl TreeError {
    /// The store error behind this failure, if the store was involved.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            TreeError::CreateError { source, .. }
            | TreeError::RenameError { source, .. }
            | TreeError::DeleteError { source, .. }
            | TreeError::RefreshError { source, .. } => Some(source),
            _ => None,
        }
    }
}
