use snafu::Snafu;

use crate::transport::TransportFailure;

/// The kind of failure a directory operation ended with, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Forbidden,
    NotFound,
    InternalError,
    TransportError,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("Access forbidden ({}): {}", status, message))]
    Forbidden { status: u16, message: String },
    #[snafu(display("Directory not found ({}): {}", status, message))]
    NotFound { status: u16, message: String },
    #[snafu(display("Directory store failed ({}): {}", status, message))]
    InternalError { status: u16, message: String },
    #[snafu(display("Could not reach the directory store"))]
    TransportError { source: TransportFailure },
}

impl ApiError {
    /// Maps a non-2xx status onto its error kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            403 => ApiError::Forbidden { status, message },
            404 => ApiError::NotFound { status, message },
            _ => ApiError::InternalError { status, message },
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Forbidden { .. } => ApiErrorKind::Forbidden,
            ApiError::NotFound { .. } => ApiErrorKind::NotFound,
            ApiError::InternalError { .. } => ApiErrorKind::InternalError,
            ApiError::TransportError { .. } => ApiErrorKind::TransportError,
        }
    }

    /// HTTP status the store answered with, `None` when no response arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Forbidden { status, .. }
            | ApiError::NotFound { status, .. }
            | ApiError::InternalError { status, .. } => Some(*status),
            ApiError::TransportError { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ApiErrorKind::NotFound
    }
}
