//! HTTP plumbing between the tree engine and the directory store.
//!
//! [`HttpTransport`] is the raw request/response seam. [`DirectoryClient`]
//! speaks the directory endpoints on top of it and turns responses into
//! [`DirectoryNode`](crate::directory::DirectoryNode)s or [`ApiError`]s.

mod client;
mod error;
mod http;
mod ureq_transport;

pub use client::{DirectoryClient, IDENTITY_HEADER};
pub use error::{ApiError, ApiErrorKind};
pub use http::{HttpRequest, HttpResponse, HttpTransport, Method, TransportFailure};
pub use ureq_transport::UreqTransport;
