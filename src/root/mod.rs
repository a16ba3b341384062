//! Fetching the caller's root directory, creating it on first use.

mod acquisition;

pub use acquisition::{ROOT_DIRECTORY_NAME, RootAcquisition, RootError, RootState};
