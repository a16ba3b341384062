use std::rc::Rc;

use snafu::Snafu;
use tracing::{debug, error, info};

use crate::directory::{DirectoryNode, DirectorySid};
use crate::transport::{ApiError, DirectoryClient, HttpTransport};

/// Name given to a root directory created on first use.
pub const ROOT_DIRECTORY_NAME: &str = "Root";

#[derive(Debug)]
pub enum RootState {
    Idle,
    Fetching,
    CreatingRoot,
    Ready(DirectoryNode),
    Failed(RootError),
}

impl RootState {
    /// `Ready` and `Failed` only change on [`RootAcquisition::reset`].
    pub fn is_settled(&self) -> bool {
        matches!(self, RootState::Ready(_) | RootState::Failed(_))
    }
}

#[derive(Debug, Snafu)]
pub enum RootError {
    #[snafu(display("failed to create root directory"))]
    CreateRootError { source: ApiError },
    #[snafu(display("unhandled error"))]
    UnhandledError { source: ApiError },
}

/// Loads the root directory of the client's identity.
///
/// The store answers `NotFound` for an identity that never had a root. In that
/// case one root is created and becomes the tree root. Any other failure is
/// final until [`reset`](Self::reset).
pub struct RootAcquisition<T> {
    client: Rc<DirectoryClient<T>>,
    state: RootState,
}

impl<T: HttpTransport> RootAcquisition<T> {
    pub fn new(client: Rc<DirectoryClient<T>>) -> Self {
        Self {
            client,
            state: RootState::Idle,
        }
    }

    pub fn state(&self) -> &RootState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = RootState::Idle;
    }

    /// Drives the flow from `Idle` to a settled state. Calling it on a settled
    /// flow returns the settled state without contacting the store.
    pub async fn acquire(&mut self) -> &RootState {
        if self.state.is_settled() {
            return &self.state;
        }

        self.transition(RootState::Fetching);
        let next = match self.client.get_directory(DirectorySid::ROOT_LOOKUP).await {
            Ok(root) => RootState::Ready(root),
            Err(e) if e.is_not_found() => {
                info!("No root directory, creating one");
                self.transition(RootState::CreatingRoot);
                match self.client.create_directory(ROOT_DIRECTORY_NAME, None).await {
                    Ok(root) => RootState::Ready(root),
                    Err(source) => RootState::Failed(RootError::CreateRootError { source }),
                }
            }
            Err(source) => RootState::Failed(RootError::UnhandledError { source }),
        };
        self.transition(next);
        &self.state
    }

    pub fn root(&self) -> Option<&DirectoryNode> {
        match &self.state {
            RootState::Ready(root) => Some(root),
            _ => None,
        }
    }

    fn transition(&mut self, next: RootState) {
        match &next {
            RootState::Ready(root) => info!("Root directory {} '{}' ready", root.sid, root.name),
            RootState::Failed(e) => error!("Root acquisition failed: {}", e),
            other => debug!("Root acquisition -> {:?}", other),
        }
        self.state = next;
    }
}
