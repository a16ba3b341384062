//! Entry point for a presentation layer: one identity, its root, its tree.

use std::rc::Rc;

use snafu::prelude::*;
use tracing::{debug, info};

use crate::root::{RootAcquisition, RootState};
use crate::session::{IdentityToken, Session};
use crate::transport::{DirectoryClient, HttpTransport};
use crate::tree::TreeEngine;

/// Ties the session to a client, the root acquisition flow and the tree.
///
/// The client is rebuilt whenever the identity changes, which restarts root
/// acquisition and drops the displayed tree. Without an identity there is no
/// client and nothing can be loaded.
pub struct DirectoryBrowser<T> {
    transport: T,
    session: Session,
    client: Option<Rc<DirectoryClient<T>>>,
    root_flow: Option<RootAcquisition<T>>,
    engine: Option<TreeEngine<T>>,
}

impl<T: HttpTransport + Clone> DirectoryBrowser<T> {
    pub fn new(transport: T, session: Session) -> Self {
        let mut browser = Self {
            transport,
            session,
            client: None,
            root_flow: None,
            engine: None,
        };
        browser.rebuild_client();
        browser
    }

    pub fn set_identity(&mut self, token: Option<IdentityToken>) {
        if self.session.set_token(token) {
            info!("Identity changed, restarting root acquisition");
            self.rebuild_client();
        }
    }

    pub fn root_state(&self) -> Option<&RootState> {
        self.root_flow.as_ref().map(RootAcquisition::state)
    }

    pub fn engine(&self) -> Option<&TreeEngine<T>> {
        self.engine.as_ref()
    }

    /// Acquires the root if needed and returns the engine over its tree.
    pub async fn load(&mut self) -> Result<&TreeEngine<T>, BrowserError> {
        if self.engine.is_none() {
            let flow = self.root_flow.as_mut().context(NoClientSnafu)?;
            let client = self.client.clone().context(NoClientSnafu)?;
            match flow.acquire().await {
                RootState::Ready(root) => {
                    debug!("Building tree from root {}", root.sid);
                    self.engine = Some(TreeEngine::new(client, root.clone()));
                }
                RootState::Failed(e) => {
                    return RootUnavailableSnafu {
                        reason: e.to_string(),
                    }
                    .fail();
                }
                other => {
                    return RootUnavailableSnafu {
                        reason: format!("acquisition stopped in {other:?}"),
                    }
                    .fail();
                }
            }
        }
        self.engine.as_ref().context(NoClientSnafu)
    }

    fn rebuild_client(&mut self) {
        self.engine = None;
        match self.session.token() {
            Some(token) => {
                debug!("Creating directory client for identity {}", token);
                let client = Rc::new(DirectoryClient::new(self.transport.clone(), token));
                self.root_flow = Some(RootAcquisition::new(client.clone()));
                self.client = Some(client);
            }
            None => {
                debug!("No identity, directory client disabled");
                self.root_flow = None;
                self.client = None;
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum BrowserError {
    #[snafu(display("No identity is set, the directory store cannot be used"))]
    NoClientError,
    #[snafu(display("Root directory unavailable: {}", reason))]
    RootUnavailableError { reason: String },
}
