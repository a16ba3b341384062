use std::path::PathBuf;

use crate::cli::{Cli, Command};
use crate::config::ClientConfig;
use crate::session::IdentityToken;

/// What one invocation was asked to do, before the config file is merged in.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command: Command,
    pub root: PathBuf,
    pub base_url: Option<String>,
    pub identity: Option<IdentityToken>,
}

impl RuntimeConfig {
    /// Command line values win over the config file.
    pub fn apply_overrides(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if self.identity.is_some() {
            config.identity = self.identity;
        }
        config
    }
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            command: cli.command,
            root: cli.root,
            base_url: cli.base_url,
            identity: cli.identity.map(IdentityToken),
        }
    }
}
