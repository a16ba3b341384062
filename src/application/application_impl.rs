use snafu::Snafu;
use snafu::prelude::*;
use tracing::debug;

use crate::application::RuntimeConfig;
use crate::browser::{BrowserError, DirectoryBrowser};
use crate::cli::Command;
use crate::config::{ClientConfig, ConfigError};
use crate::directory::DirectorySid;
use crate::render::{render_tree, stdout_supports_color};
use crate::session::Session;
use crate::transport::{HttpTransport, UreqTransport};
use crate::tree::{RenameOutcome, TreeEngine, TreeError};

pub struct Application;

impl Application {
    pub async fn run(runtime_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        let file_config = ClientConfig::read(&runtime_config.root)
            .await
            .context(ConfigurationSnafu)?;
        let config = runtime_config.apply_overrides(file_config);
        debug!("Loaded config: {:?}", config);

        let transport = UreqTransport::new(&config.base_url, config.timeout)
            .context(TransportCreationSnafu)?;
        let mut browser = DirectoryBrowser::new(transport, Session::new(config.identity));
        let engine = browser.load().await.context(LoadSnafu)?;

        let message = Self::execute(engine, &runtime_config.command)
            .await
            .context(CommandSnafu)?;
        if let Some(message) = message {
            println!("{message}");
        }
        print!("{}", render_tree(&engine.snapshot(), stdout_supports_color()));

        Ok(())
    }

    /// Runs one command against the loaded tree and describes what changed.
    async fn execute<T: HttpTransport>(
        engine: &TreeEngine<T>,
        command: &Command,
    ) -> Result<Option<String>, TreeError> {
        match command {
            Command::Show => Ok(None),
            Command::Mkdir { name, parent } => {
                let parent = match parent {
                    Some(sid) => DirectorySid(*sid),
                    None => engine.tree().root_sid(),
                };
                let sid = engine.create_child(parent, name).await?;
                Ok(Some(format!("Created '{name}' as directory {sid}")))
            }
            Command::Rename { sid, name } => {
                let message = match engine.rename(DirectorySid(*sid), name).await? {
                    RenameOutcome::Renamed => format!("Renamed directory {sid} to '{name}'"),
                    RenameOutcome::Unchanged => format!("Directory {sid} left unchanged"),
                };
                Ok(Some(message))
            }
            Command::Rm { sid } => {
                engine.delete(DirectorySid(*sid)).await?;
                Ok(Some(format!("Deleted directory {sid}")))
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigurationError { source: ConfigError },
    #[snafu(display("Failed to start the HTTP worker pool"))]
    TransportCreationError { source: std::io::Error },
    #[snafu(display("Could not load the directory tree"))]
    LoadError { source: BrowserError },
    #[snafu(display("Directory operation failed"))]
    CommandError { source: TreeError },
}
