use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Browse and edit a directory tree kept by a remote store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Directory containing dirsync.yaml
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Overrides `store.base_url` from the config file
    #[clap(long)]
    pub base_url: Option<String>,

    /// Overrides `session.identity` from the config file
    #[clap(long, short, allow_negative_numbers = true)]
    pub identity: Option<i64>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the whole directory tree
    Show,
    /// Create a directory, under the root unless a parent is given
    Mkdir {
        name: String,
        #[clap(long, short)]
        parent: Option<i64>,
    },
    /// Rename a directory
    Rename { sid: i64, name: String },
    /// Delete a directory and everything below it
    Rm { sid: i64 },
}
