use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::session::IdentityToken;

pub const CONFIG_FILE_NAME: &str = "dirsync.yaml";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

fn key(name: &'static str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

/// Where the directory store lives and who talks to it.
///
/// ```yaml
/// store:
///   base_url: http://127.0.0.1:3000
///   timeout_ms: 10000
/// session:
///   identity: 42
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub identity: Option<IdentityToken>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            identity: None,
        }
    }
}

impl ClientConfig {
    /// Reads `dirsync.yaml` from `root`. A missing file yields the defaults.
    pub async fn read(root: &Path) -> Result<Self, ConfigError> {
        Self::from_path(get_config_file_path(root)).await
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, ConfigError> {
        debug!("Opening config file: {}", path.display());
        let bytes = match compio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).context(ReadSnafu {
                    file_path: path.display().to_string(),
                });
            }
        };
        debug!("Successfully read config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    fn apply_store_section(
        &mut self,
        section: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<(), ConfigError> {
        for (name, value) in section {
            match name.as_str() {
                Some("base_url") => {
                    let base_url = value.as_str().filter(|url| !url.trim().is_empty());
                    self.base_url = base_url
                        .context(InvalidValueSnafu {
                            key: "store.base_url",
                            expected: "a non-empty string",
                        })?
                        .to_string();
                }
                Some("timeout_ms") => {
                    let millis = integer(value).filter(|ms| *ms > 0).context(InvalidValueSnafu {
                        key: "store.timeout_ms",
                        expected: "a positive integer",
                    })?;
                    self.timeout = Duration::from_millis(millis.unsigned_abs());
                }
                _ => debug!("Skipping unknown store setting: {:?}", name),
            }
        }
        Ok(())
    }

    fn apply_session_section(
        &mut self,
        section: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<(), ConfigError> {
        for (name, value) in section {
            match name.as_str() {
                Some("identity") => {
                    let identity = integer(value).context(InvalidValueSnafu {
                        key: "session.identity",
                        expected: "an integer",
                    })?;
                    self.identity = Some(IdentityToken(identity));
                }
                _ => debug!("Skipping unknown session setting: {:?}", name),
            }
        }
        Ok(())
    }
}

fn integer(value: &Yaml) -> Option<i64> {
    match value {
        Yaml::Value(Scalar::Integer(n)) => Some(*n),
        _ => None,
    }
}

fn section<'a, 'input>(
    top_level: &'a LinkedHashMap<Yaml<'input>, Yaml<'input>>,
    name: &'static str,
) -> Result<Option<&'a LinkedHashMap<Yaml<'input>, Yaml<'input>>>, ConfigError> {
    match top_level.get(&key(name)) {
        None | Some(Yaml::Value(Scalar::Null)) => Ok(None),
        Some(value) => value
            .as_mapping()
            .map(Some)
            .context(SectionNotMapSnafu { section: name }),
    }
}

impl TryFrom<&str> for ClientConfig {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents.first().context(MalformedConfigSnafu)?;
        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let mut config = ClientConfig::default();
        if let Some(store) = section(top_level, "store")? {
            config.apply_store_section(store)?;
        }
        if let Some(session) = section(top_level, "session")? {
            config.apply_session_section(session)?;
        }
        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Section '{}' should be a map", section))]
    SectionNotMap { section: String },
    #[snafu(display("Setting '{}' should be {}", key, expected))]
    InvalidValue { key: String, expected: String },
}
