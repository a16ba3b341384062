mod client_config;

pub use client_config::{
    CONFIG_FILE_NAME, ClientConfig, ConfigError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};
