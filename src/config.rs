/// Service configuration loader - parses spt.toml
///
/// Holds the settings that are not stored in the database: which schema
/// the watershed tables live in, HTTP client behavior for the GeoServer
/// and CKAN clients, and the default log filter. Prediction directories
/// come from the main settings record, not from here.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::db::DEFAULT_SCHEMA;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "spt.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub schema: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout for GeoServer and CKAN calls.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            user_agent: concat!("spt_housekeeping/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by RUST_LOG.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str, path: &str) -> Result<ServiceConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

/// Loads configuration from `path`. A missing file gives the defaults;
/// an unreadable or malformed one is an error.
pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    match fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents, &display),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ServiceConfig::default()),
        Err(source) => Err(ConfigError::Read {
            path: display,
            source,
        }),
    }
}

/// Loads configuration from the default location (spt.toml)
pub fn load_config() -> Result<ServiceConfig, ConfigError> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

/// Builds the blocking HTTP client shared by the remote service clients.
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::blocking::Client, ConfigError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}
