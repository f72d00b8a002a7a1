use crate::constants;
use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub jobs: JobsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// GraphQL endpoint the maintenance jobs talk to.
    pub endpoint: String,
    /// Fixed transport-level retry count for the job client.
    pub retries: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    pub heartbeat_log: String,
    pub restock_log: String,
    pub reminders_log: String,
    pub report_log: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: constants::DEFAULT_PORT,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: constants::DEFAULT_GRAPHQL_ENDPOINT.to_string(),
            retries: constants::DEFAULT_CLIENT_RETRIES,
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            heartbeat_log: constants::DEFAULT_HEARTBEAT_LOG.to_string(),
            restock_log: constants::DEFAULT_RESTOCK_LOG.to_string(),
            reminders_log: constants::DEFAULT_REMINDERS_LOG.to_string(),
            report_log: constants::DEFAULT_REPORT_LOG.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            jobs: JobsConfig::default(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to
    /// defaults when the file does not exist. Jobs run from cron with no
    /// guarantee a config file is present.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        if !Path::new(config_path).exists() {
            return Ok(Config::default());
        }
        let config_content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
