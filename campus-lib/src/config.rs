use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::{env, fs};
use tracing::level_filters::LevelFilter;

#[derive(Deserialize, Debug)]
pub struct SSLConfig {
    pub private_key_file: PathBuf,
    pub certificate_chain_file: PathBuf,
}

/// OTLP span export. `headers` are sent as gRPC metadata, e.g. an API key for the collector.
#[derive(Deserialize, Debug)]
pub struct TelemetryConfig {
    pub endpoint: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Drop and recreate the tables on start. Each server picks its own default when unset.
    pub reset_on_start: Option<bool>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub ssl: Option<SSLConfig>,
    pub telemetry: Option<TelemetryConfig>,
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Config, anyhow::Error> {
        let config = fs::read_to_string(&path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        Self::parse(config.as_str())
    }

    pub fn parse(config: &str) -> Result<Config, anyhow::Error> {
        let config: Config = toml::from_str(config).with_context(|| "Unable to parse config")?;
        Ok(config)
    }

    pub fn from_env() -> Result<Config, anyhow::Error> {
        let database_url = read_env("DATABASE_URL")?;
        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| default_bind_address());
        let reset_on_start = match env::var("RESET_ON_START") {
            Ok(value) => Some(
                value
                    .parse()
                    .context("Unable to parse RESET_ON_START value")?,
            ),
            Err(_) => None,
        };
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| default_log_level());

        let config = Config {
            database_url,
            bind_address,
            reset_on_start,
            log_level,
            ssl: None,
            telemetry: None,
        };
        Ok(config)
    }

    /// Reads the config file if one can be found, otherwise the environment.
    pub fn load() -> Result<Config, anyhow::Error> {
        match find_config_file() {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter, anyhow::Error> {
        self.log_level
            .parse()
            .with_context(|| format!("Invalid log level {}", self.log_level))
    }
}

pub fn find_config_file() -> Option<PathBuf> {
    let config_current_dir = PathBuf::from("config.toml");
    if config_current_dir.exists() {
        return Some(config_current_dir);
    }
    if let Ok(config_env) = env::var("CONFIGURATION_DIRECTORY") {
        let config_path = PathBuf::from(config_env).join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}

fn read_env(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).with_context(|| format!("Unable to read env var: {}", key))
}
