// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_AMQP_PORT, DEFAULT_PREFETCH, DEFAULT_RUNNER_COMMAND, DEFAULT_STORAGE_REGION,
    DEFAULT_VIRTUAL_HOST,
};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the dispatcher.
///
/// Loaded once at startup. YAML and JSON are both accepted since every JSON
/// document is also valid YAML.
///
/// # Fields
/// * `working_dir` - Root under which one workspace per job is created
/// * `ignore_json` - Skip `.json` objects (manifests) when staging a payload
/// * `storage` - Object store connection and bucket
/// * `messaging` - Broker connection and subscription
/// * `runner` - How workflows are launched (optional)
///
/// # Example
/// ```yaml
/// working_dir: /var/lib/dispatcher/jobs
/// ignore_json: true
/// storage:
///   endpoint: localhost:9000
///   username: minioadmin
///   password: minioadmin
///   bucket: monaideploy
/// messaging:
///   host: localhost
///   username: guest
///   password: guest
///   virtual_host: monaideploy
///   exchange: monaideploy
///   topic: md.workflow.request
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    pub working_dir: PathBuf,
    #[serde(default)]
    pub ignore_json: bool,
    pub storage: StorageConfig,
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Object store connection settings.
///
/// `endpoint` may be given with or without a scheme; without one, `secure`
/// decides between `https://` and `http://`.
#[derive(Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub bucket: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_region")]
    pub region: String,
}

impl StorageConfig {
    /// Endpoint URL with an explicit scheme.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else if self.secure {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("secure", &self.secure)
            .field("region", &self.region)
            .finish()
    }
}

/// Broker connection and subscription settings.
///
/// The dispatcher declares a durable topic `exchange`, binds an exclusive
/// server-named queue to it with `topic` as routing key, and consumes with
/// manual acknowledgment.
#[derive(Deserialize)]
pub struct MessagingConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default = "default_virtual_host")]
    pub virtual_host: String,
    pub exchange: String,
    pub topic: String,
    #[serde(default = "default_prefetch")]
    pub prefetch: u16,
}

impl fmt::Debug for MessagingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessagingConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("virtual_host", &self.virtual_host)
            .field("exchange", &self.exchange)
            .field("topic", &self.topic)
            .field("prefetch", &self.prefetch)
            .finish()
    }
}

/// Workflow runner settings.
///
/// Each workflow is launched as `<command> run [-q] <name> <input> <output>`.
#[derive(Debug, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_runner_command")]
    pub command: String,
    #[serde(default)]
    pub quiet: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: default_runner_command(),
            quiet: false,
        }
    }
}

fn default_region() -> String {
    DEFAULT_STORAGE_REGION.to_string()
}

fn default_port() -> u16 {
    DEFAULT_AMQP_PORT
}

fn default_virtual_host() -> String {
    DEFAULT_VIRTUAL_HOST.to_string()
}

fn default_prefetch() -> u16 {
    DEFAULT_PREFETCH
}

fn default_runner_command() -> String {
    DEFAULT_RUNNER_COMMAND.to_string()
}

/// Load a config from a YAML or JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate a config from a YAML or JSON file
///
/// All validation problems are reported together in a single
/// [`ConfigError::Invalid`].
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;

    if let Err(errors) = crate::config::validate_config(&cfg) {
        return Err(ConfigError::Invalid(errors));
    }

    Ok(cfg)
}
