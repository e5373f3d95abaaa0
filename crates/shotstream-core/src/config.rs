use crate::error::ConfigError;
use crate::types::StreamingFeature;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CHUNK_SIZE: usize = 5 * 1024 * 1024;
pub const RECOMMENDED_MAX_CHUNK_SIZE: usize = 10 * 1024 * 1024;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 3 * 60 * 60;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub transport: TransportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default)]
    pub feature: StreamingFeature,

    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl StreamConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            feature: StreamingFeature::default(),
            idle_timeout_secs: default_idle_timeout_secs(),
            queue_depth: default_queue_depth(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default = "default_transport_name")]
    pub name: String,

    #[serde(default)]
    pub grpc: Option<GrpcConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            name: default_transport_name(),
            grpc: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GrpcConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}

fn default_queue_depth() -> usize {
    2
}

fn default_transport_name() -> String {
    "grpc".to_string()
}

fn default_endpoint() -> String {
    "https://videointelligence.googleapis.com".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid");
    let mut result = input.to_string();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let val = std::env::var(var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
        result = result.replace(&cap[0], &val);
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let stream = &self.stream;
        if stream.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "stream.chunk_size must be greater than zero".to_string(),
            ));
        }
        if stream.idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "stream.idle_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if stream.queue_depth == 0 {
            return Err(ConfigError::Invalid(
                "stream.queue_depth must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
