//! Server configuration management
//!
//! Handles loading configuration from environment variables, TOML files, and CLI arguments.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use adapter_refdata::SessionOptions;
use ratings_core::{BondPolicy, DrainPolicy};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}. Must be between 1 and 65535")]
    InvalidPort(u16),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid failure mode: {0}. Must be one of: demo, strict")]
    InvalidFailureMode(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Configuration file error: {0}")]
    FileError(String),
}

/// Log levels supported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// How the bond list endpoint reports upstream failures
///
/// - `Demo`: answer with the built-in demo dataset (HTTP 200, `mode: "demo"`)
/// - `Strict`: answer with an error body and a 5xx status (`mode: "error"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    #[default]
    Demo,
    Strict,
}

impl std::str::FromStr for FailureMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "demo" => Ok(FailureMode::Demo),
            "strict" => Ok(FailureMode::Strict),
            _ => Err(ConfigError::InvalidFailureMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for FailureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureMode::Demo => write!(f, "demo"),
            FailureMode::Strict => write!(f, "strict"),
        }
    }
}

/// Server configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Terminal (bridge) host
    pub bloomberg_host: String,
    /// Terminal (bridge) port
    pub bloomberg_port: u16,
    /// Failure reporting of the bond list endpoint
    #[serde(deserialize_with = "deserialize_failure_mode")]
    pub failure_mode: FailureMode,
    /// Default `limit` of the bond list endpoint
    pub default_limit: usize,
    /// Securities per reference-data request
    pub batch_size: usize,
    /// Wait per poll of the vendor session, in milliseconds
    pub poll_timeout_ms: u64,
    /// Upper bound on waiting for one request's final response, in seconds
    pub drain_deadline_secs: u64,
    /// Use the built-in identifier universe when screening finds nothing
    pub fallback_universe: bool,
    /// Attempt a connection before serving
    pub connect_on_startup: bool,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

fn deserialize_failure_mode<'de, D>(deserializer: D) -> Result<FailureMode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    FailureMode::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_level: LogLevel::Info,
            bloomberg_host: "localhost".to_string(),
            bloomberg_port: 8194,
            failure_mode: FailureMode::Demo,
            default_limit: ratings_core::fields::SCREENING_TARGET,
            batch_size: ratings_core::fields::DEFAULT_BATCH_SIZE,
            poll_timeout_ms: 500,
            drain_deadline_secs: 120,
            fallback_universe: false,
            connect_on_startup: true,
        }
    }
}

const ENV_HOST: &str = "RATINGS_SERVER_HOST";
const ENV_PORT: &str = "RATINGS_SERVER_PORT";
/// Listen port variable of earlier deployments; `RATINGS_SERVER_PORT` wins when both are set
const ENV_LEGACY_PORT: &str = "FLASK_PORT";
const ENV_LOG_LEVEL: &str = "RATINGS_LOG_LEVEL";
const ENV_BLOOMBERG_HOST: &str = "BLOOMBERG_HOST";
const ENV_BLOOMBERG_PORT: &str = "BLOOMBERG_PORT";
const ENV_FAILURE_MODE: &str = "RATINGS_FAILURE_MODE";
const ENV_BATCH_SIZE: &str = "RATINGS_BATCH_SIZE";
const ENV_FALLBACK_UNIVERSE: &str = "RATINGS_FALLBACK_UNIVERSE";

fn parse_env<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value })
}

impl ServerConfig {
    /// Create a new ServerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields whose environment variable is set
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Override fields from a variable lookup
    fn apply_vars<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = var(ENV_LEGACY_PORT) {
            self.port = parse_env(ENV_LEGACY_PORT, port)?;
        }
        if let Some(port) = var(ENV_PORT) {
            self.port = parse_env(ENV_PORT, port)?;
        }
        if let Some(log_level) = var(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&log_level)?;
        }
        if let Some(host) = var(ENV_BLOOMBERG_HOST) {
            self.bloomberg_host = host;
        }
        if let Some(port) = var(ENV_BLOOMBERG_PORT) {
            self.bloomberg_port = parse_env(ENV_BLOOMBERG_PORT, port)?;
        }
        if let Some(mode) = var(ENV_FAILURE_MODE) {
            self.failure_mode = FailureMode::from_str(&mode)?;
        }
        if let Some(size) = var(ENV_BATCH_SIZE) {
            self.batch_size = parse_env(ENV_BATCH_SIZE, size)?;
        }
        if let Some(enabled) = var(ENV_FALLBACK_UNIVERSE) {
            self.fallback_universe = enabled.to_lowercase() == "true";
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        if self.bloomberg_port == 0 {
            return Err(ConfigError::InvalidPort(self.bloomberg_port));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }

        Ok(())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Session settings for the terminal connection
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::new(self.bloomberg_host.clone(), self.bloomberg_port)
    }

    pub fn drain_policy(&self) -> DrainPolicy {
        DrainPolicy::new(
            Duration::from_millis(self.poll_timeout_ms),
            Duration::from_secs(self.drain_deadline_secs),
        )
    }

    /// Bond service policy; strict mode also drops records without an issuer
    pub fn bond_policy(&self) -> BondPolicy {
        BondPolicy {
            fallback_universe: self.fallback_universe,
            drop_missing_issuers: self.failure_mode == FailureMode::Strict,
        }
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        }
        if let Some(host) = &cli.bloomberg_host {
            self.bloomberg_host = host.clone();
        }
        if let Some(port) = cli.bloomberg_port {
            self.bloomberg_port = port;
        }
        if let Some(mode) = &cli.failure_mode {
            self.failure_mode = FailureMode::from_str(mode)?;
        }
        if cli.no_connect {
            self.connect_on_startup = false;
        }
        Ok(())
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Host address override
    pub host: Option<String>,
    /// Port override
    pub port: Option<u16>,
    /// Log level override
    pub log_level: Option<String>,
    /// Terminal host override
    pub bloomberg_host: Option<String>,
    /// Terminal port override
    pub bloomberg_port: Option<u16>,
    /// Failure mode override
    pub failure_mode: Option<String>,
    /// Skip the startup connection attempt
    pub no_connect: bool,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<ServerConfig, ConfigError> {
    let mut config = if let Some(config_path) = &cli.config_file {
        ServerConfig::from_file(config_path)?
    } else {
        ServerConfig::default()
    };

    config.apply_env()?;
    config.merge_with_cli(cli)?;
    config.validate()?;

    Ok(config)
}
