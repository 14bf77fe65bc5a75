//! Configuration loading for gatehoused.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag, must exist)
//! 2. `~/.gatehouse/config.toml` (user)
//! 3. `/etc/gatehouse/config.toml` (system)
//!
//! When no file is found the built-in defaults are used, which serve gRPC on
//! `0.0.0.0:8080` and the HTTP gateway on `0.0.0.0:8090`.

use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::validation::ValidationPolicy;
use crate::{GatehouseError, Result};

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub docs: DocsConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// gRPC listener address (default: 0.0.0.0:8080).
    #[serde(default = "default_rpc_address")]
    pub rpc_address: String,
    /// HTTP gateway address (default: 0.0.0.0:8090).
    #[serde(default = "default_http_address")]
    pub http_address: String,
    /// Bound on the loopback bridge dial in seconds (default: 5).
    #[serde(default = "default_dial_timeout")]
    pub dial_timeout_secs: u64,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rpc_address: default_rpc_address(),
            http_address: default_http_address(),
            dial_timeout_secs: default_dial_timeout(),
            shutdown: ShutdownConfig::default(),
        }
    }
}

fn default_rpc_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_http_address() -> String {
    "0.0.0.0:8090".to_string()
}

fn default_dial_timeout() -> u64 {
    5
}

/// Drain deadlines applied after a termination signal.
#[derive(Debug, Clone, Deserialize)]
pub struct ShutdownConfig {
    /// HTTP drain grace period in seconds (default: 5).
    #[serde(default = "default_http_grace")]
    pub http_grace_secs: u64,
    /// gRPC drain grace period in seconds (default: 30).
    #[serde(default = "default_rpc_grace")]
    pub rpc_grace_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            http_grace_secs: default_http_grace(),
            rpc_grace_secs: default_rpc_grace(),
        }
    }
}

fn default_http_grace() -> u64 {
    5
}

fn default_rpc_grace() -> u64 {
    30
}

impl ShutdownConfig {
    pub fn http_grace(&self) -> Duration {
        Duration::from_secs(self.http_grace_secs)
    }

    pub fn rpc_grace(&self) -> Duration {
        Duration::from_secs(self.rpc_grace_secs)
    }
}

/// Static documentation assets.
#[derive(Debug, Clone, Deserialize)]
pub struct DocsConfig {
    /// Directory served under `/docs/` (default: `swagger-ui`).
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,
    /// API description served at `/docs/swagger.json`
    /// (default: `gen/openapiv2/service.swagger.json`).
    #[serde(default = "default_api_description")]
    pub api_description: PathBuf,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            asset_dir: default_asset_dir(),
            api_description: default_api_description(),
        }
    }
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from("swagger-ui")
}

fn default_api_description() -> PathBuf {
    ["gen", "openapiv2", "service.swagger.json"].iter().collect()
}

/// Transcoding gateway options.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Path of the synthetic health endpoint; empty disables it
    /// (default: `/healthz`).
    #[serde(default = "default_healthz_path")]
    pub healthz_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            healthz_path: default_healthz_path(),
        }
    }
}

fn default_healthz_path() -> String {
    "/healthz".to_string()
}

impl GatewayConfig {
    pub fn healthz_path(&self) -> Option<&str> {
        Some(self.healthz_path.as_str()).filter(|p| !p.is_empty())
    }
}

/// Request validation options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub policy: ValidationPolicy,
}

/// Log output options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
    /// Default to DEBUG instead of INFO.
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.gatehouse/config.toml`
    /// 3. `/etc/gatehouse/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GatehouseError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            GatehouseError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(GatehouseError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".gatehouse").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/gatehouse/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Parsed gRPC listener address.
    pub fn rpc_addr(&self) -> Result<SocketAddr> {
        parse_addr("rpc_address", &self.server.rpc_address)
    }

    /// Parsed HTTP gateway address.
    pub fn http_addr(&self) -> Result<SocketAddr> {
        parse_addr("http_address", &self.server.http_address)
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.server.dial_timeout_secs)
    }
}

fn parse_addr(field: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse()
        .map_err(|e| GatehouseError::Configuration(format!("Invalid {field} {value:?}: {e}")))
}
