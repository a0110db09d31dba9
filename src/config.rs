//! Console server configuration.
//!
//! Settings come from an optional JSON file and can be overridden through
//! environment variables:
//! - `CONSOLE_ADDR` - listen address (default `127.0.0.1`)
//! - `CONSOLE_PORT` - listen port (default `6789`)
//! - `CONSOLE_MAX_CLIENTS` - concurrent session limit, `0` for unlimited

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 6789;
pub const DEFAULT_MAX_CLIENTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Maximum concurrent sessions. Zero disables the limit.
    pub max_clients: usize,
    /// Write logs to a file in this directory instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_clients: DEFAULT_MAX_CLIENTS,
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load a configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ServerConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid console config at {}", path.display()))?;
        Ok(config)
    }

    /// Apply `CONSOLE_*` environment overrides.
    pub fn with_env_overrides(mut self) -> anyhow::Result<Self> {
        if let Ok(addr) = std::env::var("CONSOLE_ADDR") {
            self.address = addr;
        }
        if let Ok(port) = std::env::var("CONSOLE_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("Invalid CONSOLE_PORT: {}", port))?;
        }
        if let Ok(max) = std::env::var("CONSOLE_MAX_CLIENTS") {
            self.max_clients = max
                .parse()
                .with_context(|| format!("Invalid CONSOLE_MAX_CLIENTS: {}", max))?;
        }
        Ok(self)
    }

    /// `address:port`, suitable for `TcpListener::bind`.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Whether one more session fits under the limit.
    pub fn admits(&self, live_sessions: usize) -> bool {
        self.max_clients == 0 || live_sessions < self.max_clients
    }
}
