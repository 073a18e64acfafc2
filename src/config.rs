//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/wmbridge/config.json`.
//! Every section is optional, so the file can grow new sections without
//! breaking existing ones.
//!
//! # Example
//!
//! ```json
//! {
//!   "socket_path": "/run/user/1000/wmbridge.sock",
//!   "bridge": { "verbose": false, "tick_ms": 50 },
//!   "headless": {
//!     "workspaces": ["web", "code", "chat"],
//!     "width": 2560,
//!     "height": 1440,
//!     "clients": ["term-1", "editor"]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
///
/// Every field is optional: a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path of the command socket.  Defaults to
    /// `$XDG_RUNTIME_DIR/wmbridge.sock`.
    #[serde(default)]
    pub socket_path: Option<String>,

    /// Dispatch behaviour.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Layout of the in-memory backend.
    #[serde(default)]
    pub headless: HeadlessConfig,
}

/// Dispatch behaviour shared by every caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Log validation and execution at `warn`/`info` instead of `debug`,
    /// and report soft failures to the caller.  Socket callers always get
    /// verbose dispatch regardless of this setting.
    pub verbose: bool,
    /// How long the event loop waits for a command before running another
    /// event-processing step (ms).
    pub tick_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            tick_ms: 50,
        }
    }
}

/// Screen and workspaces of the in-memory backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// Workspace names, in index order.
    pub workspaces: Vec<String>,
    /// Screen width in pixels.
    pub width: u32,
    /// Screen height in pixels.
    pub height: u32,
    /// Names of clients mapped at startup.
    pub clients: Vec<String>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            workspaces: ["1", "2", "3", "4"].iter().map(|s| s.to_string()).collect(),
            width: 1920,
            height: 1080,
            clients: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
