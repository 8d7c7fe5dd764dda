//! TOML-based configuration for the keypad bridge.
//!
//! The default location is the platform config directory:
//! - Linux:    `~/.config/keypad-bridge/config.toml`
//! - Windows:  `%APPDATA%\keypad-bridge\config.toml`
//! - macOS:    `~/Library/Application Support/keypad-bridge/config.toml`
//!
//! A missing file means "all defaults".  Every field has a default, so a file
//! only needs the settings it changes:
//!
//! ```toml
//! [bluetooth]
//! peer_address = "DC:2C:26:00:37:A9"
//! ready_timeout_ms = 10000
//!
//! [server]
//! address = "192.168.1.20:8080"
//!
//! [keys]
//! Numpad0 = "0"
//! NumpadEnter = "enter"
//! "0x29" = "esc"
//! ```
//!
//! When a `[keys]` table is present it replaces the built-in keypad layout
//! entirely.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use keypad_core::{KeyActionTable, KeyTableError, PeerAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The `[keys]` table is invalid.
    #[error("invalid [keys] table: {0}")]
    Keys(#[from] KeyTableError),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub bridge: BridgeSection,
    #[serde(default)]
    pub bluetooth: BluetoothConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Key name or hex code → action path.  Empty means the built-in layout.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub keys: BTreeMap<String, String>,
}

/// General bridge behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeSection {
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Radio-side settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BluetoothConfig {
    /// Address of the keypad to connect to at startup.
    #[serde(default = "default_peer_address")]
    pub peer_address: PeerAddress,
    /// Name this host advertises.
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// How long the startup task waits for the link to resolve.
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
    /// Whether previously paired peripherals may reconnect on their own.
    #[serde(default = "default_true")]
    pub connectable: bool,
}

/// Action server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// `host:port` of the action server.
    #[serde(default = "default_server_address")]
    pub address: String,
    /// Prepended to every action to form the request path.
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Capacity of the queue between the stack thread and the sender task.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_peer_address() -> PeerAddress {
    PeerAddress::new([0xDC, 0x2C, 0x26, 0x00, 0x37, 0xA9])
}
fn default_device_name() -> String {
    "BT KB Receiver".to_string()
}
fn default_ready_timeout_ms() -> u64 {
    10_000
}
fn default_true() -> bool {
    true
}
fn default_server_address() -> String {
    "127.0.0.1:80".to_string()
}
fn default_path_prefix() -> String {
    "/remote/".to_string()
}
fn default_request_timeout_ms() -> u64 {
    5_000
}
fn default_queue_capacity() -> usize {
    32
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            peer_address: default_peer_address(),
            device_name: default_device_name(),
            ready_timeout_ms: default_ready_timeout_ms(),
            connectable: default_true(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_server_address(),
            path_prefix: default_path_prefix(),
            request_timeout_ms: default_request_timeout_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl AppConfig {
    /// Builds the key → action table: the `[keys]` entries if any, otherwise
    /// the built-in keypad layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Keys`] for unknown key names, empty actions or
    /// duplicate codes.
    pub fn key_table(&self) -> Result<KeyActionTable, ConfigError> {
        if self.keys.is_empty() {
            return Ok(KeyActionTable::keypad_default());
        }
        let table = KeyActionTable::from_named(
            self.keys
                .iter()
                .map(|(key, action)| (key.as_str(), action.as_str())),
        )?;
        Ok(table)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.bluetooth.ready_timeout_ms)
    }
}

impl ServerConfig {
    /// Per-request deadline for the action sender.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory plus the `keypad-bridge`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("keypad-bridge"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("keypad-bridge"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("keypad-bridge")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
