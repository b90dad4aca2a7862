//! Configuration loading and validation.
//!
//! Every section is optional; a missing file yields the defaults. The
//! `[fallback]` section doubles as the user preference source consumed by
//! the fallback policy.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::address::DirectoryEntry;
use crate::policy::Preferences;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Fallback (carrier) delivery preferences.
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Address canonicalization settings.
    #[serde(default)]
    pub address: AddressConfig,

    /// Transfer progress event bus settings.
    #[serde(default)]
    pub events: EventsConfig,

    /// Static directory records.
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// User preferences governing the fallback channel.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    /// Whether fallback sends are allowed at all.
    #[serde(default = "default_true")]
    pub allowed: bool,

    /// Whether the user must approve each fallback send.
    #[serde(default)]
    pub ask_required: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            allowed: default_true(),
            ask_required: false,
        }
    }
}

impl Preferences for FallbackConfig {
    fn fallback_allowed(&self) -> bool {
        self.allowed
    }

    fn fallback_approval_required(&self) -> bool {
        self.ask_required
    }
}

/// Address canonicalization settings.
#[derive(Debug, Deserialize)]
pub struct AddressConfig {
    /// Country calling code applied to national numbers.
    #[serde(default = "default_country_code")]
    pub local_country_code: String,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            local_country_code: default_country_code(),
        }
    }
}

/// Transfer progress event bus settings.
#[derive(Debug, Deserialize)]
pub struct EventsConfig {
    /// Broadcast channel capacity; slow subscribers lag past this.
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

/// Static directory records.
#[derive(Debug, Default, Deserialize)]
pub struct DirectoryConfig {
    /// Known numbers and their capabilities.
    #[serde(default)]
    pub entries: Vec<DirectoryEntry>,
}

/// Log output settings.
#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// Directory for rotated JSON logs. Console-only when unset.
    #[serde(default)]
    pub logs_dir: Option<PathBuf>,
}

// Default value functions for serde

fn default_true() -> bool {
    true
}
fn default_country_code() -> String {
    "1".to_owned()
}
fn default_event_capacity() -> usize {
    64
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))?;
    Ok(config)
}

/// Load configuration, falling back to defaults when the file is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_or_default(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no config file found, using defaults");
        return Ok(Config::default());
    }
    tracing::info!(path = %path.display(), "loading config from file");
    load_config(path)
}

/// Resolve the default config directory (`~/.courier/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".courier"))
}
