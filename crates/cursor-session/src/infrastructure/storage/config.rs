//! TOML-based configuration persistence for the shared cursor session.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\SharedCursor\config.toml`
//! - Linux:    `~/.config/sharedcursor/config.toml`
//! - macOS:    `~/Library/Application Support/SharedCursor/config.toml`
//!
//! # What goes in the file? (for beginners)
//!
//! ```toml
//! [session]
//! throttle_delay_ms = 10
//! channel_label = "cursor"
//! log_level = "info"
//!
//! [channel]
//! ordered = true
//! max_retransmits = 0
//! reliable = false
//! ```
//!
//! `throttle_delay_ms` is the minimum gap between two frames sent to peers.
//! The `[channel]` table is handed to the transport unchanged when the data
//! channel is created.  Set `reliable = true` to ask for unlimited
//! retransmits; `max_retransmits` is then ignored.
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, so an empty or
//! partial file still yields a complete configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::share_cursor::SessionConfig;
use crate::infrastructure::transport::ChannelOptions;

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
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub channel: ChannelSection,
}

/// Session behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSection {
    /// Minimum milliseconds between two outbound frames.
    #[serde(default = "default_throttle_delay_ms")]
    pub throttle_delay_ms: u64,
    /// Label of the data channel requested from the transport.
    #[serde(default = "default_channel_label")]
    pub channel_label: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Data channel delivery options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelSection {
    #[serde(default = "default_true")]
    pub ordered: bool,
    #[serde(default)]
    pub max_retransmits: u16,
    /// Unlimited retransmits; overrides `max_retransmits`.
    #[serde(default)]
    pub reliable: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_throttle_delay_ms() -> u64 {
    10
}
fn default_channel_label() -> String {
    "cursor".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            throttle_delay_ms: default_throttle_delay_ms(),
            channel_label: default_channel_label(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ChannelSection {
    fn default() -> Self {
        Self {
            ordered: default_true(),
            max_retransmits: 0,
            reliable: false,
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl ChannelSection {
    pub fn channel_options(&self) -> ChannelOptions {
        ChannelOptions {
            ordered: self.ordered,
            max_retransmits: (!self.reliable).then_some(self.max_retransmits),
        }
    }
}

impl AppConfig {
    /// Builds the runtime session settings from the file contents.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            throttle_delay: Duration::from_millis(self.session.throttle_delay_ms),
            channel_label: self.session.channel_label.clone(),
            channel_options: self.channel.channel_options(),
        }
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

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file, returning
/// `AppConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning the defaults if it is absent.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory plus the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("SharedCursor"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("sharedcursor"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("SharedCursor")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_config_path() -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("sharedcursor_test_{}", Uuid::new_v4()));
        let path = dir.join("nested").join("config.toml");
        (dir, path)
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_throttle_is_ten_ms() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.session.throttle_delay_ms, 10);
        assert_eq!(cfg.session.channel_label, "cursor");
        assert_eq!(cfg.session.log_level, "info");
    }

    #[test]
    fn test_default_channel_is_ordered_without_retransmits() {
        let opts = AppConfig::default().channel.channel_options();
        assert_eq!(opts, ChannelOptions::default());
    }

    #[test]
    fn test_session_config_conversion_carries_every_field() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.session.throttle_delay_ms = 25;
        cfg.session.channel_label = "pointer".to_string();
        cfg.channel.ordered = false;
        cfg.channel.max_retransmits = 2;

        // Act
        let session = cfg.session_config();

        // Assert
        assert_eq!(session.throttle_delay, Duration::from_millis(25));
        assert_eq!(session.channel_label, "pointer");
        assert!(!session.channel_options.ordered);
        assert_eq!(session.channel_options.max_retransmits, Some(2));
    }

    #[test]
    fn test_reliable_channel_has_unlimited_retransmits() {
        let section = ChannelSection {
            ordered: true,
            max_retransmits: 5,
            reliable: true,
        };
        assert_eq!(section.channel_options().max_retransmits, None);
    }

    // ── TOML parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_session_table_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[session]
throttle_delay_ms = 40
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.session.throttle_delay_ms, 40);
        // Unspecified fields keep their defaults
        assert_eq!(cfg.session.channel_label, "cursor");
        assert!(cfg.channel.ordered);
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result: Result<AppConfig, toml::de::Error> = toml::from_str("[[[ not valid toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_app_config_serializes_and_deserializes_round_trip() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.session.log_level = "debug".to_string();
        cfg.channel.reliable = true;

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    // ── File access ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let (_, path) = temp_config_path();
        let cfg = load_config_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_then_load_round_trips_through_disk() {
        // Arrange
        let (dir, path) = temp_config_path();
        let mut cfg = AppConfig::default();
        cfg.session.throttle_delay_ms = 33;

        // Act
        save_config_to(&cfg, &path).expect("save");
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_malformed_file_returns_parse_error() {
        // Arrange
        let (dir, path) = temp_config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "session = [").unwrap();

        // Act
        let result = load_config_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
