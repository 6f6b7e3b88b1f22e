//! TOML-based configuration persistence for emu-input.
//!
//! Reads and writes [`AppConfig`] from an explicit path or the
//! platform-appropriate config file:
//! - Linux:    `$XDG_CONFIG_HOME/emu-input/config.toml` (or `~/.config/...`)
//! - Windows:  `%APPDATA%\EmuInput\config.toml`
//! - macOS:    `~/Library/Application Support/EmuInput/config.toml`
//!
//! Every field has a serde default, so a missing file, an empty file, or a
//! file written by an older version all load:
//!
//! ```toml
//! [log]
//! level = "debug"
//!
//! [surface]
//! width = 360
//! height = 640
//!
//! [session.channels]
//! touch = "multi-touch"
//! ```

use std::path::{Path, PathBuf};

use emu_core::protocol::DEFAULT_SLOT_COUNT;
use emu_core::{CaptureSurface, DeviceResolution};
use emu_session::SessionConfig;
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
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub touch: TouchConfig,
    #[serde(default)]
    pub signaling: SignalingConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// `tracing` filter used when `RUST_LOG` is unset, e.g. `"info"` or
    /// `"emu_session=debug,info"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Emulator display size in device pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    #[serde(default = "default_device_width")]
    pub width: u32,
    #[serde(default = "default_device_height")]
    pub height: u32,
}

/// Size and viewport offset of the local capture surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurfaceConfig {
    #[serde(default = "default_surface_width")]
    pub width: u32,
    #[serde(default = "default_surface_height")]
    pub height: u32,
    #[serde(default)]
    pub origin_x: i32,
    #[serde(default)]
    pub origin_y: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TouchConfig {
    /// Multi-touch slots on the device.
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalingConfig {
    /// WebSocket endpoint of the emulator's signaling service.
    #[serde(default = "default_signal_url")]
    pub url: String,
}

impl DeviceConfig {
    pub fn resolution(&self) -> DeviceResolution {
        DeviceResolution::new(self.width, self.height)
    }
}

impl SurfaceConfig {
    pub fn capture_surface(&self) -> CaptureSurface {
        CaptureSurface::new(self.width, self.height).with_origin(self.origin_x, self.origin_y)
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_device_width() -> u32 {
    1080
}
fn default_device_height() -> u32 {
    1920
}
fn default_surface_width() -> u32 {
    540
}
fn default_surface_height() -> u32 {
    960
}
fn default_max_slots() -> usize {
    DEFAULT_SLOT_COUNT
}
fn default_signal_url() -> String {
    "ws://127.0.0.1:8080/signal".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            width: default_device_width(),
            height: default_device_height(),
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: default_surface_width(),
            height: default_surface_height(),
            origin_x: 0,
            origin_y: 0,
        }
    }
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            max_slots: default_max_slots(),
        }
    }
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            url: default_signal_url(),
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

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the default location.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
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
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the default location.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(&config_file_path()?, config)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
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
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("EmuInput"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("EmuInput")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("emu-input"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("emu_input_test_{}", Uuid::new_v4()))
            .join("config.toml")
    }

    // ── AppConfig defaults ────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_geometry() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.device.resolution(), DeviceResolution::new(1080, 1920));
        assert_eq!(cfg.surface.capture_surface(), CaptureSurface::new(540, 960));
        assert_eq!(cfg.touch.max_slots, 10);
    }

    #[test]
    fn test_app_config_default_log_level_is_info() {
        assert_eq!(AppConfig::default().log.level, "info");
    }

    #[test]
    fn test_app_config_default_session_maps_all_streams() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.session.label_for("mouse"), Some("mouse"));
        assert_eq!(cfg.session.max_queued_sends, 64);
    }

    // ── TOML parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_section_overrides_only_named_fields() {
        // Arrange
        let toml_str = r#"
[surface]
width = 360
origin_y = 48

[signaling]
url = "wss://emulator.example/signal"
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.surface.width, 360);
        assert_eq!(cfg.surface.height, 960);
        assert_eq!(cfg.surface.capture_surface().origin_y, 48);
        assert_eq!(cfg.signaling.url, "wss://emulator.example/signal");
        assert_eq!(cfg.device, DeviceConfig::default());
    }

    #[test]
    fn test_session_channel_labels_are_configurable() {
        let toml_str = r#"
[session]
max_queued_sends = 8

[session.channels]
mouse = "mouse"
keyboard = "keyboard"
touch = "multi-touch"
"#;

        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize");

        assert_eq!(cfg.session.max_queued_sends, 8);
        assert_eq!(cfg.session.label_for("touch"), Some("multi-touch"));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    // ── Load / save ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");
        assert_eq!(load_config_from(&path).expect("default"), AppConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip_via_temp_dir() {
        // Arrange
        let path = temp_path();
        let mut cfg = AppConfig::default();
        cfg.log.level = "debug".to_string();
        cfg.surface.origin_x = 12;
        cfg.touch.max_slots = 5;

        // Act
        save_config_to(&path, &cfg).expect("save");
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("config.toml"),
                "config file must be named config.toml, got {path:?}"
            );
        }
        // NoPlatformConfigDir is acceptable in a stripped environment.
    }
}
