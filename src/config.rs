//! Configuration: wrapper library locations, autorepeat timing and channel
//! sizing, loaded from `~/.config/remotekeys/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const CONFIG_DIR: &str = ".config/remotekeys";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_INITIAL_DELAY_MS: u64 = 500;
const DEFAULT_REPEAT_INTERVAL_MS: u64 = 100;
const DEFAULT_EVENT_CAPACITY: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(
        "Autorepeat initial delay ({initial_delay_ms}ms) must be at least the repeat interval ({repeat_interval_ms}ms)"
    )]
    AutorepeatTiming {
        initial_delay_ms: u64,
        repeat_interval_ms: u64,
    },
}

/// Top-level configuration for both pipelines.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct BridgeConfig {
    pub remote_control: RemoteControlConfig,
    pub media_keys: MediaKeysConfig,
    /// Capacity of the host-facing event channels.
    pub event_capacity: usize,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct RemoteControlConfig {
    /// Path to the remote control wrapper library.
    pub library_path: PathBuf,
    pub autorepeat: AutorepeatConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct MediaKeysConfig {
    /// Path to the media keys wrapper library.
    pub library_path: PathBuf,
}

/// Autorepeat timing for held remote control buttons.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct AutorepeatConfig {
    pub initial_delay_ms: u64,
    pub repeat_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            remote_control: RemoteControlConfig::default(),
            media_keys: MediaKeysConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl Default for RemoteControlConfig {
    fn default() -> Self {
        Self {
            library_path: PathBuf::from("libAppleRemoteThreadedCWrapper.dylib"),
            autorepeat: AutorepeatConfig::default(),
        }
    }
}

impl Default for MediaKeysConfig {
    fn default() -> Self {
        Self {
            library_path: PathBuf::from("libOSXMediaKeysThreadedCWrapper.dylib"),
        }
    }
}

impl Default for AutorepeatConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            repeat_interval_ms: DEFAULT_REPEAT_INTERVAL_MS,
        }
    }
}

impl AutorepeatConfig {
    /// A first repeat before the initial delay would reorder events, so the
    /// delay must not undercut the interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_delay_ms < self.repeat_interval_ms {
            return Err(ConfigError::AutorepeatTiming {
                initial_delay_ms: self.initial_delay_ms,
                repeat_interval_ms: self.repeat_interval_ms,
            });
        }
        Ok(())
    }
}

impl BridgeConfig {
    /// Default on-disk location, falling back to a relative path when no
    /// home directory is available.
    pub fn default_path() -> PathBuf {
        match dirs::home_dir() {
            Some(home) => home.join(CONFIG_DIR).join(CONFIG_FILE),
            None => {
                warn!("No home directory found, using relative config path");
                PathBuf::from(CONFIG_DIR).join(CONFIG_FILE)
            }
        }
    }

    /// Load and validate the config at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.remote_control.autorepeat.validate()?;
        Ok(config)
    }

    /// Load the config at `path`, writing a default one first if none
    /// exists.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config found, writing defaults to {}", path.display());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let default = Self::default();
            fs::write(path, toml::to_string_pretty(&default)?)?;
            return Ok(default);
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BridgeConfig::default();
        assert_eq!(config.remote_control.autorepeat.initial_delay_ms, 500);
        assert_eq!(config.remote_control.autorepeat.repeat_interval_ms, 100);
        assert_eq!(config.event_capacity, 100);
        // The prebuilt wrapper libraries ship under these exact names.
        assert_eq!(
            config.remote_control.library_path,
            PathBuf::from("libAppleRemoteThreadedCWrapper.dylib")
        );
        assert_eq!(
            config.media_keys.library_path,
            PathBuf::from("libOSXMediaKeysThreadedCWrapper.dylib")
        );
        config.remote_control.autorepeat.validate().unwrap();
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [remote_control]
            library_path = "/opt/wrappers/libAppleRemoteThreadedCWrapper.dylib"

            [remote_control.autorepeat]
            initial_delay_ms = 750
            "#,
        )
        .unwrap();

        assert_eq!(
            config.remote_control.library_path,
            PathBuf::from("/opt/wrappers/libAppleRemoteThreadedCWrapper.dylib")
        );
        assert_eq!(config.remote_control.autorepeat.initial_delay_ms, 750);
        assert_eq!(config.remote_control.autorepeat.repeat_interval_ms, 100);
        assert_eq!(
            config.media_keys.library_path,
            PathBuf::from("libOSXMediaKeysThreadedCWrapper.dylib")
        );
    }

    #[test]
    fn rejects_initial_delay_below_interval() {
        let autorepeat = AutorepeatConfig {
            initial_delay_ms: 50,
            repeat_interval_ms: 100,
        };
        assert!(matches!(
            autorepeat.validate(),
            Err(ConfigError::AutorepeatTiming { .. })
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = BridgeConfig::default();
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: BridgeConfig = toml::from_str(&raw).unwrap();
        assert_eq!(parsed.event_capacity, config.event_capacity);
        assert_eq!(
            parsed.remote_control.autorepeat.initial_delay_ms,
            config.remote_control.autorepeat.initial_delay_ms
        );
    }
}
