//! Engine settings loaded from TOML.
//!
//! Every table and field is optional; anything missing takes the default
//! below. The file lives at `~/.config/inky/config.toml` unless a path is
//! given explicitly.
//!
//! ```toml
//! [dispatcher]
//! poll_rate_ms = 50
//!
//! [dispatcher.analog]
//! dead_zone = 0.1
//! threshold = 0.01
//!
//! [touch]
//! snap = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "inky";
const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No config directory could be determined")]
    NoConfigDir,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct InkySettings {
    pub dispatcher: DispatcherSettings,
    pub device: DeviceSettings,
    pub touch: TouchSettings,
}

/// Dead zone and jitter threshold for one signal.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct GateSettings {
    pub dead_zone: f64,
    pub threshold: f64,
}

impl GateSettings {
    pub const fn new(dead_zone: f64, threshold: f64) -> Self {
        Self {
            dead_zone,
            threshold,
        }
    }
}

impl Default for GateSettings {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Gamepad axes, buttons and the radial sticks derived from them.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct AnalogSettings {
    pub dead_zone: f64,
    pub threshold: f64,
    pub normalized: bool,
}

impl Default for AnalogSettings {
    fn default() -> Self {
        Self {
            dead_zone: 0.1,
            threshold: 0.01,
            normalized: true,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct OrientationSettings {
    /// Angle in radians the X/Y direction must turn before it is reported.
    pub xy_threshold: f64,
    /// Angle in radians from the neutral direction that X/Y must exceed.
    pub xy_dead_zone: f64,
    pub xy_normalized: bool,
    pub z_threshold: f64,
    pub z_dead_zone: f64,
    pub z_normalized: bool,
}

impl Default for OrientationSettings {
    fn default() -> Self {
        Self {
            xy_threshold: 0.01,
            xy_dead_zone: 0.1,
            xy_normalized: false,
            z_threshold: 0.02,
            z_dead_zone: 0.5,
            z_normalized: false,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct MotionSettings {
    pub acceleration: GateSettings,
    pub acceleration_with_gravity: GateSettings,
    pub rotation: GateSettings,
    pub velocity: GateSettings,
    pub position: GateSettings,
    /// Install moving-average chains on the first motion sample when no
    /// filters were set explicitly.
    pub default_filters: bool,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            acceleration: GateSettings::new(0.01, 0.01),
            acceleration_with_gravity: GateSettings::new(0.0, 0.01),
            rotation: GateSettings::new(1.0, 0.25),
            velocity: GateSettings::new(0.01, 0.001),
            position: GateSettings::new(0.0, 0.01),
            default_filters: true,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct DispatcherSettings {
    pub enabled: bool,
    pub auto_poll: bool,
    pub poll_rate_ms: u64,
    pub analog: AnalogSettings,
    pub orientation: OrientationSettings,
    pub motion: MotionSettings,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_poll: true,
            poll_rate_ms: 50,
            analog: AnalogSettings::default(),
            orientation: OrientationSettings::default(),
            motion: MotionSettings::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct DeviceSettings {
    pub enabled: bool,
    pub normalized: bool,
    pub dead_zone: f64,
    pub threshold: f64,
    pub poll_rate_ms: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            normalized: true,
            dead_zone: 0.0,
            threshold: 0.0,
            poll_rate_ms: 33,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct TouchSettings {
    pub enabled: bool,
    pub normalized: bool,
    pub dead_zone: f64,
    pub threshold: f64,
    /// Zero every component when the touch ends or is cancelled.
    pub snap: bool,
    /// Manhattan values are relative to where the touch started.
    pub float_origin: bool,
}

impl Default for TouchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            normalized: true,
            dead_zone: 0.1,
            threshold: 0.01,
            snap: true,
            float_origin: true,
        }
    }
}

impl TouchSettings {
    /// Device settings for the device a touch area is built on.
    pub fn device_settings(&self) -> DeviceSettings {
        DeviceSettings {
            enabled: self.enabled,
            normalized: self.normalized,
            dead_zone: self.dead_zone,
            threshold: self.threshold,
            ..DeviceSettings::default()
        }
    }
}

impl InkySettings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `~/.config/inky/config.toml`, or the platform config dir when no
    /// home directory is known.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = match dirs::home_dir() {
            Some(mut home) => {
                home.push(".config");
                home
            }
            None => dirs::config_dir().ok_or(ConfigError::NoConfigDir)?,
        };
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        Ok(path)
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading settings from {}", path.display());
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
        let settings = Self::from_toml_str(&content)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Loads `path` (or the default path), falling back to defaults when the
    /// file is missing or invalid.
    pub async fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Ok(path) => path,
                Err(e) => {
                    warn!("{}, using default settings", e);
                    return Self::default();
                }
            },
        };

        match Self::load(&path).await {
            Ok(settings) => settings,
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{}, using default settings", e);
                Self::default()
            }
        }
    }
}
