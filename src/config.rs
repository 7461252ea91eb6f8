//! # Configuration Management

//! This module handles the configuration loading for the garage door simulator.
//! It leverages the `config` crate to layer settings from several sources:

//! * YAML configuration files (default.yaml plus an optional per-run-mode file such as development.yaml)
//! * Environment variables prefixed with `APP`

//! The core of this module is the `Settings` struct. Stage durations are read leniently: anything that is not a
//! usable number of seconds is coerced to zero, which makes the matching transition instantaneous.

use serde::{Deserialize, Deserializer};
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use crate::errors::GarageDoorError;
use crate::models::{AccessoryInformation, PostOpenAction, TravelReporting};

/// Name used when the configuration leaves the door unnamed
pub const DEFAULT_DOOR_NAME: &str = "Dummy Garage";

/// Represents the complete set of configuration settings for the garage door simulator.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Settings for the simulated door
    #[serde(default)]
    pub door: DoorSettings,
    /// Settings for the last-known-state store
    #[serde(default)]
    pub persistence: PersistenceSettings,
    /// Settings for application logging
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// # Door Settings

/// The configuration of a single simulated garage door and its stage durations.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DoorSettings {
    /// The door's name; also the key its state is persisted under
    #[serde(default = "default_door_name")]
    pub name: String,
    /// Time spent travelling before an opening sequence settles OPEN
    #[serde(default, deserialize_with = "deserialize_lenient_seconds")]
    pub opening_state_duration: Duration,
    /// Time the door stays OPEN before the target reverts to CLOSED (zero disables)
    #[serde(default, deserialize_with = "deserialize_lenient_seconds")]
    pub open_state_duration: Duration,
    /// Time spent travelling before a closing sequence settles CLOSED
    #[serde(default, deserialize_with = "deserialize_lenient_seconds")]
    pub closing_state_duration: Duration,
    /// Time after settling OPEN before the door closes itself (zero disables)
    #[serde(default, deserialize_with = "deserialize_lenient_seconds")]
    pub auto_close_delay: Duration,
    /// Report OPENING / CLOSING while travelling instead of the state being left
    #[serde(default)]
    pub report_travel_states: bool,
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_firmware_revision")]
    pub firmware_revision: String,
}

impl Default for DoorSettings {
    fn default() -> Self {
        Self {
            name: default_door_name(),
            opening_state_duration: Duration::ZERO,
            open_state_duration: Duration::ZERO,
            closing_state_duration: Duration::ZERO,
            auto_close_delay: Duration::ZERO,
            report_travel_states: false,
            manufacturer: default_manufacturer(),
            model: default_model(),
            firmware_revision: default_firmware_revision(),
        }
    }
}

impl DoorSettings {
    /// Creates settings for a door with the given name and every duration at zero
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Resolves the post-open behaviour from the two mutually exclusive duration options
    ///
    /// When both are configured the auto-close delay wins.
    pub fn post_open_action(&self) -> PostOpenAction {
        match (self.open_state_duration.is_zero(), self.auto_close_delay.is_zero()) {
            (_, false) => {
                if !self.open_state_duration.is_zero() {
                    warn!(
                        "{}: both open_state_duration and auto_close_delay are set, using auto_close_delay",
                        self.name
                    );
                }
                PostOpenAction::AutoClose(self.auto_close_delay)
            }
            (false, true) => PostOpenAction::RevertTarget(self.open_state_duration),
            (true, true) => PostOpenAction::None,
        }
    }

    pub fn travel_reporting(&self) -> TravelReporting {
        if self.report_travel_states {
            TravelReporting::TravelStates
        } else {
            TravelReporting::SourceState
        }
    }

    pub fn accessory_information(&self) -> AccessoryInformation {
        AccessoryInformation::new(&self.name, &self.manufacturer, &self.model, &self.firmware_revision)
    }
}

/// Which backend keeps the last settled state
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    /// One JSON file per door under `path`
    #[default]
    File,
    /// In-process only; state is lost on restart
    Memory,
}

/// Holds the configuration settings for the last-known-state store
#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceSettings {
    #[serde(default)]
    pub backend: PersistenceBackend,
    /// The directory state files are written to
    #[serde(default = "default_persist_path")]
    pub path: PathBuf,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::default(),
            path: default_persist_path(),
        }
    }
}

/// Holds the configuration settings for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// The logging level (e.g., "info", "debug", "error")
    #[serde(default = "default_log_level")]
    pub level: String,
    /// The directory path where log files will be stored (optional)
    pub path: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            path: None,
        }
    }
}

/// # Settings Initialization
impl Settings {
    /// Loads and constructs the application settings from various configuration sources.
    ///
    /// Sources, in order of precedence:
    ///
    /// 1. `default.yaml`: Contains default settings for the application
    /// 2. Environment-specific YAML file (e.g., `development.yaml`) based on the `RUN_MODE` environment variable
    /// 3. Environment variables prefixed with `APP` (e.g., `APP__DOOR__NAME`)
    ///
    /// The `CONFIG_DIR` environment variable selects the directory holding the YAML files (defaults to "src/config").
    pub fn new() -> Result<Self, GarageDoorError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "src/config".into());
        debug!("Run Mode: {:?}, Config Dir: {:?}", run_mode, config_dir);

        Self::from_dir(Path::new(&config_dir), &run_mode)
    }

    /// Loads settings from `config_dir/default` and `config_dir/{run_mode}` plus the environment
    pub fn from_dir(config_dir: &Path, run_mode: &str) -> Result<Self, GarageDoorError> {
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/default", config_dir.display())))
            .add_source(File::with_name(&format!("{}/{}", config_dir.display(), run_mode)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        debug!("{:#?}", s);
        let mut s: Self = s.try_deserialize::<Settings>()
            .map_err(GarageDoorError::from)?;

        s.normalize()?;
        Ok(s)
    }

    fn normalize(&mut self) -> Result<(), GarageDoorError> {
        if self.door.name.trim().is_empty() {
            self.door.name = default_door_name();
        }

        let cwd = env::current_dir()?;
        if let Some(ref mut path) = self.logging.path {
            *path = cwd.join(path.clone());
        }
        self.persistence.path = cwd.join(&self.persistence.path);
        Ok(())
    }
}

fn default_door_name() -> String {
    DEFAULT_DOOR_NAME.to_string()
}

fn default_manufacturer() -> String {
    "github/rasod".to_string()
}

fn default_model() -> String {
    "Dummy Garage".to_string()
}

fn default_firmware_revision() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_persist_path() -> PathBuf {
    PathBuf::from("persist")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Any shape a seconds value may arrive in from YAML or the environment
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseSeconds {
    Int(i64),
    Float(f64),
    Flag(bool),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl LooseSeconds {
    fn seconds(&self) -> f64 {
        match self {
            LooseSeconds::Int(n) => *n as f64,
            LooseSeconds::Float(n) => *n,
            LooseSeconds::Flag(b) => f64::from(u8::from(*b)),
            LooseSeconds::Text(t) if t.trim().is_empty() => 0.0,
            LooseSeconds::Text(t) => t.trim().parse().unwrap_or(0.0),
            LooseSeconds::Other(_) => 0.0,
        }
    }
}

/// Converts a number of seconds into a `Duration`, coercing unusable values to zero
pub fn seconds_to_duration(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    } else {
        Duration::ZERO
    }
}

/// Deserializes a stage duration in seconds, coercing anything non-numeric to zero
fn deserialize_lenient_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
{
    let raw: Option<LooseSeconds> = Option::deserialize(deserializer)?;
    Ok(raw.map(|r| seconds_to_duration(r.seconds())).unwrap_or(Duration::ZERO))
}
