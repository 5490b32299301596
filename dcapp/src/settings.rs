use serde::Deserialize;
use std::io;
use std::path::Path;
use thiserror::Error;

use accel_rs::constants::DEFAULT_SAMPLING_PERIOD_MILLIS;
use broadcast_rs::constants::CONNECTION_DELAY_MILLIS;

use crate::cli::{Args, SourceKind};

/// Represents all possible errors loading [Settings]
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Contents of the YAML settings file. Every field is optional.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SettingsFile {
    pub broker_address: Option<String>,
    pub rate: Option<usize>,
    pub device_id: Option<String>,
    pub source: Option<SourceKind>,
    pub iio_device: Option<String>,
    pub sampling_period_millis: Option<u64>,
    pub restart_delay_millis: Option<u64>,
    pub mock_noise: Option<bool>,
}

impl SettingsFile {
    pub fn from_yaml(content: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, SettingsError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }
}

/// Effective settings: command line over settings file over defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub broker_address: Option<String>,
    pub rate: usize,
    pub device_id: Option<String>,
    pub source: SourceKind,
    pub iio_device: Option<String>,
    pub sampling_period_millis: u64,
    pub restart_delay_millis: u64,
    pub mock_noise: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            broker_address: None,
            rate: 0,
            device_id: None,
            source: SourceKind::default(),
            iio_device: None,
            sampling_period_millis: DEFAULT_SAMPLING_PERIOD_MILLIS,
            restart_delay_millis: CONNECTION_DELAY_MILLIS,
            mock_noise: false,
        }
    }
}

impl Settings {
    /// Loads the settings file named by `args`, if any, and applies the command line on top
    pub fn load(args: &Args) -> Result<Self, SettingsError> {
        let file = match &args.config {
            Some(path) => {
                log::debug!("Loading settings from {}", path.display());
                SettingsFile::from_yaml_file(path)?
            }
            None => SettingsFile::default(),
        };
        Self::resolve(args, file)
    }

    pub fn resolve(args: &Args, file: SettingsFile) -> Result<Self, SettingsError> {
        let defaults = Settings::default();
        let settings = Self {
            broker_address: args.broker.clone().or(file.broker_address),
            rate: args.rate.or(file.rate).unwrap_or(defaults.rate),
            device_id: args.device_id.clone().or(file.device_id),
            source: args.source.or(file.source).unwrap_or(defaults.source),
            iio_device: args.iio_device.clone().or(file.iio_device),
            sampling_period_millis: args
                .sampling_period_ms
                .or(file.sampling_period_millis)
                .unwrap_or(defaults.sampling_period_millis),
            restart_delay_millis: args
                .restart_delay_ms
                .or(file.restart_delay_millis)
                .unwrap_or(defaults.restart_delay_millis),
            mock_noise: args.mock_noise || file.mock_noise.unwrap_or(defaults.mock_noise),
        };

        if settings.sampling_period_millis == 0 {
            return Err(SettingsError::Invalid(
                "sampling period must be greater than 0".to_string(),
            ));
        }
        Ok(settings)
    }
}
