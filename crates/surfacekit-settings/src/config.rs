//! Configuration for SurfaceKit
//!
//! Supports JSON and TOML files, chosen by extension. Sections:
//! - Connection settings (ports, baud rates, acknowledgement timing)
//! - Scan settings (grid, averaging, probing motion)
//! - Contour settings
//! - Height map cache

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use surfacekit_communication::{ConnectionParams, LinkConfig};
use surfacekit_core::{CalibrationError, Error, Result};
use surfacekit_probe::ScanParameters;

/// Serial connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Port of the motion controller
    pub cnc_port: String,
    /// Baud rate of the motion controller
    pub cnc_baud_rate: u32,
    /// Port of the contact switch
    pub switch_port: String,
    /// Baud rate of the contact switch
    pub switch_baud_rate: u32,
    /// Acknowledgement timeout in milliseconds, 0 waits forever
    pub ack_timeout_ms: u64,
    /// Resends of retry-safe commands after a timeout
    pub ack_retries: u32,
    /// Base delay before a resend in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            cnc_port: String::new(),
            cnc_baud_rate: 115200,
            switch_port: String::new(),
            switch_baud_rate: 9600,
            ack_timeout_ms: 60_000,
            ack_retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

impl ConnectionSettings {
    /// Serial parameters for the motion controller
    pub fn cnc_params(&self) -> ConnectionParams {
        ConnectionParams::serial(self.cnc_port.clone(), self.cnc_baud_rate)
    }

    /// Serial parameters for the contact switch
    pub fn switch_params(&self) -> ConnectionParams {
        ConnectionParams::serial(self.switch_port.clone(), self.switch_baud_rate)
    }

    /// Acknowledgement policy for the motion link
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            ack_timeout: (self.ack_timeout_ms > 0).then(|| Duration::from_millis(self.ack_timeout_ms)),
            ack_retries: self.ack_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            ..LinkConfig::default()
        }
    }
}

/// Calibration scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// X width to calibrate across (mm); must be set before scanning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_dim: Option<f64>,
    /// Y width to calibrate across (mm); must be set before scanning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_dim: Option<f64>,
    /// Subsections along X
    pub x_divisions: u32,
    /// Subsections along Y
    pub y_divisions: u32,
    /// Readings averaged per point
    pub averages: u32,
    /// Contact wait per descent step (ms)
    pub step_delay_ms: u64,
    /// Pause after positioning over a point (ms)
    pub settle_delay_ms: u64,
    /// Pause before each row (ms)
    pub row_delay_ms: u64,
    /// Absolute travel height (mm)
    pub travel_z: f64,
    /// Relative lift after the last row (mm)
    pub clearance_lift: f64,
    /// Descent step (mm)
    pub step_down: f64,
    /// Descent steps per probe before failing, 0 descends until contact
    pub max_descent_steps: u32,
    /// Rejected readings per point before failing, 0 retries forever
    pub max_rejected_samples: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        let params = ScanParameters::default();
        Self {
            x_dim: None,
            y_dim: None,
            x_divisions: params.x_divisions,
            y_divisions: params.y_divisions,
            averages: params.averages,
            step_delay_ms: params.step_delay.as_millis() as u64,
            settle_delay_ms: params.settle_delay.as_millis() as u64,
            row_delay_ms: params.row_delay.as_millis() as u64,
            travel_z: params.travel_z,
            clearance_lift: params.clearance_lift,
            step_down: params.step_down,
            max_descent_steps: params.max_descent_steps.unwrap_or(0),
            max_rejected_samples: params.max_rejected_samples.unwrap_or(0),
        }
    }
}

impl ScanSettings {
    /// Scan parameters described by these settings
    ///
    /// Unset dimensions count as zero; use [`ScanSettings::scan_parameters`]
    /// before driving the machine.
    pub fn to_parameters(&self) -> ScanParameters {
        ScanParameters {
            width: self.x_dim.unwrap_or_default(),
            height: self.y_dim.unwrap_or_default(),
            x_divisions: self.x_divisions,
            y_divisions: self.y_divisions,
            averages: self.averages,
            step_delay: Duration::from_millis(self.step_delay_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            row_delay: Duration::from_millis(self.row_delay_ms),
            travel_z: self.travel_z,
            clearance_lift: self.clearance_lift,
            step_down: self.step_down,
            max_descent_steps: (self.max_descent_steps > 0).then_some(self.max_descent_steps),
            max_rejected_samples: (self.max_rejected_samples > 0)
                .then_some(self.max_rejected_samples),
        }
    }

    /// Validated parameters for a scan
    ///
    /// Both dimensions must have been given explicitly.
    pub fn scan_parameters(&self) -> Result<ScanParameters> {
        if self.x_dim.is_none() || self.y_dim.is_none() {
            return Err(CalibrationError::InvalidParameters {
                reason: "x_dim and y_dim must be set to scan".to_string(),
            }
            .into());
        }
        let params = self.to_parameters();
        params.validate()?;
        Ok(params)
    }
}

/// Contouring settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourSettings {
    /// Depth to carve below the surface (mm); the sign is ignored
    pub target_depth: f64,
}

impl Default for ContourSettings {
    fn default() -> Self {
        Self { target_depth: 0.1 }
    }
}

/// Height map cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Store completed scans
    pub enabled: bool,
    /// Directory holding cached height maps
    pub directory: PathBuf,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("height_map_cache"),
        }
    }
}

/// Complete tool configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionSettings,
    /// Scan settings
    pub scan: ScanSettings,
    /// Contour settings
    pub contour: ContourSettings,
    /// Cache settings
    pub cache: CacheSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("surfacekit").join("config.toml"))
    }

    /// Load the config at `path`, or the default location when it exists
    ///
    /// Falls back to defaults when no path is given and the default file is
    /// absent.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match Self::default_path().filter(|path| path.is_file()) {
                Some(path) => Self::load_from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::missing_file(path));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::other(format!("Failed to read config file: {}", e)))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid JSON config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid TOML config: {}", e)))?
        } else {
            return Err(Error::other("Config file must be .json or .toml"));
        };

        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else {
            return Err(Error::other("Config file must be .json or .toml"));
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| Error::other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.connection.cnc_baud_rate == 0 || self.connection.switch_baud_rate == 0 {
            return Err(Error::other("Baud rate must be > 0"));
        }

        self.scan.to_parameters().validate()?;

        if !self.contour.target_depth.is_finite() {
            return Err(Error::other("Target depth must be a number"));
        }

        if self.cache.enabled && self.cache.directory.as_os_str().is_empty() {
            return Err(Error::other("Cache directory must be set when caching is enabled"));
        }

        Ok(())
    }
}
