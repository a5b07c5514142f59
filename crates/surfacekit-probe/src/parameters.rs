//! Calibration scan parameters
//!
//! Grid extent and divisions, probing motion and the bounds that stop a scan
//! which would otherwise never finish.

use std::time::Duration;
use surfacekit_core::CalibrationError;

/// Parameters for a calibration scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanParameters {
    /// X extent of the scanned area from the work origin (mm)
    pub width: f64,
    /// Y extent of the scanned area from the work origin (mm)
    pub height: f64,
    /// Intervals along X; a row has `x_divisions + 1` samples
    pub x_divisions: u32,
    /// Intervals along Y; the map has `y_divisions + 1` rows
    pub y_divisions: u32,
    /// Accepted readings averaged per grid point
    pub averages: u32,
    /// Contact wait after each descent step
    pub step_delay: Duration,
    /// Pause after positioning, before probing starts
    pub settle_delay: Duration,
    /// Pause before each row
    pub row_delay: Duration,
    /// Absolute Z used for positioning between probes (mm)
    pub travel_z: f64,
    /// Relative lift after the final row (mm)
    pub clearance_lift: f64,
    /// Size of one descent step (mm)
    pub step_down: f64,
    /// Descent steps allowed per probe. `None` descends until contact.
    pub max_descent_steps: Option<u32>,
    /// Rejected readings allowed per grid point. `None` retries forever.
    pub max_rejected_samples: Option<u32>,
}

impl Default for ScanParameters {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            x_divisions: 5,
            y_divisions: 5,
            averages: 1,
            step_delay: Duration::from_millis(500),
            settle_delay: Duration::from_millis(200),
            row_delay: Duration::from_millis(500),
            travel_z: 1.0,
            clearance_lift: 15.0,
            step_down: 0.1,
            max_descent_steps: Some(200),
            max_rejected_samples: Some(10),
        }
    }
}

impl ScanParameters {
    /// Default parameters over a `width` x `height` area
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Check that the parameters describe a scannable grid
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let invalid = |reason: &str| {
            Err(CalibrationError::InvalidParameters {
                reason: reason.to_string(),
            })
        };

        if !(self.width.is_finite() && self.width >= 0.0) {
            return invalid("width must be a non-negative number");
        }
        if !(self.height.is_finite() && self.height >= 0.0) {
            return invalid("height must be a non-negative number");
        }
        if self.x_divisions == 0 || self.y_divisions == 0 {
            return invalid("divisions must be at least 1");
        }
        if self.averages == 0 {
            return invalid("averages must be at least 1");
        }
        if !(self.step_down.is_finite() && self.step_down > 0.0) {
            return invalid("step down must be positive");
        }
        if !self.travel_z.is_finite() || !self.clearance_lift.is_finite() {
            return invalid("travel heights must be finite");
        }
        Ok(())
    }

    /// Spacing between columns
    pub fn dx(&self) -> f64 {
        self.width / self.x_divisions as f64
    }

    /// Spacing between rows
    pub fn dy(&self) -> f64 {
        self.height / self.y_divisions as f64
    }

    /// X of column `i`
    pub fn column_x(&self, i: u32) -> f64 {
        i as f64 * self.dx()
    }

    /// Y of row `j`
    pub fn row_y(&self, j: u32) -> f64 {
        j as f64 * self.dy()
    }

    /// Grid points in the scan
    pub fn point_count(&self) -> usize {
        (self.x_divisions as usize + 1) * (self.y_divisions as usize + 1)
    }

    /// Accepted readings needed to finish the scan
    pub fn total_readings(&self) -> usize {
        self.point_count() * self.averages as usize
    }
}
