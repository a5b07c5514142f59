//! Calibration scanner
//!
//! Raster scans the work area from the origin. Rows run along X in
//! increasing Y. At every grid point the tool is lowered in fixed steps
//! until the contact switch fires, and the reported height is recorded.
//!
//! A reading equal to the travel height means the switch fired before the
//! tool descended. Such readings are rejected and the point is probed again
//! without counting towards the averages.

use crate::hardware::{ContactSensor, MotionControl};
use crate::parameters::ScanParameters;
use crate::reporting::{ConfirmationGate, ProgressSink, SAFETY_WARNING, SET_ORIGIN_PROMPT};
use std::thread;
use std::time::Duration;
use surfacekit_communication::MoveTarget;
use surfacekit_core::{CalibrationError, CalibrationSample, HeightMap, HeightPoint, Result};

/// Readings within this distance of the travel height are rejected
pub const BAD_SAMPLE_TOLERANCE: f64 = 1e-6;

/// Result of a single probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    /// Contact after descending; the measured height
    Accepted(f64),
    /// Contact reported at travel height
    Rejected(f64),
}

/// Drives the motion controller and contact switch through a scan
pub struct CalibrationScanner<M, S> {
    motion: M,
    sensor: S,
    params: ScanParameters,
}

impl<M: MotionControl, S: ContactSensor> CalibrationScanner<M, S> {
    /// Create a scanner after validating `params`
    pub fn new(motion: M, sensor: S, params: ScanParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            motion,
            sensor,
            params,
        })
    }

    /// Scan parameters in use
    pub fn params(&self) -> &ScanParameters {
        &self.params
    }

    /// Release the hardware
    pub fn into_parts(self) -> (M, S) {
        (self.motion, self.sensor)
    }

    /// Confirm with the operator, then scan the full grid
    pub fn scan(
        &mut self,
        gate: &mut dyn ConfirmationGate,
        progress: &mut dyn ProgressSink,
    ) -> Result<HeightMap> {
        if !gate.confirm(SAFETY_WARNING) || !gate.confirm(SET_ORIGIN_PROMPT) {
            tracing::warn!("Scan declined by operator");
            return Err(CalibrationError::Aborted.into());
        }

        let p = self.params.clone();
        let total = p.total_readings();
        let mut completed = 0;

        tracing::info!(
            "Starting scan of {:.3}x{:.3} mm, {}x{} points, {} reading(s) each",
            p.width,
            p.height,
            p.x_divisions + 1,
            p.y_divisions + 1,
            p.averages
        );
        progress.report(completed, total);

        self.motion
            .move_axes(MoveTarget::xyz(0.0, 0.0, p.travel_z), false)?;

        let mut map = HeightMap::new();
        for j in 0..=p.y_divisions {
            let y = p.row_y(j);
            pause(p.row_delay);

            let mut row = Vec::with_capacity(p.x_divisions as usize + 1);
            for i in 0..=p.x_divisions {
                let x = p.column_x(i);
                let point = self.sample_point(x, y, &mut |accepted| {
                    completed += accepted;
                    progress.report(completed, total);
                })?;
                row.push(point);
            }
            map.push_row(row);
            tracing::info!("Row {}/{} complete (Y{:.3})", j + 1, p.y_divisions + 1, y);

            if j == p.y_divisions {
                self.motion
                    .move_axes(MoveTarget::none().with_z(p.clearance_lift), true)?;
            } else {
                self.motion
                    .move_axes(MoveTarget::none().with_z(p.travel_z), false)?;
                self.motion
                    .move_axes(MoveTarget::none().with_x(0.0).with_y(p.row_y(j + 1)), false)?;
            }
        }

        tracing::info!("Scan complete: {} samples", map.len());
        Ok(map)
    }

    /// Collect the averaged height at one grid point
    ///
    /// `on_accepted` is called with 1 for every accepted reading.
    fn sample_point(
        &mut self,
        x: f64,
        y: f64,
        on_accepted: &mut dyn FnMut(usize),
    ) -> Result<HeightPoint> {
        let mut sample = CalibrationSample::new(x, y);
        let mut rejected = 0u32;

        while sample.reading_count() < self.params.averages as usize {
            match self.probe(x, y)? {
                ProbeOutcome::Accepted(z) => {
                    sample.push_reading(z);
                    on_accepted(1);
                }
                ProbeOutcome::Rejected(z) => {
                    rejected += 1;
                    tracing::warn!(
                        "Bad calibration at X{:.3} Y{:.3} (Z{:.3}), retrying",
                        x,
                        y,
                        z
                    );
                    if self
                        .params
                        .max_rejected_samples
                        .is_some_and(|limit| rejected > limit)
                    {
                        return Err(CalibrationError::CalibrationFailed {
                            x,
                            y,
                            reason: format!("{} readings rejected at travel height", rejected),
                        }
                        .into());
                    }
                }
            }
        }

        sample.to_point().ok_or_else(|| {
            CalibrationError::CalibrationFailed {
                x,
                y,
                reason: "no accepted readings".to_string(),
            }
            .into()
        })
    }

    /// Probe once at column `x` of the current row
    ///
    /// Positions at travel height, then steps down until contact.
    pub fn probe(&mut self, x: f64, y: f64) -> Result<ProbeOutcome> {
        let p = &self.params;
        self.motion
            .move_axes(MoveTarget::none().with_x(x).with_z(p.travel_z), false)?;
        pause(p.settle_delay);

        let mut steps = 0u32;
        while !self.sensor.wait_for_contact(p.step_delay)? {
            if p.max_descent_steps.is_some_and(|limit| steps >= limit) {
                tracing::error!("No contact at X{:.3} Y{:.3} after {} steps", x, y, steps);
                return Err(CalibrationError::CalibrationFailed {
                    x,
                    y,
                    reason: format!(
                        "no contact after descending {:.3} mm",
                        steps as f64 * p.step_down
                    ),
                }
                .into());
            }
            self.motion
                .move_axes(MoveTarget::none().with_z(-p.step_down), true)?;
            steps += 1;
        }

        let (_, _, z) = self.motion.position()?;
        tracing::debug!("Contact at X{:.3} Y{:.3} Z{:.3} after {} steps", x, y, z, steps);

        if (z - p.travel_z).abs() < BAD_SAMPLE_TOLERANCE {
            Ok(ProbeOutcome::Rejected(z))
        } else {
            Ok(ProbeOutcome::Accepted(z))
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
