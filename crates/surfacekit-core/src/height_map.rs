//! Height map data model
//!
//! A height map is the grid of surface heights measured by a calibration
//! scan. Rows are stored in scan order (increasing Y, then increasing X
//! within a row), but consumers treat the samples as a scattered point set.

use crate::error::HeightMapError;
use serde::{Deserialize, Serialize};

/// A single measured surface height in machine millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightPoint {
    /// X coordinate of the grid point
    pub x: f64,
    /// Y coordinate of the grid point
    pub y: f64,
    /// Measured surface height
    pub z: f64,
}

impl HeightPoint {
    /// Create a new height point
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<(f64, f64, f64)> for HeightPoint {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

/// Repeated probe readings taken at one grid point
///
/// Only accepted readings are pushed; the averaged result becomes one
/// [`HeightPoint`] of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSample {
    x: f64,
    y: f64,
    readings: Vec<f64>,
}

impl CalibrationSample {
    /// Start collecting readings for a grid point
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            readings: Vec::new(),
        }
    }

    /// Record an accepted z reading
    pub fn push_reading(&mut self, z: f64) {
        self.readings.push(z);
    }

    /// Number of accepted readings
    pub fn reading_count(&self) -> usize {
        self.readings.len()
    }

    /// Arithmetic mean of the accepted readings, if any
    pub fn mean_z(&self) -> Option<f64> {
        if self.readings.is_empty() {
            return None;
        }
        Some(self.readings.iter().sum::<f64>() / self.readings.len() as f64)
    }

    /// Collapse the readings into a height point
    pub fn to_point(&self) -> Option<HeightPoint> {
        self.mean_z().map(|z| HeightPoint::new(self.x, self.y, z))
    }
}

/// Grid of measured surface heights
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeightMap {
    rows: Vec<Vec<HeightPoint>>,
}

impl HeightMap {
    /// Create an empty height map
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a height map from pre-assembled rows
    pub fn from_rows(rows: Vec<Vec<HeightPoint>>) -> Self {
        Self { rows }
    }

    /// Append a completed row
    pub fn push_row(&mut self, row: Vec<HeightPoint>) {
        self.rows.push(row);
    }

    /// Rows in scan order
    pub fn rows(&self) -> &[Vec<HeightPoint>] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of samples in the first row
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Total number of samples
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Check if the map holds no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all samples, flattened in scan order
    pub fn points(&self) -> impl Iterator<Item = &HeightPoint> {
        self.rows.iter().flatten()
    }

    /// Lowest and highest measured z, if the map is not empty
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.points().fold(None, |range, p| match range {
            None => Some((p.z, p.z)),
            Some((lo, hi)) => Some((lo.min(p.z), hi.max(p.z))),
        })
    }

    /// Check that the map is a complete rectangular grid usable for contouring
    pub fn validate(&self) -> Result<(), HeightMapError> {
        let count = self.len();
        if count < 2 {
            return Err(HeightMapError::TooFewSamples { count });
        }

        let expected = self.column_count();
        if let Some((row, found)) = self
            .rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != expected)
        {
            tracing::warn!("Rejecting ragged height map at row {}", row);
            return Err(HeightMapError::RaggedRows {
                row,
                expected,
                found,
            });
        }

        Ok(())
    }
}

impl From<Vec<Vec<(f64, f64, f64)>>> for HeightMap {
    fn from(rows: Vec<Vec<(f64, f64, f64)>>) -> Self {
        Self::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(HeightPoint::from).collect())
                .collect(),
        )
    }
}
