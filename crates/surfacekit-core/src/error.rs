//! Error handling for SurfaceKit
//!
//! Provides error types for each layer of the system:
//! - Protocol errors (motion controller link)
//! - Calibration errors (grid scanning)
//! - Height map errors (grid completeness)
//! - Toolpath errors (G-code parsing and file handling)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Protocol error type
///
/// Represents failures of the request/response exchange with a motion
/// controller.
#[derive(Error, Debug, Clone)]
pub enum ProtocolError {
    /// The acknowledgement sentinel was not observed in time
    #[error("No acknowledgement for '{command}' after {timeout_ms}ms")]
    Timeout {
        /// The command that went unacknowledged.
        command: String,
        /// The time waited per attempt in milliseconds.
        timeout_ms: u64,
    },

    /// A response line could not be interpreted
    #[error("Malformed response: {line:?}")]
    MalformedResponse {
        /// The offending line.
        line: String,
    },

    /// Transport level failure
    #[error("Link I/O error: {reason}")]
    Io {
        /// The reason reported by the transport.
        reason: String,
    },
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        ProtocolError::Io {
            reason: err.to_string(),
        }
    }
}

/// Calibration error type
///
/// Represents errors raised while scanning the work surface.
#[derive(Error, Debug, Clone)]
pub enum CalibrationError {
    /// Scan parameters cannot describe a grid
    #[error("Invalid scan parameters: {reason}")]
    InvalidParameters {
        /// The reason the parameters were rejected.
        reason: String,
    },

    /// A grid point could not be probed within the configured bounds
    #[error("Calibration failed at X{x:.3} Y{y:.3}: {reason}")]
    CalibrationFailed {
        /// X coordinate of the grid point.
        x: f64,
        /// Y coordinate of the grid point.
        y: f64,
        /// What bound was exceeded.
        reason: String,
    },

    /// The operator declined to start the scan
    #[error("Scan aborted by operator")]
    Aborted,
}

/// Height map error type
///
/// A height map that fails these checks must not be used for contouring.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeightMapError {
    /// Not enough samples to interpolate between
    #[error("Height map has {count} samples, at least 2 are required")]
    TooFewSamples {
        /// The number of samples present.
        count: usize,
    },

    /// Rows differ in length, so the scan did not complete
    #[error("Height map row {row} has {found} samples, expected {expected}")]
    RaggedRows {
        /// Index of the first short or long row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
}

/// Toolpath error type
///
/// Represents errors related to reading and writing toolpath programs.
#[derive(Error, Debug, Clone)]
pub enum ToolpathError {
    /// A coordinate word did not contain a number
    #[error("Invalid number '{token}' at line {line_number}")]
    InvalidNumber {
        /// The 1-based source line number.
        line_number: usize,
        /// The token that failed to parse.
        token: String,
    },

    /// Writing the output program failed
    #[error("Failed to write {path}: {reason}")]
    WriteFailed {
        /// The destination path.
        path: PathBuf,
        /// The underlying reason.
        reason: String,
    },
}

/// Main error type for SurfaceKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Protocol error
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Calibration error
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// Height map error
    #[error(transparent)]
    HeightMap(#[from] HeightMapError),

    /// Toolpath error
    #[error(transparent)]
    Toolpath(#[from] ToolpathError),

    /// A toolpath or height map file does not exist
    #[error("Source file not found: {}", path.display())]
    MissingSourceFile {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Create a missing file error
    pub fn missing_file(path: impl Into<PathBuf>) -> Self {
        Error::MissingSourceFile { path: path.into() }
    }

    /// Check if this is a protocol timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Protocol(ProtocolError::Timeout { .. }))
    }

    /// Check if this error leaves the height map unusable
    pub fn is_height_map_error(&self) -> bool {
        matches!(self, Error::HeightMap(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = ProtocolError::Timeout {
            command: "M114".to_string(),
            timeout_ms: 500,
        };
        assert_eq!(err.to_string(), "No acknowledgement for 'M114' after 500ms");
        assert!(Error::from(err).is_timeout());
    }

    #[test]
    fn test_height_map_error_display() {
        let err = HeightMapError::RaggedRows {
            row: 2,
            expected: 6,
            found: 3,
        };
        assert_eq!(err.to_string(), "Height map row 2 has 3 samples, expected 6");

        let err = HeightMapError::TooFewSamples { count: 1 };
        assert!(Error::from(err).is_height_map_error());
    }

    #[test]
    fn test_missing_file_display() {
        let err = Error::missing_file("/tmp/none.gcode");
        assert_eq!(err.to_string(), "Source file not found: /tmp/none.gcode");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: ProtocolError = io_err.into();
        assert!(matches!(err, ProtocolError::Io { .. }));
    }
}
