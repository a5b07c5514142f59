//! # SurfaceKit Probe
//!
//! Calibration scanning of a work surface.
//! - Hardware seams for the motion controller and the contact switch
//! - Operator confirmation and progress reporting collaborators
//! - Raster scanning with descend-until-contact probing and averaging

pub mod hardware;
pub mod parameters;
pub mod reporting;
pub mod scanner;

pub use hardware::{ContactSensor, MotionControl};
pub use parameters::ScanParameters;
pub use reporting::{
    AutoConfirm, ConfirmationGate, LogProgress, ProgressSink, SAFETY_WARNING, SET_ORIGIN_PROMPT,
};
pub use scanner::{CalibrationScanner, ProbeOutcome, BAD_SAMPLE_TOLERANCE};
