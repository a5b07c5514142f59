//! # SurfaceKit
//!
//! Surface height mapping and toolpath contouring for CNC machines without a
//! bed-leveling probe:
//! - Raster scans the work surface with a contact switch to build a height map
//! - Rewrites the cutting depths of a G-code program to follow that surface
//!
//! ## Architecture
//!
//! SurfaceKit is organized as a workspace with multiple crates:
//!
//! 1. **surfacekit-core** - Error types and the height map data model
//! 2. **surfacekit-communication** - Serial ports, motion controller and switch links
//! 3. **surfacekit-gcode** - Toolpath parsing, serialization and contouring
//! 4. **surfacekit-probe** - Calibration scanning
//! 5. **surfacekit-settings** - Configuration and height map cache
//! 6. **surfacekit** - Pipeline helpers and the command line tool

pub mod app;

pub use app::{
    contour_file, default_output_path, obtain_height_map, open_scanner, scan_and_cache,
    HeightMapSource,
};

pub use surfacekit_communication::{list_ports, MotionLink, SerialPortInfo, SwitchLink};
pub use surfacekit_core::{
    CalibrationError, Error, HeightMap, HeightMapError, HeightPoint, ProtocolError, Result,
    ToolpathError,
};
pub use surfacekit_gcode::{ContourSummary, Contourer, MoveKind, ToolpathMove, ToolpathProgram};
pub use surfacekit_probe::{
    AutoConfirm, CalibrationScanner, ConfirmationGate, LogProgress, ProgressSink, ScanParameters,
};
pub use surfacekit_settings::{Config, FileHeightMapStore, HeightMapStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, keeping stdout for command results
/// - RUST_LOG environment variable support, `default_level` otherwise
/// - Target, thread and line information on every event
pub fn init_logging(default_level: tracing::Level) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
