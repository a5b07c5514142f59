//! # SurfaceKit Core
//!
//! Core types and error handling shared by all SurfaceKit crates.
//! Provides the height map data model and the unified error type.

pub mod error;
pub mod height_map;

pub use error::{
    CalibrationError, Error, HeightMapError, ProtocolError, Result, ToolpathError,
};
pub use height_map::{CalibrationSample, HeightMap, HeightPoint};
