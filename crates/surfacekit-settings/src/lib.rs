//! SurfaceKit Settings Crate
//!
//! Handles tool configuration and height map persistence.

pub mod config;
pub mod store;

pub use config::{CacheSettings, Config, ConnectionSettings, ContourSettings, ScanSettings};
pub use store::{FileHeightMapStore, HeightMapFile, HeightMapMetadata, HeightMapStore};
