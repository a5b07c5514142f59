//! Height map persistence
//!
//! Completed scans are written as JSON so a toolpath can be contoured again
//! without rescanning. Files are named `height_map-<id>.json`, where `<id>` is
//! the first 8 hex digits of a random UUID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use surfacekit_core::{Error, HeightMap, Result};
use uuid::Uuid;

/// Height map file format version
const FILE_FORMAT_VERSION: &str = "1.0";

/// Persists and restores height maps
pub trait HeightMapStore {
    /// Persist `map` and return where it was written
    fn store(&self, map: &HeightMap) -> Result<PathBuf>;

    /// Restore the map identified by `reference`
    fn load(&self, reference: &Path) -> Result<HeightMap>;
}

/// Descriptive data stored next to a height map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightMapMetadata {
    /// When the map was written
    pub created_at: DateTime<Utc>,
    /// Number of scanned rows
    pub rows: usize,
    /// Samples per row
    pub columns: usize,
    /// Lowest measured height
    #[serde(default)]
    pub z_min: Option<f64>,
    /// Highest measured height
    #[serde(default)]
    pub z_max: Option<f64>,
}

impl HeightMapMetadata {
    /// Describe `map` as of now
    pub fn describe(map: &HeightMap) -> Self {
        let range = map.z_range();
        Self {
            created_at: Utc::now(),
            rows: map.row_count(),
            columns: map.column_count(),
            z_min: range.map(|(min, _)| min),
            z_max: range.map(|(_, max)| max),
        }
    }
}

/// On-disk height map document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightMapFile {
    /// File format version
    pub version: String,
    /// Grid summary and timestamp
    pub metadata: HeightMapMetadata,
    /// The samples
    pub height_map: HeightMap,
}

/// JSON height map store rooted at a cache directory
#[derive(Debug, Clone)]
pub struct FileHeightMapStore {
    directory: PathBuf,
}

impl FileHeightMapStore {
    /// Store files under `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Cache directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Generate a fresh file name
    pub fn new_file_name() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("height_map-{}.json", &id[..8])
    }

    /// Locate `reference` as given, then inside the cache directory
    pub fn resolve(&self, reference: &Path) -> Option<PathBuf> {
        [reference.to_path_buf(), self.directory.join(reference)]
            .into_iter()
            .find(|candidate| candidate.is_file())
    }
}

impl HeightMapStore for FileHeightMapStore {
    fn store(&self, map: &HeightMap) -> Result<PathBuf> {
        map.validate()?;
        fs::create_dir_all(&self.directory)?;

        let document = HeightMapFile {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: HeightMapMetadata::describe(map),
            height_map: map.clone(),
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| Error::other(format!("Failed to serialize height map: {}", e)))?;

        let path = self.directory.join(Self::new_file_name());
        fs::write(&path, json)?;
        tracing::info!("Wrote height map cache file to {}", path.display());
        Ok(path)
    }

    fn load(&self, reference: &Path) -> Result<HeightMap> {
        let path = self.resolve(reference).ok_or_else(|| {
            tracing::error!("Cannot find height map file {}", reference.display());
            Error::missing_file(reference)
        })?;

        let content = fs::read_to_string(&path)?;
        let document: HeightMapFile = serde_json::from_str(&content)
            .map_err(|e| Error::other(format!("Invalid height map file {}: {}", path.display(), e)))?;

        document.height_map.validate()?;
        tracing::info!(
            "Loaded {}x{} height map from {} (scanned {})",
            document.metadata.rows,
            document.metadata.columns,
            path.display(),
            document.metadata.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        Ok(document.height_map)
    }
}
