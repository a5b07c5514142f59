//! Scan and contour pipeline
//!
//! Connects the crates: open the links, scan or load a height map, then
//! contour a toolpath file against it. The output file is only written once
//! contouring has succeeded.

use std::path::{Path, PathBuf};
use surfacekit_communication::{MotionLink, RealSerialPort, SwitchLink};
use surfacekit_core::{HeightMap, Result};
use surfacekit_gcode::{Contourer, ToolpathProgram};
use surfacekit_probe::{CalibrationScanner, ConfirmationGate, ProgressSink};
use surfacekit_settings::{Config, FileHeightMapStore, HeightMapStore};

/// Scanner bound to the serial links
pub type SerialScanner = CalibrationScanner<MotionLink<RealSerialPort>, SwitchLink<RealSerialPort>>;

/// Where a height map comes from
#[derive(Debug, Clone, PartialEq)]
pub enum HeightMapSource {
    /// Scan the surface now
    Scan,
    /// Load a cached map by path or cache file name
    Load(PathBuf),
}

/// Contoured output path for `input`: the input name with `.cgcode` appended
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".cgcode");
    PathBuf::from(name)
}

/// Open both serial links and build a scanner from `config`
pub fn open_scanner(config: &Config) -> Result<SerialScanner> {
    let params = config.scan.scan_parameters()?;
    let connection = &config.connection;

    let cnc_port = RealSerialPort::open(&connection.cnc_params())?;
    let switch_port = RealSerialPort::open(&connection.switch_params())?;

    let motion = MotionLink::with_config(cnc_port, connection.link_config());
    let sensor = SwitchLink::new(switch_port);
    CalibrationScanner::new(motion, sensor, params)
}

/// Scan with the serial hardware and cache the result when enabled
pub fn scan_and_cache(
    config: &Config,
    gate: &mut dyn ConfirmationGate,
    progress: &mut dyn ProgressSink,
) -> Result<HeightMap> {
    let mut scanner = open_scanner(config)?;
    let map = scanner.scan(gate, progress)?;

    if config.cache.enabled {
        FileHeightMapStore::new(&config.cache.directory).store(&map)?;
    }
    Ok(map)
}

/// Scan or load a height map as selected by `source`
pub fn obtain_height_map(
    config: &Config,
    source: &HeightMapSource,
    gate: &mut dyn ConfirmationGate,
    progress: &mut dyn ProgressSink,
) -> Result<HeightMap> {
    match source {
        HeightMapSource::Scan => scan_and_cache(config, gate, progress),
        HeightMapSource::Load(reference) => {
            FileHeightMapStore::new(&config.cache.directory).load(reference)
        }
    }
}

/// Contour the toolpath at `input` and write it to `output`
///
/// `output` defaults to [`default_output_path`]. Returns the path written.
pub fn contour_file(
    map: &HeightMap,
    input: &Path,
    output: Option<&Path>,
    target_depth: f64,
) -> Result<PathBuf> {
    let contourer = Contourer::new(map)?;
    let mut program = ToolpathProgram::from_file(input)?;
    contourer.contour_in_place(&mut program, target_depth);

    let output = output.map_or_else(|| default_output_path(input), Path::to_path_buf);
    program.write_to_file(&output)?;
    Ok(output)
}
