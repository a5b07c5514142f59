//! # SurfaceKit G-Code
//!
//! Toolpath programs and surface contouring.
//! - Line-oriented G-code parsing and serialization (G0/G1 with X, Y, Z, F)
//! - Classification of moves into travel, dive, cut and other shapes
//! - Nearest-neighbour contouring of cut depths against a height map

pub mod contour;
pub mod moves;
pub mod program;

pub use contour::{interpolate_offset, normalize_depth, ContourSummary, Contourer};
pub use moves::{MoveCommand, MoveKind, MoveWords, ToolpathMove};
pub use program::ToolpathProgram;
