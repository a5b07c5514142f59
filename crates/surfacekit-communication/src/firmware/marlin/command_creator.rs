//! Marlin Command Creator
//!
//! Builds the G-code lines sent to the motion controller.

use std::fmt;

/// Distance mode of the controller (G90/G91)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMode {
    /// Absolute positioning (G90)
    Absolute,
    /// Relative positioning (G91)
    Relative,
}

impl DistanceMode {
    /// Mode for a `relative` flag
    pub fn from_relative(relative: bool) -> Self {
        if relative {
            Self::Relative
        } else {
            Self::Absolute
        }
    }

    /// G-code word selecting this mode
    pub fn as_gcode(&self) -> &'static str {
        match self {
            Self::Absolute => "G90",
            Self::Relative => "G91",
        }
    }
}

/// Axis targets of a move; unset axes are left out of the command
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveTarget {
    /// X target or offset
    pub x: Option<f64>,
    /// Y target or offset
    pub y: Option<f64>,
    /// Z target or offset
    pub z: Option<f64>,
}

impl MoveTarget {
    /// Target with no axes set
    pub fn none() -> Self {
        Self::default()
    }

    /// Target on all three axes
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Set the X axis
    pub fn with_x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    /// Set the Y axis
    pub fn with_y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    /// Set the Z axis
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    /// Check if no axis is set
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

/// Commands understood by the motion controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    /// Run the homing cycle (G28)
    Home,
    /// Switch distance mode (G90/G91)
    SetDistanceMode(DistanceMode),
    /// Rapid move (G0) interpreted in the current distance mode
    RapidMove(MoveTarget),
    /// Report the current position (M114)
    ReportPosition,
    /// Make the current position the work origin (G92)
    ZeroWorkOffsets,
}

impl MotionCommand {
    /// Newline terminated line to transmit
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }

    /// Whether resending after a lost acknowledgement cannot move the
    /// machine further than intended
    pub fn is_retry_safe(&self, mode: DistanceMode) -> bool {
        match self {
            Self::RapidMove(_) => mode == DistanceMode::Absolute,
            _ => true,
        }
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "G28"),
            Self::SetDistanceMode(mode) => write!(f, "{}", mode.as_gcode()),
            Self::RapidMove(target) => {
                write!(f, "G0")?;
                for (letter, value) in [('X', target.x), ('Y', target.y), ('Z', target.z)] {
                    if let Some(value) = value {
                        write!(f, " {}{:+}", letter, value)?;
                    }
                }
                Ok(())
            }
            Self::ReportPosition => write!(f, "M114"),
            Self::ZeroWorkOffsets => write!(f, "G92 X0 Y0 Z0"),
        }
    }
}
