//! Toolpath move records
//!
//! Each source line becomes one [`ToolpathMove`]. The move's shape is decided
//! once, when the line is parsed:
//! - `Travel`: rapid move with only a non-negative Z (tool raised)
//! - `Dive`: linear move with only a negative Z (plunge into material)
//! - `Cut`: linear move with both X and Y set
//! - `Other`: anything else, passed through untouched

use std::fmt;
use surfacekit_core::ToolpathError;

/// Command token of a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveCommand {
    /// Rapid travel (G0 / G00)
    RapidTravel,
    /// Linear cut (G1 / G01)
    LinearCut,
    /// Any other command token, kept verbatim
    Other(String),
}

impl MoveCommand {
    /// Interpret a command token
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "G0" | "G00" => Self::RapidTravel,
            "G1" | "G01" => Self::LinearCut,
            _ => Self::Other(token.to_string()),
        }
    }

    /// Token emitted on output
    pub fn as_str(&self) -> &str {
        match self {
            Self::RapidTravel => "G0",
            Self::LinearCut => "G1",
            Self::Other(token) => token,
        }
    }
}

/// Coordinate words present on a line; absent words stay `None`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveWords {
    /// X word
    pub x: Option<f64>,
    /// Y word
    pub y: Option<f64>,
    /// Z word
    pub z: Option<f64>,
    /// F (feed rate) word
    pub f: Option<f64>,
}

/// Shape of a move, without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Tool raised to a travel height
    Travel,
    /// Plunge to cutting depth
    Dive,
    /// Horizontal move while engaged with material
    Cut,
    /// Not recognized as travel, dive or cut
    Other,
}

/// One toolpath instruction
#[derive(Debug, Clone, PartialEq)]
pub enum ToolpathMove {
    /// Rapid move to a non-negative Z with no horizontal words
    Travel {
        /// Travel height
        z: f64,
        /// Feed rate word, if present
        feed_rate: Option<f64>,
    },
    /// Linear move to a negative Z with no horizontal words
    Dive {
        /// Plunge depth
        z: f64,
        /// Feed rate word, if present
        feed_rate: Option<f64>,
    },
    /// Linear move across the surface
    Cut {
        /// Target X
        x: f64,
        /// Target Y
        y: f64,
        /// Target Z, if present
        z: Option<f64>,
        /// Feed rate word, if present
        feed_rate: Option<f64>,
    },
    /// Any other instruction
    Other {
        /// Command token
        command: MoveCommand,
        /// Recognized words
        words: MoveWords,
    },
}

impl ToolpathMove {
    /// Classify a command and its words
    pub fn classify(command: MoveCommand, words: MoveWords) -> Self {
        let rapid = command == MoveCommand::RapidTravel;
        let linear = command == MoveCommand::LinearCut;

        match (words.x, words.y, words.z) {
            (None, None, Some(z)) if rapid && z >= 0.0 => Self::Travel {
                z,
                feed_rate: words.f,
            },
            (None, None, Some(z)) if linear && z < 0.0 => Self::Dive {
                z,
                feed_rate: words.f,
            },
            (Some(x), Some(y), z) if linear => Self::Cut {
                x,
                y,
                z,
                feed_rate: words.f,
            },
            _ => Self::Other { command, words },
        }
    }

    /// Parse one non-comment source line
    ///
    /// Words are matched on a case-insensitive first letter. A `;` comment
    /// suffix is cut from each token on its own. Words other than X, Y, Z and
    /// F are dropped.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Self, ToolpathError> {
        let mut tokens = line
            .split_whitespace()
            .map(|token| token.split(';').next().unwrap_or_default());
        let command = MoveCommand::parse(tokens.next().unwrap_or_default());

        let mut words = MoveWords::default();
        for token in tokens {
            let mut chars = token.chars();
            let slot = match chars.next().map(|c| c.to_ascii_uppercase()) {
                Some('X') => &mut words.x,
                Some('Y') => &mut words.y,
                Some('Z') => &mut words.z,
                Some('F') => &mut words.f,
                _ => continue,
            };
            let value = chars.as_str().parse::<f64>().map_err(|_| {
                ToolpathError::InvalidNumber {
                    line_number,
                    token: token.to_string(),
                }
            })?;
            *slot = Some(value);
        }

        Ok(Self::classify(command, words))
    }

    /// Shape of this move
    pub fn kind(&self) -> MoveKind {
        match self {
            Self::Travel { .. } => MoveKind::Travel,
            Self::Dive { .. } => MoveKind::Dive,
            Self::Cut { .. } => MoveKind::Cut,
            Self::Other { .. } => MoveKind::Other,
        }
    }

    /// Command emitted for this move
    pub fn command(&self) -> &str {
        match self {
            Self::Travel { .. } => MoveCommand::RapidTravel.as_str(),
            Self::Dive { .. } | Self::Cut { .. } => MoveCommand::LinearCut.as_str(),
            Self::Other { command, .. } => command.as_str(),
        }
    }

    /// Coordinate words of this move
    pub fn words(&self) -> MoveWords {
        match *self {
            Self::Travel { z, feed_rate } | Self::Dive { z, feed_rate } => MoveWords {
                z: Some(z),
                f: feed_rate,
                ..MoveWords::default()
            },
            Self::Cut { x, y, z, feed_rate } => MoveWords {
                x: Some(x),
                y: Some(y),
                z,
                f: feed_rate,
            },
            Self::Other { words, .. } => words,
        }
    }

    /// X word, if set
    pub fn x(&self) -> Option<f64> {
        self.words().x
    }

    /// Y word, if set
    pub fn y(&self) -> Option<f64> {
        self.words().y
    }

    /// Z word, if set
    pub fn z(&self) -> Option<f64> {
        self.words().z
    }

    /// Feed rate word, if set
    pub fn feed_rate(&self) -> Option<f64> {
        self.words().f
    }
}

impl fmt::Display for ToolpathMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())?;
        let words = self.words();
        for (letter, value) in [('X', words.x), ('Y', words.y), ('Z', words.z), ('F', words.f)] {
            if let Some(value) = value {
                write!(f, " {}{:.8}", letter, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ToolpathMove {
        ToolpathMove::parse_line(line, 1).unwrap()
    }

    #[test]
    fn test_command_spellings() {
        assert_eq!(MoveCommand::parse("G0"), MoveCommand::RapidTravel);
        assert_eq!(MoveCommand::parse("G00"), MoveCommand::RapidTravel);
        assert_eq!(MoveCommand::parse("G1"), MoveCommand::LinearCut);
        assert_eq!(MoveCommand::parse("g01"), MoveCommand::LinearCut);
        assert_eq!(
            MoveCommand::parse("M3"),
            MoveCommand::Other("M3".to_string())
        );
    }

    #[test]
    fn test_travel_classification() {
        assert_eq!(
            parse("G00 Z15"),
            ToolpathMove::Travel {
                z: 15.0,
                feed_rate: None
            }
        );
        assert_eq!(parse("G0 Z0").kind(), MoveKind::Travel);
        assert_eq!(parse("G0 Z-1").kind(), MoveKind::Other);
        assert_eq!(parse("G0 X1 Y2").kind(), MoveKind::Other);
    }

    #[test]
    fn test_dive_classification() {
        assert_eq!(
            parse("G01 Z-0.05 F60"),
            ToolpathMove::Dive {
                z: -0.05,
                feed_rate: Some(60.0)
            }
        );
        assert_eq!(parse("G1 Z0.5").kind(), MoveKind::Other);
        assert_eq!(parse("G1 F100").kind(), MoveKind::Other);
    }

    #[test]
    fn test_cut_classification() {
        assert_eq!(
            parse("G1 X5 Y0 F120"),
            ToolpathMove::Cut {
                x: 5.0,
                y: 0.0,
                z: None,
                feed_rate: Some(120.0)
            }
        );
        assert_eq!(parse("G1 X5").kind(), MoveKind::Other);
        assert_eq!(parse("G1 X5 Y1 Z-0.2").kind(), MoveKind::Cut);
    }

    #[test]
    fn test_lowercase_words_and_unknown_words() {
        let mv = parse("G1 x1.5 y-2 s1000");
        assert_eq!(mv.x(), Some(1.5));
        assert_eq!(mv.y(), Some(-2.0));
        assert_eq!(mv.z(), None);
    }

    #[test]
    fn test_inline_comment_is_stripped_per_token() {
        let mv = parse("G1 X1;start Y2");
        assert_eq!(mv.x(), Some(1.0));
        assert_eq!(mv.y(), Some(2.0));
        assert_eq!(mv.kind(), MoveKind::Cut);

        let mv = parse("G1;plunge Z-0.1 ;");
        assert_eq!(mv.kind(), MoveKind::Dive);
        assert_eq!(mv.z(), Some(-0.1));
    }

    #[test]
    fn test_invalid_number() {
        let err = ToolpathMove::parse_line("G1 X1.2.3 Y0", 7).unwrap_err();
        assert!(matches!(
            err,
            ToolpathError::InvalidNumber { line_number: 7, ref token } if token == "X1.2.3"
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            parse("G01 X5 Y0 Z-0.1 F120").to_string(),
            "G1 X5.00000000 Y0.00000000 Z-0.10000000 F120.00000000"
        );
        assert_eq!(parse("G00 Z15").to_string(), "G0 Z15.00000000");
        assert_eq!(parse("M3 S1000").to_string(), "M3");
        assert_eq!(parse("G21").to_string(), "G21");
    }
}
