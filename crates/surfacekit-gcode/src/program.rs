//! Toolpath programs
//!
//! A [`ToolpathProgram`] is the ordered list of moves read from a G-code
//! file. Blank lines and comment lines are not kept, so a program written
//! back out is the normalized form of its source.

use crate::moves::{MoveKind, ToolpathMove};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use surfacekit_core::{Error, Result, ToolpathError};

/// Ordered toolpath moves
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolpathProgram {
    moves: Vec<ToolpathMove>,
}

impl ToolpathProgram {
    /// Create an empty program
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse program text
    ///
    /// Lines that are blank or start with `(` or `;` are skipped.
    pub fn parse(text: &str) -> std::result::Result<Self, ToolpathError> {
        let mut moves = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('(') || line.starts_with(';') {
                continue;
            }
            moves.push(ToolpathMove::parse_line(line, index + 1)?);
        }

        tracing::debug!("Parsed {} toolpath moves", moves.len());
        Ok(Self { moves })
    }

    /// Read and parse a program file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::missing_file(path));
        }
        let text = fs::read_to_string(path)?;
        let program = Self::parse(&text)?;
        tracing::info!("Loaded {} moves from {}", program.len(), path.display());
        Ok(program)
    }

    /// Write the program, replacing `path` only once the text is complete
    ///
    /// The text goes to `<path>.tmp` first and is renamed into place.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let write_failed = |err: std::io::Error| ToolpathError::WriteFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };

        fs::write(&tmp, self.to_gcode()).map_err(|err| write_failed(err))?;
        if let Err(err) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(write_failed(err).into());
        }

        tracing::info!("Wrote {} moves to {}", self.len(), path.display());
        Ok(())
    }

    /// Serialize to G-code text, one newline-terminated line per move
    pub fn to_gcode(&self) -> String {
        self.to_string()
    }

    /// Append a move
    pub fn push(&mut self, mv: ToolpathMove) {
        self.moves.push(mv);
    }

    /// All moves in program order
    pub fn moves(&self) -> &[ToolpathMove] {
        &self.moves
    }

    /// Mutable access to the moves
    pub fn moves_mut(&mut self) -> &mut [ToolpathMove] {
        &mut self.moves
    }

    /// Iterate over the moves
    pub fn iter(&self) -> std::slice::Iter<'_, ToolpathMove> {
        self.moves.iter()
    }

    /// Number of moves
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Check if the program has no moves
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Number of moves of the given kind
    pub fn count(&self, kind: MoveKind) -> usize {
        self.moves.iter().filter(|mv| mv.kind() == kind).count()
    }
}

impl FromStr for ToolpathProgram {
    type Err = ToolpathError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ToolpathProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mv in &self.moves {
            writeln!(f, "{}", mv)?;
        }
        Ok(())
    }
}

impl From<Vec<ToolpathMove>> for ToolpathProgram {
    fn from(moves: Vec<ToolpathMove>) -> Self {
        Self { moves }
    }
}

impl<'a> IntoIterator for &'a ToolpathProgram {
    type Item = &'a ToolpathMove;
    type IntoIter = std::slice::Iter<'a, ToolpathMove>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
