//! Marlin Response Parser
//!
//! Collects received text until the acknowledgement sentinel arrives and
//! decodes position reports.

use surfacekit_core::ProtocolError;

/// Line that terminates every response
pub const ACK_SENTINEL: &str = "ok";

/// Accumulates received bytes until a response is complete
///
/// A response is complete when the last non-empty, newline-terminated line
/// is exactly [`ACK_SENTINEL`]. Bytes after the last newline are kept for the
/// next chunk, so a character split across reads decodes intact.
#[derive(Debug, Default)]
pub struct AckAccumulator {
    pending: Vec<u8>,
}

impl AckAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard anything collected so far
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Feed a received chunk
    ///
    /// Returns the informational lines preceding the sentinel once the
    /// response is complete.
    pub fn push(&mut self, chunk: impl AsRef<[u8]>) -> Option<Vec<String>> {
        self.pending.extend_from_slice(chunk.as_ref());

        let end = self.pending.iter().rposition(|&b| b == b'\n')? + 1;
        let lines: Vec<String> = String::from_utf8_lossy(&self.pending[..end])
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if lines.last().map(String::as_str) != Some(ACK_SENTINEL) {
            return None;
        }

        self.pending.clear();
        Some(
            lines
                .into_iter()
                .filter(|line| line != ACK_SENTINEL)
                .collect(),
        )
    }
}

/// Parse the first three `letter:value` fields of a position report
///
/// `X:10.00 Y:5.00 Z:-0.40 E:0.00 Count X:800 Y:400 Z:-160` yields
/// `(10.0, 5.0, -0.4)`.
pub fn parse_position(line: &str) -> Result<(f64, f64, f64), ProtocolError> {
    let malformed = || ProtocolError::MalformedResponse {
        line: line.to_string(),
    };

    let mut values = line.split_whitespace().take(3).map(|field| {
        field
            .rsplit(':')
            .next()
            .and_then(|value| value.parse::<f64>().ok())
    });

    let mut next = || values.next().flatten().ok_or_else(malformed);
    Ok((next()?, next()?, next()?))
}
