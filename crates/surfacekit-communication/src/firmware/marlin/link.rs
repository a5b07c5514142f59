//! Marlin motion link
//!
//! Blocking request/response client for the motion controller. Each command
//! is written as one line and the call returns once the `ok` sentinel has
//! been received.
//!
//! Acknowledgement waits are bounded by [`LinkConfig::ack_timeout`]. Commands
//! that are safe to repeat are resent after a timeout; relative moves never
//! are, since a late acknowledgement would mean the axis moved twice.

use super::command_creator::{DistanceMode, MotionCommand, MoveTarget};
use super::response_parser::{parse_position, AckAccumulator};
use crate::SerialPort;
use std::thread;
use std::time::{Duration, Instant};
use surfacekit_core::ProtocolError;

/// Timing policy for acknowledgement waits
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    /// Maximum wait per attempt; `None` waits indefinitely
    pub ack_timeout: Option<Duration>,
    /// Sleep between polls while no input is pending
    pub poll_interval: Duration,
    /// Extra attempts for retry-safe commands
    pub ack_retries: u32,
    /// Base delay before a resend, multiplied by the attempt number
    pub retry_backoff: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ack_timeout: Some(Duration::from_secs(60)),
            poll_interval: Duration::from_millis(10),
            ack_retries: 2,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

/// Session with a Marlin-style motion controller
///
/// The session owns the port for its lifetime and remembers the distance
/// mode most recently selected.
pub struct MotionLink<P: SerialPort> {
    port: P,
    config: LinkConfig,
    distance_mode: Option<DistanceMode>,
    acc: AckAccumulator,
}

impl<P: SerialPort> MotionLink<P> {
    /// Create a link with the default timing policy
    pub fn new(port: P) -> Self {
        Self::with_config(port, LinkConfig::default())
    }

    /// Create a link with an explicit timing policy
    pub fn with_config(port: P, config: LinkConfig) -> Self {
        Self {
            port,
            config,
            distance_mode: None,
            acc: AckAccumulator::new(),
        }
    }

    /// Distance mode last acknowledged by the controller
    pub fn distance_mode(&self) -> Option<DistanceMode> {
        self.distance_mode
    }

    /// Access the underlying port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Release the underlying port
    pub fn into_inner(self) -> P {
        self.port
    }

    /// Run the homing cycle
    pub fn home(&mut self) -> Result<(), ProtocolError> {
        self.exchange(MotionCommand::Home).map(|_| ())
    }

    /// Select a distance mode, then move on the supplied axes
    ///
    /// The mode command is always sent. When no axis is set the call returns
    /// after the mode switch.
    pub fn move_axes(&mut self, target: MoveTarget, relative: bool) -> Result<(), ProtocolError> {
        let mode = DistanceMode::from_relative(relative);
        self.exchange(MotionCommand::SetDistanceMode(mode))?;
        self.distance_mode = Some(mode);

        if target.is_empty() {
            return Ok(());
        }
        self.exchange(MotionCommand::RapidMove(target)).map(|_| ())
    }

    /// Query the current position as `(x, y, z)`
    pub fn get_position(&mut self) -> Result<(f64, f64, f64), ProtocolError> {
        let lines = self.exchange(MotionCommand::ReportPosition)?;
        let first = lines.first().ok_or_else(|| ProtocolError::MalformedResponse {
            line: String::new(),
        })?;
        parse_position(first)
    }

    /// Make the current position the work origin
    pub fn set_work_origin(&mut self) -> Result<(), ProtocolError> {
        self.exchange(MotionCommand::ZeroWorkOffsets).map(|_| ())
    }

    /// Travel to the work origin in absolute mode
    pub fn go_to_work_origin(&mut self) -> Result<(), ProtocolError> {
        self.move_axes(MoveTarget::xyz(0.0, 0.0, 0.0), false)
    }

    /// Send a command and wait for its acknowledgement
    ///
    /// Returns the informational lines that preceded the sentinel.
    pub fn exchange(&mut self, command: MotionCommand) -> Result<Vec<String>, ProtocolError> {
        let mode = self.distance_mode.unwrap_or(DistanceMode::Relative);
        let attempts = if command.is_retry_safe(mode) {
            1 + self.config.ack_retries
        } else {
            1
        };
        let line = command.to_line();

        for attempt in 1..=attempts {
            self.port.discard_input()?;
            self.acc.clear();
            tracing::debug!("-> {}", line.trim_end());
            self.port.write_all(line.as_bytes())?;

            if let Some(lines) = self.wait_for_ack()? {
                return Ok(lines);
            }

            if attempt < attempts {
                tracing::warn!(
                    "No acknowledgement for '{}', retrying ({}/{})",
                    command,
                    attempt,
                    attempts - 1
                );
                thread::sleep(self.config.retry_backoff * attempt);
            }
        }

        let timeout_ms = self
            .config
            .ack_timeout
            .map_or(0, |timeout| timeout.as_millis() as u64);
        tracing::error!("Controller did not acknowledge '{}'", command);
        Err(ProtocolError::Timeout {
            command: command.to_string(),
            timeout_ms,
        })
    }

    /// Poll until the sentinel arrives or the deadline passes
    fn wait_for_ack(&mut self) -> Result<Option<Vec<String>>, ProtocolError> {
        let deadline = self.config.ack_timeout.map(|timeout| Instant::now() + timeout);
        let mut buf = Vec::new();

        loop {
            let pending = self.port.bytes_to_read()?;
            if pending > 0 {
                buf.resize(pending, 0);
                let n = self.port.read(&mut buf)?;
                if let Some(lines) = self.acc.push(&buf[..n]) {
                    return Ok(Some(lines));
                }
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Ok(None);
            }
            if pending == 0 {
                thread::sleep(self.config.poll_interval);
            }
        }
    }
}
