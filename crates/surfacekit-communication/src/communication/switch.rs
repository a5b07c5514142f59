//! Contact switch link
//!
//! The switch device stays silent until the tool touches the work surface,
//! then emits one or more bytes. There is no outbound protocol.

use crate::SerialPort;
use std::thread;
use std::time::{Duration, Instant};
use surfacekit_core::ProtocolError;

/// Delay between polls while waiting for a trigger
pub const SWITCH_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polling client for a contact switch
pub struct SwitchLink<P: SerialPort> {
    port: P,
    poll_interval: Duration,
}

impl<P: SerialPort> SwitchLink<P> {
    /// Wrap an open port
    pub fn new(port: P) -> Self {
        Self {
            port,
            poll_interval: SWITCH_POLL_INTERVAL,
        }
    }

    /// Override the poll interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Access the underlying port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Check once for a trigger without blocking
    ///
    /// Pending bytes count as a trigger and are consumed.
    pub fn poll_once(&mut self) -> Result<bool, ProtocolError> {
        if self.port.bytes_to_read()? > 0 {
            self.port.discard_input()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Wait up to `timeout` for the switch to trigger
    ///
    /// Stale input is discarded first so only contact made during the wait
    /// counts. The port is polled at least once, even with a zero timeout.
    pub fn wait_for_trigger(&mut self, timeout: Duration) -> Result<bool, ProtocolError> {
        self.port.discard_input()?;
        let start = Instant::now();
        loop {
            if self.poll_once()? {
                tracing::debug!("Switch {} triggered", self.port.name());
                return Ok(true);
            }
            if start.elapsed() >= timeout {
                return Ok(false);
            }
            thread::sleep(self.poll_interval);
        }
    }
}
