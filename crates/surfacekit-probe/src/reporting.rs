//! Operator-facing collaborators of a scan
//!
//! A [`ConfirmationGate`] is asked before any motion starts and a
//! [`ProgressSink`] is told about every accepted reading. Closures implement
//! both traits.

/// Shown before any motion
pub const SAFETY_WARNING: &str = "This tool assumes the probe lead is attached to the tool and the \
     contact plate is wired to the work surface. Without these connections the machine may be \
     damaged.";

/// Shown once the operator has acknowledged the warning
pub const SET_ORIGIN_PROMPT: &str = "Set the desired work origin on the machine.";

/// Receives `(completed, total)` after each accepted reading
pub trait ProgressSink {
    /// Report progress
    fn report(&mut self, completed: usize, total: usize);
}

impl<F: FnMut(usize, usize)> ProgressSink for F {
    fn report(&mut self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Asks the operator to acknowledge a prompt
pub trait ConfirmationGate {
    /// `true` when the operator agrees to continue
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> ConfirmationGate for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Gate that accepts every prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl ConfirmationGate for AutoConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        tracing::debug!("Auto-confirmed: {}", prompt);
        true
    }
}

/// Progress sink that logs at info level
///
/// Logs at most once per `step` percent so large scans stay readable.
#[derive(Debug, Clone)]
pub struct LogProgress {
    step: usize,
    last_percent: Option<usize>,
}

impl LogProgress {
    /// Log every `step` percent
    pub fn new(step: usize) -> Self {
        Self {
            step: step.max(1),
            last_percent: None,
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressSink for LogProgress {
    fn report(&mut self, completed: usize, total: usize) {
        let percent = if total == 0 { 100 } else { completed * 100 / total };
        let bucket = percent / self.step;
        if self.last_percent.is_some_and(|last| last / self.step == bucket) && completed != total {
            return;
        }
        self.last_percent = Some(percent);
        tracing::info!("Calibration progress: {}/{} ({}%)", completed, total, percent);
    }
}
