//! Hardware seams used by the scanner
//!
//! The scanner only needs absolute/relative moves, a position query and a
//! bounded contact wait. The serial links implement these directly; tests
//! substitute simulated hardware.

use std::time::Duration;
use surfacekit_communication::{MotionLink, MoveTarget, SerialPort, SwitchLink};
use surfacekit_core::ProtocolError;

/// Motion controller operations needed for probing
pub trait MotionControl {
    /// Move on the set axes of `target`, relative or absolute
    fn move_axes(&mut self, target: MoveTarget, relative: bool) -> Result<(), ProtocolError>;

    /// Current position as `(x, y, z)`
    fn position(&mut self) -> Result<(f64, f64, f64), ProtocolError>;
}

/// Contact detection needed for probing
pub trait ContactSensor {
    /// Wait up to `timeout` for contact; `false` when none occurred
    fn wait_for_contact(&mut self, timeout: Duration) -> Result<bool, ProtocolError>;
}

impl<P: SerialPort> MotionControl for MotionLink<P> {
    fn move_axes(&mut self, target: MoveTarget, relative: bool) -> Result<(), ProtocolError> {
        MotionLink::move_axes(self, target, relative)
    }

    fn position(&mut self) -> Result<(f64, f64, f64), ProtocolError> {
        self.get_position()
    }
}

impl<P: SerialPort> ContactSensor for SwitchLink<P> {
    fn wait_for_contact(&mut self, timeout: Duration) -> Result<bool, ProtocolError> {
        self.wait_for_trigger(timeout)
    }
}

impl<M: MotionControl + ?Sized> MotionControl for &mut M {
    fn move_axes(&mut self, target: MoveTarget, relative: bool) -> Result<(), ProtocolError> {
        (**self).move_axes(target, relative)
    }

    fn position(&mut self) -> Result<(f64, f64, f64), ProtocolError> {
        (**self).position()
    }
}

impl<S: ContactSensor + ?Sized> ContactSensor for &mut S {
    fn wait_for_contact(&mut self, timeout: Duration) -> Result<bool, ProtocolError> {
        (**self).wait_for_contact(timeout)
    }
}
