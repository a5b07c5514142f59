//! # SurfaceKit Communication
//!
//! Serial links used by a calibration scan.
//! - A blocking request/response link to a Marlin-style motion controller
//! - A polling link to a contact switch that emits a byte on contact

pub mod communication;
pub mod firmware;

pub use communication::{
    serial::{list_ports, RealSerialPort, SerialPort, SerialPortInfo},
    switch::{SwitchLink, SWITCH_POLL_INTERVAL},
    ConnectionParams, SerialParity,
};

pub use firmware::marlin::{
    command_creator::{DistanceMode, MotionCommand, MoveTarget},
    link::{LinkConfig, MotionLink},
    response_parser::{parse_position, AckAccumulator, ACK_SENTINEL},
};
