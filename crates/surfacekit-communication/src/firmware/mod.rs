//! Firmware protocol implementations
//!
//! Supported controllers:
//! - Marlin (and derivatives such as Snapmaker): line-oriented G-code with
//!   an `ok` acknowledgement after every command

pub mod marlin;
