//! Marlin protocol support
//!
//! Every command is a single G-code line; the controller answers with any
//! number of informational lines followed by the `ok` sentinel.

pub mod command_creator;
pub mod link;
pub mod response_parser;
