//! Serial port transport
//!
//! Provides the byte-level port abstraction shared by the motion controller
//! link and the contact switch link, plus a `serialport` backed
//! implementation and port discovery.

use crate::{ConnectionParams, SerialParity};
use std::io::{self, Read, Write};
use surfacekit_core::{Error, Result};

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Human readable description
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// USB vendor and product IDs if applicable
    pub usb_ids: Option<(u16, u16)>,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            usb_ids: None,
        }
    }
}

/// List serial ports that could host a motion controller or switch device
///
/// Only ports matching the usual USB serial patterns are returned:
/// - Windows: COM*
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        Error::other(format!("Failed to enumerate ports: {}", e))
    })?;

    Ok(ports
        .iter()
        .filter(|port| is_candidate_port(&port.port_name))
        .map(|port| {
            let mut info = SerialPortInfo::new(&port.port_name, describe_port(port));
            if let serialport::SerialPortType::UsbPort(usb) = &port.port_type {
                info.usb_ids = Some((usb.vid, usb.pid));
                info.manufacturer = usb.manufacturer.clone();
            }
            info
        })
        .collect())
}

/// Check if a port name matches a USB serial device pattern
pub(crate) fn is_candidate_port(port_name: &str) -> bool {
    if let Some(number) = port_name.strip_prefix("COM") {
        return !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    }

    ["/dev/ttyUSB", "/dev/ttyACM", "/dev/cu.usbserial-", "/dev/cu.usbmodem"]
        .iter()
        .any(|prefix| port_name.starts_with(prefix))
}

fn describe_port(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb) => format!(
            "USB {} {}",
            usb.manufacturer.as_deref().unwrap_or("Device"),
            usb.product.as_deref().unwrap_or("Serial Port")
        ),
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Byte-level serial port interface
///
/// Reads are expected to be non-blocking in practice: callers only read
/// after `bytes_to_read` reports pending input.
pub trait SerialPort: Send {
    /// Write data to the port, returning the number of bytes accepted
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Read pending data into `buf`
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Number of received bytes waiting to be read
    fn bytes_to_read(&mut self) -> io::Result<usize>;

    /// Get the port name
    fn name(&self) -> String;

    /// Write the whole buffer
    fn write_all(&mut self, mut data: &[u8]) -> io::Result<()> {
        while !data.is_empty() {
            match self.write(data)? {
                0 => return Err(io::Error::new(io::ErrorKind::WriteZero, "port closed")),
                n => data = &data[n..],
            }
        }
        Ok(())
    }

    /// Drop any buffered input, returning how many bytes were discarded
    fn discard_input(&mut self) -> io::Result<usize> {
        let mut discarded = 0;
        let mut buf = [0u8; 256];
        while self.bytes_to_read()? > 0 {
            let n = self.read(&mut buf)?;
            if n == 0 {
                break;
            }
            discarded += n;
        }
        Ok(discarded)
    }
}

impl<P: SerialPort + ?Sized> SerialPort for Box<P> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn bytes_to_read(&mut self) -> io::Result<usize> {
        (**self).bytes_to_read()
    }

    fn name(&self) -> String {
        (**self).name()
    }

    fn discard_input(&mut self) -> io::Result<usize> {
        (**self).discard_input()
    }
}

fn to_serialport_parity(parity: SerialParity) -> serialport::Parity {
    match parity {
        SerialParity::None => serialport::Parity::None,
        SerialParity::Even => serialport::Parity::Even,
        SerialParity::Odd => serialport::Parity::Odd,
    }
}

/// Serial port backed by the `serialport` crate
pub struct RealSerialPort {
    name: String,
    port: Box<dyn serialport::SerialPort>,
}

impl RealSerialPort {
    /// Open a serial port with the given parameters
    pub fn open(params: &ConnectionParams) -> Result<Self> {
        let data_bits = match params.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => return Err(Error::other(format!("Invalid data bits: {}", other))),
        };
        let stop_bits = match params.stop_bits {
            1 => serialport::StopBits::One,
            2 => serialport::StopBits::Two,
            other => return Err(Error::other(format!("Invalid stop bits: {}", other))),
        };

        let port = serialport::new(&params.port, params.baud_rate)
            .timeout(params.read_timeout())
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(to_serialport_parity(params.parity))
            .flow_control(if params.flow_control {
                serialport::FlowControl::Hardware
            } else {
                serialport::FlowControl::None
            })
            .open()
            .map_err(|e| {
                tracing::warn!("Failed to open serial port {}: {}", params.port, e);
                Error::other(format!("Failed to open port {}: {}", params.port, e))
            })?;

        tracing::info!("Opened {} at {} baud", params.port, params.baud_rate);
        Ok(Self {
            name: params.port.clone(),
            port,
        })
    }
}

impl SerialPort for RealSerialPort {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let written = self.port.write(data)?;
        self.port.flush()?;
        Ok(written)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            other => other,
        }
    }

    fn bytes_to_read(&mut self) -> io::Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn discard_input(&mut self) -> io::Result<usize> {
        let pending = self.bytes_to_read()?;
        self.port.clear(serialport::ClearBuffer::Input)?;
        Ok(pending)
    }
}
