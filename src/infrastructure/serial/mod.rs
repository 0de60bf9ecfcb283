// Serial module - Serial transport implementation
pub mod transport;

pub use transport::{SerialSettings, SerialTransport};

use crate::domain::error::SppComResult;
use serde::Serialize;

/// A serial device found on the system
#[derive(Debug, Clone, Serialize)]
pub struct PortSummary {
    pub name: String,
    pub kind: String,
    pub description: String,
}

/// List serial devices, including bound RFCOMM devices
pub fn list_ports() -> SppComResult<Vec<PortSummary>> {
    let ports = serialport::available_ports()?;

    Ok(ports
        .into_iter()
        .map(|port| {
            let (kind, description) = match port.port_type {
                serialport::SerialPortType::UsbPort(info) => {
                    let description = match (info.manufacturer, info.product) {
                        (Some(m), Some(p)) => format!("{} {}", m, p),
                        (Some(m), None) => m,
                        (None, Some(p)) => p,
                        (None, None) => format!("{:04x}:{:04x}", info.vid, info.pid),
                    };
                    ("usb", description)
                }
                serialport::SerialPortType::BluetoothPort => ("bluetooth", String::new()),
                serialport::SerialPortType::PciPort => ("pci", String::new()),
                serialport::SerialPortType::Unknown => ("unknown", String::new()),
            };
            PortSummary {
                name: port.port_name,
                kind: kind.to_string(),
                description,
            }
        })
        .collect())
}
