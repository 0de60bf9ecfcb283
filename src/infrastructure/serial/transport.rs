use crate::core::communication::{LinkStream, Transport, TransportType};
use crate::domain::address::{PeerAddress, ServiceIdentifier};
use crate::domain::config::{FlowControlConfig, LinkConfig, ParityConfig};
use crate::domain::error::{SppComError, SppComResult, TransportError};
use async_trait::async_trait;
use std::io;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

/// Serial line settings for one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: ParityConfig,
    pub flow_control: FlowControlConfig,
}

impl SerialSettings {
    /// Settings with 8N1 framing and no flow control
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            data_bits: 8,
            stop_bits: 1,
            parity: ParityConfig::None,
            flow_control: FlowControlConfig::None,
        }
    }

    pub fn from_link(link: &LinkConfig) -> SppComResult<Self> {
        match link {
            LinkConfig::Serial {
                port,
                baud_rate,
                data_bits,
                stop_bits,
                parity,
                flow_control,
            } => Ok(Self {
                port: port.clone(),
                baud_rate: *baud_rate,
                data_bits: *data_bits,
                stop_bits: *stop_bits,
                parity: *parity,
                flow_control: *flow_control,
            }),
            _ => Err(SppComError::Config {
                message: "Invalid link type for serial transport".to_string(),
            }),
        }
    }

    fn builder(&self) -> Result<tokio_serial::SerialPortBuilder, TransportError> {
        let data_bits = match self.data_bits {
            5 => tokio_serial::DataBits::Five,
            6 => tokio_serial::DataBits::Six,
            7 => tokio_serial::DataBits::Seven,
            8 => tokio_serial::DataBits::Eight,
            other => {
                return Err(TransportError::ServiceUnavailable(format!(
                    "Invalid data bits: {}",
                    other
                )))
            }
        };

        let stop_bits = match self.stop_bits {
            1 => tokio_serial::StopBits::One,
            2 => tokio_serial::StopBits::Two,
            other => {
                return Err(TransportError::ServiceUnavailable(format!(
                    "Invalid stop bits: {}",
                    other
                )))
            }
        };

        let parity = match self.parity {
            ParityConfig::None => tokio_serial::Parity::None,
            ParityConfig::Even => tokio_serial::Parity::Even,
            ParityConfig::Odd => tokio_serial::Parity::Odd,
        };

        let flow_control = match self.flow_control {
            FlowControlConfig::None => tokio_serial::FlowControl::None,
            FlowControlConfig::Software => tokio_serial::FlowControl::Software,
            FlowControlConfig::Hardware => tokio_serial::FlowControl::Hardware,
        };

        Ok(tokio_serial::new(&self.port, self.baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .flow_control(flow_control))
    }
}

/// Transport over a local serial device.
///
/// On Linux a radio serial-profile link shows up as a serial device once the
/// peer is bound with `rfcomm bind`. The binding already selects the remote
/// channel, so the service identifier is only logged here.
pub struct SerialTransport {
    settings: SerialSettings,
    bound_peer: Option<PeerAddress>,
}

impl SerialTransport {
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            settings,
            bound_peer: None,
        }
    }

    /// Refuse to open the device for any peer other than `peer`
    pub fn bound_to(mut self, peer: PeerAddress) -> Self {
        self.bound_peer = Some(peer);
        self
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }
}

#[async_trait]
impl Transport for SerialTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Serial
    }

    async fn check_available(&self) -> Result<(), TransportError> {
        match tokio::fs::try_exists(&self.settings.port).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(TransportError::Unavailable(format!(
                "Serial device {} not present",
                self.settings.port
            ))),
            Err(e) => Err(TransportError::Unavailable(format!(
                "Cannot access serial device {}: {}",
                self.settings.port, e
            ))),
        }
    }

    async fn open(
        &self,
        peer: &PeerAddress,
        service: &ServiceIdentifier,
    ) -> Result<Box<dyn LinkStream>, TransportError> {
        if let Some(bound) = &self.bound_peer {
            if bound != peer {
                return Err(TransportError::Unreachable(format!(
                    "{} is bound to {}, not {}",
                    self.settings.port, bound, peer
                )));
            }
        }

        debug!(
            "Opening serial device {} at {} baud for {} (service {})",
            self.settings.port, self.settings.baud_rate, peer, service
        );

        let stream = self
            .settings
            .builder()?
            .open_native_async()
            .map_err(|e| map_open_error(&self.settings.port, e))?;

        info!("Serial device {} opened", self.settings.port);
        Ok(Box::new(stream))
    }
}

fn map_open_error(port: &str, e: tokio_serial::Error) -> TransportError {
    match e.kind() {
        tokio_serial::ErrorKind::NoDevice => {
            TransportError::Unreachable(format!("{}: {}", port, e))
        }
        tokio_serial::ErrorKind::InvalidInput => {
            TransportError::ServiceUnavailable(format!("{}: {}", port, e))
        }
        tokio_serial::ErrorKind::Io(kind) => {
            TransportError::Io(io::Error::new(kind, format!("{}: {}", port, e)))
        }
        _ => TransportError::Unreachable(format!("{}: {}", port, e)),
    }
}
