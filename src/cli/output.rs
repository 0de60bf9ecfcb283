use crate::cli::args::OutputFormat;
use crate::core::session::SessionInfo;
use crate::domain::config::{LinkConfig, PeerConfig, SppComConfig};
use crate::infrastructure::serial::PortSummary;
use serde::Serialize;
use std::io;
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_exchange(&self, report: &ExchangeReport) -> Result<(), OutputError>;
    fn write_session(&self, session: &SessionInfo) -> Result<(), OutputError>;
    fn write_peers(&self, peers: &[PeerConfig]) -> Result<(), OutputError>;
    fn write_ports(&self, ports: &[PortSummary]) -> Result<(), OutputError>;
    fn write_config(&self, config: &SppComConfig) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::SppComError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Bytes shown both as text and hex
#[derive(Debug, Clone, Serialize)]
pub struct PayloadView {
    pub bytes: usize,
    pub text: String,
    pub hex: String,
}

impl PayloadView {
    pub fn new(data: &[u8]) -> Self {
        Self {
            bytes: data.len(),
            text: String::from_utf8_lossy(data).into_owned(),
            hex: hex::encode(data),
        }
    }
}

/// Result of one send and/or receive against a peer
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeReport {
    pub peer: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent: Option<PayloadView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<PayloadView>,
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn render_exchange(&self, report: &ExchangeReport) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)?,
            OutputFormat::Text => {
                let mut lines = Vec::new();
                if let Some(sent) = &report.sent {
                    lines.push(format!("-> {} ({} bytes)", sent.text, sent.bytes));
                }
                if let Some(received) = &report.received {
                    lines.push(format!("<- {} ({} bytes)", received.text, received.bytes));
                }
                lines.join("\n")
            }
            OutputFormat::Table => {
                let rows: Vec<PayloadTableRow> = [("sent", &report.sent), ("received", &report.received)]
                    .into_iter()
                    .filter_map(|(direction, view)| {
                        view.as_ref().map(|v| PayloadTableRow {
                            direction: direction.to_string(),
                            bytes: v.bytes,
                            text: v.text.clone(),
                            hex: v.hex.clone(),
                        })
                    })
                    .collect();
                Table::new(rows).to_string()
            }
        })
    }

    pub fn render_session(&self, session: &SessionInfo) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(session)?,
            _ => {
                let stats = &session.statistics;
                format!(
                    "Session: {} via {}\n  State: {}\n  Sent: {} bytes in {} messages\n  Received: {} bytes in {} chunks\n  Errors: {}",
                    session.peer.as_deref().unwrap_or("-"),
                    session.transport_type,
                    session.state,
                    stats.bytes_sent,
                    stats.messages_sent,
                    stats.bytes_received,
                    stats.messages_received,
                    stats.error_count,
                )
            }
        })
    }

    pub fn render_peers(&self, peers: &[PeerConfig]) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(peers)?,
            OutputFormat::Table => Table::new(peers.iter().map(PeerTableRow::from)).to_string(),
            OutputFormat::Text => peers
                .iter()
                .map(|peer| {
                    format!(
                        "{}: {} service {} via {}",
                        peer.name,
                        peer.address,
                        peer.service,
                        describe_link(&peer.link)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
        })
    }

    pub fn render_ports(&self, ports: &[PortSummary]) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(ports)?,
            OutputFormat::Table => Table::new(ports.iter().map(PortTableRow::from)).to_string(),
            OutputFormat::Text => ports
                .iter()
                .map(|port| {
                    if port.description.is_empty() {
                        format!("{} ({})", port.name, port.kind)
                    } else {
                        format!("{} ({}: {})", port.name, port.kind, port.description)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        })
    }

    pub fn render_config(&self, config: &SppComConfig) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(config)?,
            _ => toml::to_string_pretty(config)?,
        })
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_exchange(&self, report: &ExchangeReport) -> Result<(), OutputError> {
        println!("{}", self.render_exchange(report)?);
        Ok(())
    }

    fn write_session(&self, session: &SessionInfo) -> Result<(), OutputError> {
        println!("{}", self.render_session(session)?);
        Ok(())
    }

    fn write_peers(&self, peers: &[PeerConfig]) -> Result<(), OutputError> {
        if peers.is_empty() && self.format == OutputFormat::Text {
            println!("No peers configured");
            return Ok(());
        }
        println!("{}", self.render_peers(peers)?);
        Ok(())
    }

    fn write_ports(&self, ports: &[PortSummary]) -> Result<(), OutputError> {
        if ports.is_empty() && self.format == OutputFormat::Text {
            println!("No serial ports found");
            return Ok(());
        }
        println!("{}", self.render_ports(ports)?);
        Ok(())
    }

    fn write_config(&self, config: &SppComConfig) -> Result<(), OutputError> {
        println!("{}", self.render_config(config)?);
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::json!({ "message": message })),
            _ => println!("{}", message),
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": error })),
            _ => eprintln!("Error: {}", error),
        }
        Ok(())
    }
}

/// Table row for a payload
#[derive(Tabled)]
struct PayloadTableRow {
    direction: String,
    bytes: usize,
    text: String,
    hex: String,
}

/// Table row for peer configuration
#[derive(Tabled)]
struct PeerTableRow {
    name: String,
    address: String,
    service: String,
    link: String,
    description: String,
}

impl From<&PeerConfig> for PeerTableRow {
    fn from(peer: &PeerConfig) -> Self {
        Self {
            name: peer.name.clone(),
            address: peer.address.to_string(),
            service: peer.service.to_string(),
            link: describe_link(&peer.link),
            description: peer.description.clone(),
        }
    }
}

/// Table row for a serial port
#[derive(Tabled)]
struct PortTableRow {
    name: String,
    kind: String,
    description: String,
}

impl From<&PortSummary> for PortTableRow {
    fn from(port: &PortSummary) -> Self {
        Self {
            name: port.name.clone(),
            kind: port.kind.clone(),
            description: port.description.clone(),
        }
    }
}

fn describe_link(link: &LinkConfig) -> String {
    match link {
        LinkConfig::Serial { port, baud_rate, .. } => format!("serial {} @ {}", port, baud_rate),
        LinkConfig::Tcp { .. } => "tcp".to_string(),
    }
}
