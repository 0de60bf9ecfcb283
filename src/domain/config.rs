use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::address::{PeerAddress, ServiceIdentifier};

/// Hardware address of the ESP32 the tool was first written for
pub const DEFAULT_PEER_ADDRESS: &str = "FC:E8:C0:76:12:3E";

/// SppCom configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SppComConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Known peers
    #[serde(default)]
    pub peers: Vec<PeerConfig>,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Receive timeout in milliseconds
    #[serde(default = "default_receive_timeout")]
    pub receive_timeout_ms: u64,
    /// Largest chunk a single receive may return
    #[serde(default = "default_max_read_bytes")]
    pub max_read_bytes: usize,
    /// Peer used when none is named on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_peer: Option<String>,
}

/// A remote device the tool can talk to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerConfig {
    /// Peer name
    pub name: String,
    /// Peer description
    #[serde(default)]
    pub description: String,
    /// Address of the peer
    pub address: PeerAddress,
    /// Service on the peer
    #[serde(default)]
    pub service: ServiceIdentifier,
    /// How the link is carried
    pub link: LinkConfig,
}

/// Link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LinkConfig {
    #[serde(rename = "serial")]
    Serial {
        port: String,
        #[serde(default = "default_baud_rate")]
        baud_rate: u32,
        #[serde(default = "default_data_bits")]
        data_bits: u8,
        #[serde(default = "default_stop_bits")]
        stop_bits: u8,
        #[serde(default)]
        parity: ParityConfig,
        #[serde(default)]
        flow_control: FlowControlConfig,
    },
    #[serde(rename = "tcp")]
    Tcp {
        #[serde(default)]
        nodelay: bool,
    },
}

/// Parity configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    #[default]
    None,
    Odd,
    Even,
}

/// Flow control configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlConfig {
    #[default]
    None,
    Hardware,
    Software,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_connect_timeout() -> u64 {
    10_000
}

fn default_receive_timeout() -> u64 {
    5_000
}

fn default_max_read_bytes() -> usize {
    1024
}

pub(crate) fn default_baud_rate() -> u32 {
    115_200
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            connect_timeout_ms: default_connect_timeout(),
            receive_timeout_ms: default_receive_timeout(),
            max_read_bytes: default_max_read_bytes(),
            default_peer: None,
        }
    }
}

impl GlobalConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }
}

impl SppComConfig {
    /// Look up a configured peer by name
    pub fn find_peer(&self, name: &str) -> Option<&PeerConfig> {
        self.peers.iter().find(|p| p.name == name)
    }

    /// Example configuration written by `config init`
    pub fn example() -> Self {
        Self {
            global: GlobalConfig {
                default_peer: Some("esp32".to_string()),
                ..GlobalConfig::default()
            },
            peers: vec![
                PeerConfig {
                    name: "esp32".to_string(),
                    description: "ESP32 over an RFCOMM binding".to_string(),
                    address: PeerAddress(DEFAULT_PEER_ADDRESS.to_string()),
                    service: ServiceIdentifier::serial_port_profile(),
                    link: LinkConfig::Serial {
                        port: "/dev/rfcomm0".to_string(),
                        baud_rate: default_baud_rate(),
                        data_bits: default_data_bits(),
                        stop_bits: default_stop_bits(),
                        parity: ParityConfig::None,
                        flow_control: FlowControlConfig::None,
                    },
                },
                PeerConfig {
                    name: "esp32-wifi".to_string(),
                    description: "ESP32 serial bridge over WiFi".to_string(),
                    address: PeerAddress("192.168.4.1".to_string()),
                    service: ServiceIdentifier::from_port(3333),
                    link: LinkConfig::Tcp { nodelay: true },
                },
            ],
        }
    }
}

impl LinkConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            LinkConfig::Serial { .. } => "serial",
            LinkConfig::Tcp { .. } => "tcp",
        }
    }
}
