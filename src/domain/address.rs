use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::error::SppComError;

/// Serial Port Profile service class UUID
pub const SERIAL_PORT_PROFILE_UUID: Uuid = Uuid::from_u128(0x0000_1101_0000_1000_8000_0080_5F9B_34FB);

/// Identifier of the remote endpoint, e.g. the hardware address of the device
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerAddress(pub(crate) String);

impl PeerAddress {
    pub fn new(address: impl Into<String>) -> Result<Self, SppComError> {
        let address = address.into().trim().to_string();
        if address.is_empty() {
            return Err(SppComError::InvalidInput(
                "Peer address must not be empty".to_string(),
            ));
        }
        Ok(Self(address))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the address looks like a six-octet hardware address (`AA:BB:CC:DD:EE:FF`)
    pub fn is_hardware_address(&self) -> bool {
        let octets: Vec<&str> = self.0.split(':').collect();
        octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PeerAddress {
    type Err = SppComError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PeerAddress {
    type Error = SppComError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PeerAddress> for String {
    fn from(address: PeerAddress) -> Self {
        address.0
    }
}

/// Selector for a service on the peer, analogous to a port number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceIdentifier(String);

impl ServiceIdentifier {
    pub fn new(service: impl Into<String>) -> Result<Self, SppComError> {
        let service = service.into().trim().to_string();
        if service.is_empty() {
            return Err(SppComError::InvalidInput(
                "Service identifier must not be empty".to_string(),
            ));
        }
        Ok(Self(service))
    }

    pub fn serial_port_profile() -> Self {
        Self(SERIAL_PORT_PROFILE_UUID.hyphenated().to_string())
    }

    pub fn from_port(port: u16) -> Self {
        Self(port.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.0).ok()
    }

    pub fn as_port(&self) -> Option<u16> {
        self.0.parse().ok()
    }
}

impl Default for ServiceIdentifier {
    fn default() -> Self {
        Self::serial_port_profile()
    }
}

impl fmt::Display for ServiceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ServiceIdentifier {
    type Err = SppComError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ServiceIdentifier {
    type Error = SppComError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServiceIdentifier> for String {
    fn from(service: ServiceIdentifier) -> Self {
        service.0
    }
}
