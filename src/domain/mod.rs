// Domain module - Core types, configuration and errors
pub mod address;
pub mod config;
pub mod error;

pub use address::{PeerAddress, ServiceIdentifier, SERIAL_PORT_PROFILE_UUID};
pub use config::{LinkConfig, PeerConfig, SppComConfig};
pub use error::{
    ConnectError, LinkError, ReceiveError, SendError, SppComError, SppComResult, TransportError,
};
