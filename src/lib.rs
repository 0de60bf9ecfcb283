//! SppCom Library
//!
//! Serial-link session for embedded devices: one outbound connection to a
//! peer over a byte-stream transport (a bound serial-profile device or TCP),
//! with bounded send and receive operations and typed errors.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use core::communication::{LinkStream, Transport, TransportType};
pub use core::session::{LinkState, LinkStatistics, SerialLinkSession, SessionInfo};
pub use domain::address::{PeerAddress, ServiceIdentifier};
pub use domain::config::SppComConfig;
pub use domain::error::{
    ConnectError, LinkError, ReceiveError, SendError, SppComError, SppComResult, TransportError,
};
