use crate::domain::address::{PeerAddress, ServiceIdentifier};
use crate::domain::error::TransportError;
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// Transport type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    Serial,
    Tcp,
    /// In-process stream, not a physical link. Used by test doubles and by
    /// embedders that bridge their own I/O into a session.
    Memory,
}

impl std::fmt::Display for TransportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportType::Serial => write!(f, "serial"),
            TransportType::Tcp => write!(f, "tcp"),
            TransportType::Memory => write!(f, "in-memory"),
        }
    }
}

/// Reliable, connection-oriented byte stream handed out by a transport
pub trait LinkStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> LinkStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Byte-stream transport addressable by peer and service
#[async_trait]
pub trait Transport: Send + Sync {
    /// Get the transport type
    fn transport_type(&self) -> TransportType;

    /// Report whether the transport is enabled and usable right now.
    ///
    /// Callers gate `connect` on this; the session itself never calls it.
    async fn check_available(&self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Stop any ongoing device discovery that would slow down a connect
    async fn cancel_discovery(&self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Open a stream to `peer`, scoped to `service`
    async fn open(
        &self,
        peer: &PeerAddress,
        service: &ServiceIdentifier,
    ) -> Result<Box<dyn LinkStream>, TransportError>;
}
