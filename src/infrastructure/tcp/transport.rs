use crate::core::communication::{LinkStream, Transport, TransportType};
use crate::domain::address::{PeerAddress, ServiceIdentifier};
use crate::domain::error::TransportError;
use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Transport over TCP: the peer address is the host, the service is the port
#[derive(Debug, Clone, Default)]
pub struct TcpTransport {
    nodelay: bool,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Tcp
    }

    async fn open(
        &self,
        peer: &PeerAddress,
        service: &ServiceIdentifier,
    ) -> Result<Box<dyn LinkStream>, TransportError> {
        let port = service.as_port().ok_or_else(|| {
            TransportError::ServiceUnavailable(format!(
                "Service '{}' is not a TCP port number",
                service
            ))
        })?;

        debug!("Connecting to {}:{}", peer, port);
        let stream = TcpStream::connect((peer.as_str(), port)).await?;

        if self.nodelay {
            if let Err(e) = stream.set_nodelay(true) {
                warn!("Failed to set TCP_NODELAY: {}", e);
            }
        }

        info!("TCP connection established to {}:{}", peer, port);
        Ok(Box::new(stream))
    }
}
