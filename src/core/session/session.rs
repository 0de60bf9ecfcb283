use crate::core::communication::{LinkStream, Transport, TransportType};
use crate::core::session::state::{LinkState, LinkStatistics, SessionInfo};
use crate::domain::address::{PeerAddress, ServiceIdentifier};
use crate::domain::error::{ConnectError, LinkError, ReceiveError, SendError};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, trace, warn};

/// Upper bound on how long `disconnect` waits for the transport to close
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Largest buffer a single receive allocates; one read never yields more
pub const MAX_CHUNK: usize = 64 * 1024;

/// One outbound connection to a peer over a byte-stream transport.
///
/// The session owns its stream exclusively. Every operation takes `&mut self`,
/// so calls on one session are serialized by the borrow checker; share it
/// behind a mutex when several tasks need it. The session never retries:
/// every failure is surfaced as a typed error.
pub struct SerialLinkSession {
    /// Transport collaborator
    transport: Arc<dyn Transport>,
    /// Open stream, present iff connected
    link: Option<Box<dyn LinkStream>>,
    /// Peer of the current connection
    peer: Option<PeerAddress>,
    /// Service of the current connection
    service: Option<ServiceIdentifier>,
    statistics: LinkStatistics,
}

impl SerialLinkSession {
    /// Create a disconnected session on top of `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            link: None,
            peer: None,
            service: None,
            statistics: LinkStatistics::default(),
        }
    }

    pub fn state(&self) -> LinkState {
        if self.link.is_some() {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    pub fn peer(&self) -> Option<&PeerAddress> {
        self.peer.as_ref()
    }

    pub fn service(&self) -> Option<&ServiceIdentifier> {
        self.service.as_ref()
    }

    pub fn transport_type(&self) -> TransportType {
        self.transport.transport_type()
    }

    pub fn statistics(&self) -> &LinkStatistics {
        &self.statistics
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            peer: self.peer.as_ref().map(ToString::to_string),
            service: self.service.as_ref().map(ToString::to_string),
            transport_type: self.transport.transport_type().to_string(),
            state: self.state(),
            statistics: self.statistics.clone(),
        }
    }

    /// Open a connection to `peer` scoped to `service`.
    ///
    /// Connecting an already connected session is a no-op. With a `timeout`,
    /// an attempt that has not completed in time fails with
    /// [`ConnectError::Timeout`] and leaves the session disconnected.
    pub async fn connect(
        &mut self,
        peer: &PeerAddress,
        service: &ServiceIdentifier,
        timeout: Option<Duration>,
    ) -> Result<(), ConnectError> {
        if self.link.is_some() {
            if self.peer.as_ref() != Some(peer) || self.service.as_ref() != Some(service) {
                warn!(
                    "Connect to {} ({}) ignored, session already connected to {}",
                    peer,
                    service,
                    self.peer.as_ref().map(ToString::to_string).unwrap_or_default()
                );
            } else {
                debug!("Session already connected to {}", peer);
            }
            return Ok(());
        }

        info!("Connecting to {} on service {}", peer, service);

        let transport = Arc::clone(&self.transport);
        let attempt = async move {
            if let Err(e) = transport.cancel_discovery().await {
                warn!("Failed to cancel discovery before connect: {}", e);
            }
            transport.open(peer, service).await
        };

        let opened = match timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(result) => result,
                Err(_) => {
                    self.statistics.record_error();
                    warn!("Connect to {} timed out after {:?}", peer, limit);
                    return Err(ConnectError::Timeout(limit));
                }
            },
            None => attempt.await,
        };

        match opened {
            Ok(stream) => {
                self.link = Some(stream);
                self.peer = Some(peer.clone());
                self.service = Some(service.clone());
                self.statistics.record_connected();
                info!("Connected to {}", peer);
                Ok(())
            }
            Err(e) => {
                let err = ConnectError::from(e);
                self.statistics.record_error();
                error!("Failed to connect to {}: {}", peer, err);
                Err(err)
            }
        }
    }

    /// Write `payload` in full.
    ///
    /// Partial writes are retried until every byte has been accepted by the
    /// transport, then the stream is flushed.
    pub async fn send(&mut self, payload: &[u8]) -> Result<(), SendError> {
        let Some(link) = self.link.as_mut() else {
            return Err(SendError::NotConnected);
        };

        match write_fully(link, payload).await {
            Ok(()) => {
                self.statistics.record_sent(payload.len());
                debug!("Sent {} bytes", payload.len());
                Ok(())
            }
            Err(e) => {
                self.statistics.record_error();
                error!("Failed to write to link: {}", e);
                Err(SendError::IoFailure(e))
            }
        }
    }

    /// Read one chunk of at most `max_bytes`, waiting no longer than `timeout`.
    ///
    /// Returns the raw bytes read, never more than [`MAX_CHUNK`] per call.
    /// If the peer has closed the stream the session transitions to
    /// disconnected.
    pub async fn receive(
        &mut self,
        max_bytes: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, ReceiveError> {
        let Some(link) = self.link.as_mut() else {
            return Err(ReceiveError::NotConnected);
        };

        // A zero-length read is indistinguishable from EOF
        if max_bytes == 0 {
            return Ok(Vec::new());
        }

        let mut buffer = vec![0u8; max_bytes.min(MAX_CHUNK)];
        match tokio::time::timeout(timeout, link.read(&mut buffer)).await {
            Err(_) => {
                self.statistics.record_error();
                debug!("No data within {:?}", timeout);
                Err(ReceiveError::Timeout(timeout))
            }
            Ok(Ok(0)) => {
                info!("Connection closed by peer");
                self.release();
                Err(ReceiveError::ConnectionClosed)
            }
            Ok(Ok(n)) => {
                buffer.truncate(n);
                self.statistics.record_received(n);
                debug!("Received {} bytes", n);
                Ok(buffer)
            }
            Ok(Err(e)) if is_peer_closed(&e) => {
                info!("Connection lost: {}", e);
                self.statistics.record_error();
                self.release();
                Err(ReceiveError::ConnectionClosed)
            }
            Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => {
                self.statistics.record_error();
                debug!("Transport read timed out: {}", e);
                Err(ReceiveError::Timeout(timeout))
            }
            Ok(Err(e)) => {
                self.statistics.record_error();
                error!("Failed to read from link: {}", e);
                Err(ReceiveError::IoFailure(e))
            }
        }
    }

    /// Send `payload`, then read one chunk of the reply
    pub async fn exchange(
        &mut self,
        payload: &[u8],
        max_bytes: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, LinkError> {
        self.send(payload).await?;
        Ok(self.receive(max_bytes, timeout).await?)
    }

    /// Close the link if one is open. Safe to call any number of times.
    pub async fn disconnect(&mut self) {
        let Some(mut link) = self.link.take() else {
            debug!("Disconnect on a session that is not connected");
            return;
        };

        let peer = self.peer.take().map(|p| p.to_string()).unwrap_or_default();
        self.service = None;
        self.statistics.record_disconnected();

        match tokio::time::timeout(CLOSE_TIMEOUT, link.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Error while closing link to {}: {}", peer, e),
            Err(_) => warn!("Closing link to {} did not finish in {:?}", peer, CLOSE_TIMEOUT),
        }
        info!("Disconnected from {}", peer);
    }

    /// Drop the stream without a shutdown handshake
    fn release(&mut self) {
        self.link = None;
        self.peer = None;
        self.service = None;
        self.statistics.record_disconnected();
    }
}

impl Drop for SerialLinkSession {
    fn drop(&mut self) {
        if let Some(peer) = &self.peer {
            debug!("Session dropped while connected, closing link to {}", peer);
        }
    }
}

async fn write_fully(link: &mut Box<dyn LinkStream>, payload: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < payload.len() {
        match link.write(&payload[written..]).await {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "transport accepted zero bytes",
                ))
            }
            Ok(n) => {
                written += n;
                trace!("Wrote {}/{} bytes", written, payload.len());
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    link.flush().await
}

fn is_peer_closed(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}
