use async_trait::async_trait;
use sppcom::{
    ConnectError, LinkState, LinkStream, PeerAddress, ReceiveError, SendError, SerialLinkSession,
    ServiceIdentifier, Transport, TransportError, TransportType,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

/// How the mock transport answers an open request
enum Outcome {
    Accept,
    Unreachable,
    Hang,
}

/// In-memory transport: every accepted open creates a duplex pipe and keeps
/// the far end so the test can play the peer.
struct MockTransport {
    outcome: Outcome,
    buffer_size: usize,
    peer_side: Mutex<Option<DuplexStream>>,
    opens: AtomicUsize,
    discovery_cancels: AtomicUsize,
}

impl MockTransport {
    fn new(outcome: Outcome, buffer_size: usize) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            buffer_size,
            peer_side: Mutex::new(None),
            opens: AtomicUsize::new(0),
            discovery_cancels: AtomicUsize::new(0),
        })
    }

    fn accepting() -> Arc<Self> {
        Self::new(Outcome::Accept, 1024)
    }

    fn take_peer(&self) -> DuplexStream {
        self.peer_side
            .lock()
            .unwrap()
            .take()
            .expect("no connection was opened")
    }

    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Memory
    }

    async fn cancel_discovery(&self) -> Result<(), TransportError> {
        self.discovery_cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn open(
        &self,
        peer: &PeerAddress,
        _service: &ServiceIdentifier,
    ) -> Result<Box<dyn LinkStream>, TransportError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Accept => {
                let (near, far) = tokio::io::duplex(self.buffer_size);
                *self.peer_side.lock().unwrap() = Some(far);
                Ok(Box::new(near))
            }
            Outcome::Unreachable => Err(TransportError::Unreachable(format!(
                "{} did not answer",
                peer
            ))),
            Outcome::Hang => {
                std::future::pending::<()>().await;
                Err(TransportError::Busy("never reached".to_string()))
            }
        }
    }
}

fn peer() -> PeerAddress {
    PeerAddress::new("FC:E8:C0:76:12:3E").unwrap()
}

fn spp() -> ServiceIdentifier {
    ServiceIdentifier::serial_port_profile()
}

const TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_disconnected_session_rejects_io_without_touching_transport() {
    let transport = MockTransport::accepting();
    let mut session = SerialLinkSession::new(transport.clone());

    assert_eq!(session.state(), LinkState::Disconnected);
    assert!(matches!(
        session.send(b"hello").await,
        Err(SendError::NotConnected)
    ));
    assert!(matches!(
        session.receive(1024, TIMEOUT).await,
        Err(ReceiveError::NotConnected)
    ));

    assert_eq!(transport.opens(), 0);
    assert_eq!(transport.discovery_cancels.load(Ordering::SeqCst), 0);
    assert!(transport.peer_side.lock().unwrap().is_none());
    assert_eq!(session.statistics().error_count, 0);
}

#[tokio::test]
async fn test_greeting_round_trip() {
    let transport = MockTransport::accepting();
    let mut session = SerialLinkSession::new(transport.clone());

    session.connect(&peer(), &spp(), Some(TIMEOUT)).await.unwrap();
    assert_eq!(session.state(), LinkState::Connected);
    assert_eq!(session.peer(), Some(&peer()));
    assert_eq!(session.service(), Some(&spp()));
    assert_eq!(transport.discovery_cancels.load(Ordering::SeqCst), 1);

    let mut device = transport.take_peer();

    let greeting = "Olá ESP32!".as_bytes();
    session.send(greeting).await.unwrap();

    let mut recorded = vec![0u8; greeting.len()];
    device.read_exact(&mut recorded).await.unwrap();
    assert_eq!(recorded, greeting);
    assert_eq!(recorded.len(), 11);

    device.write_all(b"OK").await.unwrap();
    let reply = session.receive(1024, TIMEOUT).await.unwrap();
    assert_eq!(reply, b"OK");
    assert_eq!(String::from_utf8(reply).unwrap(), "OK");

    assert_eq!(session.state(), LinkState::Connected);
    let stats = session.statistics();
    assert_eq!(stats.bytes_sent, 11);
    assert_eq!(stats.bytes_received, 2);
}

#[tokio::test]
async fn test_peer_close_is_reported_and_disconnects() {
    let transport = MockTransport::accepting();
    let mut session = SerialLinkSession::new(transport.clone());
    session.connect(&peer(), &spp(), None).await.unwrap();

    drop(transport.take_peer());

    let err = session.receive(1024, TIMEOUT).await.unwrap_err();
    assert!(matches!(err, ReceiveError::ConnectionClosed));
    assert_eq!(session.state(), LinkState::Disconnected);
    assert!(session.peer().is_none());

    assert!(matches!(
        session.send(b"again").await,
        Err(SendError::NotConnected)
    ));
}

#[tokio::test]
async fn test_unreachable_peer_leaves_session_disconnected() {
    let transport = MockTransport::new(Outcome::Unreachable, 64);
    let mut session = SerialLinkSession::new(transport.clone());

    let err = session.connect(&peer(), &spp(), Some(TIMEOUT)).await.unwrap_err();
    assert!(matches!(err, ConnectError::Unreachable { ref reason } if reason.contains("did not answer")));
    assert_eq!(session.state(), LinkState::Disconnected);

    assert!(matches!(
        session.send("Olá ESP32!".as_bytes()).await,
        Err(SendError::NotConnected)
    ));
    assert_eq!(transport.opens(), 1);
    assert_eq!(session.statistics().error_count, 1);
}

#[tokio::test]
async fn test_connect_is_bounded_by_timeout() {
    let transport = MockTransport::new(Outcome::Hang, 64);
    let mut session = SerialLinkSession::new(transport.clone());

    let limit = Duration::from_millis(50);
    let started = Instant::now();
    let err = session.connect(&peer(), &spp(), Some(limit)).await.unwrap_err();

    assert_eq!(err, ConnectError::Timeout(limit));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(session.state(), LinkState::Disconnected);
}

#[tokio::test]
async fn test_receive_is_bounded_by_timeout() {
    let transport = MockTransport::accepting();
    let mut session = SerialLinkSession::new(transport.clone());
    session.connect(&peer(), &spp(), None).await.unwrap();
    let mut device = transport.take_peer();

    let limit = Duration::from_millis(50);
    let started = Instant::now();
    let err = session.receive(1024, limit).await.unwrap_err();

    assert!(matches!(err, ReceiveError::Timeout(d) if d == limit));
    assert!(started.elapsed() >= limit);
    assert!(started.elapsed() < Duration::from_secs(2));

    // A timeout leaves the link usable
    assert_eq!(session.state(), LinkState::Connected);
    device.write_all(b"late").await.unwrap();
    assert_eq!(session.receive(1024, TIMEOUT).await.unwrap(), b"late");
}

#[tokio::test]
async fn test_receive_returns_at_most_max_bytes() {
    let transport = MockTransport::accepting();
    let mut session = SerialLinkSession::new(transport.clone());
    session.connect(&peer(), &spp(), None).await.unwrap();
    let mut device = transport.take_peer();

    device.write_all(b"0123456789").await.unwrap();
    let first = session.receive(4, TIMEOUT).await.unwrap();
    assert_eq!(first, b"0123");

    let rest = session.receive(1024, TIMEOUT).await.unwrap();
    assert_eq!(rest, b"456789");
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let transport = MockTransport::accepting();
    let mut session = SerialLinkSession::new(transport.clone());

    // Before any connect
    session.disconnect().await;
    assert_eq!(session.state(), LinkState::Disconnected);

    session.connect(&peer(), &spp(), None).await.unwrap();
    let mut device = transport.take_peer();

    session.disconnect().await;
    assert_eq!(session.state(), LinkState::Disconnected);
    session.disconnect().await;
    assert_eq!(session.state(), LinkState::Disconnected);

    // The peer observes the close
    let mut buf = [0u8; 8];
    assert_eq!(device.read(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn test_reconnect_after_disconnect() {
    let transport = MockTransport::accepting();
    let mut session = SerialLinkSession::new(transport.clone());

    session.connect(&peer(), &spp(), None).await.unwrap();
    session.disconnect().await;
    session.connect(&peer(), &spp(), None).await.unwrap();

    assert_eq!(transport.opens(), 2);
    assert_eq!(session.statistics().connects, 2);
    assert!(session.is_connected());
}

#[tokio::test]
async fn test_send_delivers_everything_through_a_narrow_pipe() {
    // A four byte pipe forces many partial writes
    let transport = MockTransport::new(Outcome::Accept, 4);
    let mut session = SerialLinkSession::new(transport.clone());
    session.connect(&peer(), &spp(), None).await.unwrap();
    let mut device = transport.take_peer();

    let reader = tokio::spawn(async move {
        let mut received = Vec::new();
        device.read_to_end(&mut received).await.unwrap();
        received
    });

    let payload: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    session.send(&payload).await.unwrap();
    session.disconnect().await;

    let received = reader.await.unwrap();
    assert_eq!(received, payload);
}

#[tokio::test]
async fn test_write_to_closed_peer_is_io_failure() {
    let transport = MockTransport::accepting();
    let mut session = SerialLinkSession::new(transport.clone());
    session.connect(&peer(), &spp(), None).await.unwrap();
    drop(transport.take_peer());

    let err = session.send(b"anyone?").await.unwrap_err();
    assert!(matches!(err, SendError::IoFailure(_)));
}

#[tokio::test]
async fn test_dropping_a_connected_session_closes_the_link() {
    let transport = MockTransport::accepting();
    let mut session = SerialLinkSession::new(transport.clone());
    session.connect(&peer(), &spp(), None).await.unwrap();
    let mut device = transport.take_peer();

    drop(session);

    let mut buf = [0u8; 8];
    assert_eq!(device.read(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn test_shared_session_behind_a_mutex() {
    let transport = MockTransport::accepting();
    let session = Arc::new(tokio::sync::Mutex::new(SerialLinkSession::new(
        transport.clone(),
    )));

    session
        .lock()
        .await
        .connect(&peer(), &spp(), None)
        .await
        .unwrap();
    let mut device = transport.take_peer();

    let worker = {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            let mut session = session.lock().await;
            session.send(b"from worker").await
        })
    };
    worker.await.unwrap().unwrap();

    let mut buf = vec![0u8; 11];
    device.read_exact(&mut buf).await.unwrap();
    assert_eq!(buf, b"from worker");

    let info = session.lock().await.info();
    assert_eq!(info.state, LinkState::Connected);
    assert_eq!(info.statistics.messages_sent, 1);
}

#[tokio::test]
async fn test_receive_with_huge_max_bytes() {
    let transport = MockTransport::accepting();
    let mut session = SerialLinkSession::new(transport.clone());
    session.connect(&peer(), &spp(), None).await.unwrap();
    let mut device = transport.take_peer();

    device.write_all(b"OK").await.unwrap();
    let reply = session.receive(usize::MAX / 2, TIMEOUT).await.unwrap();
    assert_eq!(reply, b"OK");
    assert!(session.is_connected());
}
