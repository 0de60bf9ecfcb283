use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failure to establish a link to the peer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Peer unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("Service unavailable on peer: {reason}")]
    ServiceUnavailable { reason: String },

    #[error("Connect already in progress: {reason}")]
    AlreadyInProgress { reason: String },

    #[error("Connect timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Failure to hand a payload to the transport
#[derive(Error, Debug)]
pub enum SendError {
    #[error("Device not connected")]
    NotConnected,

    #[error("Write failed: {0}")]
    IoFailure(#[source] io::Error),
}

/// Failure to read a chunk from the transport
#[derive(Error, Debug)]
pub enum ReceiveError {
    #[error("Device not connected")]
    NotConnected,

    #[error("No data received within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Read failed: {0}")]
    IoFailure(#[source] io::Error),
}

/// Any failure surfaced by a link session operation
#[derive(Error, Debug)]
pub enum LinkError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Send(#[from] SendError),

    #[error(transparent)]
    Receive(#[from] ReceiveError),
}

/// Failure reported by a transport collaborator
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Peer unreachable: {0}")]
    Unreachable(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Transport busy: {0}")]
    Busy(String),

    #[error("Transport I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<TransportError> for ConnectError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Unavailable(reason) | TransportError::Unreachable(reason) => {
                ConnectError::Unreachable { reason }
            }
            TransportError::ServiceUnavailable(reason) => ConnectError::ServiceUnavailable { reason },
            TransportError::Busy(reason) => ConnectError::AlreadyInProgress { reason },
            TransportError::Io(e) => match e.kind() {
                io::ErrorKind::ConnectionRefused => ConnectError::ServiceUnavailable {
                    reason: e.to_string(),
                },
                _ => ConnectError::Unreachable {
                    reason: e.to_string(),
                },
            },
        }
    }
}

/// SppCom unified error type
#[derive(Error, Debug)]
pub enum SppComError {
    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<ConnectError> for SppComError {
    fn from(err: ConnectError) -> Self {
        Self::Link(err.into())
    }
}

impl From<SendError> for SppComError {
    fn from(err: SendError) -> Self {
        Self::Link(err.into())
    }
}

impl From<ReceiveError> for SppComError {
    fn from(err: ReceiveError) -> Self {
        Self::Link(err.into())
    }
}

pub type SppComResult<T> = Result<T, SppComError>;
