// TCP module - TCP transport implementation
pub mod transport;

pub use transport::TcpTransport;
