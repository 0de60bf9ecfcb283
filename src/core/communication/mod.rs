// Communication module - Transport abstraction
pub mod transport;

pub use transport::{LinkStream, Transport, TransportType};
