// Session module - Serial link session and its state
pub mod session;
pub mod state;

pub use session::SerialLinkSession;
pub use state::{LinkState, LinkStatistics, SessionInfo};
