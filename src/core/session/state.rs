use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Connection state of a link session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkState {
    /// No handle held
    Disconnected,
    /// Handle held and usable
    Connected,
}

/// Running counters for a link session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkStatistics {
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Total bytes received
    pub bytes_received: u64,
    /// Successful send calls
    pub messages_sent: u64,
    /// Successful receive calls
    pub messages_received: u64,
    /// Failed operations of any kind
    pub error_count: u64,
    /// Number of successful connects
    pub connects: u64,
    /// When the current connection was established
    pub connected_at: Option<SystemTime>,
    /// Last successful I/O
    pub last_activity: Option<SystemTime>,
}

/// Serializable snapshot of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub peer: Option<String>,
    pub service: Option<String>,
    pub transport_type: String,
    pub state: LinkState,
    pub statistics: LinkStatistics,
}

impl LinkStatistics {
    pub(crate) fn record_connected(&mut self) {
        let now = SystemTime::now();
        self.connects += 1;
        self.connected_at = Some(now);
        self.last_activity = Some(now);
    }

    pub(crate) fn record_disconnected(&mut self) {
        self.connected_at = None;
    }

    pub(crate) fn record_sent(&mut self, size: usize) {
        self.messages_sent += 1;
        self.bytes_sent += size as u64;
        self.last_activity = Some(SystemTime::now());
    }

    pub(crate) fn record_received(&mut self, size: usize) {
        self.messages_received += 1;
        self.bytes_received += size as u64;
        self.last_activity = Some(SystemTime::now());
    }

    pub(crate) fn record_error(&mut self) {
        self.error_count += 1;
    }

    /// Time since the current connection was established
    pub fn uptime(&self) -> Option<Duration> {
        self.connected_at
            .map(|at| SystemTime::now().duration_since(at).unwrap_or_default())
    }

    /// Time since the last successful I/O
    pub fn idle_time(&self) -> Option<Duration> {
        self.last_activity
            .map(|at| SystemTime::now().duration_since(at).unwrap_or_default())
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "Disconnected"),
            LinkState::Connected => write!(f, "Connected"),
        }
    }
}
