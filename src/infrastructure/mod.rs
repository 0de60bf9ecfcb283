// Infrastructure module - External dependencies and adapters
pub mod config;
pub mod logging;
pub mod serial;
pub mod tcp;

use crate::core::communication::Transport;
use crate::domain::config::{LinkConfig, PeerConfig};
use crate::domain::error::SppComResult;
use serial::{SerialSettings, SerialTransport};
use std::sync::Arc;
use tcp::TcpTransport;

/// Build the transport that carries the link to `peer`
pub fn transport_for(peer: &PeerConfig) -> SppComResult<Arc<dyn Transport>> {
    match &peer.link {
        LinkConfig::Serial { .. } => {
            let settings = SerialSettings::from_link(&peer.link)?;
            Ok(Arc::new(
                SerialTransport::new(settings).bound_to(peer.address.clone()),
            ))
        }
        LinkConfig::Tcp { nodelay } => Ok(Arc::new(TcpTransport::new().with_nodelay(*nodelay))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::communication::TransportType;
    use crate::domain::config::SppComConfig;

    #[test]
    fn test_transport_for_example_peers() {
        let config = SppComConfig::example();

        let serial = transport_for(config.find_peer("esp32").unwrap()).unwrap();
        assert_eq!(serial.transport_type(), TransportType::Serial);

        let tcp = transport_for(config.find_peer("esp32-wifi").unwrap()).unwrap();
        assert_eq!(tcp.transport_type(), TransportType::Tcp);
    }
}
