//! Remote host relay: the game forwards each clue's expected response to a
//! human host and reads back their verdicts
//!
//! This module provides:
//! - Length-prefixed text framing over TCP
//! - The game-side relay server (default port 8081 with auto-increment)
//! - The host-side client used by the companion binary
//! - mDNS-SD advertisement so the companion can find the game on the LAN

pub mod client;
pub mod peer;
pub mod protocol;
pub mod server;

pub use client::HostClient;
pub use protocol::Message;
pub use server::{HostRelay, DEFAULT_PORT};

use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Service type for mDNS discovery
pub const SERVICE_TYPE: &str = "_buzzboard-host._tcp.local.";

/// Relay protocol version, advertised in the TXT record
pub const PROTOCOL_VERSION: &str = "1";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),
    #[error("mDNS error: {0}")]
    Mdns(#[from] mdns_sd::Error),
}

/// The game's view of the remote host.
///
/// Sending never fails from the caller's point of view; a missing host just
/// means nobody is listening. Polling never blocks.
pub trait HostLink: Send {
    fn send(&mut self, msg: Message);
    /// Next reply from the host, if any
    fn poll(&mut self) -> Option<Message>;
    /// Attach a waiting host; true while one is attached
    fn poll_for_connection(&mut self) -> bool;
    fn is_connected(&self) -> bool;
}

/// Advertises the relay on the local network
pub struct RelayAdvertiser {
    daemon: ServiceDaemon,
    fullname: String,
}

impl RelayAdvertiser {
    pub fn advertise(port: u16) -> Result<Self, RelayError> {
        let daemon = ServiceDaemon::new()?;
        let instance_name = format!("buzzboard-{:08x}", rand::random::<u32>());
        let hostname = format!("{}.local.", instance_name);
        let properties = [("version", PROTOCOL_VERSION)];

        let service_info = ServiceInfo::new(
            SERVICE_TYPE,
            &instance_name,
            &hostname,
            (),
            port,
            &properties[..],
        )?
        .enable_addr_auto();
        let fullname = service_info.get_fullname().to_string();

        daemon.register(service_info)?;
        tracing::info!(port, instance = %instance_name, "advertising relay");
        Ok(Self { daemon, fullname })
    }
}

impl Drop for RelayAdvertiser {
    fn drop(&mut self) {
        let _ = self.daemon.unregister(&self.fullname);
        let _ = self.daemon.shutdown();
    }
}

/// Browse for a game's relay, waiting at most `timeout`
pub fn find_relay(timeout: Duration) -> Result<Option<SocketAddr>, RelayError> {
    let daemon = ServiceDaemon::new()?;
    let receiver = daemon.browse(SERVICE_TYPE)?;
    let deadline = Instant::now() + timeout;

    let mut found = None;
    while found.is_none() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        let Ok(event) = receiver.recv_timeout(remaining) else {
            break;
        };
        if let ServiceEvent::ServiceResolved(info) = event {
            let version = info
                .get_properties()
                .get_property_val_str("version")
                .unwrap_or(PROTOCOL_VERSION)
                .to_string();
            if version != PROTOCOL_VERSION {
                tracing::warn!(%version, "skipping relay with another protocol version");
                continue;
            }
            let addresses: Vec<IpAddr> = info.get_addresses().iter().map(|s| s.to_ip_addr()).collect();
            found = pick_address(&addresses).map(|ip| SocketAddr::new(ip, info.get_port()));
        }
    }

    let _ = daemon.stop_browse(SERVICE_TYPE);
    let _ = daemon.shutdown();
    Ok(found)
}

/// Prefer IPv4; link-local IPv6 needs a scope id that `IpAddr` cannot carry
pub fn pick_address(addresses: &[IpAddr]) -> Option<IpAddr> {
    addresses
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
}
