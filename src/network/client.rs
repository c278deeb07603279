//! Host companion side of the relay

use super::peer::Peer;
use super::protocol::Message;
use super::server::DEFAULT_PORT;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

/// Connection from the host's terminal to the game
pub struct HostClient {
    peer: Peer,
}

impl HostClient {
    /// Connect to a game at the given address
    ///
    /// The address can be:
    /// - "IP:PORT" (e.g., "192.168.1.100:8081")
    /// - "IP" (uses default port 8081)
    /// - "hostname:PORT"
    /// - "hostname" (uses default port)
    pub fn connect(addr: &str) -> io::Result<Self> {
        Self::connect_addr(parse_address(addr)?)
    }

    pub fn connect_addr(addr: SocketAddr) -> io::Result<Self> {
        let peer = Peer::connect(addr)?;
        tracing::info!(%addr, "connected to game");
        Ok(HostClient { peer })
    }

    pub fn send(&self, msg: Message) -> io::Result<()> {
        self.peer.send(msg)
    }

    /// Messages from the game since the last poll
    pub fn poll(&mut self) -> Vec<Message> {
        self.peer.recv_all()
    }

    pub fn is_connected(&self) -> bool {
        self.peer.is_alive()
    }

    pub fn game_addr(&self) -> SocketAddr {
        self.peer.addr
    }
}

/// Parse an address string into a SocketAddr, adding the default port if missing
pub fn parse_address(addr: &str) -> io::Result<SocketAddr> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        return Ok(socket_addr);
    }
    let with_port = if addr.contains(':') {
        addr.to_string()
    } else {
        format!("{}:{}", addr, DEFAULT_PORT)
    };
    with_port
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "could not resolve address"))
}

/// A line typed by the host: a verdict, `continue`, or anything else as text
pub fn parse_command(line: &str) -> Message {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "+" => Message::Verdict(true),
        "n" | "no" | "false" | "-" => Message::Verdict(false),
        "" | "c" | "continue" => Message::Continue,
        _ => Message::Text(line.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_with_port() {
        let addr = parse_address("192.168.1.100:9000").unwrap();
        assert_eq!(addr.port(), 9000);
        assert_eq!(addr.ip().to_string(), "192.168.1.100");
    }

    #[test]
    fn test_parse_address_without_port() {
        let addr = parse_address("127.0.0.1").unwrap();
        assert_eq!(addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_parse_address_localhost() {
        let addr = parse_address("localhost").unwrap();
        assert_eq!(addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("y"), Message::Verdict(true));
        assert_eq!(parse_command(" True\n"), Message::Verdict(true));
        assert_eq!(parse_command("NO"), Message::Verdict(false));
        assert_eq!(parse_command(""), Message::Continue);
        assert_eq!(parse_command("continue"), Message::Continue);
        assert_eq!(parse_command("close enough"), Message::Text("close enough".to_string()));
    }

    #[test]
    fn test_connect_refused() {
        assert!(HostClient::connect("127.0.0.1:1").is_err());
    }
}
