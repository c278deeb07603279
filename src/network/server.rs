//! Relay server the remote host connects to
//!
//! The game side listens; at most one host is attached at a time. A new
//! connection replaces the current host, so a host who drops out can simply
//! reconnect. The last message sent is replayed to a newly attached host.

use super::peer::Peer;
use super::protocol::Message;
use super::HostLink;
use std::collections::VecDeque;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default relay port
pub const DEFAULT_PORT: u16 = 8081;

/// Ports to try above the starting port before giving up
const PORT_RANGE: u16 = 100;

pub struct HostRelay {
    /// Local address the relay is bound to
    addr: SocketAddr,
    /// Newly accepted connections
    new_peers_rx: Receiver<Peer>,
    /// The attached host, if any
    host: Option<Peer>,
    /// Replayed to a host that attaches later
    last_sent: Option<Message>,
    /// Replies received but not yet polled
    pending: VecDeque<Message>,
    /// Stops the accept loop
    running: Arc<AtomicBool>,
}

impl HostRelay {
    /// Listen on `start_port`, walking upward if it is taken
    pub fn start_on_port(start_port: u16) -> io::Result<Self> {
        let max_port = start_port.saturating_add(PORT_RANGE);
        let mut port = start_port;
        let listener = loop {
            match TcpListener::bind(("0.0.0.0", port)) {
                Ok(l) => break l,
                Err(e) if e.kind() == io::ErrorKind::AddrInUse && port < max_port => {
                    port += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let (new_peers_tx, new_peers_rx) = channel();
        let running = Arc::new(AtomicBool::new(true));
        let accept_running = Arc::clone(&running);

        thread::spawn(move || {
            accept_loop(listener, new_peers_tx, accept_running);
        });

        tracing::info!(%addr, "host relay listening");
        Ok(HostRelay {
            addr,
            new_peers_rx,
            host: None,
            last_sent: None,
            pending: VecDeque::new(),
            running,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Attach any host waiting in the accept queue; true if one was attached
    fn accept_pending(&mut self) -> bool {
        let mut attached = false;
        loop {
            match self.new_peers_rx.try_recv() {
                Ok(peer) => {
                    tracing::info!(addr = %peer.addr, "host connected");
                    if let Some(msg) = &self.last_sent {
                        let _ = peer.send(msg.clone());
                    }
                    self.host = Some(peer);
                    attached = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        attached
    }

    /// Accept new hosts, drain replies and notice a dropped host
    fn pump(&mut self) {
        self.accept_pending();
        if let Some(host) = self.host.as_mut() {
            self.pending.extend(host.recv_all());
        }
        self.drop_dead_host();
    }

    fn drop_dead_host(&mut self) {
        if self.host.as_ref().is_some_and(|h| !h.is_alive()) {
            if let Some(host) = self.host.take() {
                tracing::warn!(addr = %host.addr, "host disconnected");
            }
        }
    }
}

impl HostLink for HostRelay {
    fn send(&mut self, msg: Message) {
        self.accept_pending();
        tracing::debug!(text = %msg.to_text(), "to host");
        if let Some(host) = &self.host {
            if let Err(e) = host.send(msg.clone()) {
                tracing::warn!(error = %e, "failed to reach host");
            }
        }
        self.last_sent = Some(msg);
    }

    fn poll(&mut self) -> Option<Message> {
        self.pump();
        let msg = self.pending.pop_front();
        if let Some(msg) = &msg {
            tracing::debug!(text = %msg.to_text(), "from host");
        }
        msg
    }

    fn poll_for_connection(&mut self) -> bool {
        self.pump();
        self.host.is_some()
    }

    fn is_connected(&self) -> bool {
        self.host.as_ref().is_some_and(|h| h.is_alive())
    }
}

impl Drop for HostRelay {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

fn accept_loop(listener: TcpListener, tx: Sender<Peer>, running: Arc<AtomicBool>) {
    while running.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, _addr)) => {
                if let Ok(peer) = Peer::new(stream) {
                    if tx.send(peer).is_err() {
                        break;
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(_) => break,
        }
    }
}
