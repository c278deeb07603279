//! A framed TCP connection with its own reader and writer threads

use super::protocol::Message;
use std::io::{self, ErrorKind};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

/// A connected peer
pub struct Peer {
    /// Peer's address
    pub addr: SocketAddr,
    /// Channel to send messages to this peer
    tx: Sender<Message>,
    /// Channel to receive messages from this peer
    rx: Receiver<Message>,
    /// Handle used to shut the socket down on drop
    control: TcpStream,
    /// Whether the connection is still alive
    alive: bool,
}

impl Peer {
    /// Create a new peer from a TCP stream
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        let addr = stream.peer_addr()?;

        stream.set_nonblocking(false)?;
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(Duration::from_secs(5)))?;

        let (outgoing_tx, outgoing_rx) = channel::<Message>();
        let (incoming_tx, incoming_rx) = channel::<Message>();

        let mut read_stream = stream.try_clone()?;
        let control = stream.try_clone()?;
        let mut write_stream = stream;

        // Writer thread
        thread::spawn(move || {
            while let Ok(msg) = outgoing_rx.recv() {
                if msg.write_to(&mut write_stream).is_err() {
                    break;
                }
            }
        });

        // Reader thread; blocks until a frame arrives or the socket closes
        thread::spawn(move || loop {
            match Message::read_from(&mut read_stream) {
                Ok(msg) => {
                    if incoming_tx.send(msg).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        });

        Ok(Peer {
            addr,
            tx: outgoing_tx,
            rx: incoming_rx,
            control,
            alive: true,
        })
    }

    /// Connect to a peer at the given address
    pub fn connect(addr: SocketAddr) -> io::Result<Self> {
        let stream = TcpStream::connect_timeout(&addr, Duration::from_secs(5))?;
        Self::new(stream)
    }

    /// Queue a message for this peer
    pub fn send(&self, msg: Message) -> io::Result<()> {
        self.tx
            .send(msg)
            .map_err(|_| io::Error::new(ErrorKind::BrokenPipe, "peer disconnected"))
    }

    /// Try to receive a message from this peer (non-blocking)
    pub fn try_recv(&mut self) -> Option<Message> {
        match self.rx.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.alive = false;
                None
            }
        }
    }

    /// Receive all pending messages from this peer
    pub fn recv_all(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Some(msg) = self.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Check if the peer connection is still alive
    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

impl Drop for Peer {
    fn drop(&mut self) {
        let _ = self.control.shutdown(Shutdown::Both);
    }
}
