use std::error;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, trace};
use tokio::net::UdpSocket;
use tokio::time;

/// Largest datagram accepted from the peer.
pub const MAX_DATAGRAM_SIZE: usize = 1500;

#[derive(Debug)]
pub enum TransportError {
    /// Nothing arrived before the deadline.
    Timeout,
    Io(io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "timed out waiting for a reply"),
            TransportError::Io(e) => write!(f, "network error: {}", e),
        }
    }
}

impl error::Error for TransportError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            TransportError::Io(e) => Some(e),
            TransportError::Timeout => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        TransportError::Io(e)
    }
}

/// Sends one datagram and waits for one reply.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(
        &self,
        peer: SocketAddr,
        packet: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError>;
}

/// UDP transport binding a fresh ephemeral socket per exchange. The socket
/// is connected to the peer, so replies from any other address are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpTransport;

impl UdpTransport {
    pub fn new() -> Self {
        UdpTransport
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn exchange(
        &self,
        peer: SocketAddr,
        packet: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        let bind_addr = match peer {
            SocketAddr::V4(_) => "0.0.0.0:0",
            SocketAddr::V6(_) => "[::]:0",
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(peer).await?;
        debug!("bound to {}", socket.local_addr()?);

        let size = socket.send(packet).await?;
        if size != packet.len() {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::Other,
                "send length error",
            )));
        }
        trace!("sent {:02x?} to {}", packet, peer);

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let nread = time::timeout(timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| TransportError::Timeout)??;
        buf.truncate(nread);
        trace!("received {:02x?} from {}", buf, peer);

        Ok(buf)
    }
}
