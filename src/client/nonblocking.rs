use std::io::{Error, ErrorKind};
use std::net::SocketAddr;

use log::{debug, error, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{ClientError, CoAPResponse, RequestOptions};
use crate::message::{self, encode_get, encode_get_segments, EncodedRequest, Entropy, RngEntropy};
use crate::transport::{Transport, UdpTransport};

/// A client issuing one GET at a time to a single peer.
pub struct CoAPClientAsync<T = UdpTransport> {
    peer_addr: SocketAddr,
    transport: T,
    entropy: Box<dyn Entropy + Send>,
}

impl CoAPClientAsync<UdpTransport> {
    /// Resolves `peer_addr` and uses a UDP transport.
    pub async fn new_udp<A>(peer_addr: A) -> Result<Self, ClientError>
    where
        A: tokio::net::ToSocketAddrs,
    {
        let peer_addr = match tokio::net::lookup_host(peer_addr).await?.next() {
            Some(addr) => addr,
            None => {
                error!("No peer address found");
                return Err(Error::new(ErrorKind::NotFound, "no peer address found").into());
            }
        };

        Ok(Self::with_transport(peer_addr, UdpTransport::new()))
    }
}

impl<T: Transport> CoAPClientAsync<T> {
    pub fn with_transport(peer_addr: SocketAddr, transport: T) -> Self {
        Self {
            peer_addr,
            transport,
            entropy: Box::new(RngEntropy(StdRng::from_entropy())),
        }
    }

    /// Replaces the token and message id source.
    pub fn set_entropy<E: Entropy + Send + 'static>(&mut self, entropy: E) {
        self.entropy = Box::new(entropy);
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Execute a GET request for `path` and decode the reply.
    pub async fn get(
        &mut self,
        path: &str,
        opts: &RequestOptions,
    ) -> Result<CoAPResponse, ClientError> {
        let request = encode_get(path, opts.token_length, self.entropy.as_mut())?;
        debug!(
            "GET {} to {} (mid {}, token {:02x?})",
            path, self.peer_addr, request.message_id, request.token
        );
        self.send(request, opts).await
    }

    /// Execute a GET request with one Uri-Path option per segment, each
    /// sent as given.
    pub async fn get_segments<I, S>(
        &mut self,
        segments: I,
        opts: &RequestOptions,
    ) -> Result<CoAPResponse, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let request = encode_get_segments(segments, opts.token_length, self.entropy.as_mut())?;
        debug!(
            "GET to {} (mid {}, token {:02x?}): {:02x?}",
            self.peer_addr, request.message_id, request.token, request.bytes
        );
        self.send(request, opts).await
    }

    async fn send(
        &self,
        request: EncodedRequest,
        opts: &RequestOptions,
    ) -> Result<CoAPResponse, ClientError> {
        let reply = self
            .transport
            .exchange(self.peer_addr, &request.bytes, opts.timeout)
            .await?;

        let message = message::decode(&reply).map_err(|e| {
            debug!("Error decoding reply {:02x?}: {}", reply, e);
            e
        })?;

        if message.get_message_id() != request.message_id || message.get_token() != request.token {
            warn!(
                "reply does not match request (mid {} / {}, token {:02x?} / {:02x?})",
                message.get_message_id(),
                request.message_id,
                message.get_token(),
                request.token
            );
        }

        Ok(CoAPResponse { message })
    }
}
