use rand::rngs::ThreadRng;
use rand::Rng;

use super::header::{self, Header, MessageType};
use super::options::{self, write_option};
use super::packet::PackageError;

/// Source of the token bytes and message id for a new request.
pub trait Entropy {
    fn token(&mut self, len: usize) -> Vec<u8>;
    fn message_id(&mut self) -> u16;
}

/// [`Entropy`] backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RngEntropy<R>(pub R);

impl RngEntropy<ThreadRng> {
    pub fn thread() -> Self {
        RngEntropy(rand::thread_rng())
    }
}

impl<R: Rng> Entropy for RngEntropy<R> {
    fn token(&mut self, len: usize) -> Vec<u8> {
        let mut token = vec![0u8; len];
        self.0.fill(&mut token[..]);
        token
    }

    fn message_id(&mut self) -> u16 {
        self.0.gen()
    }
}

/// An encoded request along with what the reply should echo back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRequest {
    pub bytes: Vec<u8>,
    pub token: Vec<u8>,
    pub message_id: u16,
}

/// Builds a Confirmable GET for `path`, one Uri-Path option per non-empty
/// segment. The request carries no payload.
pub fn encode_get<E: Entropy + ?Sized>(
    path: &str,
    token_length: usize,
    entropy: &mut E,
) -> Result<EncodedRequest, PackageError> {
    encode_get_segments(path.split('/'), token_length, entropy)
}

/// Like [`encode_get`] with the path already split. Segments are written
/// as given, so a segment may contain `/` or any other byte; empty ones
/// are dropped.
pub fn encode_get_segments<I, S, E>(
    segments: I,
    token_length: usize,
    entropy: &mut E,
) -> Result<EncodedRequest, PackageError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
    E: Entropy + ?Sized,
{
    if token_length > header::MAX_TOKEN_LENGTH {
        return Err(PackageError::InvalidTokenLength);
    }

    let token = entropy.token(token_length);
    let message_id = entropy.message_id();

    let mut header = Header::new();
    header.set_type(MessageType::Confirmable);
    header.set_token_length(token_length as u8);
    header.code = header::CODE_GET;
    header.set_message_id(message_id);

    let mut bytes = Vec::with_capacity(header::HEADER_LEN + token_length + 16);
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&token);

    let mut last_option = 0;
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() {
            continue;
        }
        write_option(&mut bytes, &mut last_option, options::URI_PATH, segment)?;
    }

    Ok(EncodedRequest {
        bytes,
        token,
        message_id,
    })
}
