use std::error;
use std::fmt;
use std::io::{self, Error, ErrorKind};
use std::time::Duration;

use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

use crate::message::{code_to_str, status_name, CoapMessage, PackageError, ParseError};
use crate::transport::TransportError;

mod nonblocking;
pub use nonblocking::CoAPClientAsync;

pub const DEFAULT_PORT: u16 = 5683;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_TOKEN_LENGTH: usize = 4;

/// RequestOptions for configuring CoAP client requests
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// How long to wait for the reply
    pub timeout: Duration,
    /// Number of random token bytes, 0 to 8
    pub token_length: usize,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            token_length: DEFAULT_TOKEN_LENGTH,
        }
    }
}

#[derive(Debug)]
pub enum ClientError {
    /// No reply within the configured timeout.
    Timeout,
    /// A reply arrived but is not a well-formed CoAP message.
    InvalidResponse(ParseError),
    /// The request could not be encoded.
    Package(PackageError),
    Io(io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Timeout => write!(f, "request timeout"),
            ClientError::InvalidResponse(e) => write!(f, "invalid response: {}", e),
            ClientError::Package(e) => write!(f, "invalid request: {}", e),
            ClientError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for ClientError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ClientError::InvalidResponse(e) => Some(e),
            ClientError::Package(e) => Some(e),
            ClientError::Io(e) => Some(e),
            ClientError::Timeout => None,
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout => ClientError::Timeout,
            TransportError::Io(e) => ClientError::Io(e),
        }
    }
}

impl From<ParseError> for ClientError {
    fn from(e: ParseError) -> Self {
        ClientError::InvalidResponse(e)
    }
}

impl From<PackageError> for ClientError {
    fn from(e: PackageError) -> Self {
        ClientError::Package(e)
    }
}

impl From<io::Error> for ClientError {
    fn from(e: io::Error) -> Self {
        ClientError::Io(e)
    }
}

/// A decoded reply.
#[derive(Debug, Clone, PartialEq)]
pub struct CoAPResponse {
    pub message: CoapMessage,
}

impl CoAPResponse {
    /// The response code as `class.detail`.
    pub fn get_status(&self) -> String {
        code_to_str(self.message.get_code())
    }

    pub fn get_status_name(&self) -> Option<&'static str> {
        status_name(self.message.get_code())
    }

    /// The payload as text, invalid UTF-8 replaced.
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.message.payload).into_owned()
    }
}

/// Splits a `coap://host[:port]/path` url into (scheme, host, port, path).
pub fn parse_coap_url(url: &str) -> io::Result<(String, String, u16, String)> {
    let url_params = match Url::parse(url) {
        Ok(url_params) => url_params,
        Err(_) => return Err(Error::new(ErrorKind::InvalidInput, "url error")),
    };

    let scheme = url_params.scheme().to_string();
    if scheme != "coap" {
        return Err(Error::new(ErrorKind::InvalidInput, "scheme error"));
    }

    let host = match url_params.host_str() {
        Some("") | None => return Err(Error::new(ErrorKind::InvalidInput, "host error")),
        Some(h) => h,
    };
    let host = Regex::new(r"^\[(.*?)]$")
        .map_err(|e| Error::new(ErrorKind::Other, e))?
        .replace(host, "$1")
        .to_string();

    let port = url_params.port().unwrap_or(DEFAULT_PORT);

    let path = url_params.path().to_string();

    Ok((scheme, host, port, path))
}

/// The path of a `coap://` url as Uri-Path values: split on `/`, each
/// segment percent-decoded, empty segments dropped.
pub fn url_path_segments(url: &str) -> io::Result<Vec<String>> {
    let url_params = Url::parse(url).map_err(|_| Error::new(ErrorKind::InvalidInput, "url error"))?;

    let segments = match url_params.path_segments() {
        Some(segments) => segments,
        None => return Ok(Vec::new()),
    };
    Ok(segments
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect())
}
