//! A sensor server: `GET /sensor` is answered with the last non-empty line
//! of a data file, everything else with 4.04.

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use log::{debug, error, info, trace};
use tokio::net::{ToSocketAddrs, UdpSocket};

use crate::message::header::{self, CODE_CONTENT, CODE_GET, CODE_NOT_FOUND};
use crate::message::options::{OptionIter, URI_PATH};
use crate::message::{encode_response, CoapMessage, ParseError};
use crate::transport::MAX_DATAGRAM_SIZE;

/// Data file read when `COAP_DATAFILE` is not set.
pub const DEFAULT_DATAFILE: &str = "/opt/coap/data.txt";
pub const SENSOR_PATH: &str = "sensor";

const NO_DATA: &[u8] = b"NO_DATA";
const NOT_FOUND: &[u8] = b"NOT_FOUND";

/// Longest line sent back; the rest is cut off.
pub const MAX_PAYLOAD: usize = 1024;

pub struct CoAPServer {
    socket: UdpSocket,
    datafile: PathBuf,
}

impl CoAPServer {
    /// Binds the server socket. The data file is read on every request, so
    /// it does not have to exist yet.
    pub async fn bind<A: ToSocketAddrs>(addr: A, datafile: impl Into<PathBuf>) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(CoAPServer {
            socket,
            datafile: datafile.into(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn datafile(&self) -> &Path {
        &self.datafile
    }

    /// Serves requests until the task is dropped.
    pub async fn run(&self) {
        if let Ok(addr) = self.local_addr() {
            info!("serving {} on {}", self.datafile.display(), addr);
        }
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            let (nread, src) = match self.socket.recv_from(&mut buf).await {
                Ok(v) => v,
                Err(e) => {
                    error!("receive error: {}", e);
                    continue;
                }
            };
            trace!("received {:02x?} from {}", &buf[..nread], src);

            let reply = match self.handle_request(&buf[..nread]).await {
                Some(reply) => reply,
                None => continue,
            };
            if let Err(e) = self.socket.send_to(&reply, src).await {
                error!("send to {} failed: {}", src, e);
            }
        }
    }

    /// Builds the reply to one datagram, or `None` when the datagram is
    /// not a well-formed CoAP message and gets dropped.
    pub async fn handle_request(&self, datagram: &[u8]) -> Option<Vec<u8>> {
        let (request, path) = match parse_request(datagram) {
            Ok(v) => v,
            Err(e) => {
                debug!("dropping malformed request: {}", e);
                return None;
            }
        };
        debug!(
            "{} /{} (mid {})",
            header::code_to_str(request.get_code()),
            path,
            request.get_message_id()
        );

        let (code, payload) = if path == SENSOR_PATH && request.get_code() == CODE_GET {
            let reading = self.read_last_line().await;
            (CODE_CONTENT, reading.unwrap_or_else(|| NO_DATA.to_vec()))
        } else {
            (CODE_NOT_FOUND, NOT_FOUND.to_vec())
        };

        match encode_response(
            request.get_type(),
            request.get_token(),
            request.get_message_id(),
            code,
            &payload,
        ) {
            Ok(reply) => Some(reply),
            Err(e) => {
                error!("cannot build reply: {}", e);
                None
            }
        }
    }

    async fn read_last_line(&self) -> Option<Vec<u8>> {
        let data = match tokio::fs::read(&self.datafile).await {
            Ok(data) => data,
            Err(e) => {
                debug!("cannot read {}: {}", self.datafile.display(), e);
                return None;
            }
        };
        last_line(&data).map(|line| line[..line.len().min(MAX_PAYLOAD)].to_vec())
    }
}

/// Decodes a request and joins its Uri-Path options with `/`.
fn parse_request(datagram: &[u8]) -> Result<(CoapMessage, String), ParseError> {
    let request = CoapMessage::from_bytes(datagram)?;
    let options = &datagram[header::HEADER_LEN + request.get_token().len()..];

    let mut segments = Vec::new();
    for option in OptionIter::new(options) {
        let option = option?;
        if option.number == URI_PATH && !option.value.is_empty() {
            segments.push(String::from_utf8_lossy(option.value).into_owned());
        }
    }
    Ok((request, segments.join("/")))
}

/// The last line that is not empty once trailing `\r`s are stripped.
fn last_line(data: &[u8]) -> Option<&[u8]> {
    data.split(|&b| b == b'\n')
        .map(|line| {
            let end = line.iter().rposition(|&b| b != b'\r').map_or(0, |i| i + 1);
            &line[..end]
        })
        .filter(|line| !line.is_empty())
        .last()
}
