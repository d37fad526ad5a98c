//! A minimal [CoAP][rfc] GET client.
//!
//! [rfc]: https://tools.ietf.org/rfc/rfc7252.txt
//!
//! The crate covers a small slice of RFC 7252:
//! - building a Confirmable GET with one Uri-Path option per path segment
//! - decoding a reply into its header, token and payload, validating and
//!   skipping any options on the way
//! - formatting response codes as `class.detail`
//! - a UDP transport with a receive timeout, and a client tying it together
//! - a sensor server answering `GET /sensor` from a data file
//!
//! Not covered: retransmission, Observe, blockwise transfer, DTLS and
//! methods other than GET.
//!
//! # Example
//!
//! ```no_run
//! use coap_get::client::{CoAPClientAsync, RequestOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut client = CoAPClientAsync::new_udp("127.0.0.1:5683").await.unwrap();
//!     let response = client.get("/sensor", &RequestOptions::default()).await.unwrap();
//!     println!("{} | {}", response.get_status(), response.payload_text());
//! }
//! ```
//!
//! The codec can be used on its own:
//!
//! ```
//! use coap_get::message::{decode, encode_get, RngEntropy};
//!
//! let request = encode_get("a/bb/ccc", 4, &mut RngEntropy::thread()).unwrap();
//! let echoed = decode(&request.bytes).unwrap();
//! assert_eq!(echoed.get_token(), &request.token[..]);
//! assert_eq!(echoed.get_status(), "0.01");
//! ```

pub mod client;
pub mod message;
pub mod server;
pub mod transport;

pub use self::client::{CoAPClientAsync, CoAPResponse, ClientError, RequestOptions};
pub use self::message::{CoapMessage, ParseError};
pub use self::server::CoAPServer;
pub use self::transport::{Transport, TransportError, UdpTransport};
