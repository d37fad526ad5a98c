//! CoAP message encoding and decoding.

pub mod cursor;
pub mod header;
pub mod options;
pub mod packet;
pub mod request;
pub mod response;
pub mod uvar;

pub use header::{code_to_str, status_name, Header, MessageType};
pub use packet::{decode, CoapMessage, PackageError, ParseError};
pub use request::{encode_get, encode_get_segments, EncodedRequest, Entropy, RngEntropy};
pub use response::encode_response;
