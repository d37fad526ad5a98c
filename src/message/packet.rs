use std::error;
use std::fmt;

use super::cursor::Cursor;
use super::header::{self, Header, MessageType};
use super::options::OptionIter;

/// Why a datagram could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageError {
    InvalidTokenLength,
    /// An option delta or value length beyond what the two-byte
    /// extension can carry.
    OptionTooLarge,
    InvalidOptionOrder,
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageError::InvalidTokenLength => write!(f, "token length must be 0 to 8"),
            PackageError::OptionTooLarge => write!(f, "option delta or length too large"),
            PackageError::InvalidOptionOrder => write!(f, "options must be in ascending order"),
        }
    }
}

impl error::Error for PackageError {}

/// Why a received datagram was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Shorter than the header, the token, or an option value.
    TruncatedBuffer,
    InvalidVersion,
    InvalidTokenLength,
    /// An extended delta or length ran off the end of the buffer.
    TruncatedExtension,
    /// Nibble 15 in a delta or length position.
    ReservedNibble,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::TruncatedBuffer => write!(f, "truncated buffer"),
            ParseError::InvalidVersion => write!(f, "invalid version"),
            ParseError::InvalidTokenLength => write!(f, "invalid token length"),
            ParseError::TruncatedExtension => write!(f, "truncated option extension"),
            ParseError::ReservedNibble => write!(f, "reserved option nibble"),
        }
    }
}

impl error::Error for ParseError {}

/// A decoded datagram. Options are validated and skipped, not kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoapMessage {
    pub header: Header,
    token: Vec<u8>,
    pub payload: Vec<u8>,
}

impl CoapMessage {
    #[inline]
    pub fn get_version(&self) -> u8 {
        self.header.get_version()
    }

    #[inline]
    pub fn get_type(&self) -> MessageType {
        self.header.get_type()
    }

    #[inline]
    pub fn get_token_length(&self) -> u8 {
        self.header.get_token_length()
    }

    #[inline]
    pub fn get_code(&self) -> u8 {
        self.header.code
    }

    #[inline]
    pub fn get_message_id(&self) -> u16 {
        self.header.get_message_id()
    }

    pub fn get_token(&self) -> &[u8] {
        &self.token
    }

    /// The code as `class.detail`.
    pub fn get_status(&self) -> String {
        header::code_to_str(self.header.code)
    }

    /// Decodes a byte slice in a single forward pass.
    pub fn from_bytes(buf: &[u8]) -> Result<CoapMessage, ParseError> {
        let mut cursor = Cursor::new(buf);

        let header = Header::read(&mut cursor)?;
        if header.get_version() != header::VERSION {
            return Err(ParseError::InvalidVersion);
        }

        let token_length = header.get_token_length() as usize;
        if token_length > header::MAX_TOKEN_LENGTH {
            return Err(ParseError::InvalidTokenLength);
        }
        let token = cursor
            .take_exact(token_length)
            .ok_or(ParseError::TruncatedBuffer)?
            .to_vec();

        let mut options = OptionIter::from_cursor(cursor);
        for option in options.by_ref() {
            option?;
        }
        let payload = options.remainder().to_vec();

        Ok(CoapMessage {
            header,
            token,
            payload,
        })
    }
}

/// Decodes a response datagram.
pub fn decode(buf: &[u8]) -> Result<CoapMessage, ParseError> {
    CoapMessage::from_bytes(buf)
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::{QuickCheck, TestResult};

    #[test]
    fn test_decode_minimal_datagram() {
        let msg = decode(&[0x40, 0x45, 0x00, 0x01]).unwrap();
        assert_eq!(msg.get_version(), 1);
        assert_eq!(msg.get_type(), MessageType::Confirmable);
        assert_eq!(msg.get_token_length(), 0);
        assert_eq!(msg.get_message_id(), 1);
        assert_eq!(msg.get_status(), "2.05");
        assert!(msg.get_token().is_empty());
        assert!(msg.payload.is_empty());
    }

    #[test]
    fn test_decode_packet_with_payload() {
        let buf = [
            0x64, 0x45, 0x13, 0xFD, 0xD0, 0xE2, 0x4D, 0xAC, 0xFF, 0x48, 0x65, 0x6C, 0x6C, 0x6F,
        ];
        let msg = decode(&buf).unwrap();
        assert_eq!(msg.get_type(), MessageType::Acknowledgement);
        assert_eq!(msg.get_token_length(), 4);
        assert_eq!(msg.get_code(), header::CODE_CONTENT);
        assert_eq!(msg.get_message_id(), 5117);
        assert_eq!(msg.get_token(), &[0xD0, 0xE2, 0x4D, 0xAC]);
        assert_eq!(msg.payload, b"Hello".to_vec());
    }

    #[test]
    fn test_decode_payload_without_options() {
        let mut buf = vec![0x40, 0x45, 0x00, 0x01, 0xFF];
        buf.extend_from_slice(b"hello");
        assert_eq!(decode(&buf).unwrap().payload, b"hello".to_vec());
    }

    #[test]
    fn test_decode_packet_with_options() {
        // Uri-Path "Hi", Uri-Path "Test", Uri-Query "a=1", no payload
        let buf = [
            0x44, 0x01, 0x84, 0x9e, 0x51, 0x55, 0x77, 0xe8, 0xb2, 0x48, 0x69, 0x04, 0x54, 0x65,
            0x73, 0x74, 0x43, 0x61, 0x3d, 0x31,
        ];
        let msg = decode(&buf).unwrap();
        assert_eq!(msg.get_message_id(), 33950);
        assert_eq!(msg.get_token(), &[0x51, 0x55, 0x77, 0xE8]);
        assert!(msg.payload.is_empty());
    }

    #[test]
    fn test_decode_options_then_payload() {
        // Content-Format 0 (empty value), marker, "22.5"
        let buf = [0x60, 0x45, 0x00, 0x02, 0xC0, 0xFF, b'2', b'2', b'.', b'5'];
        assert_eq!(decode(&buf).unwrap().payload, b"22.5".to_vec());
    }

    #[test]
    fn test_decode_marker_without_payload() {
        let msg = decode(&[0x40, 0x45, 0x00, 0x01, 0xFF]).unwrap();
        assert!(msg.payload.is_empty());
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert_eq!(decode(&[]), Err(ParseError::TruncatedBuffer));
        assert_eq!(decode(&[0x40]), Err(ParseError::TruncatedBuffer));
        assert_eq!(decode(&[0x40, 0x45, 0x00]), Err(ParseError::TruncatedBuffer));
    }

    #[test]
    fn test_header_errors() {
        assert_eq!(decode(&[0x00, 0x45, 0x00, 0x01]), Err(ParseError::InvalidVersion));
        assert_eq!(decode(&[0x80, 0x45, 0x00, 0x01]), Err(ParseError::InvalidVersion));
        assert_eq!(decode(&[0x49, 0x45, 0x00, 0x01]), Err(ParseError::InvalidTokenLength));
        assert_eq!(decode(&[0x4F, 0x45, 0x00, 0x01]), Err(ParseError::InvalidTokenLength));
        assert_eq!(decode(&[0x42, 0x45, 0x00, 0x01, 0xAA]), Err(ParseError::TruncatedBuffer));
    }

    #[test]
    fn test_option_errors() {
        let head = [0x40, 0x45, 0x00, 0x01];
        let cases: [(&[u8], ParseError); 5] = [
            (&[0xF0], ParseError::ReservedNibble),
            (&[0x0F, 0x00, 0x00], ParseError::ReservedNibble),
            (&[0xD0], ParseError::TruncatedExtension),
            (&[0xE0, 0x01], ParseError::TruncatedExtension),
            (&[0x05, b'a', b'b'], ParseError::TruncatedBuffer),
        ];
        for (options, err) in cases {
            let mut buf = head.to_vec();
            buf.extend_from_slice(options);
            assert_eq!(decode(&buf), Err(err), "options {:02x?}", options);
        }
    }

    #[test]
    fn test_malicious_packet() {
        fn run(x: Vec<u8>) -> TestResult {
            match CoapMessage::from_bytes(&x[..]) {
                Ok(msg) => TestResult::from_bool(
                    msg.get_token().len() == msg.get_token_length() as usize
                        && msg.payload.len() <= x.len(),
                ),
                Err(_) => TestResult::passed(),
            }
        }
        QuickCheck::new()
            .tests(10000)
            .quickcheck(run as fn(Vec<u8>) -> TestResult)
    }
}
