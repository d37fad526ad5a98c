use super::cursor::Cursor;
use super::packet::ParseError;

/// The only protocol version defined by RFC 7252.
pub const VERSION: u8 = 1;

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 4;

/// Longest token a header can announce.
pub const MAX_TOKEN_LENGTH: usize = 8;

pub const CODE_GET: u8 = 0x01;
pub const CODE_CONTENT: u8 = 0x45;
pub const CODE_NOT_FOUND: u8 = 0x84;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum MessageType {
    Confirmable,
    NonConfirmable,
    Acknowledgement,
    Reset,
}

impl MessageType {
    fn from_bits(tn: u8) -> MessageType {
        match tn & 0x03 {
            0 => MessageType::Confirmable,
            1 => MessageType::NonConfirmable,
            2 => MessageType::Acknowledgement,
            _ => MessageType::Reset,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            MessageType::Confirmable => 0,
            MessageType::NonConfirmable => 1,
            MessageType::Acknowledgement => 2,
            MessageType::Reset => 3,
        }
    }
}

/// The fixed four-byte message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    ver_type_tkl: u8,
    pub code: u8,
    message_id: u16,
}

impl Header {
    /// A version 1, Confirmable, empty header.
    pub fn new() -> Header {
        let mut header = Header::default();
        header.set_version(VERSION);
        header
    }

    #[inline]
    pub fn set_version(&mut self, v: u8) {
        let type_tkl = 0x3F & self.ver_type_tkl;
        self.ver_type_tkl = (v & 0x03) << 6 | type_tkl;
    }

    #[inline]
    pub fn get_version(&self) -> u8 {
        self.ver_type_tkl >> 6
    }

    #[inline]
    pub fn set_type(&mut self, t: MessageType) {
        let ver_tkl = 0xCF & self.ver_type_tkl;
        self.ver_type_tkl = t.to_bits() << 4 | ver_tkl;
    }

    #[inline]
    pub fn get_type(&self) -> MessageType {
        MessageType::from_bits((0x30 & self.ver_type_tkl) >> 4)
    }

    /// Only the low nibble of `tkl` is kept; callers check the 0..=8 range.
    #[inline]
    pub fn set_token_length(&mut self, tkl: u8) {
        let ver_type = 0xF0 & self.ver_type_tkl;
        self.ver_type_tkl = (tkl & 0x0F) | ver_type;
    }

    #[inline]
    pub fn get_token_length(&self) -> u8 {
        0x0F & self.ver_type_tkl
    }

    #[inline]
    pub fn set_message_id(&mut self, message_id: u16) {
        self.message_id = message_id;
    }

    #[inline]
    pub fn get_message_id(&self) -> u16 {
        self.message_id
    }

    /// The header in wire order.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let [hi, lo] = self.message_id.to_be_bytes();
        [self.ver_type_tkl, self.code, hi, lo]
    }

    /// Reads the four header bytes. Version and token length are not
    /// validated here.
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Header, ParseError> {
        let raw = cursor
            .take_exact(HEADER_LEN)
            .ok_or(ParseError::TruncatedBuffer)?;
        Ok(Header {
            ver_type_tkl: raw[0],
            code: raw[1],
            message_id: u16::from_be_bytes([raw[2], raw[3]]),
        })
    }
}

/// Renders a code byte as `class.detail`, e.g. `0x45` as `2.05`.
pub fn code_to_str(code: u8) -> String {
    let class_code = (0xE0 & code) >> 5;
    let detail_code = 0x1F & code;

    format!("{}.{:02}", class_code, detail_code)
}

/// RFC 7252 name of a method or response code, if it has one.
pub fn status_name(code: u8) -> Option<&'static str> {
    let name = match code {
        0x00 => "Empty",
        0x01 => "GET",
        0x02 => "POST",
        0x03 => "PUT",
        0x04 => "DELETE",

        0x41 => "Created",
        0x42 => "Deleted",
        0x43 => "Valid",
        0x44 => "Changed",
        0x45 => "Content",

        0x80 => "Bad Request",
        0x81 => "Unauthorized",
        0x82 => "Bad Option",
        0x83 => "Forbidden",
        0x84 => "Not Found",
        0x85 => "Method Not Allowed",
        0x86 => "Not Acceptable",
        0x8C => "Precondition Failed",
        0x8D => "Request Entity Too Large",
        0x8F => "Unsupported Content-Format",

        0x90 => "Internal Server Error",
        0x91 => "Not Implemented",
        0x92 => "Bad Gateway",
        0x93 => "Service Unavailable",
        0x94 => "Gateway Timeout",
        0x95 => "Proxying Not Supported",

        _ => return None,
    };
    Some(name)
}
