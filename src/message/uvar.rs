//! The nibble-plus-extension encoding shared by option deltas and lengths.

use super::cursor::Cursor;
use super::packet::ParseError;

/// Largest value the two-byte extension can carry.
pub const MAX_VALUE: usize = 269 + 0xFFFF;

/// An encoded extended value: a 4-bit nibble followed by 0, 1 or 2
/// extension bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extended {
    pub nibble: u8,
    ext: [u8; 2],
    ext_len: usize,
}

impl Extended {
    /// The extension bytes that follow the option header byte.
    pub fn extension(&self) -> &[u8] {
        &self.ext[..self.ext_len]
    }
}

/// Encodes `n`, or returns None when it exceeds [`MAX_VALUE`].
pub fn encode(n: usize) -> Option<Extended> {
    if n < 13 {
        Some(Extended {
            nibble: n as u8,
            ext: [0; 2],
            ext_len: 0,
        })
    } else if n < 269 {
        Some(Extended {
            nibble: 13,
            ext: [(n - 13) as u8, 0],
            ext_len: 1,
        })
    } else if n <= MAX_VALUE {
        Some(Extended {
            nibble: 14,
            ext: ((n - 269) as u16).to_be_bytes(),
            ext_len: 2,
        })
    } else {
        None
    }
}

/// Decodes the value announced by `nibble`, consuming its extension bytes
/// from `cursor`.
pub fn decode(nibble: u8, cursor: &mut Cursor<'_>) -> Result<usize, ParseError> {
    match nibble {
        0..=12 => Ok(nibble as usize),
        13 => cursor
            .next()
            .map(|b| 13 + b as usize)
            .ok_or(ParseError::TruncatedExtension),
        14 => cursor
            .next_u16()
            .map(|v| 269 + v as usize)
            .ok_or(ParseError::TruncatedExtension),
        _ => Err(ParseError::ReservedNibble),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_trip() {
        for n in [0, 1, 12, 13, 14, 268, 269, 270, 65804] {
            let enc = encode(n).unwrap();
            let mut cur = Cursor::new(enc.extension());
            assert_eq!(decode(enc.nibble, &mut cur), Ok(n));
            assert!(cur.is_exhausted(), "{} left bytes behind", n);
        }
    }

    #[test]
    fn test_encode_boundaries() {
        assert_eq!(encode(12).unwrap().nibble, 12);
        assert_eq!(encode(13).unwrap().extension(), &[0]);
        assert_eq!(encode(268).unwrap().extension(), &[255]);
        let enc = encode(269).unwrap();
        assert_eq!(enc.nibble, 14);
        assert_eq!(enc.extension(), &[0, 0]);
        assert_eq!(encode(MAX_VALUE).unwrap().extension(), &[0xFF, 0xFF]);
        assert!(encode(MAX_VALUE + 1).is_none());
    }

    #[test]
    fn test_reserved_nibble() {
        let mut cur = Cursor::new(&[0x00, 0x01, 0x02]);
        assert_eq!(decode(15, &mut cur), Err(ParseError::ReservedNibble));
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_truncated_extension() {
        let mut cur = Cursor::new(&[]);
        assert_eq!(decode(13, &mut cur), Err(ParseError::TruncatedExtension));
        assert_eq!(decode(14, &mut cur), Err(ParseError::TruncatedExtension));

        let mut cur = Cursor::new(&[0x01]);
        assert_eq!(decode(14, &mut cur), Err(ParseError::TruncatedExtension));
        assert_eq!(cur.remaining(), 1);
    }
}
