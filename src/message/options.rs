use super::cursor::Cursor;
use super::packet::{PackageError, ParseError};
use super::uvar;

pub const URI_PATH: usize = 11;
pub const CONTENT_FORMAT: usize = 12;

/// Content-Format value for `text/plain; charset=utf-8`.
pub const TEXT_PLAIN: u8 = 0;

/// Separates the option sequence from the payload.
pub const PAYLOAD_MARKER: u8 = 0xFF;

/// One option as it appears on the wire, with its number already
/// reconstructed from the running delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawOption<'a> {
    pub number: usize,
    pub value: &'a [u8],
}

/// Appends one option to `buf`. `last` is the number of the previously
/// written option (0 before the first) and is updated; numbers must not
/// decrease.
pub fn write_option(
    buf: &mut Vec<u8>,
    last: &mut usize,
    number: usize,
    value: &[u8],
) -> Result<(), PackageError> {
    let delta = number
        .checked_sub(*last)
        .ok_or(PackageError::InvalidOptionOrder)?;
    let delta = uvar::encode(delta).ok_or(PackageError::OptionTooLarge)?;
    let length = uvar::encode(value.len()).ok_or(PackageError::OptionTooLarge)?;

    buf.reserve(1 + delta.extension().len() + length.extension().len() + value.len());
    buf.push(delta.nibble << 4 | length.nibble);
    buf.extend_from_slice(delta.extension());
    buf.extend_from_slice(length.extension());
    buf.extend_from_slice(value);

    *last = number;
    Ok(())
}

/// Walks an option sequence, stopping at the payload marker or at the end
/// of the buffer. The first error ends the iteration.
#[derive(Debug, Clone)]
pub struct OptionIter<'a> {
    cursor: Cursor<'a>,
    last: usize,
    done: bool,
}

impl<'a> OptionIter<'a> {
    /// `buf` starts at the first option header byte (right after the token).
    pub fn new(buf: &'a [u8]) -> OptionIter<'a> {
        Self::from_cursor(Cursor::new(buf))
    }

    pub fn from_cursor(cursor: Cursor<'a>) -> OptionIter<'a> {
        OptionIter {
            cursor,
            last: 0,
            done: false,
        }
    }

    /// Whatever follows the options: the payload once iteration has
    /// finished cleanly, empty if there was none.
    pub fn remainder(mut self) -> &'a [u8] {
        self.cursor.until_end()
    }

    fn read_option(&mut self, byte: u8) -> Result<RawOption<'a>, ParseError> {
        let delta = uvar::decode(byte >> 4, &mut self.cursor)?;
        let length = uvar::decode(byte & 0x0F, &mut self.cursor)?;

        let number = self.last.saturating_add(delta);
        let value = self
            .cursor
            .take_exact(length)
            .ok_or(ParseError::TruncatedBuffer)?;
        self.last = number;

        Ok(RawOption { number, value })
    }
}

impl<'a> Iterator for OptionIter<'a> {
    type Item = Result<RawOption<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let byte = match self.cursor.next() {
            None => {
                self.done = true;
                return None;
            }
            Some(PAYLOAD_MARKER) => {
                self.done = true;
                return None;
            }
            Some(byte) => byte,
        };

        let option = self.read_option(byte);
        if option.is_err() {
            self.done = true;
        }
        Some(option)
    }
}
