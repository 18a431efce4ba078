//! Low-level byte stream parser for class file decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data parser
//! for reading class file structures and bytecode. It offers bounds-checked access to big-endian
//! data, length-prefixed sections and the "modified UTF-8" text encoding used by the constant pool
//! (JVMS §4.4.7).
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::seek`] - Move to specific position
//! - [`crate::file::parser::Parser::advance_by`] - Move forward by specified bytes
//! - [`crate::file::parser::Parser::pos`] - Get current position
//! - [`crate::file::parser::Parser::align`] - Align to byte boundaries (`tableswitch` padding)
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_be`] - Read primitive types (big-endian)
//! - [`crate::file::parser::Parser::read_bytes`] - Borrow a sub-slice and advance past it
//! - [`crate::file::parser::Parser::read_sized`] - Split off a length-checked sub-parser
//! - [`crate::file::parser::Parser::read_modified_utf8`] - Decode modified UTF-8 text
//!
//! # Examples
//!
//! ```rust
//! use classref::Parser;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_be::<u32>()?, 0xCAFEBABE);
//! parser.seek(6)?;
//! assert_eq!(parser.read_be::<u16>()?, 52);
//! # Ok::<(), classref::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, ClassIO},
    Result,
};

/// A generic binary data parser for reading class file structures.
///
/// `Parser` provides a cursor-based interface for reading big-endian binary data. The parser
/// maintains an internal position cursor and provides bounds checking to prevent buffer
/// overruns when reading malformed or truncated data. Every failed read reports
/// [`crate::Error::Malformed`].
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classref::Parser;
    /// let data = [0x01, 0x02];
    /// let mut parser = Parser::new(&data);
    /// assert!(parser.has_more_data());
    ///
    /// let _value = parser.read_be::<u16>()?;
    /// assert!(!parser.has_more_data());
    /// # Ok::<(), classref::Error>(())
    /// ```
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the current position to the specified index.
    ///
    /// Seeking to exactly the end of the data is allowed; the next read will fail.
    ///
    /// # Arguments
    /// * `pos` - The position to move the cursor to
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Arguments
    /// * `step` - Amount of bytes to advance
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        let end = self.calc_end_position(step)?;
        self.position = end;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Peek at the current byte without advancing.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the parser is at the end of its data.
    pub fn peek_byte(&self) -> Result<u8> {
        match self.data.get(self.position) {
            Some(byte) => Ok(*byte),
            None => Err(out_of_bounds_error!()),
        }
    }

    /// Align the position to a specific boundary, measured from the start of the data.
    ///
    /// `tableswitch` and `lookupswitch` pad their operands to a 4-byte boundary relative to the
    /// start of the method's code array, so a parser over the code array aligns correctly.
    ///
    /// # Arguments
    /// * `alignment` - The boundary to align to (must be a power of 2)
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if aligning would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classref::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
    /// let mut parser = Parser::new(&data);
    ///
    /// parser.advance_by(1)?;
    /// parser.align(4)?;
    /// assert_eq!(parser.pos(), 4);
    /// # Ok::<(), classref::Error>(())
    /// ```
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = (alignment - (self.position % alignment)) % alignment;
        self.advance_by(padding)
    }

    /// Read a type `T` from the current position in big-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if reading would exceed the data length.
    pub fn read_be<T: ClassIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Returns the number of bytes left between the current position and the end of data.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Ensure at least `needed` bytes are available at the current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if fewer bytes are available.
    pub fn ensure_remaining(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(out_of_bounds_error!());
        }
        Ok(())
    }

    /// Compute the position `length` bytes past the current one, checking bounds and overflow.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the end position is beyond the data.
    pub fn calc_end_position(&self, length: usize) -> Result<usize> {
        let Some(end) = self.position.checked_add(length) else {
            return Err(out_of_bounds_error!());
        };
        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }
        Ok(end)
    }

    /// Read a slice of `length` bytes and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if reading would exceed the data length.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.calc_end_position(length)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Split off the next `length` bytes as an independent parser and advance past them.
    ///
    /// Used for length-prefixed sections such as attributes: the sub-parser cannot read beyond
    /// the declared length, and the caller can verify the section was consumed completely.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the section runs past the end of the data.
    pub fn read_sized(&mut self, length: usize) -> Result<Parser<'a>> {
        Ok(Parser::new(self.read_bytes(length)?))
    }

    /// Read a `u2`-length-prefixed modified UTF-8 string, as stored in `CONSTANT_Utf8_info`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on truncation or invalid encoding.
    pub fn read_prefixed_modified_utf8(&mut self) -> Result<String> {
        let length = self.read_be::<u16>()?;
        let bytes = self.read_bytes(usize::from(length))?;
        decode_modified_utf8(bytes)
    }

    /// Decode `length` bytes of modified UTF-8 at the current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on truncation or invalid encoding.
    pub fn read_modified_utf8(&mut self, length: usize) -> Result<String> {
        let bytes = self.read_bytes(length)?;
        decode_modified_utf8(bytes)
    }
}

/// Decode the JVM's "modified UTF-8" (JVMS §4.4.7).
///
/// Differences from standard UTF-8: NUL is encoded as `C0 80`, no byte may be `0x00` or
/// `0xF0..=0xFF`, and supplementary characters are encoded as two three-byte surrogates.
/// Unpaired surrogates are legal in class files and decode to U+FFFD.
fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if bytes.iter().all(|b| (0x01..0x80).contains(b)) {
        // Pure ASCII is identical in both encodings
        return match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Err(malformed_error!("Invalid ASCII text in constant")),
        };
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        let first = bytes[index];
        match first {
            0x01..=0x7F => {
                units.push(u16::from(first));
                index += 1;
            }
            0xC0..=0xDF => {
                let Some(&second) = bytes.get(index + 1) else {
                    return Err(malformed_error!("Truncated modified UTF-8 sequence"));
                };
                if second & 0xC0 != 0x80 {
                    return Err(malformed_error!("Invalid modified UTF-8 continuation byte"));
                }
                units.push((u16::from(first & 0x1F) << 6) | u16::from(second & 0x3F));
                index += 2;
            }
            0xE0..=0xEF => {
                let (Some(&second), Some(&third)) = (bytes.get(index + 1), bytes.get(index + 2))
                else {
                    return Err(malformed_error!("Truncated modified UTF-8 sequence"));
                };
                if second & 0xC0 != 0x80 || third & 0xC0 != 0x80 {
                    return Err(malformed_error!("Invalid modified UTF-8 continuation byte"));
                }
                units.push(
                    (u16::from(first & 0x0F) << 12)
                        | (u16::from(second & 0x3F) << 6)
                        | u16::from(third & 0x3F),
                );
                index += 3;
            }
            _ => {
                return Err(malformed_error!(
                    "Invalid modified UTF-8 byte 0x{:02X} at {}",
                    first,
                    index
                ))
            }
        }
    }

    Ok(char::decode_utf16(units.iter().copied())
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}
