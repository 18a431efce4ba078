//! Low-level byte order and safe reading utilities for class file parsing.
//!
//! Every multi-byte quantity in a class file is stored big-endian (JVMS §4). This module provides
//! the bounds-checked primitives the rest of the crate builds on: the [`crate::file::io::ClassIO`]
//! trait describing how a primitive is decoded from its big-endian byte representation, and
//! [`crate::file::io::read_be_at`], which performs the actual reads for
//! [`crate::file::parser::Parser`].
//!
//! # Supported Types
//! - **Unsigned integers**: `u8`, `u16`, `u32`, `u64`
//! - **Signed integers**: `i8`, `i16`, `i32`, `i64`
//! - **Floating point**: `f32`, `f64`
//!
//! # Examples
//!
//! ```rust,ignore
//! use classref::file::io::read_be_at;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x41];
//! let mut offset = 0;
//!
//! let magic: u32 = read_be_at(&data, &mut offset)?;
//! let minor: u16 = read_be_at(&data, &mut offset)?;
//! let major: u16 = read_be_at(&data, &mut offset)?;
//!
//! assert_eq!(magic, 0xCAFEBABE);
//! assert_eq!((major, minor), (65, 0));
//! assert_eq!(offset, 8);
//! # Ok::<(), classref::Error>(())
//! ```
//!
//! # Error Handling
//!
//! A read that would run past the end of the buffer returns [`crate::Error::Malformed`]: a
//! truncated class file is a malformed class file.

use crate::Result;

/// Trait for implementing type-specific safe binary data reading operations.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait ClassIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_class_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl ClassIO for $ty {
                type Bytes = [u8; $len];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }
            }
        )*
    };
}

impl_class_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

/// Safely reads a value of type `T` in big-endian byte order from a data buffer at a specific
/// offset.
///
/// The offset is advanced by the number of bytes read. On failure the offset is left untouched.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (will be advanced after reading)
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] if there are insufficient bytes.
pub fn read_be_at<T: ClassIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;

    Ok(T::from_be_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_be_u8() {
        let result = read_be_at::<u8>(&TEST_BUFFER, &mut 0).unwrap();
        assert_eq!(result, 0x1);
    }

    #[test]
    fn read_be_u16() {
        let result = read_be_at::<u16>(&TEST_BUFFER, &mut 0).unwrap();
        assert_eq!(result, 0x102);
    }

    #[test]
    fn read_be_i16() {
        let result = read_be_at::<i16>(&[0xFF, 0xFE], &mut 0).unwrap();
        assert_eq!(result, -2);
    }

    #[test]
    fn read_be_u32() {
        let result = read_be_at::<u32>(&TEST_BUFFER, &mut 0).unwrap();
        assert_eq!(result, 0x1020304);
    }

    #[test]
    fn read_be_i32() {
        let result = read_be_at::<i32>(&TEST_BUFFER, &mut 0).unwrap();
        assert_eq!(result, 0x1020304);
    }

    #[test]
    fn read_be_u64() {
        let result = read_be_at::<u64>(&TEST_BUFFER, &mut 0).unwrap();
        assert_eq!(result, 0x102030405060708);
    }

    #[test]
    fn read_be_f32() {
        let result = read_be_at::<f32>(&TEST_BUFFER, &mut 0).unwrap();
        assert_eq!(result, 2.3879393e-38);
    }

    #[test]
    fn read_be_f64() {
        let result = read_be_at::<f64>(&TEST_BUFFER, &mut 0).unwrap();
        assert_eq!(result, 8.20788039913184e-304);
    }

    #[test]
    fn read_be_from() {
        let mut offset = 2_usize;
        let result = read_be_at::<u16>(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(result, 0x304);
        assert_eq!(offset, 4);
    }

    #[test]
    fn errors() {
        let buffer = [0xFF, 0xFF, 0xFF, 0xFF];

        let result = read_be_at::<u64>(&buffer, &mut 0);
        assert!(matches!(result, Err(crate::Error::Malformed { .. })));

        let mut offset = 3_usize;
        assert!(read_be_at::<u16>(&buffer, &mut offset).is_err());
        assert_eq!(offset, 3);

        let mut offset = usize::MAX;
        assert!(read_be_at::<u8>(&buffer, &mut offset).is_err());
    }
}
