//! Class file input abstraction.
//!
//! This module owns the raw bytes of one class file. It abstracts over where those bytes live
//! (a memory-mapped file on disk, or a buffer already in memory) and provides the bounds-checked
//! parsing primitives every decoder in this crate is built on.
//!
//! # Key Components
//!
//! ## Core Types
//! - [`crate::file::File`] - A loaded class file, independent of its data source
//! - [`crate::file::Backend`] - Trait for different data sources (disk files, memory buffers)
//!
//! ## Parsing Infrastructure
//! - [`crate::file::parser::Parser`] - Cursor-based big-endian reader
//! - [`crate::file::io`] - Low-level big-endian read primitives
//!
//! ## Backend Implementations
//! - [`crate::file::physical::Physical`] - Memory-mapped file backend for disk access
//! - [`crate::file::memory::Memory`] - In-memory buffer backend
//!
//! # Examples
//!
//! ```rust,no_run
//! use classref::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("tests/samples/Dispatcher.class"))?;
//! println!("Loaded class file with {} bytes", file.len());
//! # Ok::<(), classref::Error>(())
//! ```

pub mod io;
mod memory;
pub mod parser;
mod physical;

use std::path::Path;

use memory::Memory;
use physical::Physical;

use crate::Result;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of class file data, allowing for both in-memory and
/// on-disk representations. All implementations must be thread-safe. A backend only has to
/// expose its bytes; length and bounds-checked slicing are derived from them.
pub trait Backend: Send + Sync {
    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let data = self.data();
        offset
            .checked_add(len)
            .and_then(|end| data.get(offset..end))
            .ok_or_else(|| out_of_bounds_error!())
    }
}

/// A loaded class file.
///
/// `File` only holds bytes; decoding happens in [`crate::ClassFile`]. Keeping the two apart lets
/// a driver memory-map a file once and hand the slice to the decoder without copying.
///
/// # Examples
///
/// ```rust,no_run
/// use classref::{ClassFile, File};
///
/// let file = File::from_mem(std::fs::read("Foo.class")?)?;
/// let class = ClassFile::from_mem(file.data())?;
/// println!("{}", class.name()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File").field("len", &self.data.len()).finish_non_exhaustive()
    }
}

impl File {
    /// Loads a class file from the given path. The file is memory-mapped.
    ///
    /// # Arguments
    ///
    /// * `file` - Path to the class file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped, or if it is empty.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Wraps a memory buffer holding a class file.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes of the class file.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(malformed_error!("Provided input was empty"));
        }

        Ok(File {
            data: Box::new(data),
        })
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the complete class file data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a bounds-checked slice of the class file data.
    ///
    /// # Errors
    ///
    /// Returns an error if `offset + len` exceeds the file size.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }
}
