use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// A read past the end of the available data. Class files are never salvaged after a
/// truncation, so this is reported as the same malformed-container kind.
macro_rules! out_of_bounds_error {
    () => {
        crate::Error::Malformed {
            message: "truncated input, read past end of data".to_string(),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The indexing core reports exactly one failure kind, [`Error::Malformed`], whenever the input
/// does not conform to the class file layout: a bad magic number, an unsupported version, a
/// truncated buffer, an out-of-range or wrong-kind constant pool index, an instruction operand
/// running past the end of its code array, or an inconsistent length field. The remaining
/// variants only occur when loading a class file from disk.
///
/// # Examples
///
/// ```rust,no_run
/// use classref::{index, Error, UsageEdge};
///
/// let bytes = std::fs::read("Foo.class")?;
/// let mut edges: Vec<UsageEdge> = Vec::new();
/// match index(&bytes, &mut edges) {
///     Ok(()) => println!("{} edges", edges.len()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed class file: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The container is damaged and could not be parsed.
    ///
    /// This is the `MalformedContainer` failure. It is always fatal for the class file being
    /// processed, and no usage edges of that class file are delivered. The error includes the
    /// source location where the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while opening a class file from disk.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    ///
    /// Used when memory-mapping a file fails, and when a canonical string (symbol reference,
    /// usage location or class summary) cannot be parsed.
    #[error("{0}")]
    Error(String),
}

impl Error {
    /// Returns `true` if this error reports a malformed class file.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_macro_carries_location() {
        let error = malformed_error!("Invalid constant pool tag - {}", 42);
        match &error {
            Error::Malformed {
                message,
                file,
                line,
            } => {
                assert_eq!(message, "Invalid constant pool tag - 42");
                assert!(file.ends_with("error.rs"));
                assert!(*line > 0);
            }
            _ => panic!("expected Malformed"),
        }
        assert!(error.is_malformed());
    }

    #[test]
    fn out_of_bounds_is_malformed() {
        assert!(out_of_bounds_error!().is_malformed());
        assert!(!Error::Error("mmap failed".to_string()).is_malformed());
    }
}
