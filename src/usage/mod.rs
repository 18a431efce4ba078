//! Usage extraction.
//!
//! This module turns a decoded [`crate::ClassFile`] into usage edges and delivers them to a
//! [`UsageSink`]. The pipeline for one class file is read, resolve, visit, deliver:
//!
//! 1. [`crate::ClassFile::from_mem`] decodes the container, including every instruction
//!    stream.
//! 2. [`UsageVisitor`] walks the view, resolving constant pool entries on demand.
//! 3. Edges are staged in memory and handed to the sink once the whole class was visited, so a
//!    malformed class file never produces a partial set of edges.
//!
//! # Key Components
//! - [`index`] / [`index_with_config`] - The entry points
//! - [`Symbol`], [`UsageLocation`], [`UsageEdge`] - The symbol model and canonical strings
//! - [`UsageSink`] - Where edges go; implemented by `Vec<UsageEdge>`, [`FnSink`], [`UsageIndex`]
//! - [`IndexConfig`] - Which usage sources to scan
//!
//! # Examples
//!
//! ```rust,no_run
//! use classref::{index, UsageIndex};
//!
//! let usages = UsageIndex::new();
//! for path in ["A.class", "B.class"] {
//!     let bytes = std::fs::read(path)?;
//!     if let Err(error) = index(&bytes, &mut &usages) {
//!         eprintln!("{}: {}", path, error);
//!     }
//! }
//! println!("{:?}", usages.get("m:java/io/PrintStream:println:(Ljava/lang/String;)V"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod index;
mod sink;
mod symbol;
mod visitor;

pub use config::IndexConfig;
pub use index::{DedupPolicy, UsageIndex};
pub use sink::{FnSink, UsageSink};
pub use symbol::{MemberRef, Symbol, UsageEdge, UsageLocation};
pub use visitor::UsageVisitor;

use crate::{ClassFile, Result};

/// Extract every usage edge of one class file and deliver it to `sink`.
///
/// Nothing reaches the sink unless the whole class file decodes and resolves.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `bytes` is not a well-formed class file. The sink is
/// left untouched in that case.
///
/// # Examples
///
/// ```rust,no_run
/// use classref::{index, UsageEdge};
///
/// let bytes = std::fs::read("Foo.class")?;
/// let mut edges: Vec<UsageEdge> = Vec::new();
/// index(&bytes, &mut edges)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn index<S: UsageSink + ?Sized>(bytes: &[u8], sink: &mut S) -> Result<()> {
    index_with_config(bytes, sink, &IndexConfig::default())
}

/// Like [`index`], scanning only the sources enabled in `config`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `bytes` is not a well-formed class file.
pub fn index_with_config<S: UsageSink + ?Sized>(
    bytes: &[u8],
    sink: &mut S,
    config: &IndexConfig,
) -> Result<()> {
    let class = ClassFile::from_mem(bytes)?;
    let visitor = UsageVisitor::with_config(&class, *config)?;

    let mut staged: Vec<UsageEdge> = Vec::new();
    visitor.visit(&mut staged)?;

    log::debug!(
        "{}: {} usage edges from {} methods",
        visitor.class_name(),
        staged.len(),
        class.methods.len()
    );

    for edge in &staged {
        sink.add_edge(edge);
    }
    Ok(())
}
