//! # classref Prelude
//!
//! The types needed by most users of the crate: the entry points, the sink contract and its
//! implementations, the symbol model and the class file view.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all classref operations
pub use crate::Error;

/// The result type used throughout classref
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Extract the usage edges of one class file
pub use crate::{index, index_with_config, IndexConfig};

/// The decoded class file view
pub use crate::{ClassFile, ClassSummary};

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Usages
// ================================================================================================

/// Symbols, locations and edges
pub use crate::{MemberRef, Symbol, UsageEdge, UsageLocation};

/// Sinks and the visitor
pub use crate::{DedupPolicy, FnSink, UsageIndex, UsageSink, UsageVisitor};
