// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # classref
//!
//! A fast usage extractor for JVM class files. `classref` reads a compiled `.class` file,
//! resolves its constant pool, walks class-level metadata and every method's instruction
//! stream, and reports each *usage edge*: a class, method or field referenced from a class,
//! method or field of the indexed class. The output is meant to feed a cross-reference index
//! answering "who uses symbol X" over a large corpus of compiled code.
//!
//! ## Features
//!
//! - **Strict decoding** - Any deviation from the class file layout fails the whole file; no
//!   partial results, no guessing
//! - **Complete coverage** - Instructions, exception tables, descriptors, generic signatures,
//!   annotations of every kind, bootstrap arguments of `invokedynamic` and dynamic constants
//! - **Injected sinks** - Edges go to any [`UsageSink`]; a thread-safe [`UsageIndex`] is included
//! - **Modern class files** - Major versions 45 (JDK 1.0.2) through 69 (Java SE 25)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use classref::{index, UsageEdge};
//!
//! let bytes = std::fs::read("tests/samples/Dispatcher.class")?;
//! let mut edges: Vec<UsageEdge> = Vec::new();
//! index(&bytes, &mut edges)?;
//!
//! for edge in &edges {
//!     println!("{}", edge);
//! }
//! # Ok::<(), classref::Error>(())
//! ```
//!
//! Each edge prints as `symbol<TAB>location`, for example
//! `m:java/lang/String:trim:()Ljava/lang/String;` used at
//! `m:sample/Dispatcher:convert:(Ljava/lang/Object;)Ljava/lang/Object;`.
//!
//! ### Using the Prelude
//!
//! ```rust,no_run
//! use classref::prelude::*;
//!
//! let class = ClassFile::from_file("tests/samples/Dispatcher.class".as_ref())?;
//! println!("{}", class.summary()?);
//! # Ok::<(), classref::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`classfile`] - The class file reader: constant pool, members, attributes, descriptors,
//!   signatures and the memoizing [`classfile::Resolver`]
//! - [`disassembler`] - The JVM instruction table and decoder
//! - [`usage`] - The symbol model, sinks, the [`UsageVisitor`] and the [`index`] entry points
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! A class file that does not follow the layout yields [`Error::Malformed`]. The failure is
//! scoped to that one file: drivers are expected to report it and continue with the next.
//!
//! ```rust,no_run
//! use classref::{index, Error, UsageIndex};
//!
//! let usages = UsageIndex::new();
//! match index(&std::fs::read("Broken.class")?, &mut &usages) {
//!     Ok(()) => {}
//!     Err(Error::Malformed { message, .. }) => eprintln!("skipping: {}", message),
//!     Err(e) => eprintln!("error: {}", e),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! cargo +nightly fuzz run classfile --release
//! ```
#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use classref::prelude::*;
///
/// let usages = UsageIndex::new();
/// index(&std::fs::read("Foo.class")?, &mut &usages)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub mod prelude;

/// JVM bytecode instructions and their decoder (JVMS §6.5)
///
/// # Key Types
///
/// - [`disassembler::Instruction`] - A decoded instruction
/// - [`disassembler::Operand`] - Instruction operands (immediates, locals, constants, targets)
/// - [`disassembler::FlowType`] - How instructions affect control flow
///
/// # Main Functions
///
/// - [`disassembler::decode_instruction`] - Decode a single instruction
/// - [`disassembler::decode_stream`] - Decode a complete code array
pub mod disassembler;

/// Class file decoding (JVMS §4)
///
/// See [`ClassFile`] for the decoded view and [`classfile::Resolver`] for constant pool
/// resolution.
pub mod classfile;

/// Usage extraction: the symbol model, sinks, the visitor and the entry points
pub mod usage;

/// `classref` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `classref` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use classref::{ClassFile, Error};
///
/// match ClassFile::from_file(std::path::Path::new("Foo.class")) {
///     Ok(class) => println!("Loaded {}", class.name()?),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// # Ok::<(), classref::Error>(())
/// ```
pub use error::Error;

/// The decoded class file view and its header summary.
pub use classfile::{ClassFile, ClassSummary};

/// The usage extraction API.
pub use usage::{
    index, index_with_config, DedupPolicy, FnSink, IndexConfig, MemberRef, Symbol, UsageEdge,
    UsageIndex, UsageLocation, UsageSink, UsageVisitor,
};

/// Provides access to low-level file and memory parsing utilities.
///
/// # Example
///
/// ```rust
/// use classref::{disassembler::decode_instruction, Parser};
/// let code = [0xB1]; // return
/// let mut parser = Parser::new(&code);
/// let instruction = decode_instruction(&mut parser)?;
/// assert_eq!(instruction.mnemonic, "return");
/// # Ok::<(), classref::Error>(())
/// ```
pub use file::{parser::Parser, File};
