//! JVM bytecode disassembler.
//!
//! Decodes a method's code array into [`Instruction`]s using the static opcode table in
//! [`INSTRUCTIONS`]. Decoding is linear: every byte of the code array belongs to exactly one
//! instruction, including `wide` prefixes and switch padding. The reader decodes each `Code`
//! attribute eagerly, so a malformed instruction stream is reported before any usage edge is
//! produced.
//!
//! # Key Types
//! - [`Instruction`] - A decoded instruction with offset, size and operand
//! - [`Operand`] - Decoded operand values (immediates, locals, constant pool indices, targets)
//! - [`FlowType`] - How an instruction affects control flow
//!
//! # Main Functions
//! - [`decode_instruction`] - Decode a single instruction
//! - [`decode_stream`] - Decode a complete code array
//!
//! # Example
//! ```rust
//! use classref::disassembler::decode_instruction;
//! use classref::Parser;
//!
//! let bytecode = [0x00, 0xB1]; // nop, return
//! let mut parser = Parser::new(&bytecode);
//! let instruction = decode_instruction(&mut parser)?;
//! assert_eq!(instruction.mnemonic, "nop");
//! # Ok::<(), classref::Error>(())
//! ```

mod decoder;
mod instruction;
mod instructions;

pub use decoder::{decode_instruction, decode_stream};
pub use instruction::{FlowType, Instruction, InstructionCategory, Operand, OperandType};
pub use instructions::*;
