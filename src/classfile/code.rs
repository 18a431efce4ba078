//! The `Code` attribute (JVMS §4.7.3).

use crate::{
    classfile::{attributes::Attribute, ConstantPool, CpIndex},
    disassembler::{decode_stream, Instruction},
    file::parser::Parser,
    Result,
};

/// The JVM caps a method's code array below 64 KiB.
const MAX_CODE_LENGTH: u32 = 65535;

/// One entry of a method's exception table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// Start of the protected range (inclusive)
    pub start_pc: u16,
    /// End of the protected range (exclusive)
    pub end_pc: u16,
    /// Start of the handler
    pub handler_pc: u16,
    /// The caught class; `None` catches everything (`finally`)
    pub catch_type: Option<CpIndex>,
}

/// A method body: limits, decoded instructions, exception table and nested attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    /// Maximum operand stack depth
    pub max_stack: u16,
    /// Number of local variable slots
    pub max_locals: u16,
    /// Length of the code array in bytes
    pub code_length: u32,
    /// The code array, fully decoded
    pub instructions: Vec<Instruction>,
    /// Exception handlers in declaration order
    pub exception_table: Vec<ExceptionHandler>,
    /// Attributes of the code (`LineNumberTable`, type annotations, ...)
    pub attributes: Vec<Attribute>,
}

impl Code {
    pub(crate) fn read(parser: &mut Parser, pool: &ConstantPool, depth: usize) -> Result<Code> {
        let max_stack = parser.read_be::<u16>()?;
        let max_locals = parser.read_be::<u16>()?;

        let code_length = parser.read_be::<u32>()?;
        if code_length > MAX_CODE_LENGTH {
            return Err(malformed_error!("Code length {} exceeds the limit", code_length));
        }
        let Ok(length) = usize::try_from(code_length) else {
            return Err(out_of_bounds_error!());
        };
        let instructions = decode_stream(&mut parser.read_sized(length)?)?;

        let handler_count = parser.read_be::<u16>()?;
        let mut exception_table = Vec::with_capacity(usize::from(handler_count));
        for _ in 0..handler_count {
            exception_table.push(ExceptionHandler {
                start_pc: parser.read_be::<u16>()?,
                end_pc: parser.read_be::<u16>()?,
                handler_pc: parser.read_be::<u16>()?,
                catch_type: CpIndex::read_optional(parser)?,
            });
        }

        let attributes = Attribute::read_list(parser, pool, depth + 1)?;

        Ok(Code {
            max_stack,
            max_locals,
            code_length,
            instructions,
            exception_table,
            attributes,
        })
    }
}
