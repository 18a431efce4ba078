use crate::{
    classfile::CpIndex,
    disassembler::{Instruction, Operand, OperandType, INSTRUCTIONS, WIDE},
    file::parser::Parser,
    Result,
};

/// Decodes a complete instruction stream.
///
/// The parser must cover exactly one method's code array: instruction offsets and the
/// alignment of switch operands are measured from the parser's start. Decoding stops when the
/// data is exhausted; an instruction whose operands would run past the end fails the whole
/// stream.
///
/// # Arguments
///
/// * `parser` - A parser over the code array, positioned at its start
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] on a reserved opcode, an invalid `wide` form, an
/// inconsistent switch table or truncated operand bytes.
///
/// # Examples
///
/// ```rust
/// use classref::{disassembler::decode_stream, Parser};
///
/// // aload_0, invokespecial #1, return
/// let code = [0x2A, 0xB7, 0x00, 0x01, 0xB1];
/// let instructions = decode_stream(&mut Parser::new(&code))?;
///
/// assert_eq!(instructions.len(), 3);
/// assert_eq!(instructions[1].mnemonic, "invokespecial");
/// assert_eq!(instructions[2].offset, 4);
/// # Ok::<(), classref::Error>(())
/// ```
pub fn decode_stream(parser: &mut Parser) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();

    while parser.has_more_data() {
        instructions.push(decode_instruction(parser)?);
    }

    Ok(instructions)
}

/// Decodes a single instruction at the current parser position.
///
/// Handles the `wide` prefix (the returned instruction carries the modified opcode with
/// `wide` set) and the 0-3 padding bytes that precede `tableswitch`/`lookupswitch` operands.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] if the opcode is reserved, `wide` modifies an
/// instruction that has no wide form, a switch table is inconsistent, or the operand bytes
/// are truncated.
///
/// # Examples
///
/// ```rust
/// use classref::{disassembler::{decode_instruction, Operand}, Parser};
///
/// // wide iinc 300, -2
/// let code = [0xC4, 0x84, 0x01, 0x2C, 0xFF, 0xFE];
/// let instruction = decode_instruction(&mut Parser::new(&code))?;
///
/// assert!(instruction.wide);
/// assert_eq!(instruction.mnemonic, "iinc");
/// assert_eq!(instruction.size, 6);
/// assert_eq!(instruction.operand, Operand::Iinc { local: 300, delta: -2 });
/// # Ok::<(), classref::Error>(())
/// ```
pub fn decode_instruction(parser: &mut Parser) -> Result<Instruction> {
    let start = parser.pos();
    let Ok(offset) = u32::try_from(start) else {
        return Err(malformed_error!("Instruction offset {} out of range", start));
    };

    let mut opcode = parser.read_be::<u8>()?;
    let wide = opcode == WIDE;
    if wide {
        opcode = parser.read_be::<u8>()?;
    }

    let info = &INSTRUCTIONS[usize::from(opcode)];
    if info.is_reserved() {
        return Err(malformed_error!(
            "Reserved opcode: 0x{:02X} at offset {}",
            opcode,
            start
        ));
    }
    if wide && !matches!(info.op_type, OperandType::Local | OperandType::Iinc) {
        return Err(malformed_error!(
            "'{}' has no wide form (offset {})",
            info.mnemonic,
            start
        ));
    }

    let operand = match info.op_type {
        OperandType::None => Operand::None,
        OperandType::Int8 => Operand::Immediate(i32::from(parser.read_be::<i8>()?)),
        OperandType::Int16 => Operand::Immediate(i32::from(parser.read_be::<i16>()?)),
        OperandType::Local => {
            if wide {
                Operand::Local(parser.read_be::<u16>()?)
            } else {
                Operand::Local(u16::from(parser.read_be::<u8>()?))
            }
        }
        OperandType::ConstantByte => {
            Operand::Constant(CpIndex(u16::from(parser.read_be::<u8>()?)))
        }
        OperandType::Constant => Operand::Constant(CpIndex::read(parser)?),
        OperandType::Branch16 => Operand::Branch(i32::from(parser.read_be::<i16>()?)),
        OperandType::Branch32 => Operand::Branch(parser.read_be::<i32>()?),
        OperandType::Iinc => {
            if wide {
                Operand::Iinc {
                    local: parser.read_be::<u16>()?,
                    delta: parser.read_be::<i16>()?,
                }
            } else {
                Operand::Iinc {
                    local: u16::from(parser.read_be::<u8>()?),
                    delta: i16::from(parser.read_be::<i8>()?),
                }
            }
        }
        OperandType::ArrayType => Operand::ArrayType(parser.read_be::<u8>()?),
        OperandType::InvokeInterface => {
            let method = CpIndex::read(parser)?;
            let count = parser.read_be::<u8>()?;
            parser.advance_by(1)?;
            Operand::InvokeInterface { method, count }
        }
        OperandType::InvokeDynamic => {
            let index = CpIndex::read(parser)?;
            parser.advance_by(2)?;
            Operand::Constant(index)
        }
        OperandType::MultiANewArray => Operand::MultiANewArray {
            class: CpIndex::read(parser)?,
            dimensions: parser.read_be::<u8>()?,
        },
        OperandType::TableSwitch => decode_table_switch(parser, start)?,
        OperandType::LookupSwitch => decode_lookup_switch(parser, start)?,
        OperandType::Wide => {
            return Err(malformed_error!("Repeated wide prefix at offset {}", start));
        }
    };

    let size = parser.pos() - start;
    Ok(Instruction {
        offset,
        size: u32::try_from(size).unwrap_or(u32::MAX),
        opcode,
        wide,
        mnemonic: info.mnemonic,
        category: info.category,
        flow_type: info.flow,
        operand,
    })
}

fn decode_table_switch(parser: &mut Parser, start: usize) -> Result<Operand> {
    parser.align(4)?;
    let default = parser.read_be::<i32>()?;
    let low = parser.read_be::<i32>()?;
    let high = parser.read_be::<i32>()?;
    if low > high {
        return Err(malformed_error!(
            "tableswitch at offset {} has low {} > high {}",
            start,
            low,
            high
        ));
    }

    let Ok(count) = usize::try_from(i64::from(high) - i64::from(low) + 1) else {
        return Err(malformed_error!("tableswitch at offset {} is too large", start));
    };
    parser.ensure_remaining(count.saturating_mul(4))?;

    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        offsets.push(parser.read_be::<i32>()?);
    }

    Ok(Operand::TableSwitch {
        default,
        low,
        high,
        offsets,
    })
}

fn decode_lookup_switch(parser: &mut Parser, start: usize) -> Result<Operand> {
    parser.align(4)?;
    let default = parser.read_be::<i32>()?;
    let npairs = parser.read_be::<i32>()?;
    let Ok(count) = usize::try_from(npairs) else {
        return Err(malformed_error!(
            "lookupswitch at offset {} has negative pair count {}",
            start,
            npairs
        ));
    };
    parser.ensure_remaining(count.saturating_mul(8))?;

    let mut pairs = Vec::with_capacity(count);
    for _ in 0..count {
        let key = parser.read_be::<i32>()?;
        let delta = parser.read_be::<i32>()?;
        pairs.push((key, delta));
    }

    Ok(Operand::LookupSwitch { default, pairs })
}
