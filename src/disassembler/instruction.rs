use strum::Display;

use crate::classfile::CpIndex;

/// How an instruction affects control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FlowType {
    /// Falls through to the next instruction
    Sequential,
    /// Either branches or falls through
    ConditionalBranch,
    /// Always transfers control to its target
    UnconditionalBranch,
    /// Jump to a subroutine (`jsr`, `jsr_w`)
    Subroutine,
    /// Multi-way branch (`tableswitch`, `lookupswitch`)
    Switch,
    /// Invokes a method and continues afterwards
    Call,
    /// Leaves the method normally
    Return,
    /// Leaves the method by throwing (`athrow`) or returning from a subroutine (`ret`)
    Throw,
}

/// Broad classification of instructions, mainly useful for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[allow(missing_docs)]
pub enum InstructionCategory {
    Constant,
    Load,
    Store,
    Array,
    Stack,
    Arithmetic,
    Conversion,
    Comparison,
    ControlFlow,
    FieldAccess,
    Invocation,
    Object,
    Monitor,
    Prefix,
    Misc,
}

/// The encoding of an instruction's operand bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandType {
    /// No operand bytes
    None,
    /// Signed byte (`bipush`)
    Int8,
    /// Signed short (`sipush`)
    Int16,
    /// Local variable index: `u1`, or `u2` after `wide`
    Local,
    /// Constant pool index stored in one byte (`ldc`)
    ConstantByte,
    /// Constant pool index stored in two bytes
    Constant,
    /// Signed 16-bit branch offset
    Branch16,
    /// Signed 32-bit branch offset
    Branch32,
    /// Local index and signed increment (`iinc`)
    Iinc,
    /// Primitive array type code (`newarray`)
    ArrayType,
    /// Constant pool index, argument count and a zero byte
    InvokeInterface,
    /// Constant pool index followed by two zero bytes
    InvokeDynamic,
    /// Constant pool index and dimension count
    MultiANewArray,
    /// Padded jump table
    TableSwitch,
    /// Padded match/offset pairs
    LookupSwitch,
    /// The `wide` prefix; the operand is the modified instruction
    Wide,
}

/// A decoded operand. Branch offsets are relative to the instruction's own offset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Operand {
    None,
    Immediate(i32),
    Local(u16),
    Constant(CpIndex),
    Branch(i32),
    Iinc {
        local: u16,
        delta: i16,
    },
    ArrayType(u8),
    InvokeInterface {
        method: CpIndex,
        count: u8,
    },
    MultiANewArray {
        class: CpIndex,
        dimensions: u8,
    },
    TableSwitch {
        default: i32,
        low: i32,
        high: i32,
        offsets: Vec<i32>,
    },
    LookupSwitch {
        default: i32,
        pairs: Vec<(i32, i32)>,
    },
}

/// One decoded JVM instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Offset of the first byte (the `wide` prefix, if any) from the start of the code array
    pub offset: u32,
    /// Encoded size in bytes, including prefix and padding
    pub size: u32,
    /// The opcode; for `wide` forms this is the modified instruction's opcode
    pub opcode: u8,
    /// Whether the instruction was prefixed by `wide`
    pub wide: bool,
    /// Mnemonic as written in the JVMS
    pub mnemonic: &'static str,
    /// Broad classification
    pub category: InstructionCategory,
    /// Effect on control flow
    pub flow_type: FlowType,
    /// The decoded operand
    pub operand: Operand,
}

impl Instruction {
    /// Returns the constant pool index carried by this instruction, if any.
    #[must_use]
    pub fn constant(&self) -> Option<CpIndex> {
        match &self.operand {
            Operand::Constant(index)
            | Operand::InvokeInterface { method: index, .. }
            | Operand::MultiANewArray { class: index, .. } => Some(*index),
            _ => None,
        }
    }
}
