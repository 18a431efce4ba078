//! Static opcode table for the JVM instruction set (JVMS §6.5).
//!
//! [`INSTRUCTIONS`] has one entry per byte value. Opcodes `0xCA` (`breakpoint`) and above are
//! reserved for debuggers and the JVM itself and never appear in a valid class file; their
//! entries have an empty mnemonic and are rejected by the decoder.

use crate::disassembler::{FlowType, InstructionCategory, OperandType};

/// Static description of one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JvmInstruction {
    /// Mnemonic; empty for reserved opcodes
    pub mnemonic: &'static str,
    /// Operand encoding
    pub op_type: OperandType,
    /// Broad classification
    pub category: InstructionCategory,
    /// Effect on control flow
    pub flow: FlowType,
}

impl JvmInstruction {
    const RESERVED: JvmInstruction = JvmInstruction {
        mnemonic: "",
        op_type: OperandType::None,
        category: InstructionCategory::Misc,
        flow: FlowType::Sequential,
    };

    /// Returns `true` if this opcode may not appear in a class file.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.mnemonic.is_empty()
    }
}

/// `getstatic`
pub const GETSTATIC: u8 = 0xB2;
/// `putstatic`
pub const PUTSTATIC: u8 = 0xB3;
/// `getfield`
pub const GETFIELD: u8 = 0xB4;
/// `putfield`
pub const PUTFIELD: u8 = 0xB5;
/// `invokevirtual`
pub const INVOKEVIRTUAL: u8 = 0xB6;
/// `invokespecial`
pub const INVOKESPECIAL: u8 = 0xB7;
/// `invokestatic`
pub const INVOKESTATIC: u8 = 0xB8;
/// `invokeinterface`
pub const INVOKEINTERFACE: u8 = 0xB9;
/// `invokedynamic`
pub const INVOKEDYNAMIC: u8 = 0xBA;
/// `new`
pub const NEW: u8 = 0xBB;
/// `anewarray`
pub const ANEWARRAY: u8 = 0xBD;
/// `checkcast`
pub const CHECKCAST: u8 = 0xC0;
/// `instanceof`
pub const INSTANCEOF: u8 = 0xC1;
/// `multianewarray`
pub const MULTIANEWARRAY: u8 = 0xC5;
/// `ldc`
pub const LDC: u8 = 0x12;
/// `ldc_w`
pub const LDC_W: u8 = 0x13;
/// `ldc2_w`
pub const LDC2_W: u8 = 0x14;
/// `wide`
pub const WIDE: u8 = 0xC4;
/// `iinc`
pub const IINC: u8 = 0x84;
/// `tableswitch`
pub const TABLESWITCH: u8 = 0xAA;
/// `lookupswitch`
pub const LOOKUPSWITCH: u8 = 0xAB;

macro_rules! op {
    ($mnemonic:expr, $op_type:ident, $category:ident, $flow:ident) => {
        JvmInstruction {
            mnemonic: $mnemonic,
            op_type: OperandType::$op_type,
            category: InstructionCategory::$category,
            flow: FlowType::$flow,
        }
    };
}

#[rustfmt::skip]
const DEFINED: [JvmInstruction; 202] = [
    op!("nop", None, Misc, Sequential), // 0x00
    op!("aconst_null", None, Constant, Sequential), // 0x01
    op!("iconst_m1", None, Constant, Sequential), // 0x02
    op!("iconst_0", None, Constant, Sequential), // 0x03
    op!("iconst_1", None, Constant, Sequential), // 0x04
    op!("iconst_2", None, Constant, Sequential), // 0x05
    op!("iconst_3", None, Constant, Sequential), // 0x06
    op!("iconst_4", None, Constant, Sequential), // 0x07
    op!("iconst_5", None, Constant, Sequential), // 0x08
    op!("lconst_0", None, Constant, Sequential), // 0x09
    op!("lconst_1", None, Constant, Sequential), // 0x0A
    op!("fconst_0", None, Constant, Sequential), // 0x0B
    op!("fconst_1", None, Constant, Sequential), // 0x0C
    op!("fconst_2", None, Constant, Sequential), // 0x0D
    op!("dconst_0", None, Constant, Sequential), // 0x0E
    op!("dconst_1", None, Constant, Sequential), // 0x0F
    op!("bipush", Int8, Constant, Sequential), // 0x10
    op!("sipush", Int16, Constant, Sequential), // 0x11
    op!("ldc", ConstantByte, Constant, Sequential), // 0x12
    op!("ldc_w", Constant, Constant, Sequential), // 0x13
    op!("ldc2_w", Constant, Constant, Sequential), // 0x14
    op!("iload", Local, Load, Sequential), // 0x15
    op!("lload", Local, Load, Sequential), // 0x16
    op!("fload", Local, Load, Sequential), // 0x17
    op!("dload", Local, Load, Sequential), // 0x18
    op!("aload", Local, Load, Sequential), // 0x19
    op!("iload_0", None, Load, Sequential), // 0x1A
    op!("iload_1", None, Load, Sequential), // 0x1B
    op!("iload_2", None, Load, Sequential), // 0x1C
    op!("iload_3", None, Load, Sequential), // 0x1D
    op!("lload_0", None, Load, Sequential), // 0x1E
    op!("lload_1", None, Load, Sequential), // 0x1F
    op!("lload_2", None, Load, Sequential), // 0x20
    op!("lload_3", None, Load, Sequential), // 0x21
    op!("fload_0", None, Load, Sequential), // 0x22
    op!("fload_1", None, Load, Sequential), // 0x23
    op!("fload_2", None, Load, Sequential), // 0x24
    op!("fload_3", None, Load, Sequential), // 0x25
    op!("dload_0", None, Load, Sequential), // 0x26
    op!("dload_1", None, Load, Sequential), // 0x27
    op!("dload_2", None, Load, Sequential), // 0x28
    op!("dload_3", None, Load, Sequential), // 0x29
    op!("aload_0", None, Load, Sequential), // 0x2A
    op!("aload_1", None, Load, Sequential), // 0x2B
    op!("aload_2", None, Load, Sequential), // 0x2C
    op!("aload_3", None, Load, Sequential), // 0x2D
    op!("iaload", None, Array, Sequential), // 0x2E
    op!("laload", None, Array, Sequential), // 0x2F
    op!("faload", None, Array, Sequential), // 0x30
    op!("daload", None, Array, Sequential), // 0x31
    op!("aaload", None, Array, Sequential), // 0x32
    op!("baload", None, Array, Sequential), // 0x33
    op!("caload", None, Array, Sequential), // 0x34
    op!("saload", None, Array, Sequential), // 0x35
    op!("istore", Local, Store, Sequential), // 0x36
    op!("lstore", Local, Store, Sequential), // 0x37
    op!("fstore", Local, Store, Sequential), // 0x38
    op!("dstore", Local, Store, Sequential), // 0x39
    op!("astore", Local, Store, Sequential), // 0x3A
    op!("istore_0", None, Store, Sequential), // 0x3B
    op!("istore_1", None, Store, Sequential), // 0x3C
    op!("istore_2", None, Store, Sequential), // 0x3D
    op!("istore_3", None, Store, Sequential), // 0x3E
    op!("lstore_0", None, Store, Sequential), // 0x3F
    op!("lstore_1", None, Store, Sequential), // 0x40
    op!("lstore_2", None, Store, Sequential), // 0x41
    op!("lstore_3", None, Store, Sequential), // 0x42
    op!("fstore_0", None, Store, Sequential), // 0x43
    op!("fstore_1", None, Store, Sequential), // 0x44
    op!("fstore_2", None, Store, Sequential), // 0x45
    op!("fstore_3", None, Store, Sequential), // 0x46
    op!("dstore_0", None, Store, Sequential), // 0x47
    op!("dstore_1", None, Store, Sequential), // 0x48
    op!("dstore_2", None, Store, Sequential), // 0x49
    op!("dstore_3", None, Store, Sequential), // 0x4A
    op!("astore_0", None, Store, Sequential), // 0x4B
    op!("astore_1", None, Store, Sequential), // 0x4C
    op!("astore_2", None, Store, Sequential), // 0x4D
    op!("astore_3", None, Store, Sequential), // 0x4E
    op!("iastore", None, Array, Sequential), // 0x4F
    op!("lastore", None, Array, Sequential), // 0x50
    op!("fastore", None, Array, Sequential), // 0x51
    op!("dastore", None, Array, Sequential), // 0x52
    op!("aastore", None, Array, Sequential), // 0x53
    op!("bastore", None, Array, Sequential), // 0x54
    op!("castore", None, Array, Sequential), // 0x55
    op!("sastore", None, Array, Sequential), // 0x56
    op!("pop", None, Stack, Sequential), // 0x57
    op!("pop2", None, Stack, Sequential), // 0x58
    op!("dup", None, Stack, Sequential), // 0x59
    op!("dup_x1", None, Stack, Sequential), // 0x5A
    op!("dup_x2", None, Stack, Sequential), // 0x5B
    op!("dup2", None, Stack, Sequential), // 0x5C
    op!("dup2_x1", None, Stack, Sequential), // 0x5D
    op!("dup2_x2", None, Stack, Sequential), // 0x5E
    op!("swap", None, Stack, Sequential), // 0x5F
    op!("iadd", None, Arithmetic, Sequential), // 0x60
    op!("ladd", None, Arithmetic, Sequential), // 0x61
    op!("fadd", None, Arithmetic, Sequential), // 0x62
    op!("dadd", None, Arithmetic, Sequential), // 0x63
    op!("isub", None, Arithmetic, Sequential), // 0x64
    op!("lsub", None, Arithmetic, Sequential), // 0x65
    op!("fsub", None, Arithmetic, Sequential), // 0x66
    op!("dsub", None, Arithmetic, Sequential), // 0x67
    op!("imul", None, Arithmetic, Sequential), // 0x68
    op!("lmul", None, Arithmetic, Sequential), // 0x69
    op!("fmul", None, Arithmetic, Sequential), // 0x6A
    op!("dmul", None, Arithmetic, Sequential), // 0x6B
    op!("idiv", None, Arithmetic, Sequential), // 0x6C
    op!("ldiv", None, Arithmetic, Sequential), // 0x6D
    op!("fdiv", None, Arithmetic, Sequential), // 0x6E
    op!("ddiv", None, Arithmetic, Sequential), // 0x6F
    op!("irem", None, Arithmetic, Sequential), // 0x70
    op!("lrem", None, Arithmetic, Sequential), // 0x71
    op!("frem", None, Arithmetic, Sequential), // 0x72
    op!("drem", None, Arithmetic, Sequential), // 0x73
    op!("ineg", None, Arithmetic, Sequential), // 0x74
    op!("lneg", None, Arithmetic, Sequential), // 0x75
    op!("fneg", None, Arithmetic, Sequential), // 0x76
    op!("dneg", None, Arithmetic, Sequential), // 0x77
    op!("ishl", None, Arithmetic, Sequential), // 0x78
    op!("lshl", None, Arithmetic, Sequential), // 0x79
    op!("ishr", None, Arithmetic, Sequential), // 0x7A
    op!("lshr", None, Arithmetic, Sequential), // 0x7B
    op!("iushr", None, Arithmetic, Sequential), // 0x7C
    op!("lushr", None, Arithmetic, Sequential), // 0x7D
    op!("iand", None, Arithmetic, Sequential), // 0x7E
    op!("land", None, Arithmetic, Sequential), // 0x7F
    op!("ior", None, Arithmetic, Sequential), // 0x80
    op!("lor", None, Arithmetic, Sequential), // 0x81
    op!("ixor", None, Arithmetic, Sequential), // 0x82
    op!("lxor", None, Arithmetic, Sequential), // 0x83
    op!("iinc", Iinc, Arithmetic, Sequential), // 0x84
    op!("i2l", None, Conversion, Sequential), // 0x85
    op!("i2f", None, Conversion, Sequential), // 0x86
    op!("i2d", None, Conversion, Sequential), // 0x87
    op!("l2i", None, Conversion, Sequential), // 0x88
    op!("l2f", None, Conversion, Sequential), // 0x89
    op!("l2d", None, Conversion, Sequential), // 0x8A
    op!("f2i", None, Conversion, Sequential), // 0x8B
    op!("f2l", None, Conversion, Sequential), // 0x8C
    op!("f2d", None, Conversion, Sequential), // 0x8D
    op!("d2i", None, Conversion, Sequential), // 0x8E
    op!("d2l", None, Conversion, Sequential), // 0x8F
    op!("d2f", None, Conversion, Sequential), // 0x90
    op!("i2b", None, Conversion, Sequential), // 0x91
    op!("i2c", None, Conversion, Sequential), // 0x92
    op!("i2s", None, Conversion, Sequential), // 0x93
    op!("lcmp", None, Comparison, Sequential), // 0x94
    op!("fcmpl", None, Comparison, Sequential), // 0x95
    op!("fcmpg", None, Comparison, Sequential), // 0x96
    op!("dcmpl", None, Comparison, Sequential), // 0x97
    op!("dcmpg", None, Comparison, Sequential), // 0x98
    op!("ifeq", Branch16, ControlFlow, ConditionalBranch), // 0x99
    op!("ifne", Branch16, ControlFlow, ConditionalBranch), // 0x9A
    op!("iflt", Branch16, ControlFlow, ConditionalBranch), // 0x9B
    op!("ifge", Branch16, ControlFlow, ConditionalBranch), // 0x9C
    op!("ifgt", Branch16, ControlFlow, ConditionalBranch), // 0x9D
    op!("ifle", Branch16, ControlFlow, ConditionalBranch), // 0x9E
    op!("if_icmpeq", Branch16, ControlFlow, ConditionalBranch), // 0x9F
    op!("if_icmpne", Branch16, ControlFlow, ConditionalBranch), // 0xA0
    op!("if_icmplt", Branch16, ControlFlow, ConditionalBranch), // 0xA1
    op!("if_icmpge", Branch16, ControlFlow, ConditionalBranch), // 0xA2
    op!("if_icmpgt", Branch16, ControlFlow, ConditionalBranch), // 0xA3
    op!("if_icmple", Branch16, ControlFlow, ConditionalBranch), // 0xA4
    op!("if_acmpeq", Branch16, ControlFlow, ConditionalBranch), // 0xA5
    op!("if_acmpne", Branch16, ControlFlow, ConditionalBranch), // 0xA6
    op!("goto", Branch16, ControlFlow, UnconditionalBranch), // 0xA7
    op!("jsr", Branch16, ControlFlow, Subroutine), // 0xA8
    op!("ret", Local, ControlFlow, Throw), // 0xA9
    op!("tableswitch", TableSwitch, ControlFlow, Switch), // 0xAA
    op!("lookupswitch", LookupSwitch, ControlFlow, Switch), // 0xAB
    op!("ireturn", None, ControlFlow, Return), // 0xAC
    op!("lreturn", None, ControlFlow, Return), // 0xAD
    op!("freturn", None, ControlFlow, Return), // 0xAE
    op!("dreturn", None, ControlFlow, Return), // 0xAF
    op!("areturn", None, ControlFlow, Return), // 0xB0
    op!("return", None, ControlFlow, Return), // 0xB1
    op!("getstatic", Constant, FieldAccess, Sequential), // 0xB2
    op!("putstatic", Constant, FieldAccess, Sequential), // 0xB3
    op!("getfield", Constant, FieldAccess, Sequential), // 0xB4
    op!("putfield", Constant, FieldAccess, Sequential), // 0xB5
    op!("invokevirtual", Constant, Invocation, Call), // 0xB6
    op!("invokespecial", Constant, Invocation, Call), // 0xB7
    op!("invokestatic", Constant, Invocation, Call), // 0xB8
    op!("invokeinterface", InvokeInterface, Invocation, Call), // 0xB9
    op!("invokedynamic", InvokeDynamic, Invocation, Call), // 0xBA
    op!("new", Constant, Object, Sequential), // 0xBB
    op!("newarray", ArrayType, Object, Sequential), // 0xBC
    op!("anewarray", Constant, Object, Sequential), // 0xBD
    op!("arraylength", None, Array, Sequential), // 0xBE
    op!("athrow", None, ControlFlow, Throw), // 0xBF
    op!("checkcast", Constant, Object, Sequential), // 0xC0
    op!("instanceof", Constant, Object, Sequential), // 0xC1
    op!("monitorenter", None, Monitor, Sequential), // 0xC2
    op!("monitorexit", None, Monitor, Sequential), // 0xC3
    op!("wide", Wide, Prefix, Sequential), // 0xC4
    op!("multianewarray", MultiANewArray, Object, Sequential), // 0xC5
    op!("ifnull", Branch16, ControlFlow, ConditionalBranch), // 0xC6
    op!("ifnonnull", Branch16, ControlFlow, ConditionalBranch), // 0xC7
    op!("goto_w", Branch32, ControlFlow, UnconditionalBranch), // 0xC8
    op!("jsr_w", Branch32, ControlFlow, Subroutine), // 0xC9
];

/// Opcode table indexed by the opcode byte.
pub static INSTRUCTIONS: [JvmInstruction; 256] = {
    let mut table = [JvmInstruction::RESERVED; 256];
    let mut opcode = 0;
    while opcode < DEFINED.len() {
        table[opcode] = DEFINED[opcode];
        opcode += 1;
    }
    table
};
