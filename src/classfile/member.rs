//! Field and method declarations (JVMS §4.5, §4.6).

use crate::{
    classfile::{
        attributes::Attribute, code::Code, ConstantPool, CpIndex, FieldAccessFlags,
        MethodAccessFlags,
    },
    file::parser::Parser,
    Result,
};

/// A declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Access and property flags
    pub access_flags: FieldAccessFlags,
    /// Utf8 simple name
    pub name: CpIndex,
    /// Utf8 field descriptor
    pub descriptor: CpIndex,
    /// Attributes (`ConstantValue`, `Signature`, annotations, ...)
    pub attributes: Vec<Attribute>,
}

/// A declared method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    /// Access and property flags
    pub access_flags: MethodAccessFlags,
    /// Utf8 simple name
    pub name: CpIndex,
    /// Utf8 method descriptor
    pub descriptor: CpIndex,
    /// Attributes (`Code`, `Exceptions`, `Signature`, annotations, ...)
    pub attributes: Vec<Attribute>,
}

impl FieldInfo {
    pub(crate) fn read(parser: &mut Parser, pool: &ConstantPool) -> Result<FieldInfo> {
        Ok(FieldInfo {
            access_flags: FieldAccessFlags::from_bits_retain(parser.read_be::<u16>()?),
            name: CpIndex::read(parser)?,
            descriptor: CpIndex::read(parser)?,
            attributes: Attribute::read_list(parser, pool, 0)?,
        })
    }
}

impl MethodInfo {
    pub(crate) fn read(parser: &mut Parser, pool: &ConstantPool) -> Result<MethodInfo> {
        Ok(MethodInfo {
            access_flags: MethodAccessFlags::from_bits_retain(parser.read_be::<u16>()?),
            name: CpIndex::read(parser)?,
            descriptor: CpIndex::read(parser)?,
            attributes: Attribute::read_list(parser, pool, 0)?,
        })
    }

    /// The method body, if the method has one.
    #[must_use]
    pub fn code(&self) -> Option<&Code> {
        self.attributes.iter().find_map(|attribute| match attribute {
            Attribute::Code(code) => Some(code.as_ref()),
            _ => None,
        })
    }
}
