//! The constant pool: the class file's index-addressed symbol table (JVMS §4.4).
//!
//! The pool is decoded eagerly into one typed [`ConstantEntry`] per slot. Indices are 1-based,
//! slot 0 is never valid, and `CONSTANT_Long`/`CONSTANT_Double` entries occupy two slots; the
//! second one is kept as an explicit dead slot so that every later index lands on the right
//! entry. References between entries are stored as [`CpIndex`] and are only checked for kind
//! when they are resolved (see [`crate::classfile::resolver`]).

use std::fmt;

use strum::{Display, FromRepr};

use crate::{file::parser::Parser, Result};

/// An index into the constant pool.
///
/// Indices are produced by the reader and consumed by the [`crate::classfile::Resolver`]; they
/// cannot be constructed outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CpIndex(pub(crate) u16);

impl CpIndex {
    /// Returns the raw 1-based slot number.
    #[must_use]
    pub fn value(self) -> u16 {
        self.0
    }

    /// Read a `u2` index, mapping `0` to `None`.
    pub(crate) fn read_optional(parser: &mut Parser) -> Result<Option<CpIndex>> {
        let index = parser.read_be::<u16>()?;
        Ok((index != 0).then_some(CpIndex(index)))
    }

    /// Read a `u2` index; `0` is accepted here and rejected at resolution time.
    pub(crate) fn read(parser: &mut Parser) -> Result<CpIndex> {
        Ok(CpIndex(parser.read_be::<u16>()?))
    }
}

impl fmt::Display for CpIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The tag byte of a constant pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    Fieldref = 9,
    Methodref = 10,
    InterfaceMethodref = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

impl ConstantTag {
    /// Number of pool slots an entry with this tag occupies.
    #[must_use]
    pub fn slots(self) -> usize {
        match self {
            ConstantTag::Long | ConstantTag::Double => 2,
            _ => 1,
        }
    }
}

/// The `reference_kind` of a `CONSTANT_MethodHandle` (JVMS §5.4.3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ReferenceKind {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}

impl ReferenceKind {
    /// Returns `true` if the handle refers to a field rather than a method.
    #[must_use]
    pub fn is_field(self) -> bool {
        matches!(
            self,
            ReferenceKind::GetField
                | ReferenceKind::GetStatic
                | ReferenceKind::PutField
                | ReferenceKind::PutStatic
        )
    }
}

/// One decoded constant pool entry. Text is decoded from modified UTF-8 when the pool is read.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ConstantEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class {
        name: CpIndex,
    },
    String {
        value: CpIndex,
    },
    Fieldref {
        class: CpIndex,
        name_and_type: CpIndex,
    },
    Methodref {
        class: CpIndex,
        name_and_type: CpIndex,
    },
    InterfaceMethodref {
        class: CpIndex,
        name_and_type: CpIndex,
    },
    NameAndType {
        name: CpIndex,
        descriptor: CpIndex,
    },
    MethodHandle {
        kind: ReferenceKind,
        reference: CpIndex,
    },
    MethodType {
        descriptor: CpIndex,
    },
    /// `bootstrap_method` indexes the class's `BootstrapMethods` attribute, not the pool
    Dynamic {
        bootstrap_method: u16,
        name_and_type: CpIndex,
    },
    InvokeDynamic {
        bootstrap_method: u16,
        name_and_type: CpIndex,
    },
    Module {
        name: CpIndex,
    },
    Package {
        name: CpIndex,
    },
}

impl ConstantEntry {
    /// The tag this entry was decoded from.
    #[must_use]
    pub fn tag(&self) -> ConstantTag {
        match self {
            ConstantEntry::Utf8(_) => ConstantTag::Utf8,
            ConstantEntry::Integer(_) => ConstantTag::Integer,
            ConstantEntry::Float(_) => ConstantTag::Float,
            ConstantEntry::Long(_) => ConstantTag::Long,
            ConstantEntry::Double(_) => ConstantTag::Double,
            ConstantEntry::Class { .. } => ConstantTag::Class,
            ConstantEntry::String { .. } => ConstantTag::String,
            ConstantEntry::Fieldref { .. } => ConstantTag::Fieldref,
            ConstantEntry::Methodref { .. } => ConstantTag::Methodref,
            ConstantEntry::InterfaceMethodref { .. } => ConstantTag::InterfaceMethodref,
            ConstantEntry::NameAndType { .. } => ConstantTag::NameAndType,
            ConstantEntry::MethodHandle { .. } => ConstantTag::MethodHandle,
            ConstantEntry::MethodType { .. } => ConstantTag::MethodType,
            ConstantEntry::Dynamic { .. } => ConstantTag::Dynamic,
            ConstantEntry::InvokeDynamic { .. } => ConstantTag::InvokeDynamic,
            ConstantEntry::Module { .. } => ConstantTag::Module,
            ConstantEntry::Package { .. } => ConstantTag::Package,
        }
    }

    fn read(parser: &mut Parser, tag: ConstantTag) -> Result<ConstantEntry> {
        let entry = match tag {
            ConstantTag::Utf8 => ConstantEntry::Utf8(parser.read_prefixed_modified_utf8()?),
            ConstantTag::Integer => ConstantEntry::Integer(parser.read_be::<i32>()?),
            ConstantTag::Float => ConstantEntry::Float(parser.read_be::<f32>()?),
            ConstantTag::Long => ConstantEntry::Long(parser.read_be::<i64>()?),
            ConstantTag::Double => ConstantEntry::Double(parser.read_be::<f64>()?),
            ConstantTag::Class => ConstantEntry::Class {
                name: CpIndex::read(parser)?,
            },
            ConstantTag::String => ConstantEntry::String {
                value: CpIndex::read(parser)?,
            },
            ConstantTag::Fieldref => ConstantEntry::Fieldref {
                class: CpIndex::read(parser)?,
                name_and_type: CpIndex::read(parser)?,
            },
            ConstantTag::Methodref => ConstantEntry::Methodref {
                class: CpIndex::read(parser)?,
                name_and_type: CpIndex::read(parser)?,
            },
            ConstantTag::InterfaceMethodref => ConstantEntry::InterfaceMethodref {
                class: CpIndex::read(parser)?,
                name_and_type: CpIndex::read(parser)?,
            },
            ConstantTag::NameAndType => ConstantEntry::NameAndType {
                name: CpIndex::read(parser)?,
                descriptor: CpIndex::read(parser)?,
            },
            ConstantTag::MethodHandle => {
                let raw_kind = parser.read_be::<u8>()?;
                let Some(kind) = ReferenceKind::from_repr(raw_kind) else {
                    return Err(malformed_error!("Invalid method handle kind - {}", raw_kind));
                };
                ConstantEntry::MethodHandle {
                    kind,
                    reference: CpIndex::read(parser)?,
                }
            }
            ConstantTag::MethodType => ConstantEntry::MethodType {
                descriptor: CpIndex::read(parser)?,
            },
            ConstantTag::Dynamic => ConstantEntry::Dynamic {
                bootstrap_method: parser.read_be::<u16>()?,
                name_and_type: CpIndex::read(parser)?,
            },
            ConstantTag::InvokeDynamic => ConstantEntry::InvokeDynamic {
                bootstrap_method: parser.read_be::<u16>()?,
                name_and_type: CpIndex::read(parser)?,
            },
            ConstantTag::Module => ConstantEntry::Module {
                name: CpIndex::read(parser)?,
            },
            ConstantTag::Package => ConstantEntry::Package {
                name: CpIndex::read(parser)?,
            },
        };

        Ok(entry)
    }
}

/// The decoded constant pool of one class file.
///
/// `slots[0]` and the second slot of every wide entry are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool {
    slots: Vec<Option<ConstantEntry>>,
}

impl ConstantPool {
    /// Read `constant_pool_count` followed by the pool entries.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on an unknown tag, a truncated entry, an invalid
    /// modified UTF-8 string, or a wide entry in the last slot.
    pub fn read(parser: &mut Parser) -> Result<ConstantPool> {
        let count = usize::from(parser.read_be::<u16>()?);
        if count == 0 {
            return Err(malformed_error!("Constant pool count must be at least 1"));
        }

        let mut slots = Vec::with_capacity(count);
        slots.push(None);

        while slots.len() < count {
            let index = slots.len();
            let raw_tag = parser.read_be::<u8>()?;
            let Some(tag) = ConstantTag::from_repr(raw_tag) else {
                return Err(malformed_error!(
                    "Invalid constant pool tag {} at index {}",
                    raw_tag,
                    index
                ));
            };

            if index + tag.slots() > count {
                return Err(malformed_error!(
                    "{} constant at index {} overruns the pool of {} slots",
                    tag,
                    index,
                    count
                ));
            }

            slots.push(Some(ConstantEntry::read(parser, tag)?));
            if tag.slots() == 2 {
                slots.push(None);
            }
        }

        Ok(ConstantPool { slots })
    }

    /// The `constant_pool_count` value: one more than the highest valid index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the pool holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.len() <= 1
    }

    /// Look up the entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for index 0, an index past the end of the pool, or the
    /// unusable second slot of a `Long`/`Double` entry.
    pub fn get(&self, index: CpIndex) -> Result<&ConstantEntry> {
        match self.slots.get(usize::from(index.0)) {
            Some(Some(entry)) => Ok(entry),
            Some(None) => Err(malformed_error!("Constant pool index {} is not usable", index)),
            None => Err(malformed_error!(
                "Constant pool index {} out of range ({} slots)",
                index,
                self.slots.len()
            )),
        }
    }

    /// Look up a `CONSTANT_Utf8` entry directly. The reader uses this for attribute names,
    /// which must be decoded before any symbol is resolved.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or not a `Utf8` entry.
    pub fn utf8(&self, index: CpIndex) -> Result<&str> {
        match self.get(index)? {
            ConstantEntry::Utf8(text) => Ok(text),
            other => Err(malformed_error!(
                "Constant pool index {} is {}, expected Utf8",
                index,
                other.tag()
            )),
        }
    }

    /// Iterate over all usable entries with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (CpIndex, &ConstantEntry)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let index = u16::try_from(index).ok()?;
            slot.as_ref().map(|entry| (CpIndex(index), entry))
        })
    }
}
