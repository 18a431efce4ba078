//! Class file reader (JVMS §4).
//!
//! [`ClassFile::from_mem`] decodes a complete class file into a read-only structured view:
//! version, constant pool, header, fields, methods and attributes, with every method body's
//! instruction stream already disassembled. Decoding is strict. Anything that does not follow
//! the class file layout (bad magic, unsupported version, truncation, an attribute that does not
//! fill its declared length, trailing bytes) fails with [`crate::Error::Malformed`], and nothing
//! is salvaged.
//!
//! Constant pool references inside the view are [`CpIndex`] values; turn them into names with
//! the view's [`Resolver`].
//!
//! # Key Components
//! - [`ClassFile`] - The decoded class
//! - [`ConstantPool`] / [`ConstantEntry`] - The raw, typed constant pool
//! - [`Resolver`] - Memoized index resolution
//! - [`Attribute`] - Decoded attributes, including [`Code`]
//! - [`FieldType`], [`MethodDescriptor`] - Descriptor parsing
//! - [`ClassSummary`] - The one-line header record
//!
//! # Examples
//!
//! ```rust,no_run
//! use classref::ClassFile;
//!
//! let bytes = std::fs::read("Foo.class")?;
//! let class = ClassFile::from_mem(&bytes)?;
//!
//! println!("{} extends {:?}", class.name()?, class.super_name()?);
//! for method in &class.methods {
//!     if let Some(code) = method.code() {
//!         println!("  {} instructions", code.instructions.len());
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod annotations;
mod attributes;
mod code;
mod constantpool;
mod descriptor;
mod flags;
mod member;
mod resolver;
mod signature;
mod summary;

use std::path::Path;

pub use annotations::{
    Annotation, ElementValue, ElementValuePair, LocalVariableRange, TargetInfo, TypeAnnotation,
};
pub use attributes::{Attribute, BootstrapMethod, InnerClass, RecordComponent};
pub use code::{Code, ExceptionHandler};
pub use constantpool::{ConstantEntry, ConstantPool, ConstantTag, CpIndex, ReferenceKind};
pub use descriptor::{
    field_descriptor_classes, method_descriptor_classes, return_descriptor_classes, ElementType,
    FieldType, MethodDescriptor,
};
pub use flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
pub use member::{FieldInfo, MethodInfo};
pub use resolver::{
    Constant, DynamicConstant, MemberKind, MethodHandle, NameAndType, ResolvedMember, Resolver,
};
pub use signature::{class_signature_classes, field_signature_classes, method_signature_classes};
pub use summary::ClassSummary;

use crate::{file::parser::Parser, File, Result};

/// The class file magic number.
pub const MAGIC: u32 = 0xCAFE_BABE;

/// Oldest supported major version (JDK 1.0.2).
pub const MIN_MAJOR_VERSION: u16 = 45;

/// Newest supported major version (Java SE 25).
pub const MAX_MAJOR_VERSION: u16 = 69;

/// A decoded class file.
///
/// The view is immutable once decoded and can be shared between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    /// Minor version; recorded, not interpreted
    pub minor_version: u16,
    /// Major version, within [`MIN_MAJOR_VERSION`]..=[`MAX_MAJOR_VERSION`]
    pub major_version: u16,
    /// The constant pool
    pub constant_pool: ConstantPool,
    /// Class access and property flags
    pub access_flags: ClassAccessFlags,
    /// `Class` constant naming this class
    pub this_class: CpIndex,
    /// `Class` constant naming the superclass; `None` for `java/lang/Object` and modules
    pub super_class: Option<CpIndex>,
    /// `Class` constants naming the direct superinterfaces
    pub interfaces: Vec<CpIndex>,
    /// Declared fields
    pub fields: Vec<FieldInfo>,
    /// Declared methods
    pub methods: Vec<MethodInfo>,
    /// Class attributes
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Decode a class file held in memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `data` is not a complete, well-formed class file.
    pub fn from_mem(data: &[u8]) -> Result<ClassFile> {
        let mut parser = Parser::new(data);

        let magic = parser.read_be::<u32>()?;
        if magic != MAGIC {
            return Err(malformed_error!("Invalid magic number 0x{:08X}", magic));
        }

        let minor_version = parser.read_be::<u16>()?;
        let major_version = parser.read_be::<u16>()?;
        if !(MIN_MAJOR_VERSION..=MAX_MAJOR_VERSION).contains(&major_version) {
            return Err(malformed_error!(
                "Unsupported class file version {}.{}",
                major_version,
                minor_version
            ));
        }

        let constant_pool = ConstantPool::read(&mut parser)?;
        let access_flags = ClassAccessFlags::from_bits_retain(parser.read_be::<u16>()?);
        let this_class = CpIndex::read(&mut parser)?;
        let super_class = CpIndex::read_optional(&mut parser)?;

        let interface_count = parser.read_be::<u16>()?;
        let mut interfaces = Vec::with_capacity(usize::from(interface_count));
        for _ in 0..interface_count {
            interfaces.push(CpIndex::read(&mut parser)?);
        }

        let field_count = parser.read_be::<u16>()?;
        let mut fields = Vec::with_capacity(usize::from(field_count));
        for _ in 0..field_count {
            fields.push(FieldInfo::read(&mut parser, &constant_pool)?);
        }

        let method_count = parser.read_be::<u16>()?;
        let mut methods = Vec::with_capacity(usize::from(method_count));
        for _ in 0..method_count {
            methods.push(MethodInfo::read(&mut parser, &constant_pool)?);
        }

        let attributes = Attribute::read_list(&mut parser, &constant_pool, 0)?;

        if parser.has_more_data() {
            return Err(malformed_error!(
                "{} trailing bytes after the class file",
                parser.remaining()
            ));
        }

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Load and decode a class file from disk.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read, or
    /// [`crate::Error::Malformed`] if it is not a well-formed class file.
    pub fn from_file(path: &Path) -> Result<ClassFile> {
        let file = File::from_file(path)?;
        Self::from_mem(file.data())
    }

    /// Create a resolver over this class's constant pool.
    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.constant_pool)
    }

    /// Internal name of this class.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `this_class` is not a valid `Class` constant.
    pub fn name(&self) -> Result<&str> {
        self.class_name(self.this_class)
    }

    /// Internal name of the superclass, if any.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `super_class` is not a valid `Class` constant.
    pub fn super_name(&self) -> Result<Option<&str>> {
        self.super_class
            .map(|index| self.class_name(index))
            .transpose()
    }

    /// Internal names of the direct superinterfaces.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if an interface entry is not a valid `Class` constant.
    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|index| self.class_name(*index))
            .collect()
    }

    /// The header summary of this class.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the header references invalid constants.
    pub fn summary(&self) -> Result<ClassSummary> {
        Ok(ClassSummary {
            name: self.name()?.to_string(),
            super_name: self.super_name()?.map(str::to_string),
            access_flags: self.access_flags.bits(),
            interfaces: self
                .interface_names()?
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }

    /// Entries of the `BootstrapMethods` attribute; empty if the class has none.
    #[must_use]
    pub fn bootstrap_methods(&self) -> &[BootstrapMethod] {
        self.attributes
            .iter()
            .find_map(|attribute| match attribute {
                Attribute::BootstrapMethods(methods) => Some(methods.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Uncached `Class` lookup for the header accessors.
    fn class_name(&self, index: CpIndex) -> Result<&str> {
        match self.constant_pool.get(index)? {
            ConstantEntry::Class { name } => self.constant_pool.utf8(*name),
            other => Err(malformed_error!(
                "Constant pool index {} is {}, expected Class",
                index,
                other.tag()
            )),
        }
    }
}
