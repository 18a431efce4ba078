//! Memoized resolution of constant pool indices.
//!
//! A [`Resolver`] borrows one class file's [`ConstantPool`] and turns indices into typed
//! [`Constant`] values whose strings borrow from the pool. Every slot is resolved at most once:
//! the result is stored in a per-slot [`OnceLock`], so repeated lookups of the same index return
//! the same reference. Kind checks happen here, not in the reader: a `Fieldref` whose class
//! index points at a `Utf8` entry is only an error once somebody asks for it.
//!
//! Before following a reference the resolver checks the tag of the entry it points at, and
//! `Utf8` operands are read straight from the pool. A chain of references is therefore at most
//! three entries deep (`MethodHandle` → `Methodref` → `Class` → `Utf8`), and a pool whose
//! entries refer to themselves fails instead of recursing.
//!
//! The cache lives exactly as long as the resolver, which never outlives the class file it
//! was created from.
//!
//! # Examples
//!
//! ```rust,no_run
//! use classref::ClassFile;
//!
//! let bytes = std::fs::read("Foo.class")?;
//! let class = ClassFile::from_mem(&bytes)?;
//! let resolver = class.resolver();
//! println!("{}", resolver.class_name(class.this_class)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::OnceLock;

use crate::{
    classfile::{ConstantEntry, ConstantPool, ConstantTag, CpIndex, ReferenceKind},
    Result,
};

/// Which kind of member reference a constant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// `CONSTANT_Fieldref`
    Field,
    /// `CONSTANT_Methodref`
    Method,
    /// `CONSTANT_InterfaceMethodref`
    InterfaceMethod,
}

/// A resolved field or method reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedMember<'a> {
    /// The kind of reference
    pub kind: MemberKind,
    /// Internal name of the owning class (may be an array descriptor for `clone`)
    pub owner: &'a str,
    /// Member name
    pub name: &'a str,
    /// Field or method descriptor
    pub descriptor: &'a str,
}

impl ResolvedMember<'_> {
    /// Returns `true` for field references.
    #[must_use]
    pub fn is_field(&self) -> bool {
        self.kind == MemberKind::Field
    }
}

/// A resolved `CONSTANT_NameAndType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameAndType<'a> {
    /// Member name
    pub name: &'a str,
    /// Field or method descriptor
    pub descriptor: &'a str,
}

/// A resolved `CONSTANT_MethodHandle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodHandle<'a> {
    /// The bytecode behaviour of the handle
    pub kind: ReferenceKind,
    /// The referenced field or method
    pub member: ResolvedMember<'a>,
}

/// A resolved `CONSTANT_Dynamic` or `CONSTANT_InvokeDynamic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DynamicConstant<'a> {
    /// Index into the class's `BootstrapMethods` attribute
    pub bootstrap_method: u16,
    /// Name of the constant or call site
    pub name: &'a str,
    /// Field descriptor (dynamic constants) or method descriptor (call sites)
    pub descriptor: &'a str,
}

/// A fully resolved constant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum Constant<'a> {
    Utf8(&'a str),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(&'a str),
    String(&'a str),
    Member(ResolvedMember<'a>),
    NameAndType(NameAndType<'a>),
    MethodHandle(MethodHandle<'a>),
    MethodType(&'a str),
    Dynamic(DynamicConstant<'a>),
    InvokeDynamic(DynamicConstant<'a>),
    Module(&'a str),
    Package(&'a str),
}

impl Constant<'_> {
    fn kind_name(&self) -> &'static str {
        match self {
            Constant::Utf8(_) => "Utf8",
            Constant::Integer(_) => "Integer",
            Constant::Float(_) => "Float",
            Constant::Long(_) => "Long",
            Constant::Double(_) => "Double",
            Constant::Class(_) => "Class",
            Constant::String(_) => "String",
            Constant::Member(member) => match member.kind {
                MemberKind::Field => "Fieldref",
                MemberKind::Method => "Methodref",
                MemberKind::InterfaceMethod => "InterfaceMethodref",
            },
            Constant::NameAndType(_) => "NameAndType",
            Constant::MethodHandle(_) => "MethodHandle",
            Constant::MethodType(_) => "MethodType",
            Constant::Dynamic(_) => "Dynamic",
            Constant::InvokeDynamic(_) => "InvokeDynamic",
            Constant::Module(_) => "Module",
            Constant::Package(_) => "Package",
        }
    }
}

/// Resolves constant pool indices of one class file, caching each slot.
pub struct Resolver<'a> {
    pool: &'a ConstantPool,
    cache: Vec<OnceLock<Constant<'a>>>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver with an empty cache.
    #[must_use]
    pub fn new(pool: &'a ConstantPool) -> Self {
        let mut cache = Vec::with_capacity(pool.len());
        cache.resize_with(pool.len(), OnceLock::new);
        Resolver { pool, cache }
    }

    /// Resolve `index` to a typed constant.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for index 0, an out-of-range index, the dead slot of a
    /// `Long`/`Double`, or an entry whose references point at the wrong kind of entry.
    pub fn resolve(&self, index: CpIndex) -> Result<&Constant<'a>> {
        let Some(slot) = self.cache.get(usize::from(index.value())) else {
            return Err(malformed_error!(
                "Constant pool index {} out of range ({} slots)",
                index,
                self.cache.len()
            ));
        };
        if let Some(constant) = slot.get() {
            return Ok(constant);
        }

        let constant = self.decode(index)?;
        Ok(slot.get_or_init(|| constant))
    }

    fn decode(&self, index: CpIndex) -> Result<Constant<'a>> {
        let pool: &'a ConstantPool = self.pool;
        let constant = match pool.get(index)? {
            ConstantEntry::Utf8(text) => Constant::Utf8(text.as_str()),
            ConstantEntry::Integer(value) => Constant::Integer(*value),
            ConstantEntry::Float(value) => Constant::Float(*value),
            ConstantEntry::Long(value) => Constant::Long(*value),
            ConstantEntry::Double(value) => Constant::Double(*value),
            ConstantEntry::Class { name } => Constant::Class(pool.utf8(*name)?),
            ConstantEntry::String { value } => Constant::String(pool.utf8(*value)?),
            ConstantEntry::Fieldref {
                class,
                name_and_type,
            } => Constant::Member(self.member(MemberKind::Field, *class, *name_and_type)?),
            ConstantEntry::Methodref {
                class,
                name_and_type,
            } => Constant::Member(self.member(MemberKind::Method, *class, *name_and_type)?),
            ConstantEntry::InterfaceMethodref {
                class,
                name_and_type,
            } => Constant::Member(self.member(
                MemberKind::InterfaceMethod,
                *class,
                *name_and_type,
            )?),
            ConstantEntry::NameAndType { name, descriptor } => Constant::NameAndType(NameAndType {
                name: pool.utf8(*name)?,
                descriptor: pool.utf8(*descriptor)?,
            }),
            ConstantEntry::MethodHandle { kind, reference } => {
                self.expect_tag(
                    *reference,
                    &[
                        ConstantTag::Fieldref,
                        ConstantTag::Methodref,
                        ConstantTag::InterfaceMethodref,
                    ],
                    "a member reference",
                )?;
                let member = self.member_ref(*reference)?;
                let valid = match kind {
                    ReferenceKind::GetField
                    | ReferenceKind::GetStatic
                    | ReferenceKind::PutField
                    | ReferenceKind::PutStatic => member.kind == MemberKind::Field,
                    ReferenceKind::InvokeVirtual | ReferenceKind::NewInvokeSpecial => {
                        member.kind == MemberKind::Method
                    }
                    ReferenceKind::InvokeStatic | ReferenceKind::InvokeSpecial => {
                        member.kind != MemberKind::Field
                    }
                    ReferenceKind::InvokeInterface => member.kind == MemberKind::InterfaceMethod,
                };
                if !valid {
                    return Err(malformed_error!(
                        "Method handle {} of kind {} references a {:?}",
                        index,
                        kind,
                        member.kind
                    ));
                }
                Constant::MethodHandle(MethodHandle {
                    kind: *kind,
                    member,
                })
            }
            ConstantEntry::MethodType { descriptor } => {
                Constant::MethodType(pool.utf8(*descriptor)?)
            }
            ConstantEntry::Dynamic {
                bootstrap_method,
                name_and_type,
            } => Constant::Dynamic(self.dynamic_constant(*bootstrap_method, *name_and_type)?),
            ConstantEntry::InvokeDynamic {
                bootstrap_method,
                name_and_type,
            } => Constant::InvokeDynamic(self.dynamic_constant(*bootstrap_method, *name_and_type)?),
            ConstantEntry::Module { name } => Constant::Module(pool.utf8(*name)?),
            ConstantEntry::Package { name } => Constant::Package(pool.utf8(*name)?),
        };

        Ok(constant)
    }

    fn member(
        &self,
        kind: MemberKind,
        class: CpIndex,
        name_and_type: CpIndex,
    ) -> Result<ResolvedMember<'a>> {
        self.expect_tag(class, &[ConstantTag::Class], "Class")?;
        self.expect_tag(name_and_type, &[ConstantTag::NameAndType], "NameAndType")?;
        let owner = self.class_name(class)?;
        let NameAndType { name, descriptor } = self.name_and_type(name_and_type)?;
        Ok(ResolvedMember {
            kind,
            owner,
            name,
            descriptor,
        })
    }

    fn dynamic_constant(
        &self,
        bootstrap_method: u16,
        name_and_type: CpIndex,
    ) -> Result<DynamicConstant<'a>> {
        self.expect_tag(name_and_type, &[ConstantTag::NameAndType], "NameAndType")?;
        let NameAndType { name, descriptor } = self.name_and_type(name_and_type)?;
        Ok(DynamicConstant {
            bootstrap_method,
            name,
            descriptor,
        })
    }

    /// Check the tag of a referenced entry without resolving it.
    fn expect_tag(&self, index: CpIndex, expected: &[ConstantTag], what: &str) -> Result<()> {
        let tag = self.pool.get(index)?.tag();
        if expected.contains(&tag) {
            return Ok(());
        }
        Err(malformed_error!(
            "Constant pool index {} is {}, expected {}",
            index,
            tag,
            what
        ))
    }

    fn wrong_kind(&self, index: CpIndex, expected: &str, found: &Constant<'_>) -> crate::Error {
        malformed_error!(
            "Constant pool index {} is {}, expected {}",
            index,
            found.kind_name(),
            expected
        )
    }

    /// Resolve a `CONSTANT_Utf8`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or of another kind.
    pub fn utf8(&self, index: CpIndex) -> Result<&'a str> {
        match self.resolve(index)? {
            Constant::Utf8(text) => Ok(*text),
            other => Err(self.wrong_kind(index, "Utf8", other)),
        }
    }

    /// Resolve a `CONSTANT_Class` to the internal class name.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or of another kind.
    pub fn class_name(&self, index: CpIndex) -> Result<&'a str> {
        match self.resolve(index)? {
            Constant::Class(name) => Ok(*name),
            other => Err(self.wrong_kind(index, "Class", other)),
        }
    }

    /// Resolve a `CONSTANT_NameAndType`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or of another kind.
    pub fn name_and_type(&self, index: CpIndex) -> Result<NameAndType<'a>> {
        match self.resolve(index)? {
            Constant::NameAndType(name_and_type) => Ok(*name_and_type),
            other => Err(self.wrong_kind(index, "NameAndType", other)),
        }
    }

    /// Resolve a `Fieldref`, `Methodref` or `InterfaceMethodref`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or of another kind.
    pub fn member_ref(&self, index: CpIndex) -> Result<ResolvedMember<'a>> {
        match self.resolve(index)? {
            Constant::Member(member) => Ok(*member),
            other => Err(self.wrong_kind(index, "a member reference", other)),
        }
    }

    /// Resolve a `CONSTANT_MethodHandle`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or of another kind.
    pub fn method_handle(&self, index: CpIndex) -> Result<MethodHandle<'a>> {
        match self.resolve(index)? {
            Constant::MethodHandle(handle) => Ok(*handle),
            other => Err(self.wrong_kind(index, "MethodHandle", other)),
        }
    }

    /// Resolve a `CONSTANT_MethodType` to its method descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or of another kind.
    pub fn method_type(&self, index: CpIndex) -> Result<&'a str> {
        match self.resolve(index)? {
            Constant::MethodType(descriptor) => Ok(*descriptor),
            other => Err(self.wrong_kind(index, "MethodType", other)),
        }
    }

    /// Resolve a `CONSTANT_Dynamic` or `CONSTANT_InvokeDynamic`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or of another kind.
    pub fn dynamic(&self, index: CpIndex) -> Result<DynamicConstant<'a>> {
        match self.resolve(index)? {
            Constant::Dynamic(dynamic) | Constant::InvokeDynamic(dynamic) => Ok(*dynamic),
            other => Err(self.wrong_kind(index, "Dynamic or InvokeDynamic", other)),
        }
    }

    /// Resolve a constant that `ldc` or a bootstrap argument may refer to.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is invalid or not loadable.
    pub fn loadable(&self, index: CpIndex) -> Result<&Constant<'a>> {
        let constant = self.resolve(index)?;
        match constant {
            Constant::Integer(_)
            | Constant::Float(_)
            | Constant::Long(_)
            | Constant::Double(_)
            | Constant::Class(_)
            | Constant::String(_)
            | Constant::MethodHandle(_)
            | Constant::MethodType(_)
            | Constant::Dynamic(_) => Ok(constant),
            other => Err(self.wrong_kind(index, "a loadable constant", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::parser::Parser;

    #[rustfmt::skip]
    const POOL: &[u8] = &[
        0x00, 0x10,                               // count = 16
        0x01, 0x00, 0x01, b'B',                   // #1 Utf8 "B"
        0x07, 0x00, 0x01,                         // #2 Class B
        0x01, 0x00, 0x01, b'n',                   // #3 Utf8 "n"
        0x01, 0x00, 0x03, b'(', b')', b'V',       // #4 Utf8 "()V"
        0x0C, 0x00, 0x03, 0x00, 0x04,             // #5 NameAndType n:()V
        0x0A, 0x00, 0x02, 0x00, 0x05,             // #6 Methodref B.n:()V
        0x06, 0x40, 0x45, 0, 0, 0, 0, 0, 0,       // #7 Double (and dead #8)
        0x0F, 0x06, 0x00, 0x06,                   // #9 MethodHandle invokestatic #6
        0x10, 0x00, 0x04,                         // #10 MethodType ()V
        0x12, 0x00, 0x00, 0x00, 0x05,             // #11 InvokeDynamic bsm 0, n:()V
        0x09, 0x00, 0x01, 0x00, 0x05,             // #12 Fieldref with a Utf8 as class
        0x0F, 0x01, 0x00, 0x06,                   // #13 MethodHandle getfield -> Methodref
        0x08, 0x00, 0x01,                         // #14 String "B"
        0x11, 0x00, 0x01, 0x00, 0x05,             // #15 Dynamic bsm 1
    ];

    fn pool() -> ConstantPool {
        ConstantPool::read(&mut Parser::new(POOL)).unwrap()
    }

    #[test]
    fn resolves_member_reference() {
        let pool = pool();
        let resolver = Resolver::new(&pool);

        let member = resolver.member_ref(CpIndex(6)).unwrap();
        assert_eq!(
            member,
            ResolvedMember {
                kind: MemberKind::Method,
                owner: "B",
                name: "n",
                descriptor: "()V"
            }
        );
        assert!(!member.is_field());
        assert_eq!(resolver.class_name(CpIndex(2)).unwrap(), "B");
    }

    #[test]
    fn lookups_are_memoized() {
        let pool = pool();
        let resolver = Resolver::new(&pool);

        let first = resolver.resolve(CpIndex(6)).unwrap();
        let second = resolver.resolve(CpIndex(6)).unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first, second);
    }

    #[test]
    fn slot_discipline() {
        let pool = pool();
        let resolver = Resolver::new(&pool);

        assert_eq!(resolver.resolve(CpIndex(7)).unwrap(), &Constant::Double(42.0));
        assert!(resolver.resolve(CpIndex(8)).unwrap_err().is_malformed());
        assert!(resolver.method_handle(CpIndex(9)).is_ok());
        assert!(resolver.resolve(CpIndex(0)).is_err());
        assert!(resolver.resolve(CpIndex(16)).is_err());
        assert!(resolver.resolve(CpIndex(u16::MAX)).is_err());
    }

    #[test]
    fn method_handles_and_dynamic() {
        let pool = pool();
        let resolver = Resolver::new(&pool);

        let handle = resolver.method_handle(CpIndex(9)).unwrap();
        assert_eq!(handle.kind, ReferenceKind::InvokeStatic);
        assert_eq!(handle.member.name, "n");
        assert_eq!(resolver.method_type(CpIndex(10)).unwrap(), "()V");

        let call_site = resolver.dynamic(CpIndex(11)).unwrap();
        assert_eq!(call_site.bootstrap_method, 0);
        assert_eq!(call_site.descriptor, "()V");
        assert_eq!(resolver.dynamic(CpIndex(15)).unwrap().bootstrap_method, 1);
    }

    #[test]
    fn wrong_kinds() {
        let pool = pool();
        let resolver = Resolver::new(&pool);

        assert!(resolver.class_name(CpIndex(1)).is_err());
        assert!(resolver.utf8(CpIndex(2)).is_err());
        assert!(resolver.member_ref(CpIndex(12)).unwrap_err().is_malformed());
        assert!(resolver.method_handle(CpIndex(13)).is_err());
        assert!(resolver.method_type(CpIndex(4)).is_err());
    }

    #[test]
    fn self_references_fail_without_recursing() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x07,                   // count = 7
            0x07, 0x00, 0x01,             // #1 Class named by itself
            0x0A, 0x00, 0x02, 0x00, 0x02, // #2 Methodref with itself as class and type
            0x0F, 0x06, 0x00, 0x03,       // #3 MethodHandle invokestatic itself
            0x0C, 0x00, 0x04, 0x00, 0x04, // #4 NameAndType named by itself
            0x11, 0x00, 0x00, 0x00, 0x05, // #5 Dynamic typed by itself
            0x09, 0x00, 0x01, 0x00, 0x04, // #6 Fieldref through #1 and #4
        ];
        let pool = ConstantPool::read(&mut Parser::new(&data)).unwrap();
        let resolver = Resolver::new(&pool);

        assert!(resolver.class_name(CpIndex(1)).unwrap_err().is_malformed());
        assert!(resolver.member_ref(CpIndex(2)).unwrap_err().is_malformed());
        assert!(resolver.method_handle(CpIndex(3)).unwrap_err().is_malformed());
        assert!(resolver.name_and_type(CpIndex(4)).unwrap_err().is_malformed());
        assert!(resolver.dynamic(CpIndex(5)).unwrap_err().is_malformed());
        assert!(resolver.member_ref(CpIndex(6)).unwrap_err().is_malformed());
    }

    #[test]
    fn loadable_constants() {
        let pool = pool();
        let resolver = Resolver::new(&pool);

        assert!(matches!(resolver.loadable(CpIndex(2)), Ok(Constant::Class("B"))));
        assert!(matches!(resolver.loadable(CpIndex(14)), Ok(Constant::String("B"))));
        assert!(resolver.loadable(CpIndex(15)).is_ok());
        assert!(resolver.loadable(CpIndex(1)).is_err());
        assert!(resolver.loadable(CpIndex(6)).is_err());
        assert!(resolver.loadable(CpIndex(11)).is_err());
    }
}
