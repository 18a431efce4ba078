//! Attribute decoding (JVMS §4.7).
//!
//! Attributes are dispatched on their Utf8 name. Every attribute this crate understands is
//! decoded from a sub-parser limited to the declared `attribute_length`, and must consume it
//! exactly. Anything else is kept as [`Attribute::Unknown`] without looking inside.

use crate::{
    classfile::{
        annotations::{Annotation, ElementValue, TypeAnnotation},
        code::Code,
        ConstantPool, CpIndex,
    },
    file::parser::Parser,
    Result,
};

/// Legitimate class files nest attribute tables two levels deep (`Code` and `Record`
/// components); anything deeper is rejected before it can exhaust the stack.
const MAX_ATTRIBUTE_DEPTH: usize = 4;

/// An entry of the `InnerClasses` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerClass {
    /// The nested class
    pub inner_class: CpIndex,
    /// The enclosing class, absent for local and anonymous classes
    pub outer_class: Option<CpIndex>,
    /// Utf8 simple name, absent for anonymous classes
    pub inner_name: Option<CpIndex>,
    /// Access flags as declared in source
    pub access_flags: u16,
}

/// An entry of the `BootstrapMethods` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    /// A `MethodHandle` constant: the bootstrap method
    pub method: CpIndex,
    /// Loadable constants passed as static arguments
    pub arguments: Vec<CpIndex>,
}

/// A component of a record class.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
    /// Utf8 component name
    pub name: CpIndex,
    /// Utf8 field descriptor
    pub descriptor: CpIndex,
    /// `Signature` and annotation attributes of the component
    pub attributes: Vec<Attribute>,
}

/// A decoded attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Value of a constant field
    ConstantValue(CpIndex),
    /// A method body
    Code(Box<Code>),
    /// Declared checked exceptions of a method
    Exceptions(Vec<CpIndex>),
    /// Utf8 generic signature
    Signature(CpIndex),
    /// Nested classes referenced by this class
    InnerClasses(Vec<InnerClass>),
    /// Enclosing class and method of a local or anonymous class
    EnclosingMethod {
        /// The enclosing class
        class: CpIndex,
        /// `NameAndType` of the enclosing method, if any
        method: Option<CpIndex>,
    },
    /// The host of this class's nest
    NestHost(CpIndex),
    /// Classes in the nest hosted by this class
    NestMembers(Vec<CpIndex>),
    /// Permitted direct subclasses of a sealed class
    PermittedSubclasses(Vec<CpIndex>),
    /// Record components
    Record(Vec<RecordComponent>),
    /// Bootstrap methods of `invokedynamic` and dynamic constants
    BootstrapMethods(Vec<BootstrapMethod>),
    /// `RuntimeVisibleAnnotations` / `RuntimeInvisibleAnnotations`
    Annotations {
        /// Whether the annotations are visible at runtime
        visible: bool,
        /// The annotations
        annotations: Vec<Annotation>,
    },
    /// `RuntimeVisibleParameterAnnotations` / `RuntimeInvisibleParameterAnnotations`
    ParameterAnnotations {
        /// Whether the annotations are visible at runtime
        visible: bool,
        /// One annotation list per parameter
        parameters: Vec<Vec<Annotation>>,
    },
    /// `RuntimeVisibleTypeAnnotations` / `RuntimeInvisibleTypeAnnotations`
    TypeAnnotations {
        /// Whether the annotations are visible at runtime
        visible: bool,
        /// The type annotations
        annotations: Vec<TypeAnnotation>,
    },
    /// Default value of an annotation interface element
    AnnotationDefault(ElementValue),
    /// Any attribute not decoded by this crate
    Unknown {
        /// Attribute name
        name: String,
        /// Declared length in bytes
        length: usize,
    },
}

impl Attribute {
    /// Read a `u2`-counted attribute table.
    pub(crate) fn read_list(
        parser: &mut Parser,
        pool: &ConstantPool,
        depth: usize,
    ) -> Result<Vec<Attribute>> {
        if depth > MAX_ATTRIBUTE_DEPTH {
            return Err(malformed_error!("Attribute tables nested too deeply"));
        }

        let count = parser.read_be::<u16>()?;
        let mut attributes = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            attributes.push(Attribute::read(parser, pool, depth)?);
        }
        Ok(attributes)
    }

    fn read(parser: &mut Parser, pool: &ConstantPool, depth: usize) -> Result<Attribute> {
        let name = pool.utf8(CpIndex::read(parser)?)?;
        let Ok(length) = usize::try_from(parser.read_be::<u32>()?) else {
            return Err(out_of_bounds_error!());
        };
        let mut body = parser.read_sized(length)?;

        let attribute = match name {
            "ConstantValue" => Attribute::ConstantValue(CpIndex::read(&mut body)?),
            "Code" => Attribute::Code(Box::new(Code::read(&mut body, pool, depth)?)),
            "Exceptions" => Attribute::Exceptions(read_index_list(&mut body)?),
            "Signature" => Attribute::Signature(CpIndex::read(&mut body)?),
            "InnerClasses" => {
                let count = body.read_be::<u16>()?;
                let mut classes = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    classes.push(InnerClass {
                        inner_class: CpIndex::read(&mut body)?,
                        outer_class: CpIndex::read_optional(&mut body)?,
                        inner_name: CpIndex::read_optional(&mut body)?,
                        access_flags: body.read_be::<u16>()?,
                    });
                }
                Attribute::InnerClasses(classes)
            }
            "EnclosingMethod" => Attribute::EnclosingMethod {
                class: CpIndex::read(&mut body)?,
                method: CpIndex::read_optional(&mut body)?,
            },
            "NestHost" => Attribute::NestHost(CpIndex::read(&mut body)?),
            "NestMembers" => Attribute::NestMembers(read_index_list(&mut body)?),
            "PermittedSubclasses" => Attribute::PermittedSubclasses(read_index_list(&mut body)?),
            "Record" => {
                let count = body.read_be::<u16>()?;
                let mut components = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    components.push(RecordComponent {
                        name: CpIndex::read(&mut body)?,
                        descriptor: CpIndex::read(&mut body)?,
                        attributes: Attribute::read_list(&mut body, pool, depth + 1)?,
                    });
                }
                Attribute::Record(components)
            }
            "BootstrapMethods" => {
                let count = body.read_be::<u16>()?;
                let mut methods = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    methods.push(BootstrapMethod {
                        method: CpIndex::read(&mut body)?,
                        arguments: read_index_list(&mut body)?,
                    });
                }
                Attribute::BootstrapMethods(methods)
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                Attribute::Annotations {
                    visible: name == "RuntimeVisibleAnnotations",
                    annotations: Annotation::read_list(&mut body)?,
                }
            }
            "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                let count = body.read_be::<u8>()?;
                let mut parameters = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    parameters.push(Annotation::read_list(&mut body)?);
                }
                Attribute::ParameterAnnotations {
                    visible: name == "RuntimeVisibleParameterAnnotations",
                    parameters,
                }
            }
            "RuntimeVisibleTypeAnnotations" | "RuntimeInvisibleTypeAnnotations" => {
                Attribute::TypeAnnotations {
                    visible: name == "RuntimeVisibleTypeAnnotations",
                    annotations: TypeAnnotation::read_list(&mut body)?,
                }
            }
            "AnnotationDefault" => Attribute::AnnotationDefault(ElementValue::read(&mut body)?),
            _ => {
                log::trace!("Skipping attribute '{}' ({} bytes)", name, length);
                return Ok(Attribute::Unknown {
                    name: name.to_string(),
                    length,
                });
            }
        };

        if body.has_more_data() {
            return Err(malformed_error!(
                "Attribute '{}' declares {} bytes but only {} were used",
                name,
                length,
                body.pos()
            ));
        }

        Ok(attribute)
    }

    /// The attribute name as it appears in the class file.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Attribute::ConstantValue(_) => "ConstantValue",
            Attribute::Code(_) => "Code",
            Attribute::Exceptions(_) => "Exceptions",
            Attribute::Signature(_) => "Signature",
            Attribute::InnerClasses(_) => "InnerClasses",
            Attribute::EnclosingMethod { .. } => "EnclosingMethod",
            Attribute::NestHost(_) => "NestHost",
            Attribute::NestMembers(_) => "NestMembers",
            Attribute::PermittedSubclasses(_) => "PermittedSubclasses",
            Attribute::Record(_) => "Record",
            Attribute::BootstrapMethods(_) => "BootstrapMethods",
            Attribute::Annotations { visible: true, .. } => "RuntimeVisibleAnnotations",
            Attribute::Annotations { visible: false, .. } => "RuntimeInvisibleAnnotations",
            Attribute::ParameterAnnotations { visible: true, .. } => {
                "RuntimeVisibleParameterAnnotations"
            }
            Attribute::ParameterAnnotations { visible: false, .. } => {
                "RuntimeInvisibleParameterAnnotations"
            }
            Attribute::TypeAnnotations { visible: true, .. } => "RuntimeVisibleTypeAnnotations",
            Attribute::TypeAnnotations { visible: false, .. } => "RuntimeInvisibleTypeAnnotations",
            Attribute::AnnotationDefault(_) => "AnnotationDefault",
            Attribute::Unknown { name, .. } => name,
        }
    }
}

fn read_index_list(parser: &mut Parser) -> Result<Vec<CpIndex>> {
    let count = parser.read_be::<u16>()?;
    let mut indices = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        indices.push(CpIndex::read(parser)?);
    }
    Ok(indices)
}
