//! Annotations, element values and type annotations (JVMS §4.7.16 - §4.7.22).

use crate::{classfile::CpIndex, file::parser::Parser, Result};

/// Nesting limit for element values (nested annotations and arrays).
const MAX_ELEMENT_DEPTH: usize = 64;

/// One annotation: its type and element-value pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Utf8 field descriptor of the annotation interface
    pub type_descriptor: CpIndex,
    /// Element name/value pairs
    pub elements: Vec<ElementValuePair>,
}

/// A named element of an annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    /// Utf8 element name
    pub name: CpIndex,
    /// The element's value
    pub value: ElementValue,
}

/// The value of an annotation element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// A primitive or `String` constant; `tag` is one of `B C D F I J S Z s`
    Const {
        /// The element value tag
        tag: u8,
        /// The constant
        value: CpIndex,
    },
    /// An enum constant
    Enum {
        /// Utf8 field descriptor of the enum class
        type_descriptor: CpIndex,
        /// Utf8 simple name of the constant
        const_name: CpIndex,
    },
    /// A class literal, stored as a Utf8 return descriptor (`V` for `void.class`)
    Class(CpIndex),
    /// A nested annotation
    Annotation(Box<Annotation>),
    /// An array of values
    Array(Vec<ElementValue>),
}

/// The `target_info` of a type annotation, which locates the annotated type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TargetInfo {
    TypeParameter { index: u8 },
    Supertype { index: u16 },
    TypeParameterBound { type_parameter: u8, bound: u8 },
    Empty,
    FormalParameter { index: u8 },
    Throws { index: u16 },
    LocalVariable { table: Vec<LocalVariableRange> },
    Catch { exception_table_index: u16 },
    Offset { offset: u16 },
    TypeArgument { offset: u16, index: u8 },
}

/// One live range of an annotated local variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct LocalVariableRange {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
}

/// An annotation on a use of a type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    /// The raw `target_type` byte
    pub target_type: u8,
    /// Where the annotated type appears
    pub target_info: TargetInfo,
    /// `(type_path_kind, type_argument_index)` steps into the annotated type
    pub type_path: Vec<(u8, u8)>,
    /// The annotation itself
    pub annotation: Annotation,
}

impl Annotation {
    /// Read an `annotation` structure.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on truncation, an unknown element tag, or nesting
    /// deeper than the supported limit.
    pub fn read(parser: &mut Parser) -> Result<Annotation> {
        Self::read_nested(parser, 0)
    }

    fn read_nested(parser: &mut Parser, depth: usize) -> Result<Annotation> {
        let type_descriptor = CpIndex::read(parser)?;
        let count = parser.read_be::<u16>()?;

        let mut elements = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            elements.push(ElementValuePair {
                name: CpIndex::read(parser)?,
                value: ElementValue::read_nested(parser, depth)?,
            });
        }

        Ok(Annotation {
            type_descriptor,
            elements,
        })
    }

    /// Read a `u2`-counted list of annotations.
    pub(crate) fn read_list(parser: &mut Parser) -> Result<Vec<Annotation>> {
        let count = parser.read_be::<u16>()?;
        let mut annotations = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            annotations.push(Annotation::read(parser)?);
        }
        Ok(annotations)
    }
}

impl ElementValue {
    /// Read an `element_value` structure.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on truncation, an unknown tag, or excessive nesting.
    pub fn read(parser: &mut Parser) -> Result<ElementValue> {
        Self::read_nested(parser, 0)
    }

    fn read_nested(parser: &mut Parser, depth: usize) -> Result<ElementValue> {
        if depth > MAX_ELEMENT_DEPTH {
            return Err(malformed_error!(
                "Element values nested deeper than {}",
                MAX_ELEMENT_DEPTH
            ));
        }

        let tag = parser.read_be::<u8>()?;
        let value = match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => ElementValue::Const {
                tag,
                value: CpIndex::read(parser)?,
            },
            b'e' => ElementValue::Enum {
                type_descriptor: CpIndex::read(parser)?,
                const_name: CpIndex::read(parser)?,
            },
            b'c' => ElementValue::Class(CpIndex::read(parser)?),
            b'@' => ElementValue::Annotation(Box::new(Annotation::read_nested(parser, depth + 1)?)),
            b'[' => {
                let count = parser.read_be::<u16>()?;
                let mut values = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    values.push(ElementValue::read_nested(parser, depth + 1)?);
                }
                ElementValue::Array(values)
            }
            _ => {
                return Err(malformed_error!(
                    "Invalid element value tag 0x{:02X}",
                    tag
                ))
            }
        };

        Ok(value)
    }
}

impl TargetInfo {
    fn read(parser: &mut Parser, target_type: u8) -> Result<TargetInfo> {
        let info = match target_type {
            0x00 | 0x01 => TargetInfo::TypeParameter {
                index: parser.read_be::<u8>()?,
            },
            0x10 => TargetInfo::Supertype {
                index: parser.read_be::<u16>()?,
            },
            0x11 | 0x12 => TargetInfo::TypeParameterBound {
                type_parameter: parser.read_be::<u8>()?,
                bound: parser.read_be::<u8>()?,
            },
            0x13..=0x15 => TargetInfo::Empty,
            0x16 => TargetInfo::FormalParameter {
                index: parser.read_be::<u8>()?,
            },
            0x17 => TargetInfo::Throws {
                index: parser.read_be::<u16>()?,
            },
            0x40 | 0x41 => {
                let count = parser.read_be::<u16>()?;
                let mut table = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    table.push(LocalVariableRange {
                        start_pc: parser.read_be::<u16>()?,
                        length: parser.read_be::<u16>()?,
                        index: parser.read_be::<u16>()?,
                    });
                }
                TargetInfo::LocalVariable { table }
            }
            0x42 => TargetInfo::Catch {
                exception_table_index: parser.read_be::<u16>()?,
            },
            0x43..=0x46 => TargetInfo::Offset {
                offset: parser.read_be::<u16>()?,
            },
            0x47..=0x4B => TargetInfo::TypeArgument {
                offset: parser.read_be::<u16>()?,
                index: parser.read_be::<u8>()?,
            },
            _ => {
                return Err(malformed_error!(
                    "Invalid type annotation target 0x{:02X}",
                    target_type
                ))
            }
        };

        Ok(info)
    }
}

impl TypeAnnotation {
    /// Read a `type_annotation` structure.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on truncation or an unknown target type.
    pub fn read(parser: &mut Parser) -> Result<TypeAnnotation> {
        let target_type = parser.read_be::<u8>()?;
        let target_info = TargetInfo::read(parser, target_type)?;

        let path_length = parser.read_be::<u8>()?;
        let mut type_path = Vec::with_capacity(usize::from(path_length));
        for _ in 0..path_length {
            type_path.push((parser.read_be::<u8>()?, parser.read_be::<u8>()?));
        }

        Ok(TypeAnnotation {
            target_type,
            target_info,
            type_path,
            annotation: Annotation::read(parser)?,
        })
    }

    pub(crate) fn read_list(parser: &mut Parser) -> Result<Vec<TypeAnnotation>> {
        let count = parser.read_be::<u16>()?;
        let mut annotations = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            annotations.push(TypeAnnotation::read(parser)?);
        }
        Ok(annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_with_every_element_kind() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x01,             // type #1
            0x00, 0x04,             // 4 pairs
            0x00, 0x02, b'I', 0x00, 0x03,
            0x00, 0x02, b'e', 0x00, 0x04, 0x00, 0x05,
            0x00, 0x02, b'c', 0x00, 0x06,
            0x00, 0x02, b'[', 0x00, 0x02,
                b'@', 0x00, 0x07, 0x00, 0x00,
                b's', 0x00, 0x08,
        ];
        let mut parser = Parser::new(&data);
        let annotation = Annotation::read(&mut parser).unwrap();

        assert!(!parser.has_more_data());
        assert_eq!(annotation.type_descriptor, CpIndex(1));
        assert_eq!(annotation.elements.len(), 4);
        assert_eq!(
            annotation.elements[1].value,
            ElementValue::Enum {
                type_descriptor: CpIndex(4),
                const_name: CpIndex(5)
            }
        );
        assert_eq!(annotation.elements[2].value, ElementValue::Class(CpIndex(6)));
        match &annotation.elements[3].value {
            ElementValue::Array(values) => {
                assert_eq!(values.len(), 2);
                assert_eq!(
                    values[0],
                    ElementValue::Annotation(Box::new(Annotation {
                        type_descriptor: CpIndex(7),
                        elements: vec![]
                    }))
                );
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn invalid_element_tag() {
        let data = [0x00, 0x01, 0x00, 0x01, 0x00, 0x02, b'x', 0x00, 0x03];
        assert!(Annotation::read(&mut Parser::new(&data)).is_err());
    }

    #[test]
    fn nesting_limit() {
        let mut data = Vec::new();
        for _ in 0..=MAX_ELEMENT_DEPTH + 1 {
            data.extend_from_slice(&[b'[', 0x00, 0x01]);
        }
        data.extend_from_slice(&[b'I', 0x00, 0x01]);
        assert!(ElementValue::read(&mut Parser::new(&data)).is_err());
    }

    #[test]
    fn type_annotation_targets() {
        #[rustfmt::skip]
        let data = [
            0x40, 0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x01, // localvar, one range
            0x01, 0x03, 0x00,                                     // type path with one step
            0x00, 0x09, 0x00, 0x00,                               // annotation #9, no pairs
        ];
        let mut parser = Parser::new(&data);
        let annotation = TypeAnnotation::read(&mut parser).unwrap();

        assert!(!parser.has_more_data());
        assert_eq!(
            annotation.target_info,
            TargetInfo::LocalVariable {
                table: vec![LocalVariableRange {
                    start_pc: 0,
                    length: 5,
                    index: 1
                }]
            }
        );
        assert_eq!(annotation.type_path, vec![(3, 0)]);
        assert_eq!(annotation.annotation.type_descriptor, CpIndex(9));

        let data = [0x47, 0x00, 0x10, 0x01, 0x00, 0x00, 0x02, 0x00, 0x00];
        let annotation = TypeAnnotation::read(&mut Parser::new(&data)).unwrap();
        assert_eq!(
            annotation.target_info,
            TargetInfo::TypeArgument {
                offset: 0x10,
                index: 1
            }
        );

        let data = [0x20, 0x00, 0x00, 0x02, 0x00, 0x00];
        assert!(TypeAnnotation::read(&mut Parser::new(&data)).is_err());
    }
}
