//! Field and method descriptors (JVMS §4.3).
//!
//! A descriptor is the erased type of a field or method: `I`, `[Ljava/lang/String;`,
//! `(ILjava/util/List;)V`. Parsing borrows class names straight out of the descriptor string.

use std::fmt;

use crate::Result;

/// The dimension limit the JVM places on array types.
const MAX_ARRAY_DIMENSIONS: usize = 255;

/// The innermost component of a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType<'a> {
    /// One of `B C D F I J S Z`
    Primitive(char),
    /// A class or interface, by internal name
    Class(&'a str),
}

/// A parsed field descriptor: an element type with zero or more array dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType<'a> {
    /// Number of leading `[`
    pub dimensions: usize,
    /// The element type
    pub element: ElementType<'a>,
}

impl<'a> FieldType<'a> {
    /// Parse a complete field descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `descriptor` is not exactly one field type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classref::classfile::FieldType;
    ///
    /// let field = FieldType::parse("[[Ljava/lang/String;")?;
    /// assert_eq!(field.dimensions, 2);
    /// assert_eq!(field.class_name(), Some("java/lang/String"));
    /// # Ok::<(), classref::Error>(())
    /// ```
    pub fn parse(descriptor: &'a str) -> Result<FieldType<'a>> {
        let (field, rest) = Self::parse_prefix(descriptor)?;
        if !rest.is_empty() {
            return Err(malformed_error!("Trailing data in field descriptor '{}'", descriptor));
        }
        Ok(field)
    }

    /// Parse one field type from the start of `input` and return the unparsed remainder.
    fn parse_prefix(input: &'a str) -> Result<(FieldType<'a>, &'a str)> {
        let dimensions = input.bytes().take_while(|b| *b == b'[').count();
        if dimensions > MAX_ARRAY_DIMENSIONS {
            return Err(malformed_error!("Array type with {} dimensions", dimensions));
        }

        let rest = &input[dimensions..];
        match rest.as_bytes().first() {
            Some(b'L') => {
                let Some(end) = rest.find(';') else {
                    return Err(malformed_error!("Unterminated class type in '{}'", input));
                };
                let name = &rest[1..end];
                if name.is_empty() {
                    return Err(malformed_error!("Empty class name in '{}'", input));
                }
                Ok((
                    FieldType {
                        dimensions,
                        element: ElementType::Class(name),
                    },
                    &rest[end + 1..],
                ))
            }
            Some(&b) if b"BCDFIJSZ".contains(&b) => Ok((
                FieldType {
                    dimensions,
                    element: ElementType::Primitive(char::from(b)),
                },
                &rest[1..],
            )),
            _ => Err(malformed_error!("Invalid field descriptor '{}'", input)),
        }
    }

    /// The referenced class, looking through array dimensions. `None` for primitives.
    #[must_use]
    pub fn class_name(&self) -> Option<&'a str> {
        match self.element {
            ElementType::Class(name) => Some(name),
            ElementType::Primitive(_) => None,
        }
    }
}

impl fmt::Display for FieldType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.dimensions {
            f.write_str("[")?;
        }
        match self.element {
            ElementType::Primitive(c) => write!(f, "{}", c),
            ElementType::Class(name) => write!(f, "L{};", name),
        }
    }
}

/// A parsed method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor<'a> {
    /// Parameter types in declaration order
    pub parameters: Vec<FieldType<'a>>,
    /// Return type; `None` for `void`
    pub return_type: Option<FieldType<'a>>,
}

impl<'a> MethodDescriptor<'a> {
    /// Parse a complete method descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `descriptor` is not a well-formed method descriptor.
    pub fn parse(descriptor: &'a str) -> Result<MethodDescriptor<'a>> {
        let Some(mut rest) = descriptor.strip_prefix('(') else {
            return Err(malformed_error!("Method descriptor '{}' must start with '('", descriptor));
        };

        let mut parameters = Vec::new();
        loop {
            if let Some(after) = rest.strip_prefix(')') {
                rest = after;
                break;
            }
            if rest.is_empty() {
                return Err(malformed_error!("Unterminated parameter list in '{}'", descriptor));
            }
            let (parameter, after) = FieldType::parse_prefix(rest)?;
            parameters.push(parameter);
            rest = after;
        }

        let return_type = if rest == "V" {
            None
        } else {
            Some(FieldType::parse(rest)?)
        };

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }

    /// Every class referenced by a parameter or the return type, in order, with repeats.
    pub fn class_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.parameters
            .iter()
            .chain(self.return_type.iter())
            .filter_map(FieldType::class_name)
    }
}

/// Classes referenced by a field descriptor (zero or one).
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for an invalid descriptor.
pub fn field_descriptor_classes(descriptor: &str) -> Result<Option<&str>> {
    Ok(FieldType::parse(descriptor)?.class_name())
}

/// Classes referenced by a method descriptor.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for an invalid descriptor.
pub fn method_descriptor_classes(descriptor: &str) -> Result<Vec<&str>> {
    Ok(MethodDescriptor::parse(descriptor)?.class_names().collect())
}

/// Classes referenced by a return descriptor: a field descriptor or `V`. Annotation
/// class-literal elements are stored in this form.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for an invalid descriptor.
pub fn return_descriptor_classes(descriptor: &str) -> Result<Option<&str>> {
    if descriptor == "V" {
        return Ok(None);
    }
    field_descriptor_classes(descriptor)
}
