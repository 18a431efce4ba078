//! Generic signatures (JVMS §4.7.9.1).
//!
//! `Signature` attributes carry the unerased types of classes, fields and methods:
//! type parameters and their bounds, type arguments, inner classes of parameterized outer
//! classes. The scanner here walks the grammar and collects every class it names. Type
//! variables contribute nothing. Inner classes written as `Outer<..>.Inner` are reported by
//! their binary name `Outer$Inner`.

use std::borrow::Cow;

use crate::Result;

/// Nesting limit for type arguments and array components.
const MAX_NESTING_DEPTH: usize = 64;

/// Classes named by a class signature: type parameter bounds, superclass, superinterfaces.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the signature does not follow the grammar.
///
/// # Examples
///
/// ```rust
/// use classref::classfile::class_signature_classes;
///
/// let classes = class_signature_classes(
///     "<T::Ljava/lang/Comparable<TT;>;>Ljava/lang/Object;Ljava/util/function/Supplier<TT;>;",
/// )?;
/// assert_eq!(
///     classes,
///     ["java/lang/Comparable", "java/lang/Object", "java/util/function/Supplier"]
/// );
/// # Ok::<(), classref::Error>(())
/// ```
pub fn class_signature_classes(signature: &str) -> Result<Vec<Cow<'_, str>>> {
    let mut scanner = SignatureScanner::new(signature);
    scanner.type_parameters()?;
    scanner.class_type()?;
    while !scanner.at_end() {
        scanner.class_type()?;
    }
    Ok(scanner.classes)
}

/// Classes named by a method signature: type parameter bounds, parameters, return type and
/// thrown types.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the signature does not follow the grammar.
pub fn method_signature_classes(signature: &str) -> Result<Vec<Cow<'_, str>>> {
    let mut scanner = SignatureScanner::new(signature);
    scanner.type_parameters()?;
    scanner.expect(b'(')?;
    while scanner.peek() != Some(b')') {
        scanner.java_type()?;
    }
    scanner.expect(b')')?;

    if scanner.peek() == Some(b'V') {
        scanner.pos += 1;
    } else {
        scanner.java_type()?;
    }

    while scanner.peek() == Some(b'^') {
        scanner.pos += 1;
        if scanner.peek() == Some(b'T') {
            scanner.type_variable()?;
        } else {
            scanner.class_type()?;
        }
    }
    scanner.finish()?;
    Ok(scanner.classes)
}

/// Classes named by a field signature (a single reference type).
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the signature does not follow the grammar.
pub fn field_signature_classes(signature: &str) -> Result<Vec<Cow<'_, str>>> {
    let mut scanner = SignatureScanner::new(signature);
    scanner.reference_type()?;
    scanner.finish()?;
    Ok(scanner.classes)
}

struct SignatureScanner<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
    classes: Vec<Cow<'a, str>>,
}

impl<'a> SignatureScanner<'a> {
    fn new(input: &'a str) -> Self {
        SignatureScanner {
            input,
            pos: 0,
            depth: 0,
            classes: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn error(&self, expected: &str) -> crate::Error {
        malformed_error!(
            "Invalid signature '{}': expected {} at {}",
            self.input,
            expected,
            self.pos
        )
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("'{}'", char::from(byte))))
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("end of signature"))
        }
    }

    /// Consume bytes up to (not including) the first of `stops`; the result must be non-empty.
    fn identifier(&mut self, stops: &[u8]) -> Result<&'a str> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if stops.contains(&byte) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start || self.at_end() {
            return Err(self.error("identifier"));
        }
        Ok(&self.input[start..self.pos])
    }

    fn type_parameters(&mut self) -> Result<()> {
        if self.peek() != Some(b'<') {
            return Ok(());
        }
        self.pos += 1;

        loop {
            self.identifier(b":")?;
            self.expect(b':')?;
            // The class bound may be empty when only interface bounds follow
            if matches!(self.peek(), Some(b'L' | b'T' | b'[')) {
                self.reference_type()?;
            }
            while self.peek() == Some(b':') {
                self.pos += 1;
                self.reference_type()?;
            }
            if self.peek() == Some(b'>') {
                self.pos += 1;
                return Ok(());
            }
        }
    }

    fn java_type(&mut self) -> Result<()> {
        match self.peek() {
            Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => {
                self.pos += 1;
                Ok(())
            }
            _ => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(self.error("shallower nesting"));
        }

        let result = match self.peek() {
            Some(b'L') => self.class_type(),
            Some(b'T') => self.type_variable(),
            Some(b'[') => {
                self.pos += 1;
                self.java_type()
            }
            _ => Err(self.error("reference type")),
        };

        self.depth -= 1;
        result
    }

    fn type_variable(&mut self) -> Result<()> {
        self.expect(b'T')?;
        self.identifier(b";")?;
        self.expect(b';')
    }

    fn class_type(&mut self) -> Result<()> {
        self.expect(b'L')?;
        let mut name = Cow::Borrowed(self.identifier(b"<.;")?);

        loop {
            if self.peek() == Some(b'<') {
                self.type_arguments()?;
            }
            if self.peek() != Some(b'.') {
                break;
            }
            self.pos += 1;
            let inner = self.identifier(b"<.;")?;
            name = Cow::Owned(format!("{}${}", name, inner));
        }

        self.expect(b';')?;
        self.classes.push(name);
        Ok(())
    }

    fn type_arguments(&mut self) -> Result<()> {
        self.expect(b'<')?;
        loop {
            match self.peek() {
                Some(b'*') => self.pos += 1,
                Some(b'+' | b'-') => {
                    self.pos += 1;
                    self.reference_type()?;
                }
                _ => self.reference_type()?,
            }
            if self.peek() == Some(b'>') {
                self.pos += 1;
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_signatures() {
        let classes = class_signature_classes(
            "<K:Ljava/lang/Object;V::Ljava/io/Serializable;>Ljava/util/AbstractMap<TK;TV;>;Ljava/util/Map<TK;TV;>;",
        )
        .unwrap();
        assert_eq!(
            classes,
            [
                "java/lang/Object",
                "java/io/Serializable",
                "java/util/AbstractMap",
                "java/util/Map"
            ]
        );
    }

    #[test]
    fn method_signatures() {
        let classes = method_signature_classes(
            "<T:Ljava/lang/Exception;>(Ljava/util/List<+Ljava/lang/Number;>;[TT;I)Ljava/util/Optional<*>;^TT;^Ljava/io/IOException;",
        )
        .unwrap();
        assert_eq!(
            classes,
            [
                "java/lang/Exception",
                "java/lang/Number",
                "java/util/List",
                "java/util/Optional",
                "java/io/IOException"
            ]
        );

        assert!(method_signature_classes("()V").unwrap().is_empty());
    }

    #[test]
    fn inner_class_of_parameterized_outer() {
        let classes =
            field_signature_classes("Lpkg/Outer<Ljava/lang/String;>.Inner<TT;>;").unwrap();
        assert_eq!(classes, ["java/lang/String", "pkg/Outer$Inner"]);
    }

    #[test]
    fn field_signatures() {
        assert!(field_signature_classes("TT;").unwrap().is_empty());
        assert_eq!(
            field_signature_classes("[Ljava/util/List<-Ljava/lang/Integer;>;").unwrap(),
            ["java/lang/Integer", "java/util/List"]
        );
    }

    #[test]
    fn invalid_signatures() {
        let invalid = [
            "",
            "I",
            "Ljava/lang/Object",
            "TT",
            "Ljava/util/List<>;",
            "Ljava/util/List<TT;;",
        ];
        for signature in invalid {
            assert!(field_signature_classes(signature).is_err(), "{}", signature);
        }
        assert!(class_signature_classes("<T:>").is_err());
        assert!(method_signature_classes("(I").is_err());
        assert!(method_signature_classes("()VX").is_err());
    }

    #[test]
    fn nesting_limit() {
        let deep = format!("{}I", "[".repeat(MAX_NESTING_DEPTH + 1));
        assert!(field_signature_classes(&deep).is_err());
    }
}
