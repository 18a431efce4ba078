//! The symbol model: referenced symbols, usage locations and their canonical strings.
//!
//! | Kind     | Canonical reference          | Location                     |
//! |----------|------------------------------|------------------------------|
//! | Class    | `s:name`                     | `c:name`                     |
//! | Field    | `f:owner:name:descriptor`    | `f:owner:name:descriptor`    |
//! | Method   | `m:owner:name:descriptor`    | `m:owner:name:descriptor`    |
//!
//! Parts are joined with `:`. The class file format allows `:` inside class and member names,
//! so a key built from such a name is ambiguous: it still displays, but parsing it back splits
//! at the first two colons and yields different parts. Keys are unique and round-trip only for
//! names without `:`, which covers everything `javac` and the common JVM languages emit.

use std::{fmt, str::FromStr};

use crate::Error;

/// A member key: `owner:name:descriptor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberRef {
    /// Internal name of the declaring class
    pub owner: String,
    /// Member name
    pub name: String,
    /// Field or method descriptor
    pub descriptor: String,
}

impl MemberRef {
    /// Create a member key from its parts.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        MemberRef {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.owner, self.name, self.descriptor)
    }
}

impl FromStr for MemberRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), Some(descriptor))
                if !owner.is_empty() && !name.is_empty() && !descriptor.is_empty() =>
            {
                Ok(MemberRef::new(owner, name, descriptor))
            }
            _ => Err(Error::Error(format!("Invalid member key '{}'", s))),
        }
    }
}

/// A referenced symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// A class or interface, by internal name
    Class(String),
    /// A field
    Field(MemberRef),
    /// A method or constructor
    Method(MemberRef),
}

impl Symbol {
    /// The canonical reference string (`s:`, `f:` or `m:` form).
    #[must_use]
    pub fn reference(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Class(name) => write!(f, "s:{}", name),
            Symbol::Field(member) => write!(f, "f:{}", member),
            Symbol::Method(member) => write!(f, "m:{}", member),
        }
    }
}

impl FromStr for Symbol {
    type Err = Error;

    /// Parse a canonical reference.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use classref::{MemberRef, Symbol};
    ///
    /// let symbol: Symbol = "m:java/io/PrintStream:println:(Ljava/lang/String;)V".parse()?;
    /// assert_eq!(
    ///     symbol,
    ///     Symbol::Method(MemberRef::new(
    ///         "java/io/PrintStream",
    ///         "println",
    ///         "(Ljava/lang/String;)V"
    ///     ))
    /// );
    /// # Ok::<(), classref::Error>(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("s:") {
            if !name.is_empty() && !name.contains(':') {
                return Ok(Symbol::Class(name.to_string()));
            }
        } else if let Some(member) = s.strip_prefix("f:") {
            return Ok(Symbol::Field(member.parse()?));
        } else if let Some(member) = s.strip_prefix("m:") {
            return Ok(Symbol::Method(member.parse()?));
        }
        Err(Error::Error(format!("Invalid symbol reference '{}'", s)))
    }
}

/// Where a usage occurs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UsageLocation {
    /// Class-level structure: header, signature, annotations
    Class(String),
    /// A method's declaration or body
    Method(MemberRef),
    /// A field's declaration
    Field(MemberRef),
}

impl fmt::Display for UsageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageLocation::Class(name) => write!(f, "c:{}", name),
            UsageLocation::Method(member) => write!(f, "m:{}", member),
            UsageLocation::Field(member) => write!(f, "f:{}", member),
        }
    }
}

impl FromStr for UsageLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("c:") {
            if !name.is_empty() && !name.contains(':') {
                return Ok(UsageLocation::Class(name.to_string()));
            }
        } else if let Some(member) = s.strip_prefix("m:") {
            return Ok(UsageLocation::Method(member.parse()?));
        } else if let Some(member) = s.strip_prefix("f:") {
            return Ok(UsageLocation::Field(member.parse()?));
        }
        Err(Error::Error(format!("Invalid usage location '{}'", s)))
    }
}

/// One usage: `symbol` is referenced from `location`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UsageEdge {
    /// The referenced symbol
    pub symbol: Symbol,
    /// Where the reference occurs
    pub location: UsageLocation,
}

impl fmt::Display for UsageEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.symbol, self.location)
    }
}
