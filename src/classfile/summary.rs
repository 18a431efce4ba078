//! One-line header summary of a class, for export next to its usage edges.

use std::{fmt, str::FromStr};

use crate::Error;

/// Name, superclass, access flags and interfaces of one class.
///
/// The string form is `name|superName|accessFlags|iface1,iface2`: a missing superclass is
/// written as the empty string, flags in decimal, interfaces comma separated.
///
/// # Examples
///
/// ```rust
/// use classref::ClassSummary;
///
/// let summary: ClassSummary = "a/B|java/lang/Object|33|java/lang/Runnable".parse()?;
/// assert_eq!(summary.super_name.as_deref(), Some("java/lang/Object"));
/// assert_eq!(summary.to_string(), "a/B|java/lang/Object|33|java/lang/Runnable");
/// # Ok::<(), classref::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassSummary {
    /// Internal name of the class
    pub name: String,
    /// Internal name of the superclass; `None` only for `java/lang/Object` and modules
    pub super_name: Option<String>,
    /// Raw `access_flags`
    pub access_flags: u16,
    /// Internal names of the direct superinterfaces, in declaration order
    pub interfaces: Vec<String>,
}

impl fmt::Display for ClassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.name,
            self.super_name.as_deref().unwrap_or(""),
            self.access_flags,
            self.interfaces.join(",")
        )
    }
}

impl FromStr for ClassSummary {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('|').collect();
        let [name, super_name, access_flags, interfaces] = parts.as_slice() else {
            return Err(Error::Error(format!(
                "Class summary '{}' must have 4 fields, found {}",
                s,
                parts.len()
            )));
        };

        if name.is_empty() {
            return Err(Error::Error(format!("Class summary '{}' has no name", s)));
        }
        let Ok(access_flags) = access_flags.parse::<u16>() else {
            return Err(Error::Error(format!(
                "Class summary '{}' has invalid access flags",
                s
            )));
        };

        Ok(ClassSummary {
            name: (*name).to_string(),
            super_name: (!super_name.is_empty()).then(|| (*super_name).to_string()),
            access_flags,
            interfaces: if interfaces.is_empty() {
                Vec::new()
            } else {
                interfaces.split(',').map(str::to_string).collect()
            },
        })
    }
}
