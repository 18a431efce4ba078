//! Index configuration
//!
//! Selects which parts of a class file the usage visitor scans. Every source is enabled by
//! default; the presets trade completeness for speed or focus.

/// Configuration for usage extraction
///
/// Disabling a source only removes the edges it would contribute; a malformed class file is
/// still rejected as a whole, since the reader decodes everything before the visitor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct IndexConfig {
    /// Superclass, interfaces, and the nest, inner-class, enclosing-method, permitted-subclass
    /// and record attributes
    pub scan_class_hierarchy: bool,

    /// Field types, method parameter and return types, declared exceptions
    pub scan_member_signatures: bool,

    /// Annotations of every kind, including parameter, type and default-value annotations
    pub scan_annotations: bool,

    /// Generic `Signature` attributes of classes, fields, methods and record components
    pub scan_generic_signatures: bool,

    /// Instruction streams and exception tables
    pub scan_method_bodies: bool,

    /// Static arguments of bootstrap methods and call-site descriptors of `invokedynamic`
    pub scan_bootstrap_arguments: bool,

    /// Maximum chain of dynamic constants followed through bootstrap arguments (default: 16)
    pub max_dynamic_depth: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            scan_class_hierarchy: true,
            scan_member_signatures: true,
            scan_annotations: true,
            scan_generic_signatures: true,
            scan_method_bodies: true,
            scan_bootstrap_arguments: true,
            max_dynamic_depth: 16,
        }
    }
}

impl IndexConfig {
    /// Every usage source
    #[must_use]
    pub fn full() -> Self {
        Self::default()
    }

    /// Only what executing code references: instructions, exception tables and bootstrap
    /// arguments
    #[must_use]
    pub fn bytecode_only() -> Self {
        Self {
            scan_class_hierarchy: false,
            scan_member_signatures: false,
            scan_annotations: false,
            scan_generic_signatures: false,
            scan_method_bodies: true,
            scan_bootstrap_arguments: true,
            max_dynamic_depth: 16,
        }
    }

    /// Only declarations: header, member signatures, annotations and generic signatures
    #[must_use]
    pub fn declarations_only() -> Self {
        Self {
            scan_class_hierarchy: true,
            scan_member_signatures: true,
            scan_annotations: true,
            scan_generic_signatures: true,
            scan_method_bodies: false,
            scan_bootstrap_arguments: false,
            max_dynamic_depth: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(IndexConfig::full(), IndexConfig::default());

        let bytecode = IndexConfig::bytecode_only();
        assert!(bytecode.scan_method_bodies);
        assert!(bytecode.scan_bootstrap_arguments);
        assert!(!bytecode.scan_class_hierarchy);
        assert!(!bytecode.scan_annotations);

        let declarations = IndexConfig::declarations_only();
        assert!(!declarations.scan_method_bodies);
        assert!(declarations.scan_member_signatures);
        assert!(declarations.scan_generic_signatures);
    }
}
