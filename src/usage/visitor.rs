//! The usage visitor: walks a decoded class file and emits its usage edges.
//!
//! Edges are produced in a fixed order: class header and class attributes, then every field,
//! then every method (declaration first, body second). Within a method body, instructions are
//! visited in code order, followed by the exception table and the code's own attributes.

use std::collections::HashSet;

use crate::{
    classfile::{
        class_signature_classes, field_descriptor_classes, field_signature_classes,
        method_descriptor_classes, method_signature_classes, return_descriptor_classes, Annotation,
        Attribute, ClassFile, Code, Constant, CpIndex, DynamicConstant, ElementValue,
        MethodDescriptor, ResolvedMember, Resolver,
    },
    disassembler::{
        ANEWARRAY, CHECKCAST, GETFIELD, GETSTATIC, INSTANCEOF, INVOKEDYNAMIC, INVOKEINTERFACE,
        INVOKESPECIAL, INVOKESTATIC, INVOKEVIRTUAL, LDC, LDC2_W, LDC_W, MULTIANEWARRAY, NEW,
        PUTFIELD, PUTSTATIC,
    },
    usage::{IndexConfig, MemberRef, Symbol, UsageEdge, UsageLocation, UsageSink},
    Result,
};

/// Which grammar a `Signature` attribute follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Class,
    Field,
    Method,
}

/// Dynamic constants reached while following one `ldc` or call site.
///
/// Each constant is expanded once per reference; `active` holds the chain currently being
/// expanded, so a constant that depends on itself is detected.
#[derive(Default)]
struct Expansion {
    active: Vec<CpIndex>,
    done: HashSet<CpIndex>,
}

/// Forwards edges for one location to the sink.
struct Emitter<'s, S: UsageSink + ?Sized> {
    sink: &'s mut S,
    location: UsageLocation,
}

impl<S: UsageSink + ?Sized> Emitter<'_, S> {
    fn emit(&mut self, symbol: Symbol) {
        self.sink.add_edge(&UsageEdge {
            symbol,
            location: self.location.clone(),
        });
    }

    fn class(&mut self, name: &str) {
        self.emit(Symbol::Class(name.to_string()));
    }

    fn member(&mut self, member: &ResolvedMember<'_>) {
        let key = MemberRef::new(member.owner, member.name, member.descriptor);
        if member.is_field() {
            self.emit(Symbol::Field(key));
        } else {
            self.emit(Symbol::Method(key));
        }
    }
}

/// Emits the usage edges of one class file.
///
/// The visitor owns the class file's [`Resolver`], so every constant pool slot is resolved at
/// most once per pass, however often the code refers to it.
///
/// # Examples
///
/// ```rust,no_run
/// use classref::{ClassFile, UsageEdge, UsageVisitor};
///
/// let bytes = std::fs::read("Foo.class")?;
/// let class = ClassFile::from_mem(&bytes)?;
/// let visitor = UsageVisitor::new(&class)?;
///
/// let mut edges: Vec<UsageEdge> = Vec::new();
/// visitor.visit(&mut edges)?;
/// for edge in &edges {
///     println!("{}", edge);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct UsageVisitor<'a> {
    class: &'a ClassFile,
    resolver: Resolver<'a>,
    config: IndexConfig,
    this_class: &'a str,
}

impl<'a> UsageVisitor<'a> {
    /// Create a visitor scanning every usage source.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `this_class` does not name a class.
    pub fn new(class: &'a ClassFile) -> Result<Self> {
        Self::with_config(class, IndexConfig::default())
    }

    /// Create a visitor with an explicit configuration.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `this_class` does not name a class.
    pub fn with_config(class: &'a ClassFile, config: IndexConfig) -> Result<Self> {
        let resolver = class.resolver();
        let this_class = resolver.class_name(class.this_class)?;
        Ok(UsageVisitor {
            class,
            resolver,
            config,
            this_class,
        })
    }

    /// Internal name of the visited class.
    #[must_use]
    pub fn class_name(&self) -> &'a str {
        self.this_class
    }

    /// Emit every usage edge of the class to `sink`.
    ///
    /// Edges are streamed as they are found. If the class turns out to be malformed halfway,
    /// the sink has already seen the edges before the failure; [`crate::index`] stages edges
    /// to avoid that.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on any unresolvable or wrong-kind constant, an
    /// invalid descriptor or signature, or a bootstrap chain deeper than
    /// [`IndexConfig::max_dynamic_depth`].
    pub fn visit<S: UsageSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        let mut out = Emitter {
            sink,
            location: UsageLocation::Class(self.this_class.to_string()),
        };

        if self.config.scan_class_hierarchy {
            if let Some(super_class) = self.class.super_class {
                out.class(self.resolver.class_name(super_class)?);
            }
            for interface in &self.class.interfaces {
                out.class(self.resolver.class_name(*interface)?);
            }
        }
        self.attributes(&self.class.attributes, Owner::Class, &mut out)?;

        for field in &self.class.fields {
            let name = self.resolver.utf8(field.name)?;
            let descriptor = self.resolver.utf8(field.descriptor)?;
            out.location =
                UsageLocation::Field(MemberRef::new(self.this_class, name, descriptor));

            if self.config.scan_member_signatures {
                if let Some(class) = field_descriptor_classes(descriptor)? {
                    out.class(class);
                }
            }
            self.attributes(&field.attributes, Owner::Field, &mut out)?;
        }

        for method in &self.class.methods {
            let name = self.resolver.utf8(method.name)?;
            let descriptor = self.resolver.utf8(method.descriptor)?;
            out.location =
                UsageLocation::Method(MemberRef::new(self.this_class, name, descriptor));

            if self.config.scan_member_signatures {
                for class in MethodDescriptor::parse(descriptor)?.class_names() {
                    out.class(class);
                }
            }
            self.attributes(&method.attributes, Owner::Method, &mut out)?;
        }

        Ok(())
    }

    fn attributes<S: UsageSink + ?Sized>(
        &self,
        attributes: &[Attribute],
        owner: Owner,
        out: &mut Emitter<'_, S>,
    ) -> Result<()> {
        let config = &self.config;
        for attribute in attributes {
            match attribute {
                Attribute::Signature(index) if config.scan_generic_signatures => {
                    let signature = self.resolver.utf8(*index)?;
                    let classes = match owner {
                        Owner::Class => class_signature_classes(signature)?,
                        Owner::Field => field_signature_classes(signature)?,
                        Owner::Method => method_signature_classes(signature)?,
                    };
                    for class in &classes {
                        out.class(class);
                    }
                }
                Attribute::Annotations { annotations, .. } if config.scan_annotations => {
                    for annotation in annotations {
                        self.annotation(annotation, out)?;
                    }
                }
                Attribute::ParameterAnnotations { parameters, .. } if config.scan_annotations => {
                    for annotation in parameters.iter().flatten() {
                        self.annotation(annotation, out)?;
                    }
                }
                Attribute::TypeAnnotations { annotations, .. } if config.scan_annotations => {
                    for type_annotation in annotations {
                        self.annotation(&type_annotation.annotation, out)?;
                    }
                }
                Attribute::AnnotationDefault(value) if config.scan_annotations => {
                    self.element_value(value, out)?;
                }
                Attribute::Exceptions(exceptions) if config.scan_member_signatures => {
                    for exception in exceptions {
                        out.class(self.resolver.class_name(*exception)?);
                    }
                }
                Attribute::Code(code) if config.scan_method_bodies => {
                    self.code(code, out)?;
                }
                Attribute::InnerClasses(entries) if config.scan_class_hierarchy => {
                    for entry in entries {
                        let inner = self.resolver.class_name(entry.inner_class)?;
                        if inner != self.this_class {
                            out.class(inner);
                        }
                        if let Some(outer_class) = entry.outer_class {
                            let outer = self.resolver.class_name(outer_class)?;
                            if outer != self.this_class {
                                out.class(outer);
                            }
                        }
                    }
                }
                Attribute::EnclosingMethod { class, method } if config.scan_class_hierarchy => {
                    let enclosing = self.resolver.class_name(*class)?;
                    out.class(enclosing);
                    if let Some(method) = method {
                        let name_and_type = self.resolver.name_and_type(*method)?;
                        out.emit(Symbol::Method(MemberRef::new(
                            enclosing,
                            name_and_type.name,
                            name_and_type.descriptor,
                        )));
                    }
                }
                Attribute::NestHost(class) if config.scan_class_hierarchy => {
                    out.class(self.resolver.class_name(*class)?);
                }
                Attribute::NestMembers(classes) | Attribute::PermittedSubclasses(classes)
                    if config.scan_class_hierarchy =>
                {
                    for class in classes {
                        out.class(self.resolver.class_name(*class)?);
                    }
                }
                Attribute::Record(components) => {
                    for component in components {
                        if config.scan_class_hierarchy {
                            let descriptor = self.resolver.utf8(component.descriptor)?;
                            if let Some(class) = field_descriptor_classes(descriptor)? {
                                out.class(class);
                            }
                        }
                        self.attributes(&component.attributes, Owner::Field, out)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn annotation<S: UsageSink + ?Sized>(
        &self,
        annotation: &Annotation,
        out: &mut Emitter<'_, S>,
    ) -> Result<()> {
        let descriptor = self.resolver.utf8(annotation.type_descriptor)?;
        if let Some(class) = field_descriptor_classes(descriptor)? {
            out.class(class);
        }
        for pair in &annotation.elements {
            self.element_value(&pair.value, out)?;
        }
        Ok(())
    }

    fn element_value<S: UsageSink + ?Sized>(
        &self,
        value: &ElementValue,
        out: &mut Emitter<'_, S>,
    ) -> Result<()> {
        match value {
            ElementValue::Const { .. } => {}
            ElementValue::Enum {
                type_descriptor, ..
            } => {
                let descriptor = self.resolver.utf8(*type_descriptor)?;
                if let Some(class) = field_descriptor_classes(descriptor)? {
                    out.class(class);
                }
            }
            ElementValue::Class(descriptor) => {
                let descriptor = self.resolver.utf8(*descriptor)?;
                if let Some(class) = return_descriptor_classes(descriptor)? {
                    out.class(class);
                }
            }
            ElementValue::Annotation(annotation) => self.annotation(annotation, out)?,
            ElementValue::Array(values) => {
                for value in values {
                    self.element_value(value, out)?;
                }
            }
        }
        Ok(())
    }

    fn code<S: UsageSink + ?Sized>(&self, code: &Code, out: &mut Emitter<'_, S>) -> Result<()> {
        for instruction in &code.instructions {
            let Some(index) = instruction.constant() else {
                continue;
            };

            match instruction.opcode {
                GETSTATIC | PUTSTATIC | GETFIELD | PUTFIELD => {
                    let member = self.resolver.member_ref(index)?;
                    if !member.is_field() {
                        return Err(malformed_error!(
                            "{} at offset {} references a method",
                            instruction.mnemonic,
                            instruction.offset
                        ));
                    }
                    out.member(&member);
                }
                INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC | INVOKEINTERFACE => {
                    let member = self.resolver.member_ref(index)?;
                    if member.is_field() {
                        return Err(malformed_error!(
                            "{} at offset {} references a field",
                            instruction.mnemonic,
                            instruction.offset
                        ));
                    }
                    out.member(&member);
                }
                INVOKEDYNAMIC => self.call_site(index, out)?,
                NEW | ANEWARRAY | CHECKCAST | INSTANCEOF | MULTIANEWARRAY => {
                    out.class(self.resolver.class_name(index)?);
                }
                LDC | LDC_W | LDC2_W => {
                    self.loadable(index, &mut Expansion::default(), out)?;
                }
                _ => {}
            }
        }

        for handler in &code.exception_table {
            if let Some(catch_type) = handler.catch_type {
                out.class(self.resolver.class_name(catch_type)?);
            }
        }

        self.attributes(&code.attributes, Owner::Method, out)
    }

    /// An `invokedynamic` call site: the bootstrap method, its arguments and the call-site
    /// descriptor. The call site's name is not a member and is never emitted.
    fn call_site<S: UsageSink + ?Sized>(
        &self,
        index: CpIndex,
        out: &mut Emitter<'_, S>,
    ) -> Result<()> {
        let call_site = match self.resolver.resolve(index)? {
            Constant::InvokeDynamic(call_site) => *call_site,
            _ => {
                return Err(malformed_error!(
                    "invokedynamic operand {} is not an InvokeDynamic constant",
                    index
                ))
            }
        };

        self.bootstrap(&call_site, &mut Expansion::default(), out)?;
        if self.config.scan_bootstrap_arguments {
            for class in method_descriptor_classes(call_site.descriptor)? {
                out.class(class);
            }
        }
        Ok(())
    }

    fn bootstrap<S: UsageSink + ?Sized>(
        &self,
        dynamic: &DynamicConstant<'a>,
        expansion: &mut Expansion,
        out: &mut Emitter<'_, S>,
    ) -> Result<()> {
        let Some(entry) = self
            .class
            .bootstrap_methods()
            .get(usize::from(dynamic.bootstrap_method))
        else {
            return Err(malformed_error!(
                "Bootstrap method {} does not exist",
                dynamic.bootstrap_method
            ));
        };

        out.member(&self.resolver.method_handle(entry.method)?.member);

        if self.config.scan_bootstrap_arguments {
            for argument in &entry.arguments {
                self.loadable(*argument, expansion, out)?;
            }
        }
        Ok(())
    }

    /// A loadable constant reached through `ldc` or a bootstrap argument.
    fn loadable<S: UsageSink + ?Sized>(
        &self,
        index: CpIndex,
        expansion: &mut Expansion,
        out: &mut Emitter<'_, S>,
    ) -> Result<()> {
        match *self.resolver.loadable(index)? {
            Constant::Class(name) => out.class(name),
            Constant::MethodHandle(handle) => out.member(&handle.member),
            Constant::MethodType(descriptor) => {
                for class in method_descriptor_classes(descriptor)? {
                    out.class(class);
                }
            }
            Constant::Dynamic(dynamic) => {
                if expansion.active.contains(&index) {
                    return Err(malformed_error!("Dynamic constant {} depends on itself", index));
                }
                if !expansion.done.insert(index) {
                    return Ok(());
                }
                if expansion.active.len() >= self.config.max_dynamic_depth {
                    return Err(malformed_error!(
                        "Dynamic constant chain exceeds depth {}",
                        self.config.max_dynamic_depth
                    ));
                }
                if self.config.scan_bootstrap_arguments {
                    if let Some(class) = field_descriptor_classes(dynamic.descriptor)? {
                        out.class(class);
                    }
                }
                expansion.active.push(index);
                self.bootstrap(&dynamic, expansion, out)?;
                expansion.active.pop();
            }
            _ => {}
        }
        Ok(())
    }
}
