//! A small class file assembler for integration tests.
//!
//! Builds just enough of the class file format to exercise the indexer: a deduplicating
//! constant pool, fields, methods with raw bytecode, exception tables, `Exceptions` and
//! `BootstrapMethods` attributes.

#![allow(dead_code)]

use std::collections::HashMap;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_SUPER: u16 = 0x0020;

pub const REF_GET_FIELD: u8 = 1;
pub const REF_INVOKE_VIRTUAL: u8 = 5;
pub const REF_INVOKE_STATIC: u8 = 6;

/// Constant pool under construction. Identical entries share one index.
#[derive(Default)]
pub struct PoolBuilder {
    bytes: Vec<u8>,
    next: u16,
    known: HashMap<Vec<u8>, u16>,
}

impl PoolBuilder {
    pub fn new() -> Self {
        PoolBuilder {
            bytes: Vec::new(),
            next: 1,
            known: HashMap::new(),
        }
    }

    fn add(&mut self, entry: Vec<u8>, slots: u16) -> u16 {
        if let Some(index) = self.known.get(&entry) {
            return *index;
        }
        let index = self.next;
        self.bytes.extend_from_slice(&entry);
        self.known.insert(entry, index);
        self.next += slots;
        index
    }

    /// The index the next entry will receive.
    pub fn next_index(&self) -> u16 {
        self.next
    }

    /// Append an entry without deduplication; used for deliberately odd pools.
    pub fn raw(&mut self, entry: &[u8], slots: u16) -> u16 {
        let index = self.next;
        self.bytes.extend_from_slice(entry);
        self.next += slots;
        index
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        let mut entry = vec![1];
        entry.extend_from_slice(&(text.len() as u16).to_be_bytes());
        entry.extend_from_slice(text.as_bytes());
        self.add(entry, 1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut entry = vec![3];
        entry.extend_from_slice(&value.to_be_bytes());
        self.add(entry, 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let mut entry = vec![5];
        entry.extend_from_slice(&value.to_be_bytes());
        self.add(entry, 2)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        self.add(tagged(7, &[name]), 1)
    }

    pub fn string(&mut self, text: &str) -> u16 {
        let text = self.utf8(text);
        self.add(tagged(8, &[text]), 1)
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.add(tagged(12, &[name, descriptor]), 1)
    }

    fn member(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let owner = self.class(owner);
        let name_and_type = self.name_and_type(name, descriptor);
        self.add(tagged(tag, &[owner, name_and_type]), 1)
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member(9, owner, name, descriptor)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member(10, owner, name, descriptor)
    }

    pub fn interface_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member(11, owner, name, descriptor)
    }

    pub fn method_handle(&mut self, kind: u8, reference: u16) -> u16 {
        let mut entry = vec![15, kind];
        entry.extend_from_slice(&reference.to_be_bytes());
        self.add(entry, 1)
    }

    pub fn method_type(&mut self, descriptor: &str) -> u16 {
        let descriptor = self.utf8(descriptor);
        self.add(tagged(16, &[descriptor]), 1)
    }

    pub fn dynamic(&mut self, bootstrap: u16, name: &str, descriptor: &str) -> u16 {
        let name_and_type = self.name_and_type(name, descriptor);
        self.add(tagged(17, &[bootstrap, name_and_type]), 1)
    }

    pub fn invoke_dynamic(&mut self, bootstrap: u16, name: &str, descriptor: &str) -> u16 {
        let name_and_type = self.name_and_type(name, descriptor);
        self.add(tagged(18, &[bootstrap, name_and_type]), 1)
    }

    fn count(&self) -> u16 {
        self.next
    }
}

fn tagged(tag: u8, indices: &[u16]) -> Vec<u8> {
    let mut entry = vec![tag];
    for index in indices {
        entry.extend_from_slice(&index.to_be_bytes());
    }
    entry
}

fn attribute(pool: &mut PoolBuilder, name: &str, body: &[u8]) -> Vec<u8> {
    let mut bytes = pool.utf8(name).to_be_bytes().to_vec();
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(body);
    bytes
}

/// A method body and declaration, built instruction by instruction.
pub struct MethodBuilder<'p> {
    pool: &'p mut PoolBuilder,
    code: Vec<u8>,
    handlers: Vec<[u16; 4]>,
    throws: Vec<u16>,
    attributes: Vec<Vec<u8>>,
}

impl MethodBuilder<'_> {
    pub fn pool(&mut self) -> &mut PoolBuilder {
        self.pool
    }

    /// Current offset in the code array.
    pub fn offset(&self) -> u16 {
        self.code.len() as u16
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.code.extend_from_slice(bytes);
        self
    }

    pub fn op(&mut self, opcode: u8) -> &mut Self {
        self.code.push(opcode);
        self
    }

    pub fn op_index(&mut self, opcode: u8, index: u16) -> &mut Self {
        self.code.push(opcode);
        self.code.extend_from_slice(&index.to_be_bytes());
        self
    }

    pub fn field_insn(
        &mut self,
        opcode: u8,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> &mut Self {
        let index = self.pool.field_ref(owner, name, descriptor);
        self.op_index(opcode, index)
    }

    pub fn method_insn(
        &mut self,
        opcode: u8,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> &mut Self {
        let index = self.pool.method_ref(owner, name, descriptor);
        self.op_index(opcode, index)
    }

    pub fn invokeinterface(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
        count: u8,
    ) -> &mut Self {
        let index = self.pool.interface_method_ref(owner, name, descriptor);
        self.op_index(0xB9, index);
        self.code.extend_from_slice(&[count, 0]);
        self
    }

    pub fn invokedynamic(&mut self, bootstrap: u16, name: &str, descriptor: &str) -> &mut Self {
        let index = self.pool.invoke_dynamic(bootstrap, name, descriptor);
        self.op_index(0xBA, index);
        self.code.extend_from_slice(&[0, 0]);
        self
    }

    pub fn type_insn(&mut self, opcode: u8, class: &str) -> &mut Self {
        let index = self.pool.class(class);
        self.op_index(opcode, index)
    }

    pub fn ldc_w(&mut self, index: u16) -> &mut Self {
        self.op_index(0x13, index)
    }

    pub fn catch(&mut self, start: u16, end: u16, handler: u16, class: Option<&str>) -> &mut Self {
        let catch_type = class.map_or(0, |name| self.pool.class(name));
        self.handlers.push([start, end, handler, catch_type]);
        self
    }

    pub fn throws(&mut self, class: &str) -> &mut Self {
        let index = self.pool.class(class);
        self.throws.push(index);
        self
    }

    pub fn attribute(&mut self, name: &str, body: &[u8]) -> &mut Self {
        let attribute = attribute(self.pool, name, body);
        self.attributes.push(attribute);
        self
    }

    fn finish(self, access: u16, name: u16, descriptor: u16) -> Vec<u8> {
        let mut attributes = self.attributes;

        if !self.code.is_empty() {
            let mut body = Vec::new();
            body.extend_from_slice(&8u16.to_be_bytes());
            body.extend_from_slice(&8u16.to_be_bytes());
            body.extend_from_slice(&(self.code.len() as u32).to_be_bytes());
            body.extend_from_slice(&self.code);
            body.extend_from_slice(&(self.handlers.len() as u16).to_be_bytes());
            for handler in &self.handlers {
                for value in handler {
                    body.extend_from_slice(&value.to_be_bytes());
                }
            }
            body.extend_from_slice(&0u16.to_be_bytes());
            attributes.insert(0, attribute(self.pool, "Code", &body));
        }

        if !self.throws.is_empty() {
            let mut body = (self.throws.len() as u16).to_be_bytes().to_vec();
            for index in &self.throws {
                body.extend_from_slice(&index.to_be_bytes());
            }
            attributes.push(attribute(self.pool, "Exceptions", &body));
        }

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&access.to_be_bytes());
        bytes.extend_from_slice(&name.to_be_bytes());
        bytes.extend_from_slice(&descriptor.to_be_bytes());
        bytes.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for attribute in attributes {
            bytes.extend_from_slice(&attribute);
        }
        bytes
    }
}

/// A class file under construction.
///
/// # Example
///
/// ```rust,ignore
/// let bytes = ClassBuilder::new("A")
///     .method("m", "()V", |m| {
///         m.method_insn(0xB8, "B", "n", "()V").op(0xB1);
///     })
///     .build();
/// ```
pub struct ClassBuilder {
    pool: PoolBuilder,
    major: u16,
    access: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
    bootstrap_methods: Vec<(u16, Vec<u16>)>,
}

impl ClassBuilder {
    /// A public class without a recorded superclass.
    pub fn new(name: &str) -> Self {
        let mut pool = PoolBuilder::new();
        let this_class = pool.class(name);
        ClassBuilder {
            pool,
            major: 61,
            access: ACC_PUBLIC | ACC_SUPER,
            this_class,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
            bootstrap_methods: Vec::new(),
        }
    }

    pub fn pool(&mut self) -> &mut PoolBuilder {
        &mut self.pool
    }

    pub fn major(mut self, major: u16) -> Self {
        self.major = major;
        self
    }

    pub fn super_class(mut self, name: &str) -> Self {
        self.super_class = self.pool.class(name);
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        let index = self.pool.class(name);
        self.interfaces.push(index);
        self
    }

    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        let name = self.pool.utf8(name);
        let descriptor = self.pool.utf8(descriptor);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&ACC_PUBLIC.to_be_bytes());
        bytes.extend_from_slice(&name.to_be_bytes());
        bytes.extend_from_slice(&descriptor.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        self.fields.push(bytes);
        self
    }

    pub fn method(
        mut self,
        name: &str,
        descriptor: &str,
        body: impl FnOnce(&mut MethodBuilder<'_>),
    ) -> Self {
        let name = self.pool.utf8(name);
        let descriptor = self.pool.utf8(descriptor);
        let mut method = MethodBuilder {
            pool: &mut self.pool,
            code: Vec::new(),
            handlers: Vec::new(),
            throws: Vec::new(),
            attributes: Vec::new(),
        };
        body(&mut method);
        let bytes = method.finish(ACC_PUBLIC | ACC_STATIC, name, descriptor);
        self.methods.push(bytes);
        self
    }

    /// Register a bootstrap method; returns its index in `BootstrapMethods`.
    pub fn bootstrap_method(&mut self, handle: u16, arguments: &[u16]) -> u16 {
        self.bootstrap_methods.push((handle, arguments.to_vec()));
        (self.bootstrap_methods.len() - 1) as u16
    }

    pub fn attribute(mut self, name: &str, body: &[u8]) -> Self {
        let attribute = attribute(&mut self.pool, name, body);
        self.attributes.push(attribute);
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        if !self.bootstrap_methods.is_empty() {
            let mut body = (self.bootstrap_methods.len() as u16).to_be_bytes().to_vec();
            for (handle, arguments) in &self.bootstrap_methods {
                body.extend_from_slice(&handle.to_be_bytes());
                body.extend_from_slice(&(arguments.len() as u16).to_be_bytes());
                for argument in arguments {
                    body.extend_from_slice(&argument.to_be_bytes());
                }
            }
            let attribute = attribute(&mut self.pool, "BootstrapMethods", &body);
            self.attributes.push(attribute);
        }

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&self.major.to_be_bytes());
        bytes.extend_from_slice(&self.pool.count().to_be_bytes());
        bytes.extend_from_slice(&self.pool.bytes);
        bytes.extend_from_slice(&self.access.to_be_bytes());
        bytes.extend_from_slice(&self.this_class.to_be_bytes());
        bytes.extend_from_slice(&self.super_class.to_be_bytes());
        bytes.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            bytes.extend_from_slice(&interface.to_be_bytes());
        }
        for table in [&self.fields, &self.methods, &self.attributes] {
            bytes.extend_from_slice(&(table.len() as u16).to_be_bytes());
            for entry in table {
                bytes.extend_from_slice(entry);
            }
        }
        bytes
    }
}

pub fn sample(name: &str) -> Vec<u8> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/samples")
        .join(name);
    std::fs::read(path).unwrap()
}
