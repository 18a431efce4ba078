//! End-to-end usage extraction over assembled class files.

mod common;

use classref::{
    index, index_with_config, IndexConfig, MemberRef, Symbol, UsageEdge, UsageLocation,
};
use common::*;

const GETSTATIC: u8 = 0xB2;
const PUTSTATIC: u8 = 0xB3;
const GETFIELD: u8 = 0xB4;
const PUTFIELD: u8 = 0xB5;
const INVOKESPECIAL: u8 = 0xB7;
const INVOKESTATIC: u8 = 0xB8;
const NEW: u8 = 0xBB;
const ANEWARRAY: u8 = 0xBD;
const CHECKCAST: u8 = 0xC0;
const INSTANCEOF: u8 = 0xC1;
const MULTIANEWARRAY: u8 = 0xC5;
const RETURN: u8 = 0xB1;
const LDC_W: u8 = 0x13;
const POP: u8 = 0x57;

fn edges(bytes: &[u8]) -> Vec<UsageEdge> {
    let mut edges: Vec<UsageEdge> = Vec::new();
    index(bytes, &mut edges).unwrap();
    edges
}

fn at_method(owner: &str, name: &str, descriptor: &str) -> UsageLocation {
    UsageLocation::Method(MemberRef::new(owner, name, descriptor))
}

fn class(name: &str) -> Symbol {
    Symbol::Class(name.to_string())
}

#[test]
fn invoke_and_field_read_yield_exactly_two_edges() {
    let bytes = ClassBuilder::new("A")
        .method("m", "()V", |m| {
            m.method_insn(INVOKESTATIC, "B", "n", "()V")
                .field_insn(GETSTATIC, "B", "f", "I")
                .op(0x57) // pop
                .op(RETURN);
        })
        .build();

    let location = at_method("A", "m", "()V");
    assert_eq!(
        edges(&bytes),
        vec![
            UsageEdge {
                symbol: Symbol::Method(MemberRef::new("B", "n", "()V")),
                location: location.clone(),
            },
            UsageEdge {
                symbol: Symbol::Field(MemberRef::new("B", "f", "I")),
                location,
            },
        ]
    );
}

#[test]
fn declared_and_caught_exception_are_both_reported() {
    let bytes = ClassBuilder::new("A")
        .method("m", "()V", |m| {
            m.op(0x00) // nop
                .op(RETURN)
                .raw(&[0x4C, RETURN]) // astore_1, return
                .catch(0, 1, 2, Some("E"))
                .catch(0, 1, 2, None)
                .throws("E");
        })
        .build();

    let edges = edges(&bytes);
    let location = at_method("A", "m", "()V");
    let for_e: Vec<_> = edges.iter().filter(|edge| edge.symbol == class("E")).collect();
    assert_eq!(for_e.len(), 2);
    assert!(for_e.iter().all(|edge| edge.location == location));
    assert_eq!(edges.len(), 2);
}

#[test]
fn bytecode_only_skips_the_throws_clause() {
    let bytes = ClassBuilder::new("A")
        .super_class("java/lang/Object")
        .method("m", "(LP;)LR;", |m| {
            m.op(0x00).op(RETURN).catch(0, 1, 1, Some("E")).throws("E");
        })
        .build();

    let mut all: Vec<UsageEdge> = Vec::new();
    index_with_config(&bytes, &mut all, &IndexConfig::full()).unwrap();
    let symbols: Vec<String> = all.iter().map(|edge| edge.symbol.to_string()).collect();
    assert_eq!(symbols, ["s:java/lang/Object", "s:P", "s:R", "s:E", "s:E"]);

    let mut bytecode: Vec<UsageEdge> = Vec::new();
    index_with_config(&bytes, &mut bytecode, &IndexConfig::bytecode_only()).unwrap();
    assert_eq!(bytecode.len(), 1);
    assert_eq!(bytecode[0].symbol, class("E"));

    let mut declarations: Vec<UsageEdge> = Vec::new();
    index_with_config(&bytes, &mut declarations, &IndexConfig::declarations_only()).unwrap();
    assert_eq!(declarations.len(), 4);
}

#[test]
fn every_field_instruction_yields_one_field_edge() {
    let bytes = ClassBuilder::new("A")
        .field("own", "Ljava/lang/String;")
        .method("m", "()V", |m| {
            m.field_insn(GETSTATIC, "B", "s", "J")
                .field_insn(PUTSTATIC, "B", "s", "J")
                .op(0x2A) // aload_0
                .field_insn(GETFIELD, "A", "own", "Ljava/lang/String;")
                .op(0x2A)
                .op(0x5F) // swap
                .field_insn(PUTFIELD, "A", "own", "Ljava/lang/String;")
                .field_insn(GETSTATIC, "B", "s", "J")
                .op(RETURN);
        })
        .build();

    let location = at_method("A", "m", "()V");
    let fields: Vec<String> = edges(&bytes)
        .into_iter()
        .filter(|edge| edge.location == location)
        .map(|edge| match edge.symbol {
            Symbol::Field(member) => member.to_string(),
            other => panic!("unexpected {}", other),
        })
        .collect();

    assert_eq!(
        fields,
        [
            "B:s:J",
            "B:s:J",
            "A:own:Ljava/lang/String;",
            "A:own:Ljava/lang/String;",
            "B:s:J",
        ]
    );
}

#[test]
fn type_instructions_yield_one_class_edge_each() {
    let bytes = ClassBuilder::new("A")
        .method("m", "()V", |m| {
            m.type_insn(NEW, "X")
                .op(0x59) // dup
                .type_insn(CHECKCAST, "X")
                .type_insn(INSTANCEOF, "Y")
                .type_insn(CHECKCAST, "[Ljava/lang/String;")
                .type_insn(NEW, "X")
                .op(0x08) // iconst_5
                .type_insn(ANEWARRAY, "Z");
            let array = m.pool().class("[[I");
            m.op_index(MULTIANEWARRAY, array).raw(&[2]).op(RETURN);
        })
        .build();

    let symbols: Vec<String> = edges(&bytes)
        .iter()
        .map(|edge| edge.symbol.to_string())
        .collect();
    assert_eq!(
        symbols,
        ["s:X", "s:X", "s:Y", "s:[Ljava/lang/String;", "s:X", "s:Z", "s:[[I"]
    );
}

#[test]
fn class_literals_and_loadable_constants() {
    let bytes = {
        let mut builder = ClassBuilder::new("A");
        let pool = builder.pool();
        let literal = pool.class("L1");
        let text = pool.string("L2");
        let number = pool.long(7);
        let method_type = pool.method_type("(LP;[LQ;)I");
        let target = pool.method_ref("T", "t", "()V");
        let handle = pool.method_handle(REF_INVOKE_STATIC, target);

        builder
            .method("m", "()V", |m| {
                m.raw(&[0x12, literal as u8]) // ldc
                    .ldc_w(text)
                    .op_index(0x14, number) // ldc2_w
                    .ldc_w(method_type)
                    .ldc_w(handle)
                    .op(RETURN);
            })
            .build()
    };

    let symbols: Vec<String> = edges(&bytes)
        .iter()
        .map(|edge| edge.symbol.to_string())
        .collect();
    assert_eq!(symbols, ["s:L1", "s:P", "s:Q", "m:T:t:()V"]);
}

#[test]
fn invokedynamic_reports_bootstrap_method_and_arguments() {
    let mut builder = ClassBuilder::new("A");
    let pool = builder.pool();
    let factory = pool.method_ref(
        "java/lang/invoke/LambdaMetafactory",
        "metafactory",
        "(Ljava/lang/invoke/MethodHandles$Lookup;)Ljava/lang/invoke/CallSite;",
    );
    let bootstrap = pool.method_handle(REF_INVOKE_STATIC, factory);
    let erased = pool.method_type("(Ljava/lang/Object;)Ljava/lang/Object;");
    let length = pool.method_ref("java/lang/String", "length", "()I");
    let implementation = pool.method_handle(REF_INVOKE_VIRTUAL, length);
    let field = pool.field_ref("A", "x", "I");
    let getter = pool.method_handle(REF_GET_FIELD, field);
    let literal = pool.class("K");
    let text = pool.string("ignored");
    let bootstrap_index =
        builder.bootstrap_method(bootstrap, &[erased, implementation, getter, literal, text]);

    let bytes = builder
        .method("m", "()V", |m| {
            m.invokedynamic(bootstrap_index, "apply", "(LC;)Ljava/util/function/Function;")
                .op(0x57)
                .op(RETURN);
        })
        .build();

    let symbols: Vec<String> = edges(&bytes)
        .iter()
        .map(|edge| edge.symbol.to_string())
        .collect();
    assert_eq!(
        symbols,
        [
            "m:java/lang/invoke/LambdaMetafactory:metafactory:(Ljava/lang/invoke/MethodHandles$Lookup;)Ljava/lang/invoke/CallSite;",
            "s:java/lang/Object",
            "s:java/lang/Object",
            "m:java/lang/String:length:()I",
            "f:A:x:I",
            "s:K",
            "s:C",
            "s:java/util/function/Function",
        ]
    );

    let mut bytecode: Vec<UsageEdge> = Vec::new();
    let config = IndexConfig {
        scan_bootstrap_arguments: false,
        ..IndexConfig::full()
    };
    index_with_config(&bytes, &mut bytecode, &config).unwrap();
    assert_eq!(bytecode.len(), 1);
}

#[test]
fn dynamic_constants_are_followed_recursively() {
    let mut builder = ClassBuilder::new("A");
    let pool = builder.pool();
    let condy = pool.method_ref("B", "bsm", "()V");
    let handle = pool.method_handle(REF_INVOKE_STATIC, condy);
    let inner_arg = pool.class("Inner");
    let inner = builder.bootstrap_method(handle, &[inner_arg]);
    let inner_constant = builder.pool().dynamic(inner, "inner", "LD;");
    let outer = builder.bootstrap_method(handle, &[inner_constant]);
    let outer_constant = builder.pool().dynamic(outer, "outer", "I");

    let bytes = builder
        .method("m", "()V", |m| {
            m.ldc_w(outer_constant).op(0x57).op(RETURN);
        })
        .build();

    let symbols: Vec<String> = edges(&bytes)
        .iter()
        .map(|edge| edge.symbol.to_string())
        .collect();
    assert_eq!(symbols, ["m:B:bsm:()V", "s:D", "m:B:bsm:()V", "s:Inner"]);
}

#[test]
fn self_referencing_dynamic_constant_is_malformed() {
    let mut builder = ClassBuilder::new("A");
    let pool = builder.pool();
    let condy = pool.method_ref("B", "bsm", "()V");
    let handle = pool.method_handle(REF_INVOKE_STATIC, condy);
    // The constant's own bootstrap arguments refer back to it.
    let constant = pool.dynamic(0, "loop", "I");
    builder.bootstrap_method(handle, &[constant]);

    let bytes = builder
        .method("m", "()V", |m| {
            m.ldc_w(constant).op(RETURN);
        })
        .build();

    let mut edges: Vec<UsageEdge> = Vec::new();
    assert!(index(&bytes, &mut edges).unwrap_err().is_malformed());
    assert!(edges.is_empty());
}

#[test]
fn mutually_dependent_dynamic_constants_are_malformed() {
    let mut builder = ClassBuilder::new("A");
    let pool = builder.pool();
    let bsm = pool.method_ref("B", "bsm", "()V");
    let handle = pool.method_handle(REF_INVOKE_STATIC, bsm);
    // x is bootstrapped by #1, whose argument is y; y by #0, whose argument is x
    let x = pool.dynamic(1, "x", "I");
    let y = pool.dynamic(0, "y", "I");
    builder.bootstrap_method(handle, &[x]);
    builder.bootstrap_method(handle, &[y]);

    let bytes = builder
        .method("m", "()V", |m| {
            m.ldc_w(x).op(POP).op(RETURN);
        })
        .build();

    let mut edges: Vec<UsageEdge> = Vec::new();
    assert!(index(&bytes, &mut edges).unwrap_err().is_malformed());
    assert!(edges.is_empty());
}

#[test]
fn shared_dynamic_constants_are_expanded_once_per_reference() {
    let mut builder = ClassBuilder::new("A");
    let pool = builder.pool();
    let bsm = pool.method_ref("B", "bsm", "()V");
    let handle = pool.method_handle(REF_INVOKE_STATIC, bsm);
    let leaf = pool.class("Leaf");

    // Twelve levels, each naming the level below four times.
    let mut arguments = vec![leaf];
    for level in 0..12 {
        let bootstrap = builder.bootstrap_method(handle, &arguments);
        let constant = builder.pool().dynamic(bootstrap, &format!("d{level}"), "I");
        arguments = vec![constant; 4];
    }
    let top = arguments[0];

    let bytes = builder
        .method("m", "()V", |m| {
            m.ldc_w(top).op(POP).ldc_w(top).op(POP).op(RETURN);
        })
        .build();

    let edges = edges(&bytes);
    // Per ldc: one bootstrap method edge per level, then the leaf class once.
    assert_eq!(edges.len(), 2 * 13);
    let leaves = edges.iter().filter(|edge| edge.symbol == class("Leaf")).count();
    assert_eq!(leaves, 2);
    let location = at_method("A", "m", "()V");
    assert!(edges.iter().all(|edge| edge.location == location));
}

#[test]
fn self_referencing_pool_entries_are_malformed() {
    // (entry with its own index patched in, instruction using it)
    let cases: [(fn(u16) -> Vec<u8>, u8); 3] = [
        (
            |at| {
                let [hi, lo] = at.to_be_bytes();
                vec![0x07, hi, lo]
            },
            NEW,
        ),
        (
            |at| {
                let [hi, lo] = at.to_be_bytes();
                vec![0x0A, hi, lo, hi, lo]
            },
            INVOKESTATIC,
        ),
        (
            |at| {
                let [hi, lo] = at.to_be_bytes();
                vec![0x0F, REF_INVOKE_STATIC, hi, lo]
            },
            LDC_W,
        ),
    ];

    for (entry, opcode) in cases {
        let mut builder = ClassBuilder::new("A");
        let pool = builder.pool();
        let at = pool.next_index();
        pool.raw(&entry(at), 1);

        let bytes = builder
            .method("m", "()V", |m| {
                m.op_index(opcode, at).op(RETURN);
            })
            .build();

        let mut edges: Vec<UsageEdge> = Vec::new();
        assert!(index(&bytes, &mut edges).unwrap_err().is_malformed());
        assert!(edges.is_empty());
    }
}

#[test]
fn self_named_this_class_is_malformed() {
    #[rustfmt::skip]
    let bytes = [
        0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x3D,
        0x00, 0x02,             // pool count
        0x07, 0x00, 0x01,       // #1 Class named by itself
        0x00, 0x21,             // access
        0x00, 0x01, 0x00, 0x00, // this #1, no super
        0x00, 0x00, 0x00, 0x00, // interfaces, fields
        0x00, 0x00, 0x00, 0x00, // methods, attributes
    ];

    let mut edges: Vec<UsageEdge> = Vec::new();
    assert!(index(&bytes, &mut edges).unwrap_err().is_malformed());
    assert!(edges.is_empty());
}

#[test]
fn truncated_instruction_fails_without_edges() {
    let bytes = ClassBuilder::new("A")
        .super_class("java/lang/Object")
        .method("ok", "()V", |m| {
            m.method_insn(INVOKESTATIC, "B", "n", "()V").op(RETURN);
        })
        .method("broken", "()V", |m| {
            m.field_insn(GETSTATIC, "B", "f", "I");
            // invokestatic with only one operand byte left in the code array
            m.raw(&[INVOKESTATIC, 0x00]);
        })
        .build();

    let mut edges: Vec<UsageEdge> = Vec::new();
    let error = index(&bytes, &mut edges).unwrap_err();
    assert!(error.is_malformed());
    assert!(edges.is_empty());
}

#[test]
fn wrong_kind_operand_is_malformed() {
    let bytes = ClassBuilder::new("A")
        .method("m", "()V", |m| {
            // getstatic pointing at a method reference
            m.method_insn(GETSTATIC, "B", "n", "()V").op(RETURN);
        })
        .build();
    let mut edges: Vec<UsageEdge> = Vec::new();
    assert!(index(&bytes, &mut edges).unwrap_err().is_malformed());

    let bytes = ClassBuilder::new("A")
        .method("m", "()V", |m| {
            m.type_insn(INVOKESPECIAL, "B").op(RETURN);
        })
        .build();
    assert!(index(&bytes, &mut edges).unwrap_err().is_malformed());
    assert!(edges.is_empty());
}

#[test]
fn switch_padding_keeps_later_instructions_aligned() {
    for leading in 0..4 {
        let bytes = ClassBuilder::new("A")
            .method("m", "(I)V", |m| {
                for _ in 0..leading {
                    m.op(0x00);
                }
                m.op(0x1A); // iload_0
                let start = m.offset();
                m.op(0xAA); // tableswitch
                while m.offset() % 4 != 0 {
                    m.op(0x00);
                }
                let after = (m.offset() + 16) - start;
                for value in [after as i32, 0, 0, after as i32] {
                    m.raw(&value.to_be_bytes());
                }
                m.method_insn(INVOKESTATIC, "B", "n", "()V").op(RETURN);
            })
            .build();

        let symbols: Vec<String> = edges(&bytes)
            .iter()
            .map(|edge| edge.symbol.to_string())
            .collect();
        assert_eq!(symbols, ["m:B:n:()V"], "leading nops: {}", leading);
    }
}

#[test]
fn wide_forms_do_not_desynchronize() {
    let bytes = ClassBuilder::new("A")
        .method("m", "()V", |m| {
            m.raw(&[0xC4, 0x15, 0x01, 0x00]) // wide iload 256
                .raw(&[0xC4, 0x84, 0x01, 0x00, 0xFF, 0xFF]) // wide iinc 256, -1
                .op(0x57)
                .type_insn(NEW, "W")
                .op(RETURN);
        })
        .build();

    assert_eq!(edges(&bytes)[0].symbol, class("W"));
}

#[test]
fn interfaces_and_descriptors_at_class_and_field_level() {
    let bytes = ClassBuilder::new("a/A")
        .super_class("a/Base")
        .interface("a/I")
        .field("items", "[[La/Item;")
        .field("count", "I")
        .build();

    let edges = edges(&bytes);
    let rendered: Vec<String> = edges.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        [
            "s:a/Base\tc:a/A",
            "s:a/I\tc:a/A",
            "s:a/Item\tf:a/A:items:[[La/Item;",
        ]
    );
}

#[test]
fn unsupported_versions_and_bad_magic_are_malformed() {
    let mut edges: Vec<UsageEdge> = Vec::new();
    for major in [44, 70] {
        let bytes = ClassBuilder::new("A").major(major).build();
        assert!(index(&bytes, &mut edges).unwrap_err().is_malformed());
    }

    let mut bytes = ClassBuilder::new("A").build();
    bytes[0] = 0xCB;
    assert!(index(&bytes, &mut edges).unwrap_err().is_malformed());

    let mut bytes = ClassBuilder::new("A").build();
    bytes.push(0);
    assert!(index(&bytes, &mut edges).unwrap_err().is_malformed());

    assert!(edges.is_empty());
}
