use inline_port_core::catalog::Catalog;
use inline_port_core::model::{FunctionSignature, TypeDescriptor};
use inline_port_core::rewrite::{normalize_layout, ChainOutcome, Halt, RewriteChain, RewriteContext};
use inline_port_core::syntax::parse_body;

fn rewrite(body: &str) -> ChainOutcome {
    let catalog = Catalog::new();
    let signature = FunctionSignature::new("f", TypeDescriptor::new("int"));
    let ctx = RewriteContext { catalog: &catalog, signature: &signature };
    RewriteChain::standard().run(parse_body(body).expect("parse"), &ctx)
}

fn rewritten_text(body: &str) -> String {
    match rewrite(body) {
        ChainOutcome::Rewritten { text, .. } => text,
        ChainOutcome::Halted { halt, .. } => panic!("unexpected halt: {halt}"),
    }
}

#[test]
fn standard_chain_order_is_fixed() {
    assert_eq!(
        RewriteChain::standard().names(),
        vec![
            "declarations",
            "struct_literals",
            "union_punning",
            "type_names",
            "casts",
            "constants",
            "builtins",
            "pointer_arithmetic",
            "formatting",
        ]
    );
}

#[test]
fn declarations_become_var() {
    let text = rewritten_text("{ int32_t x = a + 1; const uint8_t *p = buf; return x; }");
    assert_eq!(text, "{\n    var x = (int)(a + 1);\n    var p = (byte*)buf;\n    return x;\n}");
}

#[test]
fn declared_type_survives_var_inference() {
    let text = rewritten_text("{ double d = 1; return d / 2; }");
    assert!(text.contains("var d = (double)1;"), "{text}");

    let text = rewritten_text("{ uint32_t x = a; return (int)(x >> 1); }");
    assert!(text.contains("var x = (uint)a;"), "{text}");

    let text = rewritten_text("{ float f = 1.5; return f; }");
    assert!(text.contains("var f = (float)1.5;"), "{text}");
}

#[test]
fn initializers_of_the_declared_type_are_not_cast_again() {
    let text = rewritten_text("{ int i = 0; double d = 0.5; uint8_t b = (uint8_t)a; return i; }");
    assert!(text.contains("var i = 0;"), "{text}");
    assert!(text.contains("var d = 0.5;"), "{text}");
    assert!(text.contains("var b = (byte)a;"), "{text}");

    let text = rewritten_text("{ AVRational r = (AVRational){ a, b }; return r; }");
    assert!(text.contains("var r = new AVRational { num = a, den = b };"), "{text}");
}

#[test]
fn octal_literals_are_written_in_decimal() {
    let text = rewritten_text("{ return a * 010 + 0755 + 0 + 0x10; }");
    assert!(text.contains("return a * 8 + 493 + 0 + 0x10;"), "{text}");

    let text = rewritten_text("{ return 017UL; }");
    assert!(text.contains("return 15UL;"), "{text}");
}

#[test]
fn plain_char_is_a_signed_byte() {
    let text = rewritten_text("{ return (char)(a + 200); }");
    assert!(text.contains("return (sbyte)(a + 200);"), "{text}");

    let text = rewritten_text("{ char c = a; const char *s = p; return c + *s; }");
    assert!(text.contains("var c = (sbyte)a;"), "{text}");
    assert!(text.contains("var s = (byte*)p;"), "{text}");

    let text = rewritten_text("{ return (unsigned char)a + (signed char)b; }");
    assert!(text.contains("return (byte)a + (sbyte)b;"), "{text}");
}

#[test]
fn uninitialised_declaration_gets_default_value() {
    let text = rewritten_text("{ uint16_t v; v = a; return v; }");
    assert!(text.contains("var v = default(ushort);"), "{text}");
}

#[test]
fn multiple_declarators_become_separate_statements() {
    let text = rewritten_text("{ int x = 1, y = 2; return x + y; }");
    assert!(text.contains("var x = 1;\n    var y = 2;"), "{text}");
}

#[test]
fn rational_initializers_use_named_fields() {
    let text = rewritten_text("{ AVRational r = {a, b}; return r; }");
    assert!(text.contains("var r = new AVRational { num = a, den = b };"), "{text}");

    let text = rewritten_text("{ return (AVRational){ a.num * b.den, a.den * b.num }; }");
    assert!(
        text.contains("return new AVRational { num = a.num * b.den, den = a.den * b.num };"),
        "{text}"
    );
}

#[test]
fn rational_reassignment_is_rewritten() {
    let text = rewritten_text("{ AVRational r = {0, 1}; r = {a, b}; return r; }");
    assert!(text.contains("r = new AVRational { num = a, den = b };"), "{text}");
}

#[test]
fn union_read_back_in_both_directions() {
    let text = rewritten_text("{ union av_intfloat32 v; v.f = f; return v.i; }");
    assert_eq!(text, "{\n    return *(uint*)&f;\n}");

    let text = rewritten_text("{ union av_intfloat32 v; v.i = i; return v.f; }");
    assert_eq!(text, "{\n    return *(float*)&i;\n}");

    let text = rewritten_text("{ union av_intfloat64 v; v.f = f; return v.i; }");
    assert_eq!(text, "{\n    return *(ulong*)&f;\n}");

    let text = rewritten_text("{ union av_intfloat64 v; v.i = i; return v.f; }");
    assert_eq!(text, "{\n    return *(double*)&i;\n}");
}

#[test]
fn union_idiom_spread_over_lines_is_recognised() {
    let body = "{\n    union av_intfloat64 v;\n\n    v.i = i;\n    return\n        v.f;\n}";
    assert_eq!(rewritten_text(body), "{\n    return *(double*)&i;\n}");
}

#[test]
fn union_same_member_round_trip_is_left_alone() {
    let text = rewritten_text("{ union av_intfloat32 v; v.f = f; return v.f; }");
    assert!(text.contains("union av_intfloat32 v;"), "{text}");
}

#[test]
fn casts_drop_const_and_collapse_compound_names() {
    let text = rewritten_text("{ return (const uint8_t *)p + (unsigned int)a; }");
    assert!(text.contains("(byte*)p + (uint)a"), "{text}");
}

#[test]
fn integer_pointer_hop_is_removed() {
    let text = rewritten_text("{ return (void *)(intptr_t)p; }");
    assert!(text.contains("return (void*)p;"), "{text}");

    let text = rewritten_text("{ return (void *)(intptr_t)(p ? p : q); }");
    assert!(text.contains("return (void*)(p != null ? p : q);"), "{text}");
}

#[test]
fn limit_constants_are_named() {
    let text = rewritten_text("{ if (a > INT_MAX) return INT64_MIN; return NULL; }");
    assert!(text.contains("if (a > int.MaxValue) return long.MinValue;"), "{text}");
    assert!(text.contains("return null;"), "{text}");

    let text = rewritten_text("{ return -2147483647 - 1; }");
    assert!(text.contains("return int.MinValue;"), "{text}");

    let text = rewritten_text("{ return 9223372036854775807LL; }");
    assert!(text.contains("return long.MaxValue;"), "{text}");

    let text = rewritten_text("{ return a * 3LL + 1ULL; }");
    assert!(text.contains("a * 3L + 1UL"), "{text}");
}

#[test]
fn builtin_halts_with_partial_rewrite() {
    match rewrite("{ int32_t x = __builtin_clz(a); return x; }") {
        ChainOutcome::Halted { halt, partial_text } => {
            assert_eq!(halt, Halt::Intrinsic { names: vec!["__builtin_clz".to_string()] });
            assert!(partial_text.contains("var x = (int)__builtin_clz(a);"), "{partial_text}");
        }
        ChainOutcome::Rewritten { text, .. } => panic!("expected halt, got {text}"),
    }
}

#[test]
fn custom_chain_only_runs_registered_passes() {
    let catalog = Catalog::new();
    let signature = FunctionSignature::new("f", TypeDescriptor::new("int"));
    let ctx = RewriteContext { catalog: &catalog, signature: &signature };
    let mut chain = RewriteChain::new();
    chain.register(inline_port_core::rewrite::TypeNameMapper);
    assert_eq!(chain.names(), vec!["type_names", "formatting"]);

    match chain.run(parse_body("{ int32_t x = a; return x; }").unwrap(), &ctx) {
        ChainOutcome::Rewritten { text, .. } => assert!(text.contains("int x = a;"), "{text}"),
        ChainOutcome::Halted { halt, .. } => panic!("unexpected halt: {halt}"),
    }
}

#[test]
fn formatting_lays_out_blocks() {
    let text = normalize_layout("{ if (a) { b = 1; } else { b = 2; } do { b++; } while (b < 3); }");
    assert_eq!(
        text,
        "{\n    if (a) {\n        b = 1;\n    } else {\n        b = 2;\n    }\n    do {\n        b++;\n    } while (b < 3);\n}"
    );
}

#[test]
fn formatting_keeps_object_braces_inline_and_strings_intact() {
    let text = normalize_layout("{ var r = new AVRational { num = 1, den = 2 }; s = \"{ ; }\"; }");
    assert_eq!(text, "{\n    var r = new AVRational { num = 1, den = 2 };\n    s = \"{ ; }\";\n}");
}

#[test]
fn formatting_is_idempotent() {
    let inputs = [
        "{ if (a < b) return a; else return b; }",
        "{ for (var i = 0; i < n; i++) { s += i; } return s; }",
        "{\n\n  var x   = 1 ;\n\t return x ; }",
        "{ var r = new AVRational { num = a, den = b }; return r; }",
        "{ do { a--; } while (a > 0); return a; }",
    ];
    for input in inputs {
        let once = normalize_layout(input);
        assert_eq!(normalize_layout(&once), once, "input: {input}");
    }
}
