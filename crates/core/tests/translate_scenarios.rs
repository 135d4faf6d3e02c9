use inline_port_core::cache::StabilityCache;
use inline_port_core::catalog::Catalog;
use inline_port_core::model::{
    BodyHash, CacheEntry, FailureKind, FunctionSignature, InlineFunctionUnit, TranslationResult,
    TypeDescriptor,
};
use inline_port_core::pipeline::Translator;
use inline_port_core::rewrite::{RewriteChain, TypeNameMapper};

fn clamp_unit() -> InlineFunctionUnit {
    let sig = FunctionSignature::new("av_clip_c", TypeDescriptor::new("int"))
        .with_parameter("a", TypeDescriptor::new("int"))
        .with_parameter("amin", TypeDescriptor::new("int"))
        .with_parameter("amax", TypeDescriptor::new("int"));
    InlineFunctionUnit::new(
        sig,
        "{ if(a<amin) return amin; else if(a>amax) return amax; else return a; }",
    )
}

fn float2int_unit() -> InlineFunctionUnit {
    let sig = FunctionSignature::new("av_float2int", TypeDescriptor::new("uint32_t"))
        .with_parameter("f", TypeDescriptor::new("float"));
    InlineFunctionUnit::new(
        sig,
        "{\n    union av_intfloat32 v;\n    v.f = f;\n    return v.i;\n}",
    )
}

fn unit(name: &str, ret: &str, body: &str) -> InlineFunctionUnit {
    let sig = FunctionSignature::new(name, TypeDescriptor::new(ret))
        .with_parameter("a", TypeDescriptor::new("int"))
        .with_parameter("b", TypeDescriptor::new("int"));
    InlineFunctionUnit::new(sig, body)
}

fn translate(unit: &InlineFunctionUnit) -> TranslationResult {
    let catalog = Catalog::new();
    let cache = StabilityCache::empty();
    Translator::new(&catalog, &cache).translate(unit)
}

fn translated_body(result: &TranslationResult) -> &str {
    match result {
        TranslationResult::Translated { body } => body,
        other => panic!("expected Translated, got {other:?}"),
    }
}

fn count(text: &str, c: char) -> usize {
    text.chars().filter(|x| *x == c).count()
}

#[test]
fn three_way_clamp_translates_cleanly() {
    let result = translate(&clamp_unit());
    let body = translated_body(&result);
    assert_eq!(
        body,
        "{\n    if (a < amin) return amin;\n    else if (a > amax) return amax;\n    else return a;\n}"
    );
    assert_eq!(count(body, '{'), count(body, '}'));
    assert_eq!(count(body, '('), count(body, ')'));
}

#[test]
fn union_punning_becomes_pointer_reinterpretation() {
    let result = translate(&float2int_unit());
    let body = translated_body(&result);
    assert!(body.contains("return *(uint*)&f;"), "body was: {body}");
    assert!(!body.contains("union"));
    assert!(!body.contains("v.i"));
}

#[test]
fn builtin_call_fails_with_commented_source() {
    let u = unit("ff_clz", "int", "{ return __builtin_clz(a); }");
    match translate(&u) {
        TranslationResult::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::UnsupportedIntrinsic);
            assert!(failure.reason().contains("__builtin_clz"));
            assert_eq!(failure.original_source, "{ return __builtin_clz(a); }");
            assert!(failure.stub.contains("// return __builtin_clz(a);"));
            assert!(failure.stub.contains("throw new NotImplementedException("));
            let expected = "Function contains __builtin functions that need manual C# implementation";
            assert!(failure.stub.contains(expected));
            for line in failure.stub.lines().filter(|l| l.contains("__builtin_clz")) {
                assert!(line.trim_start().starts_with("//"), "uncommented intrinsic: {line}");
            }
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[test]
fn and_with_complement_is_rejected_by_denylist() {
    let u = unit("clear_bits", "int", "{ return a & ~b; }");
    match translate(&u) {
        TranslationResult::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::ValidationRejected);
            let expected = "complex pattern requiring manual conversion: bitwise AND with complement";
            assert!(failure.reasons.iter().any(|r| r == expected), "{:?}", failure.reasons);
            assert_eq!(failure.rewritten_source.as_deref(), Some("{\n    return a & ~b;\n}"));
            assert!(failure.stub.contains("// return a & ~b;"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[test]
fn hand_edited_cache_entry_is_reused_verbatim() {
    let catalog = Catalog::new();
    let u = clamp_unit();
    let approved = "{\n    return Math.Clamp(a, amin, amax); // hand-tuned\n}";
    let cache = StabilityCache::from_entries([CacheEntry::new(
        "av_clip_c",
        u.body_hash.clone(),
        approved,
    )]);

    let result = Translator::new(&catalog, &cache).translate(&u);
    assert_eq!(result, TranslationResult::Reused { body: approved.to_string() });
}

#[test]
fn cache_hit_skips_the_pipeline_even_for_untranslatable_bodies() {
    let catalog = Catalog::new();
    let u = unit("ff_clz", "int", "{ return __builtin_clz(a); }");
    let entry = CacheEntry::new("ff_clz", u.body_hash.clone(), "{ manual }");
    let cache = StabilityCache::from_entries([entry]);
    let result = Translator::new(&catalog, &cache).translate(&u);
    assert_eq!(result, TranslationResult::Reused { body: "{ manual }".to_string() });
}

#[test]
fn changed_body_hash_ignores_stale_entry() {
    let catalog = Catalog::new();
    let u = clamp_unit();
    let cache = StabilityCache::from_entries([CacheEntry::new(
        "av_clip_c",
        BodyHash::of("{ if(a<amin) return amin; else return a; }"),
        "{ stale }",
    )]);

    let result = Translator::new(&catalog, &cache).translate(&u);
    assert!(matches!(result, TranslationResult::Translated { .. }));
    assert!(!result.emitted_body().contains("stale"));
}

#[test]
fn one_changed_byte_changes_the_hash() {
    let a = BodyHash::of("{ return a; }");
    let b = BodyHash::of("{ return a;}");
    assert_ne!(a, b);
    assert_eq!(a, BodyHash::of("{ return a; }"));
    assert_eq!(a.as_str().len(), 64);
}

#[test]
fn changed_signature_with_same_body_still_reuses() {
    let catalog = Catalog::new();
    let u = clamp_unit();
    let cache = StabilityCache::from_entries([CacheEntry::new(
        "av_clip_c",
        u.body_hash.clone(),
        "{ approved }",
    )
    .with_fingerprint(Some("different-signature".to_string()))]);

    let result = Translator::new(&catalog, &cache).translate(&u);
    assert_eq!(result, TranslationResult::Reused { body: "{ approved }".to_string() });
}

#[test]
fn translation_is_deterministic() {
    let catalog = Catalog::new();
    let cache = StabilityCache::empty();
    let translator = Translator::new(&catalog, &cache);
    for u in [clamp_unit(), float2int_unit(), unit("x", "int", "{ return a ^ b; }")] {
        assert_eq!(translator.translate(&u), translator.translate(&u));
    }
}

#[test]
fn unparsable_body_fails_with_syntax_kind() {
    let u = unit("weird", "int", "{\n#if HAVE_X\n return a;\n#endif\n}");
    match translate(&u) {
        TranslationResult::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::UnsupportedSyntax);
            assert!(failure.rewritten_source.is_none());
            assert!(failure.stub.contains("Manual conversion required."));
            assert!(failure.stub.contains("// #if HAVE_X"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[test]
fn batch_keeps_input_order_and_isolates_failures() {
    let catalog = Catalog::new();
    let cache = StabilityCache::empty();
    let translator = Translator::new(&catalog, &cache);

    let mut units = Vec::new();
    for i in 0..9 {
        let body = if i % 3 == 0 { "{ return __builtin_ctz(a); }" } else { "{ return a + b; }" };
        units.push(unit(&format!("f{i}"), "int", body));
    }

    let serial = translator.translate_batch(&units, 1);
    let parallel = translator.translate_batch(&units, 4);
    assert_eq!(serial, parallel);
    assert_eq!(parallel.len(), units.len());
    for (i, result) in parallel.iter().enumerate() {
        assert_eq!(result.is_failed(), i % 3 == 0, "unit f{i}");
    }
}

#[test]
fn translated_bodies_are_balanced_and_intrinsic_free() {
    let bodies = [
        "{ int x = a + b; return x * 2; }",
        "{ if (a > b) { return a; } return b; }",
        "{ for (int i = 0; i < b; i++) { a += i; } return a; }",
        "{ return __builtin_expect(a, 0); }",
        "{ while (a > 0) { a--; } return a; }",
    ];
    let catalog = Catalog::new();
    let cache = StabilityCache::empty();
    let translator = Translator::new(&catalog, &cache);
    for (i, body) in bodies.iter().enumerate() {
        let result = translator.translate(&unit(&format!("g{i}"), "int", body));
        if let TranslationResult::Translated { body } = &result {
            assert_eq!(count(body, '{'), count(body, '}'));
            assert_eq!(count(body, '('), count(body, ')'));
            assert!(!body.contains("__builtin_"));
        }
    }
}

#[test]
fn literals_and_locals_keep_their_c_values() {
    let result = translate(&unit("times_eight", "int", "{ return a * 010; }"));
    assert_eq!(translated_body(&result), "{\n    return a * 8;\n}");

    let result = translate(&unit("half", "double", "{ double d = 1; return d / 2; }"));
    assert_eq!(translated_body(&result), "{\n    var d = (double)1;\n    return d / 2;\n}");

    let body = "{ uint32_t x = a; return (int)(x >> 1); }";
    let result = translate(&unit("logical_half", "int", body));
    assert!(translated_body(&result).contains("var x = (uint)a;"), "{result:?}");

    let result = translate(&unit("wrap_byte", "int", "{ return (char)(a + 200); }"));
    assert_eq!(translated_body(&result), "{\n    return (sbyte)(a + 200);\n}");
}

#[test]
fn unknown_macro_constant_is_rejected() {
    match translate(&unit("is_unset", "int", "{ return a == AV_NOPTS_VALUE; }")) {
        TranslationResult::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::ValidationRejected);
            let expected = "untranslated C construct: AV_NOPTS_VALUE".to_string();
            assert_eq!(failure.reasons, vec![expected]);
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[test]
fn deeply_nested_body_fails_alone_without_aborting_the_batch() {
    let depth = 1500;
    let nested = format!("{{ return {}a{}; }}", "(".repeat(depth), ")".repeat(depth));
    let chained = format!("{{ return a{}; }}", " + a".repeat(400));
    let units = vec![
        unit("nested", "int", &nested),
        unit("chained", "int", &chained),
        unit("one", "int", "{ return 1; }"),
    ];

    let catalog = Catalog::new();
    let cache = StabilityCache::empty();
    let results = Translator::new(&catalog, &cache).translate_batch(&units, 1);

    for result in &results[..2] {
        match result {
            TranslationResult::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::UnsupportedSyntax);
                assert!(failure.reason().contains("nesting deeper than"), "{}", failure.reason());
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
    assert_eq!(results[2], TranslationResult::Translated { body: "{\n    return 1;\n}".to_string() });
}

#[test]
fn translator_runs_a_replacement_chain() {
    let mut chain = RewriteChain::new();
    chain.register(TypeNameMapper);
    let catalog = Catalog::new();
    let cache = StabilityCache::empty();
    let translator = Translator::new(&catalog, &cache).with_chain(chain);

    let result =
        translator.translate(&unit("keep_explicit", "int", "{ int32_t x = a; return x; }"));
    assert_eq!(translated_body(&result), "{\n    int x = a;\n    return x;\n}");
}
