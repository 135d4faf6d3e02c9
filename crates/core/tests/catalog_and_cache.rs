use inline_port_core::cache::{next_baseline, CacheCheck, StabilityCache};
use inline_port_core::catalog::Catalog;
use inline_port_core::model::{
    BodyHash, CacheEntry, Failure, FailureKind, FunctionSignature, InlineFunctionUnit,
    TranslationResult, TypeDescriptor,
};

fn unit(name: &str, body: &str) -> InlineFunctionUnit {
    InlineFunctionUnit::new(FunctionSignature::new(name, TypeDescriptor::new("int")), body)
}

#[test]
fn catalog_maps_fixed_width_types() {
    let catalog = Catalog::new();
    assert_eq!(catalog.map_type("uint32_t"), Some("uint"));
    assert_eq!(catalog.map_type("int8_t"), Some("sbyte"));
    assert_eq!(catalog.map_type("size_t"), Some("nuint"));
    assert_eq!(catalog.map_type("AVRational"), None);
    assert_eq!(catalog.map_compound("unsigned long long"), Some("ulong"));
}

#[test]
fn catalog_maps_limits_and_minimums() {
    let catalog = Catalog::new();
    assert_eq!(catalog.map_macro("INT_MAX"), Some("int.MaxValue"));
    assert_eq!(catalog.map_macro("INT64_MIN"), Some("long.MinValue"));
    assert_eq!(catalog.map_macro("UINT8_MAX"), None);
    assert_eq!(catalog.map_limit_literal(2_147_483_647, false), Some("int.MaxValue"));
    assert_eq!(catalog.map_limit_literal(2_147_483_647, true), None);
    assert_eq!(catalog.min_for("long.MaxValue"), Some("long.MinValue"));
}

#[test]
fn catalog_renders_signature_types() {
    let catalog = Catalog::new();
    let buffer = TypeDescriptor::new("uint8_t").pointer(2).constant();
    assert_eq!(catalog.target_type(&buffer), "byte**");
    assert_eq!(catalog.target_type(&TypeDescriptor::new("char").pointer(1)), "byte*");
    assert_eq!(catalog.target_type(&TypeDescriptor::new("AVRational")), "AVRational");
    assert!(catalog.is_narrow_target("ushort"));
    assert!(!catalog.is_narrow_target("int"));
}

#[test]
fn punning_unions_know_member_types() {
    let catalog = Catalog::new();
    let union = catalog.punning_union("av_intfloat64").expect("known union");
    assert_eq!(union.member_type("f"), Some("double"));
    assert_eq!(union.member_type("i"), Some("uint64_t"));
    assert_eq!(union.member_type("x"), None);
    assert!(catalog.punning_union("other").is_none());
}

#[test]
fn cache_check_distinguishes_hit_stale_and_miss() {
    let current = unit("f", "{ return 1; }");
    let cache = StabilityCache::from_entries([
        CacheEntry::new("f", current.body_hash.clone(), "{ one }"),
        CacheEntry::new("g", BodyHash::of("{ old }"), "{ two }"),
    ]);

    assert!(matches!(cache.check(&current), CacheCheck::Hit(e) if e.approved_body == "{ one }"));
    assert!(matches!(cache.check(&unit("g", "{ new }")), CacheCheck::Stale(_)));
    assert_eq!(cache.check(&unit("h", "{ }")), CacheCheck::Miss);
    assert_eq!(cache.len(), 2);
}

#[test]
fn later_entries_win_in_a_snapshot() {
    let cache = StabilityCache::from_entries([
        CacheEntry::new("f", BodyHash::of("a"), "first"),
        CacheEntry::new("f", BodyHash::of("b"), "second"),
    ]);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.lookup("f").map(|e| e.approved_body.as_str()), Some("second"));
}

#[test]
fn next_baseline_excludes_failures() {
    let units = vec![unit("a", "{ 1 }"), unit("b", "{ 2 }"), unit("c", "{ 3 }")];
    let results = vec![
        TranslationResult::Translated { body: "{ A }".into() },
        TranslationResult::Failed(Failure {
            kind: FailureKind::ValidationRejected,
            reasons: vec!["x".into()],
            original_source: "{ 2 }".into(),
            rewritten_source: None,
            stub: "{ throw }".into(),
        }),
        TranslationResult::Reused { body: "{ C }".into() },
    ];

    let baseline = next_baseline(&units, &results);
    let names: Vec<&str> = baseline.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a", "c"]);
    assert_eq!(baseline[0].body_hash, units[0].body_hash);
    assert_eq!(baseline[1].approved_body, "{ C }");
    assert_eq!(baseline[0].signature_fingerprint, Some(units[0].signature.fingerprint()));
}

#[test]
fn signature_fingerprint_tracks_parameter_changes() {
    let base = FunctionSignature::new("f", TypeDescriptor::new("int"))
        .with_parameter("a", TypeDescriptor::new("int"));
    let changed = FunctionSignature::new("f", TypeDescriptor::new("int"))
        .with_parameter("a", TypeDescriptor::new("int64_t"));
    assert_ne!(base.fingerprint(), changed.fingerprint());
    assert_eq!(base.fingerprint(), base.clone().fingerprint());
}

#[test]
fn translation_result_serializes_with_status_tag() {
    let json = serde_json::to_value(TranslationResult::Reused { body: "{ }".into() }).unwrap();
    assert_eq!(json["status"], "reused");
    assert_eq!(json["body"], "{ }");

    let failed = TranslationResult::Failed(Failure {
        kind: FailureKind::UnsupportedIntrinsic,
        reasons: vec![],
        original_source: String::new(),
        rewritten_source: None,
        stub: String::new(),
    });
    let json = serde_json::to_value(&failed).unwrap();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["kind"], "unsupported_intrinsic");
}
