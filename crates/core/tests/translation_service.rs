use std::fs;

use inline_port_core::catalog::Catalog;
use inline_port_core::db::{BaselineOrigin, ProjectConfig, ProjectContext, ProjectLayout};
use inline_port_core::manifest::{ManifestError, ManifestFunction, UnitManifest};
use inline_port_core::model::{FailureKind, Parameter, TypeDescriptor};
use inline_port_core::services::{RunOptions, TranslationRunner, TranslationServiceError};
use tempfile::tempdir;

fn init_project(root: &std::path::Path) -> ProjectContext {
    let layout = ProjectLayout::new(root);
    fs::create_dir_all(&layout.meta_dir).unwrap();
    let config = ProjectConfig::new("ServiceTest", layout.db_path_relative_string());
    fs::write(&layout.project_config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    ProjectContext::from_root(root).expect("context")
}

fn function(name: &str, body: &str) -> ManifestFunction {
    ManifestFunction {
        name: name.to_string(),
        summary: None,
        return_type: TypeDescriptor::new("int"),
        parameters: vec![
            Parameter::new("a", TypeDescriptor::new("int")),
            Parameter::new("b", TypeDescriptor::new("int")),
        ],
        body: body.to_string(),
    }
}

fn manifest() -> UnitManifest {
    UnitManifest {
        functions: vec![
            function("ff_max", "{ if (a > b) return a; return b; }"),
            function("ff_ctz", "{ return __builtin_ctz(a); }"),
            function("ff_mix", "{ return a ^ b; }"),
        ],
    }
}

fn options(ctx: &ProjectContext, dry_run: bool) -> RunOptions {
    RunOptions {
        manifest_label: "units.yaml".to_string(),
        manifest_hash: "deadbeef".to_string(),
        workers: 2,
        dry_run,
        output_path: ctx.output_path(),
    }
}

#[test]
fn run_writes_file_baseline_and_run_record() {
    let dir = tempdir().unwrap();
    let ctx = init_project(dir.path());
    let catalog = Catalog::new();

    let report =
        TranslationRunner::new(&ctx, &catalog).run(&manifest(), &options(&ctx, false)).unwrap();
    assert_eq!((report.run.translated, report.run.reused, report.run.failed), (1, 0, 2));
    assert_eq!(report.baseline_updated, 1);
    assert_eq!(report.functions.len(), 3);
    assert_eq!(report.functions[1].name, "ff_ctz");

    let output = report.output_path.clone().expect("written");
    assert_eq!(output, dir.path().join("generated/ffmpeg.functions.inline.g.cs"));
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("public static int ff_max(int @a, int @b)"));
    assert_eq!(text.matches("throw new NotImplementedException(").count(), 2);

    let baseline = ctx.db.list_baseline().unwrap();
    assert_eq!(baseline.len(), 1);
    assert_eq!(baseline[0].name, "ff_max");
    assert_eq!(baseline[0].origin, BaselineOrigin::Translated);

    let run_id = report.run.id.expect("run id");
    let failures = ctx.db.list_run_failures(run_id).unwrap();
    let kinds: Vec<FailureKind> = failures.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![FailureKind::UnsupportedIntrinsic, FailureKind::ValidationRejected]);
    assert_eq!(failures[1].rewritten_source.as_deref(), Some("{\n    return a ^ b;\n}"));
}

#[test]
fn second_run_reuses_the_persisted_baseline() {
    let dir = tempdir().unwrap();
    let ctx = init_project(dir.path());
    let catalog = Catalog::new();
    let runner = TranslationRunner::new(&ctx, &catalog);

    runner.run(&manifest(), &options(&ctx, false)).unwrap();
    let report = runner.run(&manifest(), &options(&ctx, false)).unwrap();
    assert_eq!((report.run.translated, report.run.reused, report.run.failed), (0, 1, 2));

    let baseline = ctx.db.list_baseline().unwrap();
    assert_eq!(baseline[0].origin, BaselineOrigin::Reused);
    assert_eq!(ctx.db.list_translation_runs().unwrap().len(), 2);
}

#[test]
fn dry_run_records_the_run_but_writes_nothing() {
    let dir = tempdir().unwrap();
    let ctx = init_project(dir.path());
    let catalog = Catalog::new();

    let report =
        TranslationRunner::new(&ctx, &catalog).run(&manifest(), &options(&ctx, true)).unwrap();
    assert!(report.output_path.is_none());
    assert_eq!(report.baseline_updated, 0);
    assert!(!ctx.output_path().exists());
    assert!(ctx.db.list_baseline().unwrap().is_empty());

    let runs = ctx.db.list_translation_runs().unwrap();
    assert_eq!(runs.len(), 1);
    assert!(runs[0].dry_run);
}

#[test]
fn invalid_manifest_is_rejected_before_translation() {
    let dir = tempdir().unwrap();
    let ctx = init_project(dir.path());
    let catalog = Catalog::new();
    let runner = TranslationRunner::new(&ctx, &catalog);

    let empty = UnitManifest { functions: vec![] };
    assert!(matches!(
        runner.run(&empty, &options(&ctx, false)),
        Err(TranslationServiceError::Manifest(ManifestError::Empty))
    ));

    let duplicate = UnitManifest { functions: vec![function("f", "{ }"), function("f", "{ }")] };
    assert!(matches!(
        runner.run(&duplicate, &options(&ctx, false)),
        Err(TranslationServiceError::Manifest(ManifestError::DuplicateName(name))) if name == "f"
    ));
    assert!(ctx.db.list_translation_runs().unwrap().is_empty());
}

#[test]
fn manifest_parses_from_json() {
    let json = r#"{
        "functions": [
            {
                "name": "av_ceil_log2_c",
                "summary": "Compute ceil(log2(x)).",
                "return_type": { "name": "int" },
                "parameters": [ { "name": "x", "type": { "name": "int" } } ],
                "body": "{ return av_log2((x - 1U) << 1); }"
            }
        ]
    }"#;
    let manifest: UnitManifest = serde_json::from_str(json).unwrap();
    manifest.validate().unwrap();
    let units = manifest.to_units();
    assert_eq!(units[0].signature.parameters[0].ty, TypeDescriptor::new("int"));
    assert_eq!(manifest.summaries(), vec![Some("Compute ceil(log2(x)).")]);
}
