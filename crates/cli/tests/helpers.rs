use std::fs;

use inline_port::commands::load_manifest;
use inline_port::{canonicalize_or_current, infer_project_name, sha256_file};
use tempfile::tempdir;

#[test]
fn infer_project_name_uses_last_component() {
    assert_eq!(infer_project_name(std::path::Path::new("/tmp/ffmpeg-port")), "ffmpeg-port");
    assert_eq!(infer_project_name(std::path::Path::new("/")), "unnamed-project");
}

#[test]
fn canonicalize_or_current_handles_missing_paths() {
    let temp = tempdir().unwrap();
    let existing = canonicalize_or_current(&temp.path().to_string_lossy()).unwrap();
    assert!(existing.is_absolute());
    let missing = canonicalize_or_current("does-not-exist-yet").unwrap();
    assert!(missing.is_absolute());
    assert!(missing.ends_with("does-not-exist-yet"));
}

#[test]
fn sha256_file_matches_known_digest() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("abc.txt");
    fs::write(&path, "abc").unwrap();
    assert_eq!(
        sha256_file(&path).unwrap(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn manifests_load_from_yaml_and_json() {
    let temp = tempdir().unwrap();
    let yaml = temp.path().join("units.yml");
    fs::write(
        &yaml,
        "functions:\n  - name: f\n    return_type: { name: uint8_t, pointer_depth: 1 }\n    body: \"{ return p; }\"\n",
    )
    .unwrap();
    let manifest = load_manifest(&yaml).unwrap();
    assert_eq!(manifest.functions[0].return_type.pointer_depth, 1);
    assert!(manifest.functions[0].parameters.is_empty());

    let json = temp.path().join("units.JSON");
    fs::write(&json, r#"{"functions":[{"name":"g","return_type":{"name":"int"},"body":"{ }"}]}"#)
        .unwrap();
    assert_eq!(load_manifest(&json).unwrap().functions[0].name, "g");
}
