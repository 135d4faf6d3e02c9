use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use inline_port_core::db::ProjectContext;
use inline_port_core::manifest::UnitManifest;

use crate::canonicalize_or_current;

/// Resolve `root` and open its project (config + database).
pub fn open_project(root: &str) -> Result<ProjectContext> {
    let root_path = canonicalize_or_current(root)?;
    ProjectContext::from_root(&root_path)
}

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// Read a unit manifest, picking YAML or JSON by file extension.
pub fn load_manifest(path: &Path) -> Result<UnitManifest> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase());
    let manifest: UnitManifest = match ext.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse YAML manifest {}", path.display()))?,
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON manifest {}", path.display()))?,
        _ => bail!(
            "Unsupported manifest extension for {} (expected .yaml, .yml or .json)",
            path.display()
        ),
    };
    Ok(manifest)
}
