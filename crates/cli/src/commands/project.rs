use std::fs;

use anyhow::{Context, Result};
use inline_port_core::db::{ProjectConfig, ProjectDb, ProjectLayout, CURRENT_SCHEMA_VERSION};
use serde::Serialize;

use crate::commands::{open_project, print_dir_status};
use crate::{canonicalize_or_current, infer_project_name};

#[derive(Serialize)]
pub struct ProjectInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub schema_version: i32,
    pub workers: usize,
    pub output: inline_port_core::db::OutputConfig,
    pub output_file: String,
    pub baseline_entries: usize,
    pub translation_runs: usize,
}

/// Initialize a new project at `root`.
pub fn init_project_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.generated_dir).with_context(|| {
        format!("Failed to create generated dir: {}", layout.generated_dir.display())
    })?;

    let config = ProjectConfig::new(&project_name, layout.db_path_relative_string());
    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.project_config_path, json).with_context(|| {
        format!("Failed to write project config: {}", layout.project_config_path.display())
    })?;

    // Create the database now so later commands can rely on its presence.
    ProjectDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize project database at {}", layout.db_path.display())
    })?;

    println!("Initialized inline-port project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.project_config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Output: {}", config.output.path);

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_project(root)?;
    let baseline = ctx.db.list_baseline().context("Failed to list baseline")?;
    let runs = ctx.db.list_translation_runs().context("Failed to list translation runs")?;

    if json {
        let snapshot = ProjectInfoSnapshot {
            name: ctx.config.name.clone(),
            root: ctx.layout.root.display().to_string(),
            config_file: ctx.layout.project_config_path.display().to_string(),
            config_version: ctx.config.config_version.clone(),
            db_path: ctx.config.db.path.clone(),
            schema_version: CURRENT_SCHEMA_VERSION,
            workers: ctx.config.workers,
            output: ctx.config.output.clone(),
            output_file: ctx.output_path().display().to_string(),
            baseline_entries: baseline.len(),
            translation_runs: runs.len(),
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("inline-port Project Info");
    println!("========================");
    println!("Name: {}", ctx.config.name);
    println!("Root: {}", ctx.layout.root.display());
    println!("Config file: {}", ctx.layout.project_config_path.display());
    println!("Config version: {}", ctx.config.config_version);
    println!("DB path (config): {}", ctx.config.db.path);
    println!("Output file: {}", ctx.output_path().display());
    println!("Namespace: {}", ctx.config.output.namespace);
    println!("Type: {}", ctx.config.output.type_name);
    println!("Workers: {}", ctx.config.workers);
    println!();
    println!("Directories:");
    print_dir_status("Meta dir (.inline-port)", &ctx.layout.meta_dir);
    print_dir_status("Generated dir", &ctx.layout.generated_dir);
    println!();
    println!("Baseline entries: {}", baseline.len());
    println!("Translation runs: {}", runs.len());
    if let Some(last) = runs.last() {
        println!(
            "Last run: #{} {} translated, {} reused, {} failed{}",
            last.id.unwrap_or_default(),
            last.translated,
            last.reused,
            last.failed,
            if last.dry_run { " (dry run)" } else { "" }
        );
    }

    Ok(())
}
