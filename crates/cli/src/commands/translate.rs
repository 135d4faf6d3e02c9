use std::path::Path;

use anyhow::{Context, Result};
use inline_port_core::catalog::Catalog;
use inline_port_core::model::TranslationResult;
use inline_port_core::services::{RunOptions, TranslationRunner};

use crate::commands::{load_manifest, open_project};
use crate::sha256_file;

/// Arguments of the `translate` command after flag parsing.
#[derive(Debug, Clone)]
pub struct TranslateArgs {
    pub root: String,
    pub units: String,
    pub output: Option<String>,
    pub workers: Option<usize>,
    pub dry_run: bool,
    pub json: bool,
}

/// Translate every function of a unit manifest and write the generated file.
pub fn translate_command(args: &TranslateArgs) -> Result<()> {
    let ctx = open_project(&args.root)?;
    let manifest_path = ctx.layout.resolve(Path::new(&args.units));
    let manifest = load_manifest(&manifest_path)?;
    let manifest_hash = sha256_file(&manifest_path)?;

    let output_path = match &args.output {
        Some(out) => ctx.layout.resolve(Path::new(out)),
        None => ctx.output_path(),
    };
    let options = RunOptions {
        manifest_label: args.units.clone(),
        manifest_hash,
        workers: args.workers.unwrap_or(ctx.config.workers),
        dry_run: args.dry_run,
        output_path,
    };

    let catalog = Catalog::new();
    let report = TranslationRunner::new(&ctx, &catalog)
        .run(&manifest, &options)
        .with_context(|| format!("Translation run failed for {}", manifest_path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Run #{}: {} function(s): {} translated, {} reused, {} failed",
        report.run.id.unwrap_or_default(),
        report.run.total,
        report.run.translated,
        report.run.reused,
        report.run.failed
    );
    for outcome in &report.functions {
        match &outcome.result {
            TranslationResult::Failed(failure) => println!(
                "- {}: failed [{}] {}",
                outcome.name,
                failure.kind.as_str(),
                failure.reason()
            ),
            other => println!("- {}: {}", outcome.name, other.status_str()),
        }
    }
    match &report.output_path {
        Some(path) => {
            println!("Wrote {}", path.display());
            println!("Baseline entries updated: {}", report.baseline_updated);
        }
        None => println!("Dry run: nothing written"),
    }

    Ok(())
}
