use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use inline_port_core::baseline::parse_generated_source;
use inline_port_core::db::{BaselineOrigin, BaselineRecord};
use tracing::info;

use crate::commands::open_project;

/// Seed the stability baseline from a previously generated C# file.
pub fn import_baseline_command(root: &str, file: &str) -> Result<()> {
    let ctx = open_project(root)?;
    let path = ctx.layout.resolve(Path::new(file));
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read generated source {}", path.display()))?;

    let entries = parse_generated_source(&text);
    let now = Utc::now().to_rfc3339();
    let records: Vec<BaselineRecord> = entries
        .iter()
        .map(|entry| BaselineRecord::from_entry(entry, BaselineOrigin::Imported, now.clone()))
        .collect();
    let imported = ctx.db.upsert_baseline(&records).context("Failed to store baseline entries")?;
    info!(file = %path.display(), imported, "baseline imported");

    let plural = if imported == 1 { "y" } else { "ies" };
    println!("Imported {} baseline entr{} from {}", imported, plural, path.display());
    Ok(())
}

/// List baseline entries (name, origin, body hash).
pub fn list_baseline_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_project(root)?;
    let records = ctx.db.list_baseline().context("Failed to list baseline")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("Baseline:");
    if records.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for record in records {
        let short = record.body_hash.get(..12).unwrap_or(&record.body_hash);
        println!(
            "- {} [{}] {} (updated {})",
            record.name,
            record.origin.as_str(),
            short,
            record.updated_at
        );
    }

    Ok(())
}
