use anyhow::{anyhow, Context, Result};

use crate::commands::open_project;

/// List recorded translation runs.
pub fn list_runs_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_project(root)?;
    let runs = ctx.db.list_translation_runs().context("Failed to list translation runs")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    println!("Translation runs:");
    if runs.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for run in runs {
        println!(
            "- #{} {} total={} translated={} reused={} failed={} workers={}{} ({})",
            run.id.unwrap_or_default(),
            run.manifest,
            run.total,
            run.translated,
            run.reused,
            run.failed,
            run.workers,
            if run.dry_run { " dry-run" } else { "" },
            run.finished_at
        );
    }
    Ok(())
}

/// Show the failure artifacts of one run (latest when `run` is omitted).
pub fn show_failures_command(root: &str, run: Option<i64>, json: bool) -> Result<()> {
    let ctx = open_project(root)?;
    let run_id = match run {
        Some(id) => id,
        None => ctx
            .db
            .latest_run_id()
            .context("Failed to look up latest run")?
            .ok_or_else(|| anyhow!("No translation runs recorded yet"))?,
    };
    let failures = ctx.db.list_run_failures(run_id).context("Failed to list run failures")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&failures)?);
        return Ok(());
    }

    println!("Failures for run #{}:", run_id);
    if failures.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for failure in failures {
        println!();
        println!("== {} [{}]", failure.function, failure.kind.as_str());
        for reason in &failure.reasons {
            println!("  reason: {}", reason);
        }
        println!("  original:");
        for line in failure.original_source.lines() {
            println!("    {}", line);
        }
        if let Some(rewritten) = &failure.rewritten_source {
            println!("  rewritten:");
            for line in rewritten.lines() {
                println!("    {}", line);
            }
        }
    }
    Ok(())
}
