use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::cache::next_baseline;
use crate::catalog::Catalog;
use crate::db::{
    BaselineOrigin, BaselineRecord, DbError, ProjectContext, RunFailureRecord,
    TranslationRunRecord,
};
use crate::emit::{render_file, EmitOptions, EmittedFunction};
use crate::manifest::{ManifestError, UnitManifest};
use crate::model::TranslationResult;
use crate::pipeline::Translator;

#[derive(Debug, Error)]
pub enum TranslationServiceError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Failed to write generated file {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

/// Inputs for one run beyond the manifest itself.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Manifest path as given by the caller, recorded for bookkeeping.
    pub manifest_label: String,
    pub manifest_hash: String,
    pub workers: usize,
    /// Translate and record the run, but write neither the file nor the baseline.
    pub dry_run: bool,
    pub output_path: PathBuf,
}

/// Per-function line of a run report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionOutcome {
    pub name: String,
    #[serde(flatten)]
    pub result: TranslationResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunReport {
    pub run: TranslationRunRecord,
    pub functions: Vec<FunctionOutcome>,
    /// Written file, `None` on a dry run.
    pub output_path: Option<PathBuf>,
    pub baseline_updated: usize,
}

/// Ties a project context to the translator: snapshot, translate, persist.
pub struct TranslationRunner<'a> {
    pub ctx: &'a ProjectContext,
    pub catalog: &'a Catalog,
}

impl<'a> TranslationRunner<'a> {
    pub fn new(ctx: &'a ProjectContext, catalog: &'a Catalog) -> Self {
        Self { ctx, catalog }
    }

    pub fn run(
        &self,
        manifest: &UnitManifest,
        options: &RunOptions,
    ) -> Result<RunReport, TranslationServiceError> {
        manifest.validate()?;
        let started_at = Utc::now().to_rfc3339();

        let units = manifest.to_units();
        let cache = self.ctx.db.load_cache_snapshot()?;
        let workers = options.workers.max(1);
        info!(functions = units.len(), cached = cache.len(), workers, "starting translation run");

        let results = Translator::new(self.catalog, &cache).translate_batch(&units, workers);

        let mut failures = Vec::new();
        for (unit, result) in units.iter().zip(&results) {
            if let TranslationResult::Failed(failure) = result {
                warn!(
                    function = unit.name(),
                    kind = failure.kind.as_str(),
                    reason = %failure.reason(),
                    "function emitted as failure stub"
                );
                failures.push(RunFailureRecord {
                    function: unit.name().to_string(),
                    kind: failure.kind,
                    reasons: failure.reasons.clone(),
                    original_source: failure.original_source.clone(),
                    rewritten_source: failure.rewritten_source.clone(),
                });
            }
        }

        let count = |status: &str| results.iter().filter(|r| r.status_str() == status).count();
        let (translated, reused, failed) = (count("translated"), count("reused"), count("failed"));

        let mut output_path = None;
        let mut baseline_updated = 0;
        if !options.dry_run {
            let summaries = manifest.summaries();
            let emitted: Vec<EmittedFunction<'_>> = units
                .iter()
                .zip(&results)
                .zip(summaries)
                .map(|((unit, result), summary)| EmittedFunction { unit, result, summary })
                .collect();
            let emit_options = EmitOptions {
                namespace: self.ctx.config.output.namespace.clone(),
                type_name: self.ctx.config.output.type_name.clone(),
                file_header: self.ctx.config.output.file_header.clone(),
            };
            let text = render_file(&emit_options, self.catalog, &emitted);
            write_output(&options.output_path, &text)?;
            output_path = Some(options.output_path.clone());

            let now = Utc::now().to_rfc3339();
            let records: Vec<BaselineRecord> = next_baseline(&units, &results)
                .iter()
                .zip(results.iter().filter(|r| !r.is_failed()))
                .map(|(entry, result)| {
                    let origin = match result {
                        TranslationResult::Reused { .. } => BaselineOrigin::Reused,
                        _ => BaselineOrigin::Translated,
                    };
                    BaselineRecord::from_entry(entry, origin, now.clone())
                })
                .collect();
            baseline_updated = self.ctx.db.upsert_baseline(&records)?;
        }

        let mut run = TranslationRunRecord {
            id: None,
            manifest: options.manifest_label.clone(),
            manifest_hash: options.manifest_hash.clone(),
            total: units.len(),
            translated,
            reused,
            failed,
            workers,
            dry_run: options.dry_run,
            started_at,
            finished_at: Utc::now().to_rfc3339(),
        };
        run.id = Some(self.ctx.db.insert_translation_run(&run, &failures)?);
        info!(translated, reused, failed, dry_run = options.dry_run, "translation run finished");

        let functions = units
            .iter()
            .zip(results)
            .map(|(unit, result)| FunctionOutcome { name: unit.name().to_string(), result })
            .collect();

        Ok(RunReport { run, functions, output_path, baseline_updated })
    }
}

fn write_output(path: &Path, text: &str) -> Result<(), TranslationServiceError> {
    let to_err = |source: std::io::Error| TranslationServiceError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(to_err)?;
    }
    std::fs::write(path, text).map_err(to_err)
}
