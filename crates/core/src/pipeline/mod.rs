//! Per-function translation state machine.
//!
//! ```text
//! cache check --hit--> Reused
//!      | miss/stale
//!      v
//! parse --error--> Failed(unsupported_syntax)
//!      v
//! rewrite chain --halt--> Failed(unsupported_intrinsic)
//!      v
//! validate --reject--> Failed(validation_rejected)
//!      v
//! Translated
//! ```
//!
//! Every unit is independent: a failure (or a panic) while translating one
//! function never affects another, and batch output keeps input order.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::cache::{CacheCheck, StabilityCache};
use crate::catalog::Catalog;
use crate::model::{Failure, FailureKind, InlineFunctionUnit, TranslationResult};
use crate::rewrite::{ChainOutcome, RewriteChain, RewriteContext};
use crate::syntax::parse_body;
use crate::validate::Validator;

/// Exception type thrown by every failure stub.
pub const STUB_EXCEPTION: &str = "NotImplementedException";

pub struct Translator<'a> {
    catalog: &'a Catalog,
    cache: &'a StabilityCache,
    chain: RewriteChain,
}

impl<'a> Translator<'a> {
    pub fn new(catalog: &'a Catalog, cache: &'a StabilityCache) -> Self {
        Self { catalog, cache, chain: RewriteChain::standard() }
    }

    /// Replace the rewrite chain, e.g. to run only some of the passes.
    pub fn with_chain(mut self, chain: RewriteChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn translate(&self, unit: &InlineFunctionUnit) -> TranslationResult {
        let name = unit.name();
        match self.cache.check(unit) {
            CacheCheck::Hit(entry) => {
                if let Some(previous) = &entry.signature_fingerprint {
                    if *previous != unit.signature.fingerprint() {
                        warn!(
                            function = name,
                            "signature changed since approval; reusing cached body"
                        );
                    }
                }
                debug!(function = name, "stability cache hit");
                return TranslationResult::Reused { body: entry.approved_body.clone() };
            }
            CacheCheck::Stale(entry) => {
                debug!(
                    function = name,
                    cached = %entry.body_hash,
                    current = %unit.body_hash,
                    "body changed; ignoring cached entry"
                );
            }
            CacheCheck::Miss => debug!(function = name, "not in stability cache"),
        }

        let tree = match parse_body(&unit.original_body) {
            Ok(tree) => tree,
            Err(err) => {
                debug!(function = name, error = %err, "body outside supported C subset");
                let reason = format!("unsupported C syntax: {err}");
                let message = format!(
                    "Function body uses unsupported C syntax: {err}. Manual conversion required."
                );
                return failed(unit, FailureKind::UnsupportedSyntax, vec![reason], None, &message);
            }
        };

        let ctx = RewriteContext { catalog: self.catalog, signature: &unit.signature };
        match self.chain.run(tree, &ctx) {
            ChainOutcome::Halted { halt, partial_text } => {
                debug!(function = name, reason = %halt, "rewrite chain halted");
                failed(
                    unit,
                    FailureKind::UnsupportedIntrinsic,
                    vec![halt.to_string()],
                    Some(partial_text),
                    "Function contains __builtin functions that need manual C# implementation",
                )
            }
            ChainOutcome::Rewritten { tree, text } => {
                let verdict = Validator::new(self.catalog).validate(&tree, &text, &unit.signature);
                if verdict.is_accepted() {
                    debug!(function = name, "translated");
                    TranslationResult::Translated { body: text }
                } else {
                    let reasons = verdict.reasons();
                    debug!(function = name, ?reasons, "validator rejected rewritten body");
                    let message = format!(
                        "Function has syntax errors or complex patterns: {}. \
                         Manual conversion required.",
                        reasons.join(", ")
                    );
                    failed(unit, FailureKind::ValidationRejected, reasons, Some(text), &message)
                }
            }
        }
    }

    /// Translate every unit, `workers` at a time. Output order matches input.
    pub fn translate_batch(
        &self,
        units: &[InlineFunctionUnit],
        workers: usize,
    ) -> Vec<TranslationResult> {
        if workers <= 1 || units.len() <= 1 {
            return units.iter().map(|u| self.translate_isolated(u)).collect();
        }

        let chunk_size = units.len().div_ceil(workers).max(1);
        let chunks: Vec<&[InlineFunctionUnit]> = units.chunks(chunk_size).collect();

        std::thread::scope(|s| {
            let handles: Vec<_> = chunks
                .iter()
                .map(|chunk| {
                    let chunk = *chunk;
                    s.spawn(move || {
                        chunk.iter().map(|u| self.translate_isolated(u)).collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .zip(&chunks)
                .flat_map(|(handle, chunk)| {
                    handle.join().unwrap_or_else(|_| {
                        chunk.iter().map(|u| internal_failure(u)).collect()
                    })
                })
                .collect()
        })
    }

    fn translate_isolated(&self, unit: &InlineFunctionUnit) -> TranslationResult {
        panic::catch_unwind(AssertUnwindSafe(|| self.translate(unit))).unwrap_or_else(|_| {
            warn!(function = unit.name(), "translator panicked; emitting failure stub");
            internal_failure(unit)
        })
    }
}

fn internal_failure(unit: &InlineFunctionUnit) -> TranslationResult {
    failed(
        unit,
        FailureKind::ValidationRejected,
        vec!["internal translator error".to_string()],
        None,
        "Function could not be translated automatically. Manual conversion required.",
    )
}

fn failed(
    unit: &InlineFunctionUnit,
    kind: FailureKind,
    reasons: Vec<String>,
    rewritten_source: Option<String>,
    message: &str,
) -> TranslationResult {
    let commented = rewritten_source.as_deref().unwrap_or(&unit.original_body);
    TranslationResult::Failed(Failure {
        kind,
        reasons,
        original_source: unit.original_body.clone(),
        stub: failure_stub(commented, message),
        rewritten_source,
    })
}

/// Commented-out `text` followed by an unconditional throw, as a braced body.
pub fn failure_stub(text: &str, message: &str) -> String {
    let mut out = String::from("{\n");
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        out.push_str("    // ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!("    throw new {STUB_EXCEPTION}(\"{}\");\n}}", escape_string(message)));
    out
}

fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' | '\r' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}
