use serde::{Deserialize, Serialize};

use crate::model::{BodyHash, CacheEntry, FailureKind};

/// Where a baseline row came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BaselineOrigin {
    /// Read back from a previously generated (possibly hand-edited) file.
    Imported,
    /// Accepted output of the rewrite chain.
    Translated,
    /// Carried forward unchanged from an earlier baseline.
    Reused,
}

impl BaselineOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineOrigin::Imported => "imported",
            BaselineOrigin::Translated => "translated",
            BaselineOrigin::Reused => "reused",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "imported" => Some(BaselineOrigin::Imported),
            "translated" => Some(BaselineOrigin::Translated),
            "reused" => Some(BaselineOrigin::Reused),
            _ => None,
        }
    }
}

/// One persisted baseline row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaselineRecord {
    pub name: String,
    pub body_hash: String,
    pub approved_body: String,
    pub signature_fingerprint: Option<String>,
    pub origin: BaselineOrigin,
    pub updated_at: String,
}

impl BaselineRecord {
    pub fn from_entry(
        entry: &CacheEntry,
        origin: BaselineOrigin,
        updated_at: impl Into<String>,
    ) -> Self {
        Self {
            name: entry.name.clone(),
            body_hash: entry.body_hash.to_string(),
            approved_body: entry.approved_body.clone(),
            signature_fingerprint: entry.signature_fingerprint.clone(),
            origin,
            updated_at: updated_at.into(),
        }
    }

    pub fn to_cache_entry(&self) -> CacheEntry {
        CacheEntry::new(&self.name, BodyHash::from_hex(&self.body_hash), &self.approved_body)
            .with_fingerprint(self.signature_fingerprint.clone())
    }
}

/// Bookkeeping row for one `translate` invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslationRunRecord {
    /// Row id; `None` until inserted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Manifest path as given on the command line.
    pub manifest: String,
    pub manifest_hash: String,
    pub total: usize,
    pub translated: usize,
    pub reused: usize,
    pub failed: usize,
    pub workers: usize,
    pub dry_run: bool,
    pub started_at: String,
    pub finished_at: String,
}

/// One failed function in a run, kept for manual review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunFailureRecord {
    pub function: String,
    pub kind: FailureKind,
    pub reasons: Vec<String>,
    pub original_source: String,
    pub rewritten_source: Option<String>,
}
