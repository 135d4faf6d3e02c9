//! Core data model exchanged with the header-parsing and code-emission
//! collaborators.
//!
//! - `FunctionSignature` / `TypeDescriptor` describe the structural side of an
//!   inline function (supplied by the header parser, never modified here).
//! - `InlineFunctionUnit` couples a signature with its verbatim C body and the
//!   body's content hash.
//! - `TranslationResult` is the one-per-unit outcome of a run.
//! - `CacheEntry` is one row of the stability baseline.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Semantic reference to a C type as seen in a signature.
///
/// Equality is structural: two descriptors are the same type when name,
/// pointer depth and constness all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Base type name without qualifiers or `*` (e.g. `uint32_t`, `AVRational`).
    pub name: String,
    #[serde(default)]
    pub pointer_depth: u8,
    #[serde(default)]
    pub is_const: bool,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), pointer_depth: 0, is_const: false }
    }

    /// Builder-style helper for pointer types.
    pub fn pointer(mut self, depth: u8) -> Self {
        self.pointer_depth = depth;
        self
    }

    /// Builder-style helper for `const`-qualified types.
    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        write!(f, "{}", self.name)?;
        for _ in 0..self.pointer_depth {
            write!(f, "*")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self { name: name.into(), ty }
    }
}

/// Structural signature of an inline function. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Unique within a translation unit.
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub return_type: TypeDescriptor,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, return_type: TypeDescriptor) -> Self {
        Self { name: name.into(), parameters: Vec::new(), return_type }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }

    /// SHA-256 over the C rendering of the signature.
    ///
    /// Only used to surface signature drift for a reused body; it is not part
    /// of the stability key.
    pub fn fingerprint(&self) -> String {
        let params: Vec<String> =
            self.parameters.iter().map(|p| format!("{} {}", p.ty, p.name)).collect();
        let rendered = format!("{} {}({})", self.return_type, self.name, params.join(", "));
        sha256_hex(rendered.as_bytes())
    }
}

/// Content digest of an original (untranslated) C body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyHash(String);

impl BodyHash {
    /// Hash the verbatim body text. No normalization is applied: a single
    /// changed byte produces a different hash.
    pub fn of(body: &str) -> Self {
        Self(sha256_hex(body.as_bytes()))
    }

    /// Wrap an already computed digest (e.g. read back from a baseline).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One inline function awaiting translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineFunctionUnit {
    pub signature: FunctionSignature,
    pub original_body: String,
    pub body_hash: BodyHash,
}

impl InlineFunctionUnit {
    /// Build a unit, deriving `body_hash` from `original_body`.
    pub fn new(signature: FunctionSignature, original_body: impl Into<String>) -> Self {
        let original_body = original_body.into();
        let body_hash = BodyHash::of(&original_body);
        Self { signature, original_body, body_hash }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }
}

/// Why a unit could not be translated automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The body calls a compiler builtin with no general safe rewrite.
    UnsupportedIntrinsic,
    /// The rewritten body tripped one or more validator checks.
    ValidationRejected,
    /// The body is outside the C subset the parser understands.
    UnsupportedSyntax,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnsupportedIntrinsic => "unsupported_intrinsic",
            FailureKind::ValidationRejected => "validation_rejected",
            FailureKind::UnsupportedSyntax => "unsupported_syntax",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unsupported_intrinsic" => Some(FailureKind::UnsupportedIntrinsic),
            "validation_rejected" => Some(FailureKind::ValidationRejected),
            "unsupported_syntax" => Some(FailureKind::UnsupportedSyntax),
            _ => None,
        }
    }
}

/// Failure artifact for manual review.
///
/// Both the original C and (when the pipeline got that far) the rewritten text
/// are kept so a reviewer can diagnose without re-running anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub reasons: Vec<String>,
    pub original_source: String,
    pub rewritten_source: Option<String>,
    /// Loud-failure body: commented-out text followed by an unconditional throw.
    pub stub: String,
}

impl Failure {
    /// All reasons joined for diagnostics.
    pub fn reason(&self) -> String {
        self.reasons.join(", ")
    }
}

/// Outcome for exactly one `InlineFunctionUnit` in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TranslationResult {
    /// Freshly rewritten and accepted by the validator.
    Translated { body: String },
    /// Approved body reused verbatim from the stability cache.
    Reused { body: String },
    Failed(Failure),
}

impl TranslationResult {
    /// Body to place in the generated declaration. For failures this is the stub.
    pub fn emitted_body(&self) -> &str {
        match self {
            TranslationResult::Translated { body } | TranslationResult::Reused { body } => body,
            TranslationResult::Failed(failure) => &failure.stub,
        }
    }

    /// Body that may serve as the next baseline, if any.
    pub fn approved_body(&self) -> Option<&str> {
        match self {
            TranslationResult::Translated { body } | TranslationResult::Reused { body } => {
                Some(body)
            }
            TranslationResult::Failed(_) => None,
        }
    }

    pub fn status_str(&self) -> &'static str {
        match self {
            TranslationResult::Translated { .. } => "translated",
            TranslationResult::Reused { .. } => "reused",
            TranslationResult::Failed(_) => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TranslationResult::Failed(_))
    }
}

/// One baseline row: the most recent approved body for a function name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub name: String,
    pub body_hash: BodyHash,
    pub approved_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_fingerprint: Option<String>,
}

impl CacheEntry {
    pub fn new(
        name: impl Into<String>,
        body_hash: BodyHash,
        approved_body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            body_hash,
            approved_body: approved_body.into(),
            signature_fingerprint: None,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: Option<String>) -> Self {
        self.signature_fingerprint = fingerprint;
        self
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
