//! Unit manifest: the serialized hand-off from the header-parsing side.
//!
//! Format-agnostic serde types; the CLI decides between YAML and JSON.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{FunctionSignature, InlineFunctionUnit, Parameter, TypeDescriptor};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Manifest contains no functions")]
    Empty,
    #[error("Function '{0}' appears more than once in the manifest")]
    DuplicateName(String),
    #[error("Function at index {0} has an empty name")]
    MissingName(usize),
}

/// One inline function as listed in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFunction {
    pub name: String,
    /// One-line documentation carried into the generated `<summary>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub return_type: TypeDescriptor,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Verbatim C body, braces included.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitManifest {
    pub functions: Vec<ManifestFunction>,
}

impl UnitManifest {
    /// Check names are present and unique within the translation unit.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.functions.is_empty() {
            return Err(ManifestError::Empty);
        }
        let mut seen = HashSet::new();
        for (idx, function) in self.functions.iter().enumerate() {
            if function.name.trim().is_empty() {
                return Err(ManifestError::MissingName(idx));
            }
            if !seen.insert(function.name.as_str()) {
                return Err(ManifestError::DuplicateName(function.name.clone()));
            }
        }
        Ok(())
    }

    /// Build translation units (body hashes derived here) in manifest order.
    pub fn to_units(&self) -> Vec<InlineFunctionUnit> {
        self.functions
            .iter()
            .map(|f| {
                let signature = FunctionSignature {
                    name: f.name.clone(),
                    parameters: f.parameters.clone(),
                    return_type: f.return_type.clone(),
                };
                InlineFunctionUnit::new(signature, f.body.clone())
            })
            .collect()
    }

    pub fn summaries(&self) -> Vec<Option<&str>> {
        self.functions.iter().map(|f| f.summary.as_deref()).collect()
    }
}
