//! inline-port-core
//!
//! Core library for porting C inline function bodies to C#.
//!
//! This crate defines the data model, the restricted C syntax tree, the
//! ordered rewrite chain, the validator, the stability cache and the
//! translator that drives them, plus the project database and generated-file
//! plumbing around a translation run.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends.

pub mod baseline;
pub mod cache;
pub mod catalog;
pub mod db;
pub mod emit;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod rewrite;
pub mod services;
pub mod syntax;
pub mod validate;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
