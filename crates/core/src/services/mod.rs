//! Project-level services built on the core translator.

pub mod translation;

pub use translation::{
    FunctionOutcome, RunOptions, RunReport, TranslationRunner, TranslationServiceError,
};
