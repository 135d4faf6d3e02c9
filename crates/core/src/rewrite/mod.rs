//! Ordered rewrite chain applied to a parsed inline body.
//!
//! Each pass is a tree transform over `syntax::Block`; the final formatting
//! pass works on rendered text. Order is fixed and observable: struct
//! literals must see the original declaration types, the type mapper must
//! run after union punning has produced its reinterpreting cast, and the
//! builtin scan runs last among the tree passes so its partial output has
//! already been through every other rewrite.

use thiserror::Error;
use tracing::trace;

use crate::catalog::Catalog;
use crate::model::FunctionSignature;
use crate::syntax::{render_block, Block};

mod builtins;
mod casts;
mod constants;
mod declarations;
mod formatting;
mod pointer_arith;
mod struct_literals;
mod type_names;
mod union_punning;

pub use builtins::BuiltinDetector;
pub use casts::CastRewriter;
pub use constants::ConstantRewriter;
pub use declarations::DeclarationRewriter;
pub use formatting::normalize_layout;
pub use pointer_arith::PointerArithmeticRewriter;
pub use struct_literals::StructLiteralRewriter;
pub use type_names::TypeNameMapper;
pub use union_punning::UnionPunningRewriter;

/// Read-only inputs every pass may consult.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub catalog: &'a Catalog,
    pub signature: &'a FunctionSignature,
}

/// Early exit raised by a pass; the unit becomes a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Halt {
    #[error(
        "Function contains __builtin functions that need manual C# implementation ({})",
        .names.join(", ")
    )]
    Intrinsic { names: Vec<String> },
}

/// One step of the chain.
pub trait RewritePass: Send + Sync {
    /// Stable identifier used in trace output.
    fn name(&self) -> &'static str;

    fn apply(&self, body: &mut Block, ctx: &RewriteContext<'_>) -> Result<(), Halt>;
}

/// What the chain produced for one body.
#[derive(Debug, Clone)]
pub enum ChainOutcome {
    /// Every pass ran; `text` is the formatted rendering of `tree`.
    Rewritten { tree: Block, text: String },
    /// A pass halted; `partial_text` is the formatted rendering at that point.
    Halted { halt: Halt, partial_text: String },
}

pub struct RewriteChain {
    passes: Vec<Box<dyn RewritePass>>,
}

impl Default for RewriteChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl RewriteChain {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Register a pass at the end of the chain.
    pub fn register<P: RewritePass + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    /// The fixed production order.
    pub fn standard() -> Self {
        let mut chain = Self::new();
        chain.register(DeclarationRewriter);
        chain.register(StructLiteralRewriter);
        chain.register(UnionPunningRewriter);
        chain.register(TypeNameMapper);
        chain.register(CastRewriter);
        chain.register(ConstantRewriter);
        chain.register(BuiltinDetector);
        chain.register(PointerArithmeticRewriter);
        chain
    }

    /// Tree pass names in application order, followed by the text formatter.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.passes.iter().map(|p| p.name()).collect();
        names.push(formatting::PASS_NAME);
        names
    }

    pub fn run(&self, mut body: Block, ctx: &RewriteContext<'_>) -> ChainOutcome {
        for pass in &self.passes {
            trace!(pass = pass.name(), function = %ctx.signature.name, "applying rewrite pass");
            if let Err(halt) = pass.apply(&mut body, ctx) {
                let partial_text = normalize_layout(&render_block(&body));
                return ChainOutcome::Halted { halt, partial_text };
            }
        }
        let text = normalize_layout(&render_block(&body));
        ChainOutcome::Rewritten { tree: body, text }
    }
}
