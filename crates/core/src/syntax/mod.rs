//! Restricted C body syntax: tokens, tree, parser and target renderer.
//!
//! The rewrite passes operate on the tree produced here rather than on raw
//! text, so every pattern they look for is a node shape, not a regex.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod render;

use thiserror::Error;

pub use ast::{Block, Declarator, Expr, Stmt, TypeName};
pub use parser::parse_body;
pub use render::render_block;

/// Lexing or parsing failure; `offset` is a byte offset into the body text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self { message: message.into(), offset }
    }
}

pub type SyntaxResult<T> = Result<T, SyntaxError>;
