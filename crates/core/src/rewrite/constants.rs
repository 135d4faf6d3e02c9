use crate::catalog::Catalog;
use crate::syntax::ast::{BinaryOp, LongWidth, UnaryOp};
use crate::syntax::{Block, Expr, Stmt};

use super::{Halt, RewriteContext, RewritePass};

/// Replaces numeric-limit spellings with target constants and normalises
/// integer literals: suffixes (`LL` -> `L`, `ULL` -> `UL`; `U` is kept) and
/// octal digits, which the target would read as decimal (`010` -> `8`).
///
/// Runs top-down so `-2147483647 - 1` is seen whole before its inner literal
/// would be mapped to `int.MaxValue`.
pub struct ConstantRewriter;

impl RewritePass for ConstantRewriter {
    fn name(&self) -> &'static str {
        "constants"
    }

    fn apply(&self, body: &mut Block, ctx: &RewriteContext<'_>) -> Result<(), Halt> {
        for stmt in &mut body.stmts {
            visit_stmt(stmt, ctx.catalog);
        }
        Ok(())
    }
}

fn visit_stmt(stmt: &mut Stmt, catalog: &Catalog) {
    match stmt {
        Stmt::Decl(decl) => {
            for declarator in &mut decl.declarators {
                if let Some(init) = declarator.init.as_mut() {
                    rewrite_expr(init, catalog);
                }
            }
        }
        Stmt::Expr(expr) | Stmt::Return(Some(expr)) => rewrite_expr(expr, catalog),
        Stmt::If { cond, then, otherwise } => {
            rewrite_expr(cond, catalog);
            visit_stmt(then, catalog);
            if let Some(otherwise) = otherwise {
                visit_stmt(otherwise, catalog);
            }
        }
        Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
            rewrite_expr(cond, catalog);
            visit_stmt(body, catalog);
        }
        Stmt::For { init, cond, step, body } => {
            if let Some(init) = init {
                visit_stmt(init, catalog);
            }
            if let Some(cond) = cond {
                rewrite_expr(cond, catalog);
            }
            if let Some(step) = step {
                rewrite_expr(step, catalog);
            }
            visit_stmt(body, catalog);
        }
        Stmt::Block(block) => {
            for stmt in &mut block.stmts {
                visit_stmt(stmt, catalog);
            }
        }
        Stmt::Return(None) | Stmt::Break | Stmt::Continue | Stmt::Empty => {}
    }
}

fn rewrite_expr(expr: &mut Expr, catalog: &Catalog) {
    if let Some(replacement) = replacement(expr, catalog) {
        *expr = replacement;
        return;
    }
    if let Expr::Int(lit) = expr {
        if lit.suffix.long == LongWidth::LongLong {
            lit.suffix.long = LongWidth::Long;
        }
        if lit.is_octal() {
            if let Some(value) = lit.value() {
                lit.digits = value.to_string();
            }
        }
        return;
    }
    for child in expr.children_mut() {
        rewrite_expr(child, catalog);
    }
}

fn replacement(expr: &Expr, catalog: &Catalog) -> Option<Expr> {
    match expr {
        Expr::Ident(name) if name == "NULL" => Some(Expr::Null),
        Expr::Ident(name) => catalog.map_macro(name).map(|c| Expr::Named(c.to_string())),
        Expr::Int(_) => max_constant(expr, catalog).map(|c| Expr::Named(c.to_string())),
        // `-MAX - 1`
        Expr::Binary { op: BinaryOp::Sub, lhs, rhs } => {
            let Expr::Unary { op: UnaryOp::Neg, operand } = lhs.unparen() else {
                return None;
            };
            if !is_one(rhs.unparen()) {
                return None;
            }
            let max = max_constant(operand.unparen(), catalog)?;
            catalog.min_for(max).map(|c| Expr::Named(c.to_string()))
        }
        _ => None,
    }
}

fn max_constant(expr: &Expr, catalog: &Catalog) -> Option<&'static str> {
    match expr {
        Expr::Int(lit) if !lit.suffix.unsigned => {
            catalog.map_limit_literal(lit.value()?, lit.suffix.is_long())
        }
        Expr::Ident(name) => catalog.map_macro(name),
        _ => None,
    }
}

fn is_one(expr: &Expr) -> bool {
    matches!(expr, Expr::Int(lit) if lit.value() == Some(1) && !lit.suffix.unsigned)
}
