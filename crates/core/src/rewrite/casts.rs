use crate::catalog::Catalog;
use crate::syntax::ast::{BinaryOp, UnaryOp};
use crate::syntax::{Block, Expr, TypeName};

use super::{Halt, RewriteContext, RewritePass};

/// Normalises C cast spellings.
///
/// - `const` qualifiers are dropped at every level.
/// - Multi-word spellings (`unsigned int`) collapse to one primitive.
/// - Plain `char` becomes `sbyte` (`byte` behind a pointer); the target's own
///   `char` is an unsigned UTF-16 unit.
/// - `(void *)(intptr_t)x` loses the integer hop; when `x` is a parenthesised
///   conditional, its condition gains an explicit `!= null` test.
pub struct CastRewriter;

const INTEGER_POINTER_TYPES: &[&str] = &["intptr_t", "uintptr_t"];

impl RewritePass for CastRewriter {
    fn name(&self) -> &'static str {
        "casts"
    }

    fn apply(&self, body: &mut Block, ctx: &RewriteContext<'_>) -> Result<(), Halt> {
        body.visit_type_names_mut(&mut |ty| normalize_type(ty, ctx.catalog));
        body.transform_exprs(&mut |expr| {
            if let Expr::Cast { ty, operand } = expr {
                if ty.base == "void" && ty.pointer_depth() == 1 {
                    if let Some(inner) = strip_integer_hop(operand) {
                        **operand = inner;
                    }
                }
            }
        });
        Ok(())
    }
}

fn normalize_type(ty: &mut TypeName, catalog: &Catalog) {
    ty.is_const = false;
    for level in ty.pointers.iter_mut() {
        *level = false;
    }
    if ty.tag.is_none() {
        if ty.base == "char" {
            ty.base = catalog.map_plain_char(ty.is_pointer()).to_string();
        } else if let Some(collapsed) = catalog.map_compound(&ty.base) {
            ty.base = collapsed.to_string();
        }
    }
}

fn strip_integer_hop(operand: &Expr) -> Option<Expr> {
    let Expr::Cast { ty, operand: inner } = operand else {
        return None;
    };
    if ty.is_pointer() || !INTEGER_POINTER_TYPES.contains(&ty.base.as_str()) {
        return None;
    }
    let stripped = match inner.as_ref() {
        Expr::Paren(paren) => match paren.as_ref() {
            Expr::Ternary { cond, then, otherwise } => {
                let cond = if is_boolean_shaped(cond) {
                    cond.as_ref().clone()
                } else {
                    Expr::Binary { op: BinaryOp::Ne, lhs: cond.clone(), rhs: Expr::Null.boxed() }
                };
                let ternary = Expr::Ternary {
                    cond: cond.boxed(),
                    then: then.clone(),
                    otherwise: otherwise.clone(),
                };
                Expr::Paren(ternary.boxed())
            }
            _ => inner.as_ref().clone(),
        },
        other => other.clone(),
    };
    Some(stripped)
}

fn is_boolean_shaped(expr: &Expr) -> bool {
    match expr.unparen() {
        Expr::Binary { op, .. } => op.is_comparison() || op.is_logical(),
        Expr::Unary { op: UnaryOp::Not, .. } => true,
        _ => false,
    }
}
