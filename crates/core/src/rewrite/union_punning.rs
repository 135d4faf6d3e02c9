use crate::catalog::{Catalog, PunningUnion};
use crate::syntax::ast::{TypeTag, UnaryOp};
use crate::syntax::{Block, Expr, Stmt, TypeName};

use super::{Halt, RewriteContext, RewritePass};

/// Replaces union-based bit reinterpretation with a pointer reinterpreting cast.
///
/// Recognised shape, in either member direction and regardless of how the
/// statements were laid out in the source:
///
/// ```text
/// union av_intfloat32 v;
/// v.f = x;
/// return v.i;
/// ```
///
/// becomes `return *(uint32_t*)&x;` (the type mapper renames the C type next).
pub struct UnionPunningRewriter;

impl RewritePass for UnionPunningRewriter {
    fn name(&self) -> &'static str {
        "union_punning"
    }

    fn apply(&self, body: &mut Block, ctx: &RewriteContext<'_>) -> Result<(), Halt> {
        body.visit_blocks_mut(&mut |block| rewrite_sequences(block, ctx.catalog));
        Ok(())
    }
}

fn rewrite_sequences(block: &mut Block, catalog: &Catalog) {
    let mut idx = 0;
    while idx + 3 <= block.stmts.len() {
        match match_sequence(&block.stmts[idx..idx + 3], catalog) {
            Some(replacement) => {
                block.stmts[idx] = replacement;
                block.stmts.drain(idx + 1..idx + 3);
            }
            None => idx += 1,
        }
    }
}

fn match_sequence(stmts: &[Stmt], catalog: &Catalog) -> Option<Stmt> {
    let (union, var) = union_local(&stmts[0], catalog)?;

    let Stmt::Expr(Expr::Assign { op: None, target, value }) = &stmts[1] else {
        return None;
    };
    let written = member_of(target, var)?;
    let source = value.unparen().as_ident()?;

    let Stmt::Return(Some(read)) = &stmts[2] else {
        return None;
    };
    let read = member_of(read.unparen(), var)?;

    union.member_type(written)?;
    let read_type = union.member_type(read)?;
    if read == written {
        return None;
    }

    let reinterpreted = Expr::Unary {
        op: UnaryOp::Deref,
        operand: Expr::Cast {
            ty: TypeName::pointer_to(read_type, 1),
            operand: Expr::Unary { op: UnaryOp::AddrOf, operand: Expr::ident(source).boxed() }
                .boxed(),
        }
        .boxed(),
    };
    Some(Stmt::Return(Some(reinterpreted)))
}

/// `union <known> name;` with no initializer.
fn union_local<'a>(stmt: &'a Stmt, catalog: &Catalog) -> Option<(&'static PunningUnion, &'a str)> {
    let Stmt::Decl(decl) = stmt else {
        return None;
    };
    if decl.ty.tag != Some(TypeTag::Union) || decl.ty.is_pointer() || decl.declarators.len() != 1 {
        return None;
    }
    let declarator = &decl.declarators[0];
    if declarator.pointers != 0 || declarator.init.is_some() {
        return None;
    }
    let union = catalog.punning_union(&decl.ty.base)?;
    Some((union, declarator.name.as_str()))
}

/// `var.member` -> `member`.
fn member_of<'a>(expr: &'a Expr, var: &str) -> Option<&'a str> {
    match expr {
        Expr::Member { base, field, arrow: false } if base.as_ident() == Some(var) => {
            Some(field.as_str())
        }
        _ => None,
    }
}
