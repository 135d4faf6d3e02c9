use crate::catalog::INT_MAX_VALUE;
use crate::syntax::ast::{DeclStyle, Declaration, Declarator, TypeTag};
use crate::syntax::{Block, Expr, Stmt, TypeName};

use super::{Halt, RewriteContext, RewritePass};

/// Turns local declarations into type-inferred `var` declarations.
///
/// The declared type is kept as a cast on the initializer (`var x = (T)init;`)
/// so the local has the C type rather than the initializer's type. The cast is
/// left out when the initializer already has that type: a cast to the same
/// type, a brace list, or a plain literal whose natural type matches.
///
/// Return statements are a separate node kind, so they can never be mistaken
/// for a declaration here. Union-typed locals are left for the punning pass.
pub struct DeclarationRewriter;

impl RewritePass for DeclarationRewriter {
    fn name(&self) -> &'static str {
        "declarations"
    }

    fn apply(&self, body: &mut Block, _ctx: &RewriteContext<'_>) -> Result<(), Halt> {
        body.visit_stmts_mut(&mut |stmt| {
            if let Stmt::Decl(decl) = stmt {
                if decl.ty.tag != Some(TypeTag::Union) {
                    decl.style = DeclStyle::Inferred;
                    keep_declared_types(decl);
                }
            }
        });
        Ok(())
    }
}

fn keep_declared_types(decl: &mut Declaration) {
    let types: Vec<TypeName> = decl.declarators.iter().map(|d| decl.declarator_type(d)).collect();
    for (declarator, ty) in decl.declarators.iter_mut().zip(types) {
        wrap_initializer(declarator, ty);
    }
}

fn wrap_initializer(declarator: &mut Declarator, ty: TypeName) {
    let Some(init) = declarator.init.take() else {
        return;
    };
    declarator.init = Some(if already_typed(&init, &ty) {
        init
    } else {
        Expr::Cast { ty, operand: init.boxed() }
    });
}

fn already_typed(init: &Expr, ty: &TypeName) -> bool {
    match init.unparen() {
        Expr::InitList(_) | Expr::ObjectInit { .. } => true,
        Expr::Cast { ty: cast, .. } => same_type(cast, ty),
        Expr::Int(lit) if plain(ty, "int") => {
            !lit.suffix.unsigned
                && !lit.suffix.is_long()
                && lit.value().is_some_and(|v| v <= INT_MAX_VALUE)
        }
        Expr::Float(text) if plain(ty, "double") => {
            !text.ends_with(['f', 'F', 'l', 'L'])
        }
        _ => false,
    }
}

fn plain(ty: &TypeName, base: &str) -> bool {
    ty.tag.is_none() && !ty.is_pointer() && ty.base == base
}

fn same_type(a: &TypeName, b: &TypeName) -> bool {
    a.tag == b.tag && a.base.trim() == b.base.trim() && a.pointer_depth() == b.pointer_depth()
}
