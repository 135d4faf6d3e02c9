use std::collections::HashMap;

use crate::catalog::RationalStruct;
use crate::syntax::{Block, Expr, Stmt, TypeName};

use super::{Halt, RewriteContext, RewritePass};

/// Converts two-element brace initializers of the rational struct into
/// object construction with named fields.
///
/// Handles the declaration form `AVRational r = {a, b};`, the compound literal
/// `(AVRational){a, b}` and bare reassignment `r = {a, b};`. Lists of any other
/// shape are left alone for the validator to report.
pub struct StructLiteralRewriter;

impl RewritePass for StructLiteralRewriter {
    fn name(&self) -> &'static str {
        "struct_literals"
    }

    fn apply(&self, body: &mut Block, ctx: &RewriteContext<'_>) -> Result<(), Halt> {
        let rational = ctx.catalog.rational();
        let locals = declared_types(body);

        body.visit_stmts_mut(&mut |stmt| {
            if let Stmt::Decl(decl) = stmt {
                if is_rational(&decl.ty, rational) {
                    for declarator in decl.declarators.iter_mut().filter(|d| d.pointers == 0) {
                        if let Some(init) = declarator.init.as_mut() {
                            if let Some(object) = object_init(init, rational) {
                                *init = object;
                            }
                        }
                    }
                }
            }
        });

        body.transform_exprs(&mut |expr| match expr {
            Expr::Cast { ty, operand } if is_rational(ty, rational) => {
                if let Some(object) = object_init(operand, rational) {
                    *expr = object;
                }
            }
            Expr::Assign { op: None, target, value } => {
                let target_is_rational = match target.as_ident().and_then(|n| locals.get(n)) {
                    Some(ty) => is_rational(ty, rational),
                    None => true,
                };
                if target_is_rational {
                    if let Some(object) = object_init(value, rational) {
                        **value = object;
                    }
                }
            }
            _ => {}
        });
        Ok(())
    }
}

fn is_rational(ty: &TypeName, rational: &RationalStruct) -> bool {
    ty.base == rational.type_name && !ty.is_pointer()
}

fn object_init(expr: &Expr, rational: &RationalStruct) -> Option<Expr> {
    match expr {
        Expr::InitList(items) if items.len() == 2 => Some(Expr::ObjectInit {
            ty: rational.type_name.to_string(),
            fields: vec![
                (rational.numerator.to_string(), items[0].clone()),
                (rational.denominator.to_string(), items[1].clone()),
            ],
        }),
        _ => None,
    }
}

fn declared_types(body: &Block) -> HashMap<String, TypeName> {
    let mut locals = HashMap::new();
    body.walk_stmts(&mut |stmt| {
        if let Stmt::Decl(decl) = stmt {
            for declarator in &decl.declarators {
                locals.insert(declarator.name.clone(), decl.declarator_type(declarator));
            }
        }
    });
    locals
}
