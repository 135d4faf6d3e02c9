use crate::syntax::{Block, Expr};

use super::{Halt, RewriteContext, RewritePass};

const BUILTIN_PREFIX: &str = "__builtin_";

/// Halts the chain when the body calls a compiler builtin.
pub struct BuiltinDetector;

impl RewritePass for BuiltinDetector {
    fn name(&self) -> &'static str {
        "builtins"
    }

    fn apply(&self, body: &mut Block, _ctx: &RewriteContext<'_>) -> Result<(), Halt> {
        let mut names: Vec<String> = Vec::new();
        body.walk_exprs(&mut |expr| {
            if let Expr::Ident(name) = expr {
                if name.starts_with(BUILTIN_PREFIX) && !names.contains(name) {
                    names.push(name.clone());
                }
            }
        });
        if names.is_empty() {
            Ok(())
        } else {
            Err(Halt::Intrinsic { names })
        }
    }
}
