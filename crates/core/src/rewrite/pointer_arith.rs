use crate::syntax::Block;

use super::{Halt, RewriteContext, RewritePass};

/// Pointer arithmetic (`p + n`, `p[i]`, `*p++`) has the same spelling in
/// unsafe C#, so this pass leaves the tree as is.
pub struct PointerArithmeticRewriter;

impl RewritePass for PointerArithmeticRewriter {
    fn name(&self) -> &'static str {
        "pointer_arithmetic"
    }

    fn apply(&self, _body: &mut Block, _ctx: &RewriteContext<'_>) -> Result<(), Halt> {
        Ok(())
    }
}
