use crate::syntax::Block;

use super::{Halt, RewriteContext, RewritePass};

/// Maps fixed-width C integer type names to their target primitives wherever
/// a type is written: declarations, casts and `sizeof`.
pub struct TypeNameMapper;

impl RewritePass for TypeNameMapper {
    fn name(&self) -> &'static str {
        "type_names"
    }

    fn apply(&self, body: &mut Block, ctx: &RewriteContext<'_>) -> Result<(), Halt> {
        body.visit_type_names_mut(&mut |ty| {
            if ty.tag.is_none() {
                if let Some(mapped) = ctx.catalog.map_type(&ty.base) {
                    ty.base = mapped.to_string();
                }
            }
        });
        Ok(())
    }
}
