use morph_core::Flow;

use crate::{MethodInfo, SchemaContext, SchemaHandler};

/// Names that look like record-style accessors but never are.
const EXCLUDED: &[&str] = &[
    "build",
    "clone",
    "equals",
    "getClass",
    "hashCode",
    "newBuilder",
    "toBuilder",
    "toString",
];

/// Record/fluent conventions: `x()` getters and `x(v)` setters.
///
/// Not part of the default chain; add it with `HandlerChain::add_last` so that bean-style names
/// are still claimed by the bean recognizer first.
#[derive(Debug, Default, Clone, Copy)]
pub struct FluentAccessorHandler;

impl SchemaHandler for FluentAccessorHandler {
    fn name(&self) -> &'static str {
        "fluent"
    }

    fn try_schema(
        &self,
        ctx: &mut SchemaContext<'_>,
        method: &MethodInfo,
    ) -> anyhow::Result<Flow<()>> {
        let name = method.name.as_str();
        if EXCLUDED.contains(&name) || !name.starts_with(|c: char| c.is_lowercase()) {
            return Ok(Flow::Continue);
        }
        match method.arity() {
            0 if !method.is_void() => {
                ctx.add_getter(name, method);
                Ok(Flow::Done(()))
            }
            1 => {
                ctx.add_setter(name, method);
                Ok(Flow::Done(()))
            }
            _ => Ok(Flow::Continue),
        }
    }
}
