use morph_core::{CopyLevel, Flow, ReusePolicy};
use morph_types::{erasure, Bindings, Type, Value, WildcardBound};

use super::fits;
use crate::{MapRequest, Mapper, MapperHandler};

/// Hands the source over unchanged when the copy level and reuse policy allow it.
///
/// Degenerate targets are handled here too: a super-bounded wildcard accepts any value, while
/// unbounded and extends-bounded wildcards and type variables are mapped against their bound,
/// erased when the bound refers back to the variable.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReuseHandler;

impl MapperHandler for ReuseHandler {
    fn name(&self) -> &'static str {
        "reuse"
    }

    fn try_map(&self, mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        let env = mapper.env();
        match req.target_type {
            Type::Wildcard(WildcardBound::Super(_)) => return Ok(Flow::Done(req.source.clone())),
            Type::Wildcard(WildcardBound::Unbounded) => {
                return against(mapper, req, &env.well_known().object_type());
            }
            Type::Wildcard(WildcardBound::Extends(upper)) => return against(mapper, req, upper),
            Type::TypeVar(_) => {
                let bound = mapper
                    .schemas()
                    .type_resolver()
                    .resolve(env, req.target_type, &Bindings::new())?;
                // A recursive bound (`E extends Enum<E>`) still mentions itself; use its erasure.
                let bound = if bound.has_free_vars() {
                    erasure(env, &bound)
                } else {
                    bound
                };
                return against(mapper, req, &bound);
            }
            _ => {}
        }

        if req.options.reuse() == ReusePolicy::Immutable && req.source.is_shared() {
            return Ok(Flow::Continue);
        }
        let reusable = match req.options.copy_level() {
            CopyLevel::Equal => req.source_type == req.target_type,
            CopyLevel::Assignable => fits(env, req.source_type, req.target_type),
        };
        Ok(if reusable {
            Flow::Done(req.source.clone())
        } else {
            Flow::Continue
        })
    }
}

/// Map against `target` instead; no other handler understands the original target.
fn against(mapper: &Mapper, req: &MapRequest<'_>, target: &Type) -> anyhow::Result<Flow<Value>> {
    Ok(match mapper.run(&req.retarget(target))? {
        Some(value) => Flow::Done(value),
        None => Flow::Stop,
    })
}
