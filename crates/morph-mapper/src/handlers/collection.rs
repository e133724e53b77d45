use morph_core::Flow;
use morph_types::{erasure, is_assignable, type_arg_as, Type, Value};

use super::defer_to_copy_level;
use crate::{MapRequest, Mapper, MapperHandler};

/// Lists to lists and arrays, mapping every element against the target element type. One
/// unmappable element leaves the whole list unmapped.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectionHandler;

impl MapperHandler for CollectionHandler {
    fn name(&self) -> &'static str {
        "collection"
    }

    fn try_map(&self, mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        let env = mapper.env();
        let wk = env.well_known();
        let Value::List(items) = req.source else {
            return Ok(Flow::Continue);
        };
        let target_elem = match req.target_type {
            Type::Array(elem) => (**elem).clone(),
            Type::Class(_) => {
                let list = Type::class(wk.array_list, vec![]);
                if !is_assignable(env, &list, &erasure(env, req.target_type)) {
                    return Ok(Flow::Continue);
                }
                type_arg_as(env, req.target_type, wk.iterable, 0)
                    .unwrap_or_else(|| wk.object_type())
            }
            _ => return Ok(Flow::Continue),
        };
        if defer_to_copy_level(env, req) {
            return Ok(Flow::Continue);
        }
        let source_elem = match req.source_type {
            Type::Array(elem) => (**elem).clone(),
            other => type_arg_as(env, other, wk.iterable, 0).unwrap_or_else(|| wk.object_type()),
        };

        let items = items.snapshot();
        let mut out = Vec::with_capacity(items.len());
        for item in &items {
            match mapper.map(item, &source_elem, &target_elem, req.options)? {
                Some(mapped) => out.push(mapped),
                None => return Ok(Flow::Stop),
            }
        }
        Ok(Flow::Done(Value::list(out)))
    }
}
