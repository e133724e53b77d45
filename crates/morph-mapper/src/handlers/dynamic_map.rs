use morph_core::Flow;
use morph_types::{erasure, is_assignable, MapRef, Type, Value};

use super::defer_to_copy_level;
use crate::structured::map_value_type;
use crate::{
    source_for, transfer, MapRequest, MapSink, Mapper, MapperHandler, MappingError,
    StructuredSink,
};

/// Targets of map type: maps are copied entry by entry against the target value type, objects
/// are flattened into their readable properties.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicMapHandler;

impl MapperHandler for DynamicMapHandler {
    fn name(&self) -> &'static str {
        "dynamic-map"
    }

    fn try_map(&self, mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        let env = mapper.env();
        let hash_map = Type::class(env.well_known().hash_map, vec![]);
        let erased = erasure(env, req.target_type);
        if !matches!(req.target_type, Type::Class(_))
            || !is_assignable(env, &hash_map, &erased)
            || defer_to_copy_level(env, req)
        {
            return Ok(Flow::Continue);
        }

        match req.source {
            Value::Map(map) => {
                let source_value = map_value_type(env, req.source_type);
                let target_value = map_value_type(env, req.target_type);
                let out = MapRef::new(Default::default());
                for (key, value) in map.snapshot() {
                    match mapper.map(&value, &source_value, &target_value, req.options)? {
                        Some(mapped) => {
                            out.insert(key, mapped);
                        }
                        None => return Ok(Flow::Stop),
                    }
                }
                Ok(Flow::Done(Value::Map(out)))
            }
            // Objects only flatten into an actual map type.
            Value::Object(_) if erased != env.well_known().object_type() => {
                let Some(source) = source_for(mapper, req.source, req.source_type)? else {
                    return Ok(Flow::Continue);
                };
                let mut sink = MapSink::new(env, MapRef::new(Default::default()), req.target_type);
                transfer(mapper, source.as_ref(), &mut sink, req.options)
                    .map_err(MappingError::from)?;
                Ok(Flow::Done(sink.finish(env)?))
            }
            _ => Ok(Flow::Continue),
        }
    }
}
