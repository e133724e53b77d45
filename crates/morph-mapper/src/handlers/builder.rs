use morph_core::Flow;
use morph_types::Value;

use super::defer_to_copy_level;
use crate::{
    source_for, transfer, BuilderSink, MapRequest, Mapper, MapperHandler, MappingError,
    StructuredSink,
};

/// Targets built through a static `newBuilder()`: the source's properties are written to a fresh
/// builder, which is then built.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuilderHandler;

impl MapperHandler for BuilderHandler {
    fn name(&self) -> &'static str {
        "builder"
    }

    fn try_map(&self, mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        let env = mapper.env();
        if !matches!(req.source, Value::Object(_) | Value::Map(_)) || defer_to_copy_level(env, req)
        {
            return Ok(Flow::Continue);
        }
        let Some(source) = source_for(mapper, req.source, req.source_type)? else {
            return Ok(Flow::Continue);
        };
        let Some(mut sink) = BuilderSink::create(mapper, req.target_type)? else {
            return Ok(Flow::Continue);
        };
        transfer(mapper, source.as_ref(), &mut sink, req.options).map_err(MappingError::from)?;
        Ok(Flow::Done(sink.finish(env)?))
    }
}
