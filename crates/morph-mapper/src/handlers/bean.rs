use morph_core::Flow;
use morph_types::{instantiate_as_supertype, ObjectRef, Type, Value};

use super::defer_to_copy_level;
use crate::{
    source_for, transfer, MapRequest, Mapper, MapperHandler, MappingError, ObjectSink,
    StructuredSink,
};

/// Structured sources into a freshly instantiated object of the target class, property by
/// property. Properties without a mapping are skipped.
///
/// An `Object` target receives a copy of an object source's own class.
#[derive(Debug, Default, Clone, Copy)]
pub struct BeanHandler;

impl MapperHandler for BeanHandler {
    fn name(&self) -> &'static str {
        "bean"
    }

    fn try_map(&self, mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        let env = mapper.env();
        let wk = env.well_known();
        let Type::Class(target) = req.target_type else {
            return Ok(Flow::Continue);
        };
        let class = match req.source {
            Value::Object(obj) if target.def == wk.object => obj.class_type(),
            Value::Object(_) | Value::Map(_) => target.clone(),
            _ => return Ok(Flow::Continue),
        };
        let Some(def) = env.class(class.def) else {
            return Ok(Flow::Continue);
        };
        let target_type = Type::Class(class.clone());
        let container = [wk.iterable, wk.map]
            .into_iter()
            .any(|id| instantiate_as_supertype(env, &target_type, id).is_some());
        if !def.is_instantiable()
            || class.def == wk.object
            || wk.is_scalar_class(class.def)
            || container
            || defer_to_copy_level(env, req)
        {
            return Ok(Flow::Continue);
        }

        let Some(source) = source_for(mapper, req.source, req.source_type)? else {
            return Ok(Flow::Continue);
        };
        let object = ObjectRef::instantiate(env, class).map_err(MappingError::from)?;
        let mut sink = ObjectSink::new(mapper, Value::Object(object), &target_type)?;
        transfer(mapper, source.as_ref(), &mut sink, req.options).map_err(MappingError::from)?;
        Ok(Flow::Done(sink.finish(env)?))
    }
}
