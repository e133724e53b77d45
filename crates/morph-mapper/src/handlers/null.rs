use morph_core::Flow;
use morph_types::Value;

use crate::{MapRequest, Mapper, MapperHandler};

/// Null maps to null, whatever the target.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHandler;

impl MapperHandler for NullHandler {
    fn name(&self) -> &'static str {
        "null"
    }

    fn try_map(&self, _mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        Ok(if req.source.is_null() {
            Flow::Done(Value::Null)
        } else {
            Flow::Continue
        })
    }
}
