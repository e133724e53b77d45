use morph_core::Flow;
use morph_schema::PropertyInfo;
use morph_types::{Type, Value};

use crate::{Mapper, MappingOptions};

/// One conversion the pipeline is asked to perform.
#[derive(Debug, Clone, Copy)]
pub struct MapRequest<'a> {
    pub source: &'a Value,
    /// The effective source type: the declared type, or the runtime type of the value when the
    /// declaration says nothing useful (`Object`, a type variable, a wildcard).
    pub source_type: &'a Type,
    pub target_type: &'a Type,
    /// The destination property when mapping into a structured target.
    pub property: Option<&'a PropertyInfo>,
    pub options: &'a MappingOptions,
}

impl<'a> MapRequest<'a> {
    /// The same request against another target type, without destination metadata.
    pub fn retarget(&self, target_type: &'a Type) -> MapRequest<'a> {
        MapRequest {
            target_type,
            property: None,
            ..*self
        }
    }
}

/// One stage of the mapping pipeline.
///
/// [`Flow::Done`] carries the mapped value and ends the pipeline, [`Flow::Continue`] passes the
/// request on, and [`Flow::Stop`] ends the pipeline with no mapping. Handler-local failures are
/// reported as [`anyhow::Error`]; the pipeline attaches the handler name and both types. Errors
/// from nested [`Mapper`] calls are passed through unchanged.
pub trait MapperHandler: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn try_map(&self, mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>>;
}
