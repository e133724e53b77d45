use morph_core::{Flow, HandlerChain};
use morph_schema::{PropertyInfo, SchemaResolver};
use morph_types::{format_type, Type, TypeEnv, Value};

use crate::handlers::default_handlers;
use crate::{MapRequest, MapperHandler, MappingError, MappingOptions, Result};

/// Converts values between types by running a chain of [`MapperHandler`]s.
///
/// Cloning is cheap; clones share the schema resolver (and its cache) and the handler chain.
#[derive(Clone)]
pub struct Mapper {
    schemas: SchemaResolver,
    handlers: HandlerChain<dyn MapperHandler>,
}

impl Mapper {
    pub fn new(schemas: SchemaResolver) -> Self {
        Self {
            schemas,
            handlers: default_handlers(),
        }
    }

    /// A mapper running `handlers` over the same schemas.
    #[must_use]
    pub fn with_handlers(&self, handlers: HandlerChain<dyn MapperHandler>) -> Self {
        Self {
            schemas: self.schemas.clone(),
            handlers,
        }
    }

    pub fn handlers(&self) -> &HandlerChain<dyn MapperHandler> {
        &self.handlers
    }

    pub fn schemas(&self) -> &SchemaResolver {
        &self.schemas
    }

    pub fn env(&self) -> &dyn TypeEnv {
        self.schemas.env()
    }

    /// Map `source`, declared as `source_type`, to `target_type`. `Ok(None)` means no handler
    /// could produce a value.
    pub fn map(
        &self,
        source: &Value,
        source_type: &Type,
        target_type: &Type,
        options: &MappingOptions,
    ) -> Result<Option<Value>> {
        self.dispatch(source, source_type, target_type, None, options)
    }

    /// Like [`Mapper::map`], with the destination property visible to handlers.
    pub fn map_property(
        &self,
        source: &Value,
        source_type: &Type,
        target_type: &Type,
        property: &PropertyInfo,
        options: &MappingOptions,
    ) -> Result<Option<Value>> {
        self.dispatch(source, source_type, target_type, Some(property), options)
    }

    /// Like [`Mapper::map`], failing with [`MappingError::NoMapping`] when nothing applies.
    pub fn map_required(
        &self,
        source: &Value,
        source_type: &Type,
        target_type: &Type,
        options: &MappingOptions,
    ) -> Result<Value> {
        self.map(source, source_type, target_type, options)?
            .ok_or_else(|| MappingError::NoMapping {
                source_type: format_type(self.env(), source_type),
                target_type: format_type(self.env(), target_type),
            })
    }

    /// Run the handler chain on a prepared request.
    pub fn run(&self, req: &MapRequest<'_>) -> Result<Option<Value>> {
        for handler in self.handlers.iter() {
            match handler.try_map(self, req) {
                Ok(Flow::Continue) => continue,
                Ok(Flow::Done(value)) => {
                    tracing::trace!(
                        target = "morph.mapper",
                        handler = handler.name(),
                        source = %req.source_type.display(self.env()),
                        target = %req.target_type.display(self.env()),
                        "mapped"
                    );
                    return Ok(Some(value));
                }
                Ok(Flow::Stop) => {
                    tracing::trace!(
                        target = "morph.mapper",
                        handler = handler.name(),
                        "pipeline stopped without a value"
                    );
                    return Ok(None);
                }
                Err(err) => return Err(self.handler_error(handler.name(), req, err)),
            }
        }
        tracing::debug!(
            target = "morph.mapper",
            source = %req.source_type.display(self.env()),
            target = %req.target_type.display(self.env()),
            "no handler applies"
        );
        Ok(None)
    }

    /// The type handlers see for `value` declared as `declared`. Only declarations that say
    /// nothing about the value (`Object`, a variable, a wildcard) give way to its runtime type;
    /// every other declaration is kept so that [`CopyLevel::Equal`](morph_core::CopyLevel)
    /// compares what the caller declared.
    pub fn effective_source_type(&self, value: &Value, declared: &Type) -> Type {
        let wk = self.env().well_known();
        let opaque = match declared {
            Type::TypeVar(_) | Type::Wildcard(_) | Type::Void => true,
            Type::Class(ct) => ct.def == wk.object,
            _ => false,
        };
        match value.runtime_type(wk) {
            Some(runtime) if opaque => runtime,
            _ => declared.clone(),
        }
    }

    fn dispatch(
        &self,
        source: &Value,
        source_type: &Type,
        target_type: &Type,
        property: Option<&PropertyInfo>,
        options: &MappingOptions,
    ) -> Result<Option<Value>> {
        let effective = self.effective_source_type(source, source_type);
        let target_type = options
            .type_override(source_type, target_type)
            .or_else(|| options.type_override(&effective, target_type))
            .unwrap_or(target_type);
        self.run(&MapRequest {
            source,
            source_type: &effective,
            target_type,
            property,
            options,
        })
    }

    fn handler_error(
        &self,
        handler: &'static str,
        req: &MapRequest<'_>,
        err: anyhow::Error,
    ) -> MappingError {
        match err.downcast::<MappingError>() {
            Ok(nested) => nested,
            Err(source) => MappingError::Handler {
                handler,
                source_type: format_type(self.env(), req.source_type),
                target_type: format_type(self.env(), req.target_type),
                source,
            },
        }
    }
}
