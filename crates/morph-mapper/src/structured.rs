//! Property-wise transfer between structured values.
//!
//! A [`StructuredSource`] exposes named readable values (an object's readable properties or a
//! dynamic map's entries); a [`StructuredSink`] accepts named values (an object's writable
//! properties, a dynamic map, or a builder that is built once every property is in).
//! [`transfer`] moves every property the sink accepts through the [`Mapper`].

use std::sync::Arc;

use morph_schema::{MethodInfo, PropertyInfo, Schema};
use morph_types::{
    format_type, invoke, is_assignable, type_arg_as, MapRef, Type, TypeEnv, Value,
};
use thiserror::Error;

use crate::{Mapper, MappingError, MappingOptions, Result};

/// Named readable values.
pub trait StructuredSource {
    /// Readable names in source order.
    fn names(&self) -> Vec<String>;

    /// The value of `name` with its static type; `None` when the source has no such readable
    /// entry.
    fn read(&self, env: &dyn TypeEnv, name: &str) -> Result<Option<(Value, Type)>>;
}

/// Where a sink wants a named value to go.
#[derive(Debug, Clone)]
pub struct SinkSlot {
    pub ty: Type,
    pub property: Option<PropertyInfo>,
}

/// Named writable slots.
pub trait StructuredSink {
    /// The target type, for diagnostics.
    fn owner(&self) -> &str;

    /// Writable names, or `None` for open sinks that accept any name the source offers.
    fn names(&self) -> Option<Vec<String>>;

    fn slot(&self, name: &str) -> Option<SinkSlot>;

    fn put(&mut self, env: &dyn TypeEnv, name: &str, value: Value) -> Result<()>;

    /// The populated target.
    fn finish(&mut self, env: &dyn TypeEnv) -> Result<Value>;
}

/// The readable properties of an object, read through its getters.
#[derive(Debug, Clone)]
pub struct ObjectSource {
    value: Value,
    schema: Arc<Schema>,
}

impl ObjectSource {
    pub fn new(mapper: &Mapper, value: Value, ty: &Type) -> Result<Self> {
        let schema = mapper.schemas().resolve(ty)?;
        Ok(Self { value, schema })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

impl StructuredSource for ObjectSource {
    fn names(&self) -> Vec<String> {
        self.schema.readable().map(|p| p.name().to_string()).collect()
    }

    fn read(&self, env: &dyn TypeEnv, name: &str) -> Result<Option<(Value, Type)>> {
        let Some(property) = self.schema.property(name) else {
            return Ok(None);
        };
        match property.read(env, &self.value) {
            Some(value) => Ok(Some((value?, property.ty().clone()))),
            None => Ok(None),
        }
    }
}

/// The entries of a dynamic map, all typed by the map's value type.
#[derive(Debug, Clone)]
pub struct MapSource {
    map: MapRef,
    value_type: Type,
}

impl MapSource {
    pub fn new(map: MapRef, value_type: Type) -> Self {
        Self { map, value_type }
    }
}

impl StructuredSource for MapSource {
    fn names(&self) -> Vec<String> {
        self.map.keys()
    }

    fn read(&self, _env: &dyn TypeEnv, name: &str) -> Result<Option<(Value, Type)>> {
        Ok(self
            .map
            .get(name)
            .map(|value| (value, self.value_type.clone())))
    }
}

/// Writes through the setters of an existing object.
#[derive(Debug, Clone)]
pub struct ObjectSink {
    target: Value,
    schema: Arc<Schema>,
    owner: String,
}

impl ObjectSink {
    pub fn new(mapper: &Mapper, target: Value, ty: &Type) -> Result<Self> {
        let schema = mapper.schemas().resolve(ty)?;
        Ok(Self {
            target,
            owner: format_type(mapper.env(), schema.ty()),
            schema,
        })
    }
}

impl StructuredSink for ObjectSink {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn names(&self) -> Option<Vec<String>> {
        Some(writable_names(&self.schema))
    }

    fn slot(&self, name: &str) -> Option<SinkSlot> {
        writable_slot(&self.schema, name)
    }

    fn put(&mut self, env: &dyn TypeEnv, name: &str, value: Value) -> Result<()> {
        write_property(env, &self.schema, &self.target, name, value)
    }

    fn finish(&mut self, _env: &dyn TypeEnv) -> Result<Value> {
        Ok(self.target.clone())
    }
}

/// Inserts into a dynamic map; accepts any name.
#[derive(Debug, Clone)]
pub struct MapSink {
    map: MapRef,
    value_type: Type,
    owner: String,
}

impl MapSink {
    /// A sink over `map`, whose static type is `map_type` (a `Map<String, V>` or a subtype).
    pub fn new(env: &dyn TypeEnv, map: MapRef, map_type: &Type) -> Self {
        Self {
            map,
            value_type: map_value_type(env, map_type),
            owner: format_type(env, map_type),
        }
    }
}

impl StructuredSink for MapSink {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn names(&self) -> Option<Vec<String>> {
        None
    }

    fn slot(&self, _name: &str) -> Option<SinkSlot> {
        Some(SinkSlot {
            ty: self.value_type.clone(),
            property: None,
        })
    }

    fn put(&mut self, _env: &dyn TypeEnv, name: &str, value: Value) -> Result<()> {
        self.map.insert(name, value);
        Ok(())
    }

    fn finish(&mut self, _env: &dyn TypeEnv) -> Result<Value> {
        Ok(Value::Map(self.map.clone()))
    }
}

/// Writes through a builder's setters. A sink created for a message type builds the message on
/// [`StructuredSink::finish`]; a wrapped existing builder is returned as is.
#[derive(Debug, Clone)]
pub struct BuilderSink {
    builder: Value,
    schema: Arc<Schema>,
    build: Option<MethodInfo>,
    owner: String,
}

impl BuilderSink {
    /// A fresh builder for `target_type`, obtained from its static `newBuilder()`. `None` unless
    /// the type declares one and the builder has a `build()` method.
    pub fn create(mapper: &Mapper, target_type: &Type) -> Result<Option<Self>> {
        let env = mapper.env();
        let Some(def) = target_type.class_id().and_then(|id| env.class(id)) else {
            return Ok(None);
        };
        let Some((_, new_builder)) = def.find_method("newBuilder", 0, true) else {
            return Ok(None);
        };
        let builder = invoke(env, new_builder, &Value::Null, &[])?;
        let schema = mapper.schemas().resolve(&new_builder.return_type)?;
        let Some(build) = schema.find_method("build", 0).cloned() else {
            return Ok(None);
        };
        Ok(Some(Self {
            builder,
            owner: format_type(env, target_type),
            schema,
            build: Some(build),
        }))
    }

    pub fn wrap(mapper: &Mapper, builder: Value, builder_type: &Type) -> Result<Self> {
        let schema = mapper.schemas().resolve(builder_type)?;
        Ok(Self {
            builder,
            owner: format_type(mapper.env(), schema.ty()),
            schema,
            build: None,
        })
    }
}

impl StructuredSink for BuilderSink {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn names(&self) -> Option<Vec<String>> {
        Some(writable_names(&self.schema))
    }

    fn slot(&self, name: &str) -> Option<SinkSlot> {
        writable_slot(&self.schema, name)
    }

    fn put(&mut self, env: &dyn TypeEnv, name: &str, value: Value) -> Result<()> {
        write_property(env, &self.schema, &self.builder, name, value)
    }

    fn finish(&mut self, env: &dyn TypeEnv) -> Result<Value> {
        match &self.build {
            Some(build) => Ok(build.invoke(env, &self.builder, &[])?),
            None => Ok(self.builder.clone()),
        }
    }
}

fn writable_names(schema: &Schema) -> Vec<String> {
    schema.writable().map(|p| p.name().to_string()).collect()
}

fn writable_slot(schema: &Schema, name: &str) -> Option<SinkSlot> {
    let property = schema.property(name).filter(|p| p.is_writable())?;
    Some(SinkSlot {
        ty: property.ty().clone(),
        property: Some(property.clone()),
    })
}

fn write_property(
    env: &dyn TypeEnv,
    schema: &Schema,
    target: &Value,
    name: &str,
    value: Value,
) -> Result<()> {
    match schema.property(name).and_then(|p| p.write(env, target, value)) {
        Some(written) => Ok(written?),
        None => Ok(()),
    }
}

/// The value type of a map type; `Object` for raw maps.
pub(crate) fn map_value_type(env: &dyn TypeEnv, map_type: &Type) -> Type {
    type_arg_as(env, map_type, env.well_known().map, 1)
        .unwrap_or_else(|| env.well_known().object_type())
}

/// A source over `value` when it is structured (an object or a dynamic map).
pub fn source_for(
    mapper: &Mapper,
    value: &Value,
    ty: &Type,
) -> Result<Option<Box<dyn StructuredSource>>> {
    Ok(match value {
        Value::Map(map) => Some(Box::new(MapSource::new(
            map.clone(),
            map_value_type(mapper.env(), ty),
        ))),
        Value::Object(_) => {
            let ty = mapper.effective_source_type(value, ty);
            Some(Box::new(ObjectSource::new(mapper, value.clone(), &ty)?))
        }
        _ => None,
    })
}

/// A sink writing into the existing `target`, chosen by its runtime shape.
pub fn sink_for(
    mapper: &Mapper,
    target: &Value,
    ty: &Type,
) -> Result<Option<Box<dyn StructuredSink>>> {
    let env = mapper.env();
    Ok(match target {
        Value::Map(map) => {
            let ty = match ty {
                Type::Class(_) => ty.clone(),
                _ => env.well_known().dynamic_map(),
            };
            Some(Box::new(MapSink::new(env, map.clone(), &ty)))
        }
        Value::Object(_) => {
            let ty = mapper.effective_source_type(target, ty);
            let builder = Type::class(env.well_known().message_builder, vec![]);
            if is_assignable(env, &ty, &builder) {
                Some(Box::new(BuilderSink::wrap(mapper, target.clone(), &ty)?))
            } else {
                Some(Box::new(ObjectSink::new(mapper, target.clone(), &ty)?))
            }
        }
        _ => None,
    })
}

/// Names written and skipped by a [`transfer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub written: Vec<String>,
    /// Names the sink accepts that were not written: filtered out, null with `ignore_null`, or
    /// without a mapping.
    pub skipped: Vec<String>,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to map property `{property}` of `{owner}`")]
    Property {
        property: String,
        owner: String,
        #[source]
        source: MappingError,
    },
    #[error("no mapping from `{source_type}` for property `{property}` of `{owner}`")]
    NotApplicable {
        property: String,
        owner: String,
        source_type: String,
        target_type: String,
    },
}

impl From<TransferError> for MappingError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Property {
                property,
                owner,
                source,
            } => MappingError::Property {
                property,
                owner,
                source: Box::new(source),
            },
            TransferError::NotApplicable {
                property,
                owner,
                source_type,
                target_type,
            } => MappingError::Property {
                property,
                owner,
                source: Box::new(MappingError::NoMapping {
                    source_type,
                    target_type,
                }),
            },
        }
    }
}

/// Move every property `sink` accepts from `source` through `mapper`.
///
/// For sinks with a fixed set of names, names the source lacks are ignored. Properties no handler
/// can map are skipped, or fail the transfer under [`MappingOptions::strict`].
pub fn transfer(
    mapper: &Mapper,
    source: &dyn StructuredSource,
    sink: &mut dyn StructuredSink,
    options: &MappingOptions,
) -> std::result::Result<TransferReport, TransferError> {
    let env = mapper.env();
    let mut report = TransferReport::default();
    let names = sink.names().unwrap_or_else(|| source.names());

    for name in names {
        if !options.accepts_name(&name) {
            report.skipped.push(name);
            continue;
        }
        let Some(slot) = sink.slot(&name) else {
            continue;
        };
        let property_error = |source: MappingError| TransferError::Property {
            property: name.clone(),
            owner: sink.owner().to_string(),
            source,
        };
        let Some((value, source_type)) = source.read(env, &name).map_err(property_error)? else {
            continue;
        };
        if value.is_null() && options.ignore_null() {
            report.skipped.push(name);
            continue;
        }

        let mapped = match &slot.property {
            Some(property) => {
                mapper.map_property(&value, &source_type, &slot.ty, property, options)
            }
            None => mapper.map(&value, &source_type, &slot.ty, options),
        }
        .map_err(property_error)?;

        match mapped {
            Some(mapped) => {
                sink.put(env, &name, mapped).map_err(|source| TransferError::Property {
                    property: name.clone(),
                    owner: sink.owner().to_string(),
                    source,
                })?;
                report.written.push(name);
            }
            None if options.strict() => {
                return Err(TransferError::NotApplicable {
                    owner: sink.owner().to_string(),
                    source_type: format_type(env, &source_type),
                    target_type: format_type(env, &slot.ty),
                    property: name,
                });
            }
            None => {
                tracing::debug!(
                    target = "morph.mapper",
                    property = %name,
                    owner = sink.owner(),
                    "no mapping for property; skipped"
                );
                report.skipped.push(name);
            }
        }
    }

    Ok(report)
}
