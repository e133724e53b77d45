//! JSON interop.
//!
//! [`decode`] and [`encode`] convert between JSON text and dynamic trees of [`Value`]s (maps,
//! lists and scalars). [`JsonCodec`] goes through a [`Mapper`] so typed values, beans included,
//! can be read from and written to JSON.

use indexmap::IndexMap;
use morph_mapper::{Mapper, MappingError, MappingOptions};
use morph_types::{format_type, Type, TypeEnv, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("invalid json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cannot encode value as json: {0}")]
    Encode(String),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error("no mapping from `{source_type}` to `{target_type}`")]
    NoMapping {
        source_type: String,
        target_type: String,
    },
}

pub type Result<T, E = JsonError> = std::result::Result<T, E>;

/// Parse `text` into a dynamic tree: objects become maps, arrays lists, integers `Long` and
/// other numbers `Double`.
pub fn decode(text: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(from_tree(json))
}

/// Render a dynamic tree as JSON. Objects are rejected; use [`JsonCodec::to_json`] for those.
pub fn encode(value: &Value) -> Result<String> {
    let tree = to_tree(value, &mut |_| {
        Err(JsonError::Encode(
            "objects are encoded through a `JsonCodec`".to_owned(),
        ))
    })?;
    serde_json::to_string(&tree).map_err(|err| JsonError::Encode(err.to_string()))
}

fn from_tree(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(v) => Value::Long(v),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::from(s),
        serde_json::Value::Array(items) => Value::list(items.into_iter().map(from_tree).collect()),
        serde_json::Value::Object(entries) => Value::map(
            entries
                .into_iter()
                .map(|(key, value)| (key, from_tree(value)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

fn to_tree(
    value: &Value,
    object: &mut dyn FnMut(&Value) -> Result<serde_json::Value>,
) -> Result<serde_json::Value> {
    use serde_json::Value as Json;

    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Char(c) => Json::String(c.to_string()),
        Value::Byte(v) => Json::from(*v),
        Value::Short(v) => Json::from(*v),
        Value::Int(v) => Json::from(*v),
        Value::Long(v) => Json::from(*v),
        Value::Float(v) => float(f64::from(*v))?,
        Value::Double(v) => float(*v)?,
        Value::Str(s) => Json::String(s.to_string()),
        Value::Enum(constant) => Json::String(constant.name.to_string()),
        Value::List(list) => Json::Array(
            list.snapshot()
                .iter()
                .map(|item| to_tree(item, object))
                .collect::<Result<_>>()?,
        ),
        Value::Map(map) => Json::Object(
            map.snapshot()
                .iter()
                .map(|(key, item)| to_tree(item, object).map(|json| (key.clone(), json)))
                .collect::<Result<_>>()?,
        ),
        Value::Object(_) => object(value)?,
    })
}

fn float(v: f64) -> Result<serde_json::Value> {
    serde_json::Number::from_f64(v)
        .map(serde_json::Value::Number)
        .ok_or_else(|| JsonError::Encode(format!("{v} has no json representation")))
}

/// Typed JSON reading and writing through a [`Mapper`].
#[derive(Clone)]
pub struct JsonCodec {
    mapper: Mapper,
    options: MappingOptions,
}

impl JsonCodec {
    pub fn new(mapper: Mapper) -> Self {
        Self {
            mapper,
            options: MappingOptions::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: MappingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Decode `text` and map the tree into `target_type`.
    pub fn from_json(&self, text: &str, target_type: &Type) -> Result<Value> {
        let tree = decode(text)?;
        let source_type = tree_type(self.mapper.env(), &tree);
        self.map(&tree, &source_type, target_type)
    }

    /// Encode `value`, declared as `ty`. Objects, nested ones included, are written as JSON
    /// objects of their readable properties.
    pub fn to_json(&self, value: &Value, ty: &Type) -> Result<String> {
        let tree = match value {
            Value::Object(_) => {
                let dynamic_map = self.mapper.env().well_known().dynamic_map();
                self.map(value, ty, &dynamic_map)?
            }
            _ => value.clone(),
        };
        let json = self.tree(&tree)?;
        tracing::trace!(
            target = "morph.json",
            ty = %format_type(self.mapper.env(), ty),
            "encoded value"
        );
        serde_json::to_string(&json).map_err(|err| JsonError::Encode(err.to_string()))
    }

    fn tree(&self, value: &Value) -> Result<serde_json::Value> {
        let wk = self.mapper.env().well_known();
        let (object_type, dynamic_map) = (wk.object_type(), wk.dynamic_map());
        to_tree(value, &mut |object| {
            let flat = self.map(object, &object_type, &dynamic_map)?;
            self.tree(&flat)
        })
    }

    fn map(&self, value: &Value, source_type: &Type, target_type: &Type) -> Result<Value> {
        self.mapper
            .map(value, source_type, target_type, &self.options)?
            .ok_or_else(|| JsonError::NoMapping {
                source_type: format_type(self.mapper.env(), source_type),
                target_type: format_type(self.mapper.env(), target_type),
            })
    }
}

/// The static type a decoded tree is read as.
fn tree_type(env: &dyn TypeEnv, tree: &Value) -> Type {
    let wk = env.well_known();
    match tree {
        Value::Map(_) => wk.dynamic_map(),
        Value::List(_) => wk.list_of(wk.object_type()),
        other => other
            .runtime_type(wk)
            .unwrap_or_else(|| wk.object_type()),
    }
}
