use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::{ClassId, ClassType, ListRef, MapRef, MethodDef, ObjectRef, TypeEnv, Value};

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("receiver of `{0}` is not an object")]
    NotAnObject(String),
    #[error("class `{class}` has no field `{field}`")]
    UnknownField { class: String, field: String },
    #[error("method `{method}` expects {expected} argument(s), got {found}")]
    Arity {
        method: String,
        expected: usize,
        found: usize,
    },
    #[error("method `{0}` has no body")]
    NotInvocable(String),
    #[error("class `{0}` cannot be instantiated")]
    NotInstantiable(String),
    #[error("unknown class {0:?}")]
    UnknownClass(ClassId),
    #[error("invalid argument for `{method}`: {reason}")]
    InvalidArgument { method: String, reason: String },
    #[error("{0}")]
    Native(String),
}

type NativeFn = dyn Fn(&dyn TypeEnv, &Value, &[Value]) -> Result<Value, InvokeError> + Send + Sync;

/// A method implemented by a Rust closure.
#[derive(Clone)]
pub struct NativeMethod(Arc<NativeFn>);

impl NativeMethod {
    pub fn new(
        f: impl Fn(&dyn TypeEnv, &Value, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativeMethod")
    }
}

/// How a declared method behaves when invoked.
///
/// Field-backed bodies cover the accessor shapes the engine needs to recognise (bean getters and
/// setters, fluent builder setters, protobuf repeated/map accessors, factories and terminal
/// `build`). Anything else is a [`NativeMethod`].
#[derive(Debug, Clone)]
pub enum MethodBody {
    /// Interface or abstract method without an implementation.
    Abstract,
    /// Return the named field.
    GetField(String),
    /// Overwrite the named field; fluent setters return the receiver, others return null.
    SetField { field: String, fluent: bool },
    /// Reset the named field to its empty state and return the receiver.
    ClearField(String),
    /// Push the single argument onto the list held in the named field.
    AppendList(String),
    /// Append every element of the list argument to the list held in the named field.
    ExtendList(String),
    /// Insert `(key, value)` into the map held in the named field.
    PutEntry(String),
    /// Insert every entry of the map argument into the map held in the named field.
    ExtendMap(String),
    /// Size of the list or map held in the named field.
    Len(String),
    /// Allocate a fresh instance of the class.
    NewInstance(ClassId),
    /// Allocate an instance of the class and copy the receiver's same-named fields into it.
    Build(ClassId),
    Native(NativeMethod),
}

/// Invoke `method` on `receiver` (ignored for static methods) with `args`.
pub fn invoke(
    env: &dyn TypeEnv,
    method: &MethodDef,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, InvokeError> {
    if args.len() != method.params.len() {
        return Err(InvokeError::Arity {
            method: method.name.clone(),
            expected: method.params.len(),
            found: args.len(),
        });
    }

    let arg = |idx: usize| {
        args.get(idx)
            .ok_or_else(|| invalid_argument(method, "missing argument"))
    };
    let object = || {
        receiver
            .as_object()
            .ok_or_else(|| InvokeError::NotAnObject(method.name.clone()))
    };

    match &method.body {
        MethodBody::Abstract => Err(InvokeError::NotInvocable(method.name.clone())),
        MethodBody::GetField(name) => read_field(env, object()?, name),
        MethodBody::SetField { field: name, fluent } => {
            let obj = object()?;
            if !obj.set_field(name, arg(0)?.clone()) {
                return Err(unknown_field(env, obj, name));
            }
            Ok(if *fluent { receiver.clone() } else { Value::Null })
        }
        MethodBody::ClearField(name) => {
            let obj = object()?;
            let cleared = match read_field(env, obj, name)? {
                Value::List(_) => Value::List(ListRef::default()),
                Value::Map(_) => Value::Map(MapRef::default()),
                _ => Value::Null,
            };
            obj.set_field(name, cleared);
            Ok(receiver.clone())
        }
        MethodBody::AppendList(name) => {
            let list = list_field(env, object()?, name)?;
            list.push(arg(0)?.clone());
            Ok(receiver.clone())
        }
        MethodBody::ExtendList(name) => {
            let Value::List(items) = arg(0)? else {
                return Err(invalid_argument(method, "expected a list"));
            };
            let list = list_field(env, object()?, name)?;
            // Snapshot first: `items` may alias `list`.
            let items = items.snapshot();
            list.extend(items);
            Ok(receiver.clone())
        }
        MethodBody::PutEntry(name) => {
            let Some(key) = map_key(arg(0)?) else {
                return Err(invalid_argument(method, "map keys must be scalars"));
            };
            let map = map_field(env, object()?, name)?;
            map.insert(key, arg(1)?.clone());
            Ok(receiver.clone())
        }
        MethodBody::ExtendMap(name) => {
            let Value::Map(entries) = arg(0)? else {
                return Err(invalid_argument(method, "expected a map"));
            };
            let map = map_field(env, object()?, name)?;
            let entries = entries.snapshot();
            map.extend(entries);
            Ok(receiver.clone())
        }
        MethodBody::Len(name) => {
            let len = match read_field(env, object()?, name)? {
                Value::List(list) => list.len(),
                Value::Map(map) => map.len(),
                _ => 0,
            };
            Ok(Value::Int(i32::try_from(len).unwrap_or(i32::MAX)))
        }
        MethodBody::NewInstance(class) => {
            Ok(Value::Object(ObjectRef::instantiate(env, ClassType::raw(*class))?))
        }
        MethodBody::Build(class) => build(env, object()?, *class),
        MethodBody::Native(native) => (native.0)(env, receiver, args),
    }
}

fn build(env: &dyn TypeEnv, builder: &ObjectRef, class: ClassId) -> Result<Value, InvokeError> {
    let wk = env.well_known();
    let built = ObjectRef::instantiate(env, ClassType::raw(class))?;
    let def = env.class(class).ok_or(InvokeError::UnknownClass(class))?;
    for field in def.fields.iter().filter(|f| !f.is_static) {
        let value = match builder.get_field(&field.name) {
            // Containers are copied so the built message does not observe later builder edits.
            Some(Value::List(list)) => Value::list(list.snapshot()),
            Some(Value::Map(map)) => Value::map(map.snapshot()),
            Some(Value::Null) | None => match field.ty.class_id() {
                Some(id) if id == wk.list => Value::List(ListRef::default()),
                Some(id) if id == wk.map => Value::Map(MapRef::default()),
                _ => continue,
            },
            Some(value) => value,
        };
        built.set_field(&field.name, value);
    }
    Ok(Value::Object(built))
}

fn read_field(env: &dyn TypeEnv, obj: &ObjectRef, name: &str) -> Result<Value, InvokeError> {
    obj.get_field(name).ok_or_else(|| unknown_field(env, obj, name))
}

fn list_field(env: &dyn TypeEnv, obj: &ObjectRef, name: &str) -> Result<ListRef, InvokeError> {
    match obj.get_field(name) {
        Some(Value::List(list)) => Ok(list),
        Some(_) => {
            let list = ListRef::default();
            obj.set_field(name, Value::List(list.clone()));
            Ok(list)
        }
        None => Err(unknown_field(env, obj, name)),
    }
}

fn map_field(env: &dyn TypeEnv, obj: &ObjectRef, name: &str) -> Result<MapRef, InvokeError> {
    match obj.get_field(name) {
        Some(Value::Map(map)) => Ok(map),
        Some(_) => {
            let map = MapRef::default();
            obj.set_field(name, Value::Map(map.clone()));
            Ok(map)
        }
        None => Err(unknown_field(env, obj, name)),
    }
}

fn map_key(key: &Value) -> Option<String> {
    match key {
        Value::Str(s) => Some(s.to_string()),
        Value::Enum(constant) => Some(constant.name.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Char(c) => Some(c.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Double(v) => Some(v.to_string()),
        other => other.as_i64().map(|v| v.to_string()),
    }
}

fn unknown_field(env: &dyn TypeEnv, obj: &ObjectRef, field: &str) -> InvokeError {
    let class = env
        .class(obj.class_id())
        .map(|def| def.name.clone())
        .unwrap_or_else(|| format!("{:?}", obj.class_id()));
    InvokeError::UnknownField {
        class,
        field: field.to_string(),
    }
}

fn invalid_argument(method: &MethodDef, reason: &str) -> InvokeError {
    InvokeError::InvalidArgument {
        method: method.name.clone(),
        reason: reason.to_string(),
    }
}
