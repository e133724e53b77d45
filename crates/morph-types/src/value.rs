use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::{ClassId, ClassType, InvokeError, PrimitiveType, Type, TypeEnv, WellKnownTypes};

/// A named constant of an enum class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumConstant {
    pub class: ClassId,
    pub name: Arc<str>,
}

impl EnumConstant {
    pub fn new(class: ClassId, name: impl Into<Arc<str>>) -> Self {
        Self {
            class,
            name: name.into(),
        }
    }
}

/// A shared, growable list.
#[derive(Clone, Default)]
pub struct ListRef(Arc<RwLock<Vec<Value>>>);

impl ListRef {
    pub fn new(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<Value> {
        self.0.read().get(idx).cloned()
    }

    pub fn push(&self, value: Value) {
        self.0.write().push(value);
    }

    pub fn extend(&self, values: impl IntoIterator<Item = Value>) {
        self.0.write().extend(values);
    }

    pub fn clear(&self) {
        self.0.write().clear();
    }

    /// Copy of the current elements. The lock is released before the caller sees them.
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.read().iter()).finish()
    }
}

/// A shared, insertion-ordered, string-keyed map.
#[derive(Clone, Default)]
pub struct MapRef(Arc<RwLock<IndexMap<String, Value>>>);

impl MapRef {
    pub fn new(entries: IndexMap<String, Value>) -> Self {
        Self(Arc::new(RwLock::new(entries)))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.write().insert(key.into(), value)
    }

    pub fn extend(&self, entries: impl IntoIterator<Item = (String, Value)>) {
        self.0.write().extend(entries);
    }

    pub fn clear(&self) {
        self.0.write().clear();
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    pub fn snapshot(&self) -> IndexMap<String, Value> {
        self.0.read().clone()
    }

    pub fn ptr_eq(&self, other: &MapRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.read().iter()).finish()
    }
}

#[derive(Debug)]
struct ObjectData {
    ty: ClassType,
    fields: IndexMap<String, Value>,
}

/// A shared instance of a declared class.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<ObjectData>>);

impl ObjectRef {
    pub fn new(ty: ClassType, fields: IndexMap<String, Value>) -> Self {
        Self(Arc::new(RwLock::new(ObjectData { ty, fields })))
    }

    /// Allocate an instance of `ty` with every instance field of the class chain at its default.
    pub fn instantiate(env: &dyn TypeEnv, ty: ClassType) -> Result<ObjectRef, InvokeError> {
        let def = env.class(ty.def).ok_or(InvokeError::UnknownClass(ty.def))?;
        if !def.is_instantiable() {
            return Err(InvokeError::NotInstantiable(def.name.clone()));
        }

        let mut chain = Vec::new();
        let mut next = Some(ty.def);
        while let Some(id) = next {
            if chain.contains(&id) {
                break;
            }
            chain.push(id);
            next = env
                .class(id)
                .and_then(|def| def.super_class.as_ref())
                .and_then(Type::class_id);
        }

        let mut fields = IndexMap::new();
        for id in chain.into_iter().rev() {
            let Some(def) = env.class(id) else {
                continue;
            };
            for field in def.fields.iter().filter(|f| !f.is_static) {
                fields.insert(field.name.clone(), Value::default_for(&field.ty));
            }
        }
        Ok(ObjectRef::new(ty, fields))
    }

    pub fn class_type(&self) -> ClassType {
        self.0.read().ty.clone()
    }

    pub fn class_id(&self) -> ClassId {
        self.0.read().ty.def
    }

    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.0.read().fields.get(name).cloned()
    }

    /// Returns `false` when the object has no field called `name`.
    pub fn set_field(&self, name: &str, value: Value) -> bool {
        match self.0.write().fields.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn field_names(&self) -> Vec<String> {
        self.0.read().fields.keys().cloned().collect()
    }

    pub fn fields(&self) -> IndexMap<String, Value> {
        self.0.read().fields.clone()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.read();
        f.debug_struct("Object")
            .field("class", &data.ty.def)
            .field("fields", &data.fields)
            .finish()
    }
}

/// A runtime value. Boxed and primitive types share one representation.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Arc<str>),
    Enum(EnumConstant),
    List(ListRef),
    Map(MapRef),
    Object(ObjectRef),
}

impl Value {
    pub fn str(s: impl Into<Arc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(ListRef::new(items))
    }

    pub fn map(entries: IndexMap<String, Value>) -> Value {
        Value::Map(MapRef::new(entries))
    }

    pub fn empty_map() -> Value {
        Value::Map(MapRef::default())
    }

    /// The value a freshly allocated field of type `ty` holds.
    pub fn default_for(ty: &Type) -> Value {
        match ty {
            Type::Primitive(prim) => Value::zero(*prim),
            _ => Value::Null,
        }
    }

    pub fn zero(prim: PrimitiveType) -> Value {
        match prim {
            PrimitiveType::Boolean => Value::Bool(false),
            PrimitiveType::Byte => Value::Byte(0),
            PrimitiveType::Short => Value::Short(0),
            PrimitiveType::Char => Value::Char('\0'),
            PrimitiveType::Int => Value::Int(0),
            PrimitiveType::Long => Value::Long(0),
            PrimitiveType::Float => Value::Float(0.0),
            PrimitiveType::Double => Value::Double(0.0),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Lists, maps and objects are mutable and shared between every holder of the reference.
    pub fn is_shared(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_) | Value::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Identity comparison: shared values must be the same reference, scalars equal.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (a, b) if a.is_shared() || b.is_shared() => false,
            (a, b) => a == b,
        }
    }

    /// The most specific type the runtime representation proves. Lists and maps are raw since
    /// their element types are not recorded; `None` for null.
    pub fn runtime_type(&self, wk: &WellKnownTypes) -> Option<Type> {
        let raw = |id: ClassId| Some(Type::class(id, vec![]));
        match self {
            Value::Null => None,
            Value::Bool(_) => raw(wk.boolean),
            Value::Char(_) => raw(wk.character),
            Value::Byte(_) => raw(wk.byte),
            Value::Short(_) => raw(wk.short),
            Value::Int(_) => raw(wk.integer),
            Value::Long(_) => raw(wk.long),
            Value::Float(_) => raw(wk.float),
            Value::Double(_) => raw(wk.double),
            Value::Str(_) => raw(wk.string),
            Value::Enum(constant) => raw(constant.class),
            Value::List(_) => raw(wk.list),
            Value::Map(_) => raw(wk.map),
            Value::Object(obj) => Some(Type::Class(obj.class_type())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.ptr_eq(b) || a.snapshot() == b.snapshot(),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b) || a.snapshot() == b.snapshot(),
            (Value::Object(a), Value::Object(b)) => {
                a.ptr_eq(b) || (a.class_type() == b.class_type() && a.fields() == b.fields())
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value.into())
    }
}

impl From<EnumConstant> for Value {
    fn from(value: EnumConstant) -> Self {
        Value::Enum(value)
    }
}

impl From<ListRef> for Value {
    fn from(value: ListRef) -> Self {
        Value::List(value)
    }
}

impl From<MapRef> for Value {
    fn from(value: MapRef) -> Self {
        Value::Map(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}
