//! Structural schemas of types.
//!
//! A [`Schema`] lists the named properties (with resolved types and accessor handles) and public
//! methods of a type. Schemas are built by [`SchemaResolver`] running a chain of
//! [`SchemaHandler`]s over every accessor, and are cached by structural type equality.

use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use morph_core::Tag;
use morph_types::{invoke, ClassId, InvokeError, MethodDef, Type, TypeEnv, Value};
use thiserror::Error;

mod cache;
mod context;
pub mod handlers;
mod naming;
mod resolver;

pub use cache::SchemaCache;
pub use context::{SchemaContext, SchemaHandler};
pub use naming::decapitalize;
pub use resolver::{default_handlers, SchemaResolver};

#[derive(Debug, Error)]
pub enum SchemaResolutionError {
    #[error("schema handler `{handler}` failed for `{ty}`")]
    Handler {
        ty: String,
        handler: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("type substitution for `{ty}` did not terminate within {depth} steps")]
    Substitution { ty: String, depth: usize },
    #[error("unknown class referenced by `{ty}`")]
    UnknownClass { ty: String },
}

pub type Result<T> = std::result::Result<T, SchemaResolutionError>;

/// A public instance method with its signature resolved against the schema's type.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub declaring: ClassId,
    /// Position of the declaration in the declaring class's method list.
    pub index: usize,
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub tags: Vec<Tag>,
}

impl MethodInfo {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_void(&self) -> bool {
        self.return_type == Type::Void
    }

    /// The underlying declaration.
    pub fn def<'a>(&self, env: &'a dyn TypeEnv) -> Option<&'a MethodDef> {
        env.class(self.declaring)?.methods.get(self.index)
    }

    pub fn invoke(
        &self,
        env: &dyn TypeEnv,
        receiver: &Value,
        args: &[Value],
    ) -> std::result::Result<Value, InvokeError> {
        let def = self.def(env).ok_or(InvokeError::UnknownClass(self.declaring))?;
        invoke(env, def, receiver, args)
    }
}

/// One named slot of a [`Schema`]. Readable iff it has a getter, writable iff it has a setter.
#[derive(Clone)]
pub struct PropertyInfo {
    name: String,
    ty: Type,
    getter: Option<MethodInfo>,
    setter: Option<MethodInfo>,
    tags: Vec<Tag>,
    owner: Weak<Schema>,
    owner_type: Type,
}

impl PropertyInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved property type.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn getter(&self) -> Option<&MethodInfo> {
        self.getter.as_ref()
    }

    pub fn setter(&self) -> Option<&MethodInfo> {
        self.setter.as_ref()
    }

    /// Tags from the accessors and from a field sharing the property's name.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }

    /// The schema this property belongs to, while it is still alive.
    pub fn owner(&self) -> Option<Arc<Schema>> {
        self.owner.upgrade()
    }

    pub fn owner_type(&self) -> &Type {
        &self.owner_type
    }

    /// Read the property from `target`. `None` if the property is write-only.
    pub fn read(
        &self,
        env: &dyn TypeEnv,
        target: &Value,
    ) -> Option<std::result::Result<Value, InvokeError>> {
        let getter = self.getter.as_ref()?;
        Some(getter.invoke(env, target, &[]))
    }

    /// Write `value` into `target`. `None` if the property is read-only.
    pub fn write(
        &self,
        env: &dyn TypeEnv,
        target: &Value,
        value: Value,
    ) -> Option<std::result::Result<(), InvokeError>> {
        let setter = self.setter.as_ref()?;
        Some(setter.invoke(env, target, &[value]).map(|_| ()))
    }
}

impl PartialEq for PropertyInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ty == other.ty
            && self.getter == other.getter
            && self.setter == other.setter
            && self.tags == other.tags
            && self.owner_type == other.owner_type
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .field("tags", &self.tags)
            .finish()
    }
}

/// Immutable structural description of a type.
#[derive(Debug, PartialEq)]
pub struct Schema {
    ty: Type,
    properties: IndexMap<String, PropertyInfo>,
    methods: Vec<MethodInfo>,
}

/// A property before it is attached to its owning schema.
#[derive(Debug, Clone)]
pub(crate) struct PropertyParts {
    pub name: String,
    pub ty: Type,
    pub getter: Option<MethodInfo>,
    pub setter: Option<MethodInfo>,
    pub tags: Vec<Tag>,
}

impl Schema {
    pub(crate) fn assemble(
        ty: Type,
        properties: Vec<PropertyParts>,
        methods: Vec<MethodInfo>,
    ) -> Arc<Schema> {
        Arc::new_cyclic(|owner| Schema {
            properties: properties
                .into_iter()
                .map(|parts| {
                    let info = PropertyInfo {
                        name: parts.name.clone(),
                        ty: parts.ty,
                        getter: parts.getter,
                        setter: parts.setter,
                        tags: parts.tags,
                        owner: owner.clone(),
                        owner_type: ty.clone(),
                    };
                    (parts.name, info)
                })
                .collect(),
            ty,
            methods,
        })
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(name)
    }

    /// Properties in discovery order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyInfo> + '_ {
        self.properties.values()
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties.keys().map(String::as_str)
    }

    pub fn readable(&self) -> impl Iterator<Item = &PropertyInfo> + '_ {
        self.properties().filter(|p| p.is_readable())
    }

    pub fn writable(&self) -> impl Iterator<Item = &PropertyInfo> + '_ {
        self.properties().filter(|p| p.is_writable())
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    pub fn find_method(&self, name: &str, arity: usize) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.arity() == arity)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
