use indexmap::IndexMap;
use morph_core::Flow;
use morph_types::{Type, TypeEnv};

use crate::MethodInfo;

/// Recognises accessors as property getters or setters.
///
/// The resolver offers every public instance method of a type to the chain, first handler to
/// last. A handler claims a method by returning [`Flow::Done`], usually after registering it on
/// the context; [`Flow::Continue`] passes the method on; [`Flow::Stop`] ends discovery for the
/// whole type and the schema is built from whatever has been registered so far.
pub trait SchemaHandler: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn try_schema(
        &self,
        ctx: &mut SchemaContext<'_>,
        method: &MethodInfo,
    ) -> anyhow::Result<Flow<()>>;
}

#[derive(Debug, Clone)]
pub(crate) struct Accessor {
    pub method: MethodInfo,
    pub ty: Type,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Slot {
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
}

/// The in-progress schema a [`SchemaHandler`] registers accessors on.
pub struct SchemaContext<'a> {
    env: &'a dyn TypeEnv,
    ty: &'a Type,
    slots: IndexMap<String, Slot>,
}

impl<'a> SchemaContext<'a> {
    pub(crate) fn new(env: &'a dyn TypeEnv, ty: &'a Type) -> Self {
        Self {
            env,
            ty,
            slots: IndexMap::new(),
        }
    }

    pub fn env(&self) -> &'a dyn TypeEnv {
        self.env
    }

    /// The type whose schema is being built.
    pub fn ty(&self) -> &'a Type {
        self.ty
    }

    /// Register `method` as the getter of `name`, typed by its return type. The first getter
    /// registered for a name wins; returns whether this one was recorded.
    pub fn add_getter(&mut self, name: impl Into<String>, method: &MethodInfo) -> bool {
        let ty = method.return_type.clone();
        self.add_getter_typed(name, method, ty)
    }

    pub fn add_getter_typed(&mut self, name: impl Into<String>, method: &MethodInfo, ty: Type) -> bool {
        let slot = self.slots.entry(name.into()).or_default();
        if slot.getter.is_some() {
            return false;
        }
        slot.getter = Some(Accessor {
            method: method.clone(),
            ty,
        });
        true
    }

    /// Register `method` as the setter of `name`, typed by its first parameter.
    pub fn add_setter(&mut self, name: impl Into<String>, method: &MethodInfo) -> bool {
        let Some(ty) = method.params.first().cloned() else {
            return false;
        };
        self.add_setter_typed(name, method, ty)
    }

    /// Register a setter whose property type differs from its parameter type, e.g. a protobuf
    /// `addAllX(Iterable<? extends E>)` writing a `List<E>` property.
    pub fn add_setter_typed(&mut self, name: impl Into<String>, method: &MethodInfo, ty: Type) -> bool {
        let slot = self.slots.entry(name.into()).or_default();
        if slot.setter.is_some() {
            return false;
        }
        slot.setter = Some(Accessor {
            method: method.clone(),
            ty,
        });
        true
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub(crate) fn into_slots(self) -> IndexMap<String, Slot> {
        self.slots
    }
}
