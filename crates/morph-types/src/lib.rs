//! Type model and runtime object model for Morph.
//!
//! Types are a small closed set of variants ([`Type`]) over nominal declarations held in a
//! [`TypeStore`]. Declarations carry enough behaviour ([`MethodBody`]) for the engine to read and
//! write properties on runtime [`Value`]s without any host-language reflection.

use std::collections::HashMap;
use std::fmt;

use morph_core::Tag;

mod builder;
mod format;
mod invoke;
mod resolve;
mod store;
mod subtyping;
mod value;

pub use builder::{ClassBuilder, MessageBuilder, MessageIds};
pub use format::{format_type, TypeDisplay};
pub use invoke::{invoke, InvokeError, MethodBody, NativeMethod};
pub use resolve::{Bindings, ResolveError, TypeResolver, DEFAULT_MAX_DEPTH};
pub use store::{TypeStore, WellKnownTypes};
pub use subtyping::{
    boxed_class, erasure, instantiate_as_supertype, is_assignable, type_arg_as, unboxed,
};
pub use value::{EnumConstant, ListRef, MapRef, ObjectRef, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(u32);

impl TypeVarId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean | PrimitiveType::Char)
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

/// A nominal type with its actual type arguments. Empty `args` on a generic class is a raw use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

impl ClassType {
    pub fn new(def: ClassId, args: Vec<Type>) -> Self {
        Self { def, args }
    }

    pub fn raw(def: ClassId) -> Self {
        Self {
            def,
            args: Vec::new(),
        }
    }
}

/// Structural type descriptor. Equality and hashing are structural, which is what the schema
/// cache keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Primitive(PrimitiveType),
    Class(ClassType),
    TypeVar(TypeVarId),
    Wildcard(WildcardBound),
    Array(Box<Type>),
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Type {
        Type::Class(ClassType { def, args })
    }

    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn extends(upper: Type) -> Type {
        Type::Wildcard(WildcardBound::Extends(Box::new(upper)))
    }

    pub fn super_of(lower: Type) -> Type {
        Type::Wildcard(WildcardBound::Super(Box::new(lower)))
    }

    pub fn wildcard() -> Type {
        Type::Wildcard(WildcardBound::Unbounded)
    }

    pub const fn boolean() -> Type {
        Type::Primitive(PrimitiveType::Boolean)
    }

    pub const fn int() -> Type {
        Type::Primitive(PrimitiveType::Int)
    }

    pub const fn long() -> Type {
        Type::Primitive(PrimitiveType::Long)
    }

    pub const fn double() -> Type {
        Type::Primitive(PrimitiveType::Double)
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(ct) => Some(ct),
            _ => None,
        }
    }

    pub fn class_id(&self) -> Option<ClassId> {
        self.as_class().map(|ct| ct.def)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Whether any type variable or wildcard occurs in this type.
    pub fn has_free_vars(&self) -> bool {
        match self {
            Type::TypeVar(_) | Type::Wildcard(_) => true,
            Type::Class(ct) => ct.args.iter().any(Type::has_free_vars),
            Type::Array(elem) => elem.has_free_vars(),
            Type::Void | Type::Primitive(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    pub upper_bounds: Vec<Type>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
    pub tags: Vec<Tag>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub visibility: Visibility,
    pub body: MethodBody,
    pub tags: Vec<Tag>,
}

impl MethodDef {
    /// A public instance method.
    pub fn new(name: impl Into<String>, params: Vec<Type>, return_type: Type, body: MethodBody) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            is_static: false,
            visibility: Visibility::Public,
            body,
            tags: Vec::new(),
        }
    }

    /// A public static method.
    pub fn new_static(
        name: impl Into<String>,
        params: Vec<Type>,
        return_type: Type,
        body: MethodBody,
    ) -> Self {
        Self {
            is_static: true,
            ..Self::new(name, params, return_type, body)
        }
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub is_abstract: bool,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
    pub enum_constants: Vec<String>,
    pub tags: Vec<Tag>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_abstract: false,
            type_params: Vec::new(),
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            enum_constants: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Concrete classes can be instantiated; interfaces, enums and abstract classes cannot.
    pub fn is_instantiable(&self) -> bool {
        self.kind == ClassKind::Class && !self.is_abstract
    }

    /// Direct supertypes in declaration order (superclass first).
    pub fn supertypes(&self) -> impl Iterator<Item = &Type> + '_ {
        self.super_class.iter().chain(self.interfaces.iter())
    }

    pub fn find_method(&self, name: &str, arity: usize, is_static: bool) -> Option<(usize, &MethodDef)> {
        self.methods
            .iter()
            .enumerate()
            .find(|(_, m)| m.name == name && m.params.len() == arity && m.is_static == is_static)
    }
}

/// Read-only view of type declarations.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;
}

/// Replace type variables in `ty` according to `subst`. Variables without a mapping are kept.
pub fn substitute(ty: &Type, subst: &HashMap<TypeVarId, Type>) -> Type {
    match ty {
        Type::TypeVar(id) => subst.get(id).cloned().unwrap_or_else(|| ty.clone()),
        Type::Class(ClassType { def, args }) => Type::class(
            *def,
            args.iter().map(|arg| substitute(arg, subst)).collect(),
        ),
        Type::Array(elem) => Type::array(substitute(elem, subst)),
        Type::Wildcard(WildcardBound::Extends(upper)) => Type::extends(substitute(upper, subst)),
        Type::Wildcard(WildcardBound::Super(lower)) => Type::super_of(substitute(lower, subst)),
        Type::Wildcard(WildcardBound::Unbounded) | Type::Void | Type::Primitive(_) => ty.clone(),
    }
}
