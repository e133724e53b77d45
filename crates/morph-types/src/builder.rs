//! Fluent declaration of classes into a [`TypeStore`].

use morph_core::Tag;

use crate::{
    ClassDef, ClassId, ClassKind, FieldDef, MethodBody, MethodDef, NativeMethod, PrimitiveType,
    Type, TypeStore, TypeVarId, Value,
};

/// Declares a class, interface or enum together with its accessor methods.
///
/// ```
/// # use morph_types::{ClassBuilder, Type, TypeStore};
/// let mut store = TypeStore::with_builtins();
/// let string = store.well_known().string_type();
/// let person = ClassBuilder::class("com.example.Person")
///     .property("name", string)
///     .property("age", Type::int())
///     .define(&mut store);
/// # let _ = person;
/// ```
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    def: ClassDef,
}

impl ClassBuilder {
    fn new(name: &str, kind: ClassKind) -> Self {
        Self {
            def: ClassDef::new(name, kind),
        }
    }

    pub fn class(name: &str) -> Self {
        Self::new(name, ClassKind::Class)
    }

    pub fn abstract_class(name: &str) -> Self {
        let mut builder = Self::new(name, ClassKind::Class);
        builder.def.is_abstract = true;
        builder
    }

    pub fn interface(name: &str) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    pub fn enumeration(name: &str) -> Self {
        Self::new(name, ClassKind::Enum)
    }

    #[must_use]
    pub fn type_params(mut self, params: impl IntoIterator<Item = TypeVarId>) -> Self {
        self.def.type_params.extend(params);
        self
    }

    #[must_use]
    pub fn extends(mut self, super_class: Type) -> Self {
        self.def.super_class = Some(super_class);
        self
    }

    #[must_use]
    pub fn implements(mut self, iface: Type) -> Self {
        self.def.interfaces.push(iface);
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.def.tags.push(tag);
        self
    }

    /// A private field with no accessors.
    #[must_use]
    pub fn field(mut self, name: &str, ty: Type) -> Self {
        self.def.fields.push(FieldDef::new(name, ty));
        self
    }

    /// A field with a JavaBeans getter and setter.
    #[must_use]
    pub fn property(self, name: &str, ty: Type) -> Self {
        self.property_with_tags(name, ty, Vec::new())
    }

    /// A field carrying `tags` with a JavaBeans getter and setter.
    #[must_use]
    pub fn property_with_tags(mut self, name: &str, ty: Type, tags: Vec<Tag>) -> Self {
        let mut field = FieldDef::new(name, ty.clone());
        field.tags = tags;
        self.def.fields.push(field);
        self.def.methods.push(getter(name, ty.clone()));
        self.def.methods.push(setter(name, ty));
        self
    }

    #[must_use]
    pub fn read_only(mut self, name: &str, ty: Type) -> Self {
        self.def.fields.push(FieldDef::new(name, ty.clone()));
        self.def.methods.push(getter(name, ty));
        self
    }

    #[must_use]
    pub fn write_only(mut self, name: &str, ty: Type) -> Self {
        self.def.fields.push(FieldDef::new(name, ty.clone()));
        self.def.methods.push(setter(name, ty));
        self
    }

    #[must_use]
    pub fn method(mut self, method: MethodDef) -> Self {
        self.def.methods.push(method);
        self
    }

    #[must_use]
    pub fn constants<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.def
            .enum_constants
            .extend(names.into_iter().map(str::to_string));
        self
    }

    /// Register the declaration. Classes without an explicit superclass extend `Object`; enums
    /// extend `Enum<Self>`.
    pub fn define(mut self, store: &mut TypeStore) -> ClassId {
        let id = store.intern_class_id(&self.def.name);
        if self.def.super_class.is_none() {
            let wk = store.well_known();
            self.def.super_class = match self.def.kind {
                ClassKind::Class => Some(wk.object_type()),
                ClassKind::Enum => Some(Type::class(wk.enum_, vec![Type::class(id, vec![])])),
                ClassKind::Interface => None,
            };
        }
        store.define_class(id, self.def);
        id
    }
}

fn getter(name: &str, ty: Type) -> MethodDef {
    let prefix = if ty == Type::Primitive(PrimitiveType::Boolean) {
        "is"
    } else {
        "get"
    };
    MethodDef::new(
        format!("{prefix}{}", capitalize(name)),
        vec![],
        ty,
        MethodBody::GetField(name.to_string()),
    )
}

fn setter(name: &str, ty: Type) -> MethodDef {
    MethodDef::new(
        format!("set{}", capitalize(name)),
        vec![ty],
        Type::Void,
        MethodBody::SetField {
            field: name.to_string(),
            fluent: false,
        },
    )
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Ids of a generated message class and its builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageIds {
    pub message: ClassId,
    pub builder: ClassId,
}

#[derive(Debug, Clone)]
enum MessageField {
    Scalar(Type),
    Repeated(Type),
    Map(Type),
}

/// Declares a protobuf-style message class and its `$Builder`, with the accessor surface that
/// generated Java code exposes (`newBuilder`, fluent setters, `addAllX`, `putAllX`, `build`, and
/// the usual noise such as `getXBytes` and `getXCount`).
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    name: String,
    fields: Vec<(String, MessageField)>,
}

impl MessageBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn scalar(mut self, name: &str, ty: Type) -> Self {
        self.fields.push((name.to_string(), MessageField::Scalar(ty)));
        self
    }

    #[must_use]
    pub fn repeated(mut self, name: &str, elem: Type) -> Self {
        self.fields.push((name.to_string(), MessageField::Repeated(elem)));
        self
    }

    /// A `map<string, V>` field.
    #[must_use]
    pub fn map(mut self, name: &str, value: Type) -> Self {
        self.fields.push((name.to_string(), MessageField::Map(value)));
        self
    }

    pub fn define(self, store: &mut TypeStore) -> MessageIds {
        let message = store.intern_class_id(&self.name);
        let builder = store.intern_class_id(&format!("{}$Builder", self.name));
        let wk = store.well_known().clone();
        let message_ty = Type::class(message, vec![]);
        let builder_ty = Type::class(builder, vec![]);
        let string = wk.string_type();
        let int = Type::int();

        let mut message_def = ClassDef::new(&self.name, ClassKind::Class);
        message_def.super_class = Some(wk.object_type());
        message_def.interfaces = vec![Type::class(wk.message, vec![])];

        let mut builder_def = ClassDef::new(format!("{}$Builder", self.name), ClassKind::Class);
        builder_def.super_class = Some(wk.object_type());
        builder_def.interfaces = vec![Type::class(wk.message_builder, vec![])];

        for (name, field) in &self.fields {
            let cap = capitalize(name);
            let get = |suffix: &str, ty: Type| {
                MethodDef::new(
                    format!("get{cap}{suffix}"),
                    vec![],
                    ty,
                    MethodBody::GetField(name.clone()),
                )
            };

            match field {
                MessageField::Scalar(ty) => {
                    message_def.fields.push(FieldDef::new(name, ty.clone()));
                    builder_def.fields.push(FieldDef::new(name, ty.clone()));

                    message_def.methods.push(get("", ty.clone()));
                    builder_def.methods.push(get("", ty.clone()));
                    if *ty == string {
                        message_def.methods.push(get("Bytes", string.clone()));
                        builder_def.methods.push(get("Bytes", string.clone()));
                    }
                    builder_def.methods.push(MethodDef::new(
                        format!("set{cap}"),
                        vec![ty.clone()],
                        builder_ty.clone(),
                        MethodBody::SetField {
                            field: name.clone(),
                            fluent: true,
                        },
                    ));
                }
                MessageField::Repeated(elem) => {
                    let list = wk.list_of(elem.clone());
                    message_def.fields.push(FieldDef::new(name, list.clone()));
                    builder_def.fields.push(FieldDef::new(name, list.clone()));

                    for def in [&mut message_def, &mut builder_def] {
                        def.methods.push(get("List", list.clone()));
                        def.methods.push(MethodDef::new(
                            format!("get{cap}Count"),
                            vec![],
                            int.clone(),
                            MethodBody::Len(name.clone()),
                        ));
                        def.methods.push(MethodDef::new(
                            format!("get{cap}"),
                            vec![int.clone()],
                            elem.clone(),
                            MethodBody::Native(list_index(name.clone())),
                        ));
                    }
                    builder_def.methods.push(MethodDef::new(
                        format!("add{cap}"),
                        vec![elem.clone()],
                        builder_ty.clone(),
                        MethodBody::AppendList(name.clone()),
                    ));
                    builder_def.methods.push(MethodDef::new(
                        format!("addAll{cap}"),
                        vec![Type::class(wk.iterable, vec![Type::extends(elem.clone())])],
                        builder_ty.clone(),
                        MethodBody::ExtendList(name.clone()),
                    ));
                }
                MessageField::Map(value) => {
                    let map = wk.map_of(string.clone(), value.clone());
                    message_def.fields.push(FieldDef::new(name, map.clone()));
                    builder_def.fields.push(FieldDef::new(name, map.clone()));

                    for def in [&mut message_def, &mut builder_def] {
                        def.methods.push(get("Map", map.clone()));
                        def.methods.push(MethodDef::new(
                            format!("get{cap}Count"),
                            vec![],
                            int.clone(),
                            MethodBody::Len(name.clone()),
                        ));
                    }
                    builder_def.methods.push(MethodDef::new(
                        format!("put{cap}"),
                        vec![string.clone(), value.clone()],
                        builder_ty.clone(),
                        MethodBody::PutEntry(name.clone()),
                    ));
                    builder_def.methods.push(MethodDef::new(
                        format!("putAll{cap}"),
                        vec![map.clone()],
                        builder_ty.clone(),
                        MethodBody::ExtendMap(name.clone()),
                    ));
                }
            }

            builder_def.methods.push(MethodDef::new(
                format!("clear{cap}"),
                vec![],
                builder_ty.clone(),
                MethodBody::ClearField(name.clone()),
            ));
        }

        message_def.methods.push(MethodDef::new_static(
            "newBuilder",
            vec![],
            builder_ty.clone(),
            MethodBody::NewInstance(builder),
        ));
        for def in [&mut message_def, &mut builder_def] {
            def.methods.push(MethodDef::new(
                "getDefaultInstanceForType",
                vec![],
                message_ty.clone(),
                MethodBody::NewInstance(message),
            ));
        }
        builder_def.methods.push(MethodDef::new(
            "build",
            vec![],
            message_ty,
            MethodBody::Build(message),
        ));

        store.define_class(message, message_def);
        store.define_class(builder, builder_def);
        MessageIds { message, builder }
    }
}

fn list_index(field: String) -> NativeMethod {
    NativeMethod::new(move |_, receiver, args| {
        let list = receiver
            .as_object()
            .and_then(|obj| obj.get_field(&field))
            .and_then(|value| value.as_list().cloned());
        let idx = args.first().and_then(Value::as_i64).unwrap_or(-1);
        let item = usize::try_from(idx)
            .ok()
            .and_then(|idx| list.and_then(|list| list.get(idx)));
        item.ok_or_else(|| {
            crate::InvokeError::Native(format!("index {idx} out of bounds for `{field}`"))
        })
    })
}
