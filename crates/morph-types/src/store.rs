use std::collections::HashMap;

use crate::{
    ClassDef, ClassId, ClassKind, ClassType, PrimitiveType, Type, TypeEnv, TypeParamDef, TypeVarId,
};

/// Ids of the built-in declarations registered by [`TypeStore::with_builtins`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub char_sequence: ClassId,
    pub comparable: ClassId,
    pub number: ClassId,
    pub boolean: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub character: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
    pub enum_: ClassId,
    pub iterable: ClassId,
    pub collection: ClassId,
    pub list: ClassId,
    pub array_list: ClassId,
    pub map: ClassId,
    pub hash_map: ClassId,
    pub message_or_builder: ClassId,
    pub message: ClassId,
    pub message_builder: ClassId,
}

impl WellKnownTypes {
    pub fn object_type(&self) -> Type {
        Type::class(self.object, vec![])
    }

    pub fn string_type(&self) -> Type {
        Type::class(self.string, vec![])
    }

    pub fn list_of(&self, elem: Type) -> Type {
        Type::class(self.list, vec![elem])
    }

    pub fn map_of(&self, key: Type, value: Type) -> Type {
        Type::class(self.map, vec![key, value])
    }

    /// `Map<String, Object>`, the static type of decoded dynamic trees.
    pub fn dynamic_map(&self) -> Type {
        self.map_of(self.string_type(), self.object_type())
    }

    /// The primitive a boxed class wraps, if `id` is one of the boxed classes.
    pub fn unboxed(&self, id: ClassId) -> Option<PrimitiveType> {
        let prim = if id == self.boolean {
            PrimitiveType::Boolean
        } else if id == self.byte {
            PrimitiveType::Byte
        } else if id == self.short {
            PrimitiveType::Short
        } else if id == self.character {
            PrimitiveType::Char
        } else if id == self.integer {
            PrimitiveType::Int
        } else if id == self.long {
            PrimitiveType::Long
        } else if id == self.float {
            PrimitiveType::Float
        } else if id == self.double {
            PrimitiveType::Double
        } else {
            return None;
        };
        Some(prim)
    }

    pub fn boxed(&self, prim: PrimitiveType) -> ClassId {
        match prim {
            PrimitiveType::Boolean => self.boolean,
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Short => self.short,
            PrimitiveType::Char => self.character,
            PrimitiveType::Int => self.integer,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
        }
    }

    /// Classes whose instances are immutable scalars at runtime (strings and boxed primitives).
    pub fn is_scalar_class(&self, id: ClassId) -> bool {
        id == self.string || self.unboxed(id).is_some()
    }
}

/// Registry of nominal type declarations and type parameters.
#[derive(Debug, Clone)]
pub struct TypeStore {
    names: Vec<String>,
    classes: Vec<Option<ClassDef>>,
    class_by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TypeStore {
    /// A store pre-populated with the `java.lang`/`java.util` core and the protobuf marker
    /// interfaces the mapping engine recognises.
    pub fn with_builtins() -> Self {
        let mut names = Vec::new();
        let mut class_by_name = HashMap::new();
        let mut intern = |name: &str| -> ClassId {
            let id = ClassId::from_raw(names.len() as u32);
            names.push(name.to_string());
            class_by_name.insert(name.to_string(), id);
            id
        };

        let well_known = WellKnownTypes {
            object: intern("java.lang.Object"),
            string: intern("java.lang.String"),
            char_sequence: intern("java.lang.CharSequence"),
            comparable: intern("java.lang.Comparable"),
            number: intern("java.lang.Number"),
            boolean: intern("java.lang.Boolean"),
            byte: intern("java.lang.Byte"),
            short: intern("java.lang.Short"),
            character: intern("java.lang.Character"),
            integer: intern("java.lang.Integer"),
            long: intern("java.lang.Long"),
            float: intern("java.lang.Float"),
            double: intern("java.lang.Double"),
            enum_: intern("java.lang.Enum"),
            iterable: intern("java.lang.Iterable"),
            collection: intern("java.util.Collection"),
            list: intern("java.util.List"),
            array_list: intern("java.util.ArrayList"),
            map: intern("java.util.Map"),
            hash_map: intern("java.util.HashMap"),
            message_or_builder: intern("com.google.protobuf.MessageOrBuilder"),
            message: intern("com.google.protobuf.Message"),
            message_builder: intern("com.google.protobuf.Message$Builder"),
        };

        let mut classes = Vec::new();
        classes.resize_with(names.len(), || None);
        let mut store = Self {
            names,
            classes,
            class_by_name,
            type_params: Vec::new(),
            well_known,
        };
        store.define_builtins();
        store
    }

    fn define_builtins(&mut self) {
        let wk = self.well_known.clone();
        let object = Type::class(wk.object, vec![]);
        let class_of = |id: ClassId| Type::class(id, vec![]);

        self.define_class(wk.object, ClassDef::new("java.lang.Object", ClassKind::Class));

        self.define_class(
            wk.char_sequence,
            ClassDef::new("java.lang.CharSequence", ClassKind::Interface),
        );

        let comparable_t = self.add_type_param("T", vec![object.clone()]);
        let mut comparable = ClassDef::new("java.lang.Comparable", ClassKind::Interface);
        comparable.type_params = vec![comparable_t];
        self.define_class(wk.comparable, comparable);

        let mut string = ClassDef::new("java.lang.String", ClassKind::Class);
        string.super_class = Some(object.clone());
        string.interfaces = vec![
            class_of(wk.char_sequence),
            Type::class(wk.comparable, vec![class_of(wk.string)]),
        ];
        self.define_class(wk.string, string);

        let mut number = ClassDef::new("java.lang.Number", ClassKind::Class);
        number.is_abstract = true;
        number.super_class = Some(object.clone());
        self.define_class(wk.number, number);

        let numeric = [wk.byte, wk.short, wk.integer, wk.long, wk.float, wk.double];
        for id in numeric {
            let mut def = ClassDef::new(self.names[id.to_raw() as usize].clone(), ClassKind::Class);
            def.super_class = Some(class_of(wk.number));
            def.interfaces = vec![Type::class(wk.comparable, vec![class_of(id)])];
            self.define_class(id, def);
        }
        for id in [wk.boolean, wk.character] {
            let mut def = ClassDef::new(self.names[id.to_raw() as usize].clone(), ClassKind::Class);
            def.super_class = Some(object.clone());
            def.interfaces = vec![Type::class(wk.comparable, vec![class_of(id)])];
            self.define_class(id, def);
        }

        // class Enum<E extends Enum<E>> implements Comparable<E>
        let enum_e = self.add_type_param("E", vec![]);
        self.set_type_param_bounds(enum_e, vec![Type::class(wk.enum_, vec![Type::TypeVar(enum_e)])]);
        let mut enum_def = ClassDef::new("java.lang.Enum", ClassKind::Class);
        enum_def.is_abstract = true;
        enum_def.type_params = vec![enum_e];
        enum_def.super_class = Some(object.clone());
        enum_def.interfaces = vec![Type::class(wk.comparable, vec![Type::TypeVar(enum_e)])];
        self.define_class(wk.enum_, enum_def);

        let iterable_t = self.add_type_param("T", vec![object.clone()]);
        let mut iterable = ClassDef::new("java.lang.Iterable", ClassKind::Interface);
        iterable.type_params = vec![iterable_t];
        self.define_class(wk.iterable, iterable);

        let collection_e = self.add_type_param("E", vec![object.clone()]);
        let mut collection = ClassDef::new("java.util.Collection", ClassKind::Interface);
        collection.type_params = vec![collection_e];
        collection.interfaces = vec![Type::class(wk.iterable, vec![Type::TypeVar(collection_e)])];
        self.define_class(wk.collection, collection);

        let list_e = self.add_type_param("E", vec![object.clone()]);
        let mut list = ClassDef::new("java.util.List", ClassKind::Interface);
        list.type_params = vec![list_e];
        list.interfaces = vec![Type::class(wk.collection, vec![Type::TypeVar(list_e)])];
        self.define_class(wk.list, list);

        let array_list_e = self.add_type_param("E", vec![object.clone()]);
        let mut array_list = ClassDef::new("java.util.ArrayList", ClassKind::Class);
        array_list.type_params = vec![array_list_e];
        array_list.super_class = Some(object.clone());
        array_list.interfaces = vec![Type::class(wk.list, vec![Type::TypeVar(array_list_e)])];
        self.define_class(wk.array_list, array_list);

        let map_k = self.add_type_param("K", vec![object.clone()]);
        let map_v = self.add_type_param("V", vec![object.clone()]);
        let mut map = ClassDef::new("java.util.Map", ClassKind::Interface);
        map.type_params = vec![map_k, map_v];
        self.define_class(wk.map, map);

        let hash_map_k = self.add_type_param("K", vec![object.clone()]);
        let hash_map_v = self.add_type_param("V", vec![object.clone()]);
        let mut hash_map = ClassDef::new("java.util.HashMap", ClassKind::Class);
        hash_map.type_params = vec![hash_map_k, hash_map_v];
        hash_map.super_class = Some(object.clone());
        hash_map.interfaces = vec![Type::class(
            wk.map,
            vec![Type::TypeVar(hash_map_k), Type::TypeVar(hash_map_v)],
        )];
        self.define_class(wk.hash_map, hash_map);

        self.define_class(
            wk.message_or_builder,
            ClassDef::new("com.google.protobuf.MessageOrBuilder", ClassKind::Interface),
        );
        let mut message = ClassDef::new("com.google.protobuf.Message", ClassKind::Interface);
        message.interfaces = vec![class_of(wk.message_or_builder)];
        self.define_class(wk.message, message);
        let mut message_builder =
            ClassDef::new("com.google.protobuf.Message$Builder", ClassKind::Interface);
        message_builder.interfaces = vec![class_of(wk.message_or_builder)];
        self.define_class(wk.message_builder, message_builder);
    }

    /// Return the id for `name`, allocating an undefined placeholder if needed.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.class_by_name.get(name) {
            return *id;
        }
        let id = ClassId::from_raw(self.names.len() as u32);
        self.names.push(name.to_string());
        self.classes.push(None);
        self.class_by_name.insert(name.to_string(), id);
        id
    }

    /// Install (or overwrite) the declaration for a previously interned id.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        let idx = id.to_raw() as usize;
        if idx >= self.classes.len() {
            self.classes.resize_with(idx + 1, || None);
            self.names.resize_with(idx + 1, String::new);
        }
        if self.names[idx] != def.name {
            self.class_by_name.remove(&self.names[idx]);
            self.names[idx] = def.name.clone();
            self.class_by_name.insert(def.name.clone(), id);
        }
        self.classes[idx] = Some(def);
    }

    /// Define `def`, reusing the id already associated with its name.
    pub fn upsert_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId::from_raw(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
        });
        id
    }

    /// Replace the bounds of an existing type parameter. Needed for self-referential bounds such
    /// as `T extends Comparable<T>`, where the bound mentions the variable itself.
    pub fn set_type_param_bounds(&mut self, id: TypeVarId, upper_bounds: Vec<Type>) {
        if let Some(param) = self.type_params.get_mut(id.to_raw() as usize) {
            param.upper_bounds = upper_bounds;
        }
    }

    pub fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_by_name.get(name).copied()
    }

    pub fn class_name(&self, id: ClassId) -> Option<&str> {
        self.names.get(id.to_raw() as usize).map(String::as_str)
    }

    /// Convenience for building `Type::Class` values from a declared name.
    pub fn class_type(&self, name: &str, args: Vec<Type>) -> Option<Type> {
        self.class_id(name).map(|id| Type::class(id, args))
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> + '_ {
        self.classes
            .iter()
            .enumerate()
            .filter_map(|(idx, def)| Some((ClassId::from_raw(idx as u32), def.as_ref()?)))
    }

    /// The generic declaration of `id` applied to its own type parameters (`List<E>`).
    pub fn declared_type(&self, id: ClassId) -> Option<ClassType> {
        let def = self.class(id)?;
        Some(ClassType::new(
            id,
            def.type_params.iter().map(|tp| Type::TypeVar(*tp)).collect(),
        ))
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.to_raw() as usize)?.as_ref()
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.to_raw() as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}
