use std::sync::Arc;

use morph_core::Tag;
use morph_schema::SchemaResolver;
use morph_types::{ClassBuilder, MethodBody, MethodDef, Type, TypeStore};

use pretty_assertions::assert_eq;

#[test]
fn bean_properties_in_discovery_order() {
    let mut store = TypeStore::with_builtins();
    let string = store.well_known().string_type();
    let person = ClassBuilder::class("com.example.Person")
        .property("name", string.clone())
        .property("age", Type::int())
        .read_only("id", Type::long())
        .write_only("password", string.clone())
        .property("active", Type::boolean())
        .define(&mut store);

    let resolver = SchemaResolver::new(Arc::new(store));
    let schema = resolver.resolve(&Type::class(person, vec![])).unwrap();

    assert_eq!(
        schema.property_names().collect::<Vec<_>>(),
        vec!["name", "age", "id", "password", "active"]
    );
    let flags = |name: &str| {
        let prop = schema.property(name).unwrap();
        (prop.is_readable(), prop.is_writable())
    };
    assert_eq!(flags("name"), (true, true));
    assert_eq!(flags("id"), (true, false));
    assert_eq!(flags("password"), (false, true));
    assert_eq!(schema.property("age").unwrap().ty(), &Type::int());
    assert_eq!(schema.property("password").unwrap().ty(), &string);
    assert_eq!(schema.property("active").unwrap().ty(), &Type::boolean());
}

#[test]
fn disagreeing_accessor_types_keep_only_the_getter() {
    let mut store = TypeStore::with_builtins();
    let string = store.well_known().string_type();
    let odd = ClassBuilder::class("com.example.Odd")
        .field("code", string.clone())
        .method(MethodDef::new(
            "getCode",
            vec![],
            string.clone(),
            MethodBody::GetField("code".into()),
        ))
        .method(MethodDef::new(
            "setCode",
            vec![Type::int()],
            Type::Void,
            MethodBody::SetField {
                field: "code".into(),
                fluent: false,
            },
        ))
        .define(&mut store);

    let resolver = SchemaResolver::new(Arc::new(store));
    let schema = resolver.resolve(&Type::class(odd, vec![])).unwrap();
    let code = schema.property("code").unwrap();
    assert!(code.is_readable());
    assert!(!code.is_writable());
    assert_eq!(code.ty(), &string);
}

#[test]
fn inherited_property_type_is_substituted() {
    let mut store = TypeStore::with_builtins();
    let wk = store.well_known().clone();
    let t = store.add_type_param("T", vec![wk.object_type()]);
    let parent = ClassBuilder::class("com.example.Parent")
        .type_params([t])
        .property("value", Type::TypeVar(t))
        .define(&mut store);
    let x = store.add_type_param("X", vec![wk.object_type()]);
    let child = ClassBuilder::class("com.example.Child")
        .type_params([x])
        .extends(Type::class(parent, vec![wk.list_of(Type::TypeVar(x))]))
        .define(&mut store);

    let resolver = SchemaResolver::new(Arc::new(store));
    let schema = resolver
        .resolve(&Type::class(child, vec![wk.string_type()]))
        .unwrap();
    let value = schema.property("value").unwrap();
    assert_eq!(value.ty(), &wk.list_of(wk.string_type()));
    assert!(value.is_readable() && value.is_writable());
}

#[test]
fn subtype_declarations_override_supertype_ones() {
    let mut store = TypeStore::with_builtins();
    let string = store.well_known().string_type();
    let base = ClassBuilder::class("com.example.Base")
        .property("label", string.clone())
        .define(&mut store);
    let derived = ClassBuilder::class("com.example.Derived")
        .extends(Type::class(base, vec![]))
        .method(
            MethodDef::new(
                "getLabel",
                vec![],
                string,
                MethodBody::GetField("label".into()),
            )
            .with_tags(vec![Tag::new("Override")]),
        )
        .define(&mut store);

    let resolver = SchemaResolver::new(Arc::new(store));
    let schema = resolver.resolve(&Type::class(derived, vec![])).unwrap();
    let label = schema.property("label").unwrap();
    assert_eq!(label.getter().map(|m| m.declaring), Some(derived));
    assert_eq!(label.setter().map(|m| m.declaring), Some(base));
    assert!(label.has_tag("Override"));
    assert_eq!(
        schema.methods().iter().filter(|m| m.name == "getLabel").count(),
        1
    );
}

#[test]
fn field_tags_are_attached_to_properties() {
    let mut store = TypeStore::with_builtins();
    let string = store.well_known().string_type();
    let entity = ClassBuilder::class("com.example.Entity")
        .property_with_tags(
            "userName",
            string,
            vec![Tag::with_value("Column", "user_name")],
        )
        .define(&mut store);

    let resolver = SchemaResolver::new(Arc::new(store));
    let schema = resolver.resolve(&Type::class(entity, vec![])).unwrap();
    let prop = schema.property("userName").unwrap();
    assert_eq!(prop.tags(), &[Tag::with_value("Column", "user_name")]);
    assert!(Arc::ptr_eq(&prop.owner().unwrap(), &schema));
}
