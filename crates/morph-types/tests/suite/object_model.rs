use morph_types::{
    invoke, ClassBuilder, ClassType, InvokeError, MessageBuilder, ObjectRef, Type, TypeEnv,
    TypeStore, Value,
};

use pretty_assertions::assert_eq;

#[test]
fn instantiate_defaults_fields_across_the_class_chain() {
    let mut store = TypeStore::with_builtins();
    let string = store.well_known().string_type();
    let base = ClassBuilder::class("com.example.Base")
        .property("id", Type::long())
        .define(&mut store);
    let derived = ClassBuilder::class("com.example.Derived")
        .extends(Type::class(base, vec![]))
        .property("name", string)
        .property("active", Type::boolean())
        .define(&mut store);

    let obj = ObjectRef::instantiate(&store, ClassType::raw(derived)).unwrap();
    assert_eq!(
        obj.field_names(),
        vec!["id".to_string(), "name".to_string(), "active".to_string()]
    );
    assert_eq!(obj.get_field("id"), Some(Value::Long(0)));
    assert_eq!(obj.get_field("name"), Some(Value::Null));
    assert_eq!(obj.get_field("active"), Some(Value::Bool(false)));
}

#[test]
fn abstract_classes_cannot_be_instantiated() {
    let mut store = TypeStore::with_builtins();
    let shape = ClassBuilder::abstract_class("com.example.Shape").define(&mut store);
    let err = ObjectRef::instantiate(&store, ClassType::raw(shape)).unwrap_err();
    assert!(matches!(err, InvokeError::NotInstantiable(name) if name == "com.example.Shape"));
}

#[test]
fn builder_build_defaults_empty_containers() {
    let mut store = TypeStore::with_builtins();
    let wk = store.well_known().clone();
    let ids = MessageBuilder::new("com.example.proto.Order")
        .scalar("id", Type::long())
        .repeated("items", wk.string_type())
        .map("labels", wk.string_type())
        .define(&mut store);

    let message = store.class(ids.message).unwrap();
    let (_, new_builder) = message.find_method("newBuilder", 0, true).unwrap();
    let builder = invoke(&store, new_builder, &Value::Null, &[]).unwrap();

    let builder_def = store.class(ids.builder).unwrap();
    let (_, put_labels) = builder_def.find_method("putLabels", 2, false).unwrap();
    invoke(&store, put_labels, &builder, &["env".into(), "prod".into()]).unwrap();
    let (_, build) = builder_def.find_method("build", 0, false).unwrap();
    let built = invoke(&store, build, &builder, &[]).unwrap();

    let obj = built.as_object().unwrap();
    assert_eq!(obj.get_field("id"), Some(Value::Long(0)));
    assert_eq!(obj.get_field("items"), Some(Value::list(vec![])));
    assert_eq!(
        obj.get_field("labels")
            .and_then(|labels| labels.as_map().and_then(|m| m.get("env"))),
        Some(Value::from("prod"))
    );

    let (_, count) = message.find_method("getItemsCount", 0, false).unwrap();
    assert_eq!(invoke(&store, count, &built, &[]).unwrap(), Value::Int(0));
}
