use morph_mapper::{
    source_for, transfer, MappingError, MappingOptions, ObjectSink, TransferError,
};
use morph_types::{ClassBuilder, ClassType, MessageBuilder, ObjectRef, Type, TypeStore, Value};

use pretty_assertions::assert_eq;

use super::support::{define_person, dynamic_map, field, mapper, object};

#[test]
fn beans_round_trip_through_dynamic_maps() {
    let mut store = TypeStore::with_builtins();
    let person = define_person(&mut store);
    let wk = store.well_known().clone();
    let mapper = mapper(store);
    let options = MappingOptions::new();
    let person_ty = Type::class(person, vec![]);
    let map_ty = wk.dynamic_map();

    let ada = object(person, &[("name", "Ada".into()), ("age", Value::Int(36))]);
    let flat = mapper.map(&ada, &person_ty, &map_ty, &options).unwrap().unwrap();
    assert_eq!(
        flat,
        dynamic_map(&[("name", "Ada".into()), ("age", Value::Int(36))])
    );

    let back = mapper.map(&flat, &map_ty, &person_ty, &options).unwrap().unwrap();
    assert!(!back.same(&ada));
    assert_eq!(back, ada);
}

#[test]
fn partially_compatible_beans_transfer_the_overlap() {
    let mut store = TypeStore::with_builtins();
    let string = store.well_known().string_type();
    let source = ClassBuilder::class("com.example.Source")
        .property("p1", string.clone())
        .property("p2", Type::int())
        .property("p3", string.clone())
        .define(&mut store);
    let target = ClassBuilder::class("com.example.Target")
        .property("p1", string.clone())
        .property("p2", Type::long())
        .define(&mut store);
    let mapper = mapper(store);
    let options = MappingOptions::new();

    let value = object(
        source,
        &[("p1", "one".into()), ("p2", Value::Int(2)), ("p3", "three".into())],
    );
    let source_ty = Type::class(source, vec![]);
    let target_ty = Type::class(target, vec![]);
    let fresh = Value::Object(ObjectRef::instantiate(mapper.env(), ClassType::raw(target)).unwrap());

    let reader = source_for(&mapper, &value, &source_ty).unwrap().unwrap();
    let mut sink = ObjectSink::new(&mapper, fresh.clone(), &target_ty).unwrap();
    let report = transfer(&mapper, reader.as_ref(), &mut sink, &options).unwrap();

    assert_eq!(report.written, vec!["p1".to_string(), "p2".to_string()]);
    assert!(report.skipped.is_empty());
    assert_eq!(field(&fresh, "p1"), Value::from("one"));
    assert_eq!(field(&fresh, "p2"), Value::Long(2));
}

#[test]
fn nested_structures_map_recursively() {
    let mut store = TypeStore::with_builtins();
    let person = define_person(&mut store);
    let wk = store.well_known().clone();
    let order = ClassBuilder::class("com.example.Order")
        .property("customer", Type::class(person, vec![]))
        .property("lines", wk.list_of(Type::class(person, vec![])))
        .property("tags", wk.list_of(wk.string_type()))
        .define(&mut store);
    let mapper = mapper(store);

    let source = dynamic_map(&[
        (
            "customer",
            dynamic_map(&[("name", "Ada".into()), ("age", "36".into())]),
        ),
        (
            "lines",
            Value::list(vec![dynamic_map(&[("name", "Grace".into())])]),
        ),
        ("tags", Value::list(vec!["vip".into()])),
        ("unknown", Value::Int(1)),
    ]);
    let mapped = mapper
        .map(
            &source,
            &wk.dynamic_map(),
            &Type::class(order, vec![]),
            &MappingOptions::new(),
        )
        .unwrap()
        .unwrap();

    let customer = field(&mapped, "customer");
    assert_eq!(field(&customer, "name"), Value::from("Ada"));
    assert_eq!(field(&customer, "age"), Value::Int(36));

    let lines = field(&mapped, "lines");
    let first = lines.as_list().and_then(|l| l.get(0)).unwrap();
    assert_eq!(field(&first, "name"), Value::from("Grace"));
    assert_eq!(field(&first, "age"), Value::Int(0));

    assert_eq!(field(&mapped, "tags"), Value::list(vec!["vip".into()]));
}

#[test]
fn message_targets_are_built_through_their_builder() {
    let mut store = TypeStore::with_builtins();
    let wk = store.well_known().clone();
    let bean = ClassBuilder::class("com.example.PersonBean")
        .property("name", wk.string_type())
        .property("tags", wk.list_of(wk.string_type()))
        .property("ignored", Type::int())
        .define(&mut store);
    let ids = MessageBuilder::new("com.example.proto.Person")
        .scalar("name", wk.string_type())
        .repeated("tags", wk.string_type())
        .define(&mut store);
    let mapper = mapper(store);

    let tags = Value::list(vec!["a".into(), "b".into()]);
    let source = object(
        bean,
        &[("name", "Ada".into()), ("tags", tags.clone()), ("ignored", Value::Int(1))],
    );
    let message = mapper
        .map(
            &source,
            &Type::class(bean, vec![]),
            &Type::class(ids.message, vec![]),
            &MappingOptions::new(),
        )
        .unwrap()
        .unwrap();

    assert_eq!(message.as_object().unwrap().class_id(), ids.message);
    assert_eq!(field(&message, "name"), Value::from("Ada"));
    let built_tags = field(&message, "tags");
    assert_eq!(built_tags, tags);
    assert!(!built_tags.same(&tags));

    // And back from the message into a bean.
    let back = mapper
        .map(
            &message,
            &Type::class(ids.message, vec![]),
            &Type::class(bean, vec![]),
            &MappingOptions::new(),
        )
        .unwrap()
        .unwrap();
    assert_eq!(field(&back, "name"), Value::from("Ada"));
    assert_eq!(field(&back, "tags"), tags);
    assert_eq!(field(&back, "ignored"), Value::Int(0));
}

#[test]
fn strict_transfers_fail_on_unmappable_properties() {
    let mut store = TypeStore::with_builtins();
    let person = define_person(&mut store);
    let wk = store.well_known().clone();
    let mapper = mapper(store);
    let person_ty = Type::class(person, vec![]);

    let source = dynamic_map(&[("name", "Ada".into()), ("age", "old".into())]);
    let target = Value::Object(ObjectRef::instantiate(mapper.env(), ClassType::raw(person)).unwrap());
    let reader = source_for(&mapper, &source, &wk.dynamic_map()).unwrap().unwrap();

    let mut sink = ObjectSink::new(&mapper, target.clone(), &person_ty).unwrap();
    let report = transfer(&mapper, reader.as_ref(), &mut sink, &MappingOptions::new()).unwrap();
    assert_eq!(report.written, vec!["name".to_string()]);
    assert_eq!(report.skipped, vec!["age".to_string()]);

    let strict = MappingOptions::new().with_strict(true);
    let err = transfer(&mapper, reader.as_ref(), &mut sink, &strict).unwrap_err();
    assert!(matches!(
        &err,
        TransferError::NotApplicable { property, owner, .. }
            if property == "age" && owner == "com.example.Person"
    ));
    assert!(matches!(
        MappingError::from(err),
        MappingError::Property { source, .. } if matches!(*source, MappingError::NoMapping { .. })
    ));
}

#[test]
fn filters_and_null_skipping_are_reported() {
    let mut store = TypeStore::with_builtins();
    let person = define_person(&mut store);
    let wk = store.well_known().clone();
    let mapper = mapper(store);
    let person_ty = Type::class(person, vec![]);

    let source = dynamic_map(&[("name", Value::Null), ("age", Value::Int(40))]);
    let target = object(person, &[("name", "Keep".into()), ("age", Value::Int(1))]);
    let reader = source_for(&mapper, &source, &wk.dynamic_map()).unwrap().unwrap();
    let mut sink = ObjectSink::new(&mapper, target.clone(), &person_ty).unwrap();

    let options = MappingOptions::new().with_ignore_null(true);
    let report = transfer(&mapper, reader.as_ref(), &mut sink, &options).unwrap();
    assert_eq!(report.written, vec!["age".to_string()]);
    assert_eq!(report.skipped, vec!["name".to_string()]);
    assert_eq!(field(&target, "name"), Value::from("Keep"));
    assert_eq!(field(&target, "age"), Value::Int(40));

    let options = MappingOptions::new().with_exclude(["age"]);
    let report = transfer(&mapper, reader.as_ref(), &mut sink, &options).unwrap();
    assert_eq!(report.written, vec!["name".to_string()]);
    assert_eq!(report.skipped, vec!["age".to_string()]);
    assert_eq!(field(&target, "name"), Value::Null);
}
