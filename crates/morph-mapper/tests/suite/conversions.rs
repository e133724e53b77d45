use morph_mapper::MappingOptions;
use morph_types::{ClassBuilder, EnumConstant, Type, TypeStore, Value};

use pretty_assertions::assert_eq;

use super::support::{dynamic_map, mapper};

#[test]
fn numbers_widen_narrow_and_parse() {
    let store = TypeStore::with_builtins();
    let wk = store.well_known().clone();
    let mapper = mapper(store);
    let options = MappingOptions::new();
    let map = |value: Value, from: &Type, to: &Type| mapper.map(&value, from, to, &options).unwrap();

    assert_eq!(map(Value::Int(7), &Type::int(), &Type::long()), Some(Value::Long(7)));
    assert_eq!(
        map(Value::Long(7), &Type::long(), &Type::class(wk.integer, vec![])),
        Some(Value::Int(7))
    );
    assert_eq!(map(Value::Double(2.75), &Type::double(), &Type::int()), Some(Value::Int(2)));
    assert_eq!(map(" 42 ".into(), &wk.string_type(), &Type::int()), Some(Value::Int(42)));
    assert_eq!(map("4x".into(), &wk.string_type(), &Type::int()), None);
    assert_eq!(map(Value::Bool(true), &Type::boolean(), &Type::int()), None);
}

#[test]
fn scalars_render_as_text() {
    let mut store = TypeStore::with_builtins();
    let color = ClassBuilder::enumeration("com.example.Color")
        .constants(["RED", "GREEN"])
        .define(&mut store);
    let wk = store.well_known().clone();
    let mapper = mapper(store);
    let options = MappingOptions::new();
    let string = wk.string_type();

    assert_eq!(
        mapper.map(&Value::Double(5.0), &Type::double(), &string, &options).unwrap(),
        Some(Value::from("5.0"))
    );
    let green = Value::Enum(EnumConstant::new(color, "GREEN"));
    assert_eq!(
        mapper
            .map(&green, &Type::class(color, vec![]), &string, &options)
            .unwrap(),
        Some(Value::from("GREEN"))
    );
    assert_eq!(
        mapper.map(&"TRUE".into(), &string, &Type::boolean(), &options).unwrap(),
        Some(Value::Bool(true))
    );
    assert_eq!(
        mapper
            .map(&"x".into(), &string, &Type::class(wk.character, vec![]), &options)
            .unwrap(),
        Some(Value::Char('x'))
    );
}

#[test]
fn enum_constants_match_by_name() {
    let mut store = TypeStore::with_builtins();
    let color = ClassBuilder::enumeration("com.example.Color")
        .constants(["RED", "GREEN"])
        .define(&mut store);
    let shade = ClassBuilder::enumeration("com.example.Shade")
        .constants(["GREEN", "GREY"])
        .define(&mut store);
    let switch = ClassBuilder::enumeration("com.example.Switch")
        .constants(["ON", "on"])
        .define(&mut store);
    let string = store.well_known().string_type();
    let mapper = mapper(store);
    let options = MappingOptions::new();
    let color_ty = Type::class(color, vec![]);

    let to_color = |name: &str| mapper.map(&name.into(), &string, &color_ty, &options).unwrap();
    assert_eq!(to_color("GREEN"), Some(EnumConstant::new(color, "GREEN").into()));
    assert_eq!(to_color("green"), Some(EnumConstant::new(color, "GREEN").into()));
    assert_eq!(to_color("purple"), None);

    // An exact match wins over a case-insensitive one.
    let on = mapper
        .map(&"on".into(), &string, &Type::class(switch, vec![]), &options)
        .unwrap();
    assert_eq!(on, Some(EnumConstant::new(switch, "on").into()));

    let green_shade = Value::Enum(EnumConstant::new(shade, "GREEN"));
    let mapped = mapper
        .map(&green_shade, &Type::class(shade, vec![]), &color_ty, &options)
        .unwrap();
    assert_eq!(mapped, Some(EnumConstant::new(color, "GREEN").into()));
}

#[test]
fn lists_map_element_by_element() {
    let store = TypeStore::with_builtins();
    let wk = store.well_known().clone();
    let mapper = mapper(store);
    let options = MappingOptions::new();
    let strings = wk.list_of(wk.string_type());
    let integers = wk.list_of(Type::class(wk.integer, vec![]));

    let source = Value::list(vec!["1".into(), "2".into()]);
    let mapped = mapper.map(&source, &strings, &integers, &options).unwrap();
    assert_eq!(mapped, Some(Value::list(vec![Value::Int(1), Value::Int(2)])));

    let longs = Type::array(Type::long());
    let mapped = mapper.map(&source, &strings, &longs, &options).unwrap();
    assert_eq!(mapped, Some(Value::list(vec![Value::Long(1), Value::Long(2)])));

    // One element without a mapping leaves the whole list unmapped.
    let source = Value::list(vec!["1".into(), "two".into()]);
    assert_eq!(mapper.map(&source, &strings, &integers, &options).unwrap(), None);
}

#[test]
fn raw_lists_are_converted_rather_than_reused() {
    let store = TypeStore::with_builtins();
    let wk = store.well_known().clone();
    let mapper = mapper(store);

    let source = Value::list(vec!["3".into()]);
    let target = wk.list_of(Type::class(wk.long, vec![]));
    let mapped = mapper
        .map(&source, &wk.object_type(), &target, &MappingOptions::new())
        .unwrap()
        .unwrap();
    assert!(!mapped.same(&source));
    assert_eq!(mapped, Value::list(vec![Value::Long(3)]));
}

#[test]
fn dynamic_maps_map_their_values() {
    let store = TypeStore::with_builtins();
    let wk = store.well_known().clone();
    let mapper = mapper(store);

    let source = dynamic_map(&[("a", "1".into()), ("b", "2".into())]);
    let from = wk.map_of(wk.string_type(), wk.string_type());
    let to = wk.map_of(wk.string_type(), Type::class(wk.integer, vec![]));
    let mapped = mapper.map(&source, &from, &to, &MappingOptions::new()).unwrap();
    assert_eq!(
        mapped,
        Some(dynamic_map(&[("a", Value::Int(1)), ("b", Value::Int(2))]))
    );
}

#[test]
fn null_maps_to_null() {
    let store = TypeStore::with_builtins();
    let string = store.well_known().string_type();
    let mapper = mapper(store);
    let mapped = mapper
        .map(&Value::Null, &string, &Type::int(), &MappingOptions::new())
        .unwrap();
    assert_eq!(mapped, Some(Value::Null));
}
