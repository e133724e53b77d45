use indexmap::IndexMap;
use morph_json::{decode, encode, JsonError};
use morph_types::{ClassType, ObjectRef, Value};
use pretty_assertions::assert_eq;

#[test]
fn decodes_into_dynamic_trees() {
    let value = decode(r#"{"name":"Ada","age":36,"score":1.5,"tags":["a",null],"ok":true}"#)
        .unwrap();

    let map = value.as_map().expect("objects decode to maps");
    assert_eq!(
        map.keys(),
        vec!["name", "age", "score", "tags", "ok"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
    assert_eq!(map.get("name"), Some(Value::from("Ada")));
    assert_eq!(map.get("age"), Some(Value::Long(36)));
    assert_eq!(map.get("score"), Some(Value::Double(1.5)));
    assert_eq!(
        map.get("tags"),
        Some(Value::list(vec!["a".into(), Value::Null]))
    );
    assert_eq!(map.get("ok"), Some(Value::Bool(true)));
}

#[test]
fn encodes_dynamic_trees_in_insertion_order() {
    let mut entries = IndexMap::new();
    entries.insert("z".to_string(), Value::Int(1));
    entries.insert("a".to_string(), Value::Char('x'));
    entries.insert(
        "list".to_string(),
        Value::list(vec![Value::Double(0.5), Value::Null]),
    );

    assert_eq!(
        encode(&Value::map(entries)).unwrap(),
        r#"{"z":1,"a":"x","list":[0.5,null]}"#
    );
}

#[test]
fn encode_rejects_objects_and_non_finite_numbers() {
    let object = Value::Object(ObjectRef::new(
        ClassType::raw(morph_types::TypeStore::with_builtins().well_known().object),
        IndexMap::new(),
    ));
    assert!(matches!(encode(&object), Err(JsonError::Encode(_))));
    assert!(matches!(
        encode(&Value::Double(f64::NAN)),
        Err(JsonError::Encode(_))
    ));
}

#[test]
fn malformed_text_is_a_parse_error() {
    assert!(matches!(decode("{\"a\":"), Err(JsonError::Parse(_))));
}
