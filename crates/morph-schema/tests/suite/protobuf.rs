use std::sync::Arc;

use morph_schema::SchemaResolver;
use morph_types::{MessageBuilder, Type, TypeStore};

use pretty_assertions::assert_eq;

#[test]
fn builder_schema_exposes_fields_and_hides_noise() {
    let mut store = TypeStore::with_builtins();
    let wk = store.well_known().clone();
    let ids = MessageBuilder::new("com.example.proto.User")
        .scalar("name", wk.string_type())
        .scalar("age", Type::int())
        .repeated("tags", wk.string_type())
        .map("labels", wk.string_type())
        .define(&mut store);

    let resolver = SchemaResolver::new(Arc::new(store));
    let builder = resolver.resolve(&Type::class(ids.builder, vec![])).unwrap();
    assert_eq!(
        builder.property_names().collect::<Vec<_>>(),
        vec!["name", "age", "tags", "labels"]
    );
    for prop in builder.properties() {
        assert!(prop.is_readable() && prop.is_writable(), "{}", prop.name());
    }
    assert_eq!(
        builder.property("tags").unwrap().ty(),
        &wk.list_of(wk.string_type())
    );
    assert_eq!(
        builder.property("labels").unwrap().ty(),
        &wk.map_of(wk.string_type(), wk.string_type())
    );

    let message = resolver.resolve(&Type::class(ids.message, vec![])).unwrap();
    assert_eq!(
        message.property_names().collect::<Vec<_>>(),
        vec!["name", "age", "tags", "labels"]
    );
    assert!(message.properties().all(|p| p.is_readable() && !p.is_writable()));
}

#[test]
fn fields_ending_in_noise_suffixes_survive_without_companions() {
    let mut store = TypeStore::with_builtins();
    let ids = MessageBuilder::new("com.example.proto.Stats")
        .scalar("itemCount", Type::int())
        .scalar("maxValue", Type::long())
        .define(&mut store);

    let resolver = SchemaResolver::new(Arc::new(store));
    let schema = resolver.resolve(&Type::class(ids.builder, vec![])).unwrap();
    assert_eq!(
        schema.property_names().collect::<Vec<_>>(),
        vec!["itemCount", "maxValue"]
    );
}
