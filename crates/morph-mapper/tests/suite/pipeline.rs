use std::sync::Arc;

use anyhow::bail;
use morph_core::{Flow, Tag};
use morph_mapper::{MapRequest, Mapper, MapperHandler, MappingError, MappingOptions};
use morph_types::{ClassBuilder, Type, TypeStore, Value};

use pretty_assertions::assert_eq;

use super::support::{define_person, dynamic_map, field, mapper};

/// Upper-cases text written into properties tagged `Upper`.
struct Upper;

impl MapperHandler for Upper {
    fn name(&self) -> &'static str {
        "upper"
    }

    fn try_map(&self, _mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        match (req.property, req.source.as_str()) {
            (Some(property), Some(text)) if property.has_tag("Upper") => {
                Ok(Flow::Done(Value::from(text.to_uppercase())))
            }
            _ => Ok(Flow::Continue),
        }
    }
}

struct Failing;

impl MapperHandler for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn try_map(&self, _mapper: &Mapper, _req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        bail!("converter unavailable")
    }
}

struct Refuse;

impl MapperHandler for Refuse {
    fn try_map(&self, _mapper: &Mapper, _req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        Ok(Flow::Stop)
    }
}

#[test]
fn handlers_see_destination_property_metadata() {
    let mut store = TypeStore::with_builtins();
    let string = store.well_known().string_type();
    let code = ClassBuilder::class("com.example.Code")
        .property_with_tags("code", string.clone(), vec![Tag::new("Upper")])
        .property("label", string)
        .define(&mut store);
    let wk = store.well_known().clone();
    let base = mapper(store);
    let mapper = base.with_handlers(base.handlers().add_first(Arc::new(Upper)));

    let source = dynamic_map(&[("code", "abc".into()), ("label", "plain".into())]);
    let mapped = mapper
        .map(
            &source,
            &wk.dynamic_map(),
            &Type::class(code, vec![]),
            &MappingOptions::new(),
        )
        .unwrap()
        .unwrap();
    assert_eq!(field(&mapped, "code"), Value::from("ABC"));
    assert_eq!(field(&mapped, "label"), Value::from("plain"));

    // Without a destination property the handler stays out of the way.
    let top = mapper
        .map(&"abc".into(), &wk.string_type(), &wk.string_type(), &MappingOptions::new())
        .unwrap();
    assert_eq!(top, Some(Value::from("abc")));
}

#[test]
fn handler_failures_carry_the_handler_and_types() {
    let store = TypeStore::with_builtins();
    let string = store.well_known().string_type();
    let base = mapper(store);
    let mapper = base.with_handlers(base.handlers().add_first(Arc::new(Failing)));

    let err = mapper
        .map(&"x".into(), &string, &Type::int(), &MappingOptions::new())
        .unwrap_err();
    match err {
        MappingError::Handler {
            handler,
            source_type,
            target_type,
            source,
        } => {
            assert_eq!(handler, "failing");
            assert_eq!(source_type, "java.lang.String");
            assert_eq!(target_type, "int");
            assert_eq!(source.to_string(), "converter unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn nested_failures_surface_unwrapped() {
    let mut store = TypeStore::with_builtins();
    let person = define_person(&mut store);
    let wk = store.well_known().clone();
    let base = mapper(store);
    // Fails only for the nested `String` property, not for the outer request.
    let chain = base.handlers().add_first(Arc::new(FailOnText));
    let mapper = base.with_handlers(chain);

    let source = dynamic_map(&[("name", "Ada".into())]);
    let err = mapper
        .map(
            &source,
            &wk.dynamic_map(),
            &Type::class(person, vec![]),
            &MappingOptions::new(),
        )
        .unwrap_err();
    match err {
        MappingError::Property {
            property, source, ..
        } => {
            assert_eq!(property, "name");
            assert!(matches!(*source, MappingError::Handler { handler: "fail-on-text", .. }));
        }
        other => panic!("expected a property error, got {other:?}"),
    }
}

struct FailOnText;

impl MapperHandler for FailOnText {
    fn name(&self) -> &'static str {
        "fail-on-text"
    }

    fn try_map(&self, _mapper: &Mapper, req: &MapRequest<'_>) -> anyhow::Result<Flow<Value>> {
        if req.source.as_str().is_some() {
            bail!("no text today");
        }
        Ok(Flow::Continue)
    }
}

#[test]
fn stop_ends_the_pipeline_without_a_value() {
    let store = TypeStore::with_builtins();
    let string = store.well_known().string_type();
    let base = mapper(store);
    let mapper = base.with_handlers(base.handlers().add_first(Arc::new(Refuse)));

    let mapped = mapper
        .map(&"x".into(), &string, &string, &MappingOptions::new())
        .unwrap();
    assert_eq!(mapped, None);

    let err = mapper
        .map_required(&"x".into(), &string, &string, &MappingOptions::new())
        .unwrap_err();
    assert!(matches!(
        err,
        MappingError::NoMapping { ref source_type, ref target_type }
            if source_type == "java.lang.String" && target_type == "java.lang.String"
    ));
}

#[test]
fn type_overrides_redirect_abstract_targets() {
    let mut store = TypeStore::with_builtins();
    let string = store.well_known().string_type();
    let animal = ClassBuilder::abstract_class("com.example.Animal")
        .property("name", string)
        .define(&mut store);
    let dog = ClassBuilder::class("com.example.Dog")
        .extends(Type::class(animal, vec![]))
        .property("goodBoy", Type::boolean())
        .define(&mut store);
    let wk = store.well_known().clone();
    let mapper = mapper(store);

    let source = dynamic_map(&[("name", "Rex".into()), ("goodBoy", "true".into())]);
    let animal_ty = Type::class(animal, vec![]);
    let plain = mapper
        .map(&source, &wk.dynamic_map(), &animal_ty, &MappingOptions::new())
        .unwrap();
    assert_eq!(plain, None);

    let options = MappingOptions::new().with_type_override(
        wk.dynamic_map(),
        animal_ty.clone(),
        Type::class(dog, vec![]),
    );
    let rex = mapper
        .map(&source, &wk.dynamic_map(), &animal_ty, &options)
        .unwrap()
        .unwrap();
    assert_eq!(rex.as_object().unwrap().class_id(), dog);
    assert_eq!(field(&rex, "name"), Value::from("Rex"));
    assert_eq!(field(&rex, "goodBoy"), Value::Bool(true));
}
