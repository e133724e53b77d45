use morph_types::{
    format_type, ClassBuilder, ClassType, Type, TypeEnv, TypeResolver, TypeStore, WildcardBound,
};

use pretty_assertions::assert_eq;

#[test]
fn child_parameter_flows_into_parent_binding() {
    // class Parent<T> { T value; }
    // class Child<X> extends Parent<List<X>> {}
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

    let resolver = TypeResolver::new();
    let context = ClassType::new(child, vec![wk.string_type()]);
    let resolved = resolver
        .resolve_in(&store, &Type::TypeVar(t), &context)
        .unwrap();

    assert_eq!(resolved, wk.list_of(wk.string_type()));
    assert_eq!(
        format_type(&store, &resolved),
        "java.util.List<java.lang.String>"
    );
}

#[test]
fn bindings_cross_multiple_levels() {
    // class A<P> {}  class B<Q> extends A<Q> {}  class C extends B<Integer> {}
    let mut store = TypeStore::with_builtins();
    let wk = store.well_known().clone();
    let integer = Type::class(wk.integer, vec![]);

    let p = store.add_type_param("P", vec![]);
    let a = ClassBuilder::class("com.example.A")
        .type_params([p])
        .define(&mut store);
    let q = store.add_type_param("Q", vec![]);
    let b = ClassBuilder::class("com.example.B")
        .type_params([q])
        .extends(Type::class(a, vec![Type::TypeVar(q)]))
        .define(&mut store);
    let c = ClassBuilder::class("com.example.C")
        .extends(Type::class(b, vec![integer.clone()]))
        .define(&mut store);

    let resolver = TypeResolver::new();
    let bindings = resolver.bindings(&store, &ClassType::raw(c));
    assert_eq!(
        resolver.resolve(&store, &Type::TypeVar(p), &bindings).unwrap(),
        integer
    );
}

#[test]
fn raw_use_falls_back_to_declared_bound() {
    let mut store = TypeStore::with_builtins();
    let number = Type::class(store.well_known().number, vec![]);
    let n = store.add_type_param("N", vec![number.clone()]);
    let boxed = ClassBuilder::class("com.example.Box")
        .type_params([n])
        .property("content", Type::TypeVar(n))
        .define(&mut store);

    let resolved = TypeResolver::new()
        .resolve_in(&store, &Type::TypeVar(n), &ClassType::raw(boxed))
        .unwrap();
    assert_eq!(resolved, number);
}

#[test]
fn self_referential_bound_terminates() {
    // class Node<T extends Comparable<T>> with a raw use: T resolves to its bound, and the inner
    // occurrence of T is left as the bound without further expansion.
    let mut store = TypeStore::with_builtins();
    let comparable = store.well_known().comparable;
    let t = store.add_type_param("T", vec![]);
    store.set_type_param_bounds(t, vec![Type::class(comparable, vec![Type::TypeVar(t)])]);
    let node = ClassBuilder::class("com.example.Node")
        .type_params([t])
        .define(&mut store);

    let resolved = TypeResolver::new()
        .resolve_in(&store, &Type::TypeVar(t), &ClassType::raw(node))
        .unwrap();

    assert_eq!(
        resolved,
        Type::class(
            comparable,
            vec![Type::class(comparable, vec![Type::TypeVar(t)])]
        )
    );
}

#[test]
fn nested_wildcards_keep_their_shape() {
    let mut store = TypeStore::with_builtins();
    let wk = store.well_known().clone();
    let t = store.add_type_param("T", vec![]);
    let holder = ClassBuilder::class("com.example.Holder")
        .type_params([t])
        .define(&mut store);

    let ty = wk.list_of(Type::extends(Type::TypeVar(t)));
    let resolved = TypeResolver::new()
        .resolve_in(&store, &ty, &ClassType::new(holder, vec![wk.string_type()]))
        .unwrap();

    assert_eq!(resolved, wk.list_of(Type::extends(wk.string_type())));
    assert!(matches!(
        resolved.as_class().map(|ct| &ct.args[0]),
        Some(Type::Wildcard(WildcardBound::Extends(_)))
    ));
    assert!(store.class(holder).is_some());
}
