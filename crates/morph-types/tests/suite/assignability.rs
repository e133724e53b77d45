use morph_types::{erasure, is_assignable, ClassBuilder, Type, TypeStore};

#[test]
fn boxing_and_object_top() {
    let store = TypeStore::with_builtins();
    let wk = store.well_known();
    let integer = Type::class(wk.integer, vec![]);
    let number = Type::class(wk.number, vec![]);

    assert!(is_assignable(&store, &Type::int(), &integer));
    assert!(is_assignable(&store, &integer, &Type::int()));
    assert!(is_assignable(&store, &Type::int(), &number));
    assert!(is_assignable(&store, &integer, &wk.object_type()));
    assert!(!is_assignable(&store, &number, &integer));
    assert!(!is_assignable(&store, &Type::int(), &Type::long()));
}

#[test]
fn generic_arguments_are_covariant() {
    let store = TypeStore::with_builtins();
    let wk = store.well_known();
    let integer = Type::class(wk.integer, vec![]);
    let number = Type::class(wk.number, vec![]);
    let array_list_of_int = Type::class(wk.array_list, vec![integer.clone()]);

    assert!(is_assignable(&store, &array_list_of_int, &wk.list_of(number.clone())));
    assert!(is_assignable(
        &store,
        &array_list_of_int,
        &wk.list_of(Type::extends(number.clone()))
    ));
    assert!(!is_assignable(&store, &wk.list_of(wk.string_type()), &wk.list_of(number)));
    assert!(is_assignable(&store, &Type::class(wk.list, vec![]), &wk.list_of(integer)));
}

#[test]
fn wildcard_targets() {
    let store = TypeStore::with_builtins();
    let wk = store.well_known();
    let number = Type::class(wk.number, vec![]);

    assert!(is_assignable(&store, &wk.string_type(), &Type::super_of(number.clone())));
    assert!(is_assignable(&store, &Type::double(), &Type::extends(number.clone())));
    assert!(!is_assignable(&store, &wk.string_type(), &Type::extends(number)));
    assert!(is_assignable(&store, &wk.string_type(), &Type::wildcard()));
}

#[test]
fn user_hierarchies_and_arrays() {
    let mut store = TypeStore::with_builtins();
    let animal = ClassBuilder::abstract_class("com.example.Animal").define(&mut store);
    let animal_ty = Type::class(animal, vec![]);
    let dog = ClassBuilder::class("com.example.Dog")
        .extends(animal_ty.clone())
        .define(&mut store);
    let dog_ty = Type::class(dog, vec![]);

    assert!(is_assignable(&store, &dog_ty, &animal_ty));
    assert!(!is_assignable(&store, &animal_ty, &dog_ty));
    assert!(is_assignable(&store, &Type::array(dog_ty.clone()), &Type::array(animal_ty)));
    assert!(!is_assignable(&store, &Type::array(Type::int()), &Type::array(Type::long())));
    assert_eq!(erasure(&store, &store.well_known().list_of(dog_ty)), Type::class(store.well_known().list, vec![]));
}
