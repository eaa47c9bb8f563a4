use super::*;
use crate::fixtures::{COLLECTION, COMPARABLE, ENUM, Fixture, LIST, MAP, NUMBER};

#[test]
fn parameterized_type_erases_to_definition() {
    let fx = Fixture::new();
    let strings = fx.instance(LIST, &[TypeId::STRING]);
    assert_eq!(erase(&fx.db, strings), fx.named(LIST));
    let nested = fx.instance(MAP, &[TypeId::STRING, strings]);
    assert_eq!(erase(&fx.db, nested), fx.named(MAP));
}

#[test]
fn non_generic_types_are_unchanged() {
    let fx = Fixture::new();
    for ty in [TypeId::INT, TypeId::STRING, TypeId::NULL, fx.named(LIST)] {
        assert_eq!(erase(&fx.db, ty), ty);
    }
}

#[test]
fn parameter_erases_to_bound() {
    let fx = Fixture::new();
    assert_eq!(erase(&fx.db, fx.param(LIST, "E")), TypeId::OBJECT);
    // E extends Enum<E>
    assert_eq!(erase(&fx.db, fx.param(ENUM, "E")), fx.named(ENUM));

    let t = fx.declare("demo/Sorted", &["T"])[0];
    fx.interner()
        .set_upper_bound(t, fx.instance(COMPARABLE, &[t]));
    assert_eq!(erase(&fx.db, t), fx.named(COMPARABLE));
}

#[test]
fn mutually_bounded_parameters_erase_to_object() {
    let fx = Fixture::new();
    let interner = fx.interner();
    let params = fx.declare("demo/Cycle", &["A", "B"]);
    interner.set_upper_bound(params[0], params[1]);
    interner.set_upper_bound(params[1], params[0]);
    assert_eq!(erase(&fx.db, params[0]), TypeId::OBJECT);
}

#[test]
fn arrays_erase_their_element() {
    let fx = Fixture::new();
    let interner = fx.interner();
    let strings = fx.instance(LIST, &[TypeId::STRING]);
    assert_eq!(
        erase(&fx.db, interner.array_of_rank(strings, 2)),
        interner.array_of_rank(fx.named(LIST), 2)
    );
    let e_array = interner.array(fx.param(COLLECTION, "E"));
    assert_eq!(erase(&fx.db, e_array), interner.array(TypeId::OBJECT));
    let ints = interner.array(TypeId::INT);
    assert_eq!(erase(&fx.db, ints), ints);
}

#[test]
fn wildcards_erase_to_extends_bound_or_object() {
    let fx = Fixture::new();
    let interner = fx.interner();
    let number = fx.named(NUMBER);
    assert_eq!(erase(&fx.db, interner.wildcard_extends(number)), number);
    assert_eq!(erase(&fx.db, interner.wildcard_super(number)), TypeId::OBJECT);
    assert_eq!(erase(&fx.db, interner.unbounded_wildcard()), TypeId::OBJECT);
}

#[test]
fn substituted_bound_is_used() {
    let fx = Fixture::new();
    let interner = fx.interner();
    let e = fx.param(LIST, "E");
    let param = interner.generic_param_id(e).expect("E");
    let narrowed = interner.generic_parameter_with_bound(param, TypeId::STRING);
    assert_eq!(erase(&fx.db, narrowed), TypeId::STRING);
}

#[test]
fn erase_method_erases_signature() {
    let fx = Fixture::new();
    let set = fx.method(LIST, "set");
    let erased = erase_method(&fx.db, &set);
    assert_eq!(erased.return_type, TypeId::OBJECT);
    assert_eq!(
        erased.parameter_types().collect::<Vec<_>>(),
        vec![TypeId::INT, TypeId::OBJECT]
    );
    assert!(Arc::ptr_eq(&erased.resolve(), &set));
}

#[test]
fn erase_method_without_generics_is_identity() {
    let fx = Fixture::new();
    let size = fx.method(COLLECTION, "size");
    assert!(Arc::ptr_eq(&erase_method(&fx.db, &size), &size));
}
