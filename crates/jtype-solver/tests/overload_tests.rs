use super::*;
use crate::def::TypeDefinition;
use crate::fixtures::{Fixture, LIST};
use crate::members::MethodFlags;
use crate::types::TypeId;

const CALC: &str = "demo/Calc";
const SUB: &str = "demo/SubCalc";

/// Declared methods of `demo/Calc`, in declaration order:
///
/// ```text
/// 0 m(int)             4 g(int, int)          7 cmp(String)
/// 1 m(int, int)        5 g(Object...)         8 cmp(Object) bridge
/// 2 n(int)             6 h()                  9 x(String)
/// 3 n(Integer)                                10 h(Object...)
/// ```
fn calc(fx: &Fixture) -> Vec<Arc<MethodRef>> {
    let interner = fx.interner();
    let calc = fx.named(CALC);
    let objects = interner.array(TypeId::OBJECT);
    let method = |name: &str, params: &[TypeId]| {
        MethodRef::method(calc, name, TypeId::VOID).with_parameter_types(params)
    };
    let definition = fx.register(
        TypeDefinition::class(interner, CALC)
            .with_method(method("m", &[TypeId::INT]))
            .with_method(method("m", &[TypeId::INT, TypeId::INT]))
            .with_method(method("n", &[TypeId::INT]))
            .with_method(method("n", &[TypeId::BOX_INT]))
            .with_method(method("g", &[TypeId::INT, TypeId::INT]))
            .with_method(method("g", &[objects]).with_flags(MethodFlags::VARARGS))
            .with_method(method("h", &[]))
            .with_method(method("cmp", &[TypeId::STRING]))
            .with_method(
                method("cmp", &[TypeId::OBJECT])
                    .with_flags(MethodFlags::BRIDGE | MethodFlags::SYNTHETIC),
            )
            .with_method(method("x", &[TypeId::STRING]))
            .with_method(method("h", &[objects]).with_flags(MethodFlags::VARARGS)),
    );
    definition.methods.clone()
}

#[test]
fn different_arity_is_not_ambiguous() {
    let fx = Fixture::new();
    let methods = calc(&fx);
    assert!(!is_overload_checking_required(&fx.db, &methods[0]));
    assert!(!is_overload_checking_required(&fx.db, &methods[1]));
}

#[test]
fn same_arity_overloads_are_ambiguous() {
    let fx = Fixture::new();
    let methods = calc(&fx);
    assert!(is_overload_checking_required(&fx.db, &methods[2]));
    assert!(is_overload_checking_required(&fx.db, &methods[3]));
}

#[test]
fn bridge_methods_are_ignored() {
    let fx = Fixture::new();
    let methods = calc(&fx);
    assert!(!is_overload_checking_required(&fx.db, &methods[7]));
}

#[test]
fn varargs_candidates_reach_longer_calls() {
    let fx = Fixture::new();
    let methods = calc(&fx);
    // g(int, int) could also bind to g(Object...).
    assert!(is_overload_checking_required(&fx.db, &methods[4]));
    // g(Object...) sees itself and every g with at least one parameter.
    assert!(is_overload_checking_required(&fx.db, &methods[5]));
    // h() and h(Object...) never reach each other: h() declares fewer
    // parameters and is not varargs itself.
    assert!(!is_overload_checking_required(&fx.db, &methods[6]));
    assert!(!is_overload_checking_required(&fx.db, &methods[10]));
}

#[test]
fn inherited_overloads_count() {
    let fx = Fixture::new();
    calc(&fx);
    let interner = fx.interner();
    let sub = fx.named(SUB);
    let definition = fx.register(
        TypeDefinition::class(interner, SUB)
            .with_base_type(Some(fx.named(CALC)))
            .with_method(
                MethodRef::method(sub, "x", TypeId::VOID).with_parameter_types(&[TypeId::INT]),
            )
            .with_method(
                MethodRef::method(sub, "m", TypeId::VOID).with_parameter_types(&[TypeId::INT]),
            ),
    );
    // x(int) here, x(String) in Calc.
    assert!(is_overload_checking_required(&fx.db, &definition.methods[0]));
    // m(int) overrides Calc.m(int); m(int, int) has another arity.
    assert!(!is_overload_checking_required(&fx.db, &definition.methods[1]));
}

#[test]
fn projected_methods_check_their_declaration() {
    let fx = Fixture::new();
    let add = fx.method(LIST, "add");
    // add(E) and add(int, E) differ in arity; Collection.add(E) is the same signature.
    assert!(!is_overload_checking_required(&fx.db, &add));

    let strings = fx.instance(LIST, &[TypeId::STRING]);
    let projected = crate::hierarchy::method_as_member_of(&fx.db, &add, strings);
    assert!(!is_overload_checking_required(&fx.db, &projected));
}
