use super::*;
use crate::fixtures::{
    ABSTRACT_LIST, ARRAY_LIST, COLLECTION, Fixture, HASH_MAP, INNER, LIST, MAP, OUTER,
    RANDOM_ACCESS, STRING_LIST,
};
use crate::types::GenericParamId;

fn param_id(fx: &Fixture, owner: &str, name: &str) -> GenericParamId {
    fx.interner()
        .generic_param_id(fx.param(owner, name))
        .expect("generic parameter")
}

/// `D<X, Y> implements I<X>, J<Y>` with `J<Z> extends I<Z>`.
fn register_diamond(fx: &Fixture) -> TypeId {
    let interner = fx.interner();
    let i = fx.named("demo/I");
    let j = fx.named("demo/J");
    let a = fx.declare("demo/I", &["A"]);
    fx.register(TypeDefinition::interface(interner, "demo/I").with_generic_parameters(a));
    let z = fx.declare("demo/J", &["Z"]);
    fx.register(
        TypeDefinition::interface(interner, "demo/J")
            .with_generic_parameters(z.clone())
            .with_interfaces(vec![interner.generic_instance(i, &z)]),
    );
    let xy = fx.declare("demo/D", &["X", "Y"]);
    fx.register(
        TypeDefinition::class(interner, "demo/D")
            .with_generic_parameters(xy.clone())
            .with_interfaces(vec![
                interner.generic_instance(i, &[xy[0]]),
                interner.generic_instance(j, &[xy[1]]),
            ]),
    );
    fx.named("demo/D")
}

// =============================================================================
// Sub-type mappings
// =============================================================================

#[test]
fn mapping_through_implemented_interface() {
    let fx = Fixture::new();
    let bindings = sub_type_mappings(
        &fx.db,
        fx.named(ARRAY_LIST),
        fx.instance(LIST, &[TypeId::STRING]),
    );
    assert_eq!(bindings.len(), 1);
    assert_eq!(
        bindings.bound_type(param_id(&fx, ARRAY_LIST, "E")),
        Some(TypeId::STRING)
    );
}

#[test]
fn mapping_binds_every_argument() {
    let fx = Fixture::new();
    let bindings = sub_type_mappings(
        &fx.db,
        fx.named(HASH_MAP),
        fx.instance(MAP, &[TypeId::STRING, TypeId::BOX_INT]),
    );
    assert_eq!(
        bindings.bound_type(param_id(&fx, HASH_MAP, "K")),
        Some(TypeId::STRING)
    );
    assert_eq!(
        bindings.bound_type(param_id(&fx, HASH_MAP, "V")),
        Some(TypeId::BOX_INT)
    );
}

#[test]
fn raw_ancestor_binds_definition_parameters() {
    let fx = Fixture::new();
    let interner = fx.interner();
    fx.register(
        TypeDefinition::class(interner, "demo/RawList").with_interfaces(vec![fx.named(LIST)]),
    );
    let bindings = sub_type_mappings(
        &fx.db,
        fx.named("demo/RawList"),
        fx.instance(LIST, &[TypeId::STRING]),
    );
    assert_eq!(
        bindings.bound_type(param_id(&fx, LIST, "E")),
        Some(TypeId::STRING)
    );
}

#[test]
fn mapping_compares_arrays_by_element() {
    let fx = Fixture::new();
    let interner = fx.interner();
    let bindings = sub_type_mappings(
        &fx.db,
        interner.array(fx.named(ARRAY_LIST)),
        interner.array(fx.instance(LIST, &[TypeId::STRING])),
    );
    assert_eq!(
        bindings.bound_type(param_id(&fx, ARRAY_LIST, "E")),
        Some(TypeId::STRING)
    );
}

#[test]
fn unrelated_or_non_generic_bases_map_nothing() {
    let fx = Fixture::new();
    let strings = fx.instance(ARRAY_LIST, &[TypeId::STRING]);
    assert!(sub_type_mappings(&fx.db, strings, fx.named(RANDOM_ACCESS)).is_empty());
    assert!(
        sub_type_mappings(&fx.db, TypeId::STRING, fx.instance(LIST, &[TypeId::STRING]))
            .is_empty()
    );
    assert!(sub_type_mappings(&fx.db, fx.named("demo/Missing"), strings).is_empty());
}

#[test]
fn single_path_has_no_conflicts() {
    let fx = Fixture::new();
    let mappings = sub_type_mappings_checked(
        &fx.db,
        fx.named(ARRAY_LIST),
        fx.instance(LIST, &[TypeId::STRING]),
    );
    assert!(!mappings.has_conflicts());
    assert_eq!(
        mappings.ancestor,
        Some(fx.instance(LIST, &[fx.param(ARRAY_LIST, "E")]))
    );
}

#[test]
fn diamond_reports_conflicting_paths() {
    let fx = Fixture::new();
    let d = register_diamond(&fx);
    let i_of_string = fx.instance("demo/I", &[TypeId::STRING]);
    let x = param_id(&fx, "demo/D", "X");
    let y = param_id(&fx, "demo/D", "Y");

    let mappings = sub_type_mappings_checked(&fx.db, d, i_of_string);
    assert!(mappings.has_conflicts());
    assert_eq!(mappings.bindings.bound_type(x), Some(TypeId::STRING));
    assert_eq!(mappings.conflicts.len(), 1);
    assert_eq!(
        mappings.conflicts[0].ancestor,
        fx.instance("demo/I", &[fx.param("demo/D", "Y")])
    );
    assert_eq!(mappings.conflicts[0].bindings.bound_type(y), Some(TypeId::STRING));

    // The unchecked form keeps the first path only.
    let first = sub_type_mappings(&fx.db, d, i_of_string);
    assert_eq!(first, mappings.bindings);
    assert_eq!(first.bound_type(y), None);
}

// =============================================================================
// Projections
// =============================================================================

#[test]
fn instantiate_as_super_type_carries_arguments() {
    let fx = Fixture::new();
    let db = &fx.db;
    let strings = fx.instance(ARRAY_LIST, &[TypeId::STRING]);
    assert_eq!(
        instantiate_as_super_type(db, strings, fx.named(COLLECTION)),
        Some(fx.instance(COLLECTION, &[TypeId::STRING]))
    );
    assert_eq!(
        instantiate_as_super_type(db, fx.named(STRING_LIST), fx.named(LIST)),
        Some(fx.instance(LIST, &[TypeId::STRING]))
    );
    assert_eq!(
        instantiate_as_super_type(db, strings, fx.named(ARRAY_LIST)),
        Some(strings)
    );
    assert_eq!(instantiate_as_super_type(db, TypeId::STRING, fx.named(LIST)), None);
}

#[test]
fn as_sub_type_specializes_raw_type() {
    let fx = Fixture::new();
    assert_eq!(
        as_sub_type(
            &fx.db,
            fx.named(HASH_MAP),
            fx.instance(MAP, &[TypeId::STRING, TypeId::BOX_INT])
        ),
        fx.instance(HASH_MAP, &[TypeId::STRING, TypeId::BOX_INT])
    );
    // Nothing to learn from an unrelated base.
    let array_list = fx.named(ARRAY_LIST);
    assert_eq!(as_sub_type(&fx.db, array_list, TypeId::STRING), array_list);
}

#[test]
fn method_projected_onto_instantiation() {
    let fx = Fixture::new();
    let get = fx.method(LIST, "get");
    let strings = fx.instance(LIST, &[TypeId::STRING]);

    let projected = method_as_member_of(&fx.db, &get, strings);
    assert_eq!(projected.return_type, TypeId::STRING);
    assert_eq!(projected.declaring_type, strings);
    assert!(Arc::ptr_eq(&projected.resolve(), &get));
    // Projection is deterministic on interned types.
    assert_eq!(
        method_as_member_of(&fx.db, &get, strings).return_type,
        projected.return_type
    );
}

#[test]
fn inherited_method_projected_onto_subtype() {
    let fx = Fixture::new();
    let set = fx.method(LIST, "set");
    let strings = fx.instance(ARRAY_LIST, &[TypeId::STRING]);

    let projected = method_as_member_of(&fx.db, &set, strings);
    assert_eq!(projected.declaring_type, strings);
    assert_eq!(projected.return_type, TypeId::STRING);
    assert_eq!(
        projected.parameter_types().collect::<Vec<_>>(),
        vec![TypeId::INT, TypeId::STRING]
    );
    assert!(Arc::ptr_eq(&projected.resolve(), &set));
}

#[test]
fn field_projected_onto_non_generic_subclass() {
    let fx = Fixture::new();
    let field = Arc::clone(&fx.definition(ARRAY_LIST).fields[0]);
    let string_list = fx.named(STRING_LIST);

    let projected = as_member_of(&fx.db, &MemberRef::from(Arc::clone(&field)), string_list);
    assert_eq!(projected.declaring_type(), string_list);
    let projected = projected.as_field().expect("field");
    assert_eq!(projected.field_type, fx.interner().array(TypeId::OBJECT));
    assert!(Arc::ptr_eq(&projected.resolve(), &field));
}

#[test]
fn inner_class_members_see_enclosing_arguments() {
    let fx = Fixture::new();
    fx.register_outer();
    let interner = fx.interner();
    let base = interner.inner_instance(fx.instance(OUTER, &[TypeId::STRING]), fx.named(INNER), &[]);

    let value = Arc::clone(&fx.definition(INNER).fields[0]);
    let projected = field_as_member_of(&fx.db, &value, base);
    assert_eq!(projected.field_type, TypeId::STRING);
    assert_eq!(projected.declaring_type, base);

    let methods = find_methods(&fx.db, base, |method| &*method.name == "get");
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].return_type, TypeId::STRING);
}

#[test]
fn outer_method_returns_inner_instance() {
    let fx = Fixture::new();
    fx.register_outer();
    let outer_of_strings = fx.instance(OUTER, &[TypeId::STRING]);
    let projected = method_as_member_of(&fx.db, &fx.method(OUTER, "inner"), outer_of_strings);
    assert_eq!(
        projected.return_type,
        fx.interner()
            .inner_instance(outer_of_strings, fx.named(INNER), &[])
    );
}

#[test]
fn unchanged_projection_returns_same_member() {
    let fx = Fixture::new();
    let size = MemberRef::from(fx.method(COLLECTION, "size"));
    let projected = as_member_of(&fx.db, &size, fx.named(COLLECTION));
    assert!(projected.ptr_eq(&size));
}

// =============================================================================
// Method lookup
// =============================================================================

#[test]
fn find_methods_hides_overridden_signatures() {
    let fx = Fixture::new();
    let strings = fx.instance(ARRAY_LIST, &[TypeId::STRING]);

    // ArrayList: <init>, get, ensureCapacity; List: add, add, set; Collection: size.
    let all = find_all_methods(&fx.db, strings);
    assert_eq!(all.len(), 7);
    assert!(all.iter().all(|method| method.declaring_type == strings));

    let gets = find_methods(&fx.db, strings, |method| &*method.name == "get");
    assert_eq!(gets.len(), 1);
    assert_eq!(gets[0].return_type, TypeId::STRING);
    assert_eq!(gets[0].resolve().declaring_type, fx.named(ARRAY_LIST));
}

#[test]
fn find_methods_keeps_overloads_and_drops_inherited_duplicates() {
    let fx = Fixture::new();
    let strings = fx.instance(ARRAY_LIST, &[TypeId::STRING]);
    let adds = find_methods(&fx.db, strings, |method| &*method.name == "add");
    assert_eq!(adds.len(), 2);
    assert!(
        adds.iter()
            .all(|method| method.resolve().declaring_type == fx.named(LIST))
    );
    assert_eq!(
        adds[0].parameter_types().collect::<Vec<_>>(),
        vec![TypeId::STRING]
    );
    assert_eq!(
        adds[1].parameter_types().collect::<Vec<_>>(),
        vec![TypeId::INT, TypeId::STRING]
    );
}

#[test]
fn find_methods_through_non_generic_subclass() {
    let fx = Fixture::new();
    let string_list = fx.named(STRING_LIST);
    let gets = find_methods(&fx.db, string_list, |method| &*method.name == "get");
    assert_eq!(gets.len(), 1);
    assert_eq!(gets[0].declaring_type, string_list);
    assert_eq!(gets[0].return_type, TypeId::STRING);
    assert_eq!(
        gets[0].resolve().declaring_type,
        fx.named(ARRAY_LIST)
    );
}

#[test]
fn find_methods_on_unresolved_type_is_empty() {
    let fx = Fixture::new();
    assert!(find_all_methods(&fx.db, fx.named("demo/Missing")).is_empty());
    // Abstract declarations are still visible.
    let abstract_gets = find_methods(
        &fx.db,
        fx.instance(ABSTRACT_LIST, &[TypeId::BOX_INT]),
        |method| &*method.name == "get",
    );
    assert_eq!(abstract_gets.len(), 1);
    assert_eq!(abstract_gets[0].return_type, TypeId::BOX_INT);
}
