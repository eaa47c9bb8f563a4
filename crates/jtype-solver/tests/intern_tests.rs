use super::*;
use rayon::prelude::*;

const LIST: &str = "java/util/List";

fn list_param(interner: &TypeInterner) -> TypeId {
    interner.declare_generic_parameter(GenericOwner::Type(Arc::from(LIST)), 0, "E")
}

// =============================================================================
// Builtins
// =============================================================================

#[test]
fn builtins_have_fixed_ids() {
    let interner = TypeInterner::new();
    assert_eq!(interner.len(), TypeId::FIRST_USER as usize);
    for kind in PrimitiveKind::ALL {
        assert_eq!(interner.lookup(kind.type_id()), Some(TypeData::Primitive(kind)));
        assert_eq!(
            interner.internal_name(kind.box_type_id()).as_deref(),
            Some(kind.box_internal_name())
        );
    }
    assert_eq!(interner.lookup(TypeId::NULL), Some(TypeData::Null));
    assert_eq!(interner.named("java/lang/Object"), TypeId::OBJECT);
    assert_eq!(interner.named("java/lang/String"), TypeId::STRING);
    assert_eq!(interner.named("java/io/Serializable"), TypeId::SERIALIZABLE);
    assert_eq!(interner.primitive(PrimitiveKind::Long), TypeId::LONG);
}

#[test]
fn boxed_primitive_only_for_box_classes() {
    let interner = TypeInterner::new();
    assert_eq!(interner.boxed_primitive(TypeId::BOX_INT), Some(PrimitiveKind::Int));
    assert_eq!(interner.boxed_primitive(TypeId::BOX_VOID), Some(PrimitiveKind::Void));
    assert_eq!(interner.boxed_primitive(TypeId::INT), None);
    assert_eq!(interner.boxed_primitive(TypeId::STRING), None);
}

// =============================================================================
// Hash-consing
// =============================================================================

#[test]
fn structurally_equal_nodes_share_an_id() {
    let interner = TypeInterner::new();
    let list = interner.named(LIST);
    assert_eq!(interner.named(LIST), list);
    let a = interner.generic_instance(list, &[TypeId::STRING]);
    let b = interner.generic_instance(list, &[TypeId::STRING]);
    assert_eq!(a, b);
    assert_ne!(a, interner.generic_instance(list, &[TypeId::BOX_INT]));
    assert_eq!(interner.array(a), interner.array(b));
}

#[test]
fn empty_argument_list_is_the_definition() {
    let interner = TypeInterner::new();
    let list = interner.named(LIST);
    assert_eq!(interner.generic_instance(list, &[]), list);
}

#[test]
fn stats_count_instances_and_hits() {
    let interner = TypeInterner::new();
    let list = interner.named(LIST);
    interner.generic_instance(list, &[TypeId::STRING]);
    interner.generic_instance(list, &[TypeId::STRING]);
    interner.generic_instance(list, &[TypeId::OBJECT]);
    let stats = interner.stats();
    assert_eq!(stats.generic_instances_created, 2);
    assert_eq!(stats.generic_instance_hits, 1);
    assert_eq!(stats.types, interner.len());
}

#[test]
fn concurrent_interning_converges_on_one_id() {
    let interner = TypeInterner::new();
    let ids: Vec<TypeId> = (0..256)
        .into_par_iter()
        .map(|i| {
            let list = interner.named(LIST);
            let element = if i % 2 == 0 {
                TypeId::STRING
            } else {
                interner.named("java/lang/String")
            };
            interner.generic_instance(list, &[element])
        })
        .collect();
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(interner.stats().generic_instances_created, 1);
    assert!(matches!(
        interner.lookup(ids[0]),
        Some(TypeData::GenericInstance { .. })
    ));
}

#[test]
fn concurrent_parameter_declaration_dedups() {
    let interner = TypeInterner::new();
    let params: Vec<TypeId> = (0..64)
        .into_par_iter()
        .map(|_| list_param(&interner))
        .collect();
    assert!(params.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(interner.stats().generic_parameters, 1);
}

// =============================================================================
// Arrays
// =============================================================================

#[test]
fn array_rank_strips_every_dimension() {
    let interner = TypeInterner::new();
    let matrix = interner.array_of_rank(TypeId::INT, 2);
    assert_eq!(interner.array_rank(matrix), (2, TypeId::INT));
    assert_eq!(interner.element_type(matrix), Some(interner.array(TypeId::INT)));
    assert_eq!(interner.array_rank(TypeId::STRING), (0, TypeId::STRING));
    assert_eq!(interner.array_of_rank(TypeId::STRING, 0), TypeId::STRING);
}

// =============================================================================
// Generic parameters
// =============================================================================

#[test]
fn parameter_identity_is_owner_position_and_name() {
    let interner = TypeInterner::new();
    let e = list_param(&interner);
    assert_eq!(list_param(&interner), e);
    let other = interner.declare_generic_parameter(
        GenericOwner::Type(Arc::from("java/util/Set")),
        0,
        "E",
    );
    assert_ne!(other, e);
    let info = interner
        .generic_param_info(interner.generic_param_id(e).expect("parameter id"))
        .expect("parameter info");
    assert_eq!(&*info.name, "E");
    assert_eq!(info.position, 0);
    assert_eq!(info.owner.type_name(), LIST);
    assert_eq!(info.upper_bound, None);
}

#[test]
fn self_referential_bound_is_set_after_declaration() {
    let interner = TypeInterner::new();
    let comparable = interner.named("java/lang/Comparable");
    let t = interner.declare_generic_parameter(
        GenericOwner::Type(Arc::from("demo/Sorted")),
        0,
        "T",
    );
    let bound = interner.generic_instance(comparable, &[t]);
    assert!(interner.set_upper_bound(t, bound));
    assert_eq!(interner.upper_bound(t), Some(bound));
    assert!(!interner.set_upper_bound(TypeId::STRING, bound));
}

#[test]
fn substituted_bound_keeps_declaration_identity() {
    let interner = TypeInterner::new();
    let e = list_param(&interner);
    interner.set_upper_bound(e, TypeId::OBJECT);
    let param = interner.generic_param_id(e).expect("parameter id");

    let narrowed = interner.generic_parameter_with_bound(param, TypeId::STRING);
    assert_ne!(narrowed, e);
    assert_eq!(interner.generic_param_id(narrowed), Some(param));
    assert_eq!(interner.upper_bound(narrowed), Some(TypeId::STRING));

    // Re-applying the declared bound collapses to the declared node.
    assert_eq!(interner.generic_parameter_with_bound(param, TypeId::OBJECT), e);
}

#[test]
fn wildcards_report_their_bounds() {
    let interner = TypeInterner::new();
    let extends = interner.wildcard_extends(TypeId::STRING);
    assert!(interner.is_wildcard(extends));
    assert_eq!(interner.upper_bound(extends), Some(TypeId::STRING));
    assert_eq!(interner.upper_bound(interner.wildcard_super(TypeId::STRING)), None);
    assert_eq!(interner.unbounded_wildcard(), interner.unbounded_wildcard());
}

#[test]
fn instance_reports_definition_name() {
    let interner = TypeInterner::new();
    let list = interner.named(LIST);
    let strings = interner.generic_instance(list, &[TypeId::STRING]);
    assert_eq!(interner.internal_name(strings).as_deref(), Some(LIST));
    assert_eq!(interner.generic_definition(strings), list);
    assert_eq!(interner.generic_definition(list), list);
    assert_eq!(
        interner.type_arguments(strings).as_deref(),
        Some(&[TypeId::STRING][..])
    );
    assert_eq!(interner.internal_name(TypeId::INT), None);
}

#[test]
fn foreign_ids_are_not_found() {
    let interner = TypeInterner::new();
    assert_eq!(interner.lookup(TypeId(u32::MAX)), None);
    assert!(!interner.is_primitive(TypeId(u32::MAX)));
}
