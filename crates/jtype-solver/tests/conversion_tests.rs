use super::*;
use crate::fixtures::{Fixture, LIST};

// =============================================================================
// Primitives
// =============================================================================

#[test]
fn widening_table() {
    use PrimitiveKind::*;
    let cases = [
        (Int, Int, ConversionType::Identity),
        (Long, Int, ConversionType::Implicit),
        (Int, Byte, ConversionType::Implicit),
        (Int, Char, ConversionType::Implicit),
        (Double, Int, ConversionType::Implicit),
        (Double, Float, ConversionType::Implicit),
        (Int, Long, ConversionType::Explicit),
        (Float, Double, ConversionType::Explicit),
        (Byte, Int, ConversionType::Explicit),
        (Int, Float, ConversionType::Explicit),
        (Int, Boolean, ConversionType::None),
        (Char, Byte, ConversionType::None),
        (Boolean, Int, ConversionType::None),
    ];
    for (target, source, expected) in cases {
        assert_eq!(
            primitive_conversion_type(target, source),
            expected,
            "{source} -> {target}"
        );
    }
}

#[test]
fn has_implicit_numeric_conversion_needs_primitives() {
    let fx = Fixture::new();
    assert!(has_implicit_numeric_conversion(&fx.db, TypeId::LONG, TypeId::INT));
    assert!(has_implicit_numeric_conversion(&fx.db, TypeId::INT, TypeId::INT));
    assert!(!has_implicit_numeric_conversion(&fx.db, TypeId::INT, TypeId::LONG));
    assert!(!has_implicit_numeric_conversion(&fx.db, TypeId::LONG, TypeId::BOX_INT));
}

// =============================================================================
// Boxing
// =============================================================================

#[test]
fn boxing_classification() {
    let fx = Fixture::new();
    let db = &fx.db;
    let cases = [
        // (target, source, expected)
        (TypeId::BOX_INT, TypeId::BOX_INT, ConversionType::Identity),
        (TypeId::INT, TypeId::BOX_INT, ConversionType::Implicit),
        (TypeId::LONG, TypeId::BOX_INT, ConversionType::Implicit),
        (TypeId::INT, TypeId::BOX_LONG, ConversionType::None),
        (TypeId::BOX_INT, TypeId::INT, ConversionType::Implicit),
        (TypeId::BOX_LONG, TypeId::INT, ConversionType::Explicit),
        (TypeId::BOX_INT, TypeId::LONG, ConversionType::ExplicitToUnboxed),
        (TypeId::BOX_LONG, TypeId::BOX_INT, ConversionType::None),
        (TypeId::BOX_INT, TypeId::BOOLEAN, ConversionType::None),
    ];
    for (target, source, expected) in cases {
        assert_eq!(
            conversion_type(db, target, source),
            expected,
            "{source:?} -> {target:?}"
        );
    }
}

#[test]
fn boolean_boxing_is_implicit_but_never_numeric() {
    let fx = Fixture::new();
    let db = &fx.db;
    assert_eq!(
        conversion_type(db, TypeId::BOX_BOOLEAN, TypeId::BOOLEAN),
        ConversionType::Implicit
    );
    assert_eq!(
        conversion_type(db, TypeId::BOOLEAN, TypeId::BOOLEAN),
        ConversionType::Identity
    );
    assert_eq!(
        conversion_type(db, TypeId::INT, TypeId::BOOLEAN),
        ConversionType::None
    );
    assert_eq!(
        conversion_type(db, TypeId::BOOLEAN, TypeId::INT),
        ConversionType::None
    );
}

#[test]
fn box_helpers() {
    let fx = Fixture::new();
    let db = &fx.db;
    assert!(is_primitive_box_type(db, TypeId::BOX_VOID));
    assert!(is_primitive_box_type(db, TypeId::BOX_BOOLEAN));
    assert!(!is_primitive_box_type(db, TypeId::STRING));
    assert!(!is_primitive_box_type(db, TypeId::INT));
    assert_eq!(underlying_primitive_or_self(db, TypeId::BOX_CHAR), TypeId::CHAR);
    assert_eq!(underlying_primitive_or_self(db, TypeId::STRING), TypeId::STRING);
    assert_eq!(box_type(db, TypeId::INT), Some(TypeId::BOX_INT));
    assert_eq!(box_type(db, TypeId::STRING), None);
}

// =============================================================================
// References
// =============================================================================

#[test]
fn reference_conversions() {
    let fx = Fixture::new();
    let db = &fx.db;
    let strings = fx.instance(LIST, &[TypeId::STRING]);
    assert_eq!(conversion_type(db, strings, strings), ConversionType::Identity);
    assert_eq!(
        conversion_type(db, TypeId::OBJECT, TypeId::STRING),
        ConversionType::Implicit
    );
    assert_eq!(
        conversion_type(db, TypeId::STRING, TypeId::OBJECT),
        ConversionType::Explicit
    );
    assert_eq!(
        conversion_type(db, TypeId::BOX_INT, TypeId::STRING),
        ConversionType::Explicit
    );
    assert_eq!(
        conversion_type(db, TypeId::STRING, TypeId::NULL),
        ConversionType::Implicit
    );
}

#[test]
fn is_implicit_covers_identity_and_implicit() {
    assert!(ConversionType::Identity.is_implicit());
    assert!(ConversionType::Implicit.is_implicit());
    assert!(!ConversionType::Explicit.is_implicit());
    assert!(!ConversionType::ExplicitToUnboxed.is_implicit());
    assert!(!ConversionType::None.is_implicit());
}
