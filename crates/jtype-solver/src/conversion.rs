//! Conversion classification between primitive, boxed and reference types.
//!
//! ## Primitive widening
//!
//! | target | accepts implicitly |
//! |--------|--------------------|
//! | `float`, `double` | any non-boolean source no wider than the target |
//! | `byte`, `short`, `int`, `long` | integral sources no wider than the target |
//! | `boolean`, `char` | only themselves |
//!
//! Boxing and unboxing are layered on top: a boxed source converts through its
//! primitive, a primitive source reaches a boxed target through the target's
//! primitive.

use crate::db::TypeDatabase;
use crate::query_trace;
use crate::relations::{are_equivalent, is_assignable_from};
use crate::types::{PrimitiveKind, TypeId};
use serde::Serialize;

/// How a value of one type converts to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionType {
    Identity,
    Implicit,
    Explicit,
    /// A cast to the target's primitive is needed before boxing.
    ExplicitToUnboxed,
    None,
}

impl ConversionType {
    pub fn is_implicit(self) -> bool {
        matches!(self, Self::Identity | Self::Implicit)
    }
}

/// Classify converting `source` to `target`.
///
/// Primitive or boxed pairs with a numeric side use
/// [`numeric_conversion_type`], so `boolean` never converts to a number;
/// everything else is `Identity` when
/// equivalent, `Implicit` when assignable and `Explicit` (a cast) otherwise.
pub fn conversion_type(db: &dyn TypeDatabase, target: TypeId, source: TypeId) -> ConversionType {
    if !query_trace::enabled() {
        return conversion_type_core(db, target, source);
    }
    let query_id = query_trace::start("conversion_type", &[source, target]);
    let result = conversion_type_core(db, target, source);
    query_trace::finish(query_id, "conversion_type", result);
    result
}

fn conversion_type_core(db: &dyn TypeDatabase, target: TypeId, source: TypeId) -> ConversionType {
    let interner = db.interner();
    let target_kind = interner.primitive_kind(underlying_primitive_or_self(db, target));
    let source_kind = interner.primitive_kind(underlying_primitive_or_self(db, source));
    if let (Some(target_kind), Some(source_kind)) = (target_kind, source_kind) {
        if target_kind.is_numeric() || source_kind.is_numeric() {
            return numeric_conversion_type(db, target, source);
        }
    }
    if are_equivalent(db, target, source) {
        return ConversionType::Identity;
    }
    if is_assignable_from(db, target, source) {
        return ConversionType::Implicit;
    }
    ConversionType::Explicit
}

/// Classify a numeric conversion, boxing and unboxing included.
///
/// - same boxed type: `Identity`;
/// - boxed source: unbox, then `Identity`/`Implicit` become `Implicit` and an
///   `Explicit` narrowing becomes `None`;
/// - boxed target: convert to its primitive, then `Identity` becomes
///   `Implicit`, `Explicit` becomes `ExplicitToUnboxed` and anything else
///   `Explicit`;
/// - two primitives: the widening table.
pub fn numeric_conversion_type(
    db: &dyn TypeDatabase,
    target: TypeId,
    source: TypeId,
) -> ConversionType {
    let interner = db.interner();

    if target == source && numeric_box(db, target).is_some() {
        return ConversionType::Identity;
    }

    let source_kind = match interner.primitive_kind(source) {
        Some(kind) => kind,
        None => {
            let Some(unboxed) = numeric_box(db, source) else {
                return ConversionType::None;
            };
            return match numeric_conversion_type(db, target, unboxed.type_id()) {
                ConversionType::Identity | ConversionType::Implicit => ConversionType::Implicit,
                ConversionType::Explicit => ConversionType::None,
                other => other,
            };
        }
    };

    let target_kind = match interner.primitive_kind(target) {
        Some(kind) => kind,
        None => {
            let Some(unboxed) = numeric_box(db, target) else {
                return ConversionType::None;
            };
            return match numeric_conversion_type(db, unboxed.type_id(), source) {
                ConversionType::Identity => ConversionType::Implicit,
                ConversionType::Explicit => ConversionType::ExplicitToUnboxed,
                ConversionType::None => ConversionType::None,
                _ => ConversionType::Explicit,
            };
        }
    };

    primitive_conversion_type(target_kind, source_kind)
}

/// Widening table between two primitives.
pub fn primitive_conversion_type(target: PrimitiveKind, source: PrimitiveKind) -> ConversionType {
    if target == source {
        return ConversionType::Identity;
    }
    if source == PrimitiveKind::Boolean || source == PrimitiveKind::Void {
        return ConversionType::None;
    }
    match target {
        PrimitiveKind::Float | PrimitiveKind::Double => {
            if source.bit_width() <= target.bit_width() {
                ConversionType::Implicit
            } else {
                ConversionType::Explicit
            }
        }
        PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Int | PrimitiveKind::Long => {
            if source.is_integral() && source.bit_width() <= target.bit_width() {
                ConversionType::Implicit
            } else {
                ConversionType::Explicit
            }
        }
        PrimitiveKind::Boolean | PrimitiveKind::Char | PrimitiveKind::Void => ConversionType::None,
    }
}

/// True if primitive `source` widens to primitive `target` without a cast.
pub fn has_implicit_numeric_conversion(
    db: &dyn TypeDatabase,
    target: TypeId,
    source: TypeId,
) -> bool {
    if target == source {
        return true;
    }
    let interner = db.interner();
    match (interner.primitive_kind(target), interner.primitive_kind(source)) {
        (Some(target), Some(source)) => primitive_conversion_type(target, source).is_implicit(),
        _ => false,
    }
}

/// True for the nine `java.lang` box classes, `Void` and `Boolean` included.
pub fn is_primitive_box_type(db: &dyn TypeDatabase, ty: TypeId) -> bool {
    db.interner().boxed_primitive(ty).is_some()
}

/// The primitive a box class wraps, or `ty` unchanged.
pub fn underlying_primitive_or_self(db: &dyn TypeDatabase, ty: TypeId) -> TypeId {
    db.interner()
        .boxed_primitive(ty)
        .map_or(ty, PrimitiveKind::type_id)
}

/// Box class of a primitive type, or `None` for reference types.
pub fn box_type(db: &dyn TypeDatabase, ty: TypeId) -> Option<TypeId> {
    db.interner()
        .primitive_kind(ty)
        .map(PrimitiveKind::box_type_id)
}

/// Box classes that take part in numeric conversion (`Boolean` and `Void`
/// do not).
fn numeric_box(db: &dyn TypeDatabase, ty: TypeId) -> Option<PrimitiveKind> {
    db.interner()
        .boxed_primitive(ty)
        .filter(|kind| !matches!(kind, PrimitiveKind::Boolean | PrimitiveKind::Void))
}

#[cfg(test)]
#[path = "../tests/conversion_tests.rs"]
mod tests;
