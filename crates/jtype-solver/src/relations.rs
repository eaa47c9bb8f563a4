//! Assignability, subtyping and type equivalence.
//!
//! All queries are permissive: an unresolvable type never raises, it simply
//! has no known supertypes beyond `Object`. Hierarchy walks visit each type at
//! most once and stop at the hierarchy iteration budget, so cyclic or
//! malformed class graphs terminate.

use crate::conversion::numeric_conversion_type;
use crate::db::TypeDatabase;
use crate::instantiate::substitute_with_provider;
use crate::query_trace;
use crate::types::{PrimitiveKind, TypeData, TypeId, WildcardBound};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::VecDeque;
use tracing::debug;

// =============================================================================
// Equivalence
// =============================================================================

/// Two types denote the same type.
///
/// Identical nodes are equivalent. Beyond that, arrays compare elements,
/// generic parameters compare declarations (ignoring substituted bounds), and
/// class types compare names; a raw class type is equivalent to any
/// instantiation of its definition.
pub fn are_equivalent(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> bool {
    if a == b {
        return true;
    }
    let interner = db.interner();
    let (Some(left), Some(right)) = (interner.lookup(a), interner.lookup(b)) else {
        return false;
    };
    match (left, right) {
        (TypeData::Array(x), TypeData::Array(y)) => are_equivalent(db, x, y),
        (
            TypeData::GenericParameter { param: x, .. },
            TypeData::GenericParameter { param: y, .. },
        ) => x == y,
        (TypeData::Wildcard(x), TypeData::Wildcard(y)) => match (x, y) {
            (WildcardBound::Unbounded, WildcardBound::Unbounded) => true,
            (WildcardBound::Extends(x), WildcardBound::Extends(y))
            | (WildcardBound::Super(x), WildcardBound::Super(y)) => are_equivalent(db, x, y),
            _ => false,
        },
        (
            TypeData::Named(_) | TypeData::GenericInstance { .. },
            TypeData::Named(_) | TypeData::GenericInstance { .. },
        ) => {
            if interner.internal_name(a) != interner.internal_name(b) {
                return false;
            }
            let arguments_match = match (interner.type_arguments(a), interner.type_arguments(b)) {
                (Some(x), Some(y)) => {
                    x.len() == y.len()
                        && x.iter().zip(y.iter()).all(|(&x, &y)| are_equivalent(db, x, y))
                }
                _ => true,
            };
            arguments_match
                && match (interner.enclosing_instance(a), interner.enclosing_instance(b)) {
                    (Some(x), Some(y)) => are_equivalent(db, x, y),
                    _ => true,
                }
        }
        _ => false,
    }
}

// =============================================================================
// Assignability
// =============================================================================

/// Can a value of `source` be stored in a location of type `target`?
///
/// - arrays: both arrays with assignable element types, so `long[]` accepts
///   `int[]` the way `long` accepts `int`;
/// - primitive target: `null` never; `boolean`/`char` only from the same
///   primitive or its box; otherwise an identity or implicit numeric
///   conversion, unboxing included;
/// - primitive source: `boolean` only to `boolean`/`Boolean`; otherwise an
///   identity or implicit numeric conversion, boxing included;
/// - references: `null` source, `Object` target, or a subtype relation.
pub fn is_assignable_from(db: &dyn TypeDatabase, target: TypeId, source: TypeId) -> bool {
    if !query_trace::enabled() {
        return is_assignable_from_core(db, target, source, 0);
    }
    let query_id = query_trace::start("is_assignable_from", &[source, target]);
    let result = is_assignable_from_core(db, target, source, 0);
    query_trace::finish(query_id, "is_assignable_from", result);
    result
}

/// `depth` counts nested containment checks between type arguments.
fn is_assignable_from_core(
    db: &dyn TypeDatabase,
    target: TypeId,
    source: TypeId,
    depth: u32,
) -> bool {
    if target == source {
        return true;
    }
    if depth >= db.config().hierarchy.max_depth() {
        debug!(target = target.0, source = source.0, "assignability depth limit reached");
        return false;
    }
    let interner = db.interner();

    if let Some(target_element) = interner.element_type(target) {
        let Some(source_element) = interner.element_type(source) else {
            return source == TypeId::NULL;
        };
        return is_assignable_from_core(db, target_element, source_element, depth);
    }

    if let Some(target_kind) = interner.primitive_kind(target) {
        if source == TypeId::NULL {
            return false;
        }
        if matches!(target_kind, PrimitiveKind::Boolean | PrimitiveKind::Char) {
            let underlying = interner
                .primitive_kind(source)
                .or_else(|| interner.boxed_primitive(source));
            return underlying == Some(target_kind);
        }
        return numeric_conversion_type(db, target, source).is_implicit();
    }

    if let Some(source_kind) = interner.primitive_kind(source) {
        if source_kind == PrimitiveKind::Boolean {
            return interner.boxed_primitive(target) == Some(PrimitiveKind::Boolean);
        }
        return numeric_conversion_type(db, target, source).is_implicit();
    }

    source == TypeId::NULL
        || target == TypeId::OBJECT
        || is_sub_type_at(db, source, target, depth)
}

// =============================================================================
// Subtyping
// =============================================================================

/// Is `ty` (or one of its supertypes) an instantiation of `base`?
///
/// Walks the base-type chain, and super-interfaces too when `base` is an
/// interface. Type arguments of `base` must contain the corresponding
/// arguments of the matching ancestor (wildcards accept their bounds).
pub fn is_sub_type(db: &dyn TypeDatabase, ty: TypeId, base: TypeId) -> bool {
    is_sub_type_at(db, ty, base, 0)
}

fn is_sub_type_at(db: &dyn TypeDatabase, ty: TypeId, base: TypeId, depth: u32) -> bool {
    if ty == base {
        return true;
    }
    let base_is_interface = db.resolve(base).is_some_and(|def| def.is_interface());
    let budget = db.config().hierarchy.max_iterations() as usize;

    let mut visited = FxHashSet::default();
    let mut agenda = VecDeque::from([ty]);
    while let Some(current) = agenda.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if visited.len() > budget {
            debug!(ty = ty.0, base = base.0, "is_sub_type: hierarchy budget exhausted");
            return false;
        }
        if matches_instantiation(db, current, base, depth) {
            return true;
        }
        agenda.extend(direct_supertypes(db, current, base_is_interface));
    }
    false
}

/// Supertypes one step up from `ty`, substituted with `ty`'s arguments.
pub(crate) fn direct_supertypes(
    db: &dyn TypeDatabase,
    ty: TypeId,
    include_interfaces: bool,
) -> SmallVec<[TypeId; 4]> {
    let interner = db.interner();
    let mut supertypes = SmallVec::new();
    match interner.lookup(ty) {
        Some(TypeData::GenericParameter { .. }) => {
            supertypes.push(interner.upper_bound(ty).unwrap_or(TypeId::OBJECT));
        }
        Some(TypeData::Wildcard(WildcardBound::Extends(bound))) => supertypes.push(bound),
        Some(TypeData::Wildcard(_)) => supertypes.push(TypeId::OBJECT),
        Some(TypeData::Array(_)) => {
            supertypes.extend([TypeId::OBJECT, TypeId::CLONEABLE, TypeId::SERIALIZABLE]);
        }
        Some(TypeData::Named(_) | TypeData::GenericInstance { .. }) => {
            supertypes.extend(base_type(db, ty));
            if include_interfaces {
                supertypes.extend(interfaces(db, ty));
            }
        }
        Some(TypeData::Primitive(_) | TypeData::Null) | None => {}
    }
    supertypes
}

/// `current` names the same class as `base` and its arguments fit `base`'s.
fn matches_instantiation(db: &dyn TypeDatabase, current: TypeId, base: TypeId, depth: u32) -> bool {
    if current == base {
        return true;
    }
    let interner = db.interner();
    let (Some(current_name), Some(base_name)) =
        (interner.internal_name(current), interner.internal_name(base))
    else {
        return are_equivalent(db, current, base);
    };
    if current_name != base_name {
        return false;
    }
    let outer_matches = match (
        interner.enclosing_instance(base),
        interner.enclosing_instance(current),
    ) {
        (Some(expected), Some(actual)) => matches_instantiation(db, actual, expected, depth),
        _ => true,
    };
    outer_matches
        && match (interner.type_arguments(base), interner.type_arguments(current)) {
            (Some(expected), Some(actual)) => {
                expected.len() == actual.len()
                    && expected
                        .iter()
                        .zip(actual.iter())
                        .all(|(&expected, &actual)| contains_argument(db, expected, actual, depth))
            }
            _ => true,
        }
}

/// Type argument containment: does `target_arg` admit `source_arg`?
fn contains_argument(
    db: &dyn TypeDatabase,
    target_arg: TypeId,
    source_arg: TypeId,
    depth: u32,
) -> bool {
    if target_arg == source_arg {
        return true;
    }
    let assignable = |target, source| is_assignable_from_core(db, target, source, depth + 1);
    let interner = db.interner();
    let source_bound = match interner.lookup(source_arg) {
        Some(TypeData::Wildcard(bound)) => Some(bound),
        _ => None,
    };
    match interner.lookup(target_arg) {
        Some(TypeData::Wildcard(WildcardBound::Unbounded)) => true,
        Some(TypeData::Wildcard(WildcardBound::Extends(bound))) => match source_bound {
            Some(WildcardBound::Extends(source)) => assignable(bound, source),
            Some(_) => bound == TypeId::OBJECT,
            None => assignable(bound, source_arg),
        },
        Some(TypeData::Wildcard(WildcardBound::Super(bound))) => match source_bound {
            Some(WildcardBound::Super(source)) => assignable(source, bound),
            Some(_) => false,
            None => assignable(source_arg, bound),
        },
        _ => are_equivalent(db, target_arg, source_arg),
    }
}

// =============================================================================
// Supertype accessors
// =============================================================================

/// Declared base type of `ty`, substituted with `ty`'s type arguments.
pub fn base_type(db: &dyn TypeDatabase, ty: TypeId) -> Option<TypeId> {
    let resolved = db.resolve(ty)?;
    let base = resolved.base_type?;
    Some(substitute_with_provider(db, base, ty))
}

/// Declared interfaces of `ty`, substituted with `ty`'s type arguments.
pub fn interfaces(db: &dyn TypeDatabase, ty: TypeId) -> Vec<TypeId> {
    let Some(resolved) = db.resolve(ty) else {
        return Vec::new();
    };
    resolved
        .interfaces
        .iter()
        .map(|&interface| substitute_with_provider(db, interface, ty))
        .collect()
}

/// Is `inner` lexically nested in `outer`, directly, transitively, or
/// through an inherited enclosing type?
pub fn is_enclosed_by(db: &dyn TypeDatabase, inner: TypeId, outer: TypeId) -> bool {
    let mut visited = FxHashSet::default();
    let mut next = Some(inner);
    while let Some(current) = next.take() {
        if !visited.insert(current) {
            return false;
        }
        let Some(resolved) = db.resolve(current) else {
            return false;
        };
        let mut enclosing_seen = FxHashSet::default();
        let mut declaring = resolved.declaring_type;
        while let Some(enclosing) = declaring {
            if are_equivalent(db, enclosing, outer) {
                return true;
            }
            if !enclosing_seen.insert(enclosing) {
                break;
            }
            declaring = db.resolve(enclosing).and_then(|def| def.declaring_type);
        }
        next = resolved.base_type;
    }
    false
}

#[cfg(test)]
#[path = "../tests/relations_tests.rs"]
mod tests;
