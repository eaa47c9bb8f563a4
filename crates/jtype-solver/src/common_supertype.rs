//! Least common supertype of two types.

use crate::db::TypeDatabase;
use crate::instantiate::substitute_with_provider;
use crate::query_trace;
use crate::relations::{base_type, interfaces, is_assignable_from};
use crate::types::{PrimitiveKind, TypeData, TypeId, WildcardBound};
use rustc_hash::FxHashSet;
use tracing::debug;

/// The most specific type both `a` and `b` can be stored in.
///
/// 1. Arrays of different rank meet at `Object`.
/// 2. Two primitive scalars meet at their binary numeric promotion
///    (`double` > `float` > `long` > `int`). Arrays of primitives meet at
///    themselves when the element kinds match and at `Object` otherwise; a
///    primitive never meets a reference type below `Object`.
/// 3. Bounded wildcards are replaced by their bound.
/// 4. If one side is assignable from the other it is the answer, with the
///    narrower side's type arguments substituted in.
/// 5. Otherwise `a`'s ancestors are searched, each level's base type before
///    its interfaces, for the first one assignable from `b`.
///
/// Anything unresolvable meets at `Object`. The array rank stripped in step 1
/// is restored on the result.
pub fn find_common_super_type(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> TypeId {
    if !query_trace::enabled() {
        return common_super_type_core(db, a, b);
    }
    let query_id = query_trace::start("find_common_super_type", &[a, b]);
    let result = common_super_type_core(db, a, b);
    query_trace::finish(query_id, "find_common_super_type", result);
    result
}

fn common_super_type_core(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> TypeId {
    if a == b {
        return a;
    }
    let interner = db.interner();
    let (rank_a, element_a) = interner.array_rank(a);
    let (rank_b, element_b) = interner.array_rank(b);
    if rank_a != rank_b {
        return TypeId::OBJECT;
    }

    match (
        interner.primitive_kind(element_a),
        interner.primitive_kind(element_b),
    ) {
        (Some(left), Some(right)) => {
            if rank_a == 0 {
                return numeric_promotion(left, right).type_id();
            }
            return if left == right { a } else { TypeId::OBJECT };
        }
        (Some(_), None) | (None, Some(_)) => return TypeId::OBJECT,
        (None, None) => {}
    }

    let element_a = strip_wildcard(db, element_a);
    let element_b = strip_wildcard(db, element_b);
    let common = common_class_type(db, element_a, element_b);
    interner.array_of_rank(common, rank_a)
}

/// Binary numeric promotion of two primitive kinds.
pub fn numeric_promotion(left: PrimitiveKind, right: PrimitiveKind) -> PrimitiveKind {
    if left == right {
        return left;
    }
    for wide in [PrimitiveKind::Double, PrimitiveKind::Float, PrimitiveKind::Long] {
        if left == wide || right == wide {
            return wide;
        }
    }
    if left.is_numeric() || right.is_numeric() {
        return PrimitiveKind::Int;
    }
    left
}

/// Replace a bounded wildcard by its bound (the `super` bound when present),
/// repeatedly; an unbounded wildcard becomes `Object`.
fn strip_wildcard(db: &dyn TypeDatabase, ty: TypeId) -> TypeId {
    let interner = db.interner();
    let mut current = ty;
    let mut seen = FxHashSet::default();
    while let Some(TypeData::Wildcard(bound)) = interner.lookup(current) {
        if !seen.insert(current) {
            return TypeId::OBJECT;
        }
        current = match bound {
            WildcardBound::Super(bound) | WildcardBound::Extends(bound) => bound,
            WildcardBound::Unbounded => TypeId::OBJECT,
        };
    }
    current
}

fn common_class_type(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> TypeId {
    if is_assignable_from(db, a, b) {
        return substitute_with_provider(db, a, b);
    }
    if is_assignable_from(db, b, a) {
        return substitute_with_provider(db, b, a);
    }
    if db.resolve(a).is_none() || db.resolve(b).is_none() {
        return TypeId::OBJECT;
    }

    let budget = db.config().hierarchy.max_iterations() as usize;
    let mut visited = FxHashSet::default();
    let mut current = a;
    while visited.insert(current) {
        if visited.len() > budget {
            debug!(a = a.0, b = b.0, "find_common_super_type: budget exhausted");
            break;
        }
        let base = base_type(db, current);
        if let Some(base) = base {
            if is_assignable_from(db, base, b) {
                return base;
            }
        }
        for interface in interfaces(db, current) {
            if is_assignable_from(db, interface, b) {
                return interface;
            }
        }
        match base {
            Some(base) => current = base,
            None => break,
        }
    }
    TypeId::OBJECT
}

#[cfg(test)]
#[path = "../tests/common_supertype_tests.rs"]
mod tests;
