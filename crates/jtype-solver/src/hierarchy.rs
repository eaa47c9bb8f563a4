//! Generic hierarchy queries: sub-type mappings, projections and method
//! lookup across supertypes.

use crate::bindings::GenericBindings;
use crate::db::TypeDatabase;
use crate::def::TypeDefinition;
use crate::format::erased_method_descriptor;
use crate::instantiate::{enclosing_bindings, substitute, substitute_field, substitute_method};
use crate::members::{FieldRef, MemberRef, MethodRef};
use crate::relations::{base_type, direct_supertypes, interfaces};
use crate::types::TypeId;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

// =============================================================================
// Sub-type mappings
// =============================================================================

/// One path from a type to an instantiation of the requested supertype.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingPath {
    /// The ancestor node reached, e.g. `I<X>`.
    pub ancestor: TypeId,
    pub bindings: GenericBindings,
}

/// Result of a full mapping scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubTypeMappings {
    /// The first mapping found; what [`sub_type_mappings`] returns.
    pub bindings: GenericBindings,
    pub ancestor: Option<TypeId>,
    /// Paths reaching a different instantiation, or binding differently.
    pub conflicts: Vec<MappingPath>,
}

impl SubTypeMappings {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// How the generic parameters involved in `base` are instantiated when seen
/// through `ty`.
///
/// Walks `ty`'s base-type chain (and interfaces, when `base` is an interface)
/// to the first ancestor with `base`'s definition:
/// - if that ancestor is parameterized, its arguments map to `base`'s
///   arguments (or to `base`'s declared parameters when `base` is raw);
/// - if it is the raw definition and `base` is parameterized, the
///   definition's parameters map to `base`'s arguments.
///
/// Arrays of equal rank are compared by element. The first path found wins;
/// see [`sub_type_mappings_checked`] for diamond detection.
pub fn sub_type_mappings(db: &dyn TypeDatabase, ty: TypeId, base: TypeId) -> GenericBindings {
    let mut walk = MappingWalk::new(db, ty, base, true);
    walk.run();
    walk.found
        .into_iter()
        .next()
        .map(|path| path.bindings)
        .unwrap_or_default()
}

/// Like [`sub_type_mappings`], but scans every path and reports mappings
/// that disagree with the first one.
pub fn sub_type_mappings_checked(
    db: &dyn TypeDatabase,
    ty: TypeId,
    base: TypeId,
) -> SubTypeMappings {
    let mut walk = MappingWalk::new(db, ty, base, false);
    walk.run();
    let mut found = walk.found.into_iter();
    let Some(first) = found.next() else {
        return SubTypeMappings::default();
    };
    let mut conflicts: Vec<MappingPath> = Vec::new();
    for other in found {
        if other != first && !conflicts.contains(&other) {
            conflicts.push(other);
        }
    }
    if !conflicts.is_empty() {
        warn!(
            ty = ty.0,
            base = base.0,
            conflicts = conflicts.len(),
            "conflicting generic instantiations of the same supertype"
        );
    }
    SubTypeMappings {
        bindings: first.bindings,
        ancestor: Some(first.ancestor),
        conflicts,
    }
}

struct MappingWalk<'a> {
    db: &'a dyn TypeDatabase,
    ty: TypeId,
    base: TypeId,
    base_definition: Option<Arc<TypeDefinition>>,
    base_arguments: SmallVec<[TypeId; 4]>,
    first_only: bool,
    visited: FxHashSet<TypeId>,
    budget: usize,
    found: Vec<MappingPath>,
}

impl<'a> MappingWalk<'a> {
    fn new(db: &'a dyn TypeDatabase, ty: TypeId, base: TypeId, first_only: bool) -> Self {
        let interner = db.interner();
        let (mut ty, mut base) = (ty, base);
        while let (Some(ty_element), Some(base_element)) =
            (interner.element_type(ty), interner.element_type(base))
        {
            ty = ty_element;
            base = base_element;
        }

        let base_definition = db.resolve(base);
        let base_arguments = match interner.type_arguments(base) {
            Some(arguments) => arguments.iter().copied().collect(),
            None => base_definition
                .as_ref()
                .filter(|def| def.is_generic_definition())
                .map(|def| def.generic_parameters.iter().copied().collect())
                .unwrap_or_default(),
        };
        Self {
            db,
            ty,
            base,
            base_definition,
            base_arguments,
            first_only,
            visited: FxHashSet::default(),
            budget: db.config().hierarchy.max_iterations() as usize,
            found: Vec::new(),
        }
    }

    fn run(&mut self) {
        let Some(base_definition) = self.base_definition.clone() else {
            return;
        };
        if !base_definition.is_generic_definition() {
            return;
        }
        self.walk(self.ty, &base_definition);
    }

    fn done(&self) -> bool {
        self.first_only && !self.found.is_empty()
    }

    fn walk(&mut self, start: TypeId, base_definition: &TypeDefinition) {
        let mut current = Some(start);
        while let Some(ty) = current.take() {
            if !self.visited.insert(ty) {
                return;
            }
            if self.visited.len() > self.budget {
                debug!(ty = self.ty.0, base = self.base.0, "sub_type_mappings: budget exhausted");
                return;
            }
            if let Some(resolved) = self.db.resolve(ty) {
                if resolved.internal_name == base_definition.internal_name {
                    if let Some(bindings) = self.mapping_at(ty, &resolved) {
                        self.found.push(MappingPath {
                            ancestor: ty,
                            bindings,
                        });
                    }
                    return;
                }
            }
            if base_definition.is_interface() {
                for interface in interfaces(self.db, ty) {
                    self.walk(interface, base_definition);
                    if self.done() {
                        return;
                    }
                }
            }
            current = base_type(self.db, ty);
        }
    }

    /// Bindings at the ancestor `ty` whose definition is `base`'s.
    fn mapping_at(&self, ty: TypeId, resolved: &TypeDefinition) -> Option<GenericBindings> {
        let interner = self.db.interner();
        if let Some(arguments) = interner.type_arguments(ty) {
            if arguments.len() != self.base_arguments.len() {
                return None;
            }
            return Some(
                arguments
                    .iter()
                    .zip(&self.base_arguments)
                    .filter_map(|(&argument, &bound)| {
                        interner.generic_param_id(argument).map(|param| (param, bound))
                    })
                    .collect(),
            );
        }
        let base_arguments = interner.type_arguments(self.base)?;
        if !resolved.is_generic_definition() {
            return None;
        }
        GenericBindings::from_parameters(interner, &resolved.generic_parameters, &base_arguments)
    }
}

// =============================================================================
// Projections
// =============================================================================

/// The nearest supertype of `ty` (or `ty` itself) whose definition is
/// `definition`, with `ty`'s arguments carried through.
pub fn instantiate_as_super_type(
    db: &dyn TypeDatabase,
    ty: TypeId,
    definition: TypeId,
) -> Option<TypeId> {
    let interner = db.interner();
    let target = interner.internal_name(definition)?;
    let budget = db.config().hierarchy.max_iterations() as usize;

    let mut visited = FxHashSet::default();
    let mut agenda = VecDeque::from([ty]);
    while let Some(current) = agenda.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if visited.len() > budget {
            debug!(ty = ty.0, "instantiate_as_super_type: budget exhausted");
            return None;
        }
        if interner.internal_name(current).as_deref() == Some(&*target) {
            return Some(current);
        }
        agenda.extend(direct_supertypes(db, current, true));
    }
    None
}

/// `ty` specialized so that it is seen as `base`: substitutes the
/// [`sub_type_mappings`] of `base` through `ty` into `ty`.
pub fn as_sub_type(db: &dyn TypeDatabase, ty: TypeId, base: TypeId) -> TypeId {
    let bindings = sub_type_mappings(db, ty, base);
    substitute(db, ty, &bindings)
}

/// Bindings that project members declared on `declaring_type` onto `base`.
///
/// Uses [`sub_type_mappings`] first; when `base` is instead a subtype of the
/// declaring type, the declaring definition's parameters are bound to its
/// instantiation inside `base`'s hierarchy. An inner class instance adds the
/// bindings of its enclosing instance underneath.
fn projection_bindings(
    db: &dyn TypeDatabase,
    declaring_type: TypeId,
    base: TypeId,
) -> GenericBindings {
    let mut bindings = sub_type_mappings(db, declaring_type, base);
    if bindings.is_empty() {
        bindings = inherited_bindings(db, declaring_type, base).unwrap_or_default();
    }
    match enclosing_bindings(db, base) {
        Some(outer) => outer.extended(&bindings),
        None => bindings,
    }
}

fn inherited_bindings(
    db: &dyn TypeDatabase,
    declaring_type: TypeId,
    base: TypeId,
) -> Option<GenericBindings> {
    let interner = db.interner();
    let declaring = db.resolve(declaring_type)?;
    if !declaring.is_generic_definition() {
        return None;
    }
    let ancestor = instantiate_as_super_type(db, base, declaring.self_type)?;
    let arguments = interner.type_arguments(ancestor)?;
    GenericBindings::from_parameters(interner, &declaring.generic_parameters, &arguments)
}

/// A member as seen through `base`: generic parameters of the declaring type
/// are replaced by their instantiation in `base`, and the result carries
/// `base` as its declaring type.
///
/// Returns the input member itself when neither the signature nor the
/// declaring type changes.
pub fn as_member_of(db: &dyn TypeDatabase, member: &MemberRef, base: TypeId) -> MemberRef {
    match member {
        MemberRef::Field(field) => MemberRef::Field(field_as_member_of(db, field, base)),
        MemberRef::Method(method) => MemberRef::Method(method_as_member_of(db, method, base)),
    }
}

pub fn method_as_member_of(
    db: &dyn TypeDatabase,
    method: &Arc<MethodRef>,
    base: TypeId,
) -> Arc<MethodRef> {
    let bindings = projection_bindings(db, method.declaring_type, base);
    let projected = substitute_method(db, method, &bindings);
    if projected.declaring_type == base {
        return projected;
    }
    Arc::new(MethodRef {
        declaring_type: base,
        declaration: Some(method.resolve()),
        ..MethodRef::clone(&projected)
    })
}

pub fn field_as_member_of(
    db: &dyn TypeDatabase,
    field: &Arc<FieldRef>,
    base: TypeId,
) -> Arc<FieldRef> {
    let bindings = projection_bindings(db, field.declaring_type, base);
    let projected = substitute_field(db, field, &bindings);
    if projected.declaring_type == base {
        return projected;
    }
    Arc::new(FieldRef {
        declaring_type: base,
        declaration: Some(field.resolve()),
        ..FieldRef::clone(&projected)
    })
}

// =============================================================================
// Method lookup
// =============================================================================

/// Methods of `ty` and all of its supertypes accepted by `filter`.
///
/// Breadth-first over base types and interfaces, each type visited once.
/// A method hidden by one with the same name and erased descriptor found
/// earlier is skipped. Results are projected onto `ty` with
/// [`method_as_member_of`].
pub fn find_methods(
    db: &dyn TypeDatabase,
    ty: TypeId,
    filter: impl Fn(&MethodRef) -> bool,
) -> Vec<Arc<MethodRef>> {
    let interner = db.interner();
    let budget = db.config().hierarchy.max_iterations() as usize;
    let mut visited_types: FxHashSet<Arc<str>> = FxHashSet::default();
    let mut seen_signatures: FxHashSet<String> = FxHashSet::default();
    let mut results = Vec::new();

    let mut agenda = VecDeque::from([ty]);
    if let Some(name) = interner.internal_name(ty) {
        visited_types.insert(name);
    }

    while let Some(current) = agenda.pop_front() {
        let Some(resolved) = db.resolve(current) else {
            debug!(ty = current.0, "find_methods: unresolved supertype skipped");
            continue;
        };
        let supertypes = resolved.base_type.into_iter().chain(resolved.interfaces.iter().copied());
        for supertype in supertypes {
            let Some(name) = interner.internal_name(supertype) else {
                continue;
            };
            if visited_types.len() < budget && visited_types.insert(name) {
                agenda.push_back(supertype);
            }
        }
        for method in &resolved.methods {
            if !filter(method) {
                continue;
            }
            let key = format!("{}:{}", method.name, erased_method_descriptor(db, method));
            if seen_signatures.insert(key) {
                results.push(method_as_member_of(db, method, ty));
            }
        }
    }
    results
}

pub fn find_all_methods(db: &dyn TypeDatabase, ty: TypeId) -> Vec<Arc<MethodRef>> {
    find_methods(db, ty, |_| true)
}

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod tests;
