//! Generic substitution.
//!
//! [`TypeSubstitutor`] rewrites a type (or member) under a set of
//! [`GenericBindings`]. It is structure-preserving: a node with nothing to
//! substitute comes back as the very same `TypeId`, and members come back as
//! the very same `Arc`.
//!
//! ## Rules
//!
//! | Node | Result |
//! |------|--------|
//! | bound generic parameter | the bound type |
//! | unbound generic parameter | itself; with bound walking, a copy carrying a substituted bound |
//! | generic definition with bound parameters | `definition<substituted params>` |
//! | inner class of a generic definition with bound parameters | `Outer<...>.Inner` |
//! | generic instance | instance over substituted arguments and enclosing instance |
//! | array | array of the substituted element |
//! | wildcard | wildcard over the substituted bound |
//! | primitive, null, other named | itself |
//!
//! Parameter bounds are left alone unless the substitutor was built
//! [`with_bounds`](TypeSubstitutor::with_bounds). Even then a bound is walked
//! only when its parameter is reached, and a self-referential bound
//! (`T extends Comparable<T>`) meets its own parameter again inside the walk
//! and stops there.

use crate::bindings::GenericBindings;
use crate::db::TypeDatabase;
use crate::def::{TypeDefinition, TypeFlags};
use crate::error::{TypeError, TypeResult};
use crate::members::{FieldRef, MemberRef, MethodRef, ParameterInfo};
use crate::recursion::{DepthLimit, RecursionGuard, RecursionResult};
use crate::types::{GenericOwner, GenericParamId, TypeData, TypeId, TypeList, WildcardBound};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// Public entry points
// =============================================================================

/// Substitute `bindings` into `ty`.
pub fn substitute(db: &dyn TypeDatabase, ty: TypeId, bindings: &GenericBindings) -> TypeId {
    if bindings.is_empty() {
        return ty;
    }
    TypeSubstitutor::new(db, bindings).visit(ty)
}

/// Like [`substitute`], but unbound generic parameters also get their upper
/// bounds substituted (`U extends List<E>` under `E = String` becomes
/// `U extends List<String>`).
pub fn substitute_with_bounds(
    db: &dyn TypeDatabase,
    ty: TypeId,
    bindings: &GenericBindings,
) -> TypeId {
    if bindings.is_empty() {
        return ty;
    }
    TypeSubstitutor::new(db, bindings).with_bounds().visit(ty)
}

/// Substitute the arguments of a parameterized `provider` into `ty`.
///
/// `provider` supplies bindings for its definition's parameters
/// (`List<String>` binds `List`'s `E` to `String`). A provider that is not a
/// parameterized type, is unresolved, or disagrees with its definition's
/// arity leaves `ty` unchanged.
pub fn substitute_with_provider(db: &dyn TypeDatabase, ty: TypeId, provider: TypeId) -> TypeId {
    match provider_bindings(db, provider) {
        Some(bindings) => substitute(db, ty, &bindings),
        None => ty,
    }
}

/// Substitute the context of `method` into `ty`: the method's explicit type
/// arguments plus the arguments of its declaring type.
pub fn substitute_with_method(db: &dyn TypeDatabase, ty: TypeId, method: &MethodRef) -> TypeId {
    let bindings = method_bindings(db, method);
    substitute(db, ty, &bindings)
}

/// Visit every bound type of `inner` through `outer`.
pub fn substitute_bindings(
    db: &dyn TypeDatabase,
    inner: &GenericBindings,
    outer: &GenericBindings,
) -> GenericBindings {
    if inner.is_empty() || outer.is_empty() {
        return inner.clone();
    }
    TypeSubstitutor::new(db, outer).visit_bindings(inner)
}

pub fn substitute_field(
    db: &dyn TypeDatabase,
    field: &Arc<FieldRef>,
    bindings: &GenericBindings,
) -> Arc<FieldRef> {
    if bindings.is_empty() {
        return Arc::clone(field);
    }
    TypeSubstitutor::new(db, bindings).visit_field(field)
}

pub fn substitute_method(
    db: &dyn TypeDatabase,
    method: &Arc<MethodRef>,
    bindings: &GenericBindings,
) -> Arc<MethodRef> {
    if bindings.is_empty() {
        return Arc::clone(method);
    }
    TypeSubstitutor::new(db, bindings).visit_method(method)
}

pub fn substitute_member(
    db: &dyn TypeDatabase,
    member: &MemberRef,
    bindings: &GenericBindings,
) -> MemberRef {
    match member {
        MemberRef::Field(field) => MemberRef::Field(substitute_field(db, field, bindings)),
        MemberRef::Method(method) => MemberRef::Method(substitute_method(db, method, bindings)),
    }
}

/// Substitute a member list, returning the input list when nothing changed.
pub fn substitute_members(
    db: &dyn TypeDatabase,
    members: &Arc<[MemberRef]>,
    bindings: &GenericBindings,
) -> Arc<[MemberRef]> {
    if bindings.is_empty() {
        return Arc::clone(members);
    }
    let mut substitutor = TypeSubstitutor::new(db, bindings);
    let mut changed: Option<Vec<MemberRef>> = None;
    for (i, member) in members.iter().enumerate() {
        let visited = substitutor.visit_member(member);
        if !visited.ptr_eq(member) {
            changed.get_or_insert_with(|| members.to_vec())[i] = visited;
        }
    }
    match changed {
        Some(list) => Arc::from(list),
        None => Arc::clone(members),
    }
}

/// Checked construction of `definition<arguments>`.
///
/// Fails when the definition is unresolvable or the argument count differs
/// from its declared parameter count.
pub fn instantiate_definition(
    db: &dyn TypeDatabase,
    definition: TypeId,
    arguments: &[TypeId],
) -> TypeResult<TypeId> {
    let resolved = db.require(definition)?;
    if resolved.generic_parameters.len() != arguments.len() {
        return Err(TypeError::ArityMismatch {
            definition: resolved.internal_name.to_string(),
            expected: resolved.generic_parameters.len(),
            found: arguments.len(),
        });
    }
    Ok(db
        .interner()
        .generic_instance(resolved.self_type, arguments))
}

/// Bindings implied by a parameterized type, its enclosing instances
/// included (`Outer<String>.Inner` binds `Outer`'s `T`).
pub fn provider_bindings(db: &dyn TypeDatabase, provider: TypeId) -> Option<GenericBindings> {
    let interner = db.interner();
    let arguments = interner.type_arguments(provider)?;
    let resolved = db.resolve(provider)?;
    let Some(bindings) =
        GenericBindings::from_parameters(interner, &resolved.generic_parameters, &arguments)
    else {
        debug!(
            definition = %resolved.internal_name,
            expected = resolved.generic_parameters.len(),
            found = arguments.len(),
            "arity mismatch, skipping substitution"
        );
        return None;
    };
    match enclosing_bindings(db, provider) {
        Some(outer) => Some(outer.extended(&bindings)),
        None => Some(bindings),
    }
}

/// Bindings of the enclosing instance of an inner class instance.
pub fn enclosing_bindings(db: &dyn TypeDatabase, ty: TypeId) -> Option<GenericBindings> {
    let outer = db.interner().enclosing_instance(ty)?;
    provider_bindings(db, outer)
}

/// Bindings implied by a method's explicit type arguments and its declaring
/// type's arguments.
pub fn method_bindings(db: &dyn TypeDatabase, method: &MethodRef) -> GenericBindings {
    let interner = db.interner();
    let type_bindings = provider_bindings(db, method.declaring_type).unwrap_or_default();
    if method.type_arguments.is_empty() {
        return type_bindings;
    }
    match GenericBindings::from_parameters(
        interner,
        &method.generic_parameters,
        &method.type_arguments,
    ) {
        Some(method_bindings) => type_bindings.extended(&method_bindings),
        None => type_bindings,
    }
}

// =============================================================================
// TypeSubstitutor
// =============================================================================

/// Substitution visitor over one set of bindings.
///
/// Keeps a guard of generic parameters whose bounds are being substituted,
/// so cyclic bounds terminate, and a depth counter over the whole descent.
/// When the depth limit is hit the offending subtree is returned unchanged.
pub struct TypeSubstitutor<'a> {
    db: &'a dyn TypeDatabase,
    bindings: &'a GenericBindings,
    walk_bounds: bool,
    bound_guard: RecursionGuard<GenericParamId>,
    depth: DepthLimit,
}

impl<'a> TypeSubstitutor<'a> {
    pub fn new(db: &'a dyn TypeDatabase, bindings: &'a GenericBindings) -> Self {
        let profile = db.config().substitution;
        Self {
            db,
            bindings,
            walk_bounds: false,
            bound_guard: RecursionGuard::new(profile),
            depth: DepthLimit::new(profile),
        }
    }

    /// Also substitute the upper bounds of unbound generic parameters.
    #[must_use]
    pub fn with_bounds(mut self) -> Self {
        self.walk_bounds = true;
        self
    }

    /// True if any walk was cut short by a recursion limit.
    pub fn limit_reached(&self) -> bool {
        self.depth.limit_hit() || self.bound_guard.limit_hit()
    }

    pub fn visit(&mut self, ty: TypeId) -> TypeId {
        if self.bindings.is_empty() {
            return ty;
        }
        if !self.depth.descend() {
            debug!(ty = ty.0, "substitution depth limit reached");
            return ty;
        }
        let result = self.visit_inner(ty);
        self.depth.ascend();
        result
    }

    fn visit_inner(&mut self, ty: TypeId) -> TypeId {
        let Some(data) = self.db.interner().lookup(ty) else {
            return ty;
        };
        match data {
            TypeData::Primitive(_) | TypeData::Null => ty,
            TypeData::Named(name) => self.visit_named(ty, &name),
            TypeData::Array(element) => {
                let visited = self.visit(element);
                if visited == element {
                    ty
                } else {
                    self.db.interner().array(visited)
                }
            }
            TypeData::GenericParameter { param, bound } => {
                self.visit_generic_parameter(ty, param, bound)
            }
            TypeData::GenericInstance {
                definition,
                arguments,
                outer,
            } => self.visit_generic_instance(ty, definition, &arguments, outer),
            TypeData::Wildcard(bound) => self.visit_wildcard(ty, bound),
        }
    }

    /// A generic definition whose own parameters are bound becomes a
    /// parameterized type; a non-static inner class whose enclosing
    /// definition becomes parameterized becomes an inner instance of it.
    fn visit_named(&mut self, ty: TypeId, name: &str) -> TypeId {
        let interner = self.db.interner();
        let owns_binding = self.binds_parameters_of(name);
        let Some(resolved) = self.db.resolve(ty) else {
            return ty;
        };
        let outer = self.enclosing_instance(&resolved);
        if outer.is_none() && !(owns_binding && resolved.is_generic_definition()) {
            return ty;
        }
        let mut changed = false;
        let arguments: SmallVec<[TypeId; 4]> = resolved
            .generic_parameters
            .iter()
            .map(|&param| {
                let visited = if owns_binding { self.visit(param) } else { param };
                changed |= visited != param;
                visited
            })
            .collect();
        match outer {
            Some(outer) => interner.inner_instance(outer, ty, &arguments),
            None if changed => interner.generic_instance(ty, &arguments),
            None => ty,
        }
    }

    fn binds_parameters_of(&self, name: &str) -> bool {
        let interner = self.db.interner();
        self.bindings.generic_parameters().any(|param| {
            interner
                .generic_param_info(param)
                .is_some_and(|info| matches!(&info.owner, GenericOwner::Type(owner) if &**owner == name))
        })
    }

    /// The substituted declaring type of a non-static inner class, when the
    /// substitution changed it.
    fn enclosing_instance(&mut self, definition: &TypeDefinition) -> Option<TypeId> {
        if !definition.is_inner_class() || definition.flags.contains(TypeFlags::STATIC) {
            return None;
        }
        let declaring = definition.declaring_type?;
        let visited = self.visit(declaring);
        (visited != declaring).then_some(visited)
    }

    fn visit_generic_parameter(
        &mut self,
        ty: TypeId,
        param: GenericParamId,
        bound: Option<TypeId>,
    ) -> TypeId {
        if let Some(bound_type) = self.bindings.bound_type(param) {
            return bound_type;
        }
        if !self.walk_bounds {
            return ty;
        }
        let interner = self.db.interner();
        let upper = bound.or_else(|| {
            interner
                .generic_param_info(param)
                .and_then(|info| info.upper_bound)
        });
        let Some(upper) = upper else {
            return ty;
        };
        match self.bound_guard.enter(param) {
            RecursionResult::Entered => {
                let visited = self.visit(upper);
                self.bound_guard.leave(param);
                if visited == upper {
                    ty
                } else {
                    interner.generic_parameter_with_bound(param, visited)
                }
            }
            // Already substituting this parameter's bound.
            RecursionResult::Cycle => ty,
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                debug!(param = param.0, "bound substitution limit reached");
                ty
            }
        }
    }

    fn visit_generic_instance(
        &mut self,
        ty: TypeId,
        definition: TypeId,
        arguments: &TypeList,
        outer: Option<TypeId>,
    ) -> TypeId {
        let visited_arguments = self.visit_list(arguments);
        let visited_outer = outer.map(|outer| self.visit(outer));
        if visited_arguments.is_none() && visited_outer == outer {
            return ty;
        }
        let interner = self.db.interner();
        let arguments = visited_arguments.as_deref().unwrap_or(&**arguments);
        match visited_outer {
            Some(outer) => interner.inner_instance(outer, definition, arguments),
            None => interner.generic_instance(definition, arguments),
        }
    }

    fn visit_wildcard(&mut self, ty: TypeId, bound: WildcardBound) -> TypeId {
        let interner = self.db.interner();
        match bound {
            WildcardBound::Unbounded => ty,
            WildcardBound::Extends(bound) => {
                let visited = self.visit(bound);
                if visited == bound {
                    ty
                } else {
                    interner.wildcard_extends(visited)
                }
            }
            WildcardBound::Super(bound) => {
                let visited = self.visit(bound);
                if visited == bound {
                    ty
                } else {
                    interner.wildcard_super(visited)
                }
            }
        }
    }

    /// Visit a list, returning `None` when every element is unchanged.
    pub fn visit_list(&mut self, types: &[TypeId]) -> Option<SmallVec<[TypeId; 4]>> {
        let mut changed: Option<SmallVec<[TypeId; 4]>> = None;
        for (i, &ty) in types.iter().enumerate() {
            let visited = self.visit(ty);
            if visited != ty {
                changed.get_or_insert_with(|| types.iter().copied().collect())[i] = visited;
            }
        }
        changed
    }

    /// Visit every bound type of `inner`, returning `inner` itself when
    /// nothing changed.
    pub fn visit_bindings(&mut self, inner: &GenericBindings) -> GenericBindings {
        let mut changed = false;
        let visited: Vec<(GenericParamId, TypeId)> = inner
            .iter()
            .map(|(param, ty)| {
                let visited = self.visit(ty);
                changed |= visited != ty;
                (param, visited)
            })
            .collect();
        if changed {
            visited.into_iter().collect()
        } else {
            inner.clone()
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub fn visit_member(&mut self, member: &MemberRef) -> MemberRef {
        match member {
            MemberRef::Field(field) => MemberRef::Field(self.visit_field(field)),
            MemberRef::Method(method) => MemberRef::Method(self.visit_method(method)),
        }
    }

    pub fn visit_field(&mut self, field: &Arc<FieldRef>) -> Arc<FieldRef> {
        let declaring_type = self.visit(field.declaring_type);
        let field_type = self.visit(field.field_type);
        if declaring_type == field.declaring_type && field_type == field.field_type {
            return Arc::clone(field);
        }
        Arc::new(FieldRef {
            declaring_type,
            field_type,
            declaration: Some(field.resolve()),
            ..FieldRef::clone(field)
        })
    }

    pub fn visit_method(&mut self, method: &Arc<MethodRef>) -> Arc<MethodRef> {
        let declaring_type = self.visit(method.declaring_type);
        let return_type = self.visit(method.return_type);

        let mut parameters_changed = false;
        let parameters: Vec<_> = method
            .parameters
            .iter()
            .map(|parameter| {
                let visited = self.visit(parameter.parameter_type);
                parameters_changed |= visited != parameter.parameter_type;
                ParameterInfo {
                    name: Arc::clone(&parameter.name),
                    parameter_type: visited,
                }
            })
            .collect();
        let thrown_types = self.visit_list(&method.thrown_types);
        let type_arguments = self.method_type_arguments(method);

        if declaring_type == method.declaring_type
            && return_type == method.return_type
            && !parameters_changed
            && thrown_types.is_none()
            && type_arguments.is_none()
        {
            return Arc::clone(method);
        }

        Arc::new(MethodRef {
            declaring_type,
            return_type,
            parameters: if parameters_changed {
                Arc::from(parameters)
            } else {
                Arc::clone(&method.parameters)
            },
            thrown_types: thrown_types.map_or_else(
                || Arc::clone(&method.thrown_types),
                |types| Arc::from(types.as_slice()),
            ),
            type_arguments: type_arguments
                .map_or_else(|| Arc::clone(&method.type_arguments), Arc::from),
            declaration: Some(method.resolve()),
            ..MethodRef::clone(method)
        })
    }

    /// Instantiation of a generic method's own parameters, if any of them are
    /// bound (or its existing type arguments change).
    fn method_type_arguments(&mut self, method: &MethodRef) -> Option<Vec<TypeId>> {
        if !method.type_arguments.is_empty() {
            return self
                .visit_list(&method.type_arguments)
                .map(|list| list.into_vec());
        }
        if !method.is_generic_method() {
            return None;
        }
        let interner = self.db.interner();
        let any_bound = method.generic_parameters.iter().any(|&param| {
            interner
                .generic_param_id(param)
                .is_some_and(|id| self.bindings.contains_generic_parameter(id))
        });
        if !any_bound {
            return None;
        }
        Some(
            method
                .generic_parameters
                .iter()
                .map(|&param| self.visit(param))
                .collect(),
        )
    }
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
