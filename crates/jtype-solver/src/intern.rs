//! Type interning.
//!
//! [`TypeInterner`] hash-conses [`TypeData`] into [`TypeId`] handles. Creating
//! the same structure twice yields the same id, so identity checks across the
//! engine are integer comparisons.
//!
//! The interner is shared by every thread of a decompilation session:
//! - the structure -> id map is a `DashMap`, and new nodes are published
//!   through its entry API so concurrent creators of one structure converge
//!   on a single id;
//! - the id -> structure table is append-only behind an `RwLock`, held only
//!   for the push or the clone of a single entry.
//!
//! Generic parameter declarations live in a side table keyed by
//! `(owner, position, name)`. Upper bounds are written there after the
//! parameter node exists, which is how self-referential bounds such as
//! `T extends Comparable<T>` are built.

use crate::types::{
    GenericOwner, GenericParamId, GenericParamInfo, PrimitiveKind, TypeData, TypeId, TypeList,
    WildcardBound,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

type ParamKey = (GenericOwner, u32, Arc<str>);

/// Counters describing interner activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InternerStats {
    pub types: usize,
    pub generic_parameters: usize,
    pub generic_instances_created: u64,
    pub generic_instance_hits: u64,
}

/// Hash-consing store for type nodes and generic parameter declarations.
pub struct TypeInterner {
    ids: DashMap<TypeData, TypeId, FxBuildHasher>,
    types: RwLock<Vec<TypeData>>,
    param_ids: DashMap<ParamKey, GenericParamId, FxBuildHasher>,
    params: RwLock<Vec<GenericParamInfo>>,
    instances_created: AtomicU64,
    instance_hits: AtomicU64,
}

impl TypeInterner {
    pub fn new() -> Self {
        let interner = Self {
            ids: DashMap::with_hasher(FxBuildHasher),
            types: RwLock::new(Vec::with_capacity(256)),
            param_ids: DashMap::with_hasher(FxBuildHasher),
            params: RwLock::new(Vec::new()),
            instances_created: AtomicU64::new(0),
            instance_hits: AtomicU64::new(0),
        };
        interner.register_builtins();
        interner
    }

    fn register_builtins(&self) {
        for kind in PrimitiveKind::ALL {
            let id = self.intern(TypeData::Primitive(kind));
            debug_assert_eq!(id, kind.type_id());
        }
        let fixed = [
            (TypeId::NULL, TypeData::Null),
            (TypeId::OBJECT, TypeData::named("java/lang/Object")),
            (TypeId::STRING, TypeData::named("java/lang/String")),
            (TypeId::CLONEABLE, TypeData::named("java/lang/Cloneable")),
            (TypeId::SERIALIZABLE, TypeData::named("java/io/Serializable")),
        ];
        for (expected, data) in fixed {
            let id = self.intern(data);
            debug_assert_eq!(id, expected);
        }
        for kind in PrimitiveKind::ALL {
            let id = self.intern(TypeData::named(kind.box_internal_name()));
            debug_assert_eq!(id, kind.box_type_id());
        }
    }

    // =========================================================================
    // Core interning
    // =========================================================================

    /// Intern `data`, returning the existing id when the structure is known.
    pub fn intern(&self, data: TypeData) -> TypeId {
        self.intern_tracked(data).0
    }

    /// Like [`intern`](Self::intern), also reporting whether a node was created.
    fn intern_tracked(&self, data: TypeData) -> (TypeId, bool) {
        let existing = self.ids.get(&data).map(|entry| *entry);
        if let Some(id) = existing {
            return (id, false);
        }

        match self.ids.entry(data) {
            Entry::Occupied(entry) => (*entry.get(), false),
            Entry::Vacant(entry) => {
                let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
                let id = TypeId(types.len() as u32);
                types.push(entry.key().clone());
                drop(types);
                entry.insert(id);
                (id, true)
            }
        }
    }

    /// Structure of `id`, or `None` for a handle from another interner.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        types.get(id.0 as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> InternerStats {
        InternerStats {
            types: self.len(),
            generic_parameters: self
                .params
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
            generic_instances_created: self.instances_created.load(Ordering::Relaxed),
            generic_instance_hits: self.instance_hits.load(Ordering::Relaxed),
        }
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn primitive(&self, kind: PrimitiveKind) -> TypeId {
        kind.type_id()
    }

    /// Class or interface reference by internal name.
    pub fn named(&self, internal_name: &str) -> TypeId {
        self.intern(TypeData::named(internal_name))
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    /// `element` wrapped in `rank` array dimensions.
    pub fn array_of_rank(&self, element: TypeId, rank: u32) -> TypeId {
        (0..rank).fold(element, |ty, _| self.array(ty))
    }

    /// Parameterized type `definition<arguments>`.
    ///
    /// Returns `definition` itself for an empty argument list. Arity is not
    /// checked here; see [`crate::instantiate_definition`] for a checked form.
    pub fn generic_instance(&self, definition: TypeId, arguments: &[TypeId]) -> TypeId {
        if arguments.is_empty() {
            return definition;
        }
        self.intern_instance(definition, arguments, None)
    }

    /// `outer.definition<arguments>` for a non-static inner class.
    ///
    /// Only a parameterized `outer` is kept; otherwise this is
    /// [`generic_instance`](Self::generic_instance).
    pub fn inner_instance(&self, outer: TypeId, definition: TypeId, arguments: &[TypeId]) -> TypeId {
        if !matches!(self.lookup(outer), Some(TypeData::GenericInstance { .. })) {
            return self.generic_instance(definition, arguments);
        }
        self.intern_instance(definition, arguments, Some(outer))
    }

    fn intern_instance(
        &self,
        definition: TypeId,
        arguments: &[TypeId],
        outer: Option<TypeId>,
    ) -> TypeId {
        let arguments: TypeList = Arc::from(arguments);
        let (id, created) = self.intern_tracked(TypeData::GenericInstance {
            definition,
            arguments,
            outer,
        });
        if created {
            self.instances_created.fetch_add(1, Ordering::Relaxed);
            trace!(definition = definition.0, id = id.0, "created generic instance");
        } else {
            self.instance_hits.fetch_add(1, Ordering::Relaxed);
        }
        id
    }

    pub fn unbounded_wildcard(&self) -> TypeId {
        self.intern(TypeData::Wildcard(WildcardBound::Unbounded))
    }

    pub fn wildcard_extends(&self, bound: TypeId) -> TypeId {
        self.intern(TypeData::Wildcard(WildcardBound::Extends(bound)))
    }

    pub fn wildcard_super(&self, bound: TypeId) -> TypeId {
        self.intern(TypeData::Wildcard(WildcardBound::Super(bound)))
    }

    // =========================================================================
    // Generic parameters
    // =========================================================================

    /// Declare (or find) the generic parameter `name` at `position` of `owner`.
    ///
    /// Returns the parameter's declared node. The bound is attached later with
    /// [`set_upper_bound`](Self::set_upper_bound).
    pub fn declare_generic_parameter(
        &self,
        owner: GenericOwner,
        position: u32,
        name: &str,
    ) -> TypeId {
        let name: Arc<str> = Arc::from(name);
        let key = (owner, position, Arc::clone(&name));
        let existing = self.param_ids.get(&key).map(|entry| *entry);
        let param = match existing {
            Some(param) => param,
            None => match self.param_ids.entry(key) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let mut params = self.params.write().unwrap_or_else(PoisonError::into_inner);
                    let param = GenericParamId(params.len() as u32);
                    params.push(GenericParamInfo {
                        name,
                        owner: entry.key().0.clone(),
                        position,
                        upper_bound: None,
                    });
                    drop(params);
                    entry.insert(param);
                    param
                }
            },
        };
        self.intern(TypeData::GenericParameter { param, bound: None })
    }

    /// Attach the declared upper bound of a parameter node.
    ///
    /// Returns `false` if `param_node` is not a generic parameter.
    pub fn set_upper_bound(&self, param_node: TypeId, bound: TypeId) -> bool {
        let Some(param) = self.generic_param_id(param_node) else {
            return false;
        };
        let mut params = self.params.write().unwrap_or_else(PoisonError::into_inner);
        match params.get_mut(param.0 as usize) {
            Some(info) => {
                info.upper_bound = Some(bound);
                true
            }
            None => false,
        }
    }

    /// Node for `param` carrying a substituted bound.
    ///
    /// Collapses to the declared node when `bound` equals the declared bound.
    pub fn generic_parameter_with_bound(&self, param: GenericParamId, bound: TypeId) -> TypeId {
        let declared = self.generic_param_info(param).and_then(|info| info.upper_bound);
        let bound = if declared == Some(bound) {
            None
        } else {
            Some(bound)
        };
        self.intern(TypeData::GenericParameter { param, bound })
    }

    pub fn generic_param_info(&self, param: GenericParamId) -> Option<GenericParamInfo> {
        let params = self.params.read().unwrap_or_else(PoisonError::into_inner);
        params.get(param.0 as usize).cloned()
    }

    pub fn generic_param_id(&self, ty: TypeId) -> Option<GenericParamId> {
        match self.lookup(ty)? {
            TypeData::GenericParameter { param, .. } => Some(param),
            _ => None,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn primitive_kind(&self, ty: TypeId) -> Option<PrimitiveKind> {
        match self.lookup(ty)? {
            TypeData::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    /// The primitive whose box class `ty` is.
    pub fn boxed_primitive(&self, ty: TypeId) -> Option<PrimitiveKind> {
        if !(TypeId::BOX_VOID.0..=TypeId::BOX_DOUBLE.0).contains(&ty.0) {
            return None;
        }
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.box_type_id() == ty)
    }

    /// Internal name of a class type; parameterized types report their
    /// definition's name.
    pub fn internal_name(&self, ty: TypeId) -> Option<Arc<str>> {
        match self.lookup(ty)? {
            TypeData::Named(name) => Some(name),
            TypeData::GenericInstance { definition, .. } => match self.lookup(definition)? {
                TypeData::Named(name) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn element_type(&self, ty: TypeId) -> Option<TypeId> {
        match self.lookup(ty)? {
            TypeData::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Strip every array dimension: `(rank, innermost element)`.
    pub fn array_rank(&self, ty: TypeId) -> (u32, TypeId) {
        let mut rank = 0;
        let mut current = ty;
        while let Some(element) = self.element_type(current) {
            rank += 1;
            current = element;
        }
        (rank, current)
    }

    /// Definition node of a parameterized type, or `ty` itself.
    pub fn generic_definition(&self, ty: TypeId) -> TypeId {
        match self.lookup(ty) {
            Some(TypeData::GenericInstance { definition, .. }) => definition,
            _ => ty,
        }
    }

    pub fn type_arguments(&self, ty: TypeId) -> Option<TypeList> {
        match self.lookup(ty)? {
            TypeData::GenericInstance { arguments, .. } => Some(arguments),
            _ => None,
        }
    }

    /// Parameterized enclosing instance of an inner class instance.
    pub fn enclosing_instance(&self, ty: TypeId) -> Option<TypeId> {
        match self.lookup(ty)? {
            TypeData::GenericInstance { outer, .. } => outer,
            _ => None,
        }
    }

    /// Effective upper bound of a generic parameter or `? extends` wildcard.
    pub fn upper_bound(&self, ty: TypeId) -> Option<TypeId> {
        match self.lookup(ty)? {
            TypeData::GenericParameter {
                bound: Some(bound), ..
            } => Some(bound),
            TypeData::GenericParameter { param, bound: None } => {
                self.generic_param_info(param)?.upper_bound
            }
            TypeData::Wildcard(WildcardBound::Extends(bound)) => Some(bound),
            _ => None,
        }
    }

    pub fn is_primitive(&self, ty: TypeId) -> bool {
        self.primitive_kind(ty).is_some()
    }

    pub fn is_array(&self, ty: TypeId) -> bool {
        self.element_type(ty).is_some()
    }

    pub fn is_generic_parameter(&self, ty: TypeId) -> bool {
        self.generic_param_id(ty).is_some()
    }

    pub fn is_wildcard(&self, ty: TypeId) -> bool {
        matches!(self.lookup(ty), Some(TypeData::Wildcard(_)))
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
