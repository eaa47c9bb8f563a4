//! Generic bindings: the substitution context of a visit.
//!
//! A [`GenericBindings`] is an ordered, immutable map from generic parameter
//! declarations to the types bound to them. Adding a binding produces a new
//! value; existing values are shared snapshots behind an `Arc` and never
//! change.

use crate::db::TypeDatabase;
use crate::instantiate::substitute;
use crate::intern::TypeInterner;
use crate::types::{GenericParamId, TypeId};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

type BindingMap = IndexMap<GenericParamId, TypeId, FxBuildHasher>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenericBindings {
    entries: Arc<BindingMap>,
}

impl GenericBindings {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pair declared parameters with arguments positionally.
    ///
    /// Returns `None` on an arity mismatch. Entries whose key is not a
    /// generic parameter node are skipped.
    pub fn from_parameters(
        interner: &TypeInterner,
        parameters: &[TypeId],
        arguments: &[TypeId],
    ) -> Option<Self> {
        if parameters.len() != arguments.len() {
            return None;
        }
        let mut entries = BindingMap::default();
        for (&parameter, &argument) in parameters.iter().zip(arguments) {
            if let Some(param) = interner.generic_param_id(parameter) {
                entries.insert(param, argument);
            }
        }
        Some(Self {
            entries: Arc::new(entries),
        })
    }

    /// New bindings with `param` bound to `ty`; a later binding of the same
    /// parameter overrides the earlier one.
    #[must_use]
    pub fn with_additional_binding(&self, param: GenericParamId, ty: TypeId) -> Self {
        let mut entries = BindingMap::clone(&self.entries);
        entries.insert(param, ty);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Merge `other` over `self` without visiting its bound types.
    #[must_use]
    pub fn extended(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut entries = BindingMap::clone(&self.entries);
        entries.extend(other.iter());
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Substitution composition: `later`'s bound types are visited through
    /// `self` before being added on top of it.
    #[must_use]
    pub fn compose(&self, db: &dyn TypeDatabase, later: &Self) -> Self {
        if later.is_empty() {
            return self.clone();
        }
        let mut entries = BindingMap::clone(&self.entries);
        for (param, ty) in later.iter() {
            entries.insert(param, substitute(db, ty, self));
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    #[inline]
    pub fn bound_type(&self, param: GenericParamId) -> Option<TypeId> {
        self.entries.get(&param).copied()
    }

    #[inline]
    pub fn contains_generic_parameter(&self, param: GenericParamId) -> bool {
        self.entries.contains_key(&param)
    }

    pub fn generic_parameters(&self) -> impl Iterator<Item = GenericParamId> + '_ {
        self.entries.keys().copied()
    }

    pub fn bound_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.entries.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GenericParamId, TypeId)> + '_ {
        self.entries.iter().map(|(&param, &ty)| (param, ty))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when both values share one snapshot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl FromIterator<(GenericParamId, TypeId)> for GenericBindings {
    fn from_iter<I: IntoIterator<Item = (GenericParamId, TypeId)>>(iter: I) -> Self {
        Self {
            entries: Arc::new(iter.into_iter().collect()),
        }
    }
}

#[cfg(test)]
#[path = "../tests/bindings_tests.rs"]
mod tests;
