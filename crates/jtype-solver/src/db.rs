//! The database seam every algorithm is written against.
//!
//! Algorithms take `&dyn TypeDatabase` so they can run against a full
//! [`Session`] or a test double. A session bundles the interner, the metadata
//! resolver and the engine limits; it is `Send + Sync` and meant to be shared
//! by every worker of one decompilation run.

use crate::def::{MetadataResolver, TypeDefinition};
use crate::error::{TypeError, TypeResult};
use crate::intern::TypeInterner;
use crate::recursion::RecursionProfile;
use crate::types::{GenericParamInfo, TypeId};
use std::sync::Arc;

/// Recursion limits used by the engine's walks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub substitution: RecursionProfile,
    pub erasure: RecursionProfile,
    pub hierarchy: RecursionProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            substitution: RecursionProfile::Substitution,
            erasure: RecursionProfile::Erasure,
            hierarchy: RecursionProfile::Hierarchy,
        }
    }
}

impl EngineConfig {
    /// Apply one depth limit to every walk, keeping iteration budgets.
    pub fn with_max_depth(self, max_depth: u32) -> Self {
        let custom = |profile: RecursionProfile| RecursionProfile::Custom {
            max_depth,
            max_iterations: profile.max_iterations(),
        };
        Self {
            substitution: custom(self.substitution),
            erasure: custom(self.erasure),
            hierarchy: custom(self.hierarchy),
        }
    }
}

pub trait TypeDatabase: Send + Sync {
    fn interner(&self) -> &TypeInterner;

    fn resolver(&self) -> &dyn MetadataResolver;

    fn config(&self) -> &EngineConfig;

    /// Definition of a class type; `None` for primitives, arrays, generic
    /// parameters, wildcards and unresolvable names.
    fn resolve(&self, ty: TypeId) -> Option<Arc<TypeDefinition>> {
        let name = self.interner().internal_name(ty)?;
        self.resolver().resolve(&name)
    }

    /// Asserting form of [`resolve`](Self::resolve).
    fn require(&self, ty: TypeId) -> TypeResult<Arc<TypeDefinition>> {
        self.resolve(ty).ok_or_else(|| {
            let name = self
                .interner()
                .internal_name(ty)
                .map_or_else(|| format!("{ty:?}"), |name| name.to_string());
            TypeError::UnknownType(name)
        })
    }

    fn generic_param_info(&self, ty: TypeId) -> Option<GenericParamInfo> {
        let interner = self.interner();
        interner.generic_param_info(interner.generic_param_id(ty)?)
    }

    /// Generic parameter `name` declared by the type `owner`, or by one of
    /// its methods when the type has no such parameter.
    fn require_generic_parameter(&self, owner: &str, name: &str) -> TypeResult<TypeId> {
        let definition = self
            .resolver()
            .resolve(owner)
            .ok_or_else(|| TypeError::UnknownType(owner.to_string()))?;
        let named = |param: &TypeId| {
            self.generic_param_info(*param)
                .is_some_and(|info| &*info.name == name)
        };
        let declared = definition.generic_parameters.iter().find(|&p| named(p));
        let from_method = || {
            definition
                .methods
                .iter()
                .flat_map(|method| method.generic_parameters.iter())
                .find(|&p| named(p))
        };
        declared
            .or_else(from_method)
            .copied()
            .ok_or_else(|| TypeError::UnknownGenericParameter {
                owner: owner.to_string(),
                name: name.to_string(),
            })
    }
}

/// One decompilation session: interner, resolver and limits.
pub struct Session {
    interner: TypeInterner,
    resolver: Arc<dyn MetadataResolver>,
    config: EngineConfig,
}

impl Session {
    pub fn new(resolver: Arc<dyn MetadataResolver>) -> Self {
        Self::with_interner(TypeInterner::new(), resolver)
    }

    /// Session over an interner the resolver's definitions were built with.
    pub fn with_interner(interner: TypeInterner, resolver: Arc<dyn MetadataResolver>) -> Self {
        Self {
            interner,
            resolver,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

impl TypeDatabase for Session {
    fn interner(&self) -> &TypeInterner {
        &self.interner
    }

    fn resolver(&self) -> &dyn MetadataResolver {
        self.resolver.as_ref()
    }

    fn config(&self) -> &EngineConfig {
        &self.config
    }
}
