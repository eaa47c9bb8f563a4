//! Type definitions and the metadata resolver seam.
//!
//! A [`TypeDefinition`] is the resolved form of a class or interface: its
//! supertypes, members and generic parameters. The engine never loads class
//! files itself; it asks a [`MetadataResolver`] by internal name and treats a
//! `None` answer as "unresolved", degrading to conservative answers rather
//! than failing.
//!
//! [`DefinitionStore`] is the in-memory resolver used by the CLI and tests.
//!
//! | Resolver | Backing | Use Case |
//! |----------|---------|----------|
//! | `DefinitionStore` | `DashMap` | pre-loaded universes, tests |
//! | custom impl | class path, jar index | embedding decompilers |

use crate::intern::TypeInterner;
use crate::members::{FieldRef, MethodRef};
use crate::types::{PrimitiveKind, TypeId};
use bitflags::bitflags;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Global counter for assigning unique instance IDs to `DefinitionStore` instances.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u8 {
        const INTERFACE = 1 << 0;
        const GENERIC_DEFINITION = 1 << 1;
        const INNER_CLASS = 1 << 2;
        const ANONYMOUS = 1 << 3;
        const STATIC = 1 << 4;
        const ABSTRACT = 1 << 5;
    }
}

// =============================================================================
// TypeDefinition
// =============================================================================

/// Resolved class or interface.
///
/// Supertypes are stored as written in the declaration, in terms of the
/// definition's own generic parameters (`ArrayList<E>` extends
/// `AbstractList<E>`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDefinition {
    pub internal_name: Arc<str>,
    /// `Named` node for this definition.
    pub self_type: TypeId,
    pub base_type: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub fields: Vec<Arc<FieldRef>>,
    pub methods: Vec<Arc<MethodRef>>,
    pub generic_parameters: Vec<TypeId>,
    pub declaring_type: Option<TypeId>,
    pub flags: TypeFlags,
}

impl TypeDefinition {
    /// Class extending `java/lang/Object` unless told otherwise.
    pub fn class(interner: &TypeInterner, internal_name: &str) -> Self {
        let self_type = interner.named(internal_name);
        Self {
            internal_name: Arc::from(internal_name),
            self_type,
            base_type: (self_type != TypeId::OBJECT).then_some(TypeId::OBJECT),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            generic_parameters: Vec::new(),
            declaring_type: None,
            flags: TypeFlags::empty(),
        }
    }

    /// Interfaces have no base type.
    pub fn interface(interner: &TypeInterner, internal_name: &str) -> Self {
        Self {
            base_type: None,
            flags: TypeFlags::INTERFACE | TypeFlags::ABSTRACT,
            ..Self::class(interner, internal_name)
        }
    }

    pub fn with_base_type(mut self, base_type: Option<TypeId>) -> Self {
        self.base_type = base_type;
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<TypeId>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Also marks the definition generic when `params` is non-empty.
    pub fn with_generic_parameters(mut self, params: Vec<TypeId>) -> Self {
        self.flags.set(TypeFlags::GENERIC_DEFINITION, !params.is_empty());
        self.generic_parameters = params;
        self
    }

    pub fn with_field(mut self, field: FieldRef) -> Self {
        self.fields.push(Arc::new(field));
        self
    }

    pub fn with_method(mut self, method: MethodRef) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    pub fn with_declaring_type(mut self, declaring_type: TypeId) -> Self {
        self.declaring_type = Some(declaring_type);
        self.flags.insert(TypeFlags::INNER_CLASS);
        self
    }

    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.flags.contains(TypeFlags::INTERFACE)
    }

    #[inline]
    pub fn is_generic_definition(&self) -> bool {
        self.flags.contains(TypeFlags::GENERIC_DEFINITION)
    }

    pub fn is_inner_class(&self) -> bool {
        self.flags.contains(TypeFlags::INNER_CLASS)
    }
}

// =============================================================================
// MetadataResolver
// =============================================================================

/// Source of resolved type definitions.
///
/// Implementations are called from every worker thread of a session and must
/// not call back into the engine while holding internal locks.
pub trait MetadataResolver: Send + Sync {
    fn resolve(&self, internal_name: &str) -> Option<Arc<TypeDefinition>>;
}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Concurrent in-memory resolver keyed by internal name.
///
/// ```ignore
/// let store = DefinitionStore::new();
/// store.register_builtins(&interner);
/// store.register(TypeDefinition::class(&interner, "com/example/Foo"));
/// let foo = store.resolve("com/example/Foo");
/// ```
pub struct DefinitionStore {
    /// Unique instance ID for debugging
    instance_id: u64,
    definitions: DashMap<Arc<str>, Arc<TypeDefinition>, FxBuildHasher>,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    pub fn new() -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "DefinitionStore::new - creating new instance");
        Self {
            instance_id,
            definitions: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Register (or replace) a definition.
    pub fn register(&self, definition: TypeDefinition) -> Arc<TypeDefinition> {
        trace!(
            instance_id = self.instance_id,
            name = %definition.internal_name,
            generic = definition.is_generic_definition(),
            "DefinitionStore::register"
        );
        let definition = Arc::new(definition);
        self.definitions.insert(
            Arc::clone(&definition.internal_name),
            Arc::clone(&definition),
        );
        definition
    }

    pub fn get(&self, internal_name: &str) -> Option<Arc<TypeDefinition>> {
        self.definitions
            .get(internal_name)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, internal_name: &str) -> bool {
        self.definitions.contains_key(internal_name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn clear(&self) {
        trace!(instance_id = self.instance_id, "DefinitionStore::clear");
        self.definitions.clear();
    }

    /// Register the `java.lang` classes the engine has builtin ids for.
    ///
    /// Box types extend `java/lang/Number` where the JDK does; `String`,
    /// `Boolean` and `Character` extend `Object` directly.
    pub fn register_builtins(&self, interner: &TypeInterner) {
        self.register(TypeDefinition::class(interner, "java/lang/Object"));
        self.register(TypeDefinition::interface(interner, "java/io/Serializable"));
        self.register(TypeDefinition::interface(interner, "java/lang/Cloneable"));
        self.register(
            TypeDefinition::class(interner, "java/lang/String")
                .with_interfaces(vec![TypeId::SERIALIZABLE]),
        );
        let number = interner.named("java/lang/Number");
        self.register(
            TypeDefinition::class(interner, "java/lang/Number")
                .with_interfaces(vec![TypeId::SERIALIZABLE])
                .with_flags(TypeFlags::ABSTRACT),
        );
        for kind in PrimitiveKind::ALL {
            let base = if kind.is_integral() && kind != PrimitiveKind::Char || kind.is_floating() {
                number
            } else {
                TypeId::OBJECT
            };
            self.register(
                TypeDefinition::class(interner, kind.box_internal_name())
                    .with_base_type(Some(base)),
            );
        }
    }
}

impl MetadataResolver for DefinitionStore {
    fn resolve(&self, internal_name: &str) -> Option<Arc<TypeDefinition>> {
        self.get(internal_name)
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
