//! Generic Type Engine for JVM Decompilation
//!
//! Models JVM types (primitives, classes, arrays, generic parameters,
//! parameterized types, wildcards) and answers the questions a decompiler
//! asks while reconstructing Java source:
//!
//! - **Substitution**: replace generic parameters through types and members
//! - **Erasure**: the JVM view of a generic type
//! - **Relations**: assignability, subtyping, conversions, common supertypes
//! - **Hierarchy**: sub-type mappings, member projection, method lookup
//!
//! Key properties:
//! - O(1) type equality via interning (`TypeId` comparison)
//! - Session-owned, thread-safe interner; no global state
//! - Cyclic bounds and hierarchies terminate through recursion guards
mod bindings;
pub mod common_supertype;
pub mod conversion;
mod db;
pub mod def;
pub mod erasure;
mod error;
pub mod format;
pub mod hierarchy;
pub mod instantiate;
mod intern;
pub mod members;
pub mod overload;
mod query_trace;
pub mod recursion;
pub mod relations;
pub mod types;
pub mod variables;

pub use bindings::GenericBindings;
pub use common_supertype::{find_common_super_type, numeric_promotion};
pub use conversion::{
    ConversionType, box_type, conversion_type, has_implicit_numeric_conversion,
    is_primitive_box_type, numeric_conversion_type, underlying_primitive_or_self,
};
pub use db::{EngineConfig, Session, TypeDatabase};
pub use def::{DefinitionStore, MetadataResolver, TypeDefinition, TypeFlags};
pub use erasure::{erase, erase_method};
pub use error::{TypeError, TypeResult};
pub use format::{FormatOptions, TypeFormatter, erased_method_descriptor};
pub use hierarchy::{
    MappingPath, SubTypeMappings, as_member_of, as_sub_type, field_as_member_of,
    find_all_methods, find_methods, instantiate_as_super_type, method_as_member_of,
    sub_type_mappings, sub_type_mappings_checked,
};
pub use instantiate::{
    TypeSubstitutor, enclosing_bindings, instantiate_definition, provider_bindings, substitute,
    substitute_field, substitute_member, substitute_members, substitute_method,
    substitute_with_bounds, substitute_with_method, substitute_with_provider,
};
pub use intern::{InternerStats, TypeInterner};
pub use members::{
    FieldFlags, FieldRef, MemberRef, MethodFlags, MethodKind, MethodRef, ParameterInfo,
};
pub use overload::is_overload_checking_required;
pub use recursion::{DepthLimit, RecursionGuard, RecursionProfile, RecursionResult};
pub use relations::{
    are_equivalent, base_type, interfaces, is_assignable_from, is_enclosed_by, is_sub_type,
};
pub use types::{
    GenericOwner, GenericParamId, GenericParamInfo, PrimitiveKind, TypeData, TypeId, TypeList,
    WildcardBound,
};
pub use variables::{SlotAccess, SlotKind, VariableDefinition, VariableTable};

// Test modules: most are loaded by their source files via #[path = "../tests/..."].
#[cfg(test)]
#[path = "../tests/fixtures.rs"]
pub(crate) mod fixtures;
#[cfg(test)]
#[path = "../tests/type_law_tests.rs"]
mod type_law_tests;
