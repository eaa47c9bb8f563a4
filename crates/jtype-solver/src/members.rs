//! Member references: fields, methods and constructors.
//!
//! Members are immutable and shared through `Arc`. Substitution either hands
//! back the same `Arc` (nothing changed) or a new member whose `declaration`
//! points at the unsubstituted original.

use crate::types::TypeId;
use bitflags::bitflags;
use std::sync::Arc;

bitflags! {
    /// Method attributes relevant to type analysis.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MethodFlags: u16 {
        const VARARGS = 1 << 0;
        const BRIDGE = 1 << 1;
        const STATIC = 1 << 2;
        const ABSTRACT = 1 << 3;
        const SYNTHETIC = 1 << 4;
        const FINAL = 1 << 5;
        const PRIVATE = 1 << 6;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u16 {
        const STATIC = 1 << 0;
        const FINAL = 1 << 1;
        const SYNTHETIC = 1 << 2;
        const PRIVATE = 1 << 3;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Method,
    Constructor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: Arc<str>,
    pub parameter_type: TypeId,
}

impl ParameterInfo {
    pub fn new(name: &str, parameter_type: TypeId) -> Self {
        Self {
            name: Arc::from(name),
            parameter_type,
        }
    }
}

// =============================================================================
// Fields
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRef {
    pub declaring_type: TypeId,
    pub name: Arc<str>,
    pub field_type: TypeId,
    pub flags: FieldFlags,
    pub declaration: Option<Arc<FieldRef>>,
}

impl FieldRef {
    pub fn new(declaring_type: TypeId, name: &str, field_type: TypeId) -> Self {
        Self {
            declaring_type,
            name: Arc::from(name),
            field_type,
            flags: FieldFlags::empty(),
            declaration: None,
        }
    }

    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The unsubstituted declaration this field was derived from.
    pub fn resolve(self: &Arc<Self>) -> Arc<Self> {
        self.declaration.clone().unwrap_or_else(|| Arc::clone(self))
    }
}

// =============================================================================
// Methods
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodRef {
    pub declaring_type: TypeId,
    pub name: Arc<str>,
    pub kind: MethodKind,
    pub return_type: TypeId,
    pub parameters: Arc<[ParameterInfo]>,
    pub thrown_types: Arc<[TypeId]>,
    /// The method's own type parameters (declared nodes).
    pub generic_parameters: Arc<[TypeId]>,
    /// Explicit instantiation of `generic_parameters`, when known.
    pub type_arguments: Arc<[TypeId]>,
    pub flags: MethodFlags,
    pub declaration: Option<Arc<MethodRef>>,
}

impl MethodRef {
    pub fn method(declaring_type: TypeId, name: &str, return_type: TypeId) -> Self {
        Self {
            declaring_type,
            name: Arc::from(name),
            kind: MethodKind::Method,
            return_type,
            parameters: Arc::from([]),
            thrown_types: Arc::from([]),
            generic_parameters: Arc::from([]),
            type_arguments: Arc::from([]),
            flags: MethodFlags::empty(),
            declaration: None,
        }
    }

    pub fn constructor(declaring_type: TypeId) -> Self {
        Self {
            kind: MethodKind::Constructor,
            ..Self::method(declaring_type, "<init>", TypeId::VOID)
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterInfo>) -> Self {
        self.parameters = Arc::from(parameters);
        self
    }

    /// Parameters named `p0`, `p1`, ...
    pub fn with_parameter_types(self, types: &[TypeId]) -> Self {
        let parameters = types
            .iter()
            .enumerate()
            .map(|(i, &ty)| ParameterInfo::new(&format!("p{i}"), ty))
            .collect();
        self.with_parameters(parameters)
    }

    pub fn with_thrown_types(mut self, thrown_types: &[TypeId]) -> Self {
        self.thrown_types = Arc::from(thrown_types);
        self
    }

    pub fn with_generic_parameters(mut self, generic_parameters: &[TypeId]) -> Self {
        self.generic_parameters = Arc::from(generic_parameters);
        self
    }

    pub fn with_type_arguments(mut self, type_arguments: &[TypeId]) -> Self {
        self.type_arguments = Arc::from(type_arguments);
        self
    }

    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == MethodKind::Constructor
    }

    pub fn is_var_args(&self) -> bool {
        self.flags.contains(MethodFlags::VARARGS)
    }

    pub fn is_bridge(&self) -> bool {
        self.flags.contains(MethodFlags::BRIDGE)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    pub fn is_generic_method(&self) -> bool {
        !self.generic_parameters.is_empty()
    }

    pub fn parameter_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.parameters.iter().map(|p| p.parameter_type)
    }

    /// The unsubstituted declaration this method was derived from.
    pub fn resolve(self: &Arc<Self>) -> Arc<Self> {
        self.declaration.clone().unwrap_or_else(|| Arc::clone(self))
    }
}

// =============================================================================
// MemberRef
// =============================================================================

/// Any member that can be substituted or projected onto a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberRef {
    Field(Arc<FieldRef>),
    Method(Arc<MethodRef>),
}

impl MemberRef {
    pub fn declaring_type(&self) -> TypeId {
        match self {
            Self::Field(field) => field.declaring_type,
            Self::Method(method) => method.declaring_type,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Field(field) => &field.name,
            Self::Method(method) => &method.name,
        }
    }

    /// Shared-instance identity, not structural equality.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Field(a), Self::Field(b)) => Arc::ptr_eq(a, b),
            (Self::Method(a), Self::Method(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_method(&self) -> Option<&Arc<MethodRef>> {
        match self {
            Self::Method(method) => Some(method),
            Self::Field(_) => None,
        }
    }

    pub fn as_field(&self) -> Option<&Arc<FieldRef>> {
        match self {
            Self::Field(field) => Some(field),
            Self::Method(_) => None,
        }
    }
}

impl From<Arc<MethodRef>> for MemberRef {
    fn from(method: Arc<MethodRef>) -> Self {
        Self::Method(method)
    }
}

impl From<Arc<FieldRef>> for MemberRef {
    fn from(field: Arc<FieldRef>) -> Self {
        Self::Field(field)
    }
}
