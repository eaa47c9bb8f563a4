//! Type graph node model.
//!
//! Every node lives in a [`TypeInterner`](crate::TypeInterner) and is addressed
//! by a [`TypeId`]. Nodes are hash-consed, so two structurally identical nodes
//! always share one id and `TypeId` equality is node identity.
//!
//! The model mirrors the JVM view of types:
//!
//! | Variant | Java | Example |
//! |---------|------|---------|
//! | `Primitive` | primitive or `void` | `int` |
//! | `Named` | class/interface, possibly unresolved | `java/util/List` |
//! | `Array` | array, rank computed | `String[][]` |
//! | `GenericParameter` | type variable | `T extends Comparable<T>` |
//! | `GenericInstance` | parameterized type | `List<String>`, `Outer<T>.Inner` |
//! | `Wildcard` | wildcard argument | `? super T` |
//! | `Null` | the null type | `null` |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Immutable argument list snapshot shared between nodes.
pub type TypeList = Arc<[TypeId]>;

// =============================================================================
// TypeId
// =============================================================================

/// Handle to an interned type node.
///
/// Builtin handles are fixed: [`TypeInterner::new`](crate::TypeInterner::new)
/// registers them in this exact order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const VOID: Self = Self(0);
    pub const BOOLEAN: Self = Self(1);
    pub const BYTE: Self = Self(2);
    pub const CHAR: Self = Self(3);
    pub const SHORT: Self = Self(4);
    pub const INT: Self = Self(5);
    pub const LONG: Self = Self(6);
    pub const FLOAT: Self = Self(7);
    pub const DOUBLE: Self = Self(8);

    pub const NULL: Self = Self(9);
    pub const OBJECT: Self = Self(10);
    pub const STRING: Self = Self(11);
    pub const CLONEABLE: Self = Self(12);
    pub const SERIALIZABLE: Self = Self(13);

    pub const BOX_VOID: Self = Self(14);
    pub const BOX_BOOLEAN: Self = Self(15);
    pub const BOX_BYTE: Self = Self(16);
    pub const BOX_CHAR: Self = Self(17);
    pub const BOX_SHORT: Self = Self(18);
    pub const BOX_INT: Self = Self(19);
    pub const BOX_LONG: Self = Self(20);
    pub const BOX_FLOAT: Self = Self(21);
    pub const BOX_DOUBLE: Self = Self(22);

    /// First id handed out for non-builtin nodes.
    pub const FIRST_USER: u32 = 23;

    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

// =============================================================================
// Primitive kinds
// =============================================================================

/// JVM primitive kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveKind {
    pub const ALL: [Self; 9] = [
        Self::Void,
        Self::Boolean,
        Self::Byte,
        Self::Char,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
    ];

    /// Storage width in bits. `void` has none.
    pub const fn bit_width(self) -> u32 {
        match self {
            Self::Boolean => 1,
            Self::Byte => 8,
            Self::Char | Self::Short => 16,
            Self::Int | Self::Float => 32,
            Self::Long | Self::Double => 64,
            Self::Void => 0,
        }
    }

    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::Char | Self::Short | Self::Int | Self::Long
        )
    }

    /// Integral or floating; `boolean` and `void` are not numeric.
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Boolean | Self::Void)
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    pub const fn descriptor(self) -> char {
        match self {
            Self::Boolean => 'Z',
            Self::Byte => 'B',
            Self::Char => 'C',
            Self::Short => 'S',
            Self::Int => 'I',
            Self::Long => 'J',
            Self::Float => 'F',
            Self::Double => 'D',
            Self::Void => 'V',
        }
    }

    pub fn from_descriptor(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.descriptor() == c)
    }

    pub const fn java_name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Void => "void",
        }
    }

    /// Internal name of the box class, e.g. `java/lang/Integer`.
    pub const fn box_internal_name(self) -> &'static str {
        match self {
            Self::Boolean => "java/lang/Boolean",
            Self::Byte => "java/lang/Byte",
            Self::Char => "java/lang/Character",
            Self::Short => "java/lang/Short",
            Self::Int => "java/lang/Integer",
            Self::Long => "java/lang/Long",
            Self::Float => "java/lang/Float",
            Self::Double => "java/lang/Double",
            Self::Void => "java/lang/Void",
        }
    }

    pub fn from_box_internal_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.box_internal_name() == name)
    }

    pub const fn type_id(self) -> TypeId {
        match self {
            Self::Void => TypeId::VOID,
            Self::Boolean => TypeId::BOOLEAN,
            Self::Byte => TypeId::BYTE,
            Self::Char => TypeId::CHAR,
            Self::Short => TypeId::SHORT,
            Self::Int => TypeId::INT,
            Self::Long => TypeId::LONG,
            Self::Float => TypeId::FLOAT,
            Self::Double => TypeId::DOUBLE,
        }
    }

    pub const fn box_type_id(self) -> TypeId {
        match self {
            Self::Void => TypeId::BOX_VOID,
            Self::Boolean => TypeId::BOX_BOOLEAN,
            Self::Byte => TypeId::BOX_BYTE,
            Self::Char => TypeId::BOX_CHAR,
            Self::Short => TypeId::BOX_SHORT,
            Self::Int => TypeId::BOX_INT,
            Self::Long => TypeId::BOX_LONG,
            Self::Float => TypeId::BOX_FLOAT,
            Self::Double => TypeId::BOX_DOUBLE,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.java_name())
    }
}

// =============================================================================
// Generic parameters
// =============================================================================

/// Identity of a generic parameter declaration.
///
/// Two nodes naming the same declaration share this id even when their bounds
/// differ (a substituted bound produces a new node, not a new declaration).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenericParamId(pub u32);

/// The type or method that declares a generic parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GenericOwner {
    Type(Arc<str>),
    Method {
        declaring_type: Arc<str>,
        name: Arc<str>,
        descriptor: Arc<str>,
    },
}

impl GenericOwner {
    pub fn type_name(&self) -> &str {
        match self {
            Self::Type(name) => name,
            Self::Method { declaring_type, .. } => declaring_type,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Self::Method { .. })
    }
}

/// Declaration record for a generic parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericParamInfo {
    pub name: Arc<str>,
    pub owner: GenericOwner,
    pub position: u32,
    /// Declared upper bound; `None` means `Object`.
    pub upper_bound: Option<TypeId>,
}

// =============================================================================
// TypeData
// =============================================================================

/// Wildcard bound. At most one bound exists by construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Unbounded,
    Extends(TypeId),
    Super(TypeId),
}

/// Structural content of a type node; the interner key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Primitive(PrimitiveKind),
    /// Class or interface by internal name (`java/util/Map$Entry`).
    Named(Arc<str>),
    Array(TypeId),
    /// `bound` overrides the declared upper bound after substitution.
    GenericParameter {
        param: GenericParamId,
        bound: Option<TypeId>,
    },
    /// `definition` is the `Named` node of the generic type. `outer` is the
    /// parameterized enclosing instance of a non-static inner class
    /// (`Outer<String>.Inner`); `arguments` may then be empty.
    GenericInstance {
        definition: TypeId,
        arguments: TypeList,
        outer: Option<TypeId>,
    },
    Wildcard(WildcardBound),
    Null,
}

impl TypeData {
    pub fn named(internal_name: &str) -> Self {
        Self::Named(Arc::from(internal_name))
    }

    pub fn is_reference(&self) -> bool {
        !matches!(self, Self::Primitive(_))
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
