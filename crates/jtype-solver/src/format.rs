//! Rendering types as Java source names, JVM descriptors and generic
//! signatures.
//!
//! | Form | `List<String>[]` renders as |
//! |------|-----------------------------|
//! | Java name | `java.util.List<java.lang.String>[]` |
//! | simple name | `List<String>[]` |
//! | descriptor | `[Ljava/util/List;` |
//! | signature | `[Ljava/util/List<Ljava/lang/String;>;` |

use crate::db::TypeDatabase;
use crate::erasure::erase;
use crate::intern::TypeInterner;
use crate::members::MethodRef;
use crate::types::{PrimitiveKind, TypeData, TypeId, WildcardBound};

/// Options for [`TypeFormatter::java_name`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    /// Qualify class names with their package.
    pub include_package: bool,
    /// Render generic parameters as declarations (`T extends Comparable<T>`)
    /// at the top level.
    pub include_type_parameter_definitions: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            include_package: true,
            include_type_parameter_definitions: false,
        }
    }
}

impl FormatOptions {
    pub fn simple() -> Self {
        Self {
            include_package: false,
            ..Self::default()
        }
    }
}

pub struct TypeFormatter<'a> {
    db: &'a dyn TypeDatabase,
    options: FormatOptions,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        Self {
            db,
            options: FormatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    // =========================================================================
    // Java names
    // =========================================================================

    pub fn java_name(&self, ty: TypeId) -> String {
        let mut out = String::new();
        if self.options.include_type_parameter_definitions
            && self.db.interner().is_generic_parameter(ty)
        {
            self.write_parameter_definition(&mut out, ty);
        } else {
            self.write_java_name(&mut out, ty);
        }
        out
    }

    /// `T`, or `T extends Comparable<T>`. An `Object` bound is omitted.
    pub fn parameter_definition(&self, param: TypeId) -> String {
        let mut out = String::new();
        self.write_parameter_definition(&mut out, param);
        out
    }

    /// `<K, V extends Comparable<V>>`; empty for no parameters.
    pub fn parameter_list(&self, params: &[TypeId]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let mut out = String::from("<");
        for (i, &param) in params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_parameter_definition(&mut out, param);
        }
        out.push('>');
        out
    }

    fn write_parameter_definition(&self, out: &mut String, param: TypeId) {
        self.write_java_name(out, param);
        let bound = self.db.interner().upper_bound(param);
        if let Some(bound) = bound.filter(|&bound| bound != TypeId::OBJECT) {
            out.push_str(" extends ");
            self.write_java_name(out, bound);
        }
    }

    fn write_java_name(&self, out: &mut String, ty: TypeId) {
        let interner = self.db.interner();
        let Some(data) = interner.lookup(ty) else {
            out.push_str("<unknown>");
            return;
        };
        match data {
            TypeData::Primitive(kind) => out.push_str(kind.java_name()),
            TypeData::Null => out.push_str("null"),
            TypeData::Named(name) => self.write_class_name(out, &name),
            TypeData::Array(element) => {
                self.write_java_name(out, element);
                out.push_str("[]");
            }
            TypeData::GenericParameter { param, .. } => match interner.generic_param_info(param) {
                Some(info) => out.push_str(&info.name),
                None => out.push_str("<unknown>"),
            },
            TypeData::GenericInstance {
                definition,
                arguments,
                outer,
            } => {
                match outer {
                    Some(outer) => {
                        self.write_java_name(out, outer);
                        out.push('.');
                        out.push_str(&simple_name(interner, definition));
                    }
                    None => self.write_java_name(out, definition),
                }
                if arguments.is_empty() {
                    return;
                }
                out.push('<');
                for (i, &argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_java_name(out, argument);
                }
                out.push('>');
            }
            TypeData::Wildcard(WildcardBound::Unbounded) => out.push('?'),
            TypeData::Wildcard(WildcardBound::Extends(bound)) => {
                out.push_str("? extends ");
                self.write_java_name(out, bound);
            }
            TypeData::Wildcard(WildcardBound::Super(bound)) => {
                out.push_str("? super ");
                self.write_java_name(out, bound);
            }
        }
    }

    fn write_class_name(&self, out: &mut String, internal_name: &str) {
        let name = if self.options.include_package {
            internal_name
        } else {
            internal_name
                .rsplit_once('/')
                .map_or(internal_name, |(_, simple)| simple)
        };
        out.extend(name.chars().map(|c| if c == '/' || c == '$' { '.' } else { c }));
    }

    // =========================================================================
    // Descriptors and signatures
    // =========================================================================

    /// Erased JVM descriptor: `I`, `[Ljava/lang/String;`.
    pub fn descriptor(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out, ty);
        out
    }

    fn write_descriptor(&self, out: &mut String, ty: TypeId) {
        let interner = self.db.interner();
        let erased = erase(self.db, ty);
        match interner.lookup(erased) {
            Some(TypeData::Primitive(kind)) => out.push(kind.descriptor()),
            Some(TypeData::Array(element)) => {
                out.push('[');
                self.write_descriptor(out, element);
            }
            Some(TypeData::Named(name)) => {
                out.push('L');
                out.push_str(&name);
                out.push(';');
            }
            _ => out.push_str("Ljava/lang/Object;"),
        }
    }

    /// Generic signature: `Ljava/util/List<TE;>;`, `TT;`, `*`.
    pub fn signature(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_signature(&mut out, ty);
        out
    }

    fn write_signature(&self, out: &mut String, ty: TypeId) {
        let interner = self.db.interner();
        let Some(data) = interner.lookup(ty) else {
            out.push_str("Ljava/lang/Object;");
            return;
        };
        match data {
            TypeData::Primitive(kind) => out.push(kind.descriptor()),
            TypeData::Null => out.push_str("Ljava/lang/Object;"),
            TypeData::Named(name) => {
                out.push('L');
                out.push_str(&name);
                out.push(';');
            }
            TypeData::Array(element) => {
                out.push('[');
                self.write_signature(out, element);
            }
            TypeData::GenericParameter { param, .. } => {
                let name = interner.generic_param_info(param).map(|info| info.name);
                out.push('T');
                out.push_str(name.as_deref().unwrap_or("?"));
                out.push(';');
            }
            TypeData::GenericInstance {
                definition,
                arguments,
                outer,
            } => {
                match outer {
                    Some(outer) => {
                        self.write_signature(out, outer);
                        out.pop();
                        out.push('.');
                        out.push_str(&simple_name(interner, definition));
                    }
                    None => {
                        let name = interner.internal_name(definition);
                        out.push('L');
                        out.push_str(name.as_deref().unwrap_or("java/lang/Object"));
                    }
                }
                if !arguments.is_empty() {
                    out.push('<');
                    for &argument in arguments.iter() {
                        self.write_signature(out, argument);
                    }
                    out.push('>');
                }
                out.push(';');
            }
            TypeData::Wildcard(WildcardBound::Unbounded) => out.push('*'),
            TypeData::Wildcard(WildcardBound::Extends(bound)) => {
                out.push('+');
                self.write_signature(out, bound);
            }
            TypeData::Wildcard(WildcardBound::Super(bound)) => {
                out.push('-');
                self.write_signature(out, bound);
            }
        }
    }

    /// Signature of a generic parameter declaration: `T:Ljava/lang/Object;`,
    /// or `T::Ljava/lang/Comparable<TT;>;` for an interface bound.
    pub fn parameter_signature(&self, param: TypeId) -> String {
        let interner = self.db.interner();
        let mut out = String::new();
        match interner
            .generic_param_id(param)
            .and_then(|id| interner.generic_param_info(id))
        {
            Some(info) => out.push_str(&info.name),
            None => out.push('?'),
        }
        out.push(':');
        let bound = interner.upper_bound(param).unwrap_or(TypeId::OBJECT);
        if self.db.resolve(bound).is_some_and(|def| def.is_interface()) {
            out.push(':');
        }
        self.write_signature(&mut out, bound);
        out
    }

    /// Erased method descriptor: `(ILjava/lang/String;)V`.
    pub fn method_descriptor(&self, method: &MethodRef) -> String {
        let mut out = String::from("(");
        for parameter in method.parameter_types() {
            self.write_descriptor(&mut out, parameter);
        }
        out.push(')');
        self.write_descriptor(&mut out, method.return_type);
        out
    }

    /// Generic method signature, `<T:Ljava/lang/Object;>(TT;)TT;`.
    pub fn method_signature(&self, method: &MethodRef) -> String {
        let mut out = String::new();
        if !method.generic_parameters.is_empty() {
            out.push('<');
            for &param in method.generic_parameters.iter() {
                out.push_str(&self.parameter_signature(param));
            }
            out.push('>');
        }
        out.push('(');
        for parameter in method.parameter_types() {
            self.write_signature(&mut out, parameter);
        }
        out.push(')');
        self.write_signature(&mut out, method.return_type);
        for &thrown in method.thrown_types.iter() {
            out.push('^');
            self.write_signature(&mut out, thrown);
        }
        out
    }
}

/// Shorthand for [`TypeFormatter::method_descriptor`].
pub fn erased_method_descriptor(db: &dyn TypeDatabase, method: &MethodRef) -> String {
    TypeFormatter::new(db).method_descriptor(method)
}

/// Java name with package qualification.
pub fn java_name(db: &dyn TypeDatabase, ty: TypeId) -> String {
    TypeFormatter::new(db).java_name(ty)
}

/// Name of an inner class after its last `$`: `Map$Entry` gives `Entry`.
fn simple_name(interner: &TypeInterner, definition: TypeId) -> String {
    let name = interner.internal_name(definition).unwrap_or_else(|| "?".into());
    let simple = name.rsplit(['$', '/']).next().unwrap_or(&*name);
    simple.to_string()
}

/// Parse a primitive from its Java keyword.
pub fn primitive_from_java_name(name: &str) -> Option<PrimitiveKind> {
    PrimitiveKind::ALL
        .into_iter()
        .find(|kind| kind.java_name() == name)
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
