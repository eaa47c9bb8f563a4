//! JSON class universe: the serde model of a universe file and its lowering
//! into a solver [`Session`].
//!
//! Type expressions are externally tagged:
//!
//! ```json
//! "null"
//! {"primitive": "int"}
//! {"class": {"name": "java/util/List", "args": [{"class": {"name": "java/lang/String"}}]}}
//! {"class": {"name": "demo/Outer$Inner", "outer": {"class": {"name": "demo/Outer", "args": [...]}}}}
//! {"array": {"primitive": "byte"}}
//! {"param": {"owner": "java/util/List", "name": "E"}}
//! {"wildcard": {"extends": {"class": {"name": "java/lang/Number"}}}}
//! ```

use crate::query::Query;
use anyhow::{Context, Result, anyhow, bail};
use jtype_solver::format::primitive_from_java_name;
use jtype_solver::{
    DefinitionStore, EngineConfig, FieldFlags, FieldRef, GenericOwner, MetadataResolver,
    MethodFlags, MethodRef, Session, TypeDatabase, TypeDefinition, TypeFlags, TypeId,
    TypeInterner,
};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// File model
// =============================================================================

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UniverseFile {
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
    #[serde(default)]
    pub queries: Vec<Query>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassSpec {
    /// Internal name, `java/util/List`.
    pub name: String,
    #[serde(default)]
    pub interface: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub type_params: Vec<TypeParamSpec>,
    /// Base class; `java/lang/Object` when absent. Not allowed on interfaces.
    #[serde(default)]
    pub extends: Option<TypeExpr>,
    /// Implemented (or, for interfaces, extended) interfaces.
    #[serde(default)]
    pub implements: Vec<TypeExpr>,
    /// Enclosing class of an inner class.
    #[serde(default)]
    pub outer: Option<String>,
    /// A static nested class sees none of its enclosing class's parameters.
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeParamSpec {
    pub name: String,
    #[serde(default)]
    pub bound: Option<TypeExpr>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: TypeExpr,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodSpec {
    /// Method name; `<init>` declares a constructor.
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<TypeParamSpec>,
    #[serde(default)]
    pub params: Vec<TypeExpr>,
    #[serde(default = "TypeExpr::void")]
    pub returns: TypeExpr,
    #[serde(default)]
    pub throws: Vec<TypeExpr>,
    #[serde(default)]
    pub flags: Vec<MethodFlagSpec>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodFlagSpec {
    Varargs,
    Bridge,
    Static,
    Abstract,
    Synthetic,
    Final,
    Private,
}

impl From<MethodFlagSpec> for MethodFlags {
    fn from(flag: MethodFlagSpec) -> Self {
        match flag {
            MethodFlagSpec::Varargs => Self::VARARGS,
            MethodFlagSpec::Bridge => Self::BRIDGE,
            MethodFlagSpec::Static => Self::STATIC,
            MethodFlagSpec::Abstract => Self::ABSTRACT,
            MethodFlagSpec::Synthetic => Self::SYNTHETIC,
            MethodFlagSpec::Final => Self::FINAL,
            MethodFlagSpec::Private => Self::PRIVATE,
        }
    }
}

/// A type written in a universe file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeExpr {
    Null,
    Primitive(String),
    Class(ClassExpr),
    Array(Box<TypeExpr>),
    Param(ParamExpr),
    Wildcard(WildcardExpr),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassExpr {
    pub name: String,
    #[serde(default)]
    pub args: Vec<TypeExpr>,
    /// Parameterized enclosing instance of an inner class.
    #[serde(default)]
    pub outer: Option<Box<TypeExpr>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamExpr {
    /// Declaring class; method type parameters use the method's class.
    pub owner: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WildcardExpr {
    #[serde(default)]
    pub extends: Option<Box<TypeExpr>>,
    #[serde(default, rename = "super")]
    pub super_bound: Option<Box<TypeExpr>>,
}

impl TypeExpr {
    pub fn void() -> Self {
        Self::Primitive("void".to_string())
    }

    pub fn class(name: &str) -> Self {
        Self::Class(ClassExpr {
            name: name.to_string(),
            args: Vec::new(),
            outer: None,
        })
    }
}

// =============================================================================
// Lowering
// =============================================================================

/// Lower `expr` to an interned type.
///
/// `arity` reports the number of type parameters of a known class (`None`
/// for unknown names); `param` resolves generic parameter references.
fn lower_with(
    interner: &TypeInterner,
    expr: &TypeExpr,
    arity: &impl Fn(&str) -> Option<usize>,
    param: &impl Fn(&ParamExpr) -> Result<TypeId>,
) -> Result<TypeId> {
    match expr {
        TypeExpr::Null => Ok(TypeId::NULL),
        TypeExpr::Primitive(name) => primitive_from_java_name(name)
            .map(|kind| kind.type_id())
            .ok_or_else(|| anyhow!("unknown primitive type `{name}`")),
        TypeExpr::Class(class) => {
            let Some(expected) = arity(&class.name) else {
                bail!("unknown class `{}`", class.name);
            };
            let definition = interner.named(&class.name);
            let outer = class
                .outer
                .as_deref()
                .map(|outer| lower_with(interner, outer, arity, param))
                .transpose()?;
            if class.args.is_empty() {
                return Ok(match outer {
                    Some(outer) => interner.inner_instance(outer, definition, &[]),
                    None => definition,
                });
            }
            if class.args.len() != expected {
                bail!(
                    "`{}` takes {expected} type arguments, found {}",
                    class.name,
                    class.args.len()
                );
            }
            let arguments = class
                .args
                .iter()
                .map(|argument| lower_with(interner, argument, arity, param))
                .collect::<Result<Vec<_>>>()?;
            Ok(match outer {
                Some(outer) => interner.inner_instance(outer, definition, &arguments),
                None => interner.generic_instance(definition, &arguments),
            })
        }
        TypeExpr::Array(element) => {
            let element = lower_with(interner, element, arity, param)?;
            Ok(interner.array(element))
        }
        TypeExpr::Param(reference) => param(reference),
        TypeExpr::Wildcard(wildcard) => match (&wildcard.extends, &wildcard.super_bound) {
            (None, None) => Ok(interner.unbounded_wildcard()),
            (Some(bound), None) => Ok(interner.wildcard_extends(lower_with(
                interner, bound, arity, param,
            )?)),
            (None, Some(bound)) => Ok(interner.wildcard_super(lower_with(
                interner, bound, arity, param,
            )?)),
            (Some(_), Some(_)) => bail!("a wildcard takes an `extends` or a `super` bound, not both"),
        },
    }
}

/// Builds definitions for every class of a file against one interner.
struct Loader<'a> {
    interner: &'a TypeInterner,
    store: &'a DefinitionStore,
    specs: FxHashMap<&'a str, &'a ClassSpec>,
    class_params: FxHashMap<(String, String), TypeId>,
}

impl<'a> Loader<'a> {
    fn new(
        interner: &'a TypeInterner,
        store: &'a DefinitionStore,
        classes: &'a [ClassSpec],
    ) -> Result<Self> {
        let mut specs = FxHashMap::default();
        for class in classes {
            if specs.insert(class.name.as_str(), class).is_some() {
                bail!("class `{}` is declared twice", class.name);
            }
        }
        Ok(Self {
            interner,
            store,
            specs,
            class_params: FxHashMap::default(),
        })
    }

    fn arity(&self, name: &str) -> Option<usize> {
        match self.specs.get(name) {
            Some(class) => Some(class.type_params.len()),
            None => self
                .store
                .get(name)
                .map(|definition| definition.generic_parameters.len()),
        }
    }

    /// Declare every class's type parameters so bounds may refer to any of
    /// them regardless of declaration order.
    fn declare_class_parameters(&mut self, classes: &[ClassSpec]) -> Result<()> {
        for class in classes {
            let owner = GenericOwner::Type(Arc::from(class.name.as_str()));
            for (position, param) in class.type_params.iter().enumerate() {
                let node = self.interner.declare_generic_parameter(
                    owner.clone(),
                    position as u32,
                    &param.name,
                );
                let key = (class.name.clone(), param.name.clone());
                if self.class_params.insert(key, node).is_some() {
                    bail!(
                        "class `{}` declares type parameter `{}` twice",
                        class.name,
                        param.name
                    );
                }
            }
        }
        Ok(())
    }

    fn param(
        &self,
        reference: &ParamExpr,
        class: &ClassSpec,
        locals: &[(&str, TypeId)],
    ) -> Result<TypeId> {
        if reference.owner == class.name {
            if let Some(&(_, node)) = locals.iter().find(|(name, _)| *name == reference.name) {
                return Ok(node);
            }
        }
        self.class_params
            .get(&(reference.owner.clone(), reference.name.clone()))
            .copied()
            .ok_or_else(|| {
                anyhow!(
                    "unknown generic parameter `{}` of `{}`",
                    reference.name,
                    reference.owner
                )
            })
    }

    fn lower(&self, expr: &TypeExpr, class: &ClassSpec, locals: &[(&str, TypeId)]) -> Result<TypeId> {
        lower_with(
            self.interner,
            expr,
            &|name: &str| self.arity(name),
            &|reference: &ParamExpr| self.param(reference, class, locals),
        )
    }

    fn bound_class_parameters(&self, class: &ClassSpec) -> Result<()> {
        for param in &class.type_params {
            let Some(bound) = &param.bound else {
                continue;
            };
            let bound = self
                .lower(bound, class, &[])
                .with_context(|| format!("bound of `{}`", param.name))?;
            let node = self.class_params[&(class.name.clone(), param.name.clone())];
            self.interner.set_upper_bound(node, bound);
        }
        Ok(())
    }

    fn definition(&self, class: &ClassSpec) -> Result<TypeDefinition> {
        let interner = self.interner;
        let self_type = interner.named(&class.name);
        let mut definition = if class.interface {
            TypeDefinition::interface(interner, &class.name)
        } else {
            TypeDefinition::class(interner, &class.name)
        };

        let params = class
            .type_params
            .iter()
            .map(|param| self.class_params[&(class.name.clone(), param.name.clone())])
            .collect();
        definition = definition.with_generic_parameters(params);

        if let Some(base) = &class.extends {
            if class.interface {
                bail!("interfaces list their super-interfaces under `implements`");
            }
            let base = self.lower(base, class, &[]).context("base type")?;
            definition = definition.with_base_type(Some(base));
        }
        let interfaces = class
            .implements
            .iter()
            .map(|interface| self.lower(interface, class, &[]))
            .collect::<Result<Vec<_>>>()
            .context("interfaces")?;
        definition = definition.with_interfaces(interfaces);

        if let Some(outer) = &class.outer {
            if self.arity(outer).is_none() {
                bail!("unknown outer class `{outer}`");
            }
            definition = definition.with_declaring_type(interner.named(outer));
            if class.is_static {
                definition = definition.with_flags(TypeFlags::STATIC);
            }
        }
        if class.is_abstract {
            definition = definition.with_flags(TypeFlags::ABSTRACT);
        }

        for field in &class.fields {
            let field_type = self
                .lower(&field.field_type, class, &[])
                .with_context(|| format!("field `{}`", field.name))?;
            let mut field_ref = FieldRef::new(self_type, &field.name, field_type);
            if field.is_static {
                field_ref = field_ref.with_flags(FieldFlags::STATIC);
            }
            definition = definition.with_field(field_ref);
        }
        for method in &class.methods {
            let method_ref = self
                .method(class, method, self_type)
                .with_context(|| format!("method `{}`", method.name))?;
            definition = definition.with_method(method_ref);
        }
        Ok(definition)
    }

    fn method(&self, class: &ClassSpec, method: &MethodSpec, self_type: TypeId) -> Result<MethodRef> {
        let owner = GenericOwner::Method {
            declaring_type: Arc::from(class.name.as_str()),
            name: Arc::from(method.name.as_str()),
            descriptor: Arc::from(self.erased_descriptor(class, method)),
        };
        let locals: Vec<(&str, TypeId)> = method
            .type_params
            .iter()
            .enumerate()
            .map(|(position, param)| {
                let node =
                    self.interner
                        .declare_generic_parameter(owner.clone(), position as u32, &param.name);
                (param.name.as_str(), node)
            })
            .collect();
        for (declared, &(name, node)) in method.type_params.iter().zip(&locals) {
            if let Some(bound) = &declared.bound {
                let bound = self
                    .lower(bound, class, &locals)
                    .with_context(|| format!("bound of `{name}`"))?;
                self.interner.set_upper_bound(node, bound);
            }
        }

        let parameters = method
            .params
            .iter()
            .map(|param| self.lower(param, class, &locals))
            .collect::<Result<Vec<_>>>()
            .context("parameters")?;
        let thrown = method
            .throws
            .iter()
            .map(|thrown| self.lower(thrown, class, &locals))
            .collect::<Result<Vec<_>>>()
            .context("thrown types")?;
        let flags = method
            .flags
            .iter()
            .fold(MethodFlags::empty(), |flags, &flag| flags | MethodFlags::from(flag));
        let generic_parameters: Vec<TypeId> = locals.iter().map(|&(_, node)| node).collect();

        let method_ref = if method.name == "<init>" {
            MethodRef::constructor(self_type)
        } else {
            let return_type = self
                .lower(&method.returns, class, &locals)
                .context("return type")?;
            MethodRef::method(self_type, &method.name, return_type)
        };
        Ok(method_ref
            .with_parameter_types(&parameters)
            .with_thrown_types(&thrown)
            .with_generic_parameters(&generic_parameters)
            .with_flags(flags))
    }

    /// JVM descriptor of a method computed from its file form, before any of
    /// its types are interned. Generic parameters erase to their first
    /// declared bound.
    fn erased_descriptor(&self, class: &ClassSpec, method: &MethodSpec) -> String {
        let mut out = String::from("(");
        for param in &method.params {
            self.write_erased(&mut out, param, class, method, 0);
        }
        out.push(')');
        if method.name == "<init>" {
            out.push('V');
        } else {
            self.write_erased(&mut out, &method.returns, class, method, 0);
        }
        out
    }

    fn write_erased(
        &self,
        out: &mut String,
        expr: &TypeExpr,
        class: &ClassSpec,
        method: &MethodSpec,
        depth: u32,
    ) {
        const OBJECT: &str = "Ljava/lang/Object;";
        match expr {
            TypeExpr::Primitive(name) => match primitive_from_java_name(name) {
                Some(kind) => out.push(kind.descriptor()),
                None => out.push_str(OBJECT),
            },
            TypeExpr::Class(class_expr) => {
                out.push('L');
                out.push_str(&class_expr.name);
                out.push(';');
            }
            TypeExpr::Array(element) => {
                out.push('[');
                self.write_erased(out, element, class, method, depth);
            }
            TypeExpr::Param(reference) => {
                let declared = if reference.owner == class.name {
                    method
                        .type_params
                        .iter()
                        .chain(&class.type_params)
                        .find(|param| param.name == reference.name)
                } else {
                    self.specs.get(reference.owner.as_str()).and_then(|owner| {
                        owner
                            .type_params
                            .iter()
                            .find(|param| param.name == reference.name)
                    })
                };
                match declared.and_then(|param| param.bound.as_ref()) {
                    Some(bound) if depth < 8 => {
                        self.write_erased(out, bound, class, method, depth + 1);
                    }
                    _ => out.push_str(OBJECT),
                }
            }
            TypeExpr::Null | TypeExpr::Wildcard(_) => out.push_str(OBJECT),
        }
    }
}

// =============================================================================
// Universe
// =============================================================================

/// A session over the builtins plus every class of a universe file.
pub struct Universe {
    pub db: Session,
    pub store: Arc<DefinitionStore>,
}

impl Universe {
    pub fn load(classes: &[ClassSpec], config: EngineConfig) -> Result<Self> {
        let interner = TypeInterner::new();
        let store = Arc::new(DefinitionStore::new());
        store.register_builtins(&interner);
        {
            let mut loader = Loader::new(&interner, &store, classes)?;
            loader.declare_class_parameters(classes)?;
            for class in classes {
                loader
                    .bound_class_parameters(class)
                    .with_context(|| format!("class `{}`", class.name))?;
            }
            for class in classes {
                let definition = loader
                    .definition(class)
                    .with_context(|| format!("class `{}`", class.name))?;
                store.register(definition);
            }
        }
        debug!(
            classes = classes.len(),
            definitions = store.len(),
            types = interner.len(),
            "universe loaded"
        );

        let resolver: Arc<dyn MetadataResolver> = store.clone();
        Ok(Self {
            db: Session::with_interner(interner, resolver).with_config(config),
            store,
        })
    }

    /// Lower a type written in a query. Generic parameters are looked up on
    /// their owner's definition, then on its methods.
    pub fn lower(&self, expr: &TypeExpr) -> Result<TypeId> {
        lower_with(
            self.db.interner(),
            expr,
            &|name: &str| {
                self.store
                    .get(name)
                    .map(|definition| definition.generic_parameters.len())
            },
            &|reference: &ParamExpr| {
                Ok(self
                    .db
                    .require_generic_parameter(&reference.owner, &reference.name)?)
            },
        )
    }

    /// The method `name` declared on `owner`; with `params`, the overload
    /// taking exactly those parameter types.
    pub fn method(
        &self,
        owner: &str,
        name: &str,
        params: Option<&[TypeExpr]>,
    ) -> Result<Arc<MethodRef>> {
        let definition = self
            .store
            .get(owner)
            .ok_or_else(|| anyhow!("unknown class `{owner}`"))?;
        let wanted = params
            .map(|params| {
                params
                    .iter()
                    .map(|param| self.lower(param))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;
        definition
            .methods
            .iter()
            .find(|method| {
                &*method.name == name
                    && wanted
                        .as_ref()
                        .is_none_or(|wanted| method.parameter_types().eq(wanted.iter().copied()))
            })
            .cloned()
            .ok_or_else(|| anyhow!("`{owner}` declares no matching method `{name}`"))
    }
}

#[cfg(test)]
#[path = "../tests/universe_tests.rs"]
mod tests;
