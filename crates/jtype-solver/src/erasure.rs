//! Type erasure.
//!
//! Erasure drops generic information the way the JVM does:
//! - a parameterized type erases to its definition,
//! - a generic parameter erases to the erasure of its bound (`Object` when
//!   unbounded),
//! - a wildcard erases to its `extends` bound, or `Object`,
//! - arrays erase their element.

use crate::db::TypeDatabase;
use crate::members::{MethodRef, ParameterInfo};
use crate::query_trace;
use crate::recursion::{RecursionGuard, RecursionResult};
use crate::types::{GenericParamId, TypeData, TypeId, WildcardBound};
use std::sync::Arc;

pub fn erase(db: &dyn TypeDatabase, ty: TypeId) -> TypeId {
    if !query_trace::enabled() {
        return TypeEraser::new(db).visit(ty);
    }
    let query_id = query_trace::start("erase", &[ty]);
    let result = TypeEraser::new(db).visit(ty);
    query_trace::finish(query_id, "erase", result);
    result
}

/// Erase every type in a method signature.
///
/// Returns `method` itself when its signature contains no generic types.
pub fn erase_method(db: &dyn TypeDatabase, method: &Arc<MethodRef>) -> Arc<MethodRef> {
    let mut eraser = TypeEraser::new(db);
    let return_type = eraser.visit(method.return_type);
    let parameters: Vec<ParameterInfo> = method
        .parameters
        .iter()
        .map(|parameter| ParameterInfo {
            name: Arc::clone(&parameter.name),
            parameter_type: eraser.visit(parameter.parameter_type),
        })
        .collect();
    let thrown_types: Vec<TypeId> = method
        .thrown_types
        .iter()
        .map(|&ty| eraser.visit(ty))
        .collect();

    let unchanged = return_type == method.return_type
        && *parameters == *method.parameters
        && *thrown_types == *method.thrown_types;
    if unchanged {
        return Arc::clone(method);
    }
    Arc::new(MethodRef {
        return_type,
        parameters: Arc::from(parameters),
        thrown_types: Arc::from(thrown_types),
        type_arguments: Arc::from([]),
        declaration: Some(method.resolve()),
        ..MethodRef::clone(method)
    })
}

/// Erasure visitor.
///
/// Tracks the generic parameters whose bounds are being followed; a bound
/// chain that loops back erases to `Object`.
pub struct TypeEraser<'a> {
    db: &'a dyn TypeDatabase,
    in_progress: RecursionGuard<GenericParamId>,
}

impl<'a> TypeEraser<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        Self {
            db,
            in_progress: RecursionGuard::new(db.config().erasure),
        }
    }

    pub fn visit(&mut self, ty: TypeId) -> TypeId {
        let interner = self.db.interner();
        let Some(data) = interner.lookup(ty) else {
            return ty;
        };
        match data {
            TypeData::Primitive(_) | TypeData::Null | TypeData::Named(_) => ty,
            TypeData::Array(element) => {
                let erased = self.visit(element);
                if erased == element {
                    ty
                } else {
                    interner.array(erased)
                }
            }
            TypeData::GenericInstance { definition, .. } => definition,
            TypeData::GenericParameter { param, bound } => {
                let upper = bound.or_else(|| {
                    interner
                        .generic_param_info(param)
                        .and_then(|info| info.upper_bound)
                });
                let Some(upper) = upper else {
                    return TypeId::OBJECT;
                };
                match self.in_progress.enter(param) {
                    RecursionResult::Entered => {
                        let erased = self.visit(upper);
                        self.in_progress.leave(param);
                        erased
                    }
                    _ => TypeId::OBJECT,
                }
            }
            TypeData::Wildcard(WildcardBound::Extends(bound)) => self.visit(bound),
            TypeData::Wildcard(WildcardBound::Unbounded | WildcardBound::Super(_)) => {
                TypeId::OBJECT
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/erasure_tests.rs"]
mod tests;
