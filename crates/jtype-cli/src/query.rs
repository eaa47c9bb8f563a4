//! Queries a universe file asks, and their JSON answers.

use crate::universe::{TypeExpr, Universe};
use anyhow::{Context, Result};
use jtype_solver::{
    MethodRef, TypeDatabase, TypeFormatter, TypeId, as_sub_type, conversion_type, erase,
    field_as_member_of, find_common_super_type, find_methods, is_assignable_from,
    is_overload_checking_required,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug_span;

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Query {
    /// Can a value of `source` be stored in `target` without a cast.
    Assignable { target: TypeExpr, source: TypeExpr },
    Conversion { target: TypeExpr, source: TypeExpr },
    CommonSuperType { left: TypeExpr, right: TypeExpr },
    Erase {
        #[serde(rename = "type")]
        ty: TypeExpr,
    },
    AsSubType {
        #[serde(rename = "type")]
        ty: TypeExpr,
        base: TypeExpr,
    },
    /// Methods visible on a type, projected onto it, plus its own fields.
    Members {
        #[serde(rename = "type")]
        ty: TypeExpr,
        #[serde(default)]
        name: Option<String>,
    },
    OverloadCheck {
        owner: String,
        method: String,
        #[serde(default)]
        params: Option<Vec<TypeExpr>>,
    },
}

impl Query {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Assignable { .. } => "assignable",
            Self::Conversion { .. } => "conversion",
            Self::CommonSuperType { .. } => "common_super_type",
            Self::Erase { .. } => "erase",
            Self::AsSubType { .. } => "as_sub_type",
            Self::Members { .. } => "members",
            Self::OverloadCheck { .. } => "overload_check",
        }
    }
}

pub fn run_queries(universe: &Universe, queries: &[Query]) -> Result<Vec<Value>> {
    queries
        .iter()
        .enumerate()
        .map(|(index, query)| {
            run_query(universe, query)
                .with_context(|| format!("query #{index} ({})", query.name()))
        })
        .collect()
}

pub fn run_query(universe: &Universe, query: &Query) -> Result<Value> {
    let _span = debug_span!("query", kind = query.name()).entered();
    let db = &universe.db;
    let names = TypeFormatter::new(db);

    let answer = match query {
        Query::Assignable { target, source } => {
            let (target, source) = (universe.lower(target)?, universe.lower(source)?);
            json!({
                "query": query.name(),
                "target": names.java_name(target),
                "source": names.java_name(source),
                "result": is_assignable_from(db, target, source),
            })
        }
        Query::Conversion { target, source } => {
            let (target, source) = (universe.lower(target)?, universe.lower(source)?);
            json!({
                "query": query.name(),
                "target": names.java_name(target),
                "source": names.java_name(source),
                "result": conversion_type(db, target, source),
            })
        }
        Query::CommonSuperType { left, right } => {
            let (left, right) = (universe.lower(left)?, universe.lower(right)?);
            json!({
                "query": query.name(),
                "left": names.java_name(left),
                "right": names.java_name(right),
                "result": names.java_name(find_common_super_type(db, left, right)),
            })
        }
        Query::Erase { ty } => {
            let ty = universe.lower(ty)?;
            let erased = erase(db, ty);
            json!({
                "query": query.name(),
                "type": names.java_name(ty),
                "result": names.java_name(erased),
                "descriptor": names.descriptor(ty),
            })
        }
        Query::AsSubType { ty, base } => {
            let (ty, base) = (universe.lower(ty)?, universe.lower(base)?);
            json!({
                "query": query.name(),
                "type": names.java_name(ty),
                "base": names.java_name(base),
                "result": names.java_name(as_sub_type(db, ty, base)),
            })
        }
        Query::Members { ty, name } => {
            let ty = universe.lower(ty)?;
            let wanted = |member: &str| name.as_deref().is_none_or(|name| name == member);
            let methods: Vec<Value> = find_methods(db, ty, |method| wanted(&*method.name))
                .iter()
                .map(|method| method_json(&names, method))
                .collect();
            let fields: Vec<Value> = db
                .resolve(ty)
                .map(|definition| definition.fields.clone())
                .unwrap_or_default()
                .iter()
                .filter(|field| wanted(&*field.name))
                .map(|field| {
                    let projected = field_as_member_of(db, field, ty);
                    json!({
                        "name": &*projected.name,
                        "type": names.java_name(projected.field_type),
                    })
                })
                .collect();
            json!({
                "query": query.name(),
                "type": names.java_name(ty),
                "methods": methods,
                "fields": fields,
            })
        }
        Query::OverloadCheck {
            owner,
            method,
            params,
        } => {
            let method = universe.method(owner, method, params.as_deref())?;
            json!({
                "query": query.name(),
                "owner": names.java_name(method.declaring_type),
                "method": &*method.name,
                "descriptor": names.method_descriptor(&method),
                "result": is_overload_checking_required(db, &method),
            })
        }
    };
    Ok(answer)
}

fn method_json(names: &TypeFormatter<'_>, method: &Arc<MethodRef>) -> Value {
    let parameters: Vec<String> = method
        .parameter_types()
        .map(|ty: TypeId| names.java_name(ty))
        .collect();
    let declaration = method.resolve();
    json!({
        "name": &*method.name,
        "declared_by": names.java_name(declaration.declaring_type),
        "return_type": names.java_name(method.return_type),
        "parameters": parameters,
        "descriptor": names.method_descriptor(&declaration),
    })
}

#[cfg(test)]
#[path = "../tests/query_tests.rs"]
mod tests;
