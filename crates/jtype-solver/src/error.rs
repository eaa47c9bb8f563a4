//! Errors surfaced by the asserting entry points.
//!
//! Most engine queries are permissive: an unresolvable type degrades to
//! `Object`, `false` or an empty result. The operations here are the ones a
//! caller asks to fail loudly.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("Could not find variable at slot {slot} and offset {offset}.")]
    VariableNotFound { slot: u32, offset: i64 },

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("`{definition}` expects {expected} type argument(s), found {found}")]
    ArityMismatch {
        definition: String,
        expected: usize,
        found: usize,
    },

    #[error("`{name}` is not a generic parameter of `{owner}`")]
    UnknownGenericParameter { owner: String, name: String },
}

pub type TypeResult<T> = Result<T, TypeError>;
